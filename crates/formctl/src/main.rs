mod cli;
mod config;
mod errors;
mod logging;
mod outline;

use std::fs;
use std::path::Path;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use forms::{ContentRecord, FormBuilder, FormSchema, FormSerializer, SchemaCatalog};
use tracing::{debug, info};

use crate::cli::{Cli, Cmd, FormArgs};
use crate::config::Config;
use crate::outline::Outline;

fn main() -> Result<()> {
    errors::init()?;
    let args = Cli::parse();
    let config = Config::new(args.config.as_deref()).wrap_err("failed to load configuration")?;
    logging::init(&config.log_filter)?;
    debug!(?config, version = forms::VERSION, "formctl started");

    match args.cmd {
        Cmd::Render(form) => render(&form, &config),
        Cmd::Roundtrip(form) => roundtrip(&form, &config),
        Cmd::Normalize { schema } => normalize(&schema),
        Cmd::Types { catalog } => types(&catalog),
    }
}

fn render(form: &FormArgs, config: &Config) -> Result<()> {
    let schema = load_schema(&form.schema, form.problem_type.as_deref())?;
    let content = load_content(form.content.as_deref())?;
    let tree = FormBuilder::new().build(
        &schema,
        &content,
        form.role.unwrap_or(config.default_role),
        form.readonly || config.readonly,
    )?;
    for diagnostic in tree.diagnostics() {
        eprintln!("skipped: {diagnostic}");
    }
    debug!(role = %tree.role(), readonly = tree.is_readonly(), nodes = tree.len(), "form built");
    print!("{}", Outline(&tree));
    Ok(())
}

fn roundtrip(form: &FormArgs, config: &Config) -> Result<()> {
    let schema = load_schema(&form.schema, form.problem_type.as_deref())?;
    let content = load_content(form.content.as_deref())?;
    let mut tree = FormBuilder::new().build(
        &schema,
        &content,
        form.role.unwrap_or(config.default_role),
        form.readonly || config.readonly,
    )?;
    let outcome = FormSerializer::new(&schema).serialize_with_diagnostics(&mut tree);
    for diagnostic in tree.diagnostics().iter().chain(&outcome.diagnostics) {
        eprintln!("skipped: {diagnostic}");
    }
    info!(role = %tree.role(), fields = outcome.record.len(), "round trip complete");
    println!("{}", serde_json::to_string_pretty(&outcome.record)?);
    Ok(())
}

fn normalize(path: &Path) -> Result<()> {
    let schema = FormSchema::from_json_str(&read(path)?)
        .wrap_err_with(|| format!("invalid schema in {}", path.display()))?;
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn types(path: &Path) -> Result<()> {
    let catalog = SchemaCatalog::from_json_str(&read(path)?)
        .wrap_err_with(|| format!("invalid problem type list in {}", path.display()))?;
    for (name, tag) in catalog.listing() {
        println!("{tag}\t{name}");
    }
    Ok(())
}

fn load_schema(path: &Path, problem_type: Option<&str>) -> Result<FormSchema> {
    let raw = read(path)?;
    let schema = match problem_type {
        Some(tag) => {
            let catalog = SchemaCatalog::from_json_str(&raw)
                .wrap_err_with(|| format!("invalid problem type list in {}", path.display()))?;
            catalog.get(tag)?.fields().clone()
        }
        None => FormSchema::from_json_str(&raw)
            .wrap_err_with(|| format!("invalid schema in {}", path.display()))?,
    };
    debug!(fields = schema.field_count(), path = %path.display(), "schema loaded");
    Ok(schema)
}

fn load_content(path: Option<&Path>) -> Result<ContentRecord> {
    let Some(path) = path else {
        return Ok(ContentRecord::new());
    };
    ContentRecord::from_json_str(&read(path)?)
        .wrap_err_with(|| format!("invalid content record in {}", path.display()))
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))
}
