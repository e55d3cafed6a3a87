// src/cli.rs
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use forms::Role;

#[derive(Parser)]
#[command(name = "formctl", version, about = "Render and round-trip form schemas")]
pub struct Cli {
    /// Directory holding config.json5 / config.toml (overrides FORMCTL_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Build a form and print its outline
    Render(FormArgs),
    /// Build a form and immediately serialize it back into a content record
    Roundtrip(FormArgs),
    /// Print a schema in canonical wire form
    Normalize {
        #[arg(long)]
        schema: PathBuf,
    },
    /// List the problem types of a catalog
    Types {
        #[arg(long)]
        catalog: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct FormArgs {
    /// Field list, or a problem type catalog together with --problem-type
    #[arg(long)]
    pub schema: PathBuf,

    /// Tag of the problem type to pick from a catalog
    #[arg(long)]
    pub problem_type: Option<String>,

    /// Content record (JSON object); empty when omitted
    #[arg(long)]
    pub content: Option<PathBuf>,

    /// creator, student or result (legacy: editor)
    #[arg(long)]
    pub role: Option<Role>,

    /// Downgrade every edit field to view
    #[arg(long)]
    pub readonly: bool,
}
