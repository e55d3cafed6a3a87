use std::path::{Path, PathBuf};
use std::env;

use directories::ProjectDirs;
use forms::Role;
use lazy_static::lazy_static;
use serde::Deserialize;
use tracing::debug;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Role used when `--role` is omitted.
    pub default_role: Role,
    pub readonly: bool,
    /// Filter directives used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_role: Role::Creator,
            readonly: false,
            log_filter: "info".to_string(),
        }
    }
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

impl Config {
    /// Load `config.json5` / `config.toml` from `dir` (or the config dir) and
    /// `FORMCTL_*` environment overrides. Missing files are fine.
    pub fn new(dir: Option<&Path>) -> Result<Self, config::ConfigError> {
        let config_dir = dir.map(Path::to_path_buf).unwrap_or_else(get_config_dir);
        let mut builder = config::Config::builder();

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.toml", config::FileFormat::Toml),
        ];
        let mut found_config = false;
        for (file, format) in &config_files {
            let path = config_dir.join(file);
            if path.exists() {
                found_config = true;
            }
            builder = builder.add_source(config::File::from(path).format(*format).required(false));
        }
        if !found_config {
            debug!(dir = %config_dir.display(), "no configuration file, using defaults");
        }

        builder = builder.add_source(config::Environment::with_prefix(&PROJECT_NAME));
        builder.build()?.try_deserialize()
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "codrilla", env!("CARGO_PKG_NAME"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn defaults_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::new(Some(dir.path())).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            "default_role = \"student\"\nreadonly = true\n",
        )
        .unwrap();
        let cfg = Config::new(Some(dir.path())).unwrap();
        assert_eq!(cfg.default_role, Role::Student);
        assert!(cfg.readonly);
        assert_eq!(cfg.log_filter, "info");
    }

    #[test]
    fn reads_json5_with_legacy_role_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.json5"),
            "{ default_role: 'editor', log_filter: 'forms=debug' }",
        )
        .unwrap();
        let cfg = Config::new(Some(dir.path())).unwrap();
        assert_eq!(cfg.default_role, Role::Creator);
        assert_eq!(cfg.log_filter, "forms=debug");
    }
}
