//! Governor configuration stored at `.governor/config.toml`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".governor/config.toml";

/// Governor configuration (TOML).
///
/// Missing fields fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GovernorConfig {
    /// Directory holding state store documents. Relative paths resolve
    /// against the directory containing the config file.
    pub storage_dir: PathBuf,

    /// Whether new sessions may enter the review and freeze states.
    pub strict_mode: bool,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("state"),
            strict_mode: true,
        }
    }
}

impl GovernorConfig {
    /// Reject settings that would let the store live outside the governor
    /// directory by accident.
    ///
    /// `storage_dir` must be non-empty and, when relative, may not climb out
    /// of the config directory with `..`. Absolute paths are taken as an
    /// explicit choice.
    pub fn validate(&self) -> Result<()> {
        if self.storage_dir.as_os_str().is_empty() {
            bail!("storage_dir must not be empty");
        }
        let climbs = self
            .storage_dir
            .components()
            .any(|c| matches!(c, Component::ParentDir));
        if climbs && !self.storage_dir.is_absolute() {
            bail!(
                "storage_dir {} must stay inside the config directory",
                self.storage_dir.display()
            );
        }
        Ok(())
    }

    /// Storage directory resolved against the config file location.
    pub fn storage_path(&self, config_path: &Path) -> PathBuf {
        if self.storage_dir.is_absolute() {
            return self.storage_dir.clone();
        }
        config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&self.storage_dir)
    }
}

/// Load and validate the config at `path`; a missing file means defaults.
pub fn load_config(path: &Path) -> Result<GovernorConfig> {
    let cfg = match fs::read_to_string(path) {
        Ok(contents) => toml::from_str::<GovernorConfig>(&contents)
            .with_context(|| format!("parse {}", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file, using defaults");
            GovernorConfig::default()
        }
        Err(err) => return Err(err).with_context(|| format!("read {}", path.display())),
    };
    cfg.validate().with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Validate, then replace the config at `path` via a sibling temp file.
pub fn write_config(path: &Path, cfg: &GovernorConfig) -> Result<()> {
    cfg.validate()?;
    let body = toml::to_string_pretty(cfg).context("serialize config")?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let staged = path.with_extension("toml.tmp");
    fs::write(&staged, format!("{body}\n"))
        .with_context(|| format!("stage {}", staged.display()))?;
    fs::rename(&staged, path).with_context(|| format!("replace {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, GovernorConfig::default());
        assert!(cfg.strict_mode);
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested/config.toml");
        let cfg = GovernorConfig {
            storage_dir: PathBuf::from("checkpoints"),
            strict_mode: false,
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "strict_mode = false\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert!(!cfg.strict_mode);
        assert_eq!(cfg.storage_dir, PathBuf::from("state"));
    }

    #[test]
    fn empty_storage_dir_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "storage_dir = \"\"\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("storage_dir"), "{err:#}");
    }

    #[test]
    fn storage_dir_escaping_config_dir_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "storage_dir = \"../shared/state\"\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("inside the config directory"), "{err:#}");

        let escaping = GovernorConfig {
            storage_dir: PathBuf::from("state/../../elsewhere"),
            strict_mode: true,
        };
        assert!(write_config(&path, &escaping).is_err());
        assert!(load_config(&path).is_err(), "rejected write must not replace the file");

        let absolute = GovernorConfig {
            storage_dir: temp.path().join("abs/state"),
            strict_mode: true,
        };
        assert!(absolute.validate().is_ok());
    }

    #[test]
    fn storage_path_resolves_relative_to_config() {
        let cfg = GovernorConfig::default();
        let resolved = cfg.storage_path(Path::new("/work/.governor/config.toml"));
        assert_eq!(resolved, PathBuf::from("/work/.governor/state"));
    }
}
