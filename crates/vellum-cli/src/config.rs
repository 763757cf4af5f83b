//! CLI configuration (`vellum.ron`).
//!
//! Looked up at `--config <path>` when given, otherwise at
//! `~/.config/vellum/vellum.ron`. A missing default file means defaults; a
//! file that exists but does not parse is an error.
//!
//! ```ron
//! (
//!     id_strategy: derived,
//!     log_filter: "vellum_engine=debug,info",
//!     pretty: true,
//!     label_format: Some("Fill in {name}:"),
//! )
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vellum_engine::{IdStrategy, Transformer};

/// Config file name inside the vellum config directory.
pub const CONFIG_FILE: &str = "vellum.ron";

/// How embed ids are allocated by `fill` and `transform`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdMode {
    /// `ph_<name>_<millis>_<seq>`, unique per run.
    #[default]
    Timestamped,
    /// UUIDv5 from (scope, name, occurrence), stable across runs.
    Derived,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub id_strategy: IdMode,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Pretty-print JSON output.
    pub pretty: bool,
    /// Fallback embed label; `{name}` is replaced by the placeholder name.
    pub label_format: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            id_strategy: IdMode::Timestamped,
            log_filter: "info".to_string(),
            pretty: true,
            label_format: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Ron {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// Default config path (`~/.config/vellum/vellum.ron`).
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("vellum").join(CONFIG_FILE))
}

impl Config {
    /// Load from an explicit path, or from the default location if one exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&text).map_err(|source| ConfigError::Ron {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build a transformer for this config.
    ///
    /// `scope` keys derived ids; it is ignored for timestamped ids. `force_derived`
    /// overrides the configured mode.
    pub fn transformer(&self, scope: &str, force_derived: bool) -> Transformer {
        let strategy = if force_derived || self.id_strategy == IdMode::Derived {
            IdStrategy::derived(scope)
        } else {
            IdStrategy::Timestamped
        };
        let mut transformer = Transformer::new().with_id_strategy(strategy);
        if let Some(format) = &self.label_format {
            if !format.contains("{name}") {
                tracing::warn!(%format, "label_format has no {{name}} slot");
            }
            transformer = transformer.with_label_format(format.clone());
        }
        transformer
    }
}
