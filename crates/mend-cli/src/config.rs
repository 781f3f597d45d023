//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate only sees the [`EngineSettings`]
//! derived from it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `MEND_<SECTION>__<KEY>`, e.g.
//!    `MEND_KNOWLEDGE__PATH` or `MEND_ENGINE__HISTORY_CAP`
//! 3. Config file: `--config`, else `.mend.toml` in the current directory,
//!    else the user configuration directory
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use mend_core::domain::BlendPolicy;
use mend_core::prelude::EngineSettings;

/// File name of a project-local configuration.
pub const LOCAL_CONFIG: &str = ".mend.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Knowledge-base persistence.
    pub knowledge: KnowledgeConfig,
    /// Extra rule packs.
    pub rules: RulesConfig,
    /// Engine tunables.
    pub engine: EngineConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Knowledge-base file; the user data directory when unset.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Rule-pack files or directories, loaded in order.
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub history_cap: u32,
    pub max_history_weight: f64,
    pub related_line_window: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`.
    pub format: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let settings = EngineSettings::default();
        Self {
            history_cap: settings.blend.history_cap,
            max_history_weight: settings.blend.max_history_weight,
            related_line_window: settings.related_line_window,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the config file, then the
    /// environment.
    ///
    /// An explicit `config_file` must exist; the implicit locations are
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .context("Failed to serialise built-in defaults")?;
        let mut builder = Config::builder().add_source(defaults);

        builder = match config_file {
            Some(path) => builder.add_source(File::from(path.as_path()).format(FileFormat::Toml)),
            None => {
                let local = PathBuf::from(LOCAL_CONFIG);
                let path = if local.exists() { local } else { Self::config_path() };
                builder.add_source(
                    File::from(path.as_path())
                        .format(FileFormat::Toml)
                        .required(false),
                )
            }
        };

        let config = builder
            .add_source(
                Environment::with_prefix("MEND")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        let app: Self = config
            .try_deserialize()
            .context("Configuration has an invalid shape")?;
        app.validate()?;
        Ok(app)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.engine.max_history_weight) {
            anyhow::bail!(
                "engine.max_history_weight must be within 0.0..=1.0, got {}",
                self.engine.max_history_weight
            );
        }
        if !matches!(self.output.format.as_str(), "auto" | "human" | "plain" | "json") {
            anyhow::bail!(
                "output.format must be one of auto, human, plain, json; got '{}'",
                self.output.format
            );
        }
        Ok(())
    }

    /// Engine tunables in the core's terms.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            blend: BlendPolicy {
                history_cap: self.engine.history_cap,
                max_history_weight: self.engine.max_history_weight,
            },
            related_line_window: self.engine.related_line_window,
        }
    }

    /// Effective knowledge-base file.
    pub fn knowledge_path(&self) -> PathBuf {
        self.knowledge
            .path
            .clone()
            .unwrap_or_else(Self::default_knowledge_path)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.mend.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "mend", "mend")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG))
    }

    fn default_knowledge_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "mend", "mend")
            .map(|d| d.data_dir().join("knowledge.json"))
            .unwrap_or_else(|| Path::new(".mend").join("knowledge.json"))
    }
}
