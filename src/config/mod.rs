//! Project configuration from `blogops.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build      # [build]
//! │   ├── deploy     # [deploy], [deploy.author]
//! │   └── serve      # [serve]
//! ├── types/         # ConfigError, ConfigDiagnostics
//! ├── util.rs        # config discovery, `~` expansion
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! The configuration is loaded once at startup and passed by reference to
//! every task; nothing reads it from global state.

pub mod section;
pub mod types;
mod util;

pub use section::{
    AuthorConfig, BuildConfig, DeployConfig, Profile, RemotePolicy, Secret, ServeConfig,
};
pub use types::{ConfigDiagnostics, ConfigError};

use crate::{
    cli::{Cli, Commands},
    debug, log,
};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use util::find_config_file;

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_NAME: &str = "blogops.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing blogops.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
    /// Project root: parent of the config file, or the current directory.
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub deploy: DeployConfig,
}

impl SiteConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// An explicit `--config` must exist. Otherwise `blogops.toml` is searched
    /// upward from the current directory, and built-in defaults apply when
    /// none is found.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let config_path = match &cli.config {
            Some(path) => {
                let path = cwd.join(path);
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path).into());
                }
                Some(path)
            }
            None => find_config_file(&cwd, Path::new(DEFAULT_CONFIG_NAME)),
        };

        let mut config = match &config_path {
            Some(path) => Self::from_path(path)?,
            None => {
                debug!("config"; "no {} found, using defaults", DEFAULT_CONFIG_NAME);
                Self::default()
            }
        };

        config.root = config_path
            .as_deref()
            .and_then(Path::parent)
            .map_or(cwd, Path::to_path_buf);

        config.apply_cli(cli);
        config
            .deploy
            .resolve_token(|key| std::env::var(key).ok());

        let mut diag = ConfigDiagnostics::new();
        config.build.validate(&mut diag);
        diag.into_result()?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path, warning about unknown fields.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if !ignored.is_empty() {
            let display_path = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| path.to_string_lossy());
            log!("warning"; "ignoring unknown fields in {}: {}", display_path, ignored.join(", "));
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Apply command-line overrides.
    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(output) = &cli.output {
            self.build.output = output.clone();
        }
        if let Some(content) = &cli.content {
            self.build.content = content.clone();
        }

        if let Commands::Serve { server } | Commands::Reserve { server } = &cli.command {
            if let Some(port) = server.port {
                self.serve.port = port;
            }
            if let Some(interface) = server.interface {
                self.serve.interface = interface;
            }
        }
    }

    /// Join a path with the project root.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Absolute output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.root_join(&self.build.output)
    }

    /// Absolute content directory.
    pub fn content_dir(&self) -> PathBuf {
        self.root_join(&self.build.content)
    }

    /// Check everything `deploy` needs, reporting all problems at once.
    pub fn validate_for_deploy(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();
        self.build.validate(&mut diag);
        self.deploy.validate(&mut diag);
        diag.into_result()
    }
}

/// Parse a config snippet for section tests; the root is a fixed fake path.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let mut config = SiteConfig::from_str(content).expect("test config should parse");
    config.root = PathBuf::from("/site");
    config
}
