//! `[build]` section configuration.
//!
//! Paths are relative to the project root (the directory holding the config
//! file) unless absolute.
//!
//! # Example
//!
//! ```toml
//! [build]
//! output = "output"                              # generated site
//! content = "content"                            # generator input
//! generator = ["pelican"]                        # program + leading args
//! production = "pelicanconf/production.py"       # settings for build/rebuild
//! development = "pelicanconf/development.py"     # settings for preview
//! ```

use crate::config::ConfigDiagnostics;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings profile handed to the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Production,
    Development,
}

impl Profile {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}

/// Build paths and generator invocation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Generated site directory.
    pub output: PathBuf,

    /// Generator input directory, created empty when missing.
    pub content: PathBuf,

    /// Generator program followed by fixed leading arguments.
    pub generator: Vec<String>,

    /// Settings file for the production profile.
    pub production: PathBuf,

    /// Settings file for the development profile.
    pub development: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output: "output".into(),
            content: "content".into(),
            generator: vec!["pelican".to_string()],
            production: "pelicanconf/production.py".into(),
            development: "pelicanconf/development.py".into(),
        }
    }
}

impl BuildConfig {
    /// Settings file for a profile.
    pub fn settings(&self, profile: Profile) -> &Path {
        match profile {
            Profile::Production => &self.production,
            Profile::Development => &self.development,
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.generator.first().is_none_or(|p| p.trim().is_empty()) {
            diag.error_with_hint(
                "build.generator",
                "build.generator must name a program",
                "e.g. generator = [\"pelican\"]",
            );
        }
        if self.output.as_os_str().is_empty() {
            diag.error("build.output", "build.output is empty");
        }
        if self.content.as_os_str().is_empty() {
            diag.error("build.content", "build.content is empty");
        }
        if self.output == self.content {
            diag.error(
                "build.output",
                "build.output and build.content must be different directories",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Profile;
    use crate::config::{ConfigDiagnostics, test_parse_config};
    use std::path::Path;

    #[test]
    fn test_build_config_defaults() {
        let config = test_parse_config("");

        assert_eq!(config.build.output, Path::new("output"));
        assert_eq!(config.build.content, Path::new("content"));
        assert_eq!(config.build.generator, ["pelican"]);
        assert_eq!(
            config.build.settings(Profile::Production),
            Path::new("pelicanconf/production.py")
        );
        assert_eq!(
            config.build.settings(Profile::Development),
            Path::new("pelicanconf/development.py")
        );
    }

    #[test]
    fn test_build_config_override() {
        let config = test_parse_config(
            "[build]\noutput = \"public\"\ngenerator = [\"python\", \"-m\", \"pelican\"]",
        );
        assert_eq!(config.build.output, Path::new("public"));
        assert_eq!(config.build.generator, ["python", "-m", "pelican"]);
        // untouched fields keep their defaults
        assert_eq!(config.build.content, Path::new("content"));
    }

    #[test]
    fn test_build_validate_empty_generator() {
        let config = test_parse_config("[build]\ngenerator = []");
        let mut diag = ConfigDiagnostics::new();
        config.build.validate(&mut diag);
        assert_eq!(diag.len(), 1);
        assert_eq!(diag.errors()[0].field, "build.generator");
    }

    #[test]
    fn test_build_validate_same_dirs() {
        let config = test_parse_config("[build]\noutput = \"site\"\ncontent = \"site\"");
        let mut diag = ConfigDiagnostics::new();
        config.build.validate(&mut diag);
        assert!(diag.has_errors());
    }

    #[test]
    fn test_profile_names() {
        assert_eq!(Profile::Production.name(), "production");
        assert_eq!(Profile::Development.name(), "development");
    }
}
