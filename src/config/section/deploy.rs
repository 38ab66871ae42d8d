//! `[deploy]` section configuration.
//!
//! Publishing to a static-hosting branch (GitHub Pages style) of a remote
//! git repository.
//!
//! # Example
//!
//! ```toml
//! [deploy]
//! site_url = "example.net"                               # written to CNAME
//! url = "https://github.com/example/example.github.io"   # HTTPS or SSH
//! user = "example"                                       # account paired with the token
//! remote = "live"                                        # local remote alias
//! branch = "master"                                      # remote branch to overwrite
//! local_branch = "output"                                # orphan branch created locally
//! message = "Generated from sources"
//! token_env = "GH_TOKEN"                                 # env var holding the token
//! token_path = "~/.github-token"                         # fallback token file
//! on_existing_remote = "fail"                            # fail | replace
//!
//! [deploy.author]
//! name = "Example Author"
//! email = "author@example.net"
//! ```

use crate::config::{ConfigDiagnostics, util::expand_tilde};
use crate::debug;
use serde::Deserialize;
use std::{fmt, fs, path::PathBuf};

/// What to do when the remote alias is already registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemotePolicy {
    /// Only `git remote add`; an existing alias fails the deploy.
    #[default]
    Fail,
    /// `git remote remove` (failure ignored) before `git remote add`.
    Replace,
}

/// Token that never shows up in `Debug` output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Secret(<empty>)")
        } else {
            f.write_str("Secret(***)")
        }
    }
}

/// Deploy configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Custom domain written to the `CNAME` file.
    pub site_url: String,

    /// Remote repository URL (HTTPS or SSH form).
    pub url: String,

    /// Account name paired with the token in HTTPS credentials.
    pub user: String,

    /// Local alias the remote is registered under.
    pub remote: String,

    /// Remote branch that receives the force-push.
    pub branch: String,

    /// Orphan branch created in the working tree.
    pub local_branch: String,

    /// Commit message of the published commit.
    pub message: String,

    /// Environment variable holding the auth token.
    pub token_env: String,

    /// File holding the auth token, used when the variable is unset.
    ///
    /// Store outside the repository; never commit tokens.
    pub token_path: Option<PathBuf>,

    pub on_existing_remote: RemotePolicy,

    pub author: AuthorConfig,

    /// Resolved token (internal use only).
    #[serde(skip)]
    pub token: Secret,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            site_url: String::new(),
            url: String::new(),
            user: String::new(),
            remote: "live".to_string(),
            branch: "master".to_string(),
            local_branch: "output".to_string(),
            message: "Generated from sources".to_string(),
            token_env: "GH_TOKEN".to_string(),
            token_path: None,
            on_existing_remote: RemotePolicy::Fail,
            author: AuthorConfig::default(),
            token: Secret::default(),
        }
    }
}

/// Identity recorded on the published commit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AuthorConfig {
    pub name: String,
    pub email: String,
}

impl DeployConfig {
    /// Resolve the auth token: environment variable first, then `token_path`.
    ///
    /// Anything missing or unreadable yields an empty token; only `deploy`
    /// needs one and it validates before running.
    pub fn resolve_token(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(token) = env(&self.token_env).filter(|t| !t.trim().is_empty()) {
            self.token = Secret::new(token.trim());
            return;
        }

        if let Some(path) = &self.token_path {
            let path = expand_tilde(path);
            match fs::read_to_string(&path) {
                Ok(token) => self.token = Secret::new(token.trim()),
                Err(e) => debug!("config"; "token file {} unreadable: {}", path.display(), e),
            }
        }
    }

    /// Whether the remote URL carries credentials over HTTPS.
    pub fn uses_https(&self) -> bool {
        self.url.starts_with("https://")
    }

    /// Presence checks for everything `deploy` consumes.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.url.trim().is_empty() {
            diag.error_with_hint(
                "deploy.url",
                "deploy.url is empty",
                "e.g. url = \"https://github.com/user/user.github.io\"",
            );
        } else if self.uses_https() && url::Url::parse(&self.url).is_err() {
            diag.error("deploy.url", format!("deploy.url is not a valid URL: {}", self.url));
        }

        if self.site_url.trim().is_empty() {
            diag.error("deploy.site_url", "deploy.site_url is empty");
        }

        for (field, value) in [
            ("deploy.remote", &self.remote),
            ("deploy.branch", &self.branch),
            ("deploy.local_branch", &self.local_branch),
            ("deploy.message", &self.message),
            ("deploy.author.name", &self.author.name),
            ("deploy.author.email", &self.author.email),
        ] {
            if value.trim().is_empty() {
                diag.error(field, format!("{field} is empty"));
            }
        }

        if self.uses_https() && self.token.is_empty() {
            match &self.token_path {
                Some(path) if !expand_tilde(path).is_file() => diag.error(
                    "deploy.token_path",
                    format!("deploy.token_path file not found: {}", path.display()),
                ),
                _ => diag.error_with_hint(
                    "deploy.token_env",
                    "no auth token available for the HTTPS remote",
                    format!("export {} or set deploy.token_path", self.token_env),
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SiteConfig, test_parse_config};
    use std::io::Write;

    const FULL: &str = r#"[deploy]
site_url = "example.net"
url = "https://github.com/example/example.github.io.git"
user = "example"
remote = "pages"
branch = "gh-pages"
on_existing_remote = "replace"

[deploy.author]
name = "Example Author"
email = "author@example.net""#;

    #[test]
    fn test_deploy_config() {
        let config = test_parse_config(FULL);

        assert_eq!(config.deploy.site_url, "example.net");
        assert_eq!(config.deploy.remote, "pages");
        assert_eq!(config.deploy.branch, "gh-pages");
        assert_eq!(config.deploy.on_existing_remote, RemotePolicy::Replace);
        assert_eq!(config.deploy.author.name, "Example Author");
        // defaults survive partial sections
        assert_eq!(config.deploy.local_branch, "output");
        assert_eq!(config.deploy.message, "Generated from sources");
    }

    #[test]
    fn test_deploy_config_defaults() {
        let config = test_parse_config("");

        assert_eq!(config.deploy.remote, "live");
        assert_eq!(config.deploy.branch, "master");
        assert_eq!(config.deploy.token_env, "GH_TOKEN");
        assert_eq!(config.deploy.on_existing_remote, RemotePolicy::Fail);
        assert!(config.deploy.token.is_empty());
    }

    #[test]
    fn test_deploy_unknown_field_detected() {
        let (_, ignored) = SiteConfig::parse_with_ignored("[deploy]\nforce = true").unwrap();
        assert!(ignored.iter().any(|f| f.contains("force")));
    }

    #[test]
    fn test_token_from_env() {
        let mut deploy = DeployConfig::default();
        deploy.resolve_token(|key| (key == "GH_TOKEN").then(|| " abc123\n".to_string()));
        assert_eq!(deploy.token.expose(), "abc123");
    }

    #[test]
    fn test_token_from_file_when_env_missing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "from-file").unwrap();

        let mut deploy = DeployConfig {
            token_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        deploy.resolve_token(|_| None);
        assert_eq!(deploy.token.expose(), "from-file");
    }

    #[test]
    fn test_token_env_wins_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "from-file").unwrap();

        let mut deploy = DeployConfig {
            token_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        deploy.resolve_token(|_| Some("from-env".into()));
        assert_eq!(deploy.token.expose(), "from-env");
    }

    #[test]
    fn test_token_absent_is_empty() {
        let mut deploy = DeployConfig {
            token_path: Some("/definitely/not/here".into()),
            ..Default::default()
        };
        deploy.resolve_token(|_| None);
        assert!(deploy.token.is_empty());
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = Secret::new("hunter2");
        assert_eq!(format!("{secret:?}"), "Secret(***)");
        let config = DeployConfig {
            token: secret,
            ..Default::default()
        };
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn test_validate_complete_config() {
        let mut config = test_parse_config(FULL);
        config.deploy.token = Secret::new("t");
        let mut diag = ConfigDiagnostics::new();
        config.deploy.validate(&mut diag);
        assert!(diag.is_empty(), "{diag}");
    }

    #[test]
    fn test_validate_reports_every_missing_field() {
        let config = test_parse_config("[deploy]\nurl = \"https://github.com/a/b\"");
        let mut diag = ConfigDiagnostics::new();
        config.deploy.validate(&mut diag);

        let fields: Vec<_> = diag.errors().iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            [
                "deploy.site_url",
                "deploy.author.name",
                "deploy.author.email",
                "deploy.token_env"
            ]
        );
    }

    #[test]
    fn test_validate_ssh_needs_no_token() {
        let mut config = test_parse_config(FULL);
        config.deploy.url = "git@github.com:example/example.github.io.git".into();
        let mut diag = ConfigDiagnostics::new();
        config.deploy.validate(&mut diag);
        assert!(diag.is_empty(), "{diag}");
    }
}
