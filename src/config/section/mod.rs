//! Configuration sections of `blogops.toml`.

mod build;
mod deploy;
mod serve;

pub use build::{BuildConfig, Profile};
pub use deploy::{AuthorConfig, DeployConfig, RemotePolicy, Secret};
pub use serve::ServeConfig;
