//! Command-line interface module.
//!
//! One submodule per task family; every task takes the loaded
//! [`SiteConfig`](crate::config::SiteConfig) and a [`Host`](crate::utils::host::Host).

mod args;
pub mod build;
pub mod deploy;
pub mod serve;
pub mod workspace;

pub use args::{Cli, Commands, ServeArgs};
