//! Generator invocation.
//!
//! All rendering happens in the external generator; these tasks only decide
//! which settings file it gets and in which order things run:
//!
//! - `build`      ensure content dir, generate with the production settings
//! - `preview`    same with the development settings
//! - `rebuild`    `clean`, then `build`
//! - `regenerate` generator watch mode (`-r`), blocks until interrupted

use super::workspace::{clean, ensure_content_dir};
use crate::{
    config::{Profile, SiteConfig},
    log,
    utils::{
        exec::Cmd,
        host::{Action, Host},
    },
};
use anyhow::{Context, Result};

/// Generator command for a profile.
///
/// Runs in the project root so relative settings paths resolve the same way
/// they do when the generator is started by hand.
pub fn generator_cmd(config: &SiteConfig, profile: Profile, watch: bool) -> Cmd {
    let watch_flag = if watch { "-r" } else { "" };
    Cmd::from_slice(&config.build.generator)
        .arg(watch_flag)
        .arg("-s")
        .arg(config.build.settings(profile))
        .cwd(&config.root)
}

/// Generate the site with the given settings profile.
pub fn build(config: &SiteConfig, host: &dyn Host, profile: Profile) -> Result<()> {
    ensure_content_dir(config, host)?;

    log!("build"; "{} ({})", config.build.output.display(), profile.name());
    host.perform(Action::Run(generator_cmd(config, profile, false)))
        .with_context(|| format!("{} build failed", profile.name()))
}

/// Clean the output directory, then build for production.
pub fn rebuild(config: &SiteConfig, host: &dyn Host) -> Result<()> {
    clean(config, host)?;
    build(config, host, Profile::Production)
}

/// Run the generator in watch mode with the production settings.
///
/// Output streams straight to the terminal; returns once the generator
/// exits (normally through Ctrl+C).
pub fn regenerate(config: &SiteConfig, host: &dyn Host) -> Result<()> {
    ensure_content_dir(config, host)?;

    log!("build"; "watching {} (Ctrl+C to stop)", config.build.content.display());
    let cmd = generator_cmd(config, Profile::Production, true).inherit(true);
    host.perform(Action::Run(cmd))
}

/// Build with the development settings.
pub fn preview(config: &SiteConfig, host: &dyn Host) -> Result<()> {
    build(config, host, Profile::Development)
}
