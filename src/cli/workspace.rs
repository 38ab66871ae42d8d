//! Output and content directory preparation.

use crate::{
    config::SiteConfig,
    debug, log,
    utils::host::{Action, Host},
};
use anyhow::Result;

/// Remove the output directory and recreate it empty.
///
/// Safe on every prior state: a missing directory is simply created.
pub fn clean(config: &SiteConfig, host: &dyn Host) -> Result<()> {
    let output = config.output_dir();
    host.perform(Action::RemoveDirAll(output.clone()))?;
    host.perform(Action::CreateDirAll(output.clone()))?;
    log!("clean"; "{}", config.build.output.display());
    Ok(())
}

/// Create the content directory when it is missing.
///
/// The generator refuses to run without its input path.
pub fn ensure_content_dir(config: &SiteConfig, host: &dyn Host) -> Result<()> {
    let content = config.content_dir();
    debug!("build"; "ensuring {}", content.display());
    host.perform(Action::CreateDirAll(content))
}
