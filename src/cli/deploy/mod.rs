//! Publishing the built site to the hosting branch.
//!
//! The working tree is turned into a history-less branch holding only the
//! generated site, which is then force-pushed over the remote branch:
//!
//! ```text
//! remote add → identity → checkout --orphan → rm --cached → add -f output
//!   → clean -dfx → hoist output/* → .nojekyll → CNAME → add --all
//!   → commit → push -f
//! ```
//!
//! The first failing action aborts the run. Nothing is rolled back. A failure
//! before the orphan checkout leaves the original branch untouched; after it,
//! the working tree stays on the orphan branch in whatever state the last
//! successful step left it, and the original branch has to be restored by
//! hand (`git checkout -f <branch>`) before deploying again. Never run two
//! deploys against the same working tree.

mod remote;
mod step;

use remote::authenticated_url;
use step::{DeployStep, Deployment};

use crate::{config::SiteConfig, debug, log, utils::host::Host};
use anyhow::{Context, Result, bail};

/// Run the full publish sequence.
///
/// Configuration is validated before the first action, so a missing token or
/// author never leaves a half-prepared branch behind.
pub fn deploy(config: &SiteConfig, host: &dyn Host) -> Result<()> {
    config.validate_for_deploy()?;

    let deployment = Deployment::new(config, authenticated_url(&config.deploy)?);
    let total = DeployStep::ALL.len();

    for (index, step) in DeployStep::ALL.into_iter().enumerate() {
        log!("deploy"; "[{}/{}] {}", index + 1, total, step);
        run_step(&deployment, step, host).with_context(|| {
            format!(
                "deploy step {}/{} ({}) failed; {}",
                index + 1,
                total,
                step,
                recovery_state(config, step)
            )
        })?;
    }

    log!(
        "deploy";
        "published {} to {}/{}",
        config.deploy.site_url,
        config.deploy.remote,
        config.deploy.branch
    );
    Ok(())
}

/// Where a failure at `step` leaves the working tree.
fn recovery_state(config: &SiteConfig, step: DeployStep) -> String {
    if step.leaves_orphan_branch() {
        format!("working tree left on branch `{}`", config.deploy.local_branch)
    } else {
        "working tree still on the original branch".to_string()
    }
}

fn run_step(deployment: &Deployment<'_>, step: DeployStep, host: &dyn Host) -> Result<()> {
    for planned in deployment.actions(step) {
        if planned.optional {
            if let Err(e) = host.perform(planned.action) {
                debug!("deploy"; "ignored: {:#}", e);
            }
        } else {
            host.perform(planned.action)?;
        }
    }
    Ok(())
}

/// Check the build output exists before handing over to [`deploy`].
pub fn ensure_built(config: &SiteConfig) -> Result<()> {
    let output = config.output_dir();
    let has_entries = output
        .read_dir()
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false);

    if !has_entries {
        bail!(
            "{} is missing or empty; run `blogops build` first (or `deploy --build`)",
            output.display()
        );
    }
    Ok(())
}
