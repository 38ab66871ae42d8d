//! The publish sequence, one variant per externally observable step.

use super::remote::RemoteUrl;
use crate::{
    config::{RemotePolicy, SiteConfig},
    utils::{
        exec::{Cmd, GIT_FILTER},
        host::Action,
    },
};
use std::{ffi::OsStr, fmt};

/// Marker that turns off Jekyll processing on GitHub Pages.
pub const HOSTING_MARKER: &str = ".nojekyll";

/// Custom-domain marker; holds the site URL.
pub const DOMAIN_MARKER: &str = "CNAME";

/// Deploy steps in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStep {
    RegisterRemote,
    SetIdentity,
    OrphanCheckout,
    UnstageAll,
    StageOutput,
    CleanUntracked,
    HoistOutput,
    WriteHostingMarker,
    StageHostingMarker,
    WriteDomainMarker,
    StageAll,
    Commit,
    ForcePush,
}

impl DeployStep {
    pub const ALL: [Self; 13] = [
        Self::RegisterRemote,
        Self::SetIdentity,
        Self::OrphanCheckout,
        Self::UnstageAll,
        Self::StageOutput,
        Self::CleanUntracked,
        Self::HoistOutput,
        Self::WriteHostingMarker,
        Self::StageHostingMarker,
        Self::WriteDomainMarker,
        Self::StageAll,
        Self::Commit,
        Self::ForcePush,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::RegisterRemote => "register remote",
            Self::SetIdentity => "set commit identity",
            Self::OrphanCheckout => "create orphan branch",
            Self::UnstageAll => "unstage tracked files",
            Self::StageOutput => "stage output directory",
            Self::CleanUntracked => "remove untracked files",
            Self::HoistOutput => "move output to repository root",
            Self::WriteHostingMarker => "write hosting marker",
            Self::StageHostingMarker => "stage hosting marker",
            Self::WriteDomainMarker => "write domain marker",
            Self::StageAll => "stage all files",
            Self::Commit => "commit",
            Self::ForcePush => "force push",
        }
    }

    /// Whether the working tree is on the orphan branch once this step fails.
    ///
    /// A failed `checkout --orphan` leaves the original branch in place.
    pub fn leaves_orphan_branch(self) -> bool {
        !matches!(self, Self::RegisterRemote | Self::SetIdentity | Self::OrphanCheckout)
    }
}

impl fmt::Display for DeployStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An action within a step; optional actions may fail without aborting.
#[derive(Debug, Clone)]
pub struct Planned {
    pub action: Action,
    pub optional: bool,
}

impl Planned {
    fn required(action: Action) -> Self {
        Self {
            action,
            optional: false,
        }
    }

    fn optional(action: Action) -> Self {
        Self {
            action,
            optional: true,
        }
    }
}

/// Everything a deploy needs, resolved up front.
pub struct Deployment<'a> {
    config: &'a SiteConfig,
    remote: RemoteUrl,
}

impl<'a> Deployment<'a> {
    pub fn new(config: &'a SiteConfig, remote: RemoteUrl) -> Self {
        Self { config, remote }
    }

    /// `git <args>` in the project root, redacting credentials.
    fn git<I, S>(&self, args: I) -> Cmd
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.remote
            .secrets
            .iter()
            .fold(Cmd::new("git"), |cmd, secret| cmd.secret(secret.as_str()))
            .args(args)
            .cwd(&self.config.root)
            .filter(&GIT_FILTER)
    }

    fn run<I, S>(&self, args: I) -> Planned
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Planned::required(Action::Run(self.git(args)))
    }

    /// Actions performed by a step, in order.
    pub fn actions(&self, step: DeployStep) -> Vec<Planned> {
        let config = self.config;
        let deploy = &config.deploy;
        let root = &config.root;
        let output = config.build.output.as_os_str();

        match step {
            DeployStep::RegisterRemote => {
                let add = self.run([
                    "remote",
                    "add",
                    deploy.remote.as_str(),
                    self.remote.url.as_str(),
                ]);
                match deploy.on_existing_remote {
                    RemotePolicy::Fail => vec![add],
                    RemotePolicy::Replace => vec![
                        Planned::optional(Action::Run(
                            self.git(["remote", "remove", deploy.remote.as_str()]),
                        )),
                        add,
                    ],
                }
            }
            DeployStep::SetIdentity => vec![
                self.run(["config", "user.name", deploy.author.name.as_str()]),
                self.run(["config", "user.email", deploy.author.email.as_str()]),
            ],
            DeployStep::OrphanCheckout => {
                vec![self.run(["checkout", "--orphan", deploy.local_branch.as_str()])]
            }
            DeployStep::UnstageAll => vec![self.run(["rm", "-r", "-f", "-q", "--cached", "."])],
            // forced: the output directory is usually ignored on the source branch
            DeployStep::StageOutput => {
                vec![self.run([OsStr::new("add"), OsStr::new("-f"), output])]
            }
            DeployStep::CleanUntracked => vec![self.run(["clean", "-d", "-f", "-x", "-q"])],
            DeployStep::HoistOutput => vec![
                Planned::required(Action::MoveContents {
                    from: config.output_dir(),
                    to: root.clone(),
                }),
                Planned::required(Action::RemoveDir(config.output_dir())),
            ],
            DeployStep::WriteHostingMarker => vec![Planned::required(Action::WriteFile {
                path: root.join(HOSTING_MARKER),
                contents: String::new(),
            })],
            DeployStep::StageHostingMarker => vec![self.run(["add", HOSTING_MARKER])],
            DeployStep::WriteDomainMarker => vec![Planned::required(Action::WriteFile {
                path: root.join(DOMAIN_MARKER),
                contents: domain_marker(&deploy.site_url),
            })],
            // --all also records the removal of the hoisted output/ paths
            DeployStep::StageAll => vec![self.run(["add", "--all"])],
            DeployStep::Commit => {
                vec![self.run(["commit", "-q", "-m", deploy.message.as_str()])]
            }
            DeployStep::ForcePush => {
                let refspec = format!("{}:{}", deploy.local_branch, deploy.branch);
                vec![Planned::required(Action::Run(
                    self.git(["push", "-f", deploy.remote.as_str(), refspec.as_str()])
                        .pty(true),
                ))]
            }
        }
    }
}

/// `CNAME` contents: the site URL and exactly one trailing newline.
pub fn domain_marker(site_url: &str) -> String {
    format!("{}\n", site_url.trim())
}
