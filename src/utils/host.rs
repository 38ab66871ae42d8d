//! The boundary between task logic and the outside world.
//!
//! Every externally observable effect of a task is an [`Action`] handed to a
//! [`Host`]. Tasks never touch the filesystem or spawn processes directly,
//! which keeps their ordering observable:
//!
//! - [`SystemHost`]: performs actions for real
//! - [`DryRunHost`]: prints actions, performs nothing
//! - `testing::RecordingHost`: records actions, fails on demand (tests only)

use crate::{debug, log, utils::exec::Cmd, utils::path::move_dir_contents};
use anyhow::{Context, Result};
use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

/// One externally observable effect.
#[derive(Debug, Clone)]
pub enum Action {
    /// Spawn a process and wait for it to exit successfully.
    Run(Cmd),
    /// Remove a directory tree. A missing directory is not an error.
    RemoveDirAll(PathBuf),
    /// Create a directory and its parents. An existing directory is not an error.
    CreateDirAll(PathBuf),
    /// Remove an empty directory.
    RemoveDir(PathBuf),
    /// Move every entry of `from` into `to`.
    MoveContents { from: PathBuf, to: PathBuf },
    /// Create or truncate a file with the given contents.
    WriteFile { path: PathBuf, contents: String },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run(cmd) => write!(f, "{cmd}"),
            Self::RemoveDirAll(path) => write!(f, "rm -rf {}", path.display()),
            Self::CreateDirAll(path) => write!(f, "mkdir -p {}", path.display()),
            Self::RemoveDir(path) => write!(f, "rmdir {}", path.display()),
            Self::MoveContents { from, to } => {
                write!(f, "mv {}/* {}", from.display(), to.display())
            }
            Self::WriteFile { path, contents } if contents.is_empty() => {
                write!(f, "touch {}", path.display())
            }
            Self::WriteFile { path, contents } => {
                write!(f, "write {} ({:?})", path.display(), contents)
            }
        }
    }
}

/// Performs actions.
pub trait Host {
    fn perform(&self, action: Action) -> Result<()>;
}

impl<H: Host + ?Sized> Host for &H {
    fn perform(&self, action: Action) -> Result<()> {
        (**self).perform(action)
    }
}

/// Executes actions against the real filesystem and process table.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl Host for SystemHost {
    fn perform(&self, action: Action) -> Result<()> {
        debug!("host"; "{action}");
        match action {
            Action::Run(cmd) => cmd.run().map(|_| ()),
            Action::RemoveDirAll(path) => match fs::remove_dir_all(&path) {
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                other => other.with_context(|| format!("Failed to remove {}", path.display())),
            },
            Action::CreateDirAll(path) => fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create {}", path.display())),
            Action::RemoveDir(path) => fs::remove_dir(&path)
                .with_context(|| format!("Failed to remove directory {}", path.display())),
            Action::MoveContents { from, to } => move_dir_contents(&from, &to),
            Action::WriteFile { path, contents } => write_file(&path, &contents),
        }
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

/// Prints every action instead of performing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunHost;

impl Host for DryRunHost {
    fn perform(&self, action: Action) -> Result<()> {
        match &action {
            Action::Run(cmd) => match cmd.dir() {
                Some(dir) => log!("dry-run"; "(in {}) {}", dir.display(), cmd),
                None => log!("dry-run"; "{}", cmd),
            },
            other => log!("dry-run"; "{}", other),
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    //! Test double recording every action it is asked to perform.

    use super::*;
    use anyhow::bail;
    use std::cell::RefCell;

    /// Records actions; optionally fails actions matching a predicate.
    ///
    /// Filesystem actions are only recorded, never performed.
    #[derive(Default)]
    pub struct RecordingHost {
        actions: RefCell<Vec<Action>>,
        fail_when: Option<Box<dyn Fn(&Action) -> bool>>,
    }

    impl RecordingHost {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail every action for which `predicate` holds.
        pub fn failing_when(predicate: impl Fn(&Action) -> bool + 'static) -> Self {
            Self {
                actions: RefCell::default(),
                fail_when: Some(Box::new(predicate)),
            }
        }

        /// Fail the action at position `index` (0-based).
        pub fn failing_at(index: usize) -> Self {
            let seen = std::cell::Cell::new(0usize);
            Self::failing_when(move |_| {
                let n = seen.get();
                seen.set(n + 1);
                n == index
            })
        }

        /// All recorded actions, including the failing one.
        pub fn actions(&self) -> Vec<Action> {
            self.actions.borrow().clone()
        }

        /// Recorded actions rendered one per line, for sequence assertions.
        pub fn lines(&self) -> Vec<String> {
            self.actions.borrow().iter().map(render).collect()
        }
    }

    impl Host for RecordingHost {
        fn perform(&self, action: Action) -> Result<()> {
            let fail = self.fail_when.as_ref().is_some_and(|f| f(&action));
            let line = render(&action);
            self.actions.borrow_mut().push(action);
            if fail {
                bail!("simulated failure: {line}");
            }
            Ok(())
        }
    }

    /// Render an action without secret redaction so tests see real arguments.
    pub fn render(action: &Action) -> String {
        match action {
            Action::Run(cmd) => cmd.argv().join(" "),
            other => other.to_string(),
        }
    }
}
