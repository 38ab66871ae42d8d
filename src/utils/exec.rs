//! External command execution.
//!
//! `Cmd` is a plain value describing one process invocation: program,
//! argument list, working directory and how its output is handled. Arguments
//! are always passed as a list, never through a shell, so configuration
//! values such as the site URL or a token cannot inject commands.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! // Captured output, logged on success
//! Cmd::new("git").args(["status", "-s"]).cwd(root).run()?;
//!
//! // Terminal-like output (progress bars, credential prompts)
//! Cmd::new("git").args(["push", "-f", "live", "output:master"]).pty(true).run()?;
//!
//! // Long-running, stdio handed to the child
//! Cmd::new("pelican").args(["-r", "-s", "conf.py"]).inherit(true).run()?;
//! ```

use crate::{config::ConfigError, log};
use anyhow::{Context, Result};
use portable_pty::{CommandBuilder, NativePtySystem, PtySize, PtySystem};
use regex::Regex;
use std::{
    env,
    ffi::{OsStr, OsString},
    fmt,
    io::Read,
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
    sync::OnceLock,
};

/// Placeholder shown instead of secret argument fragments.
const REDACTED: &str = "***";

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Clone, Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    secrets: Vec<String>,
    use_pty: bool,
    inherit: bool,
    filter: Option<&'static FilterRule>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Create from a command array (e.g., `["pelican"]` or `["python", "-m", "pelican"]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter();
        let program = iter
            .next()
            .map(|s| s.as_ref().to_owned())
            .unwrap_or_default();
        let args: Vec<_> = iter.map(|s| s.as_ref().to_owned()).collect();
        Self {
            program,
            args,
            ..Default::default()
        }
    }

    /// Add a single argument. Empty arguments are dropped.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments. Empty arguments are dropped.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            let arg = arg.as_ref();
            if !arg.is_empty() {
                self.args.push(arg.to_owned());
            }
        }
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Mark a fragment that must never be printed (tokens, passwords).
    ///
    /// Every occurrence inside the displayed command line and inside
    /// captured output is replaced with `***`.
    pub fn secret<S: Into<String>>(mut self, secret: S) -> Self {
        let secret = secret.into();
        if !secret.is_empty() {
            self.secrets.push(secret);
        }
        self
    }

    /// Enable PTY (pseudo-terminal) mode.
    ///
    /// PTY allows commands to behave as if running in a real terminal,
    /// enabling colored output, progress bars, etc.
    pub fn pty(mut self, enable: bool) -> Self {
        self.use_pty = enable;
        self
    }

    /// Hand the parent's stdio to the child and wait for it to exit.
    ///
    /// Used for long-running commands whose output must stream live.
    pub fn inherit(mut self, enable: bool) -> Self {
        self.inherit = enable;
        self
    }

    /// Set output filter for logging.
    pub fn filter(mut self, filter: &'static FilterRule) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Working directory, if set.
    pub fn dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Program followed by its arguments, lossily converted to strings.
    ///
    /// Secrets are *not* redacted here; use `Display` for anything printed.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }

    /// Execute the command and return output.
    ///
    /// A program that cannot be found is reported as
    /// [`ConfigError::MissingTool`] before anything is spawned.
    pub fn run(&self) -> Result<Output> {
        let program = self.locate()?;
        let filter = self.filter.unwrap_or(&EMPTY_FILTER);

        if self.inherit {
            self.run_inherited(&program)
        } else if self.use_pty {
            self.run_with_pty(&program, filter)
        } else {
            self.run_simple(&program, filter)
        }
    }

    /// Resolve the program to an executable path.
    ///
    /// Plain names are looked up on `PATH`; names with a path separator
    /// (`.venv/bin/pelican`) are relative to the working directory set with
    /// [`Cmd::cwd`], not to the directory `blogops` was started from.
    fn locate(&self) -> Result<PathBuf, ConfigError> {
        let found = match &self.cwd {
            Some(dir) => which::which_in(&self.program, env::var_os("PATH"), dir),
            None => which::which(&self.program),
        };
        found.map_err(|_| ConfigError::MissingTool(self.program_name()))
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self
            .argv()
            .iter()
            .map(|arg| quote_arg(arg))
            .collect::<Vec<_>>()
            .join(" ");
        f.write_str(&self.redact(&line))
    }
}

impl fmt::Debug for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cmd")
            .field("line", &self.to_string())
            .field("cwd", &self.cwd)
            .field("pty", &self.use_pty)
            .field("inherit", &self.inherit)
            .finish()
    }
}

impl Cmd {
    /// Get the program name for error messages.
    fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Replace every secret fragment in `text`.
    fn redact(&self, text: &str) -> String {
        self.secrets
            .iter()
            .fold(text.to_owned(), |acc, secret| acc.replace(secret, REDACTED))
    }

    fn command(&self, program: &Path) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Captured execution; stderr is logged through the filter on success.
    fn run_simple(&self, program: &Path, filter: &'static FilterRule) -> Result<Output> {
        let name = self.program_name();
        let output = self
            .command(program)
            .output()
            .with_context(|| format!("Failed to execute `{}`", self))?;

        if !output.status.success() {
            anyhow::bail!(self.redact(&format_error(&self.to_string(), &output, filter)));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        filter.log(&name, &self.redact(stderr.trim()));
        Ok(output)
    }

    /// Execution with inherited stdio (blocks until the child exits).
    fn run_inherited(&self, program: &Path) -> Result<Output> {
        let status = self
            .command(program)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to execute `{}`", self))?;

        if !status.success() {
            anyhow::bail!("Command `{}` failed with {}", self, status);
        }

        Ok(Output {
            status,
            stdout: Vec::new(),
            stderr: Vec::new(),
        })
    }

    /// Execution with PTY support.
    ///
    /// PTY allows commands to behave as if running in a real terminal,
    /// enabling colored output, progress bars, credential prompts, etc.
    fn run_with_pty(&self, program: &Path, filter: &'static FilterRule) -> Result<Output> {
        let name = self.program_name();

        let mut cmd_builder = CommandBuilder::new(program);
        cmd_builder.args(&self.args);

        if let Some(dir) = &self.cwd {
            cmd_builder.cwd(dir);
        }

        let pty_system = NativePtySystem::default();
        let pair = pty_system.openpty(PtySize {
            rows: 24,
            cols: 80,
            pixel_width: 0,
            pixel_height: 0,
        })?;

        let mut child = pair
            .slave
            .spawn_command(cmd_builder)
            .with_context(|| format!("Failed to spawn `{}`", self))?;
        drop(pair.slave);

        // Read output in separate thread (PTY blocks until EOF)
        let mut reader = pair.master.try_clone_reader()?;
        let output_handle = std::thread::spawn(move || {
            let mut output = String::new();
            let _ = reader.read_to_string(&mut output);
            output
        });

        let status = child.wait()?;
        drop(pair.master);

        let output_str = output_handle
            .join()
            .map_err(|_| anyhow::anyhow!("Failed to join output reader thread"))?;
        let output_str = self.redact(&output_str);

        if !status.success() {
            anyhow::bail!(
                "Command `{}` failed with exit code {}\n{}",
                self,
                status.exit_code(),
                output_str.trim()
            );
        }

        filter.log(&name, &output_str);

        #[cfg(unix)]
        #[allow(clippy::cast_possible_wrap)]
        let std_status = {
            use std::os::unix::process::ExitStatusExt;
            std::process::ExitStatus::from_raw((status.exit_code() as i32) << 8)
        };
        #[cfg(windows)]
        let std_status = {
            use std::os::windows::process::ExitStatusExt;
            std::process::ExitStatus::from_raw(status.exit_code())
        };

        Ok(Output {
            status: std_status,
            stdout: output_str.into_bytes(),
            stderr: Vec::new(),
        })
    }
}

// ============================================================================
// Output Filtering
// ============================================================================

/// Filter rule for command output logging.
///
/// Used to reduce noise by skipping known warnings or irrelevant messages.
pub struct FilterRule {
    /// Prefixes to skip when logging output.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    /// Create a new filter rule.
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    /// Check if a line should be skipped.
    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Log output lines that pass the filter.
    pub fn log(&self, name: &str, output: &str) {
        let lines: Vec<_> = output
            .lines()
            .filter(|line| {
                let plain = strip_ansi(line);
                let trimmed = plain.trim();
                !trimmed.is_empty() && !self.should_skip(trimmed)
            })
            .collect();

        if !lines.is_empty() {
            log!(name; "{}", lines.join("\n"));
        }
    }
}

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

/// Git chatter that carries no information on success.
pub const GIT_FILTER: FilterRule = FilterRule::new(&[
    "Switched to a new branch",
    "hint:",
    "To ",
    "rm '",
]);

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid ANSI regex"));
    re.replace_all(s, "")
}

/// Quote an argument for display when it contains whitespace or quotes.
fn quote_arg(arg: &str) -> String {
    if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
        format!("'{}'", arg.replace('\'', r"'\''"))
    } else {
        arg.to_owned()
    }
}

/// Format error message for failed command.
fn format_error(line: &str, output: &Output, filter: &'static FilterRule) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let error_msg = filter
        .skip_prefixes
        .iter()
        .filter(|p| !p.is_empty())
        .fold(stderr.trim(), |s, p| s.trim_start_matches(p).trim_start());

    let mut msg = format!("Command `{line}` failed with {}\n", output.status);
    if !error_msg.is_empty() {
        msg.push_str(error_msg);
    }

    let stdout_trimmed = stdout.trim();
    if !stdout_trimmed.is_empty() {
        msg.push_str("\nStdout:\n");
        msg.push_str(stdout_trimmed);
    }
    msg
}


// ============================================================================
// Tests
// ============================================================================
