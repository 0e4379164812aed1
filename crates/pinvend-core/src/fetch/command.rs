//! External client invocations.
//!
//! Every clone and reset is described up front as a [`PlannedCommand`] with
//! an explicit argument vector. Nothing goes through a shell, so dependency
//! names and revisions are never interpolated into a command string.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{Result, VendorError};
use crate::spec::{VcsKind, VendorSpec};

use super::FetcherConfig;

/// Environment variables that would redirect git away from the target checkout.
const GIT_ENV_OVERRIDES: [&str; 4] = [
    "GIT_DIR",
    "GIT_WORK_TREE",
    "GIT_INDEX_FILE",
    "GIT_COMMON_DIR",
];

/// Pipeline step a command moves the fetch into once it succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandRole {
    /// Repository contents downloaded, working tree not yet at the pinned revision.
    Clone,
    /// Working tree reset to the pinned revision.
    Pin,
    /// Clone that checks out the pinned revision in the same step.
    CloneAtRevision,
}

/// A single client invocation with its arguments resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCommand {
    pub kind: VcsKind,
    pub role: CommandRole,
    pub program: OsString,
    pub args: Vec<OsString>,
    /// Working directory, if the command must run inside the checkout.
    pub cwd: Option<PathBuf>,
}

impl PlannedCommand {
    fn new(kind: VcsKind, role: CommandRole, program: &Path) -> Self {
        Self {
            kind,
            role,
            program: program.as_os_str().to_os_string(),
            args: Vec::new(),
            cwd: None,
        }
    }

    fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    /// Run the command to completion, failing on a non-zero exit status.
    pub fn run(&self) -> Result<()> {
        let rendered = self.to_string();
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        match self.kind {
            VcsKind::Git => {
                for key in GIT_ENV_OVERRIDES {
                    cmd.env_remove(key);
                }
                cmd.env("GIT_TERMINAL_PROMPT", "0");
            }
            VcsKind::Hg => {
                cmd.env("HGPLAIN", "1");
            }
        }

        debug!(command = %rendered, "running");

        let output = cmd.output().map_err(|source| VendorError::Spawn {
            command: rendered.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(VendorError::CommandFailed {
                command: rendered,
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(())
    }
}

impl fmt::Display for PlannedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Build the client invocations that materialise `spec` in its target directory.
pub fn plan(spec: &VendorSpec, config: &FetcherConfig) -> Result<Vec<PlannedCommand>> {
    spec.validate()?;
    let url = spec.clone_url(&config.url_prefix)?;
    let target = spec.target_dir(&config.vendor_root);

    let commands = match spec.kind {
        VcsKind::Git => vec![
            PlannedCommand::new(VcsKind::Git, CommandRole::Clone, &config.git_program)
                .arg("clone")
                .arg("--quiet")
                .arg("--no-checkout")
                .arg(url.as_str())
                .arg(&target),
            PlannedCommand::new(VcsKind::Git, CommandRole::Pin, &config.git_program)
                .arg("reset")
                .arg("--quiet")
                .arg("--hard")
                .arg(&spec.reference)
                .current_dir(&target),
        ],
        VcsKind::Hg => vec![
            PlannedCommand::new(VcsKind::Hg, CommandRole::CloneAtRevision, &config.hg_program)
                .arg("--noninteractive")
                .arg("clone")
                .arg("--quiet")
                .arg("--updaterev")
                .arg(&spec.reference)
                .arg(url.as_str())
                .arg(&target),
        ],
    };

    Ok(commands)
}
