//! Launching the native client (`cmdkey` + `mstsc`)

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{LaunchError, LaunchResult};

use super::RdpSettings;

const PASSWORD_ARG_PREFIX: &str = "/pass:";
const MASK: &str = "********";

/// A program invocation planned by the launcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCommand {
    /// Program name
    pub program: String,
    /// Arguments
    pub args: Vec<String>,
}

impl PlannedCommand {
    fn new(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
        }
    }

    /// Command line with the password argument masked, for logs and dry runs
    #[must_use]
    pub fn masked(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().map(|arg| {
            if arg.starts_with(PASSWORD_ARG_PREFIX) {
                format!("{PASSWORD_ARG_PREFIX}{MASK}")
            } else {
                arg.clone()
            }
        }));
        parts.join(" ")
    }
}

/// Executes external programs
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs a program to completion; a non-zero exit is an error
    async fn run(&self, command: &PlannedCommand) -> LaunchResult<()>;

    /// Starts a program without waiting for it
    async fn spawn(&self, command: &PlannedCommand) -> LaunchResult<()>;
}

/// Runs programs with `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, command: &PlannedCommand) -> LaunchResult<()> {
        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| LaunchError::CommandFailed {
                program: command.program.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LaunchError::CommandFailed {
                program: command.program.clone(),
                reason: format!("{}: {}", output.status, stderr.trim()),
            });
        }
        Ok(())
    }

    async fn spawn(&self, command: &PlannedCommand) -> LaunchResult<()> {
        Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(drop)
            .map_err(|e| LaunchError::CommandFailed {
                program: command.program.clone(),
                reason: e.to_string(),
            })
    }
}

/// Everything a launch would do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    /// Where the profile is written
    pub rdp_file: PathBuf,
    /// Profile contents
    pub payload: String,
    /// Removes any stale credential for the host; failure is ignored
    pub clear_credential: PlannedCommand,
    /// Registers the credential for the host
    pub store_credential: PlannedCommand,
    /// Starts the client
    pub start_client: PlannedCommand,
}

impl LaunchPlan {
    /// Planned commands in execution order
    #[must_use]
    pub fn commands(&self) -> [&PlannedCommand; 3] {
        [&self.clear_credential, &self.store_credential, &self.start_client]
    }
}

/// Result of [`RdpLauncher::launch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The client was started
    Launched {
        /// Profile that was written
        rdp_file: PathBuf,
    },
    /// Dry run; nothing was executed
    DryRun(LaunchPlan),
}

/// Starts native remote-desktop sessions
pub struct RdpLauncher {
    runner: Box<dyn CommandRunner>,
    temp_dir: PathBuf,
    platform: String,
    dry_run: bool,
}

impl std::fmt::Debug for RdpLauncher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RdpLauncher")
            .field("temp_dir", &self.temp_dir)
            .field("platform", &self.platform)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl Default for RdpLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl RdpLauncher {
    /// Creates a launcher for the current platform using the system temp dir
    #[must_use]
    pub fn new() -> Self {
        Self {
            runner: Box::new(SystemRunner),
            temp_dir: std::env::temp_dir(),
            platform: std::env::consts::OS.to_string(),
            dry_run: false,
        }
    }

    /// Replaces the program runner
    #[must_use]
    pub fn with_runner(mut self, runner: Box<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Writes profiles into `dir` instead of the system temp dir
    #[must_use]
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Overrides the detected platform name
    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Plans the launch without executing anything
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Returns true if launching is supported on this platform
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.platform == "windows"
    }

    /// Profile path for a host
    #[must_use]
    pub fn rdp_file_path(&self, hostname: &str) -> PathBuf {
        let safe: String = hostname
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
            .collect();
        self.temp_dir.join(format!("rdpman-{safe}.rdp"))
    }

    /// Builds the launch plan for a session
    #[must_use]
    pub fn plan(&self, settings: &RdpSettings, password: &str) -> LaunchPlan {
        let target = format!("TERMSRV/{}", settings.host());
        let rdp_file = self.rdp_file_path(settings.host());

        LaunchPlan {
            payload: settings.to_rdp_file(),
            clear_credential: PlannedCommand::new("cmdkey", vec![format!("/delete:{target}")]),
            store_credential: PlannedCommand::new(
                "cmdkey",
                vec![
                    format!("/generic:{target}"),
                    format!("/user:{}", settings.username),
                    format!("{PASSWORD_ARG_PREFIX}{password}"),
                ],
            ),
            start_client: PlannedCommand::new("mstsc", vec![path_arg(&rdp_file)]),
            rdp_file,
        }
    }

    /// Registers the credential and starts the client
    ///
    /// In dry-run mode the plan is returned and nothing is written or run.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedPlatform` off Windows, `Io` if the profile cannot be
    /// written, or `CommandFailed` if registering the credential or starting
    /// the client fails.
    pub async fn launch(&self, settings: &RdpSettings, password: &str) -> LaunchResult<LaunchOutcome> {
        let plan = self.plan(settings, password);
        if self.dry_run {
            tracing::debug!(host = %settings.host(), "Dry run, not launching");
            return Ok(LaunchOutcome::DryRun(plan));
        }

        if !self.is_supported() {
            return Err(LaunchError::UnsupportedPlatform(self.platform.clone()));
        }

        tokio::fs::write(&plan.rdp_file, plan.payload.as_bytes()).await?;
        tracing::debug!(path = %plan.rdp_file.display(), "Wrote RDP profile");

        if let Err(e) = self.runner.run(&plan.clear_credential).await {
            tracing::debug!(error = %e, "No stale credential removed");
        }
        self.runner.run(&plan.store_credential).await?;
        tracing::info!(command = %plan.store_credential.masked(), "Registered credential");

        self.runner.spawn(&plan.start_client).await?;
        tracing::info!(host = %settings.host(), "Started remote desktop client");

        Ok(LaunchOutcome::Launched {
            rdp_file: plan.rdp_file,
        })
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
