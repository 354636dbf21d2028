//! OpenSSH subprocess runner.
//!
//! Drives the system `ssh` binary for verification attempts, the manual
//! key push, and the final interactive session. Only exit statuses are
//! inspected; verification attempts capture no output.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use tracing::{debug, warn};

use super::options::{self, ConnectMode, VERIFY_COMMAND};
use super::target::Target;

/// Remote command execution seam used by the negotiator and installer.
///
/// Implementations run one blocking command at a time against a target and
/// report success or failure; no output is captured.
pub trait RemoteShell {
    /// Runs the diagnostic command with the given option bundle.
    ///
    /// Returns true only on a zero exit status. Spawn failures are treated
    /// as verification failures, never surfaced as errors. Must not mutate
    /// local or remote state.
    fn verify(&self, target: &Target, mode: ConnectMode) -> bool;

    /// Runs `command` on the target with the key-push option bundle,
    /// writing `input` to the remote command's standard input.
    ///
    /// Returns true on a zero exit status, false otherwise.
    fn run_with_input(&self, target: &Target, command: &str, input: &str) -> std::io::Result<bool>;
}

/// The system OpenSSH client.
#[derive(Debug, Clone)]
pub struct OpenSsh {
    ssh_path: PathBuf,
}

impl OpenSsh {
    /// Creates a runner using the platform's ssh binary.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ssh_path: find_ssh_path(),
        }
    }

    /// Opens the final interactive session, inheriting the terminal.
    ///
    /// Blocks until the user's session ends. The exit status is returned
    /// for logging but does not affect the caller's exit code.
    pub fn interactive(&self, target: &Target) -> std::io::Result<ExitStatus> {
        debug!("Starting interactive session with {}", target);

        Command::new(&self.ssh_path)
            .arg(target.destination())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
    }
}

impl Default for OpenSsh {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteShell for OpenSsh {
    fn verify(&self, target: &Target, mode: ConnectMode) -> bool {
        let mut cmd = Command::new(&self.ssh_path);

        for arg in mode.args() {
            cmd.arg(arg);
        }
        cmd.arg(target.destination());
        cmd.arg(VERIFY_COMMAND);

        // Non-interactive: no terminal, no output capture
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        debug!("Verification attempt ({}) for {}", mode.as_str(), target);

        match cmd.status() {
            Ok(status) => {
                debug!(
                    "Verification ({}) exit code: {:?}",
                    mode.as_str(),
                    status.code()
                );
                status.success()
            }
            Err(e) => {
                warn!("Failed to spawn ssh for verification: {}", e);
                false
            }
        }
    }

    fn run_with_input(&self, target: &Target, command: &str, input: &str) -> std::io::Result<bool> {
        let mut cmd = Command::new(&self.ssh_path);

        for arg in options::push_args() {
            cmd.arg(arg);
        }
        cmd.arg(target.destination());
        cmd.arg(command);

        // The payload goes over stdin; password prompts still reach the
        // user because ssh reads them from the controlling terminal.
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());

        debug!("Running remote command on {}: {}", target, command);

        let mut child = cmd.spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            // Reap the child even when the write fails (e.g. EPIPE after
            // an early remote exit) so no zombie lingers.
            if let Err(e) = stdin.write_all(input.as_bytes()) {
                drop(stdin);
                let _ = child.wait();
                return Err(e);
            }
        }
        let status = child.wait()?;

        debug!("Remote command exit code: {:?}", status.code());
        Ok(status.success())
    }
}

/// Finds the SSH executable path for the current platform.
fn find_ssh_path() -> PathBuf {
    #[cfg(windows)]
    {
        // Try Windows OpenSSH first
        let windows_ssh = PathBuf::from(r"C:\Windows\System32\OpenSSH\ssh.exe");
        if windows_ssh.exists() {
            return windows_ssh;
        }

        // Try Git Bash SSH
        let git_ssh = PathBuf::from(r"C:\Program Files\Git\usr\bin\ssh.exe");
        if git_ssh.exists() {
            return git_ssh;
        }

        // Fall back to PATH
        PathBuf::from("ssh")
    }

    #[cfg(not(windows))]
    {
        PathBuf::from("ssh")
    }
}
