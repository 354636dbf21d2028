//! Public key installation on the remote host.
//!
//! Prefers the standard `ssh-copy-id` helper when it is available locally;
//! otherwise appends the key manually with a remote command. On the manual
//! path the key text is transmitted over the child's standard input, never
//! interpolated into the command string, so key content cannot break the
//! remote command's quoting.

use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{debug, info};

use crate::keys::{KeyPair, KeyStoreError};

use super::runner::RemoteShell;
use super::target::Target;

/// Remote command for the manual install path.
///
/// The public key line arrives on stdin via `cat`.
const MANUAL_INSTALL_COMMAND: &str =
    "mkdir -p ~/.ssh && chmod 700 ~/.ssh && cat >> ~/.ssh/authorized_keys \
     && chmod 600 ~/.ssh/authorized_keys";

/// Errors from key installation.
///
/// The negotiator treats these as warnings: installation side effects may
/// have landed despite a reported failure, so verification still follows.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The local public key could not be read.
    #[error("Cannot read public key: {0}")]
    PublicKey(#[from] KeyStoreError),

    /// The install subprocess could not be started or piped.
    #[error("Failed to run install command: {0}")]
    Io(#[from] std::io::Error),

    /// The install command ran and reported failure.
    #[error("Key installation command exited with failure")]
    CommandFailed,
}

/// Appends a public key to the remote authorized-keys store.
pub trait KeyInstaller {
    /// Installs the public half of `keys` for `target`.
    fn install(&self, target: &Target, keys: &KeyPair) -> Result<(), InstallError>;
}

/// Installer backed by `ssh-copy-id` with a manual fallback.
#[derive(Debug)]
pub struct OpenSshInstaller<'a, S: RemoteShell> {
    shell: &'a S,
    use_copy_id: bool,
}

impl<'a, S: RemoteShell> OpenSshInstaller<'a, S> {
    /// Creates an installer, probing for `ssh-copy-id` on the local
    /// system.
    #[must_use]
    pub fn new(shell: &'a S) -> Self {
        let use_copy_id = is_copy_id_available();
        debug!("ssh-copy-id available: {}", use_copy_id);
        Self { shell, use_copy_id }
    }

    /// Creates an installer that always uses the manual path.
    #[must_use]
    pub fn manual(shell: &'a S) -> Self {
        Self {
            shell,
            use_copy_id: false,
        }
    }

    /// Runs ssh-copy-id interactively; the user may be asked for a
    /// password.
    fn install_with_copy_id(target: &Target, keys: &KeyPair) -> Result<(), InstallError> {
        info!("Installing public key with ssh-copy-id");

        let status = Command::new("ssh-copy-id")
            .arg("-i")
            .arg(keys.public())
            .arg(target.destination())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(InstallError::CommandFailed)
        }
    }

    /// Appends the key with a remote command, feeding the key line over
    /// stdin.
    fn install_manually(&self, target: &Target, keys: &KeyPair) -> Result<(), InstallError> {
        info!("ssh-copy-id not available, appending key manually");

        let mut payload = keys.read_public_line()?;
        payload.push('\n');

        let ok = self
            .shell
            .run_with_input(target, MANUAL_INSTALL_COMMAND, &payload)?;

        if ok { Ok(()) } else { Err(InstallError::CommandFailed) }
    }
}

impl<S: RemoteShell> KeyInstaller for OpenSshInstaller<'_, S> {
    fn install(&self, target: &Target, keys: &KeyPair) -> Result<(), InstallError> {
        if self.use_copy_id {
            Self::install_with_copy_id(target, keys)
        } else {
            self.install_manually(target, keys)
        }
    }
}

/// Checks if ssh-copy-id can be spawned on this system.
fn is_copy_id_available() -> bool {
    Command::new("ssh-copy-id")
        .arg("-h")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}
