//! Local SSH keypair management.
//!
//! A keypair is a private/public file pair under the user's `.ssh`
//! directory. Generation happens only when both halves are missing and is
//! delegated to `ssh-keygen`; a half-present pair is an error rather than
//! something this tool cleans up.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{debug, info};

/// Key type and size passed to ssh-keygen.
const KEY_TYPE: &str = "rsa";
const KEY_BITS: &str = "4096";

/// Errors from keypair handling. Generation failures are fatal to the run.
#[derive(Debug, Error)]
pub enum KeyStoreError {
    /// Home directory could not be determined.
    #[error("Cannot determine home directory")]
    NoHomeDir,

    /// Exactly one half of the keypair exists on disk.
    #[error("Incomplete keypair: {present} exists but {missing} does not")]
    PartialPair {
        /// Path of the half that exists.
        present: PathBuf,
        /// Path of the half that is missing.
        missing: PathBuf,
    },

    /// ssh-keygen could not be started.
    #[error("Failed to run ssh-keygen: {0}")]
    KeygenSpawn(std::io::Error),

    /// Key file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ssh-keygen ran but reported failure.
    #[error("ssh-keygen failed with exit code {code:?}")]
    KeygenFailed {
        /// Exit code, if the process terminated normally.
        code: Option<i32>,
    },

    /// The public key file content is not a single SSH public key line.
    #[error("Invalid public key format in {0}")]
    InvalidPublicKey(PathBuf),
}

/// Filesystem presence of a keypair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPairStatus {
    /// Both halves exist.
    Present,
    /// Neither half exists.
    Missing,
    /// Exactly one half exists.
    Partial,
}

/// A private/public key file pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    private: PathBuf,
    public: PathBuf,
}

impl KeyPair {
    /// Creates a keypair from a private key path; the public path is the
    /// private path with `.pub` appended.
    #[must_use]
    pub fn new(private: PathBuf) -> Self {
        let mut public: OsString = private.clone().into_os_string();
        public.push(".pub");
        Self {
            private,
            public: PathBuf::from(public),
        }
    }

    /// Returns the default RSA keypair location, `~/.ssh/id_rsa`[.pub].
    pub fn default_rsa() -> Result<Self, KeyStoreError> {
        let home = dirs::home_dir().ok_or(KeyStoreError::NoHomeDir)?;
        Ok(Self::new(home.join(".ssh").join("id_rsa")))
    }

    /// Returns the private key path.
    #[must_use]
    pub fn private(&self) -> &Path {
        &self.private
    }

    /// Returns the public key path.
    #[must_use]
    pub fn public(&self) -> &Path {
        &self.public
    }

    /// Reports which halves of the pair exist on disk.
    #[must_use]
    pub fn status(&self) -> KeyPairStatus {
        match (self.private.exists(), self.public.exists()) {
            (true, true) => KeyPairStatus::Present,
            (false, false) => KeyPairStatus::Missing,
            _ => KeyPairStatus::Partial,
        }
    }

    /// Reads the public key's single line for transmission to a remote
    /// host.
    pub fn read_public_line(&self) -> Result<String, KeyStoreError> {
        let text = fs::read_to_string(&self.public)?;
        let line = text.trim();

        // A public key line starts with the algorithm name
        if line.is_empty() || !line.starts_with("ssh-") || line.lines().count() != 1 {
            return Err(KeyStoreError::InvalidPublicKey(self.public.clone()));
        }
        Ok(line.to_string())
    }
}

/// Produces a keypair on disk, creating it only when missing.
pub trait KeyStore {
    /// Ensures the keypair exists; returns true if generation ran.
    fn ensure(&self, keys: &KeyPair) -> Result<bool, KeyStoreError>;
}

/// Key store backed by `ssh-keygen`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskKeyStore;

impl KeyStore for DiskKeyStore {
    fn ensure(&self, keys: &KeyPair) -> Result<bool, KeyStoreError> {
        match keys.status() {
            KeyPairStatus::Present => {
                debug!("Keypair already present at {}", keys.private().display());
                Ok(false)
            }
            KeyPairStatus::Partial => {
                let (present, missing) = if keys.private().exists() {
                    (keys.private(), keys.public())
                } else {
                    (keys.public(), keys.private())
                };
                Err(KeyStoreError::PartialPair {
                    present: present.to_path_buf(),
                    missing: missing.to_path_buf(),
                })
            }
            KeyPairStatus::Missing => {
                generate(keys)?;
                Ok(true)
            }
        }
    }
}

/// Generates a new keypair with ssh-keygen.
fn generate(keys: &KeyPair) -> Result<(), KeyStoreError> {
    info!("Generating {}-bit {} keypair", KEY_BITS, KEY_TYPE);

    if let Some(parent) = keys.private().parent() {
        fs::create_dir_all(parent)?;
    }

    let status = Command::new("ssh-keygen")
        .arg("-t")
        .arg(KEY_TYPE)
        .arg("-b")
        .arg(KEY_BITS)
        .arg("-f")
        .arg(keys.private())
        .arg("-N")
        .arg("")
        .arg("-q")
        .stdin(Stdio::null())
        .status()
        .map_err(KeyStoreError::KeygenSpawn)?;

    if !status.success() {
        return Err(KeyStoreError::KeygenFailed {
            code: status.code(),
        });
    }

    info!("Keypair written to {}", keys.private().display());
    Ok(())
}
