//! SSH client option bundles.
//!
//! Exactly two bundles exist for verification attempts: `Standard` (modern
//! key auth, password prompts disallowed) and `Legacy` (the same plus
//! ssh-rsa compatibility flags for outdated servers). The key-push bundle
//! used during installation is separate because it must allow the remote
//! side to prompt for a password.

/// Connection timeout for verification attempts, in seconds.
pub const CONNECT_TIMEOUT_SECS: u32 = 5;

/// Diagnostic command run by a verification attempt.
///
/// Only the exit status is inspected; the output is discarded.
pub const VERIFY_COMMAND: &str = "echo success";

/// Options shared by both verification bundles.
///
/// BatchMode and PasswordAuthentication=no make the attempt fail instead of
/// prompting, which is the point: a verification attempt must confirm that
/// key-only authentication works. No host-key option is set: a verification
/// attempt must not write to known_hosts, so first contact with an unknown
/// host fails here and gets accepted interactively on the push or session
/// path. The timeout is appended in [`ConnectMode::args`] from
/// [`CONNECT_TIMEOUT_SECS`].
const STANDARD_OPTIONS: &[&str] = &[
    "-o",
    "BatchMode=yes",
    "-o",
    "PasswordAuthentication=no",
];

/// Compatibility flags permitting the older ssh-rsa signature algorithm.
const LEGACY_OPTIONS: &[&str] = &[
    "-o",
    "HostKeyAlgorithms=+ssh-rsa",
    "-o",
    "PubkeyAcceptedAlgorithms=+ssh-rsa",
];

/// Option bundle selected by the negotiation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectMode {
    /// Modern key authentication with default algorithms.
    Standard,
    /// Standard plus ssh-rsa compatibility for outdated servers.
    Legacy,
}

impl ConnectMode {
    /// Returns the ssh client arguments for this bundle.
    ///
    /// The timeout argument is rendered from [`CONNECT_TIMEOUT_SECS`] so
    /// the bundle and the constant cannot drift apart.
    #[must_use]
    pub fn args(self) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();
        if self == Self::Legacy {
            args.extend(LEGACY_OPTIONS.iter().map(|s| (*s).to_string()));
        }
        args.extend(STANDARD_OPTIONS.iter().map(|s| (*s).to_string()));
        args.push("-o".to_string());
        args.push(format!("ConnectTimeout={CONNECT_TIMEOUT_SECS}"));
        args
    }

    /// Returns a display string for the bundle.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Legacy => "legacy",
        }
    }
}

/// Returns the ssh client arguments for the manual key-push connection.
///
/// The push happens before key auth works, so the remote side is allowed to
/// prompt for a password; only the algorithm compatibility flags are set.
#[must_use]
pub fn push_args() -> Vec<&'static str> {
    LEGACY_OPTIONS.to_vec()
}
