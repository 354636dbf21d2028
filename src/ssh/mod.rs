//! SSH authentication setup module.
//!
//! Provides functionality for:
//! - Describing a connection target and the two client option bundles
//! - Running the OpenSSH client as a subprocess (verification, key push,
//!   interactive session)
//! - Installing a public key in the remote authorized-keys store
//! - The authentication negotiation sequence tying it all together
//!
//! # Negotiation sequence
//!
//! Standard verification → legacy ssh-rsa verification → one key
//! installation → one re-verification. The sequence is linear; there is no
//! retry loop.

pub mod installer;
pub mod negotiator;
pub mod options;
pub mod runner;
pub mod target;

pub use installer::{InstallError, KeyInstaller, OpenSshInstaller};
pub use negotiator::{AuthOutcome, Negotiator};
pub use options::{CONNECT_TIMEOUT_SECS, ConnectMode, VERIFY_COMMAND};
pub use runner::{OpenSsh, RemoteShell};
pub use target::{Target, TargetError};
