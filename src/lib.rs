//! Sshlink
//!
//! Sets up SSH key-based authentication to a remote host: generates an RSA
//! keypair if missing, verifies passwordless login, installs the public key
//! on the remote host when needed, and hands off to an interactive session.
//!
//! # Architecture
//!
//! - **Keys Module**: local RSA keypair management via `ssh-keygen`
//! - **SSH Module**: connection target, option bundles, the OpenSSH
//!   subprocess runner, key installation, and the authentication negotiator
//! - **Clipboard Module**: best-effort copy of the private key path
//! - **Prompt Module**: interactive collection of the connection target
//!
//! # Usage
//!
//! ```no_run
//! use sshlink::keys::{DiskKeyStore, KeyPair};
//! use sshlink::ssh::{Negotiator, OpenSsh, OpenSshInstaller, Target};
//!
//! let target = Target::new("admin", "192.168.1.10").expect("valid target");
//! let keys = KeyPair::default_rsa().expect("home directory");
//! let shell = OpenSsh::new();
//! let installer = OpenSshInstaller::new(&shell);
//! let negotiator = Negotiator::new(&shell, &installer, &DiskKeyStore);
//! let outcome = negotiator.ensure_access(&target, &keys).expect("key store");
//! println!("{}", outcome.as_str());
//! ```

// Clippy configuration - allow common patterns
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

pub mod clipboard;
pub mod keys;
pub mod logging;
pub mod prompt;
pub mod ssh;

// Re-export main types
pub use clipboard::Clipboard;
pub use keys::{DiskKeyStore, KeyPair, KeyStore, KeyStoreError};
pub use ssh::{AuthOutcome, ConnectMode, Negotiator, OpenSsh, OpenSshInstaller, Target};
