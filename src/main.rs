//! Sshlink - Main entry point.
//!
//! Sets up SSH key-based authentication to a remote host and opens an
//! interactive session.
//!
//! Usage: sshlink [OPTIONS]
//!
//! Options:
//!   --version, -v    Show version
//!
//! The remote username and hostname are collected interactively. Exit code
//! is 0 on any path that reaches the session hand-off, 1 if key generation
//! (or input collection) fails.

use std::env;
use std::process;

use sshlink::clipboard::Clipboard;
use sshlink::keys::{DiskKeyStore, KeyPair};
use sshlink::logging::{self, LogConfig};
use sshlink::prompt;
use sshlink::ssh::{AuthOutcome, Negotiator, OpenSsh, OpenSshInstaller};

/// Crate version shown by --version.
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();

    // Handle --version flag
    if args.iter().any(|a| a == "--version" || a == "-v") {
        println!("sshlink v{}", VERSION);
        return Ok(());
    }

    // Initialize tracing for logging
    logging::init(&LogConfig::default());

    // Collect the connection target interactively
    let target = match prompt::collect_target() {
        Ok(target) => target,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    // Resolve the keypair location; failure here is fatal
    let keys = match KeyPair::default_rsa() {
        Ok(keys) => keys,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let shell = OpenSsh::new();
    let installer = OpenSshInstaller::new(&shell);
    let negotiator = Negotiator::new(&shell, &installer, &DiskKeyStore);

    // Run the negotiation sequence; only key generation errors are fatal
    println!("Checking key-based authentication for {}...", target);
    let outcome = match negotiator.ensure_access(&target, &keys) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Key setup failed: {}", e);
            process::exit(1);
        }
    };

    match outcome {
        AuthOutcome::Standard => println!("Key-based authentication is working."),
        AuthOutcome::Legacy => println!(
            "Connected using legacy ssh-rsa. Consider upgrading the remote \
             server's SSH configuration."
        ),
        AuthOutcome::AfterInstall => println!("Key installed successfully."),
        AuthOutcome::Failed => println!(
            "Still unable to connect with key authentication. The session \
             below may ask for a password."
        ),
    }

    // Best-effort: put the private key path on the clipboard
    let key_path = keys.private().display().to_string();
    match Clipboard::detect().copy(&key_path) {
        Ok(()) => println!("Private key path copied to clipboard: {}", key_path),
        Err(e) => tracing::warn!("Could not copy to clipboard: {}", e),
    }

    // Hand off to the real session; its exit status does not change ours
    println!("Connecting to {}...", target);
    if let Err(e) = shell.interactive(&target) {
        tracing::warn!("Failed to start interactive session: {}", e);
    }

    Ok(())
}
