//! Authentication negotiator.
//!
//! Determines, with the fewest remote round-trips, whether passwordless
//! key authentication works for a target, and establishes it when it does
//! not. The sequence is strictly linear: standard verify, legacy verify,
//! one install, one re-verify. Worst case is two connection attempts plus
//! one installation plus one final check, each bounded by the connection
//! timeout.
//!
//! The negotiator never prompts for anything itself; the verification
//! bundles disallow password authentication, and interactive input happens
//! only in the key-push step run by the installer.

use tracing::{info, warn};

use crate::keys::{KeyPair, KeyStore, KeyStoreError};

use super::installer::KeyInstaller;
use super::options::ConnectMode;
use super::runner::RemoteShell;
use super::target::Target;

/// Terminal state of one negotiation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Standard key authentication worked on the first attempt.
    Standard,
    /// Only the legacy ssh-rsa bundle worked; the remote server's SSH
    /// configuration should be upgraded.
    Legacy,
    /// Standard key authentication worked after installing the key.
    AfterInstall,
    /// Key authentication could not be established.
    Failed,
}

impl AuthOutcome {
    /// Returns a display string for the outcome.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "key authentication working",
            Self::Legacy => "key authentication working (legacy ssh-rsa)",
            Self::AfterInstall => "key installed and verified",
            Self::Failed => "key authentication failed",
        }
    }

    /// Returns true for every outcome except [`AuthOutcome::Failed`].
    #[must_use]
    pub fn is_success(self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// The authentication negotiation sequence.
///
/// A pure function of its inputs plus three collaborators: the remote
/// shell, the key installer, and the key store. Only key store errors
/// cross this boundary; everything else is converted into the outcome or
/// a warning.
#[derive(Debug)]
pub struct Negotiator<'a, S, I, K> {
    shell: &'a S,
    installer: &'a I,
    store: &'a K,
}

impl<'a, S, I, K> Negotiator<'a, S, I, K>
where
    S: RemoteShell,
    I: KeyInstaller,
    K: KeyStore,
{
    /// Creates a negotiator over the given collaborators.
    #[must_use]
    pub fn new(shell: &'a S, installer: &'a I, store: &'a K) -> Self {
        Self {
            shell,
            installer,
            store,
        }
    }

    /// Verifies, and if necessary establishes, passwordless access.
    ///
    /// 1. Generates the keypair if missing (failure is fatal).
    /// 2. Tries the standard bundle, then the legacy bundle.
    /// 3. If both fail, installs the key once and re-verifies once.
    ///
    /// Installation failure is a warning, not an abort: a partial append
    /// may still have landed, so the re-verification runs regardless.
    pub fn ensure_access(
        &self,
        target: &Target,
        keys: &KeyPair,
    ) -> Result<AuthOutcome, KeyStoreError> {
        if self.store.ensure(keys)? {
            info!("Generated new keypair at {}", keys.private().display());
        }

        info!("Checking key-based authentication for {}", target);
        if self.shell.verify(target, ConnectMode::Standard) {
            return Ok(AuthOutcome::Standard);
        }

        info!("Modern key negotiation failed, trying legacy ssh-rsa compatibility");
        if self.shell.verify(target, ConnectMode::Legacy) {
            warn!(
                "Connected to {} using legacy ssh-rsa; consider upgrading \
                 the remote server's SSH configuration",
                target.host()
            );
            return Ok(AuthOutcome::Legacy);
        }

        info!("Pushing public key to {}", target);
        if let Err(e) = self.installer.install(target, keys) {
            // The append may have landed anyway, so keep going.
            warn!("Key installation reported an error: {}", e);
        }

        if self.shell.verify(target, ConnectMode::Standard) {
            Ok(AuthOutcome::AfterInstall)
        } else {
            Ok(AuthOutcome::Failed)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::ssh::installer::InstallError;

    /// Shell that answers verification attempts from a script and records
    /// the modes used.
    struct ScriptedShell {
        answers: RefCell<Vec<bool>>,
        calls: RefCell<Vec<ConnectMode>>,
    }

    impl ScriptedShell {
        fn new(answers: &[bool]) -> Self {
            let mut script: Vec<bool> = answers.to_vec();
            script.reverse();
            Self {
                answers: RefCell::new(script),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl RemoteShell for ScriptedShell {
        fn verify(&self, _target: &Target, mode: ConnectMode) -> bool {
            self.calls.borrow_mut().push(mode);
            self.answers
                .borrow_mut()
                .pop()
                .unwrap_or_else(|| panic!("unexpected verification attempt"))
        }

        fn run_with_input(
            &self,
            _target: &Target,
            _command: &str,
            _input: &str,
        ) -> std::io::Result<bool> {
            panic!("negotiator must not push directly");
        }
    }

    struct CountingInstaller {
        calls: Cell<usize>,
        fail: bool,
    }

    impl CountingInstaller {
        fn new(fail: bool) -> Self {
            Self {
                calls: Cell::new(0),
                fail,
            }
        }
    }

    impl KeyInstaller for CountingInstaller {
        fn install(&self, _target: &Target, _keys: &KeyPair) -> Result<(), InstallError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                Err(InstallError::CommandFailed)
            } else {
                Ok(())
            }
        }
    }

    struct FakeStore {
        generated: Cell<usize>,
        result: Option<bool>,
    }

    impl FakeStore {
        fn present() -> Self {
            Self {
                generated: Cell::new(0),
                result: Some(false),
            }
        }

        fn missing() -> Self {
            Self {
                generated: Cell::new(0),
                result: Some(true),
            }
        }

        fn failing() -> Self {
            Self {
                generated: Cell::new(0),
                result: None,
            }
        }
    }

    impl KeyStore for FakeStore {
        fn ensure(&self, _keys: &KeyPair) -> Result<bool, KeyStoreError> {
            self.generated.set(self.generated.get() + 1);
            self.result
                .ok_or(KeyStoreError::KeygenFailed { code: Some(1) })
        }
    }

    fn target() -> Target {
        Target::new("user", "host").unwrap()
    }

    fn keys() -> KeyPair {
        KeyPair::new(std::path::PathBuf::from("/tmp/test_id_rsa"))
    }

    #[test]
    fn test_standard_success_skips_install() {
        let shell = ScriptedShell::new(&[true]);
        let installer = CountingInstaller::new(false);
        let store = FakeStore::present();
        let negotiator = Negotiator::new(&shell, &installer, &store);

        let outcome = negotiator.ensure_access(&target(), &keys()).unwrap();

        assert_eq!(outcome, AuthOutcome::Standard);
        assert_eq!(installer.calls.get(), 0, "no installation on success");
        assert_eq!(*shell.calls.borrow(), vec![ConnectMode::Standard]);
    }

    #[test]
    fn test_legacy_success_skips_install() {
        let shell = ScriptedShell::new(&[false, true]);
        let installer = CountingInstaller::new(false);
        let store = FakeStore::present();
        let negotiator = Negotiator::new(&shell, &installer, &store);

        let outcome = negotiator.ensure_access(&target(), &keys()).unwrap();

        assert_eq!(outcome, AuthOutcome::Legacy);
        assert_eq!(installer.calls.get(), 0);
        assert_eq!(
            *shell.calls.borrow(),
            vec![ConnectMode::Standard, ConnectMode::Legacy]
        );
    }

    #[test]
    fn test_both_fail_installs_once_and_reverifies_once() {
        let shell = ScriptedShell::new(&[false, false, true]);
        let installer = CountingInstaller::new(false);
        let store = FakeStore::present();
        let negotiator = Negotiator::new(&shell, &installer, &store);

        let outcome = negotiator.ensure_access(&target(), &keys()).unwrap();

        assert_eq!(outcome, AuthOutcome::AfterInstall);
        assert_eq!(installer.calls.get(), 1, "install exactly once");
        assert_eq!(
            *shell.calls.borrow(),
            vec![
                ConnectMode::Standard,
                ConnectMode::Legacy,
                ConnectMode::Standard
            ],
            "exactly one re-verification, in standard mode"
        );
    }

    #[test]
    fn test_failed_reverification_is_terminal() {
        let shell = ScriptedShell::new(&[false, false, false]);
        let installer = CountingInstaller::new(false);
        let store = FakeStore::present();
        let negotiator = Negotiator::new(&shell, &installer, &store);

        let outcome = negotiator.ensure_access(&target(), &keys()).unwrap();

        assert_eq!(outcome, AuthOutcome::Failed);
        assert!(!outcome.is_success());
        assert_eq!(installer.calls.get(), 1, "no retry loop");
        assert_eq!(shell.calls.borrow().len(), 3, "no further attempts");
    }

    #[test]
    fn test_install_failure_still_reverifies() {
        let shell = ScriptedShell::new(&[false, false, true]);
        let installer = CountingInstaller::new(true);
        let store = FakeStore::present();
        let negotiator = Negotiator::new(&shell, &installer, &store);

        let outcome = negotiator.ensure_access(&target(), &keys()).unwrap();

        // Installer error is a warning; a partial append may have worked.
        assert_eq!(outcome, AuthOutcome::AfterInstall);
    }

    #[test]
    fn test_keygen_failure_is_fatal_and_skips_remote_calls() {
        let shell = ScriptedShell::new(&[]);
        let installer = CountingInstaller::new(false);
        let store = FakeStore::failing();
        let negotiator = Negotiator::new(&shell, &installer, &store);

        let result = negotiator.ensure_access(&target(), &keys());

        assert!(matches!(
            result,
            Err(KeyStoreError::KeygenFailed { code: Some(1) })
        ));
        assert!(shell.calls.borrow().is_empty(), "no remote attempts");
        assert_eq!(installer.calls.get(), 0);
    }

    #[test]
    fn test_generation_runs_before_first_verification() {
        let shell = ScriptedShell::new(&[true]);
        let installer = CountingInstaller::new(false);
        let store = FakeStore::missing();
        let negotiator = Negotiator::new(&shell, &installer, &store);

        let outcome = negotiator.ensure_access(&target(), &keys()).unwrap();

        assert_eq!(outcome, AuthOutcome::Standard);
        assert_eq!(store.generated.get(), 1, "key store consulted once");
    }

    #[test]
    fn test_outcome_display_strings() {
        assert!(AuthOutcome::Standard.is_success());
        assert!(AuthOutcome::Legacy.is_success());
        assert!(AuthOutcome::AfterInstall.is_success());
        assert!(!AuthOutcome::Failed.is_success());
        assert_eq!(AuthOutcome::Failed.as_str(), "key authentication failed");
    }
}
