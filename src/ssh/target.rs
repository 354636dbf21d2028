//! Connection target data structure.
//!
//! A target is the (username, hostname) pair a run operates on. It is
//! collected once at startup and never changes for the process lifetime.

use std::fmt;

use thiserror::Error;

/// Errors produced when constructing a [`Target`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TargetError {
    /// Username was empty after trimming.
    #[error("Username must not be empty")]
    EmptyUser,

    /// Hostname was empty after trimming.
    #[error("Hostname must not be empty")]
    EmptyHost,

    /// Hostname contained whitespace.
    #[error("Hostname must not contain whitespace")]
    HostWhitespace,
}

/// A remote connection target: one user on one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    user: String,
    host: String,
}

impl Target {
    /// Creates a target from a username and hostname.
    ///
    /// Both values are trimmed; empty values are rejected so a failed
    /// prompt cannot produce a target like `@host`.
    pub fn new(user: &str, host: &str) -> Result<Self, TargetError> {
        let user = user.trim();
        let host = host.trim();

        if user.is_empty() {
            return Err(TargetError::EmptyUser);
        }
        if host.is_empty() {
            return Err(TargetError::EmptyHost);
        }
        if host.chars().any(char::is_whitespace) {
            return Err(TargetError::HostWhitespace);
        }

        Ok(Self {
            user: user.to_string(),
            host: host.to_string(),
        })
    }

    /// Returns the remote username.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the remote hostname or IP address.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the `user@host` string passed to the ssh client.
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.host)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_target_new_trims_input() {
        let target = Target::new("  admin ", " 192.168.1.10\n").unwrap();
        assert_eq!(target.user(), "admin");
        assert_eq!(target.host(), "192.168.1.10");
    }

    #[test]
    fn test_target_destination() {
        let target = Target::new("deploy", "example.com").unwrap();
        assert_eq!(target.destination(), "deploy@example.com");
        assert_eq!(target.to_string(), "deploy@example.com");
    }

    #[test]
    fn test_target_rejects_empty_user() {
        assert_eq!(Target::new("  ", "host"), Err(TargetError::EmptyUser));
    }

    #[test]
    fn test_target_rejects_empty_host() {
        assert_eq!(Target::new("user", ""), Err(TargetError::EmptyHost));
    }

    #[test]
    fn test_target_rejects_host_with_whitespace() {
        assert_eq!(
            Target::new("user", "a host"),
            Err(TargetError::HostWhitespace)
        );
    }
}
