//! Clipboard module for the private key path copy.
//!
//! Backend selection is a capability probe done once at startup: the
//! platform tool (`clip` on Windows, `pbcopy` on macOS) is used directly,
//! while on other systems `xclip` and `xsel` are probed in order. With the
//! `system-clipboard` feature, arboard is tried before any external tool.
//! Copy failures are non-fatal; the caller logs and moves on.

use std::io::Write;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

/// Clipboard errors.
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// No usable clipboard tool was found on this system.
    #[error("No clipboard tool found (install xclip or xsel)")]
    NoBackend,

    /// The clipboard tool could not be spawned or piped.
    #[error("Failed to run {tool}: {source}")]
    Io {
        /// Tool that failed.
        tool: &'static str,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The clipboard tool ran and reported failure.
    #[error("{0} exited with failure")]
    ToolFailed(&'static str),
}

/// An external clipboard tool, one variant per supported utility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardBackend {
    /// Windows `clip`.
    Clip,
    /// macOS `pbcopy`.
    Pbcopy,
    /// X11 `xclip`.
    Xclip,
    /// X11 `xsel`.
    Xsel,
}

impl ClipboardBackend {
    /// Returns the tool name and arguments for this backend.
    #[must_use]
    fn command(self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Clip => ("clip", &[]),
            Self::Pbcopy => ("pbcopy", &[]),
            Self::Xclip => ("xclip", &["-selection", "clipboard"]),
            Self::Xsel => ("xsel", &["--clipboard", "--input"]),
        }
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.command().0
    }

    /// Probes the current platform for a usable backend.
    #[must_use]
    fn detect() -> Option<Self> {
        if cfg!(target_os = "windows") {
            Some(Self::Clip)
        } else if cfg!(target_os = "macos") {
            Some(Self::Pbcopy)
        } else if is_tool_available("xclip") {
            Some(Self::Xclip)
        } else if is_tool_available("xsel") {
            Some(Self::Xsel)
        } else {
            None
        }
    }

    /// Pipes `text` into the tool's standard input.
    fn copy(self, text: &str) -> Result<(), ClipboardError> {
        let (tool, args) = self.command();

        let mut child = Command::new(tool)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ClipboardError::Io { tool, source })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|source| ClipboardError::Io { tool, source })?;
        }

        let status = child
            .wait()
            .map_err(|source| ClipboardError::Io { tool, source })?;

        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::ToolFailed(tool))
        }
    }
}

/// Clipboard handle with the backend selected at startup.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clipboard {
    backend: Option<ClipboardBackend>,
}

impl Clipboard {
    /// Probes for a clipboard backend.
    #[must_use]
    pub fn detect() -> Self {
        let backend = ClipboardBackend::detect();
        match backend {
            Some(b) => debug!("Clipboard backend: {}", b.name()),
            None => debug!("No clipboard backend found"),
        }
        Self { backend }
    }

    /// Copies text to the clipboard.
    ///
    /// # Errors
    /// Returns an error if no backend exists or the tool fails; callers
    /// treat this as best-effort.
    pub fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        // Try the system clipboard library first if compiled in
        #[cfg(feature = "system-clipboard")]
        {
            if let Ok(mut clipboard) = arboard::Clipboard::new() {
                if clipboard.set_text(text).is_ok() {
                    return Ok(());
                }
            }
        }

        match self.backend {
            Some(backend) => backend.copy(text),
            None => Err(ClipboardError::NoBackend),
        }
    }
}

/// Checks if a clipboard tool can be spawned on this system.
fn is_tool_available(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}
