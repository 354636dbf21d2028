//! Interactive prompt adapter.
//!
//! Collects the connection target from the user at startup. This is the
//! only place that reads interactive input; the negotiation core receives
//! the result as plain values.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::ssh::{Target, TargetError};

/// Attempts before giving up on invalid input.
const MAX_PROMPT_ATTEMPTS: usize = 3;

/// Errors from interactive input collection.
#[derive(Debug, Error)]
pub enum PromptError {
    /// Standard input is not a terminal.
    #[error("Standard input is not a terminal; run sshlink interactively")]
    NotATty,

    /// Standard input closed before a value was read.
    #[error("Input stream closed")]
    Eof,

    /// Too many invalid answers.
    #[error("Invalid target: {0}")]
    Invalid(TargetError),

    /// Reading or writing the terminal failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Prompts on stdin/stdout for the remote username and hostname.
///
/// The username defaults to the local login name when the answer is empty.
pub fn collect_target() -> Result<Target, PromptError> {
    if !atty::is(atty::Stream::Stdin) {
        return Err(PromptError::NotATty);
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    read_target(&mut input, &mut output)
}

/// Reads a target from the given streams. Split out for testing.
pub fn read_target<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<Target, PromptError> {
    let default_user = whoami::username();
    let mut last_err = TargetError::EmptyHost;

    for _ in 0..MAX_PROMPT_ATTEMPTS {
        let user = read_line(
            input,
            output,
            &format!("Remote username [{default_user}]: "),
        )?;
        let user = if user.trim().is_empty() {
            default_user.clone()
        } else {
            user
        };

        let host = read_line(input, output, "Remote host (e.g. 192.168.1.10): ")?;

        match Target::new(&user, &host) {
            Ok(target) => return Ok(target),
            Err(e) => {
                writeln!(output, "{e}")?;
                last_err = e;
            }
        }
    }

    Err(PromptError::Invalid(last_err))
}

/// Writes a prompt and reads one line.
fn read_line<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> Result<String, PromptError> {
    write!(output, "{label}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(PromptError::Eof);
    }
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_read_target_from_answers() {
        let mut input = Cursor::new("admin\n192.168.1.10\n");
        let mut output = Vec::new();

        let target = read_target(&mut input, &mut output).unwrap();

        assert_eq!(target.user(), "admin");
        assert_eq!(target.host(), "192.168.1.10");
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Remote username"));
        assert!(shown.contains("Remote host"));
    }

    #[test]
    fn test_empty_username_uses_local_login() {
        let mut input = Cursor::new("\nexample.com\n");
        let mut output = Vec::new();

        let target = read_target(&mut input, &mut output).unwrap();

        assert_eq!(target.user(), whoami::username());
        assert_eq!(target.host(), "example.com");
    }

    #[test]
    fn test_reprompts_on_empty_host() {
        let mut input = Cursor::new("admin\n\nadmin\nexample.com\n");
        let mut output = Vec::new();

        let target = read_target(&mut input, &mut output).unwrap();
        assert_eq!(target.host(), "example.com");
    }

    #[test]
    fn test_eof_is_an_error() {
        let mut input = Cursor::new("admin\n");
        let mut output = Vec::new();

        let result = read_target(&mut input, &mut output);
        assert!(matches!(result, Err(PromptError::Eof)));
    }

    #[test]
    fn test_gives_up_after_repeated_invalid_input() {
        // Three rounds of username + empty host
        let mut input = Cursor::new("a\n\na\n\na\n\n");
        let mut output = Vec::new();

        let result = read_target(&mut input, &mut output);
        assert!(matches!(
            result,
            Err(PromptError::Invalid(TargetError::EmptyHost))
        ));
    }
}
