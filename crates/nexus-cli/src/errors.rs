//! Error types for the simulated terminal
//!
//! None of these abort the process. The interpreter renders each one as an
//! `error` event and keeps the session going.

use crate::session::SessionError;
use thiserror::Error;

/// Failures of one interpreter turn
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpreterError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("command not found: {0}. Try \"nexus\" or \"help\".")]
    UnknownCommand(String),

    #[error("Unknown command: {0}")]
    UnknownSubcommand(String),

    #[error("Error: Missing command name. Usage: nexus run <namespace:command>")]
    MissingTarget,

    #[error("Error: Local manifest cache empty. Run \"nexus sync\".")]
    CacheEmpty,

    #[error("Error: Command \"{0}\" not found in local cache.")]
    NotFound(String),

    #[error("Error: Missing required flags: {}", .0.join(", "))]
    MissingRequiredFlags(Vec<String>),
}

#[cfg(test)]
mod tests {
    use crate::errors::*;

    #[test]
    fn test_interpreter_error_display() {
        let err = InterpreterError::MissingRequiredFlags(vec!["--amount".to_string(), "-c".to_string()]);
        assert_eq!(err.to_string(), "Error: Missing required flags: --amount, -c");

        let err = InterpreterError::UnknownCommand("ls".to_string());
        assert_eq!(err.to_string(), "command not found: ls. Try \"nexus\" or \"help\".");
    }

    #[test]
    fn test_session_error_is_transparent() {
        let err = InterpreterError::from(SessionError::NotLoggedIn);
        assert_eq!(err.to_string(), SessionError::NotLoggedIn.to_string());
    }
}
