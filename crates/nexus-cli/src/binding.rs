//! Binding of flag tokens against a command's declared arguments
//!
//! The check is deliberately shallow: a required argument counts as present
//! when some token starts with its `cli` flag. Values are neither parsed nor
//! type-checked.

use crate::errors::InterpreterError;
use nexus_manifest::Command;

/// A resolved command together with the raw tokens it was invoked with
#[derive(Debug, Clone, PartialEq)]
pub struct BoundInvocation {
    pub namespace: String,
    pub command: Command,
    pub flag_tokens: Vec<String>,
}

/// `cli` flags of required arguments that no token starts with
pub fn missing_required_flags(command: &Command, tokens: &[&str]) -> Vec<String> {
    command
        .required_arguments()
        .filter(|argument| !tokens.iter().any(|token| token.starts_with(argument.cli.as_str())))
        .map(|argument| argument.cli.clone())
        .collect()
}

pub fn bind(namespace: &str, command: &Command, tokens: &[&str]) -> Result<BoundInvocation, InterpreterError> {
    let missing = missing_required_flags(command, tokens);
    if !missing.is_empty() {
        return Err(InterpreterError::MissingRequiredFlags(missing));
    }

    Ok(BoundInvocation {
        namespace: namespace.to_string(),
        command: command.clone(),
        flag_tokens: tokens.iter().map(|token| (*token).to_string()).collect(),
    })
}
