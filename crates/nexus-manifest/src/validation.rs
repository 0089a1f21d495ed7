//! Deployability checks for manifests
//!
//! `validate` is total: it never fails and never panics, it only reports.
//! Every violated rule produces exactly one entry keyed by the command (and
//! argument index) it belongs to, so the editing surface can highlight the
//! offending field and tell whether a given command has any error at all.

use crate::types::{Argument, Command, Manifest};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

// Literal patterns; `None` is unreachable and simply fails every match.
static COMMAND_NAME_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").ok());
static ARGUMENT_NAME_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").ok());
static CLI_FLAG_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^-{1,2}[a-z0-9-]+$").ok());

fn is_match(pattern: &Lazy<Option<Regex>>, value: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(value))
}

pub const MSG_COMMAND_NAME_REQUIRED: &str = "Command name is required";
pub const MSG_COMMAND_NAME_KEBAB: &str = "Must be kebab-case (e.g. process-refund)";
pub const MSG_RUNTIME_REQUIRED: &str = "Runtime image is required";
pub const MSG_COMMAND_ID_DUPLICATE: &str = "Command id must be unique within the manifest";
pub const MSG_FLAG_REQUIRED: &str = "Flag is required";
pub const MSG_FLAG_PATTERN: &str = "Must start with - or --";
pub const MSG_ARGUMENT_NAME_REQUIRED: &str = "Name is required";
pub const MSG_ARGUMENT_NAME_PATTERN: &str = "Alphanumeric only";

// =============================================================================
// ERROR KEYS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommandField {
    Id,
    Name,
    Runtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArgumentField {
    Cli,
    Name,
}

/// Structured location of a validation error
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKey {
    Command {
        command_id: String,
        field: CommandField,
    },
    Argument {
        command_id: String,
        index: usize,
        field: ArgumentField,
    },
}

impl ErrorKey {
    pub fn command(command_id: &str, field: CommandField) -> Self {
        ErrorKey::Command {
            command_id: command_id.to_string(),
            field,
        }
    }

    pub fn argument(command_id: &str, index: usize, field: ArgumentField) -> Self {
        ErrorKey::Argument {
            command_id: command_id.to_string(),
            index,
            field,
        }
    }

    pub fn command_id(&self) -> &str {
        match self {
            ErrorKey::Command { command_id, .. } | ErrorKey::Argument { command_id, .. } => {
                command_id
            }
        }
    }
}

impl fmt::Display for CommandField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandField::Id => write!(f, "id"),
            CommandField::Name => write!(f, "name"),
            CommandField::Runtime => write!(f, "runtime"),
        }
    }
}

impl fmt::Display for ArgumentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentField::Cli => write!(f, "cli"),
            ArgumentField::Name => write!(f, "name"),
        }
    }
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKey::Command { command_id, field } => write!(f, "cmd-{}-{}", command_id, field),
            ErrorKey::Argument {
                command_id,
                index,
                field,
            } => write!(f, "arg-{}-{}-{}", command_id, index, field),
        }
    }
}

// =============================================================================
// REPORT
// =============================================================================

/// Field-level validation errors for one manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: BTreeMap<ErrorKey, String>,
}

impl ValidationReport {
    /// A manifest is deployable iff its report is empty
    pub fn is_deployable(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, key: &ErrorKey) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    /// Look up an error by its rendered key, e.g. `cmd-ns:build-name`
    pub fn error_for(&self, rendered_key: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(key, _)| key.to_string() == rendered_key)
            .map(|(_, msg)| msg.as_str())
    }

    /// Whether any command- or argument-scoped error belongs to `command_id`
    pub fn command_has_errors(&self, command_id: &str) -> bool {
        self.errors.keys().any(|key| key.command_id() == command_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ErrorKey, &str)> {
        self.errors.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Record an error. When two rules collide on one key the smaller message
    /// wins so the result does not depend on command order.
    pub(crate) fn insert(&mut self, key: ErrorKey, message: impl Into<String>) {
        let message = message.into();
        self.errors
            .entry(key)
            .and_modify(|existing| {
                if message < *existing {
                    existing.clone_from(&message);
                }
            })
            .or_insert(message);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self
            .errors
            .iter()
            .map(|(key, msg)| format!("{}: {}", key, msg))
            .collect();
        write!(f, "{}", lines.join("\n"))
    }
}

// =============================================================================
// RULES
// =============================================================================

/// Validate a manifest against the deployability invariants
pub fn validate(manifest: &Manifest) -> ValidationReport {
    let mut report = ValidationReport::default();

    let mut seen_ids = HashSet::new();
    for command in &manifest.commands {
        if !seen_ids.insert(command.id.as_str()) {
            report.insert(
                ErrorKey::command(&command.id, CommandField::Id),
                MSG_COMMAND_ID_DUPLICATE,
            );
        }
        validate_command(command, &mut report);
    }

    report
}

fn validate_command(command: &Command, report: &mut ValidationReport) {
    if command.name.trim().is_empty() {
        report.insert(
            ErrorKey::command(&command.id, CommandField::Name),
            MSG_COMMAND_NAME_REQUIRED,
        );
    } else if !is_match(&COMMAND_NAME_RE, &command.name) {
        report.insert(
            ErrorKey::command(&command.id, CommandField::Name),
            MSG_COMMAND_NAME_KEBAB,
        );
    }

    if command.runtime.trim().is_empty() {
        report.insert(
            ErrorKey::command(&command.id, CommandField::Runtime),
            MSG_RUNTIME_REQUIRED,
        );
    }

    for (index, argument) in command.arguments.iter().enumerate() {
        validate_argument(&command.id, index, argument, report);
    }
}

fn validate_argument(command_id: &str, index: usize, argument: &Argument, report: &mut ValidationReport) {
    if argument.cli.trim().is_empty() {
        report.insert(
            ErrorKey::argument(command_id, index, ArgumentField::Cli),
            MSG_FLAG_REQUIRED,
        );
    } else if !is_match(&CLI_FLAG_RE, &argument.cli) {
        report.insert(
            ErrorKey::argument(command_id, index, ArgumentField::Cli),
            MSG_FLAG_PATTERN,
        );
    }

    if argument.name.trim().is_empty() {
        report.insert(
            ErrorKey::argument(command_id, index, ArgumentField::Name),
            MSG_ARGUMENT_NAME_REQUIRED,
        );
    } else if !is_match(&ARGUMENT_NAME_RE, &argument.name) {
        report.insert(
            ErrorKey::argument(command_id, index, ArgumentField::Name),
            MSG_ARGUMENT_NAME_PATTERN,
        );
    }
}
