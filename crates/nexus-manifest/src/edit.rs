//! Copy-on-write editing operations used by the manifest editor
//!
//! Every operation takes the current manifest by reference and returns a new
//! one, rebuilding only the touched command. The input is never mutated, so a
//! manifest can be shared with a registry snapshot while it is being edited.

use crate::types::{Argument, ArgumentPosition, ArgumentType, Command, Manifest};

/// Partial update of the editable command fields
#[derive(Debug, Clone, Default)]
pub struct CommandPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub entrypoint: Option<String>,
    pub runtime: Option<String>,
    pub returns: Option<String>,
}

/// Partial update of the editable argument fields
#[derive(Debug, Clone, Default)]
pub struct ArgumentPatch {
    pub name: Option<String>,
    pub cli: Option<String>,
    pub position: Option<ArgumentPosition>,
    pub arg_type: Option<ArgumentType>,
    pub required: Option<bool>,
    pub description: Option<String>,
}

impl CommandPatch {
    fn apply(self, command: &Command) -> Command {
        Command {
            name: self.name.unwrap_or_else(|| command.name.clone()),
            description: self
                .description
                .unwrap_or_else(|| command.description.clone()),
            language: self.language.unwrap_or_else(|| command.language.clone()),
            entrypoint: self
                .entrypoint
                .unwrap_or_else(|| command.entrypoint.clone()),
            runtime: self.runtime.unwrap_or_else(|| command.runtime.clone()),
            returns: self.returns.unwrap_or_else(|| command.returns.clone()),
            ..command.clone()
        }
    }
}

impl ArgumentPatch {
    fn apply(self, argument: &Argument) -> Argument {
        Argument {
            name: self.name.unwrap_or_else(|| argument.name.clone()),
            cli: self.cli.unwrap_or_else(|| argument.cli.clone()),
            position: self.position.unwrap_or(argument.position),
            arg_type: self.arg_type.unwrap_or(argument.arg_type),
            required: self.required.unwrap_or(argument.required),
            description: self
                .description
                .unwrap_or_else(|| argument.description.clone()),
            ..argument.clone()
        }
    }
}

impl Manifest {
    /// Rebuild the manifest with every command matching `id` replaced by
    /// `rebuild(command)`. Unknown ids return an unchanged copy.
    fn with_command(&self, id: &str, rebuild: impl Fn(&Command) -> Command) -> Manifest {
        let commands = self
            .commands
            .iter()
            .map(|command| {
                if command.id == id {
                    rebuild(command)
                } else {
                    command.clone()
                }
            })
            .collect();
        Manifest {
            commands,
            ..self.clone()
        }
    }

    pub fn update_command(&self, id: &str, patch: CommandPatch) -> Manifest {
        self.with_command(id, |command| patch.clone().apply(command))
    }

    /// Replace the argument at `index`; out-of-range indexes leave the command as is
    pub fn update_argument(&self, id: &str, index: usize, patch: ArgumentPatch) -> Manifest {
        self.with_command(id, |command| {
            let arguments = command
                .arguments
                .iter()
                .enumerate()
                .map(|(idx, argument)| {
                    if idx == index {
                        patch.clone().apply(argument)
                    } else {
                        argument.clone()
                    }
                })
                .collect();
            Command {
                arguments,
                ..command.clone()
            }
        })
    }

    /// Append the default `new_arg` / `--new-arg` argument
    pub fn add_argument(&self, id: &str) -> Manifest {
        self.with_command(id, |command| {
            let mut arguments = command.arguments.clone();
            arguments.push(Argument::default());
            Command {
                arguments,
                ..command.clone()
            }
        })
    }

    pub fn remove_argument(&self, id: &str, index: usize) -> Manifest {
        self.with_command(id, |command| {
            let arguments = command
                .arguments
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != index)
                .map(|(_, argument)| argument.clone())
                .collect();
            Command {
                arguments,
                ..command.clone()
            }
        })
    }
}

/// Usage hint shown under a command in the editor
pub fn bridge_example(command: &Command) -> String {
    let mut parts = vec![format!("nexus run {}", command.name)];
    parts.extend(
        command
            .arguments
            .iter()
            .map(|argument| format!("{} <value>", argument.cli)),
    );
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_manifest() -> Manifest {
        let command = Command {
            name: "charge".to_string(),
            id: "billing:charge".to_string(),
            runtime: "node:20".to_string(),
            arguments: vec![
                Argument {
                    name: "amount".to_string(),
                    cli: "--amount".to_string(),
                    arg_type: ArgumentType::Float,
                    required: true,
                    description: "Amount in cents".to_string(),
                    confidence: 0.9,
                    ..Default::default()
                },
                Argument {
                    name: "currency".to_string(),
                    cli: "--currency".to_string(),
                    env: Some("CURRENCY".to_string()),
                    confidence: 0.7,
                    ..Default::default()
                },
                Argument {
                    name: "memo".to_string(),
                    cli: "-m".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        Manifest {
            namespace: "billing".to_string(),
            commands: vec![
                command,
                Command {
                    name: "refund".to_string(),
                    id: "billing:refund".to_string(),
                    runtime: "node:20".to_string(),
                    ..Default::default()
                },
            ],
            ..Manifest::scaffold()
        }
    }

    #[test]
    fn test_update_command_leaves_input_untouched() {
        let original = sample_manifest();
        let edited = original.update_command(
            "billing:charge",
            CommandPatch {
                runtime: Some("node:22".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(original.commands[0].runtime, "node:20");
        assert_eq!(edited.commands[0].runtime, "node:22");
        assert_eq!(edited.commands[0].arguments, original.commands[0].arguments);
        assert_eq!(edited.commands[1], original.commands[1]);
    }

    #[test]
    fn test_update_argument_touches_one_index() {
        let original = sample_manifest();
        let edited = original.update_argument(
            "billing:charge",
            1,
            ArgumentPatch {
                required: Some(true),
                ..Default::default()
            },
        );
        let before = &original.commands[0].arguments;
        let after = &edited.commands[0].arguments;
        assert!(after[1].required);
        assert_eq!(after[1].env.as_deref(), Some("CURRENCY"));
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[2]);
    }

    #[test]
    fn test_remove_then_add_keeps_other_arguments_identical() {
        let original = sample_manifest();
        let removed = original.remove_argument("billing:charge", 1);
        let readded = removed.add_argument("billing:charge");

        let args = &readded.commands[0].arguments;
        assert_eq!(args.len(), 3);
        assert_eq!(args[0], original.commands[0].arguments[0]);
        assert_eq!(args[1], original.commands[0].arguments[2]);
        assert_eq!(args[2], Argument::default());

        let before = serde_json::to_string(&original.commands[0].arguments[0]);
        let after = serde_json::to_string(&args[0]);
        assert!(before.is_ok() && before.ok() == after.ok());
    }

    #[test]
    fn test_unknown_command_is_noop() {
        let original = sample_manifest();
        let edited = original.add_argument("billing:missing");
        assert_eq!(edited, original);
    }

    #[test]
    fn test_bridge_example() {
        let manifest = sample_manifest();
        assert_eq!(
            bridge_example(&manifest.commands[0]),
            "nexus run charge --amount <value> --currency <value> -m <value>"
        );
        assert_eq!(bridge_example(&manifest.commands[1]), "nexus run refund");
    }
}
