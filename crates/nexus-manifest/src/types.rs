//! Wire types for nexus command manifests
//!
//! This module provides:
//! - The manifest / command / argument model in its JSON wire shape
//! - Closed enums for argument position and argument type
//! - An untagged default value that keeps string, number and boolean defaults intact
//!
//! Field order and names follow the published JSON schema so that a manifest
//! read from disk serializes back to the same document.

use serde::{Deserialize, Serialize, Serializer};

/// Namespace of the demo manifest published at startup.
pub const DEMO_NAMESPACE: &str = "billing-service";

// =============================================================================
// MANIFEST - One published unit of commands
// =============================================================================

/// A namespaced bundle of commands produced from one source repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub namespace: String,
    pub source: String,
    /// ISO8601 timestamp of the last publish, kept verbatim
    pub generated_at: String,
    pub language: String,
    #[serde(default)]
    pub commands: Vec<Command>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl Default for Manifest {
    fn default() -> Self {
        Manifest::scaffold()
    }
}

// =============================================================================
// COMMAND
// =============================================================================

/// One invocable operation inside a manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    /// Conventionally `namespace:name`
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_range: Option<SourceRange>,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub entrypoint: String,
    #[serde(default)]
    pub runtime: String,
    #[serde(default)]
    pub arguments: Vec<Argument>,
    #[serde(default)]
    pub returns: String,
    #[serde(rename = "async", default)]
    pub is_async: bool,
    #[serde(default, serialize_with = "serialize_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub examples: Vec<String>,
}

impl Default for Command {
    fn default() -> Self {
        Command {
            name: String::new(),
            id: String::new(),
            description: String::new(),
            source_file: String::new(),
            source_range: None,
            language: String::new(),
            entrypoint: String::new(),
            runtime: String::new(),
            arguments: Vec::new(),
            returns: String::new(),
            is_async: false,
            confidence: 1.0,
            examples: Vec::new(),
        }
    }
}

/// Line span of the command inside its source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRange {
    pub start_line: u32,
    pub end_line: u32,
}

/// Shape of the simulated result payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    Json,
    File,
    Text,
}

impl ReturnShape {
    /// Classify a free-form `returns` tag
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "json" => ReturnShape::Json,
            "file" => ReturnShape::File,
            _ => ReturnShape::Text,
        }
    }
}

// =============================================================================
// ARGUMENT
// =============================================================================

/// One CLI parameter of a command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub cli: String,
    #[serde(default)]
    pub position: ArgumentPosition,
    #[serde(rename = "type", default)]
    pub arg_type: ArgumentType,
    #[serde(default)]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_parameter: Option<String>,
    #[serde(default, serialize_with = "serialize_confidence")]
    pub confidence: f64,
}

impl Default for Argument {
    /// The argument the editor appends on "add argument"
    fn default() -> Self {
        Argument {
            name: "new_arg".to_string(),
            cli: "--new-arg".to_string(),
            position: ArgumentPosition::Flag,
            arg_type: ArgumentType::String,
            required: false,
            default: None,
            multiple: None,
            env: None,
            description: String::new(),
            source_parameter: None,
            confidence: 1.0,
        }
    }
}

/// Whether the argument is passed as a flag or positionally
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentPosition {
    #[default]
    Flag,
    Positional,
}

/// Declared value type of an argument
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ArgumentType {
    #[default]
    String = 0,
    Integer = 1,
    Float = 2,
    Boolean = 3,
    Array = 4,
    File = 5,
}

impl std::fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgumentType::String => write!(f, "string"),
            ArgumentType::Integer => write!(f, "integer"),
            ArgumentType::Float => write!(f, "float"),
            ArgumentType::Boolean => write!(f, "boolean"),
            ArgumentType::Array => write!(f, "array"),
            ArgumentType::File => write!(f, "file"),
        }
    }
}

impl std::str::FromStr for ArgumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ArgumentType::String),
            "integer" => Ok(ArgumentType::Integer),
            "float" => Ok(ArgumentType::Float),
            "boolean" => Ok(ArgumentType::Boolean),
            "array" => Ok(ArgumentType::Array),
            "file" => Ok(ArgumentType::File),
            _ => Err(format!(
                "Invalid argument type: {}. Use: string, integer, float, boolean, array, file",
                s
            )),
        }
    }
}

// =============================================================================
// DEFAULT VALUE
// =============================================================================

/// Default value of an argument
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

// =============================================================================
// IMPL BLOCKS
// =============================================================================

impl Manifest {
    /// Empty manual-entry manifest used as an editing starting point
    pub fn scaffold() -> Self {
        Manifest {
            namespace: "new-project".to_string(),
            source: "manual-entry".to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            language: "unknown".to_string(),
            commands: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// The `billing-service` manifest every fresh registry can be seeded with
    pub fn demo() -> Self {
        let generated_at = chrono::Utc::now() - chrono::Duration::days(1);
        Manifest {
            namespace: DEMO_NAMESPACE.to_string(),
            source: "github.com/nexus/billing".to_string(),
            generated_at: generated_at.to_rfc3339(),
            language: "python".to_string(),
            commands: vec![Command {
                name: "invoice-generate".to_string(),
                id: format!("{}:invoice-generate", DEMO_NAMESPACE),
                description: "Generates a PDF invoice".to_string(),
                source_file: "src/invoicing.py".to_string(),
                language: "python".to_string(),
                entrypoint: "src.invoicing:generate".to_string(),
                runtime: "python:3.9-slim".to_string(),
                returns: "file".to_string(),
                confidence: 1.0,
                ..Default::default()
            }],
            warnings: Vec::new(),
        }
    }

    /// Get command by full id
    pub fn get_command(&self, id: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.id == id)
    }

    /// Count of commands in this manifest
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }
}

impl Command {
    /// Arguments that must be present on every invocation
    pub fn required_arguments(&self) -> impl Iterator<Item = &Argument> {
        self.arguments.iter().filter(|a| a.required)
    }

    pub fn return_shape(&self) -> ReturnShape {
        ReturnShape::from_tag(&self.returns)
    }
}

/// Whole confidences are written as integers (`1`, not `1.0`), the way the
/// analysis service and JavaScript tooling emit them.
fn serialize_confidence<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    let whole = value.is_finite()
        && value.fract().abs() < f64::EPSILON
        && value.abs() <= 9_007_199_254_740_992.0;
    if whole {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaffold_is_empty() {
        let manifest = Manifest::scaffold();
        assert_eq!(manifest.namespace, "new-project");
        assert_eq!(manifest.source, "manual-entry");
        assert_eq!(manifest.language, "unknown");
        assert!(manifest.commands.is_empty());
        assert!(manifest.warnings.is_empty());
    }

    #[test]
    fn test_demo_manifest_has_invoice_command() {
        let manifest = Manifest::demo();
        let command = manifest.get_command("billing-service:invoice-generate");
        assert!(command.is_some_and(|c| c.arguments.is_empty()
            && c.runtime == "python:3.9-slim"
            && c.return_shape() == ReturnShape::File));
    }

    #[test]
    fn test_argument_type_parse() {
        assert_eq!("file".parse::<ArgumentType>(), Ok(ArgumentType::File));
        assert!("str".parse::<ArgumentType>().is_err());
        assert_eq!(ArgumentType::Integer.to_string(), "integer");
    }

    #[test]
    fn test_return_shape_from_tag() {
        assert_eq!(ReturnShape::from_tag("json"), ReturnShape::Json);
        assert_eq!(ReturnShape::from_tag("JSON"), ReturnShape::Text);
        assert_eq!(ReturnShape::from_tag("file"), ReturnShape::File);
        assert_eq!(ReturnShape::from_tag("text"), ReturnShape::Text);
        assert_eq!(ReturnShape::from_tag(""), ReturnShape::Text);
    }

    #[test]
    fn test_default_value_untagged() {
        let parsed: Result<Vec<DefaultValue>, _> = serde_json::from_str(r#"[true, 3, 2.5, "x"]"#);
        assert!(parsed.is_ok_and(|v| v
            == vec![
                DefaultValue::Bool(true),
                DefaultValue::Int(3),
                DefaultValue::Float(2.5),
                DefaultValue::Str("x".to_string()),
            ]));
    }
}
