//! Nexus Manifest Management
//!
//! This crate holds the command manifest model and everything that operates
//! on it without a terminal: validation, copy-on-write editing, the registry
//! of published manifests, command lookup, JSON persistence, and the seam to
//! the external analysis service that produces candidate manifests.

pub mod edit;
pub mod errors;
pub mod lookup;
pub mod manifest;
pub mod producer;
pub mod registry;
pub mod types;
pub mod validation;

pub use edit::{bridge_example, ArgumentPatch, CommandPatch};
pub use errors::{ManifestError, ProducerError, PublishError};
pub use lookup::{resolve_command, ResolvedCommand};
pub use producer::{parse_producer_response, ExternalProducer, ManifestProducer};
pub use registry::{Registry, SharedRegistry};
pub use types::{
    Argument, ArgumentPosition, ArgumentType, Command, DefaultValue, Manifest, ReturnShape,
    SourceRange, DEMO_NAMESPACE,
};
pub use validation::{validate, ArgumentField, CommandField, ErrorKey, ValidationReport};
