//! Nexus CLI library - the simulated terminal and its subcommands
//!
//! The interpreter, session and pipeline live here so that they can be
//! driven from tests as well as from the `nexus` binary.

pub mod binding;
pub mod commands;
pub mod common;
pub mod errors;
pub mod events;
pub mod interpreter;
pub mod pipeline;
pub mod render;
pub mod session;
pub mod shell;

pub use common::GlobalOpts;
