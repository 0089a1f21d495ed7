pub mod analyze;
pub mod config;
pub mod exec;
pub mod scaffold;
pub mod shell;
pub mod simulator;
pub mod validate;
