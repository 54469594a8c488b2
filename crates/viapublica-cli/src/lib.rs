//! Via Pública CLI library
//!
//! Configuration loading and the command implementations behind the
//! `viapublica` binary, exposed as a library so integration tests can drive
//! them without spawning a process.

pub mod commands;
pub mod config;

pub use config::CliConfig;
