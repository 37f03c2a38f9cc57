//! Crefy Passport command-line shell
//!
//! Parses the command line, loads configuration, wires the `pp-infra`
//! adapters into the `pp-app` orchestrator and reports progress on the
//! terminal.

pub mod adapters;
pub mod bootstrap;
pub mod cli;
