//! Passport issuance use cases.
//!
//! This module exposes the passport orchestrator.

mod context;
pub mod orchestrator;

pub use orchestrator::{LedgerNotification, PassportOrchestrator, PassportOrchestratorError};
