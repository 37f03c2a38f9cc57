//! Crefy Passport application layer
//!
//! Use cases for uploading, minting and registering, and the orchestrator
//! that sequences them.

pub mod deps;
pub mod usecases;

pub use deps::PassportDeps;
pub use usecases::{
    CapturePassportCard, MintCredential, PassportOrchestrator, PassportOrchestratorError,
    RegisterName, UploadAsset,
};
