//! # pp-core
//!
//! Core domain models and business logic for Crefy Passport issuance.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

pub mod asset;
pub mod config;
pub mod ids;
pub mod passport;
pub mod ports;

// Re-export commonly used types at the crate root
pub use asset::{Asset, AssetPolicy, AssetSource};
pub use config::AppConfig;
pub use ids::{Address, ContentId, SubmissionId, TxHash};
pub use passport::{
    PassportAction, PassportError, PassportEvent, PassportStage, PassportState,
    PassportStateMachine,
};
