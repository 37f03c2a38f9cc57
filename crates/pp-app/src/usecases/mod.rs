//! Passport use cases.
//!
//! Capability use cases (`UploadAsset`, `MintCredential`, `RegisterName`,
//! `CapturePassportCard`) each wrap one external capability. The
//! `PassportOrchestrator` sequences them through the pure state machine.

pub mod capture_passport_card;
pub mod mint_credential;
pub mod passport;
pub mod register_name;
mod submission;
pub mod upload;

pub use capture_passport_card::CapturePassportCard;
pub use mint_credential::MintCredential;
pub use passport::{PassportOrchestrator, PassportOrchestratorError};
pub use register_name::RegisterName;
pub use submission::SubmittedTx;
pub use upload::{UploadAsset, UploadError, UploadStrategy};
