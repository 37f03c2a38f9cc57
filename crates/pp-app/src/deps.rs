//! # Application Dependencies / 应用依赖
//!
//! Parameter grouping for constructing the passport flow. Not a builder: every
//! field is required and nothing is defaulted here.

use std::sync::Arc;

use pp_core::ids::Address;
use pp_core::passport::PassportPolicy;
use pp_core::ports::*;

use crate::usecases::upload::UploadStrategy;

/// Ports and settings the orchestrator is built from.
pub struct PassportDeps {
    // Upload
    pub upload_strategy: UploadStrategy,

    // Ledger
    pub wallet: Arc<dyn WalletSessionPort>,
    pub ledger: Arc<dyn LedgerWritePort>,
    pub passport_contract: Address,
    pub registry_contract: Address,

    // Presentation
    pub snapshot: Arc<dyn SnapshotPort>,
    pub snapshot_scale: f32,
    pub events: Arc<dyn PassportEventPort>,
    pub link_opener: Arc<dyn LinkOpenerPort>,
    pub explorer_base_url: String,

    // System
    pub clock: Arc<dyn ClockPort>,
    pub policy: PassportPolicy,
}
