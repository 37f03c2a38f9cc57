//! Transient session records produced by each step of the flow.

use serde::{Deserialize, Serialize};

use crate::ids::{Address, ContentId, SubmissionId, TxHash};
use crate::passport::SubdomainName;

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub content_url: String,
    pub content_id: Option<ContentId>,
}

/// Lifecycle of a ledger submission.
///
/// 交易状态：Pending -> Confirming -> Confirmed | Failed。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    Pending,
    Confirming,
    Confirmed,
    Failed,
}

impl TxStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TxStatus::Confirmed | TxStatus::Failed)
    }

    pub fn is_in_flight(self) -> bool {
        !self.is_terminal()
    }

    fn rank(self) -> u8 {
        match self {
            TxStatus::Pending => 0,
            TxStatus::Confirming => 1,
            TxStatus::Confirmed | TxStatus::Failed => 2,
        }
    }

    /// Whether moving from `self` to `next` goes forward in the lifecycle.
    pub fn can_advance_to(self, next: TxStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

/// Asynchronous notification from the ledger-write capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatusUpdate {
    Pending,
    Confirming,
    Confirmed { hash: TxHash },
    Failed { reason: String },
}

impl TxStatusUpdate {
    pub fn status(&self) -> TxStatus {
        match self {
            TxStatusUpdate::Pending => TxStatus::Pending,
            TxStatusUpdate::Confirming => TxStatus::Confirming,
            TxStatusUpdate::Confirmed { .. } => TxStatus::Confirmed,
            TxStatusUpdate::Failed { .. } => TxStatus::Failed,
        }
    }
}

/// Shared shape of a tracked submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub owner: Address,
    pub transaction_hash: Option<TxHash>,
    pub status: TxStatus,
    pub failure: Option<String>,
    pub submitted_at_ms: i64,
}

impl Submission {
    pub fn pending(id: SubmissionId, owner: Address, submitted_at_ms: i64) -> Self {
        Self {
            id,
            owner,
            transaction_hash: None,
            status: TxStatus::Pending,
            failure: None,
            submitted_at_ms,
        }
    }

    /// Applies a status notification, returning `false` if it was stale.
    pub fn apply(&mut self, update: &TxStatusUpdate) -> bool {
        let next = update.status();
        if !self.status.can_advance_to(next) {
            return false;
        }
        self.status = next;
        match update {
            TxStatusUpdate::Confirmed { hash } => self.transaction_hash = Some(hash.clone()),
            TxStatusUpdate::Failed { reason } => self.failure = Some(reason.clone()),
            TxStatusUpdate::Pending | TxStatusUpdate::Confirming => {}
        }
        true
    }

    pub fn confirmed_hash(&self) -> Option<&TxHash> {
        match self.status {
            TxStatus::Confirmed => self.transaction_hash.as_ref(),
            _ => None,
        }
    }
}

/// A submitted passport mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRecord {
    pub content_url: String,
    pub submission: Submission,
}

/// A submitted subdomain registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub chosen_name: SubdomainName,
    pub submission: Submission,
}
