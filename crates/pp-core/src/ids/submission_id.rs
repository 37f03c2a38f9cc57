use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Local identifier of one ledger submission.
///
/// Every status notification is tagged with the submission it belongs to, so a
/// late notification from an earlier attempt can be told apart from the
/// current one.
///
/// 一次链上提交的本地标识。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(String);

impl SubmissionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for SubmissionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl_id!(SubmissionId);
