use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Content identifier (CID) assigned by the pinning service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(String);

impl From<&str> for ContentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl_id!(ContentId);
