use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transaction hash must be 0x followed by 64 hex characters: {0}")]
pub struct TxHashParseError(pub String);

/// Transaction hash reported by the ledger.
///
/// Normalised to lowercase so hashes reported by different notifications
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(String);

impl TxHash {
    /// Wraps a hash string without validating it.
    ///
    /// Used for values that come straight from a trusted ledger adapter or
    /// from tests with readable placeholder hashes.
    pub fn new_unchecked(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }
}

impl FromStr for TxHash {
    type Err = TxHashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix("0x")
            .ok_or_else(|| TxHashParseError(trimmed.to_string()))?;
        if body.len() != 64 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TxHashParseError(trimmed.to_string()));
        }
        Ok(Self(format!("0x{}", body.to_ascii_lowercase())))
    }
}

impl_id!(TxHash);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalises_case() {
        let raw = format!("0x{}", "AB".repeat(32));
        let hash: TxHash = raw.parse().unwrap();
        assert_eq!(hash.as_str(), format!("0x{}", "ab".repeat(32)));
    }

    #[test]
    fn parse_rejects_short_hash() {
        assert!("0xdeadbeef".parse::<TxHash>().is_err());
    }
}
