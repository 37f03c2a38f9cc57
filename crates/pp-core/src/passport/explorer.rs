use crate::ids::TxHash;

pub const DEFAULT_EXPLORER_BASE_URL: &str = "https://sepolia.etherscan.io";

/// Link to a transaction on a block explorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerLink {
    pub url: String,
    pub hash: TxHash,
}

impl ExplorerLink {
    pub fn transaction(base_url: &str, hash: &TxHash) -> Self {
        Self {
            url: format!("{}/tx/{}", base_url.trim_end_matches('/'), hash),
            hash: hash.clone(),
        }
    }

    /// `0x12345678...abcdef`; hashes too short to shorten are returned as is.
    pub fn short_hash(&self) -> String {
        short_hash(self.hash.as_str())
    }
}

pub fn short_hash(hash: &str) -> String {
    if hash.len() <= 14 || !hash.is_ascii() {
        return hash.to_string();
    }
    format!("{}...{}", &hash[..8], &hash[hash.len() - 6..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_tx_url_without_double_slash() {
        let hash = TxHash::new_unchecked("0xabc");
        let link = ExplorerLink::transaction("https://sepolia.etherscan.io/", &hash);
        assert_eq!(link.url, "https://sepolia.etherscan.io/tx/0xabc");
    }

    #[test]
    fn shortens_long_hashes() {
        let hash = format!("0x{}", "1234567890abcdef".repeat(4));
        assert_eq!(short_hash(&hash), "0x123456...abcdef");
        assert_eq!(short_hash("0xDEADBEEF"), "0xDEADBEEF");
    }
}
