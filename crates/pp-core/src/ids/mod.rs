//! ID type wrappers for type safety.

mod content_id;
mod id_macro;
mod submission_id;
mod tx_hash;

pub use alloy_primitives::Address;
pub use content_id::ContentId;
pub use submission_id::SubmissionId;
pub use tx_hash::{TxHash, TxHashParseError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_parses_checksummed_and_lowercase_forms_to_same_value() {
        let a: Address = "0x16f72991C9fd594f7Fe99aEC95a3684B94B598dd".parse().unwrap();
        let b: Address = "0x16f72991c9fd594f7fe99aec95a3684b94b598dd".parse().unwrap();
        assert_eq!(a, b);
        assert!(a
            .to_string()
            .eq_ignore_ascii_case("0x16f72991c9fd594f7fe99aec95a3684b94b598dd"));
    }

    #[test]
    fn address_rejects_bad_length_and_non_hex() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzz72991c9fd594f7fe99aec95a3684b94b598dd".parse::<Address>().is_err());
    }

    #[test]
    fn address_serde_round_trips_as_hex_string() {
        let address: Address = "0x00000000000000000000000000000000000000aa".parse().unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert!(json.starts_with("\"0x"));
        assert_eq!(serde_json::from_str::<Address>(&json).unwrap(), address);
    }
}
