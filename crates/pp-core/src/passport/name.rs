//! Passport subdomain names.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 63;

/// Reasons a chosen name is refused before it reaches the registry.
///
/// 名称校验失败原因。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum NameError {
    #[error("name is empty")]
    Empty,
    #[error("name must be at least {min} characters")]
    TooShort { min: usize },
    #[error("name must be at most {max} characters")]
    TooLong { max: usize },
    #[error("name may only contain a-z, 0-9 and '-' (found {found:?})")]
    InvalidCharacter { found: char },
    #[error("name must not start or end with '-'")]
    EdgeHyphen,
}

/// A validated subdomain label, e.g. `alice` in `alice.crefy.eth`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubdomainName(String);

impl SubdomainName {
    /// Validates user input as a DNS-safe label.
    ///
    /// Input is trimmed and lower-cased first, so `" Alice "` becomes `alice`.
    pub fn parse(input: &str) -> Result<Self, NameError> {
        let name = input.trim().to_ascii_lowercase();
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if let Some(found) = name
            .chars()
            .find(|c| !matches!(c, 'a'..='z' | '0'..='9' | '-'))
        {
            return Err(NameError::InvalidCharacter { found });
        }
        if name.len() < MIN_NAME_LEN {
            return Err(NameError::TooShort { min: MIN_NAME_LEN });
        }
        if name.len() > MAX_NAME_LEN {
            return Err(NameError::TooLong { max: MAX_NAME_LEN });
        }
        if name.starts_with('-') || name.ends_with('-') {
            return Err(NameError::EdgeHyphen);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `alice` + `crefy.eth` -> `alice.crefy.eth`
    pub fn full_name(&self, suffix: &str) -> String {
        format!("{}.{}", self.0, suffix.trim_start_matches('.'))
    }
}

impl Display for SubdomainName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
