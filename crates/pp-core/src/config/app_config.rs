use serde::{Deserialize, Serialize};

use crate::asset::{AssetPolicy, DEFAULT_MAX_DIRECT_UPLOAD_MB, DEFAULT_MAX_PROFILE_PHOTO_BYTES};
use crate::passport::{
    PassportPolicy, RegistrationGate, DEFAULT_EXPLORER_BASE_URL, DEFAULT_NAME_SUFFIX,
};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub pinning: PinningConfig,
    pub broker: BrokerConfig,
    pub ledger: LedgerConfig,
    pub contracts: ContractsConfig,
    pub passport: PassportConfig,
    pub snapshot: SnapshotConfig,
}

/// Pinata pinning service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinningConfig {
    pub api_url: String,
    /// Bearer token. Usually supplied as `PASSPORT__PINNING__JWT`.
    pub jwt: String,
    pub gateway_url: String,
}

impl Default for PinningConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.pinata.cloud".to_string(),
            jwt: String::new(),
            gateway_url: "https://gateway.pinata.cloud".to_string(),
        }
    }
}

/// Direct-upload broker used by the multi-step uploader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BrokerConfig {
    /// Empty means no broker is configured.
    pub base_url: String,
}

/// JSON-RPC endpoint and confirmation tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub rpc_url: String,
    pub explorer_base_url: String,
    pub poll_interval_ms: u64,
    pub confirmations: u64,
    pub receipt_timeout_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            explorer_base_url: DEFAULT_EXPLORER_BASE_URL.to_string(),
            poll_interval_ms: 2_000,
            confirmations: 1,
            receipt_timeout_secs: 180,
        }
    }
}

/// Contract addresses as written in the file; parsed at wiring time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ContractsConfig {
    pub passport: String,
    pub registry: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UploadMode {
    /// Single call to the pinning service.
    #[default]
    Pin,
    /// Upload target, byte transfer, gateway lookup.
    Broker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassportConfig {
    pub name_suffix: String,
    pub registration_gate: RegistrationGate,
    pub upload_mode: UploadMode,
    pub max_profile_photo_bytes: u64,
    pub max_direct_upload_mb: u64,
}

impl Default for PassportConfig {
    fn default() -> Self {
        Self {
            name_suffix: DEFAULT_NAME_SUFFIX.to_string(),
            registration_gate: RegistrationGate::default(),
            upload_mode: UploadMode::default(),
            max_profile_photo_bytes: DEFAULT_MAX_PROFILE_PHOTO_BYTES,
            max_direct_upload_mb: DEFAULT_MAX_DIRECT_UPLOAD_MB,
        }
    }
}

impl PassportConfig {
    pub fn policy(&self) -> PassportPolicy {
        PassportPolicy {
            gate: self.registration_gate,
            assets: AssetPolicy {
                max_profile_photo_bytes: self.max_profile_photo_bytes,
                max_direct_upload_mb: self.max_direct_upload_mb,
            },
            name_suffix: self.name_suffix.clone(),
        }
    }
}

/// Card rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub scale: f32,
    pub width: u32,
    pub height: u32,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            scale: 2.0,
            width: 400,
            height: 250,
        }
    }
}

impl AppConfig {
    /// Map a parsed TOML document onto the DTO. Missing keys keep their defaults.
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let config = AppConfig::deserialize(toml_value.clone())?;
        Ok(config)
    }
}
