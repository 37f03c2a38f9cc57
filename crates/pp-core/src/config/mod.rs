//! # Configuration DTO / 配置数据
//!
//! Plain data mapped from TOML. Layering (defaults, file, environment) is done
//! by the loader in `pp-infra`; address parsing and policy derivation happen
//! at wiring time.

mod app_config;

pub use app_config::{
    AppConfig, BrokerConfig, ContractsConfig, LedgerConfig, PassportConfig, PinningConfig,
    SnapshotConfig, UploadMode,
};
