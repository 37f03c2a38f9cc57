//! # Configuration Loader / 配置加载器
//!
//! Layers, later wins:
//! 1. built-in defaults (`AppConfig::default()`)
//! 2. optional TOML file
//! 3. `PASSPORT__<SECTION>__<KEY>` environment variables

mod loader;

pub use loader::{
    default_config_path, load_config, parse_contract_address, ConfigError, ENV_PREFIX,
};
