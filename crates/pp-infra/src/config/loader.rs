use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use pp_core::config::AppConfig;
use alloy_primitives::hex::FromHexError;
use pp_core::ids::Address;

pub const ENV_PREFIX: &str = "PASSPORT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("config file not found: {0}")]
    MissingFile(PathBuf),
    #[error("contracts.{field} is not set")]
    MissingContract { field: &'static str },
    #[error("contracts.{field} is not a valid address: {source}")]
    InvalidContract {
        field: &'static str,
        #[source]
        source: FromHexError,
    },
}

/// `<config_dir>/crefy-passport/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("crefy-passport").join("config.toml"))
}

/// Load configuration.
///
/// An explicitly given `path` must exist; the default location is optional.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let defaults = Config::try_from(&AppConfig::default())?;
    let mut builder = Config::builder().add_source(defaults);

    match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }
        None => {
            if let Some(default_path) = default_config_path() {
                tracing::debug!(path = %default_path.display(), "checking default config file");
                builder = builder.add_source(
                    File::from(default_path)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }
    }

    let config = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(config.try_deserialize::<AppConfig>()?)
}

/// Parse a contract address from the `[contracts]` section.
pub fn parse_contract_address(field: &'static str, value: &str) -> Result<Address, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingContract { field });
    }
    value
        .parse()
        .map_err(|source| ConfigError::InvalidContract { field, source })
}
