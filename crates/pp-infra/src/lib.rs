pub mod config;
pub mod ledger;
pub mod pinning;
pub mod snapshot;
pub mod time;

pub use self::config::{load_config, ConfigError};
pub use ledger::{EthereumLedger, JsonRpcClient, RpcWalletSession};
pub use pinning::{HttpUploadBroker, PinataClient};
pub use snapshot::CardRenderer;
pub use time::SystemClock;
