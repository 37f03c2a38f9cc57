//! # Dependency Injection / 依赖注入模块
//!
//! The only place that knows both `pp-infra` adapters and `pp-app` use cases.
//! Builds adapters from [`AppConfig`] and assembles [`PassportDeps`]; no flow
//! decisions are made here.

use std::sync::Arc;
use std::time::Duration;

use pp_app::usecases::upload::UploadStrategy;
use pp_app::PassportDeps;
use pp_core::config::{AppConfig, UploadMode};
use pp_core::ids::Address;
use pp_core::ports::*;
use pp_infra::config::parse_contract_address;
use pp_infra::ledger::ReceiptPolicy;
use pp_infra::{
    CardRenderer, ConfigError, EthereumLedger, HttpUploadBroker, JsonRpcClient, PinataClient,
    RpcWalletSession, SystemClock,
};

/// Result type for wiring operations
pub type WiringResult<T> = Result<T, WiringError>;

/// Errors during dependency injection
/// 依赖注入错误
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("HTTP client initialization failed: {0}")]
    HttpClient(String),

    #[error("pinning.jwt is not set")]
    MissingPinningJwt,

    #[error("broker.base_url is not set")]
    MissingBrokerUrl,
}

const USER_AGENT: &str = concat!("crefy-passport/", env!("CARGO_PKG_VERSION"));

/// Adapters shared by every command.
pub struct Infrastructure {
    pub http: reqwest::Client,
    pub rpc: Arc<JsonRpcClient>,
    pub wallet: Arc<dyn WalletSessionPort>,
    pub snapshot: Arc<dyn SnapshotPort>,
}

/// Build the HTTP client, JSON-RPC client, wallet session and card renderer.
pub fn wire_infrastructure(
    config: &AppConfig,
    preferred_account: Option<Address>,
) -> WiringResult<Infrastructure> {
    let http = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| WiringError::HttpClient(e.to_string()))?;
    let rpc = Arc::new(JsonRpcClient::new(http.clone(), config.ledger.rpc_url.clone()));
    let wallet: Arc<dyn WalletSessionPort> =
        Arc::new(RpcWalletSession::new(rpc.clone(), preferred_account));
    let snapshot: Arc<dyn SnapshotPort> = Arc::new(CardRenderer::new(
        config.snapshot.width,
        config.snapshot.height,
    ));

    Ok(Infrastructure {
        http,
        rpc,
        wallet,
        snapshot,
    })
}

/// Pick the upload path named by `passport.upload_mode`.
pub fn wire_upload_strategy(config: &AppConfig, http: &reqwest::Client) -> WiringResult<UploadStrategy> {
    match config.passport.upload_mode {
        UploadMode::Pin => {
            if config.pinning.jwt.trim().is_empty() {
                return Err(WiringError::MissingPinningJwt);
            }
            let client = PinataClient::new(
                http.clone(),
                config.pinning.api_url.clone(),
                config.pinning.jwt.clone(),
                config.pinning.gateway_url.clone(),
            );
            Ok(UploadStrategy::Pin(Arc::new(client)))
        }
        UploadMode::Broker => {
            if config.broker.base_url.trim().is_empty() {
                return Err(WiringError::MissingBrokerUrl);
            }
            let broker = HttpUploadBroker::new(http.clone(), config.broker.base_url.clone());
            Ok(UploadStrategy::Broker {
                broker: Arc::new(broker),
                max_direct_upload_mb: config.passport.max_direct_upload_mb,
            })
        }
    }
}

pub fn receipt_policy(config: &AppConfig) -> ReceiptPolicy {
    ReceiptPolicy {
        poll_interval: Duration::from_millis(config.ledger.poll_interval_ms.max(1)),
        confirmations: config.ledger.confirmations.max(1),
        timeout: Duration::from_secs(config.ledger.receipt_timeout_secs),
    }
}

/// Assemble everything the orchestrator needs.
pub fn wire_passport_deps(
    config: &AppConfig,
    infra: &Infrastructure,
    events: Arc<dyn PassportEventPort>,
    link_opener: Arc<dyn LinkOpenerPort>,
) -> WiringResult<PassportDeps> {
    let passport_contract = parse_contract_address("passport", &config.contracts.passport)?;
    let registry_contract = parse_contract_address("registry", &config.contracts.registry)?;
    let upload_strategy = wire_upload_strategy(config, &infra.http)?;
    let ledger: Arc<dyn LedgerWritePort> =
        Arc::new(EthereumLedger::new(infra.rpc.clone(), receipt_policy(config)));

    Ok(PassportDeps {
        upload_strategy,
        wallet: infra.wallet.clone(),
        ledger,
        passport_contract,
        registry_contract,
        snapshot: infra.snapshot.clone(),
        snapshot_scale: config.snapshot.scale,
        events,
        link_opener,
        explorer_base_url: config.ledger.explorer_base_url.clone(),
        clock: Arc::new(SystemClock),
        policy: config.passport.policy(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{PrintLinkOpener, TerminalEvents};

    fn config_with_contracts() -> AppConfig {
        let mut config = AppConfig::default();
        config.contracts.passport = "0x00000000000000000000000000000000000000c0".into();
        config.contracts.registry = "0x00000000000000000000000000000000000000c1".into();
        config.pinning.jwt = "jwt".into();
        config
    }

    fn wire(config: &AppConfig) -> WiringResult<PassportDeps> {
        let infra = wire_infrastructure(config, None)?;
        wire_passport_deps(
            config,
            &infra,
            Arc::new(TerminalEvents::default()),
            Arc::new(PrintLinkOpener),
        )
    }

    #[test]
    fn test_wiring_reads_contracts_and_policy() {
        let config = config_with_contracts();
        let deps = wire(&config).unwrap();

        assert_eq!(
            deps.passport_contract,
            config.contracts.passport.parse::<Address>().unwrap()
        );
        assert_eq!(
            deps.registry_contract,
            config.contracts.registry.parse::<Address>().unwrap()
        );
        assert_eq!(deps.policy, config.passport.policy());
        assert!(matches!(deps.upload_strategy, UploadStrategy::Pin(_)));
    }

    #[test]
    fn test_wiring_requires_contracts() {
        let mut config = config_with_contracts();
        config.contracts.registry = String::new();

        assert!(matches!(
            wire(&config),
            Err(WiringError::Config(ConfigError::MissingContract { field: "registry" }))
        ));
    }

    #[test]
    fn test_broker_mode_requires_base_url() {
        let mut config = config_with_contracts();
        config.passport.upload_mode = UploadMode::Broker;

        assert!(matches!(wire(&config), Err(WiringError::MissingBrokerUrl)));

        config.broker.base_url = "https://passport.example".into();
        let deps = wire(&config).unwrap();
        assert!(matches!(
            deps.upload_strategy,
            UploadStrategy::Broker {
                max_direct_upload_mb: 50,
                ..
            }
        ));
    }

    #[test]
    fn test_pin_mode_requires_jwt() {
        let mut config = config_with_contracts();
        config.pinning.jwt = "  ".into();

        assert!(matches!(wire(&config), Err(WiringError::MissingPinningJwt)));
    }

    #[test]
    fn test_receipt_policy_never_polls_with_zero_interval() {
        let mut config = AppConfig::default();
        config.ledger.poll_interval_ms = 0;
        config.ledger.confirmations = 0;

        let policy = receipt_policy(&config);
        assert_eq!(policy.poll_interval, Duration::from_millis(1));
        assert_eq!(policy.confirmations, 1);
    }
}
