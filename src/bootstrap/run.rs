//! Command execution: one function per subcommand.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::{info, info_span, Instrument};

use pp_app::{CapturePassportCard, PassportOrchestrator, UploadAsset};
use pp_core::asset::{Asset, AssetSource};
use pp_core::config::AppConfig;
use pp_core::ids::Address;
use pp_core::passport::{ExplorerLink, PassportState, SubdomainName};
use pp_core::ports::{PassportCardView, WalletSession};
use pp_infra::config::default_config_path;
use pp_infra::load_config;

use super::wiring::{wire_infrastructure, wire_passport_deps, wire_upload_strategy};
use crate::adapters::{PrintLinkOpener, TerminalEvents};
use crate::cli::{Cli, Commands};

pub async fn run(cli: Cli) -> Result<()> {
    if let Commands::ConfigPath = cli.command {
        return print_config_path(cli.config.as_deref());
    }

    let config = load_config(cli.config.as_deref())?;
    let account = cli
        .account
        .as_deref()
        .map(str::parse::<Address>)
        .transpose()
        .context("invalid --account")?;

    match cli.command {
        Commands::Issue { photo, name, card } => {
            run_issue(&config, account, &photo, name, card, cli.json)
                .instrument(info_span!("cmd.issue"))
                .await
        }
        Commands::Upload { file } => run_upload(&config, &file)
            .instrument(info_span!("cmd.upload"))
            .await,
        Commands::Register { name } => run_register(&config, account, name, cli.json)
            .instrument(info_span!("cmd.register"))
            .await,
        Commands::Card { photo, name, out } => run_card(&config, account, photo, name, out)
            .instrument(info_span!("cmd.card"))
            .await,
        Commands::ConfigPath => Ok(()),
    }
}

fn print_config_path(explicit: Option<&Path>) -> Result<()> {
    match explicit.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => {
            let note = if path.exists() { "" } else { " (not found, defaults apply)" };
            println!("{}{note}", path.display());
            Ok(())
        }
        None => Err(anyhow!("no configuration directory on this platform")),
    }
}

async fn build_orchestrator(
    config: &AppConfig,
    account: Option<Address>,
) -> Result<(Arc<PassportOrchestrator>, WalletSession)> {
    let infra = wire_infrastructure(config, account)?;
    let deps = wire_passport_deps(
        config,
        &infra,
        Arc::new(TerminalEvents::default()),
        Arc::new(PrintLinkOpener),
    )?;
    let orchestrator = Arc::new(PassportOrchestrator::new(deps));
    orchestrator.start().await?;

    let session = infra.wallet.connect().await?;
    info!(account = ?session.account, "signing account selected");
    Ok((orchestrator, session))
}

/// Wait for the step in flight and fail on a recorded error.
async fn settle(orchestrator: &PassportOrchestrator) -> Result<PassportState> {
    let state = orchestrator.wait_until_settled().await;
    match &state.error {
        Some(error) => Err(anyhow!("{error}")),
        None => Ok(state),
    }
}

async fn run_issue(
    config: &AppConfig,
    account: Option<Address>,
    photo: &Path,
    name: Option<String>,
    card: bool,
    json: bool,
) -> Result<()> {
    let (orchestrator, session) = build_orchestrator(config, account).await?;
    let photo_asset = read_asset(photo, AssetSource::ProfilePhoto).await?;

    if card {
        let view = PassportCardView {
            display_name: display_name(config, name.as_deref()),
            owner: session.active_account(),
            photo: Some(photo_asset.bytes),
        };
        orchestrator.submit_card(&view).await?;
    } else {
        orchestrator.submit_asset(photo_asset).await;
    }
    settle(&orchestrator).await?;

    orchestrator.request_mint().await;
    let mut state = settle(&orchestrator).await?;

    if let Some(name) = name {
        orchestrator.request_registration(name).await;
        state = settle(&orchestrator).await?;
    }

    report(config, &state, json)
}

async fn run_register(
    config: &AppConfig,
    account: Option<Address>,
    name: String,
    json: bool,
) -> Result<()> {
    let (orchestrator, _session) = build_orchestrator(config, account).await?;

    orchestrator.request_registration(name).await;
    let state = settle(&orchestrator).await?;

    report(config, &state, json)
}

async fn run_upload(config: &AppConfig, file: &Path) -> Result<()> {
    let asset = read_asset(file, AssetSource::FilePick).await?;
    config
        .passport
        .policy()
        .assets
        .check(&asset)
        .map_err(|rejection| anyhow!("{rejection}"))?;

    let infra = wire_infrastructure(config, None)?;
    let strategy = wire_upload_strategy(config, &infra.http)?;
    let upload = UploadAsset::new(strategy, Arc::new(TerminalEvents::default()));

    let result = upload.execute(&asset).await?;
    println!("{}", result.content_url);
    Ok(())
}

async fn run_card(
    config: &AppConfig,
    account: Option<Address>,
    photo: Option<PathBuf>,
    name: Option<String>,
    out: Option<PathBuf>,
) -> Result<()> {
    let photo = match photo {
        Some(path) => Some(read_asset(&path, AssetSource::ProfilePhoto).await?.bytes),
        None => None,
    };
    let view = PassportCardView {
        display_name: display_name(config, name.as_deref()),
        owner: account,
        photo,
    };

    let infra = wire_infrastructure(config, account)?;
    let capture = CapturePassportCard::new(infra.snapshot, config.snapshot.scale);
    let asset = capture.execute(&view).await?;

    let out = out.unwrap_or_else(|| PathBuf::from(&asset.filename));
    tokio::fs::write(&out, &asset.bytes)
        .await
        .with_context(|| format!("failed to write {}", out.display()))?;
    println!("{}", out.display());
    Ok(())
}

/// Full name for the card, when the given name is valid.
fn display_name(config: &AppConfig, name: Option<&str>) -> Option<String> {
    name.and_then(|n| SubdomainName::parse(n).ok())
        .map(|n| n.full_name(&config.passport.name_suffix))
}

async fn read_asset(path: &Path, source: AssetSource) -> Result<Asset> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let mut asset = Asset::new(bytes, filename, source);
    if let Some(mime) = mime_for(path) {
        asset = asset.with_mime_type(mime);
    }
    Ok(asset)
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "pdf" => Some("application/pdf"),
        "json" => Some("application/json"),
        _ => None,
    }
}

fn report(config: &AppConfig, state: &PassportState, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(state)?);
        return Ok(());
    }
    if let Some(upload) = &state.upload {
        println!("Content:      {}", upload.content_url);
    }
    if let Some(hash) = state.confirmed_mint_hash() {
        let link = ExplorerLink::transaction(&config.ledger.explorer_base_url, hash);
        println!("Minted:       {} ({})", link.short_hash(), link.url);
    }
    if let (Some(hash), Some(registration)) =
        (state.confirmed_registration_hash(), &state.registration)
    {
        let link = ExplorerLink::transaction(&config.ledger.explorer_base_url, hash);
        println!(
            "Registered:   {} {} ({})",
            registration.chosen_name.full_name(&config.passport.name_suffix),
            link.short_hash(),
            link.url
        );
    }
    Ok(())
}
