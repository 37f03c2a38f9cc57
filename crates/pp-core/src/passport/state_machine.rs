//! Passport issuance state machine.
//!
//! Defines a pure state transition function for the upload -> mint -> register
//! flow. Side effects are returned as [`PassportAction`]s and executed by the
//! orchestrator in `pp-app`.

use serde::{Deserialize, Serialize};

use crate::asset::{Asset, AssetPolicy, AssetRejection};
use crate::ids::{Address, SubmissionId, TxHash};
use crate::passport::{
    MintRecord, NameError, Notification, RegistrationRecord, Submission, SubdomainName,
    TxStatusUpdate, UploadResult,
};

pub const DEFAULT_NAME_SUFFIX: &str = "crefy.eth";

/// Stage of the issuance flow.
///
/// 签发流程阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassportStage {
    Idle,
    Uploading,
    Uploaded,
    Minting,
    Minted,
    Registering,
    Registered,
}

impl PassportStage {
    /// A step is in flight; every user request is refused until it settles.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            PassportStage::Uploading | PassportStage::Minting | PassportStage::Registering
        )
    }
}

/// Ledger-backed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStep {
    Mint,
    Registration,
}

/// Whether registration waits for a confirmed mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationGate {
    /// Combined flow: upload -> mint -> register.
    #[default]
    RequireMint,
    /// Registration has no mint prerequisite.
    Standalone,
}

/// Broad error category, used for logging and presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassportErrorKind {
    Validation,
    Transport,
    Transaction,
}

/// Errors surfaced by the issuance flow.
///
/// 签发流程错误类型。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum PassportError {
    #[error("asset rejected: {0}")]
    AssetRejected(AssetRejection),
    #[error("no uploaded asset to mint")]
    NoUpload,
    #[error("wallet not connected")]
    WalletNotConnected,
    #[error("invalid name: {0}")]
    InvalidName(NameError),
    #[error("mint has not been confirmed")]
    MintNotConfirmed,
    #[error("a step is already in flight ({stage:?})")]
    StepInFlight { stage: PassportStage },
    #[error("flow already completed, reset to start over")]
    FlowComplete,
    #[error("upload failed: {reason}")]
    UploadFailed { reason: String },
    #[error("{step:?} transaction failed: {reason}")]
    TransactionFailed { step: TxStep, reason: String },
}

impl PassportError {
    pub fn kind(&self) -> PassportErrorKind {
        match self {
            PassportError::UploadFailed { .. } => PassportErrorKind::Transport,
            PassportError::TransactionFailed { .. } => PassportErrorKind::Transaction,
            _ => PassportErrorKind::Validation,
        }
    }
}

/// Snapshot of the whole flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassportState {
    pub stage: PassportStage,
    pub upload: Option<UploadResult>,
    pub mint: Option<MintRecord>,
    pub registration: Option<RegistrationRecord>,
    pub error: Option<PassportError>,
}

impl Default for PassportState {
    fn default() -> Self {
        Self {
            stage: PassportStage::Idle,
            upload: None,
            mint: None,
            registration: None,
            error: None,
        }
    }
}

impl PassportState {
    pub fn confirmed_mint_hash(&self) -> Option<&TxHash> {
        self.mint.as_ref().and_then(|m| m.submission.confirmed_hash())
    }

    pub fn confirmed_registration_hash(&self) -> Option<&TxHash> {
        self.registration
            .as_ref()
            .and_then(|r| r.submission.confirmed_hash())
    }

    /// Stage implied by the settled records, ignoring anything in flight.
    ///
    /// A failed step returns here, so the user only retries what failed.
    pub fn settled_stage(&self) -> PassportStage {
        if self.confirmed_registration_hash().is_some() {
            PassportStage::Registered
        } else if self.confirmed_mint_hash().is_some() {
            PassportStage::Minted
        } else if self.upload.is_some() {
            PassportStage::Uploaded
        } else {
            PassportStage::Idle
        }
    }
}

/// Events that drive the issuance flow.
///
/// 驱动签发流程的事件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassportEvent {
    /// User supplies an asset to upload.
    SubmitAsset { asset: Asset },
    /// Upload finished (uploader callback).
    UploadSucceeded { upload: UploadResult },
    /// Upload failed (uploader callback).
    UploadFailed { reason: String },
    /// User asks to mint. `account` is the session account at request time.
    RequestMint {
        account: Option<Address>,
        submission: SubmissionId,
        now_ms: i64,
    },
    /// Ledger acknowledged the mint submission.
    MintSubmitted {
        submission: SubmissionId,
        hash: Option<TxHash>,
    },
    /// Ledger status notification for a mint.
    MintStatusChanged {
        submission: SubmissionId,
        update: TxStatusUpdate,
    },
    /// User asks to register `name`.
    RequestRegistration {
        name: String,
        account: Option<Address>,
        submission: SubmissionId,
        now_ms: i64,
    },
    /// Ledger acknowledged the registration submission.
    RegistrationSubmitted {
        submission: SubmissionId,
        hash: Option<TxHash>,
    },
    /// Ledger status notification for a registration.
    RegistrationStatusChanged {
        submission: SubmissionId,
        update: TxStatusUpdate,
    },
    /// The wallet no longer signs for the submission's owner; nothing was sent.
    SignerUnavailable {
        step: TxStep,
        submission: SubmissionId,
    },
    /// Start over with a fresh flow.
    Reset,
}

/// Side-effects produced by state transitions.
///
/// 状态迁移产生的副作用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassportAction {
    /// Pin the asset.
    UploadAsset { asset: Asset },
    /// Submit `safeMint(owner, content_url)`.
    SubmitMint {
        submission: SubmissionId,
        owner: Address,
        content_url: String,
    },
    /// Submit `registerSubname(name)` signed by `owner`.
    SubmitRegistration {
        submission: SubmissionId,
        owner: Address,
        name: SubdomainName,
    },
    /// Show the already confirmed transaction instead of resubmitting.
    OpenExplorer { step: TxStep, hash: TxHash },
    /// Show a notification to the user.
    Notify { notification: Notification },
}

/// Flow configuration consumed by the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassportPolicy {
    pub gate: RegistrationGate,
    pub assets: AssetPolicy,
    pub name_suffix: String,
}

impl Default for PassportPolicy {
    fn default() -> Self {
        Self {
            gate: RegistrationGate::default(),
            assets: AssetPolicy::default(),
            name_suffix: DEFAULT_NAME_SUFFIX.to_string(),
        }
    }
}

/// Pure passport state machine.
///
/// 纯状态机：不包含副作用。
#[derive(Debug, Clone, Default)]
pub struct PassportStateMachine {
    policy: PassportPolicy,
}

impl PassportStateMachine {
    pub fn new(policy: PassportPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PassportPolicy {
        &self.policy
    }

    pub fn transition(
        &self,
        state: PassportState,
        event: PassportEvent,
    ) -> (PassportState, Vec<PassportAction>) {
        match event {
            PassportEvent::SubmitAsset { asset } => self.on_submit_asset(state, asset),
            PassportEvent::UploadSucceeded { upload } => on_upload_succeeded(state, upload),
            PassportEvent::UploadFailed { reason } => on_upload_failed(state, reason),
            PassportEvent::RequestMint {
                account,
                submission,
                now_ms,
            } => on_request_mint(state, account, submission, now_ms),
            PassportEvent::MintSubmitted { submission, hash } => {
                on_submitted(state, TxStep::Mint, submission, hash)
            }
            PassportEvent::MintStatusChanged { submission, update } => {
                self.on_status_changed(state, TxStep::Mint, submission, update)
            }
            PassportEvent::RequestRegistration {
                name,
                account,
                submission,
                now_ms,
            } => self.on_request_registration(state, name, account, submission, now_ms),
            PassportEvent::RegistrationSubmitted { submission, hash } => {
                on_submitted(state, TxStep::Registration, submission, hash)
            }
            PassportEvent::RegistrationStatusChanged { submission, update } => {
                self.on_status_changed(state, TxStep::Registration, submission, update)
            }
            PassportEvent::SignerUnavailable { step, submission } => {
                on_signer_unavailable(state, step, submission)
            }
            PassportEvent::Reset => on_reset(state),
        }
    }

    fn on_submit_asset(
        &self,
        state: PassportState,
        asset: Asset,
    ) -> (PassportState, Vec<PassportAction>) {
        if state.stage.is_busy() {
            let stage = state.stage;
            return reject_silently(state, PassportError::StepInFlight { stage });
        }
        // The image is frozen once minted. A standalone registration leaves it open.
        if state.confirmed_mint_hash().is_some() {
            let description = if state.confirmed_registration_hash().is_some() {
                "Your passport is already issued. Start over to use a new image."
            } else {
                "Your passport image is already minted. Start over to use a new image."
            };
            return reject(
                state,
                PassportError::FlowComplete,
                Notification::error("Error", description),
            );
        }
        if let Err(rejection) = self.policy.assets.check(&asset) {
            let notification = asset_rejection_notification(&rejection);
            return reject(state, PassportError::AssetRejected(rejection), notification);
        }
        let next = PassportState {
            stage: PassportStage::Uploading,
            error: None,
            ..state
        };
        (next, vec![PassportAction::UploadAsset { asset }])
    }

    fn on_request_registration(
        &self,
        state: PassportState,
        name: String,
        account: Option<Address>,
        submission: SubmissionId,
        now_ms: i64,
    ) -> (PassportState, Vec<PassportAction>) {
        if state.stage.is_busy() {
            let stage = state.stage;
            return reject_silently(state, PassportError::StepInFlight { stage });
        }
        if let Some(hash) = state.confirmed_registration_hash().cloned() {
            return (
                state,
                vec![PassportAction::OpenExplorer {
                    step: TxStep::Registration,
                    hash,
                }],
            );
        }
        if self.policy.gate == RegistrationGate::RequireMint && state.stage != PassportStage::Minted
        {
            return reject(
                state,
                PassportError::MintNotConfirmed,
                Notification::error("Error", "Please mint your passport before choosing a name"),
            );
        }

        let name = match SubdomainName::parse(&name) {
            Ok(name) => name,
            Err(err) => {
                let notification = match err {
                    NameError::Empty => {
                        Notification::error("Error", "Please enter a name for your passport")
                    }
                    ref other => Notification::error("Invalid name", other.to_string()),
                };
                return reject(state, PassportError::InvalidName(err), notification);
            }
        };
        let Some(owner) = account else {
            return reject(state, PassportError::WalletNotConnected, wallet_notification());
        };

        let record = RegistrationRecord {
            chosen_name: name.clone(),
            submission: Submission::pending(submission.clone(), owner, now_ms),
        };
        let next = PassportState {
            stage: PassportStage::Registering,
            registration: Some(record),
            error: None,
            ..state
        };
        (
            next,
            vec![PassportAction::SubmitRegistration {
                submission,
                owner,
                name,
            }],
        )
    }

    fn on_status_changed(
        &self,
        mut state: PassportState,
        step: TxStep,
        submission: SubmissionId,
        update: TxStatusUpdate,
    ) -> (PassportState, Vec<PassportAction>) {
        let in_flight_stage = match step {
            TxStep::Mint => PassportStage::Minting,
            TxStep::Registration => PassportStage::Registering,
        };
        if state.stage != in_flight_stage {
            return ignore(state, "status update outside of its in-flight stage");
        }
        let record = match step {
            TxStep::Mint => state.mint.as_mut().map(|m| &mut m.submission),
            TxStep::Registration => state.registration.as_mut().map(|r| &mut r.submission),
        };
        let Some(record) = record.filter(|r| r.id == submission) else {
            return ignore(state, "status update for a stale submission");
        };
        if !record.apply(&update) {
            return ignore(state, "status update does not advance the submission");
        }

        match update {
            TxStatusUpdate::Pending | TxStatusUpdate::Confirming => (state, Vec::new()),
            TxStatusUpdate::Confirmed { .. } => {
                let notification = match step {
                    TxStep::Mint => Notification::success("Success!", "NFT minted successfully!"),
                    TxStep::Registration => {
                        let full_name = state
                            .registration
                            .as_ref()
                            .map(|r| r.chosen_name.full_name(&self.policy.name_suffix))
                            .unwrap_or_default();
                        Notification::success(
                            "Success!",
                            format!("Your {full_name} passport is now ready!"),
                        )
                    }
                };
                state.stage = state.settled_stage();
                state.error = None;
                (state, vec![PassportAction::Notify { notification }])
            }
            TxStatusUpdate::Failed { reason } => {
                state.stage = state.settled_stage();
                state.error = Some(PassportError::TransactionFailed { step, reason });
                (
                    state,
                    vec![PassportAction::Notify {
                        notification: Notification::error(
                            "Transaction Failed",
                            "There was an error processing your request. Please try again.",
                        ),
                    }],
                )
            }
        }
    }
}

fn on_upload_succeeded(
    state: PassportState,
    upload: UploadResult,
) -> (PassportState, Vec<PassportAction>) {
    if state.stage != PassportStage::Uploading {
        return ignore(state, "upload result outside of Uploading");
    }
    let mut next = PassportState {
        upload: Some(upload),
        mint: None,
        error: None,
        ..state
    };
    next.stage = next.settled_stage();
    (
        next,
        vec![PassportAction::Notify {
            notification: Notification::success("Uploaded", "File uploaded successfully to IPFS!"),
        }],
    )
}

fn on_upload_failed(state: PassportState, reason: String) -> (PassportState, Vec<PassportAction>) {
    if state.stage != PassportStage::Uploading {
        return ignore(state, "upload failure outside of Uploading");
    }
    let next = PassportState {
        stage: state.settled_stage(),
        error: Some(PassportError::UploadFailed { reason }),
        ..state
    };
    (
        next,
        vec![PassportAction::Notify {
            notification: Notification::error("Upload failed", "Failed to upload Passport"),
        }],
    )
}

fn on_request_mint(
    state: PassportState,
    account: Option<Address>,
    submission: SubmissionId,
    now_ms: i64,
) -> (PassportState, Vec<PassportAction>) {
    if state.stage.is_busy() {
        let stage = state.stage;
        return reject_silently(state, PassportError::StepInFlight { stage });
    }
    if let Some(hash) = state.confirmed_mint_hash().cloned() {
        return (
            state,
            vec![PassportAction::OpenExplorer {
                step: TxStep::Mint,
                hash,
            }],
        );
    }
    let Some(content_url) = state.upload.as_ref().map(|u| u.content_url.clone()) else {
        return reject(
            state,
            PassportError::NoUpload,
            Notification::error("Error", "Please upload your passport image first"),
        );
    };
    let Some(owner) = account else {
        return reject(state, PassportError::WalletNotConnected, wallet_notification());
    };

    let record = MintRecord {
        content_url: content_url.clone(),
        submission: Submission::pending(submission.clone(), owner, now_ms),
    };
    let next = PassportState {
        stage: PassportStage::Minting,
        mint: Some(record),
        error: None,
        ..state
    };
    (
        next,
        vec![PassportAction::SubmitMint {
            submission,
            owner,
            content_url,
        }],
    )
}

fn on_submitted(
    mut state: PassportState,
    step: TxStep,
    submission: SubmissionId,
    hash: Option<TxHash>,
) -> (PassportState, Vec<PassportAction>) {
    let record = match (step, state.stage) {
        (TxStep::Mint, PassportStage::Minting) => state.mint.as_mut().map(|m| &mut m.submission),
        (TxStep::Registration, PassportStage::Registering) => {
            state.registration.as_mut().map(|r| &mut r.submission)
        }
        _ => None,
    };
    let Some(record) = record.filter(|r| r.id == submission) else {
        return ignore(state, "submission acknowledgement for a stale submission");
    };
    let Some(hash) = hash else {
        return (state, Vec::new());
    };
    record.transaction_hash = Some(hash.clone());
    (
        state,
        vec![PassportAction::Notify {
            notification: Notification::info(
                "Transaction submitted",
                format!("Transaction submitted with hash: {hash}"),
            ),
        }],
    )
}

fn on_signer_unavailable(
    mut state: PassportState,
    step: TxStep,
    submission: SubmissionId,
) -> (PassportState, Vec<PassportAction>) {
    let record = match (step, state.stage) {
        (TxStep::Mint, PassportStage::Minting) => state.mint.as_ref().map(|m| &m.submission),
        (TxStep::Registration, PassportStage::Registering) => {
            state.registration.as_ref().map(|r| &r.submission)
        }
        _ => None,
    };
    if !record.is_some_and(|r| r.id == submission) {
        return ignore(state, "signer check for a stale submission");
    }
    // Nothing reached the ledger, so the attempt leaves no record.
    match step {
        TxStep::Mint => state.mint = None,
        TxStep::Registration => state.registration = None,
    }
    state.stage = state.settled_stage();
    reject(state, PassportError::WalletNotConnected, wallet_notification())
}

fn on_reset(state: PassportState) -> (PassportState, Vec<PassportAction>) {
    if state.stage.is_busy() {
        let stage = state.stage;
        return reject_silently(state, PassportError::StepInFlight { stage });
    }
    (PassportState::default(), Vec::new())
}

fn reject(
    state: PassportState,
    error: PassportError,
    notification: Notification,
) -> (PassportState, Vec<PassportAction>) {
    let next = PassportState {
        error: Some(error),
        ..state
    };
    (next, vec![PassportAction::Notify { notification }])
}

/// Refusal without a toast: the affordance is withdrawn while busy.
fn reject_silently(
    state: PassportState,
    error: PassportError,
) -> (PassportState, Vec<PassportAction>) {
    let next = PassportState {
        error: Some(error),
        ..state
    };
    (next, Vec::new())
}

fn ignore(state: PassportState, _why: &'static str) -> (PassportState, Vec<PassportAction>) {
    #[cfg(feature = "tracing")]
    tracing::debug!(stage = ?state.stage, reason = _why, "passport event ignored");
    (state, Vec::new())
}

fn wallet_notification() -> Notification {
    Notification::error("Error", "Please connect your wallet first")
}

fn asset_rejection_notification(rejection: &AssetRejection) -> Notification {
    match rejection {
        AssetRejection::Empty => Notification::error("Error", "Please select a file first"),
        AssetRejection::TooLarge { limit, .. } => Notification::error(
            "File too large",
            format!(
                "Please select an image smaller than {}MB",
                limit / (1024 * 1024)
            ),
        ),
    }
}
