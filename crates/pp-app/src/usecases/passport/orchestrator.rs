//! Passport orchestrator.
//!
//! This module coordinates the passport state machine and side effects.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};

use pp_core::asset::Asset;
use pp_core::ids::{Address, SubmissionId};
use pp_core::passport::{
    ExplorerLink, PassportAction, PassportEvent, PassportState, PassportStateMachine,
    TxStatusUpdate, TxStep,
};
use pp_core::ports::{
    ClockPort, LinkOpenerPort, PassportCardView, PassportEventPort, SnapshotError,
    WalletSessionPort,
};

use crate::deps::PassportDeps;
use crate::usecases::passport::context::PassportContext;
use crate::usecases::upload::UploadAsset;
use crate::usecases::{CapturePassportCard, MintCredential, RegisterName, SubmittedTx};

const WALLET_DISCONNECTED: &str = "wallet disconnected before submission";
const STATUS_STREAM_CLOSED: &str = "status stream closed before a final status";

/// Errors produced by the passport orchestrator.
///
/// Flow problems (validation, upload, transaction failures) are not errors
/// here; they land in `PassportState::error` and as notifications.
#[derive(Debug, thiserror::Error)]
pub enum PassportOrchestratorError {
    #[error("card snapshot failed: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("notification pump already started")]
    AlreadyStarted,
}

/// A ledger status update tagged with the submission it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerNotification {
    pub step: TxStep,
    pub submission: SubmissionId,
    pub update: TxStatusUpdate,
}

impl LedgerNotification {
    fn into_event(self) -> PassportEvent {
        match self.step {
            TxStep::Mint => PassportEvent::MintStatusChanged {
                submission: self.submission,
                update: self.update,
            },
            TxStep::Registration => PassportEvent::RegistrationStatusChanged {
                submission: self.submission,
                update: self.update,
            },
        }
    }
}

/// Orchestrator that drives passport state and side effects.
pub struct PassportOrchestrator {
    context: Arc<PassportContext>,
    machine: PassportStateMachine,

    // 能力型 use cases
    upload_asset: UploadAsset,
    mint_credential: MintCredential,
    register_name: RegisterName,
    capture_card: CapturePassportCard,

    wallet: Arc<dyn WalletSessionPort>,
    events: Arc<dyn PassportEventPort>,
    link_opener: Arc<dyn LinkOpenerPort>,
    clock: Arc<dyn ClockPort>,
    explorer_base_url: String,

    notification_tx: mpsc::UnboundedSender<LedgerNotification>,
    notification_rx: Mutex<Option<mpsc::UnboundedReceiver<LedgerNotification>>>,
}

impl PassportOrchestrator {
    pub fn new(deps: PassportDeps) -> Self {
        let (notification_tx, notification_rx) = mpsc::unbounded_channel();
        Self {
            context: PassportContext::default().arc(),
            machine: PassportStateMachine::new(deps.policy),
            upload_asset: UploadAsset::new(deps.upload_strategy, deps.events.clone()),
            mint_credential: MintCredential::new(deps.ledger.clone(), deps.passport_contract),
            register_name: RegisterName::new(deps.ledger, deps.registry_contract),
            capture_card: CapturePassportCard::new(deps.snapshot, deps.snapshot_scale),
            wallet: deps.wallet,
            events: deps.events,
            link_opener: deps.link_opener,
            clock: deps.clock,
            explorer_base_url: deps.explorer_base_url,
            notification_tx,
            notification_rx: Mutex::new(Some(notification_rx)),
        }
    }

    /// Start the task that feeds ledger notifications back into `dispatch`.
    ///
    /// The task holds a weak reference and ends once the orchestrator is dropped.
    pub async fn start(self: &Arc<Self>) -> Result<JoinHandle<()>, PassportOrchestratorError> {
        let mut rx = self
            .notification_rx
            .lock()
            .await
            .take()
            .ok_or(PassportOrchestratorError::AlreadyStarted)?;
        let weak: Weak<Self> = Arc::downgrade(self);
        let handle = tokio::spawn(
            async move {
                while let Some(notification) = rx.recv().await {
                    let Some(orchestrator) = weak.upgrade() else {
                        break;
                    };
                    orchestrator.dispatch(notification.into_event()).await;
                }
                debug!("ledger notification pump stopped");
            }
            .instrument(info_span!("usecase.passport_orchestrator.pump")),
        );
        Ok(handle)
    }

    pub async fn submit_asset(&self, asset: Asset) -> PassportState {
        self.dispatch(PassportEvent::SubmitAsset { asset }).await
    }

    /// Render the card and upload the snapshot.
    pub async fn submit_card(
        &self,
        view: &PassportCardView,
    ) -> Result<PassportState, PassportOrchestratorError> {
        let asset = self.capture_card.execute(view).await?;
        Ok(self.submit_asset(asset).await)
    }

    /// Render the card for download without touching the flow.
    pub async fn capture_card(
        &self,
        view: &PassportCardView,
    ) -> Result<Asset, PassportOrchestratorError> {
        Ok(self.capture_card.execute(view).await?)
    }

    pub async fn request_mint(&self) -> PassportState {
        let account = self.wallet.session().await.active_account();
        self.dispatch(PassportEvent::RequestMint {
            account,
            submission: SubmissionId::new(),
            now_ms: self.clock.now_ms(),
        })
        .await
    }

    pub async fn request_registration(&self, name: impl Into<String>) -> PassportState {
        let account = self.wallet.session().await.active_account();
        self.dispatch(PassportEvent::RequestRegistration {
            name: name.into(),
            account,
            submission: SubmissionId::new(),
            now_ms: self.clock.now_ms(),
        })
        .await
    }

    pub async fn reset(&self) -> PassportState {
        self.dispatch(PassportEvent::Reset).await
    }

    pub async fn get_state(&self) -> PassportState {
        self.context.get_state().await
    }

    pub fn subscribe(&self) -> watch::Receiver<PassportState> {
        self.context.subscribe()
    }

    /// Wait until no step is in flight and return that state.
    pub async fn wait_until_settled(&self) -> PassportState {
        let mut rx = self.subscribe();
        let settled = rx
            .wait_for(|state| !state.stage.is_busy())
            .await
            .map(|state| state.clone());
        match settled {
            Ok(state) => state,
            // The sender lives in our own context; fall back to a direct read.
            Err(_) => self.context.get_state().await,
        }
    }

    /// Apply one event and everything it leads to.
    ///
    /// The transition is computed and stored under the dispatch lock; uploads,
    /// submissions and links run after the lock is released, so busy stages
    /// are observable and concurrent requests are refused by the state machine.
    pub async fn dispatch(&self, event: PassportEvent) -> PassportState {
        let span = info_span!("usecase.passport_orchestrator.dispatch", event = ?event);
        async {
            let mut pending_events = VecDeque::from([event]);

            while let Some(event) = pending_events.pop_front() {
                let actions = {
                    let _dispatch_guard = self.context.acquire_dispatch_lock().await;
                    let from = self.context.get_state().await;
                    let event_name = format!("{:?}", event);
                    let (next, actions) = self.machine.transition(from.clone(), event);
                    info!(from = ?from.stage, to = ?next.stage, event = %event_name, "passport state transition");
                    if let Some(err) = next.error.as_ref().filter(|_| next.error != from.error) {
                        warn!(kind = ?err.kind(), error = %err, "passport flow error");
                    }
                    let (notifications, effects): (Vec<_>, Vec<_>) = actions
                        .into_iter()
                        .partition(|action| matches!(action, PassportAction::Notify { .. }));
                    // Observers of a stored state have already seen its toasts.
                    self.execute_actions(notifications).await;
                    if next != from {
                        self.set_state_and_emit(next).await;
                    }
                    effects
                };
                let follow_up_events = self.execute_actions(actions).await;
                pending_events.extend(follow_up_events);
            }

            self.context.get_state().await
        }
        .instrument(span)
        .await
    }

    async fn execute_actions(&self, actions: Vec<PassportAction>) -> Vec<PassportEvent> {
        let mut follow_up_events = Vec::new();
        for action in actions {
            debug!(?action, "passport executing action");
            match action {
                PassportAction::UploadAsset { asset } => {
                    let event = match self.upload_asset.execute(&asset).await {
                        Ok(upload) => PassportEvent::UploadSucceeded { upload },
                        Err(err) => {
                            error!(error = %err, filename = %asset.filename, "upload failed");
                            PassportEvent::UploadFailed {
                                reason: err.to_string(),
                            }
                        }
                    };
                    follow_up_events.push(event);
                }
                PassportAction::SubmitMint {
                    submission,
                    owner,
                    content_url,
                } => {
                    if !self.signer_matches(owner).await {
                        follow_up_events.push(PassportEvent::SignerUnavailable {
                            step: TxStep::Mint,
                            submission,
                        });
                        continue;
                    }
                    let submitted = self
                        .mint_credential
                        .execute(owner, &content_url)
                        .await
                        .map_err(|err| err.to_string());
                    follow_up_events.push(self.track_submission(
                        TxStep::Mint,
                        submission,
                        submitted,
                    ));
                }
                PassportAction::SubmitRegistration {
                    submission,
                    owner,
                    name,
                } => {
                    if !self.signer_matches(owner).await {
                        follow_up_events.push(PassportEvent::SignerUnavailable {
                            step: TxStep::Registration,
                            submission,
                        });
                        continue;
                    }
                    let submitted = self
                        .register_name
                        .execute(owner, &name)
                        .await
                        .map_err(|err| err.to_string());
                    follow_up_events.push(self.track_submission(
                        TxStep::Registration,
                        submission,
                        submitted,
                    ));
                }
                PassportAction::OpenExplorer { step, hash } => {
                    let link = ExplorerLink::transaction(&self.explorer_base_url, &hash);
                    info!(?step, hash = %link.short_hash(), "opening confirmed transaction");
                    if let Err(err) = self.link_opener.open_link(&link.url).await {
                        warn!(error = %err, url = %link.url, "failed to open explorer link");
                    }
                }
                PassportAction::Notify { notification } => {
                    self.events.emit_notification(notification).await;
                }
            }
        }
        follow_up_events
    }

    /// The session is read again right before signing; a disconnect or account
    /// switch since the request aborts the submission.
    async fn signer_matches(&self, owner: Address) -> bool {
        match self.wallet.session().await.active_account() {
            Some(account) if account == owner => true,
            other => {
                warn!(expected = %owner, actual = ?other, "{}", WALLET_DISCONNECTED);
                false
            }
        }
    }

    fn track_submission(
        &self,
        step: TxStep,
        submission: SubmissionId,
        submitted: Result<SubmittedTx, String>,
    ) -> PassportEvent {
        match submitted {
            Ok(SubmittedTx { handle, updates }) => {
                self.spawn_status_listener(step, submission.clone(), updates);
                let hash = Some(handle.hash);
                match step {
                    TxStep::Mint => PassportEvent::MintSubmitted { submission, hash },
                    TxStep::Registration => {
                        PassportEvent::RegistrationSubmitted { submission, hash }
                    }
                }
            }
            Err(reason) => {
                error!(?step, %reason, "transaction submission failed");
                LedgerNotification {
                    step,
                    submission,
                    update: TxStatusUpdate::Failed { reason },
                }
                .into_event()
            }
        }
    }

    /// Forward ledger updates into the notification channel. The listener
    /// never dispatches itself; the pump started by [`Self::start`] does.
    fn spawn_status_listener(
        &self,
        step: TxStep,
        submission: SubmissionId,
        mut updates: mpsc::Receiver<TxStatusUpdate>,
    ) {
        let notification_tx = self.notification_tx.clone();
        let span = info_span!("usecase.passport_orchestrator.listener", ?step, submission = %submission);
        tokio::spawn(
            async move {
                let mut reached_terminal = false;
                while let Some(update) = updates.recv().await {
                    reached_terminal = update.status().is_terminal();
                    let notification = LedgerNotification {
                        step,
                        submission: submission.clone(),
                        update,
                    };
                    if notification_tx.send(notification).is_err() {
                        return;
                    }
                    if reached_terminal {
                        break;
                    }
                }
                if !reached_terminal {
                    warn!("{}", STATUS_STREAM_CLOSED);
                    let _ = notification_tx.send(LedgerNotification {
                        step,
                        submission,
                        update: TxStatusUpdate::Failed {
                            reason: STATUS_STREAM_CLOSED.to_string(),
                        },
                    });
                }
            }
            .instrument(span),
        );
    }

    async fn set_state_and_emit(&self, state: PassportState) {
        self.context.set_state(state.clone()).await;
        self.events.emit_state_changed(state).await;
    }
}
