//! Passport issuance domain: names, ledger records, notifications and the
//! issuance state machine.

mod explorer;
mod name;
mod notification;
mod records;
mod state_machine;

pub use explorer::{short_hash, ExplorerLink, DEFAULT_EXPLORER_BASE_URL};
pub use name::{NameError, SubdomainName, MAX_NAME_LEN, MIN_NAME_LEN};
pub use notification::{Notification, NotificationLevel};
pub use records::{
    MintRecord, RegistrationRecord, Submission, TxStatus, TxStatusUpdate, UploadResult,
};
pub use state_machine::{
    PassportAction, PassportError, PassportErrorKind, PassportEvent, PassportPolicy,
    PassportStage, PassportState, PassportStateMachine, RegistrationGate, TxStep,
    DEFAULT_NAME_SUFFIX,
};
