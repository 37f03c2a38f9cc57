//! Port interfaces for the application layer
//!
//! Ports define the contract between the issuance use cases and the
//! infrastructure that talks to pinning services, wallets and the ledger.
//! Use cases depend on these traits only; adapters live in `pp-infra` and in
//! the binary shell.

mod clock;
pub mod ledger;
mod link_opener;
mod passport_event;
pub mod pinning;
pub mod snapshot;
pub mod upload_broker;
pub mod wallet;

pub use clock::*;
pub use ledger::{ContractCall, LedgerError, LedgerWritePort, TxHandle};
pub use link_opener::LinkOpenerPort;
pub use passport_event::PassportEventPort;
pub use pinning::{PinnedContent, PinningError, PinningPort};
pub use snapshot::{PassportCardView, SnapshotError, SnapshotPort};
pub use upload_broker::{BrokerError, UploadBrokerPort, UploadProgress, UploadTarget};
pub use wallet::{WalletError, WalletSession, WalletSessionPort};
