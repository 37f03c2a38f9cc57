//! Terminal adapters for the outbound presentation ports.

mod terminal;

pub use terminal::{format_notification, PrintLinkOpener, TerminalEvents};
