//! IPFS pinning adapters.

mod broker;
mod pinata;

pub use broker::{HttpUploadBroker, DEFAULT_CHUNK_SIZE};
pub use pinata::PinataClient;

/// Keep error bodies short enough for a log line.
pub(crate) fn truncate_body(body: String) -> String {
    const MAX: usize = 512;
    if body.len() <= MAX {
        return body;
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
