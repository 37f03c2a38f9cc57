use std::io::Write;
use std::sync::atomic::{AtomicU8, Ordering};

use anyhow::Result;
use tracing::debug;

use pp_core::passport::{Notification, NotificationLevel, PassportState};
use pp_core::ports::{LinkOpenerPort, PassportEventPort, UploadProgress};

/// `[ok] Uploaded: File uploaded successfully to IPFS!`
pub fn format_notification(notification: &Notification) -> String {
    let tag = match notification.level {
        NotificationLevel::Info => "info",
        NotificationLevel::Success => "ok",
        NotificationLevel::Error => "error",
    };
    format!("[{tag}] {}: {}", notification.title, notification.description)
}

/// Prints notifications to stdout and upload progress to stderr.
#[derive(Default)]
pub struct TerminalEvents {
    /// Last printed percentage, to print each value once.
    last_percent: AtomicU8,
}

#[async_trait::async_trait]
impl PassportEventPort for TerminalEvents {
    async fn emit_state_changed(&self, state: PassportState) {
        debug!(stage = ?state.stage, error = ?state.error, "state changed");
        if !state.stage.is_busy() {
            self.last_percent.store(0, Ordering::Relaxed);
        }
    }

    async fn emit_notification(&self, notification: Notification) {
        println!("{}", format_notification(&notification));
    }

    async fn emit_upload_progress(&self, progress: UploadProgress) {
        let percent = progress.percent();
        if self.last_percent.swap(percent, Ordering::Relaxed) == percent {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "\rUploading... {percent}%");
        if percent >= 100 {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
    }
}

/// Prints links instead of launching a browser.
pub struct PrintLinkOpener;

#[async_trait::async_trait]
impl LinkOpenerPort for PrintLinkOpener {
    async fn open_link(&self, url: &str) -> Result<()> {
        println!("View on explorer: {url}");
        Ok(())
    }
}
