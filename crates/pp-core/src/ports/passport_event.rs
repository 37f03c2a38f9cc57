use crate::passport::{Notification, PassportState};
use crate::ports::UploadProgress;

/// Outbound notifications for whatever front end drives the flow.
#[async_trait::async_trait]
pub trait PassportEventPort: Send + Sync {
    async fn emit_state_changed(&self, state: PassportState);
    async fn emit_notification(&self, notification: Notification);
    async fn emit_upload_progress(&self, progress: UploadProgress);
}
