use std::sync::Arc;

use pp_core::asset::Asset;
use pp_core::ports::{PassportCardView, SnapshotError, SnapshotPort};

/// Render the passport card to a PNG asset.
///
/// The result is both the upload source of the combined flow and the file the
/// user downloads.
pub struct CapturePassportCard {
    snapshot: Arc<dyn SnapshotPort>,
    scale: f32,
}

impl CapturePassportCard {
    pub fn new(snapshot: Arc<dyn SnapshotPort>, scale: f32) -> Self {
        Self { snapshot, scale }
    }

    pub async fn execute(&self, view: &PassportCardView) -> Result<Asset, SnapshotError> {
        let mut asset = self.snapshot.render(view, self.scale).await?;
        asset.filename = view.download_filename();
        if asset.mime_type.is_none() {
            asset.mime_type = Some("image/png".to_string());
        }
        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pp_core::asset::AssetSource;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSnapshot {
        scales: Mutex<Vec<f32>>,
    }

    #[async_trait::async_trait]
    impl SnapshotPort for FakeSnapshot {
        async fn render(
            &self,
            _view: &PassportCardView,
            scale: f32,
        ) -> Result<Asset, SnapshotError> {
            self.scales.lock().unwrap().push(scale);
            Ok(Asset::new(vec![0x89, b'P', b'N', b'G'], "card", AssetSource::Snapshot))
        }
    }

    #[tokio::test]
    async fn capture_passport_card_names_file_after_passport() {
        let snapshot = Arc::new(FakeSnapshot::default());
        let use_case = CapturePassportCard::new(snapshot.clone(), 2.0);
        let view = PassportCardView {
            display_name: Some("alice.crefy.eth".into()),
            ..Default::default()
        };

        let asset = use_case.execute(&view).await.unwrap();

        assert_eq!(asset.filename, "alice-passport.png");
        assert_eq!(asset.mime_type.as_deref(), Some("image/png"));
        assert_eq!(asset.source, AssetSource::Snapshot);
        assert_eq!(*snapshot.scales.lock().unwrap(), vec![2.0]);
    }
}
