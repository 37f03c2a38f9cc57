use std::io::Cursor;

use bytes::Bytes;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use pp_core::asset::{Asset, AssetSource};
use pp_core::ports::{PassportCardView, SnapshotError, SnapshotPort};

use super::palette::{gradient_at, palette_for};

pub const MAX_SCALE: f32 = 8.0;

const BADGE_CELLS: u32 = 20;

/// Renders the passport card: seeded gradient background, circular profile
/// photo, and an owner badge strip with one cell per address byte.
pub struct CardRenderer {
    width: u32,
    height: u32,
}

impl CardRenderer {
    /// Base size in points; output is `scale` times larger.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    fn render_sync(&self, view: &PassportCardView, scale: f32) -> Result<Vec<u8>, SnapshotError> {
        if !scale.is_finite() || scale <= 0.0 || scale > MAX_SCALE {
            return Err(SnapshotError::InvalidScale(scale.to_string()));
        }
        let width = ((self.width as f32) * scale).round().max(1.0) as u32;
        let height = ((self.height as f32) * scale).round().max(1.0) as u32;

        let seed = view
            .display_name
            .clone()
            .or_else(|| view.owner.map(|a| a.to_string()))
            .unwrap_or_else(|| "crefy".to_string());
        let stops = palette_for(&seed);

        let diagonal = (width + height) as f32;
        let mut canvas = RgbaImage::from_fn(width, height, |x, y| {
            gradient_at(&stops, (x + y) as f32 / diagonal)
        });

        let photo_size = height / 2;
        let margin = height / 8;
        if let Some(photo) = &view.photo {
            let decoded = image::load_from_memory(photo)
                .map_err(|e| SnapshotError::Photo(e.to_string()))?;
            let mut avatar = decoded
                .resize_to_fill(photo_size, photo_size, FilterType::Triangle)
                .to_rgba8();
            mask_circle(&mut avatar);
            imageops::overlay(&mut canvas, &avatar, margin as i64, margin as i64);
        }

        if let Some(owner) = view.owner {
            let cell = (width.saturating_sub(2 * margin) / BADGE_CELLS).max(1);
            let top = height.saturating_sub(margin + cell);
            for (i, byte) in owner.as_slice().iter().enumerate() {
                let color = gradient_at(&stops, *byte as f32 / 255.0);
                let left = margin + i as u32 * cell;
                fill_rect(&mut canvas, left, top, cell, cell, darken(color));
            }
        }

        let mut png = Vec::new();
        DynamicImage::ImageRgba8(canvas)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| SnapshotError::Render(e.to_string()))?;
        Ok(png)
    }
}

fn mask_circle(image: &mut RgbaImage) {
    let r = image.width() as f32 / 2.0;
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - r;
        let dy = y as f32 + 0.5 - r;
        if dx * dx + dy * dy > r * r {
            pixel[3] = 0;
        }
    }
}

fn darken(color: Rgba<u8>) -> Rgba<u8> {
    Rgba([color[0] / 2, color[1] / 2, color[2] / 2, 255])
}

fn fill_rect(canvas: &mut RgbaImage, left: u32, top: u32, w: u32, h: u32, color: Rgba<u8>) {
    for y in top..(top + h).min(canvas.height()) {
        for x in left..(left + w).min(canvas.width()) {
            canvas.put_pixel(x, y, color);
        }
    }
}

#[async_trait::async_trait]
impl SnapshotPort for CardRenderer {
    async fn render(&self, view: &PassportCardView, scale: f32) -> Result<Asset, SnapshotError> {
        let renderer = CardRenderer::new(self.width, self.height);
        let view = view.clone();
        let png = tokio::task::spawn_blocking(move || renderer.render_sync(&view, scale))
            .await
            .map_err(|e| SnapshotError::Render(e.to_string()))??;
        tracing::debug!(bytes = png.len(), scale, "card rendered");
        Ok(Asset::new(Bytes::from(png), "passport.png", AssetSource::Snapshot)
            .with_mime_type("image/png"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> PassportCardView {
        PassportCardView {
            display_name: Some("alice.crefy.eth".into()),
            owner: Some("0x00000000000000000000000000000000000000aa".parse().unwrap()),
            photo: None,
        }
    }

    #[tokio::test]
    async fn render_scales_base_size() {
        let renderer = CardRenderer::new(400, 250);

        let asset = renderer.render(&view(), 2.0).await.unwrap();

        let decoded = image::load_from_memory(&asset.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (800, 500));
        assert_eq!(asset.source, AssetSource::Snapshot);
    }

    #[tokio::test]
    async fn render_is_deterministic_for_same_view() {
        let renderer = CardRenderer::new(40, 25);
        let a = renderer.render(&view(), 1.0).await.unwrap();
        let b = renderer.render(&view(), 1.0).await.unwrap();
        assert_eq!(a.bytes, b.bytes);
    }

    #[tokio::test]
    async fn render_rejects_bad_scale_and_photo() {
        let renderer = CardRenderer::new(40, 25);
        assert!(matches!(
            renderer.render(&view(), 0.0).await,
            Err(SnapshotError::InvalidScale(_))
        ));

        let broken = PassportCardView {
            photo: Some(Bytes::from_static(b"not an image")),
            ..view()
        };
        assert!(matches!(
            renderer.render(&broken, 1.0).await,
            Err(SnapshotError::Photo(_))
        ));
    }

    #[tokio::test]
    async fn render_embeds_profile_photo() {
        let mut photo = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([0, 0, 255, 255])))
            .write_to(&mut Cursor::new(&mut photo), ImageFormat::Png)
            .unwrap();
        let renderer = CardRenderer::new(400, 250);
        let with_photo = PassportCardView {
            photo: Some(Bytes::from(photo)),
            ..view()
        };

        let asset = renderer.render(&with_photo, 1.0).await.unwrap();

        let decoded = image::load_from_memory(&asset.bytes).unwrap().to_rgba8();
        // Centre of the avatar circle.
        let centre = 250 / 8 + 250 / 4;
        assert_eq!(decoded.get_pixel(centre, centre), &Rgba([0, 0, 255, 255]));
    }
}
