//! PWA icon set generation from a single raster source.

use std::{
    fs,
    path::{Path, PathBuf},
};

use image::{imageops, DynamicImage, ImageFormat, Rgba, RgbaImage};
use tracing::{error, info};

use crate::error::ReleaseToolError;

pub const ICON_SIZES: [u32; 13] = [16, 32, 48, 72, 96, 120, 128, 144, 152, 180, 192, 384, 512];
pub const MASKABLE_SIZES: [u32; 2] = [192, 512];
pub const APPLE_TOUCH_SIZE: u32 = 180;

/// Brand amber (#f59e0b) behind every icon.
pub const BACKGROUND: Rgba<u8> = Rgba([0xf5, 0x9e, 0x0b, 0xff]);

/// Share of a maskable icon the artwork may occupy.
const MASKABLE_SAFE_ZONE: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    Standard,
    Maskable,
    AppleTouch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconVariant {
    pub kind: IconKind,
    pub size: u32,
}

impl IconVariant {
    pub fn file_name(&self) -> String {
        let size = self.size;
        match self.kind {
            IconKind::Standard => format!("icon-{size}x{size}.png"),
            IconKind::Maskable => format!("icon-{size}x{size}-maskable.png"),
            IconKind::AppleTouch => "apple-touch-icon.png".to_string(),
        }
    }

    /// Edge length of the artwork inside the square canvas.
    fn content_size(&self) -> u32 {
        match self.kind {
            IconKind::Maskable => ((self.size as f32) * MASKABLE_SAFE_ZONE).round() as u32,
            IconKind::Standard | IconKind::AppleTouch => self.size,
        }
    }
}

pub fn icon_variants() -> Vec<IconVariant> {
    let standard = ICON_SIZES.iter().map(|&size| IconVariant {
        kind: IconKind::Standard,
        size,
    });
    let maskable = MASKABLE_SIZES.iter().map(|&size| IconVariant {
        kind: IconKind::Maskable,
        size,
    });
    standard
        .chain(maskable)
        .chain(std::iter::once(IconVariant {
            kind: IconKind::AppleTouch,
            size: APPLE_TOUCH_SIZE,
        }))
        .collect()
}

#[derive(Debug, Default)]
pub struct IconReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(IconVariant, String)>,
}

/// Fits `source` inside a `variant.size` square, centred. [`BACKGROUND`] only
/// fills the letterbox; the artwork keeps its own alpha.
pub fn render_icon(source: &DynamicImage, variant: IconVariant) -> RgbaImage {
    let content = variant.content_size().max(1);
    let fitted = source
        .resize(content, content, imageops::FilterType::Triangle)
        .to_rgba8();

    let mut canvas = RgbaImage::from_pixel(variant.size, variant.size, BACKGROUND);
    let x = (variant.size.saturating_sub(fitted.width())) / 2;
    let y = (variant.size.saturating_sub(fitted.height())) / 2;
    imageops::replace(&mut canvas, &fitted, i64::from(x), i64::from(y));
    canvas
}

/// Writes the full icon set. The source must decode; individual variants that
/// fail to write are logged and reported without aborting the rest.
pub fn generate_icons(source: &Path, out_dir: &Path) -> Result<IconReport, ReleaseToolError> {
    let image = image::open(source).map_err(|err| ReleaseToolError::Image {
        path: source.to_path_buf(),
        source: err,
    })?;
    fs::create_dir_all(out_dir).map_err(|err| ReleaseToolError::io(out_dir, err))?;

    let mut report = IconReport::default();
    for variant in icon_variants() {
        let path = out_dir.join(variant.file_name());
        match render_icon(&image, variant).save_with_format(&path, ImageFormat::Png) {
            Ok(()) => {
                info!(path = %path.display(), size = variant.size, "icon written");
                report.written.push(path);
            }
            Err(err) => {
                error!(path = %path.display(), %err, "icon generation failed");
                report.failed.push((variant, err.to_string()));
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
#[path = "tests/icons_tests.rs"]
mod tests;
