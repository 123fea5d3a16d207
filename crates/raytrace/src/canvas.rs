use std::path::Path;

use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgb, RgbImage};
use progressive::{PixelBatch, PixelSink, RenderSummary};
use tracing::{debug, warn};

/// Edge length of the background checkerboard tiles.
pub const TILE_SIZE: u32 = 16;

const TILE_LIGHT: Rgb<u8> = Rgb([150, 150, 150]);
const TILE_DARK: Rgb<u8> = Rgb([110, 110, 110]);

/// Image formats accepted for `--output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Bmp,
    Png,
    Jpeg,
    Tiff,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self, String> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("bmp") => Ok(OutputFormat::Bmp),
            Some("png") => Ok(OutputFormat::Png),
            Some("jpg") | Some("jpeg") => Ok(OutputFormat::Jpeg),
            Some("tif") | Some("tiff") => Ok(OutputFormat::Tiff),
            None => Err("output path has no extension; expected bmp, png, jpg or tiff".to_string()),
            Some(other) => Err(format!(
                "unsupported output format '.{other}'; expected bmp, png, jpg, jpeg, tif or tiff"
            )),
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Bmp => ImageFormat::Bmp,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Tiff => ImageFormat::Tiff,
        }
    }
}

/// Off-screen image that receives rendered pixels.
///
/// Starts as a grey checkerboard so areas the renderer has not reached yet
/// stay visible in partial output.
#[derive(Debug)]
pub struct Canvas {
    image: RgbImage,
    painted: u64,
    out_of_bounds: u64,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        let image = RgbImage::from_fn(width, height, |x, y| {
            if (x / TILE_SIZE + y / TILE_SIZE) % 2 == 0 {
                TILE_LIGHT
            } else {
                TILE_DARK
            }
        });
        Self {
            image,
            painted: 0,
            out_of_bounds: 0,
        }
    }

    /// Seeds the canvas with an existing picture, scaled to `width` x `height`.
    pub fn from_file(path: &Path, width: u32, height: u32) -> Result<Self> {
        let loaded = image::open(path)
            .with_context(|| format!("failed to open background image {}", path.display()))?
            .to_rgb8();
        let image = if loaded.dimensions() == (width, height) {
            loaded
        } else {
            debug!(
                from = ?loaded.dimensions(),
                to = ?(width, height),
                "scaling background image"
            );
            imageops::resize(&loaded, width, height, FilterType::Triangle)
        };
        Ok(Self {
            image,
            painted: 0,
            out_of_bounds: 0,
        })
    }

    #[cfg(test)]
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Pixels written so far.
    pub fn painted(&self) -> u64 {
        self.painted
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let format = OutputFormat::from_path(path).map_err(anyhow::Error::msg)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to prepare output directory {}", parent.display())
            })?;
        }
        self.image
            .save_with_format(path, format.image_format())
            .with_context(|| format!("failed to save image to {}", path.display()))
    }
}

impl PixelSink for Canvas {
    fn apply_batch(&mut self, batch: PixelBatch) {
        let (width, height) = self.image.dimensions();
        for sample in &batch {
            if sample.x >= width || sample.y >= height {
                self.out_of_bounds += 1;
                continue;
            }
            self.image
                .put_pixel(sample.x, sample.y, Rgb(sample.color.channels()));
            self.painted += 1;
        }
    }

    fn on_complete(&mut self, summary: &RenderSummary) {
        if self.out_of_bounds > 0 {
            warn!(
                pixels = self.out_of_bounds,
                "scene emitted pixels outside the canvas"
            );
        }
        debug!(
            painted = self.painted,
            delivered = summary.pixels_rendered,
            "canvas updated"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progressive::{PixelSample, Rgb8};

    #[test]
    fn background_is_a_checkerboard() {
        let canvas = Canvas::new(40, 20);
        assert_eq!(*canvas.image().get_pixel(0, 0), TILE_LIGHT);
        assert_eq!(*canvas.image().get_pixel(16, 0), TILE_DARK);
        assert_eq!(*canvas.image().get_pixel(16, 16), TILE_LIGHT);
        assert_eq!(*canvas.image().get_pixel(39, 19), TILE_DARK);
    }

    #[test]
    fn batches_paint_in_bounds_pixels() {
        let mut canvas = Canvas::new(4, 4);
        let batch = PixelBatch::from(vec![
            PixelSample::new(1, 2, Rgb8::new(10, 20, 30)),
            PixelSample::new(9, 0, Rgb8::BLACK),
        ]);
        canvas.apply_batch(batch);
        assert_eq!(canvas.painted(), 1);
        assert_eq!(*canvas.image().get_pixel(1, 2), Rgb([10, 20, 30]));
    }

    #[test]
    fn background_file_is_scaled_to_the_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.png");
        RgbImage::from_pixel(4, 4, Rgb([0, 0, 200])).save(&path).unwrap();

        let canvas = Canvas::from_file(&path, 8, 6).unwrap();
        assert_eq!(canvas.image().dimensions(), (8, 6));
        assert_eq!(*canvas.image().get_pixel(7, 5), Rgb([0, 0, 200]));
        assert_eq!(canvas.painted(), 0);

        assert!(Canvas::from_file(&dir.path().join("absent.png"), 8, 6).is_err());
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a.JPEG")), Ok(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_path(Path::new("a.tiff")), Ok(OutputFormat::Tiff));
        assert!(OutputFormat::from_path(Path::new("a.webp")).is_err());
    }

    #[test]
    fn saves_partial_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/partial.png");
        let canvas = Canvas::new(8, 8);
        canvas.save(&path).unwrap();
        let loaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(loaded.dimensions(), (8, 8));
        assert_eq!(*loaded.get_pixel(0, 0), TILE_LIGHT);
    }
}
