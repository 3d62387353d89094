/// Textures sampled by the rasterizer
use image::{Rgb, RgbImage};
use nalgebra::Point2;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, ViewerError};

/// Edge length of the procedural textures
const PROCEDURAL_SIZE: u32 = 64;

/// An RGB texture with clamp-to-edge addressing
#[derive(Debug, Clone)]
pub struct Texture {
    image: RgbImage,
}

impl Texture {
    pub fn from_image(image: RgbImage) -> Self {
        Self { image }
    }

    /// Decode an image file into a texture
    pub fn load(path: &Path) -> Result<Self> {
        let image = image::open(path)
            .map_err(|source| ViewerError::Texture {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        debug!(path = %path.display(), width = image.width(), height = image.height(), "texture loaded");
        Ok(Self { image })
    }

    /// Snow: bright white with faint blue speckles
    pub fn snow() -> Self {
        let image = RgbImage::from_fn(PROCEDURAL_SIZE, PROCEDURAL_SIZE, |x, y| {
            let noise = hash(x, y) % 100;
            match noise {
                0..=5 => Rgb([176, 196, 222]),
                6..=20 => Rgb([226, 234, 244]),
                _ => Rgb([250, 250, 255]),
            }
        });
        Self { image }
    }

    /// A green tree with a trunk and a star on a night sky
    pub fn tree() -> Self {
        let size = PROCEDURAL_SIZE as i32;
        let centre = size / 2;
        let image = RgbImage::from_fn(PROCEDURAL_SIZE, PROCEDURAL_SIZE, |x, y| {
            let (x, y) = (x as i32, y as i32);
            let dx = (x - centre).abs();

            // Star at the top
            if y >= 4 && y <= 8 && dx <= 2 - (y - 6).abs() {
                return Rgb([255, 215, 0]);
            }
            // Canopy: a triangle widening downwards
            if y > 8 && y < size - 14 && dx <= (y - 8) / 2 {
                // Ornaments
                if hash(x as u32, y as u32) % 23 == 0 {
                    return Rgb([200, 30, 40]);
                }
                return Rgb([20, 110 + (y % 4) as u8 * 10, 40]);
            }
            // Trunk
            if y >= size - 14 && y < size - 6 && dx <= 3 {
                return Rgb([101, 67, 33]);
            }
            if y >= size - 6 {
                return Rgb([240, 240, 250]);
            }
            Rgb([10, 20, 60])
        });
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Nearest texel lookup. `v = 1` is the top row of the image.
    pub fn sample(&self, uv: Point2<f32>) -> [u8; 3] {
        let (width, height) = (self.image.width(), self.image.height());
        let u = uv.x.clamp(0.0, 1.0);
        let v = 1.0 - uv.y.clamp(0.0, 1.0);
        let x = ((u * width as f32) as u32).min(width - 1);
        let y = ((v * height as f32) as u32).min(height - 1);
        self.image.get_pixel(x, y).0
    }
}

/// Cheap deterministic per-texel hash
fn hash(x: u32, y: u32) -> u32 {
    let mut h = x.wrapping_mul(0x8da6_b343) ^ y.wrapping_mul(0xd816_3841);
    h ^= h >> 13;
    h = h.wrapping_mul(0x5bd1_e995);
    h ^ (h >> 15)
}
