//! Decoded video frames.

mod decode;
mod payload;

pub use decode::{decode_frame, expected_raw_len};
pub use payload::decode_base64_payload;

use image::RgbImage;

/// One decoded RGB frame, 8 bits per channel.
///
/// Frames live for a single pipeline call and are never persisted.
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// Wrap an RGB image.
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying pixels.
    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}
