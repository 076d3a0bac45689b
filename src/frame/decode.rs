//! Frame decoding from transport bytes.

use crate::config::DecodeStrategy;
use crate::constants::CHANNELS;
use crate::error::FrameError;
use crate::frame::Frame;
use image::RgbImage;

/// Decode transport bytes into an RGB frame using the declared strategy.
///
/// The strategy is never guessed from the bytes: a JPEG sent to a raw
/// decoder fails on length, and a raw buffer sent to a compressed decoder
/// fails to parse.
///
/// # Errors
///
/// Returns [`FrameError::Decode`] when the buffer is empty, the container
/// cannot be parsed, or a raw buffer has the wrong length.
pub fn decode_frame(bytes: &[u8], strategy: DecodeStrategy) -> Result<Frame, FrameError> {
    if bytes.is_empty() {
        return Err(FrameError::Decode {
            reason: "empty buffer".to_string(),
        });
    }

    match strategy {
        DecodeStrategy::Compressed => decode_compressed(bytes),
        DecodeStrategy::Raw { width, height } => decode_raw(bytes, width, height),
    }
}

fn decode_compressed(bytes: &[u8]) -> Result<Frame, FrameError> {
    let image = image::load_from_memory(bytes).map_err(|e| FrameError::Decode {
        reason: format!("failed to decode image ({} bytes): {e}", bytes.len()),
    })?;
    Ok(Frame::new(image.to_rgb8()))
}

fn decode_raw(bytes: &[u8], width: u32, height: u32) -> Result<Frame, FrameError> {
    let expected = expected_raw_len(width, height).ok_or_else(|| FrameError::Decode {
        reason: format!("raw frame shape {width}x{height} overflows"),
    })?;

    if bytes.len() != expected {
        return Err(FrameError::Decode {
            reason: format!("invalid data length: {}, expected {expected}", bytes.len()),
        });
    }

    RgbImage::from_raw(width, height, bytes.to_vec())
        .map(Frame::new)
        .ok_or_else(|| FrameError::Decode {
            reason: format!("buffer does not fit {width}x{height}x{CHANNELS}"),
        })
}

/// Byte length of a raw HWC RGB frame, or `None` on overflow.
pub fn expected_raw_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(CHANNELS)
}
