//! ONNX hand landmark model.

use super::{HandDetector, HandLandmarks, Landmark};
use crate::config::{InferenceConfig, Normalization, ResizeFilter, TensorLayout};
use crate::constants::localizer::LANDMARK_COUNT;
use crate::error::{FrameError, Result};
use crate::frame::Frame;
use crate::inference::{build_session, run_single_input};
use crate::normalize::{NormalizeOptions, normalize};
use ort::session::Session;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::trace;

/// Single-hand landmark model.
///
/// Expects a `[1, size, size, 3]` unit-scaled input. Output 0 holds 21
/// `(x, y, z)` landmarks in input pixel space, output 1 the hand presence
/// score.
pub struct OnnxHandDetector {
    session: Mutex<Session>,
    options: NormalizeOptions,
    min_presence: f32,
    path: PathBuf,
}

impl OnnxHandDetector {
    /// Load the landmark model.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or the runtime rejects it.
    pub fn load(
        path: &Path,
        input_size: u32,
        min_presence: f32,
        inference: &InferenceConfig,
    ) -> Result<Self> {
        let session = build_session(path, inference)?;
        Ok(Self {
            session: Mutex::new(session),
            options: NormalizeOptions {
                input_size,
                normalization: Normalization::Unit,
                layout: TensorLayout::Nhwc,
                filter: ResizeFilter::Triangle,
            },
            min_presence,
            path: path.to_path_buf(),
        })
    }
}

/// True when the presence score clears `min_presence`. NaN never does.
fn passes_presence(score: f32, min_presence: f32) -> bool {
    score >= min_presence
}

/// Map landmark model output back into normalized frame coordinates.
///
/// The model saw the frame centered on a square canvas and resized to
/// `input_size`, so the square offset is undone before normalizing.
fn map_landmarks(
    coords: &[f32],
    frame_width: u32,
    frame_height: u32,
    input_size: u32,
) -> std::result::Result<HandLandmarks, FrameError> {
    let expected = LANDMARK_COUNT * 3;
    if coords.len() < expected {
        return Err(FrameError::HandDetection {
            reason: format!(
                "landmark output holds {} values, expected {expected}",
                coords.len()
            ),
        });
    }
    if let Some(bad) = coords[..expected].iter().find(|v| !v.is_finite()) {
        return Err(FrameError::HandDetection {
            reason: format!("landmark output contains non-finite value {bad}"),
        });
    }

    let side = frame_width.max(frame_height);
    #[allow(clippy::cast_precision_loss)]
    let (width, height, offset_x, offset_y, scale) = (
        frame_width as f32,
        frame_height as f32,
        ((side - frame_width) / 2) as f32,
        ((side - frame_height) / 2) as f32,
        side as f32 / input_size as f32,
    );

    let points = coords[..expected]
        .chunks_exact(3)
        .map(|p| Landmark {
            x: (p[0] * scale - offset_x) / width,
            y: (p[1] * scale - offset_y) / height,
        })
        .collect();

    Ok(HandLandmarks { points })
}

impl std::fmt::Debug for OnnxHandDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxHandDetector")
            .field("path", &self.path)
            .field("input_size", &self.options.input_size)
            .field("min_presence", &self.min_presence)
            .finish_non_exhaustive()
    }
}

impl HandDetector for OnnxHandDetector {
    fn detect(&self, frame: &Frame) -> std::result::Result<Vec<HandLandmarks>, FrameError> {
        let tensor = normalize(frame, None, &self.options).map_err(|e| {
            FrameError::HandDetection {
                reason: e.to_string(),
            }
        })?;

        let outputs = run_single_input(&self.session, tensor.shape(), tensor.into_data())
            .map_err(|reason| FrameError::HandDetection { reason })?;

        let [coords, presence, ..] = outputs.as_slice() else {
            return Err(FrameError::HandDetection {
                reason: format!("expected 2 outputs, got {}", outputs.len()),
            });
        };

        let score = presence.first().copied().unwrap_or(0.0);
        trace!(score, "Hand presence");
        if !passes_presence(score, self.min_presence) {
            return Ok(Vec::new());
        }

        Ok(vec![map_landmarks(
            coords,
            frame.width(),
            frame.height(),
            self.options.input_size,
        )?])
    }
}
