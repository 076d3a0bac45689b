//! Hand localization.
//!
//! A [`HandDetector`] reports landmark sets in normalized `[0, 1]`
//! coordinates; [`localize`] turns the first set into a padded pixel box.

mod onnx;

pub use onnx::OnnxHandDetector;

use crate::error::FrameError;
use crate::frame::Frame;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// One landmark, normalized to the frame size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    /// Horizontal position, 0 = left edge, 1 = right edge.
    pub x: f32,
    /// Vertical position, 0 = top edge, 1 = bottom edge.
    pub y: f32,
}

/// Landmarks of one detected hand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandLandmarks {
    /// Landmark points in detector order.
    pub points: Vec<Landmark>,
}

impl HandLandmarks {
    /// Build from `(x, y)` pairs.
    pub fn from_points(points: &[(f32, f32)]) -> Self {
        Self {
            points: points.iter().map(|&(x, y)| Landmark { x, y }).collect(),
        }
    }
}

/// Pixel bounding box, `xmax`/`ymax` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    /// Left edge.
    pub xmin: u32,
    /// Top edge.
    pub ymin: u32,
    /// Right edge (exclusive).
    pub xmax: u32,
    /// Bottom edge (exclusive).
    pub ymax: u32,
}

impl BoundingBox {
    /// Box around landmarks, expanded by `padding` and clamped to the frame.
    ///
    /// Pixel coordinates are truncated toward zero before padding. Returns
    /// `None` for an empty landmark set.
    pub fn from_landmarks(
        landmarks: &HandLandmarks,
        frame_width: u32,
        frame_height: u32,
        padding: u32,
    ) -> Option<Self> {
        if landmarks.points.is_empty() {
            return None;
        }

        let (w, h) = (f64::from(frame_width), f64::from(frame_height));
        let xs = landmarks.points.iter().map(|p| f64::from(p.x) * w);
        let ys = landmarks.points.iter().map(|p| f64::from(p.y) * h);

        #[allow(clippy::cast_possible_truncation)]
        let (x_min, x_max) = (
            xs.clone().fold(f64::INFINITY, f64::min) as i64,
            xs.fold(f64::NEG_INFINITY, f64::max) as i64,
        );
        #[allow(clippy::cast_possible_truncation)]
        let (y_min, y_max) = (
            ys.clone().fold(f64::INFINITY, f64::min) as i64,
            ys.fold(f64::NEG_INFINITY, f64::max) as i64,
        );

        let pad = i64::from(padding);
        let clamp_x = |v: i64| clamp_to_u32(v, frame_width);
        let clamp_y = |v: i64| clamp_to_u32(v, frame_height);

        Some(Self {
            xmin: clamp_x(x_min.saturating_sub(pad)),
            ymin: clamp_y(y_min.saturating_sub(pad)),
            xmax: clamp_x(x_max.saturating_add(pad)),
            ymax: clamp_y(y_max.saturating_add(pad)),
        })
    }

    /// Restrict the box to a `width` x `height` frame.
    pub fn clamp_to(self, width: u32, height: u32) -> Self {
        Self {
            xmin: self.xmin.min(width),
            ymin: self.ymin.min(height),
            xmax: self.xmax.min(width),
            ymax: self.ymax.min(height),
        }
    }

    /// Box width in pixels (0 if inverted).
    pub fn width(&self) -> u32 {
        self.xmax.saturating_sub(self.xmin)
    }

    /// Box height in pixels (0 if inverted).
    pub fn height(&self) -> u32 {
        self.ymax.saturating_sub(self.ymin)
    }

    /// True when the box covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

fn clamp_to_u32(value: i64, max: u32) -> u32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let clamped = value.clamp(0, i64::from(max)) as u32;
    clamped
}

/// Finds hands in a frame.
///
/// Implementations must be safe to share across threads; the pipeline
/// holds one detector for the life of the process.
pub trait HandDetector: Send + Sync {
    /// Detect hands, returning zero or more landmark sets in detector order.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::HandDetection`] if the detector itself fails.
    fn detect(&self, frame: &Frame) -> Result<Vec<HandLandmarks>, FrameError>;
}

/// Run the localizer: the first detected hand becomes a padded box.
///
/// `Ok(None)` means no hand was found.
///
/// # Errors
///
/// Propagates detector failures.
pub fn localize(
    detector: &dyn HandDetector,
    frame: &Frame,
    padding: u32,
) -> Result<Option<BoundingBox>, FrameError> {
    let hands = detector.detect(frame)?;
    debug!(hands = hands.len(), "Hand detector finished");

    Ok(hands
        .first()
        .and_then(|hand| BoundingBox::from_landmarks(hand, frame.width(), frame.height(), padding)))
}

/// Detector that returns a fixed answer. Used for tests and dry runs.
#[derive(Debug, Default)]
pub struct StaticHandDetector {
    hands: Vec<HandLandmarks>,
    calls: AtomicUsize,
}

impl StaticHandDetector {
    /// Detector that always reports `hands`.
    pub fn new(hands: Vec<HandLandmarks>) -> Self {
        Self {
            hands,
            calls: AtomicUsize::new(0),
        }
    }

    /// Detector that never finds a hand.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Number of frames the detector has seen.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl HandDetector for StaticHandDetector {
    fn detect(&self, _frame: &Frame) -> Result<Vec<HandLandmarks>, FrameError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.hands.clone())
    }
}
