//! Threshold decision over a probability vector.

use crate::constants::{confidence::PERCENT_DECIMAL_PLACES, sentinel};
use serde::Serialize;

/// Final label and confidence for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    /// Vocabulary label, or `"Uncertain"`.
    pub label: String,
    /// Top-class probability in `[0, 1]`.
    pub confidence: f32,
}

impl ClassificationResult {
    /// True when the top class did not clear the threshold.
    pub fn is_uncertain(&self) -> bool {
        self.label == sentinel::UNCERTAIN
    }
}

/// Pick the top class and apply the threshold.
///
/// The top class is the first maximum. It is reported only when its
/// probability is strictly greater than `threshold`; otherwise the label is
/// `"Uncertain"` with the same confidence. An empty vector is uncertain with
/// zero confidence.
pub fn decide(probabilities: &[f32], labels: &[String], threshold: f32) -> ClassificationResult {
    let Some((index, confidence)) = argmax(probabilities) else {
        return uncertain(0.0);
    };

    if confidence > threshold
        && let Some(label) = labels.get(index)
    {
        return ClassificationResult {
            label: label.clone(),
            confidence,
        };
    }

    uncertain(confidence)
}

fn uncertain(confidence: f32) -> ClassificationResult {
    ClassificationResult {
        label: sentinel::UNCERTAIN.to_string(),
        confidence,
    }
}

/// Index and value of the first maximum.
pub fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((index, value)),
        }
    }
    best
}

/// Convert a probability to a percentage rounded to two decimals.
pub fn percent(confidence: f32) -> f64 {
    let scale = 10f64.powi(PERCENT_DECIMAL_PLACES);
    (f64::from(confidence) * 100.0 * scale).round() / scale
}
