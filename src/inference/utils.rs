//! Shared inference utilities.

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Allowed drift of a probability vector's sum from 1.
const SUM_TOLERANCE: f32 = 1e-3;

/// True if every value is finite and within `[0, 1]` and the values sum to 1.
pub fn is_probability_vector(values: &[f32]) -> bool {
    !values.is_empty()
        && values
            .iter()
            .all(|v| v.is_finite() && (0.0..=1.0).contains(v))
        && (values.iter().sum::<f32>() - 1.0).abs() < SUM_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_large_logits_stay_finite() {
        let probs = softmax(&[1000.0, 1000.0]);
        assert!((probs[0] - 0.5).abs() < 1e-6);
        assert!((probs[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_is_probability_vector() {
        assert!(is_probability_vector(&[0.2, 0.8]));
        assert!(!is_probability_vector(&[]));
        assert!(!is_probability_vector(&[f32::NAN, 0.5]));
        assert!(!is_probability_vector(&[1.5]));
        assert!(!is_probability_vector(&[-0.1, 1.1]));
    }

    #[test]
    fn test_probability_vector_must_sum_to_one() {
        // Independent sigmoid scores.
        assert!(!is_probability_vector(&[0.9, 0.8, 0.1]));
        assert!(!is_probability_vector(&[0.1, 0.2]));
        assert!(is_probability_vector(&[0.3333, 0.3333, 0.3334]));
        assert!(is_probability_vector(&softmax(&[0.5; 35])));
    }
}
