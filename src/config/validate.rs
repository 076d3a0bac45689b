//! Configuration validation.

use crate::config::{Config, DecodeStrategy, LabelSource, VariantConfig};
use crate::constants::{MAX_INPUT_SIZE, confidence, localizer};
use crate::error::{Error, Result};
use std::path::Path;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_defaults(config)?;
    for (name, variant) in &config.variants {
        validate_variant(name, variant)?;
    }
    Ok(())
}

/// Validate default settings.
fn validate_defaults(config: &Config) -> Result<()> {
    let defaults = &config.defaults;

    if let Some(threshold) = defaults.threshold {
        validate_threshold("defaults.threshold", threshold)?;
    }

    if defaults.timeout_ms == 0 {
        return Err(Error::ConfigValidation {
            message: "timeout_ms must be at least 1".to_string(),
        });
    }

    if config.inference.intra_threads == Some(0) {
        return Err(Error::ConfigValidation {
            message: "inference.intra_threads must be at least 1".to_string(),
        });
    }

    Ok(())
}

fn validate_threshold(field: &str, threshold: f32) -> Result<()> {
    if !(confidence::MIN..=confidence::MAX).contains(&threshold) {
        return Err(Error::ConfigValidation {
            message: format!(
                "{field} must be between {} and {}, got {threshold}",
                confidence::MIN,
                confidence::MAX,
            ),
        });
    }
    Ok(())
}

/// Validate a variant's numeric contract without touching the filesystem.
pub fn validate_variant(name: &str, variant: &VariantConfig) -> Result<()> {
    validate_threshold(&format!("variants.{name}.threshold"), variant.threshold)?;

    if variant.input_size == 0 || variant.input_size > MAX_INPUT_SIZE {
        return Err(Error::ConfigValidation {
            message: format!(
                "variants.{name}.input_size must be between 1 and {MAX_INPUT_SIZE}, got {}",
                variant.input_size
            ),
        });
    }

    if let DecodeStrategy::Raw { width, height } = variant.decode
        && (width == 0 || height == 0)
    {
        return Err(Error::ConfigValidation {
            message: format!("variants.{name}.decode raw dimensions must be non-zero"),
        });
    }

    if let LabelSource::Inline(labels) = &variant.labels
        && labels.is_empty()
    {
        return Err(Error::ConfigValidation {
            message: format!("variants.{name}.labels must not be empty"),
        });
    }

    if let Some(loc) = &variant.localizer {
        if loc.padding > localizer::MAX_PADDING {
            return Err(Error::ConfigValidation {
                message: format!(
                    "variants.{name}.localizer.padding must be at most {}, got {}",
                    localizer::MAX_PADDING,
                    loc.padding
                ),
            });
        }
        validate_threshold(
            &format!("variants.{name}.localizer.min_presence"),
            loc.min_presence,
        )?;
        if loc.input_size == 0 || loc.input_size > MAX_INPUT_SIZE {
            return Err(Error::ConfigValidation {
                message: format!("variants.{name}.localizer.input_size out of range"),
            });
        }
    }

    Ok(())
}

/// Check that every file a variant needs exists.
pub fn check_variant_files(variant: &VariantConfig, model_dir: &Path) -> Result<()> {
    let model = variant.model_path(model_dir);
    if !model.exists() {
        return Err(Error::ModelFileNotFound { path: model });
    }

    if let LabelSource::File(path) = &variant.labels {
        let labels = if path.is_absolute() {
            path.clone()
        } else {
            model_dir.join(path)
        };
        if !labels.exists() {
            return Err(Error::LabelsFileNotFound { path: labels });
        }
    }

    if let Some(path) = variant.localizer_model_path(model_dir)
        && !path.exists()
    {
        return Err(Error::ModelFileNotFound { path });
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::preset;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_invalid_threshold_override() {
        let mut config = Config::default();
        config.defaults.threshold = Some(1.5);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.defaults.timeout_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_threads() {
        let mut config = Config::default();
        config.inference.intra_threads = Some(0);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_presets_are_valid() {
        for name in crate::config::PRESET_NAMES {
            let variant = preset(name).unwrap();
            assert!(validate_variant(name, &variant).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_validate_zero_input_size() {
        let mut variant = preset("letters-64").unwrap();
        variant.input_size = 0;
        assert!(validate_variant("letters-64", &variant).is_err());
    }

    #[test]
    fn test_validate_zero_raw_dimensions() {
        let mut variant = preset("mobilenet-224").unwrap();
        variant.decode = DecodeStrategy::Raw {
            width: 0,
            height: 229,
        };
        assert!(validate_variant("mobilenet-224", &variant).is_err());
    }

    #[test]
    fn test_validate_empty_inline_labels() {
        let mut variant = preset("letters-64").unwrap();
        variant.labels = LabelSource::Inline(Vec::new());
        assert!(validate_variant("letters-64", &variant).is_err());
    }

    #[test]
    fn test_validate_excessive_padding() {
        let mut variant = preset("hand-crop-224").unwrap();
        if let Some(loc) = variant.localizer.as_mut() {
            loc.padding = 10_000;
        }
        assert!(validate_variant("hand-crop-224", &variant).is_err());
    }

    #[test]
    fn test_check_variant_files_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let variant = preset("letters-64").unwrap();
        let result = check_variant_files(&variant, dir.path());
        assert!(matches!(result, Err(Error::ModelFileNotFound { .. })));
    }

    #[test]
    fn test_check_variant_files_missing_landmark_model() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hand-crop-224.onnx"), b"stub").unwrap();
        let variant = preset("hand-crop-224").unwrap();
        let result = check_variant_files(&variant, dir.path());
        match result {
            Err(Error::ModelFileNotFound { path }) => {
                assert!(path.ends_with("hand_landmark.onnx"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
