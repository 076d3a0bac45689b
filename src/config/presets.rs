//! Built-in pipeline variants.
//!
//! Each preset pairs a model artifact with the preprocessing it was trained
//! with. Presets are never merged: a model only sees its own contract.

use crate::config::{
    Config, DecodeStrategy, LabelSource, LocalizerConfig, Normalization, OutputActivation,
    ResizeFilter, TensorLayout, VariantConfig,
};
use crate::constants::{DEFAULT_THRESHOLD, localizer, vocabulary};
use crate::error::{Error, Result};
use std::path::PathBuf;

/// Names of the built-in variants, in display order.
pub const PRESET_NAMES: &[&str] = &["letters-64", "mobilenet-224", "hand-crop-224"];

/// Look up a built-in variant by name.
pub fn preset(name: &str) -> Option<VariantConfig> {
    match name {
        "letters-64" => Some(VariantConfig {
            model: PathBuf::from("letters-64.onnx"),
            labels: inline(vocabulary::DIGITS_5_LETTERS),
            decode: DecodeStrategy::Compressed,
            input_size: 64,
            normalization: Normalization::Unit,
            layout: TensorLayout::Nhwc,
            activation: OutputActivation::Probabilities,
            resize_filter: ResizeFilter::Triangle,
            threshold: DEFAULT_THRESHOLD,
            localizer: None,
        }),
        "mobilenet-224" => Some(VariantConfig {
            model: PathBuf::from("mobilenet-224.onnx"),
            labels: inline(vocabulary::LETTERS_CONTROL),
            decode: DecodeStrategy::raw_default(),
            input_size: 224,
            normalization: Normalization::Imagenet,
            layout: TensorLayout::Nchw,
            activation: OutputActivation::Logits,
            resize_filter: ResizeFilter::Triangle,
            threshold: DEFAULT_THRESHOLD,
            localizer: None,
        }),
        "hand-crop-224" => Some(VariantConfig {
            model: PathBuf::from("hand-crop-224.onnx"),
            labels: inline(vocabulary::DIGITS_9_LETTERS),
            decode: DecodeStrategy::Compressed,
            input_size: 224,
            normalization: Normalization::Unit,
            layout: TensorLayout::Nhwc,
            activation: OutputActivation::Probabilities,
            resize_filter: ResizeFilter::CatmullRom,
            threshold: DEFAULT_THRESHOLD,
            localizer: Some(LocalizerConfig {
                model: PathBuf::from("hand_landmark.onnx"),
                padding: localizer::DEFAULT_PADDING,
                min_presence: localizer::DEFAULT_MIN_PRESENCE,
                input_size: localizer::DEFAULT_INPUT_SIZE,
            }),
        }),
        _ => None,
    }
}

fn inline(labels: &[&str]) -> LabelSource {
    LabelSource::Inline(labels.iter().map(ToString::to_string).collect())
}

/// Resolve a variant by name: configured variants first, then presets.
///
/// A `defaults.threshold` override replaces the variant's own threshold.
pub fn resolve_variant(config: &Config, name: &str) -> Result<VariantConfig> {
    let mut variant = config
        .variants
        .get(name)
        .cloned()
        .or_else(|| preset(name))
        .ok_or_else(|| Error::VariantNotFound {
            name: name.to_string(),
        })?;

    if let Some(threshold) = config.defaults.threshold {
        variant.threshold = threshold;
    }

    Ok(variant)
}

/// All variant names known to a configuration: presets, then configured ones.
pub fn variant_names(config: &Config) -> Vec<String> {
    let mut names: Vec<String> = PRESET_NAMES.iter().map(ToString::to_string).collect();
    for name in config.variants.keys() {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
    names
}
