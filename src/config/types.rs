//! Configuration type definitions.

use crate::constants::{
    DEFAULT_FRAME_TIMEOUT_MS, DEFAULT_THRESHOLD, localizer, raw_frame,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// User-defined variants by name. Entries shadow built-in presets.
    #[serde(default)]
    pub variants: BTreeMap<String, VariantConfig>,

    /// Default settings.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Inference settings.
    #[serde(default)]
    pub inference: InferenceConfig,
}

/// Default classification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Variant used when none is given on the command line.
    pub variant: String,

    /// Threshold override applied to every variant.
    pub threshold: Option<f32>,

    /// Per-frame timeout for the streaming path, in milliseconds.
    pub timeout_ms: u64,

    /// Directory used to resolve relative model paths.
    pub model_dir: Option<PathBuf>,

    /// Output format for file classification.
    pub format: OutputFormat,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            variant: "hand-crop-224".to_string(),
            threshold: None,
            timeout_ms: DEFAULT_FRAME_TIMEOUT_MS,
            model_dir: None,
            format: OutputFormat::Text,
        }
    }
}

/// Inference device configuration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InferenceDevice {
    /// Use CUDA when compiled in, else CPU.
    #[default]
    Auto,
    /// Force CPU inference.
    Cpu,
    /// Require CUDA, fail if unavailable.
    Cuda,
}

impl std::fmt::Display for InferenceDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda => write!(f, "cuda"),
        }
    }
}

/// Inference settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Device to use for inference.
    pub device: InferenceDevice,

    /// Intra-op thread count for the ONNX runtime (None = runtime default).
    pub intra_threads: Option<usize>,
}

/// One complete, internally consistent pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantConfig {
    /// Path to the ONNX classifier. Relative paths resolve against the model dir.
    pub model: PathBuf,

    /// Label vocabulary, inline or from a file (one label per line).
    pub labels: LabelSource,

    /// How transport bytes become a frame.
    #[serde(default)]
    pub decode: DecodeStrategy,

    /// Square input resolution of the classifier.
    pub input_size: u32,

    /// Pixel scaling contract.
    #[serde(default)]
    pub normalization: Normalization,

    /// Tensor memory layout expected by the classifier.
    #[serde(default)]
    pub layout: TensorLayout,

    /// Whether the model emits probabilities or raw logits.
    #[serde(default)]
    pub activation: OutputActivation,

    /// Resampling filter for the resize step.
    #[serde(default)]
    pub resize_filter: ResizeFilter,

    /// Confidence threshold (strictly greater is confident).
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Optional hand localization stage.
    #[serde(default)]
    pub localizer: Option<LocalizerConfig>,
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

impl VariantConfig {
    /// Resolve the classifier path against a model directory.
    pub fn model_path(&self, model_dir: &Path) -> PathBuf {
        resolve_path(&self.model, model_dir)
    }

    /// Resolve the hand landmark model path, if a localizer is configured.
    pub fn localizer_model_path(&self, model_dir: &Path) -> Option<PathBuf> {
        self.localizer
            .as_ref()
            .map(|l| resolve_path(&l.model, model_dir))
    }
}

fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Source of a label vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelSource {
    /// Labels listed directly in the configuration.
    Inline(Vec<String>),
    /// Path to a labels file.
    File(PathBuf),
}

/// Frame decoding strategy, declared by the caller and never guessed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeStrategy {
    /// Bytes are a compressed image container (JPEG, PNG, ...).
    #[default]
    Compressed,
    /// Bytes are a raw HWC RGB buffer of a fixed, agreed shape.
    Raw {
        /// Frame width in pixels.
        width: u32,
        /// Frame height in pixels.
        height: u32,
    },
}

impl DecodeStrategy {
    /// The canonical 229x229 raw frame used by the streaming client.
    pub const fn raw_default() -> Self {
        Self::Raw {
            width: raw_frame::WIDTH,
            height: raw_frame::HEIGHT,
        }
    }
}

impl std::fmt::Display for DecodeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compressed => write!(f, "compressed"),
            Self::Raw { width, height } => write!(f, "raw {width}x{height}"),
        }
    }
}

/// Pixel scaling contract of a classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// Divide by 255 into [0, 1].
    #[default]
    Unit,
    /// Divide by 255, then standardize with ImageNet mean and std.
    Imagenet,
}

impl std::fmt::Display for Normalization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unit => write!(f, "unit"),
            Self::Imagenet => write!(f, "imagenet"),
        }
    }
}

/// Tensor memory layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// Batch, height, width, channels.
    #[default]
    Nhwc,
    /// Batch, channels, height, width.
    Nchw,
}

impl std::fmt::Display for TensorLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nhwc => write!(f, "nhwc"),
            Self::Nchw => write!(f, "nchw"),
        }
    }
}

/// What the classifier's output vector holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputActivation {
    /// Already a probability distribution (softmax head).
    #[default]
    Probabilities,
    /// Raw logits; softmax is applied after inference.
    Logits,
}

/// Resampling filter used when resizing to the input resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    /// Nearest neighbour.
    Nearest,
    /// Bilinear.
    #[default]
    Triangle,
    /// Bicubic (Catmull-Rom).
    CatmullRom,
    /// Lanczos with window 3.
    Lanczos3,
}

/// Hand localization stage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizerConfig {
    /// Path to the hand landmark ONNX model.
    pub model: PathBuf,

    /// Padding added around the hand box, in pixels.
    #[serde(default = "default_padding")]
    pub padding: u32,

    /// Minimum presence score for a hand to count as detected.
    #[serde(default = "default_min_presence")]
    pub min_presence: f32,

    /// Square input resolution of the landmark model.
    #[serde(default = "default_localizer_input")]
    pub input_size: u32,
}

fn default_padding() -> u32 {
    localizer::DEFAULT_PADDING
}

fn default_min_presence() -> f32 {
    localizer::DEFAULT_MIN_PRESENCE
}

fn default_localizer_input() -> u32 {
    localizer::DEFAULT_INPUT_SIZE
}

/// Supported output formats for file classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One human-readable line per frame.
    #[default]
    Text,
    /// JSON envelope with all results.
    Json,
    /// CSV rows.
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
