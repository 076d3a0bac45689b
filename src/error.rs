//! Error types for signframe.

/// Result type alias for signframe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for signframe.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Data directory could not be determined.
    #[error("could not determine data directory for this platform")]
    DataDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Variant not found among presets or configured variants.
    #[error("variant '{name}' not found (use 'signframe variants list')")]
    VariantNotFound {
        /// Name of the missing variant.
        name: String,
    },

    /// Model file does not exist.
    #[error("model file does not exist: {path}")]
    ModelFileNotFound {
        /// Path to the missing model file.
        path: std::path::PathBuf,
    },

    /// Failed to load a model.
    #[error("failed to load model '{path}': {reason}")]
    ModelLoad {
        /// Path to the model file.
        path: std::path::PathBuf,
        /// Description of the load failure.
        reason: String,
    },

    /// Labels file does not exist.
    #[error("labels file does not exist: {path}")]
    LabelsFileNotFound {
        /// Path to the missing labels file.
        path: std::path::PathBuf,
    },

    /// Failed to read labels file.
    #[error("failed to read labels file '{path}'")]
    LabelsRead {
        /// Path to the labels file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Label vocabulary does not match the model output.
    #[error("label vocabulary has {labels} entries but the model produces {outputs} classes")]
    LabelCountMismatch {
        /// Number of labels in the vocabulary.
        labels: usize,
        /// Number of model output classes.
        outputs: usize,
    },

    /// No valid frame files found.
    #[error("no valid frame files found in the provided paths")]
    NoValidFrameFiles,

    /// Malformed request body on the request path.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Description of the problem.
        message: String,
    },

    /// Failed to write JSON output.
    #[error("failed to write JSON output")]
    JsonWrite {
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to write CSV output.
    #[error("failed to write CSV output")]
    CsvWrite {
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// Internal error (for unexpected failures).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Short `snake_case` identifier for JSON error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io_error",
            Self::ConfigDirNotFound
            | Self::DataDirNotFound
            | Self::ConfigRead { .. }
            | Self::ConfigParse { .. }
            | Self::ConfigValidation { .. }
            | Self::ConfigWrite { .. }
            | Self::ConfigSerialize { .. } => "config_error",
            Self::VariantNotFound { .. } => "variant_not_found",
            Self::ModelFileNotFound { .. } | Self::ModelLoad { .. } => "model_load_error",
            Self::LabelsFileNotFound { .. }
            | Self::LabelsRead { .. }
            | Self::LabelCountMismatch { .. } => "labels_error",
            Self::NoValidFrameFiles => "no_input",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::JsonWrite { .. } | Self::CsvWrite { .. } => "output_error",
            Self::Internal { .. } => "internal_error",
        }
    }
}

/// Failure of a single pipeline stage for one frame.
///
/// These never escape the pipeline boundary; they are folded into the
/// sentinel outcomes returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// Malformed or incomplete input bytes.
    #[error("decode failed: {reason}")]
    Decode {
        /// Description of the decode failure.
        reason: String,
    },

    /// Hand detector invocation failed.
    #[error("hand detection failed: {reason}")]
    HandDetection {
        /// Description of the detector failure.
        reason: String,
    },

    /// Tensor shape contract violated.
    #[error("normalization failed: {reason}")]
    Normalization {
        /// Description of the violation.
        reason: String,
    },

    /// Underlying model call failed.
    #[error("inference failed: {reason}")]
    Inference {
        /// Description of the inference failure.
        reason: String,
    },

    /// Frame did not complete within the per-call timeout.
    #[error("frame timed out after {millis} ms")]
    Timeout {
        /// Timeout that elapsed, in milliseconds.
        millis: u64,
    },
}

impl FrameError {
    /// Short `snake_case` identifier for logs and JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "decode_error",
            Self::HandDetection { .. } => "hand_detection_error",
            Self::Normalization { .. } => "normalization_error",
            Self::Inference { .. } => "inference_error",
            Self::Timeout { .. } => "timeout",
        }
    }
}
