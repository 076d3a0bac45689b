//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "signframe";

/// Default confidence threshold for the decision stage.
///
/// A prediction is confident only when its probability is strictly greater
/// than the threshold.
pub const DEFAULT_THRESHOLD: f32 = 0.6;

/// Default per-frame timeout for async callers, in milliseconds.
pub const DEFAULT_FRAME_TIMEOUT_MS: u64 = 2_000;

/// Number of color channels in every frame and tensor.
pub const CHANNELS: usize = 3;

/// Sentinel labels returned in place of a vocabulary label.
pub mod sentinel {
    /// No hand was found in the frame.
    pub const NO_HAND: &str = "No Hand";

    /// Top probability did not exceed the threshold.
    pub const UNCERTAIN: &str = "Uncertain";

    /// The frame could not be processed.
    pub const ERROR: &str = "[Error]";

    /// The model failed to load at startup.
    pub const UNAVAILABLE: &str = "[None]";
}

/// Confidence reporting.
pub mod confidence {
    /// Minimum valid threshold.
    pub const MIN: f32 = 0.0;

    /// Maximum valid threshold.
    pub const MAX: f32 = 1.0;

    /// Decimal places for percentages on the request path.
    pub const PERCENT_DECIMAL_PLACES: i32 = 2;
}

/// Hand localization defaults.
pub mod localizer {
    /// Padding added around the landmark bounding box, in pixels.
    pub const DEFAULT_PADDING: u32 = 20;

    /// Upper bound accepted for configured padding.
    pub const MAX_PADDING: u32 = 512;

    /// Minimum hand presence score for the landmark model.
    pub const DEFAULT_MIN_PRESENCE: f32 = 0.5;

    /// Input resolution of the hand landmark model.
    pub const DEFAULT_INPUT_SIZE: u32 = 224;

    /// Number of landmarks produced per hand.
    pub const LANDMARK_COUNT: usize = 21;
}

/// Raw pixel buffer defaults for the streaming path.
pub mod raw_frame {
    /// Width of the agreed raw frame.
    pub const WIDTH: u32 = 229;

    /// Height of the agreed raw frame.
    pub const HEIGHT: u32 = 229;
}

/// Per-channel statistics for ImageNet standardization.
pub mod imagenet {
    /// Channel means (RGB) after /255 scaling.
    pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];

    /// Channel standard deviations (RGB) after /255 scaling.
    pub const STD: [f32; 3] = [0.229, 0.224, 0.225];
}

/// Largest input resolution accepted for a classifier.
pub const MAX_INPUT_SIZE: u32 = 1024;

/// Supported compressed image file extensions.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp"];

/// Supported raw pixel buffer file extensions.
pub const RAW_EXTENSIONS: &[&str] = &["raw", "rgb"];

/// Largest frame accepted on the streaming transport, in bytes.
pub const MAX_FRAME_BYTES: u32 = 16 * 1024 * 1024;

/// Built-in label vocabularies.
pub mod vocabulary {
    /// Digits 1-5 followed by letters A-Z.
    pub const DIGITS_5_LETTERS: &[&str] = &[
        "1", "2", "3", "4", "5", "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M",
        "N", "O", "P", "Q", "R", "S", "T", "U", "V", "W", "X", "Y", "Z",
    ];

    /// Digits 1-9 followed by letters A-Z.
    pub const DIGITS_9_LETTERS: &[&str] = &[
        "1", "2", "3", "4", "5", "6", "7", "8", "9", "A", "B", "C", "D", "E", "F", "G", "H", "I",
        "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S", "T", "U", "V", "W", "X", "Y", "Z",
    ];

    /// Letters A-Z followed by the `nothing` and `space` control tokens.
    pub const LETTERS_CONTROL: &[&str] = &[
        "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R",
        "S", "T", "U", "V", "W", "X", "Y", "Z", "nothing", "space",
    ];
}
