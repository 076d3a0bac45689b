//! Configuration loading and management.

mod file;
mod paths;
mod presets;
mod types;
mod validate;

pub use file::{load_config_file, save_config};
pub use paths::{config_dir, config_file_path, default_model_dir};
pub use presets::{PRESET_NAMES, preset, resolve_variant, variant_names};
pub use types::{
    Config, DecodeStrategy, DefaultsConfig, InferenceConfig, InferenceDevice, LabelSource,
    LocalizerConfig, Normalization, OutputActivation, OutputFormat, ResizeFilter, TensorLayout,
    VariantConfig,
};
pub use validate::{check_variant_files, validate_config, validate_variant};
