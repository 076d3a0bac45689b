//! CLI argument definitions.

use crate::cli::validators::parse_threshold;
use crate::config::{InferenceDevice, OutputFormat};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Sign-language alphabet recognition for single video frames.
#[derive(Debug, Parser)]
#[command(name = "signframe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Image or raw frame files (or directories) to classify.
    pub inputs: Vec<PathBuf>,

    /// Configuration file (default: platform config dir).
    #[arg(long, global = true, env = "SIGNFRAME_CONFIG")]
    pub config: Option<PathBuf>,

    /// Common options for classification.
    #[command(flatten)]
    pub classify: ClassifyArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Inspect pipeline variants.
    Variants {
        /// Variants action to perform.
        #[command(subcommand)]
        action: VariantsAction,
    },
    /// Serve length-prefixed frames from stdin, one reply line per frame.
    Stream,
    /// Classify one JSON request `{"image": "<base64>"}` from stdin.
    Detect,
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Variants subcommand actions.
#[derive(Debug, Subcommand)]
pub enum VariantsAction {
    /// List built-in and configured variants.
    List,
    /// Show the resolved settings of a variant.
    Show {
        /// Variant name.
        name: String,
    },
    /// Verify that model and label files exist.
    Check {
        /// Variant to check (default: all).
        name: Option<String>,
    },
}

/// Arguments shared by every classification entry point.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct ClassifyArgs {
    /// Pipeline variant (see `signframe variants list`).
    #[arg(long, global = true, env = "SIGNFRAME_VARIANT")]
    pub variant: Option<String>,

    /// Path to ONNX classifier (overrides the variant's model).
    #[arg(long, global = true, env = "SIGNFRAME_MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// Directory used to resolve relative model and label paths.
    #[arg(long, global = true, env = "SIGNFRAME_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Confidence threshold (0.0-1.0); strictly greater is confident.
    #[arg(short, long, global = true, value_parser = parse_threshold, env = "SIGNFRAME_THRESHOLD")]
    pub threshold: Option<f32>,

    /// Output format for file classification.
    #[arg(short, long, global = true, env = "SIGNFRAME_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Per-frame timeout for `stream`, in milliseconds.
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..), env = "SIGNFRAME_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Inference device.
    #[arg(long, global = true, value_enum, conflicts_with_all = ["cpu", "gpu"])]
    pub device: Option<InferenceDevice>,

    /// Require CUDA acceleration.
    #[arg(long, global = true, conflicts_with = "cpu")]
    pub gpu: bool,

    /// Force CPU inference.
    #[arg(long, global = true, conflicts_with = "gpu")]
    pub cpu: bool,

    /// Suppress progress output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Hide the progress bar.
    #[arg(long)]
    pub no_progress: bool,

    /// Increase verbosity (-v: debug, -vv: trace+ORT info, -vvv: trace+ORT debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl ClassifyArgs {
    /// Device requested on the command line, if any.
    pub fn requested_device(&self) -> Option<InferenceDevice> {
        if self.cpu {
            Some(InferenceDevice::Cpu)
        } else if self.gpu {
            Some(InferenceDevice::Cuda)
        } else {
            self.device
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_simple() {
        let cli = Cli::try_parse_from(["signframe", "hand.png"]).unwrap();
        assert_eq!(cli.inputs.len(), 1);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_with_options() {
        let cli = Cli::try_parse_from([
            "signframe",
            "hand.png",
            "--variant",
            "letters-64",
            "-t",
            "0.75",
            "-f",
            "csv",
            "-q",
        ])
        .unwrap();
        assert_eq!(cli.classify.variant.as_deref(), Some("letters-64"));
        assert_eq!(cli.classify.threshold, Some(0.75));
        assert_eq!(cli.classify.format, Some(OutputFormat::Csv));
        assert!(cli.classify.quiet);
    }

    #[test]
    fn test_cli_rejects_bad_threshold() {
        assert!(Cli::try_parse_from(["signframe", "a.png", "-t", "1.5"]).is_err());
    }

    #[test]
    fn test_cli_parse_subcommands() {
        assert!(Cli::try_parse_from(["signframe", "config", "show"]).is_ok());
        assert!(Cli::try_parse_from(["signframe", "variants", "list"]).is_ok());
        assert!(Cli::try_parse_from(["signframe", "variants", "check"]).is_ok());
        assert!(Cli::try_parse_from(["signframe", "variants", "show", "letters-64"]).is_ok());
        assert!(Cli::try_parse_from(["signframe", "detect", "--variant", "letters-64"]).is_ok());
    }

    #[test]
    fn test_stream_accepts_timeout() {
        let cli = Cli::try_parse_from(["signframe", "stream", "--timeout-ms", "250"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Stream)));
        assert_eq!(cli.classify.timeout_ms, Some(250));
        assert!(Cli::try_parse_from(["signframe", "stream", "--timeout-ms", "0"]).is_err());
    }

    #[test]
    fn test_device_flags() {
        let cli = Cli::try_parse_from(["signframe", "a.png", "--cpu"]).unwrap();
        assert_eq!(cli.classify.requested_device(), Some(InferenceDevice::Cpu));

        let cli = Cli::try_parse_from(["signframe", "a.png", "--device", "cuda"]).unwrap();
        assert_eq!(cli.classify.requested_device(), Some(InferenceDevice::Cuda));

        assert!(Cli::try_parse_from(["signframe", "a.png", "--cpu", "--gpu"]).is_err());
    }
}
