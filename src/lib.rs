//! signframe - sign-language alphabet recognition for single video frames.
//!
//! Each frame runs through a fixed pipeline: decode, optional hand
//! localization, crop and square-pad, normalize, classify, and a
//! threshold decision. Models are loaded once and shared across frames.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod constants;
pub mod decision;
pub mod error;
pub mod frame;
pub mod inference;
pub mod localize;
pub mod normalize;
pub mod output;
pub mod pipeline;

use clap::Parser;
use cli::{ClassifyArgs, Cli, Command, ConfigAction, VariantsAction};
use config::{
    Config, InferenceConfig, OutputFormat, VariantConfig, check_variant_files, config_file_path,
    default_model_dir, load_config_file, resolve_variant, save_config, validate_config,
    validate_variant, variant_names,
};
use output::json_envelope::{
    ConfigPayload, ErrorPayload, EventType, JsonEnvelope, ResultType, VariantEntry,
    VariantInfoPayload, VariantListPayload,
};
use pipeline::{DetectRequest, SignPipeline, classify_files, collect_input_files, serve_stream};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub use error::{Error, Result};

/// Main entry point for signframe CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.classify.verbose, cli.classify.quiet);

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => config_file_path()?,
    };
    let config = load_config_file(&config_path)?;
    validate_config(&config)?;

    let format = cli.classify.format.unwrap_or(config.defaults.format);
    let result = dispatch(cli, &config, &config_path);

    if let Err(e) = &result
        && format == OutputFormat::Json
    {
        print_json_error(e);
    }
    result
}

fn dispatch(cli: Cli, config: &Config, config_path: &Path) -> Result<()> {
    if let Some(command) = cli.command {
        return handle_command(command, &cli.classify, config, config_path);
    }

    if cli.inputs.is_empty() {
        let model_dir = resolve_model_dir(&cli.classify, config)?;
        cli::help::print_smart_help(&model_dir);
        return Ok(());
    }

    classify_inputs(&cli.inputs, &cli.classify, config)
}

/// Everything a command needs to build and drive a pipeline.
#[derive(Debug)]
struct Settings {
    variant_name: String,
    variant: VariantConfig,
    model_dir: PathBuf,
    inference: InferenceConfig,
    timeout: Duration,
    format: OutputFormat,
    progress: bool,
}

impl Settings {
    /// Merge command-line overrides over the configuration.
    fn resolve(args: &ClassifyArgs, config: &Config) -> Result<Self> {
        let variant_name = args
            .variant
            .clone()
            .unwrap_or_else(|| config.defaults.variant.clone());

        let mut variant = resolve_variant(config, &variant_name)?;
        if let Some(threshold) = args.threshold {
            variant.threshold = threshold;
        }
        if let Some(model_path) = &args.model_path {
            variant.model.clone_from(model_path);
        }
        validate_variant(&variant_name, &variant)?;

        let mut inference = config.inference.clone();
        if let Some(device) = args.requested_device() {
            inference.device = device;
        }

        Ok(Self {
            variant_name,
            variant,
            model_dir: resolve_model_dir(args, config)?,
            inference,
            timeout: Duration::from_millis(args.timeout_ms.unwrap_or(config.defaults.timeout_ms)),
            format: args.format.unwrap_or(config.defaults.format),
            progress: !args.quiet && !args.no_progress,
        })
    }

    fn load_pipeline(&self) -> SignPipeline {
        SignPipeline::load(
            &self.variant_name,
            &self.variant,
            &self.model_dir,
            &self.inference,
        )
    }
}

fn resolve_model_dir(args: &ClassifyArgs, config: &Config) -> Result<PathBuf> {
    match args.model_dir.as_ref().or(config.defaults.model_dir.as_ref()) {
        Some(dir) => Ok(dir.clone()),
        None => default_model_dir(),
    }
}

/// Classify input files with the given options.
fn classify_inputs(inputs: &[PathBuf], args: &ClassifyArgs, config: &Config) -> Result<()> {
    let files = collect_input_files(inputs)?;
    if files.is_empty() {
        return Err(Error::NoValidFrameFiles);
    }
    info!("Found {} frame file(s) to classify", files.len());

    let settings = Settings::resolve(args, config)?;
    info!(
        "Loading variant '{}' from {}",
        settings.variant_name,
        settings.model_dir.display()
    );
    let pipeline = SignPipeline::try_load(
        &settings.variant_name,
        &settings.variant,
        &settings.model_dir,
        &settings.inference,
    )?;

    let stdout = std::io::stdout();
    let mut writer = output::writer_for(
        settings.format,
        stdout.lock(),
        &settings.variant_name,
        settings.variant.threshold,
    );
    classify_files(&pipeline, &files, writer.as_mut(), settings.progress)?;
    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    // ORT logging is suppressed by default because CUDA fallback is expected in auto mode.
    // Use -v to see ORT warnings, -vv for info, -vvv for full trace.
    let filter_str = if quiet {
        "warn,ort=off".to_string()
    } else {
        match verbose {
            0 => "info,ort=off".to_string(),
            1 => "debug,ort=warn".to_string(),
            2 => "trace,ort=info".to_string(),
            _ => "trace".to_string(),
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    // stdout carries replies for `stream` and `detect`.
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_command(
    command: Command,
    args: &ClassifyArgs,
    config: &Config,
    config_path: &Path,
) -> Result<()> {
    match command {
        Command::Config { action } => handle_config_command(action, args, config, config_path),
        Command::Variants { action } => handle_variants_command(action, args, config),
        Command::Stream => handle_stream(args, config),
        Command::Detect => handle_detect(args, config),
    }
}

/// Serve the streaming transport on stdin/stdout until stdin closes.
fn handle_stream(args: &ClassifyArgs, config: &Config) -> Result<()> {
    let settings = Settings::resolve(args, config)?;
    let pipeline = Arc::new(settings.load_pipeline());

    let runtime = tokio::runtime::Runtime::new().map_err(|e| Error::Internal {
        message: format!("Failed to create async runtime: {e}"),
    })?;

    info!(
        "Streaming frames for variant '{}' (timeout {} ms)",
        settings.variant_name,
        settings.timeout.as_millis()
    );
    runtime.block_on(serve_stream(
        pipeline,
        tokio::io::stdin(),
        tokio::io::stdout(),
        settings.timeout,
    ))?;
    Ok(())
}

/// Answer one JSON request read from stdin.
fn handle_detect(args: &ClassifyArgs, config: &Config) -> Result<()> {
    let mut body = String::new();
    std::io::stdin().read_to_string(&mut body)?;
    let request = DetectRequest::parse(&body)?;

    let settings = Settings::resolve(args, config)?;
    let response = settings.load_pipeline().request_reply(&request.image);

    let json = serde_json::to_string(&response).map_err(|source| Error::JsonWrite { source })?;
    println!("{json}");
    Ok(())
}

fn handle_config_command(
    action: ConfigAction,
    args: &ClassifyArgs,
    config: &Config,
    config_path: &Path,
) -> Result<()> {
    match action {
        ConfigAction::Init => {
            if config_path.exists() {
                println!(
                    "Configuration file already exists: {}",
                    config_path.display()
                );
            } else {
                save_config(&Config::default(), config_path)?;
                println!("Created configuration file: {}", config_path.display());
                println!("\nNext steps:");
                println!("  signframe variants list");
                println!("  signframe variants check");
            }
            Ok(())
        }
        ConfigAction::Show => {
            if args.format == Some(OutputFormat::Json) {
                let payload = ConfigPayload {
                    result_type: ResultType::Config,
                    config_path: config_path.to_path_buf(),
                    config: to_json_value(config)?,
                };
                print_json(&JsonEnvelope::new(EventType::Result, payload))
            } else {
                let contents = toml::to_string_pretty(config)
                    .map_err(|source| Error::ConfigSerialize { source })?;
                println!("# {}", config_path.display());
                println!("{contents}");
                Ok(())
            }
        }
        ConfigAction::Path => {
            println!("{}", config_path.display());
            Ok(())
        }
    }
}

fn handle_variants_command(
    action: VariantsAction,
    args: &ClassifyArgs,
    config: &Config,
) -> Result<()> {
    let json = args.format == Some(OutputFormat::Json);

    match action {
        VariantsAction::List => {
            let mut entries = Vec::new();
            for name in variant_names(config) {
                let variant = resolve_variant(config, &name)?;
                entries.push(VariantEntry {
                    source: if config.variants.contains_key(&name) {
                        "config".to_string()
                    } else {
                        "preset".to_string()
                    },
                    is_default: name == config.defaults.variant,
                    input_size: variant.input_size,
                    decode: variant.decode.to_string(),
                    localized: variant.localizer.is_some(),
                    threshold: variant.threshold,
                    name,
                });
            }

            if json {
                let payload = VariantListPayload {
                    result_type: ResultType::VariantList,
                    variants: entries,
                };
                return print_json(&JsonEnvelope::new(EventType::Result, payload));
            }

            println!("Variants:");
            for entry in &entries {
                println!(
                    "  {} ({}x{}, {}{}, threshold {}){}{}",
                    entry.name,
                    entry.input_size,
                    entry.input_size,
                    entry.decode,
                    if entry.localized { ", hand crop" } else { "" },
                    entry.threshold,
                    if entry.source == "config" { " [config]" } else { "" },
                    if entry.is_default { " [default]" } else { "" },
                );
            }
            Ok(())
        }
        VariantsAction::Show { name } => {
            let variant = resolve_variant(config, &name)?;
            let model_dir = resolve_model_dir(args, config)?;

            if json {
                let payload = VariantInfoPayload {
                    result_type: ResultType::VariantInfo,
                    model_path: variant.model_path(&model_dir),
                    localizer_model_path: variant.localizer_model_path(&model_dir),
                    variant: to_json_value(&variant)?,
                    name,
                };
                return print_json(&JsonEnvelope::new(EventType::Result, payload));
            }

            println!("Variant: {name}");
            println!("  Model: {}", variant.model_path(&model_dir).display());
            if let Some(path) = variant.localizer_model_path(&model_dir) {
                println!("  Hand landmarks: {}", path.display());
            }
            let contents = toml::to_string_pretty(&variant)
                .map_err(|source| Error::ConfigSerialize { source })?;
            println!();
            println!("{contents}");
            Ok(())
        }
        VariantsAction::Check { name } => {
            let model_dir = resolve_model_dir(args, config)?;
            let names = match name {
                Some(name) => vec![name],
                None => variant_names(config),
            };

            let mut failed = 0usize;
            for name in &names {
                let variant = resolve_variant(config, name)?;
                match check_variant_files(&variant, &model_dir) {
                    Ok(()) => println!("  {name}: OK"),
                    Err(e) => {
                        failed += 1;
                        println!("  {name}: {e}");
                    }
                }
            }

            if failed > 0 {
                return Err(Error::ConfigValidation {
                    message: format!("{failed} of {} variant(s) have missing files", names.len()),
                });
            }
            Ok(())
        }
    }
}

fn to_json_value<T: serde::Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|source| Error::JsonWrite { source })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json =
        serde_json::to_string_pretty(value).map_err(|source| Error::JsonWrite { source })?;
    println!("{json}");
    Ok(())
}

fn print_json_error(e: &Error) {
    let payload = ErrorPayload {
        code: e.code().to_string(),
        message: e.to_string(),
    };
    if let Err(write_err) = print_json(&JsonEnvelope::new(EventType::Error, payload)) {
        error!("Failed to write JSON error: {}", write_err);
    }
}
