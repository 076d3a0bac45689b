//! ONNX Runtime session construction and execution.

use crate::config::{InferenceConfig, InferenceDevice};
use crate::error::{Error, Result};
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::Tensor;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing::info;

fn load_failure<E: std::fmt::Display>(path: &Path) -> impl FnOnce(E) -> Error + '_ {
    move |e| Error::ModelLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

/// Build an ONNX Runtime session for a model file.
///
/// # Errors
///
/// Returns [`Error::ModelFileNotFound`] if the file is missing and
/// [`Error::ModelLoad`] if the runtime rejects it or the requested device is
/// unavailable.
pub fn build_session(path: &Path, inference: &InferenceConfig) -> Result<Session> {
    if !path.exists() {
        return Err(Error::ModelFileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut builder = Session::builder()
        .map_err(load_failure(path))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(load_failure(path))?;

    if let Some(threads) = inference.intra_threads {
        builder = builder
            .with_intra_threads(threads)
            .map_err(load_failure(path))?;
    }

    let (mut builder, device_msg) = configure_device(builder, inference.device, path)?;

    let session = builder.commit_from_file(path).map_err(load_failure(path))?;
    info!("Loaded {} on {}", path.display(), device_msg);
    Ok(session)
}

#[cfg(feature = "cuda")]
fn configure_device(
    builder: ort::session::builder::SessionBuilder,
    device: InferenceDevice,
    path: &Path,
) -> Result<(ort::session::builder::SessionBuilder, &'static str)> {
    use ort::execution_providers::CUDAExecutionProvider;

    match device {
        InferenceDevice::Cpu => Ok((builder, "CPU")),
        InferenceDevice::Auto => {
            let builder = builder
                .with_execution_providers([CUDAExecutionProvider::default().build()])
                .map_err(load_failure(path))?;
            Ok((builder, "Auto (CUDA with CPU fallback)"))
        }
        InferenceDevice::Cuda => {
            let builder = builder
                .with_execution_providers([CUDAExecutionProvider::default()
                    .build()
                    .error_on_failure()])
                .map_err(load_failure(path))?;
            Ok((builder, "CUDA"))
        }
    }
}

#[cfg(not(feature = "cuda"))]
fn configure_device(
    builder: ort::session::builder::SessionBuilder,
    device: InferenceDevice,
    path: &Path,
) -> Result<(ort::session::builder::SessionBuilder, &'static str)> {
    match device {
        InferenceDevice::Cpu => Ok((builder, "CPU")),
        InferenceDevice::Auto => {
            tracing::debug!("Built without CUDA support, auto mode uses CPU");
            Ok((builder, "Auto (CPU)"))
        }
        InferenceDevice::Cuda => Err(Error::ModelLoad {
            path: path.to_path_buf(),
            reason: "CUDA requested but signframe was built without the 'cuda' feature"
                .to_string(),
        }),
    }
}

/// Run one forward pass with a single f32 input, returning every output flattened.
///
/// ONNX Runtime sessions need exclusive access per run, so callers share the
/// session behind a mutex.
///
/// # Errors
///
/// Returns the runtime's error message on any failure.
pub fn run_single_input(
    session: &Mutex<Session>,
    shape: [usize; 4],
    data: Vec<f32>,
) -> std::result::Result<Vec<Vec<f32>>, String> {
    let input = Tensor::from_array((shape, data)).map_err(|e| e.to_string())?;

    let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
    let outputs = session
        .run(ort::inputs![input])
        .map_err(|e| e.to_string())?;

    let mut flattened = Vec::with_capacity(outputs.len());
    for index in 0..outputs.len() {
        let (_, values) = outputs[index]
            .try_extract_tensor::<f32>()
            .map_err(|e| format!("output {index}: {e}"))?;
        flattened.push(values.to_vec());
    }
    Ok(flattened)
}
