//! Label vocabulary loading.

use crate::config::LabelSource;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read a labels file.
///
/// # File Format
/// - One label per line, in model output order
/// - Surrounding whitespace is trimmed
/// - Blank lines are ignored
///
/// # Errors
/// - Returns error if the file is missing or cannot be read
/// - Returns error if the file contains invalid UTF-8
pub fn read_labels(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(Error::LabelsFileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|e| Error::LabelsRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut labels = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| Error::LabelsRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let trimmed = line.trim();
        if !trimmed.is_empty() {
            labels.push(trimmed.to_string());
        }
    }

    Ok(labels)
}

/// Materialize a label vocabulary. Relative file paths resolve against `model_dir`.
///
/// # Errors
///
/// Returns an error if a labels file cannot be read or the vocabulary is empty.
pub fn load_labels(source: &LabelSource, model_dir: &Path) -> Result<Vec<String>> {
    let labels = match source {
        LabelSource::Inline(labels) => labels.clone(),
        LabelSource::File(path) if path.is_absolute() => read_labels(path)?,
        LabelSource::File(path) => read_labels(&model_dir.join(path))?,
    };

    if labels.is_empty() {
        return Err(Error::ConfigValidation {
            message: "label vocabulary is empty".to_string(),
        });
    }

    Ok(labels)
}
