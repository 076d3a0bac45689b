//! Batch classification of frame files.

use crate::constants::{IMAGE_EXTENSIONS, RAW_EXTENSIONS};
use crate::error::Result;
use crate::output::{FrameReport, ReportWriter, RunSummary, progress};
use crate::pipeline::SignPipeline;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Collect input files from paths (files and directories).
///
/// Directories are walked recursively; results are sorted so runs are
/// reproducible.
pub fn collect_input_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_frame_file(path) {
                files.push(path.clone());
            } else {
                warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            collect_frame_files_recursive(path, &mut files)?;
        } else {
            warn!("Skipping non-existent path: {}", path.display());
        }
    }

    files.sort();
    Ok(files)
}

fn collect_frame_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            collect_frame_files_recursive(&path, files)?;
        } else if is_frame_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

/// Check if a file is a supported image or raw pixel buffer.
pub fn is_frame_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        IMAGE_EXTENSIONS
            .iter()
            .chain(RAW_EXTENSIONS)
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}

/// Classify every file in order, streaming reports to `writer`.
///
/// Unreadable files are reported as errors and do not stop the run.
///
/// # Errors
///
/// Returns an error only if the writer fails.
pub fn classify_files(
    pipeline: &SignPipeline,
    files: &[PathBuf],
    writer: &mut dyn ReportWriter,
    show_progress: bool,
) -> Result<RunSummary> {
    let pb = progress::create_file_progress(files.len(), show_progress);
    let mut reports = Vec::with_capacity(files.len());

    writer.write_header()?;
    for file in files {
        let report = match std::fs::read(file) {
            Ok(bytes) => FrameReport::new(file.clone(), &pipeline.classify_bytes(&bytes)),
            Err(e) => {
                warn!("Failed to read {}: {}", file.display(), e);
                FrameReport::unreadable(file.clone(), e.to_string())
            }
        };
        progress::inc_progress(pb.as_ref(), &report.label);
        writer.write_report(&report)?;
        reports.push(report);
    }
    progress::finish_progress(pb, "done");
    writer.finalize()?;

    let summary = RunSummary::from_reports(&reports);
    info!(
        "Classified {} frames: {} confident, {} uncertain, {} no hand, {} errors",
        summary.frames, summary.classified, summary.uncertain, summary.no_hand, summary.errors
    );
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::preset;
    use crate::output::TextWriter;

    #[test]
    fn test_is_frame_file() {
        assert!(is_frame_file(Path::new("hand.png")));
        assert!(is_frame_file(Path::new("hand.JPG")));
        assert!(is_frame_file(Path::new("frame.raw")));
        assert!(is_frame_file(Path::new("käsi.webp")));
        assert!(!is_frame_file(Path::new("notes.txt")));
        assert!(!is_frame_file(Path::new("noext")));
    }

    #[test]
    fn test_collect_input_files_recursive_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(dir.path().join("b.png"), b"x").unwrap();
        std::fs::write(nested.join("a.raw"), b"x").unwrap();
        std::fs::write(dir.path().join("skip.txt"), b"x").unwrap();

        let files = collect_input_files(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.windows(2).all(|w| w[0] <= w[1]));
        assert!(files.iter().all(|f| is_frame_file(f)));
    }

    #[test]
    fn test_classify_files_reports_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.raw");
        std::fs::write(&a, [0u8; 10]).unwrap();
        let missing = dir.path().join("gone.png");

        let variant = preset("mobilenet-224").unwrap();
        let pipeline = SignPipeline::unavailable("mobilenet-224", &variant, "missing");
        let mut writer = TextWriter::new(Vec::new());

        let summary = classify_files(&pipeline, &[a, missing], &mut writer, false).unwrap();
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.unavailable, 1);
        assert_eq!(summary.errors, 1);

        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
