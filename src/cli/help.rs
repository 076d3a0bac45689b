//! Help message display for CLI.

#![allow(clippy::print_stdout)]

use std::path::Path;

/// Print help message based on whether any model files are installed.
pub fn print_smart_help(model_dir: &Path) {
    if has_models(model_dir) {
        print_configured_help();
    } else {
        print_first_time_help(model_dir);
    }
}

fn has_models(model_dir: &Path) -> bool {
    std::fs::read_dir(model_dir).is_ok_and(|entries| {
        entries.filter_map(std::result::Result::ok).any(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("onnx"))
        })
    })
}

/// Print setup guide for first-time users.
pub fn print_first_time_help(model_dir: &Path) {
    println!("No models found. Get started with signframe:");
    println!();
    println!("1. Initialize configuration:");
    println!("   signframe config init");
    println!();
    println!("2. Place the ONNX models for your variant in:");
    println!("   {}", model_dir.display());
    println!();
    println!("   letters-64     letters-64.onnx");
    println!("   mobilenet-224  mobilenet-224.onnx");
    println!("   hand-crop-224  hand-crop-224.onnx + hand_landmark.onnx");
    println!();
    println!("3. Verify the files:");
    println!("   signframe variants check");
    println!();
    println!("4. Classify frames:");
    println!("   signframe --variant letters-64 frame.jpg");
    println!();
    println!("Run 'signframe -h' for all options.");
}

/// Print brief usage reminder for configured users.
pub fn print_configured_help() {
    println!("Usage: signframe [FILES]... [OPTIONS]");
    println!();
    println!("Example: signframe frames/ --variant hand-crop-224 -t 0.7");
    println!();
    println!("Run 'signframe -h' for all options or 'signframe variants list' to see variants.");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_has_models_detects_onnx() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!has_models(dir.path()));
        std::fs::write(dir.path().join("labels.txt"), "A").unwrap();
        assert!(!has_models(dir.path()));
        std::fs::write(dir.path().join("letters-64.ONNX"), b"").unwrap();
        assert!(has_models(dir.path()));
    }

    #[test]
    fn test_missing_dir_has_no_models() {
        assert!(!has_models(Path::new("/nonexistent/signframe/models")));
    }
}
