use crate::ocr::InvocationRequest;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// OCR invocation configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Program to run, looked up on `PATH` when not a path
    pub ocr_command: String,
    /// Arguments placed before the input document (e.g. `run surya_ocr` for `uv`)
    pub ocr_args: Vec<String>,
    pub langs: Vec<String>,
    pub results_dir: PathBuf,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ocr_command: "surya_ocr".to_string(),
            ocr_args: Vec::new(),
            langs: vec!["en".to_string()],
            results_dir: PathBuf::from("data/results"),
            timeout: Duration::from_secs(600),
        }
    }
}

impl Config {
    pub fn request_for(&self, input: impl AsRef<Path>) -> InvocationRequest {
        InvocationRequest {
            input: input.as_ref().to_path_buf(),
            langs: self.langs.clone(),
            results_dir: self.results_dir.clone(),
        }
    }
}
