//! OCR engine invocation
//!
//! The engine runs out of process and leaves its results on disk. This module
//! defines the contract for running it and for finding the artifact it wrote;
//! [`surya`] provides the subprocess implementation.

pub mod surya;

pub use surya::SuryaInvoker;

use crate::error::{CorpusError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// File name the engine gives its per-document result artifact
pub const ARTIFACT_FILE_NAME: &str = "results.json";

/// Parameters for one OCR run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    pub input: PathBuf,
    /// Language hints passed to the engine, e.g. `["en", "de"]`
    pub langs: Vec<String>,
    pub results_dir: PathBuf,
}

/// What a successful run reported
#[derive(Debug, Clone)]
pub struct InvocationOutput {
    pub stdout: String,
    pub stderr: String,
    pub elapsed_ms: u64,
}

/// Trait implemented by everything that can produce an OCR artifact
#[async_trait]
pub trait OcrInvoker: Send + Sync {
    /// Returns the invoker identifier (e.g., "surya")
    fn name(&self) -> &'static str;

    /// Run OCR for `request`. A non-zero exit is always an error.
    async fn invoke(&self, request: &InvocationRequest) -> Result<InvocationOutput>;

    /// Path of the artifact a successful `invoke` produced
    fn locate_artifact(&self, request: &InvocationRequest) -> Result<PathBuf> {
        locate_artifact(&request.results_dir, &request.input)
    }
}

/// Candidate artifact paths for `input`, most likely first.
///
/// Current engine releases write `<results_dir>/<stem>/results.json`; older
/// ones add a `surya/` level in between.
pub fn artifact_candidates(results_dir: &Path, input: &Path) -> Vec<PathBuf> {
    match input.file_stem() {
        Some(stem) => vec![
            results_dir.join(stem).join(ARTIFACT_FILE_NAME),
            results_dir.join("surya").join(stem).join(ARTIFACT_FILE_NAME),
        ],
        None => vec![results_dir.join(ARTIFACT_FILE_NAME)],
    }
}

pub fn locate_artifact(results_dir: &Path, input: &Path) -> Result<PathBuf> {
    let candidates = artifact_candidates(results_dir, input);

    if let Some(found) = candidates.iter().find(|p| p.is_file()) {
        tracing::debug!("Found OCR artifact at {}", found.display());
        return Ok(found.clone());
    }

    Err(CorpusError::ArtifactNotFound(
        candidates.into_iter().next().unwrap_or_default(),
    ))
}
