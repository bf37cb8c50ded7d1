//! Result normalizer
//!
//! Turns an OCR result artifact into a [`NormalizedCorpus`]. Normalization is
//! all-or-nothing: any I/O, syntax or shape problem fails the whole document.

pub mod flatten;
pub mod schema;

pub use schema::KeyPolicy;

use crate::corpus::NormalizedCorpus;
use crate::error::{CorpusError, Result};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;

/// Options controlling how loosely an artifact is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub key_policy: KeyPolicy,
}

impl NormalizeOptions {
    pub fn strict() -> Self {
        Self {
            key_policy: KeyPolicy::Strict,
        }
    }
}

/// Normalize the artifact at `path` with default options
pub fn normalize(path: impl AsRef<Path>) -> Result<NormalizedCorpus> {
    normalize_with(path, &NormalizeOptions::default())
}

pub fn normalize_with(
    path: impl AsRef<Path>,
    options: &NormalizeOptions,
) -> Result<NormalizedCorpus> {
    let path = path.as_ref();

    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CorpusError::ArtifactNotFound(path.to_path_buf()),
        _ => CorpusError::io(path, e),
    })?;

    // from_slice validates UTF-8 as part of parsing
    let value: Value = serde_json::from_slice(&bytes).map_err(CorpusError::MalformedJson)?;
    let corpus = normalize_value(&value, options)?;

    tracing::info!(
        "Normalized {} ({} pages, {} bytes of text)",
        path.display(),
        corpus.len(),
        corpus.page_content().iter().map(String::len).sum::<usize>()
    );

    Ok(corpus)
}

pub fn normalize_str(json: &str, options: &NormalizeOptions) -> Result<NormalizedCorpus> {
    let value: Value = serde_json::from_str(json).map_err(CorpusError::MalformedJson)?;
    normalize_value(&value, options)
}

pub fn normalize_value(value: &Value, options: &NormalizeOptions) -> Result<NormalizedCorpus> {
    let document = schema::validate(value, options.key_policy)?;
    Ok(flatten::flatten(&document))
}
