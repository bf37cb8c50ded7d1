//! Corpus export for downstream indexing
//!
//! Artifacts carry no schema version, so everything exported here is tagged
//! as legacy version 0.

use crate::corpus::{NormalizedCorpus, PageMetadata};
use crate::error::{CorpusError, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Artifact schema version recorded in exports
pub const SCHEMA_VERSION: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// One object holding the parallel `page_content` / `page_metadata` lists
    #[default]
    Json,
    /// One `{page_no, file_name, text}` record per line
    Jsonl,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "ndjson" => Some(Self::Jsonl),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Jsonl => "jsonl",
        }
    }
}

#[derive(Serialize)]
struct CorpusExport<'a> {
    schema_version: u32,
    page_content: &'a [String],
    page_metadata: &'a [PageMetadata],
}

impl<'a> From<&'a NormalizedCorpus> for CorpusExport<'a> {
    fn from(corpus: &'a NormalizedCorpus) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            page_content: corpus.page_content(),
            page_metadata: corpus.page_metadata(),
        }
    }
}

#[derive(Serialize)]
struct PageRecord<'a> {
    page_no: usize,
    file_name: &'a str,
    text: &'a str,
}

/// Destination label used in errors when writing to standard output
pub const STDOUT_DESTINATION: &str = "<stdout>";

/// Write one corpus to `writer`; `destination` names it in I/O errors
pub fn write_corpus<W: Write>(
    corpus: &NormalizedCorpus,
    format: ExportFormat,
    mut writer: W,
    destination: &Path,
) -> Result<()> {
    match format {
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &CorpusExport::from(corpus))
                .map_err(|e| serde_error(destination, e))?;
            writer
                .write_all(b"\n")
                .map_err(|e| CorpusError::io(destination, e))?;
        }
        ExportFormat::Jsonl => write_records(corpus, &mut writer, destination)?,
    }

    writer.flush().map_err(|e| CorpusError::io(destination, e))
}

/// Write several corpora: a JSON array, or the page records of each in turn
pub fn write_corpora<W: Write>(
    corpora: &[NormalizedCorpus],
    format: ExportFormat,
    mut writer: W,
    destination: &Path,
) -> Result<()> {
    match format {
        ExportFormat::Json => {
            let exports: Vec<CorpusExport<'_>> = corpora.iter().map(CorpusExport::from).collect();
            serde_json::to_writer_pretty(&mut writer, &exports)
                .map_err(|e| serde_error(destination, e))?;
            writer
                .write_all(b"\n")
                .map_err(|e| CorpusError::io(destination, e))?;
        }
        ExportFormat::Jsonl => {
            for corpus in corpora {
                write_records(corpus, &mut writer, destination)?;
            }
        }
    }

    writer.flush().map_err(|e| CorpusError::io(destination, e))
}

pub fn export_to_file(
    corpus: &NormalizedCorpus,
    format: ExportFormat,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| CorpusError::io(path, e))?;
    write_corpus(corpus, format, BufWriter::new(file), path)?;

    tracing::info!(
        "Exported {} pages as {} to {}",
        corpus.len(),
        format.as_str(),
        path.display()
    );
    Ok(())
}

fn write_records<W: Write>(
    corpus: &NormalizedCorpus,
    writer: &mut W,
    destination: &Path,
) -> Result<()> {
    for (meta, text) in corpus.pages() {
        let record = PageRecord {
            page_no: meta.page_no,
            file_name: &meta.file_name,
            text,
        };
        serde_json::to_writer(&mut *writer, &record).map_err(|e| serde_error(destination, e))?;
        writer
            .write_all(b"\n")
            .map_err(|e| CorpusError::io(destination, e))?;
    }
    Ok(())
}

/// Writer failures surfacing through serde are still I/O errors
fn serde_error(destination: &Path, e: serde_json::Error) -> CorpusError {
    if e.is_io() {
        CorpusError::io(destination, std::io::Error::from(e))
    } else {
        CorpusError::Serialization(e)
    }
}
