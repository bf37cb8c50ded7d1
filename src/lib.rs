//! Page-indexed text corpora from OCR engine output.
//!
//! An external OCR engine is run against a document and writes a JSON
//! artifact describing the recognized lines of every page. [`normalize`]
//! reads that artifact and produces a [`NormalizedCorpus`]: one plain-text
//! string per page plus parallel page metadata.
//!
//! ```no_run
//! let corpus = ocr_corpus::normalize("data/results/sample2/results.json")?;
//! for (meta, text) in corpus.pages() {
//!     println!("{} p{}: {}", meta.file_name, meta.page_no, text);
//! }
//! # Ok::<(), ocr_corpus::CorpusError>(())
//! ```

pub mod config;
pub mod corpus;
pub mod error;
pub mod export;
pub mod normalize;
pub mod ocr;
pub mod pipeline;

pub use config::Config;
pub use corpus::{NormalizedCorpus, PageMetadata};
pub use error::{CorpusError, Result};
pub use export::ExportFormat;
pub use normalize::{
    normalize, normalize_str, normalize_value, normalize_with, KeyPolicy, NormalizeOptions,
};
pub use ocr::{InvocationRequest, OcrInvoker, SuryaInvoker};
