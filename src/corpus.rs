use serde::{Deserialize, Serialize};

/// Metadata attached to one normalized page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// 1-based page number
    pub page_no: usize,
    /// Document identifier taken from the artifact's top-level key
    pub file_name: String,
}

/// Page-indexed text and metadata for one OCR'd document.
///
/// `page_content[i]` and `page_metadata[i]` both describe page `i + 1`.
/// The two sequences always have the same length, page numbers run 1..=N
/// without gaps and every page carries the same `file_name`. Deserialization
/// checks all of this before handing out a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCorpus")]
pub struct NormalizedCorpus {
    page_content: Vec<String>,
    page_metadata: Vec<PageMetadata>,
}

/// Unchecked wire form of [`NormalizedCorpus`]
#[derive(Deserialize)]
struct RawCorpus {
    page_content: Vec<String>,
    page_metadata: Vec<PageMetadata>,
}

impl TryFrom<RawCorpus> for NormalizedCorpus {
    type Error = String;

    fn try_from(raw: RawCorpus) -> std::result::Result<Self, Self::Error> {
        if raw.page_content.len() != raw.page_metadata.len() {
            return Err(format!(
                "page_content has {} entries but page_metadata has {}",
                raw.page_content.len(),
                raw.page_metadata.len()
            ));
        }

        let file_name = raw.page_metadata.first().map(|m| m.file_name.as_str());
        for (idx, meta) in raw.page_metadata.iter().enumerate() {
            if meta.page_no != idx + 1 {
                return Err(format!(
                    "page_metadata[{idx}] has page_no {}, expected {}",
                    meta.page_no,
                    idx + 1
                ));
            }
            if Some(meta.file_name.as_str()) != file_name {
                return Err(format!(
                    "page_metadata[{idx}] names file {:?}, expected {:?}",
                    meta.file_name,
                    file_name.unwrap_or_default()
                ));
            }
        }

        Ok(Self {
            page_content: raw.page_content,
            page_metadata: raw.page_metadata,
        })
    }
}

impl NormalizedCorpus {
    /// Builds a corpus from per-page texts, numbering pages from 1
    pub(crate) fn from_pages(file_name: &str, page_content: Vec<String>) -> Self {
        let page_metadata = (1..=page_content.len())
            .map(|page_no| PageMetadata {
                page_no,
                file_name: file_name.to_string(),
            })
            .collect();

        Self {
            page_content,
            page_metadata,
        }
    }

    pub fn len(&self) -> usize {
        self.page_content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.page_content.is_empty()
    }

    pub fn page_content(&self) -> &[String] {
        &self.page_content
    }

    pub fn page_metadata(&self) -> &[PageMetadata] {
        &self.page_metadata
    }

    /// Document identifier shared by every page, `None` for a zero-page document
    pub fn file_name(&self) -> Option<&str> {
        self.page_metadata.first().map(|m| m.file_name.as_str())
    }

    pub fn pages(&self) -> impl Iterator<Item = (&PageMetadata, &str)> {
        self.page_metadata
            .iter()
            .zip(self.page_content.iter().map(String::as_str))
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<PageMetadata>) {
        (self.page_content, self.page_metadata)
    }
}
