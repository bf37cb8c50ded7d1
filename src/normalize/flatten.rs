use super::schema::{DocumentView, PageView};
use crate::corpus::NormalizedCorpus;

/// Separator placed between consecutive lines of a page
pub const LINE_SEPARATOR: &str = " ";

pub(crate) fn page_text(page: &PageView<'_>) -> String {
    page.lines.join(LINE_SEPARATOR)
}

pub(crate) fn flatten(document: &DocumentView<'_>) -> NormalizedCorpus {
    let page_content = document
        .pages
        .iter()
        .enumerate()
        .map(|(idx, page)| {
            let text = page_text(page);
            tracing::debug!(
                page_no = idx + 1,
                lines = page.lines.len(),
                chars = text.len(),
                "flattened page"
            );
            text
        })
        .collect();

    NormalizedCorpus::from_pages(document.file_name, page_content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_lines_with_single_space() {
        let page = PageView {
            lines: vec!["Hello", "world"],
        };
        assert_eq!(page_text(&page), "Hello world");
    }

    #[test]
    fn empty_page_is_empty_string() {
        let page = PageView { lines: vec![] };
        assert_eq!(page_text(&page), "");
    }

    #[test]
    fn keeps_empty_and_padded_lines_verbatim() {
        let page = PageView {
            lines: vec![" a", "", "b "],
        };
        assert_eq!(page_text(&page), " a  b ");
    }

    #[test]
    fn flattens_every_page_in_order() {
        let document = DocumentView {
            file_name: "doc1",
            pages: vec![
                PageView { lines: vec![] },
                PageView {
                    lines: vec!["Page", "two"],
                },
            ],
        };

        let corpus = flatten(&document);
        assert_eq!(corpus.page_content(), ["", "Page two"]);
        assert_eq!(corpus.page_metadata()[1].page_no, 2);
        assert_eq!(corpus.file_name(), Some("doc1"));
    }
}
