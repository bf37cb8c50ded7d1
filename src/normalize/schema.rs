//! Shape validation for OCR result artifacts.
//!
//! An artifact is `{ <document id>: [ { <line key>: [ { "text": ... }, ... ] }, ... ] }`.
//! Neither the document id nor the line key has a fixed name, so both are
//! selected positionally according to a [`KeyPolicy`]. Validation borrows
//! from the parsed JSON; nothing is copied until flattening.

use crate::error::{CorpusError, Result};
use serde_json::{Map, Value};

/// How to pick the single entry of an object whose key name is not fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPolicy {
    /// Take the first key in document order; extra keys are logged and ignored
    #[default]
    FirstKey,
    /// Require exactly one key
    Strict,
}

impl KeyPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "first" | "first-key" | "first_key" => Some(Self::FirstKey),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstKey => "first",
            Self::Strict => "strict",
        }
    }
}

/// Validated view of a whole artifact
#[derive(Debug)]
pub(crate) struct DocumentView<'a> {
    pub file_name: &'a str,
    pub pages: Vec<PageView<'a>>,
}

/// Validated view of one page: its line texts in recognition order
#[derive(Debug)]
pub(crate) struct PageView<'a> {
    pub lines: Vec<&'a str>,
}

/// JSON Pointer to the whole document (RFC 6901); `/` would name the `""` key
const ROOT: &str = "";

pub(crate) fn validate(root: &Value, policy: KeyPolicy) -> Result<DocumentView<'_>> {
    let root_obj = root
        .as_object()
        .ok_or_else(|| CorpusError::schema(ROOT, expected("an object", root)))?;

    let (file_name, pages, ignored) = sole_entry(root_obj, ROOT, "document", policy)?;
    if !ignored.is_empty() {
        tracing::warn!(
            ?ignored,
            "Artifact holds {} documents, normalizing only '{}'",
            ignored.len() + 1,
            file_name
        );
    }
    let pages_ptr = child(ROOT, file_name);
    let pages = pages
        .as_array()
        .ok_or_else(|| CorpusError::schema(&pages_ptr, expected("a list of pages", pages)))?;

    let pages = pages
        .iter()
        .enumerate()
        .map(|(idx, page)| validate_page(page, &child(&pages_ptr, &idx.to_string()), policy))
        .collect::<Result<Vec<_>>>()?;

    Ok(DocumentView { file_name, pages })
}

fn validate_page<'a>(page: &'a Value, pointer: &str, policy: KeyPolicy) -> Result<PageView<'a>> {
    let page_obj = page
        .as_object()
        .ok_or_else(|| CorpusError::schema(pointer, expected("a page object", page)))?;

    let (key, lines, ignored) = sole_entry(page_obj, pointer, "page", policy)?;
    if !ignored.is_empty() {
        tracing::debug!(pointer, line_key = key, ?ignored, "Skipping extra page fields");
    }
    let lines_ptr = child(pointer, key);
    let lines = lines
        .as_array()
        .ok_or_else(|| CorpusError::schema(&lines_ptr, expected("a list of lines", lines)))?;

    let lines = lines
        .iter()
        .enumerate()
        .map(|(idx, line)| line_text(line, &child(&lines_ptr, &idx.to_string())))
        .collect::<Result<Vec<_>>>()?;

    Ok(PageView { lines })
}

fn line_text<'a>(line: &'a Value, pointer: &str) -> Result<&'a str> {
    let line_obj = line
        .as_object()
        .ok_or_else(|| CorpusError::schema(pointer, expected("a line object", line)))?;

    match line_obj.get("text") {
        Some(Value::String(text)) => Ok(text.as_str()),
        Some(other) => Err(CorpusError::schema(
            child(pointer, "text"),
            expected("a string", other),
        )),
        None => Err(CorpusError::schema(pointer, "line is missing `text`")),
    }
}

/// Selects the one entry of `obj` per `policy`, also returning the keys it skipped
fn sole_entry<'a>(
    obj: &'a Map<String, Value>,
    pointer: &str,
    what: &str,
    policy: KeyPolicy,
) -> Result<(&'a str, &'a Value, Vec<&'a str>)> {
    let mut entries = obj.iter();
    let (key, value) = entries
        .next()
        .ok_or_else(|| CorpusError::schema(pointer, format!("{what} object has no keys")))?;

    let ignored: Vec<&str> = entries.map(|(k, _)| k.as_str()).collect();
    if !ignored.is_empty() && policy == KeyPolicy::Strict {
        let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        return Err(CorpusError::schema(
            pointer,
            format!("{what} object must have exactly one key, found {keys:?}"),
        ));
    }

    Ok((key.as_str(), value, ignored))
}

/// Appends one escaped reference token to a JSON Pointer
fn child(parent: &str, token: &str) -> String {
    let token = token.replace('~', "~0").replace('/', "~1");
    format!("{parent}/{token}")
}

fn expected(what: &str, found: &Value) -> String {
    let kind = match found {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    };
    format!("expected {what}, found {kind}")
}
