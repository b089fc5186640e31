use crate::meta::{MetaValue, recover_json};
use crate::statics;
use anyhow::Context;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Local validation failures. Rendered inline next to the offending control;
/// these never reach the transport layer.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("no data")]
    NoData,
    #[error("invalid json: {0}")]
    InvalidJson(String),
    #[error("wrong file type (expected {expected})")]
    WrongFileType { expected: &'static str },
}

/// One editable key/value line. Order is display order; duplicate keys are
/// allowed here and collapse last-write-wins when serialized.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeRow {
    pub key: String,
    pub value: String,
}

impl AttributeRow {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    Key,
    Value,
}

/// The structured half of the metadata editor: an ordered row buffer that
/// serializes to a JSON object under two different policies (create vs
/// update). The raw-text half lives in [`TextSource`]; a create action uses
/// exactly one of the two, never a merge of both.
#[derive(Debug, Clone, Default)]
pub struct RowEditor {
    pub rows: Vec<AttributeRow>,
}

impl RowEditor {
    /// Fresh editor pre-populated with the well-known attribute keys, all
    /// values blank.
    pub fn canonical() -> Self {
        Self {
            rows: statics::CANONICAL_FIELDS
                .iter()
                .map(|key| AttributeRow::new(*key, ""))
                .collect(),
        }
    }

    pub fn from_rows(rows: Vec<AttributeRow>) -> Self {
        Self { rows }
    }

    pub fn add_row(&mut self) {
        self.rows.push(AttributeRow::default());
    }

    /// Out-of-range indices are a silent no-op; row removal never errors.
    pub fn remove_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.rows.remove(index);
        }
    }

    pub fn edit_row(&mut self, index: usize, field: RowField, value: &str) {
        let Some(row) = self.rows.get_mut(index) else {
            return;
        };
        match field {
            RowField::Key => row.key = value.to_string(),
            RowField::Value => row.value = value.to_string(),
        }
    }

    /// Creation policy: every row with a non-empty key serializes (even with
    /// a blank value, since keys are pre-filled), but the payload must carry
    /// at least one non-empty value to be worth sending.
    pub fn serialize_for_create(&self) -> Result<MetaValue, ValidationError> {
        if !self.rows.iter().any(|r| !r.value.trim().is_empty()) {
            return Err(ValidationError::NoData);
        }
        let mut map = IndexMap::new();
        for row in &self.rows {
            if row.key.trim().is_empty() {
                continue;
            }
            map.insert(row.key.clone(), MetaValue::String(row.value.clone()));
        }
        Ok(MetaValue::Object(map))
    }

    /// Update policy: only rows with both key and value filled count, and
    /// values that look like JSON get a parse attempt so nested structure
    /// survives an edit round-trip. Always yields a valid document, possibly
    /// an empty object.
    pub fn serialize_for_update(&self) -> MetaValue {
        let mut map = IndexMap::new();
        for row in &self.rows {
            if row.key.trim().is_empty() || row.value.trim().is_empty() {
                continue;
            }
            map.insert(row.key.clone(), recover_json(&row.value));
        }
        MetaValue::Object(map)
    }
}

/// Well-formedness check for the raw-JSON representation. Validation only;
/// the structured rows are never touched from here.
pub fn parse_raw(text: &str) -> Result<MetaValue, ValidationError> {
    MetaValue::parse_json(text).map_err(|e| ValidationError::InvalidJson(e.to_string()))
}

/// The raw-text half of a dual-representation input: a pasted text blob and
/// an optionally attached source file. When a file is picked its content
/// replaces the text; whether a later text edit revokes the file's authority
/// is the caller's policy (the metadata picker revokes, the geo picker does
/// not).
#[derive(Debug, Clone, Default)]
pub struct TextSource {
    pub text: String,
    pub file: Option<PathBuf>,
}

impl TextSource {
    /// Read the full content of `path` into the text buffer and remember the
    /// file as the authoritative source.
    pub fn pick_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        self.text = content;
        self.file = Some(path.to_path_buf());
        Ok(())
    }

    /// Same as [`pick_file`](Self::pick_file) but gated to `.txt` files; a
    /// wrong extension leaves the buffer untouched and the selection cleared.
    pub fn pick_txt_file(&mut self, path: &Path) -> Result<(), ValidationError> {
        let is_txt = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
        if !is_txt {
            self.file = None;
            return Err(ValidationError::WrongFileType { expected: ".txt" });
        }
        if let Ok(content) = std::fs::read_to_string(path) {
            self.text = content;
            self.file = Some(path.to_path_buf());
        }
        Ok(())
    }

    /// A manual edit of the text revokes the picked file so the edited text
    /// is what gets submitted.
    pub fn edit_text(&mut self, text: String) {
        self.text = text;
        self.file = None;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.file = None;
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.file.is_none()
    }

    /// The name to submit the content under: the sanitized picked-file name,
    /// or `default` when the content came from pasted text.
    pub fn upload_name(&self, default: &str) -> String {
        match &self.file {
            Some(path) => sanitize_file_name(
                path.file_name().and_then(|n| n.to_str()).unwrap_or(default),
                default,
            ),
            None => default.to_string(),
        }
    }
}

/// Strip characters that upset server-side filesystems and collapse
/// whitespace runs; long names are capped.
pub fn sanitize_file_name(name: &str, default: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return default.to_string();
    }
    let mut out = String::with_capacity(trimmed.len());
    let mut last_was_ws = false;
    for ch in trimmed.chars() {
        if ch.is_whitespace() {
            if !last_was_ws {
                out.push('_');
            }
            last_was_ws = true;
        } else if matches!(ch, '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>') {
            out.push('_');
            last_was_ws = false;
        } else {
            out.push(ch);
            last_was_ws = false;
        }
    }
    if let Some((idx, _)) = out.char_indices().nth(200) {
        out.truncate(idx);
    }
    out
}

/// Like [`sanitize_file_name`] but guarantees a `.txt` suffix.
pub fn sanitize_txt_name(name: &str) -> String {
    let base = sanitize_file_name(name, statics::FILE_DEFAULT_METADATA_TXT);
    if base.to_lowercase().ends_with(".txt") {
        base
    } else {
        format!("{base}.txt")
    }
}
