use std::path::Path;

use serde::Serialize;

use super::ExtractionError;

/// Trimmed text shorter than this is treated as an extraction failure.
pub const MIN_TEXT_CHARS: usize = 20;

/// Upper bound on document text forwarded to the model.
pub const MAX_PROMPT_TEXT_BYTES: usize = 48 * 1024;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportedFormat {
    Docx,
    PlainText,
}

impl SupportedFormat {
    /// Magic bytes take precedence over the extension.
    pub fn detect(bytes: &[u8], filename: &str) -> Result<Self, ExtractionError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if bytes.starts_with(ZIP_MAGIC) {
            return match ext.as_str() {
                "docx" | "" => Ok(Self::Docx),
                other => Err(ExtractionError::UnsupportedFormat(format!(
                    "zip container with .{other} extension"
                ))),
            };
        }

        match ext.as_str() {
            "docx" => Err(ExtractionError::Docx("file is not a zip container".into())),
            "txt" | "md" | "text" => Ok(Self::PlainText),
            "" => Err(ExtractionError::UnsupportedFormat("no extension".into())),
            other => Err(ExtractionError::UnsupportedFormat(format!(".{other}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    pub format: SupportedFormat,
    pub char_count: usize,
}

impl ExtractedText {
    /// Text as sent to the model, cut at a char boundary.
    pub fn prompt_text(&self) -> &str {
        truncate_at_boundary(&self.text, MAX_PROMPT_TEXT_BYTES)
    }
}

pub fn truncate_at_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
