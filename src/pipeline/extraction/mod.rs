pub mod docx;
pub mod types;

pub use docx::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported format for extraction: {0}")]
    UnsupportedFormat(String),

    #[error("DOCX parsing failed: {0}")]
    Docx(String),

    #[error("Text encoding error: {0}")]
    EncodingError(String),

    #[error("Could not extract readable text ({chars} characters found)")]
    TooShort { chars: usize },
}

/// Extract plain text from an uploaded file.
///
/// The format is sniffed from the bytes first and the filename second.
/// Text that is shorter than [`MIN_TEXT_CHARS`] after trimming is rejected
/// even when the underlying parser succeeded.
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<ExtractedText, ExtractionError> {
    let format = SupportedFormat::detect(bytes, filename)?;

    let text = match format {
        SupportedFormat::Docx => extract_docx(bytes)?,
        SupportedFormat::PlainText => std::str::from_utf8(bytes)
            .map_err(|e| ExtractionError::EncodingError(e.to_string()))?
            .trim_start_matches('\u{feff}')
            .to_string(),
    };

    let trimmed = text.trim();
    let chars = trimmed.chars().count();
    if chars < MIN_TEXT_CHARS {
        tracing::warn!(filename, chars, "Extracted text below minimum length");
        return Err(ExtractionError::TooShort { chars });
    }

    tracing::debug!(filename, format = ?format, chars, "Text extracted");
    Ok(ExtractedText {
        text: trimmed.to_string(),
        format,
        char_count: chars,
    })
}
