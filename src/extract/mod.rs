//! Text Extractor: uploaded bytes + declared media type → normalized plain text.
//!
//! Dispatch is on the declared media type only; the bytes are not sniffed.
//! - `application/pdf` → `pdf-extract` on the blocking pool
//! - OOXML word-processing → `word/document.xml` out of the ZIP container
//! - anything else → UTF-8 text
//!
//! An empty result is not an error here; the document store refuses to keep it.

mod docx;
mod pdf;

use tracing::{debug, info, instrument};

use crate::domain::Upload;
use crate::error::ExtractError;

pub const MEDIA_PDF: &str = "application/pdf";
pub const MEDIA_DOCX: &str =
  "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Extraction path picked from the declared media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionPath {
  Pdf,
  Docx,
  PlainText,
}

impl ExtractionPath {
  /// Parameters (`; charset=...`) and case are ignored.
  pub fn for_media_type(media_type: &str) -> Self {
    let essence = media_type
      .split(';')
      .next()
      .unwrap_or_default()
      .trim()
      .to_ascii_lowercase();
    match essence.as_str() {
      MEDIA_PDF => ExtractionPath::Pdf,
      MEDIA_DOCX => ExtractionPath::Docx,
      _ => ExtractionPath::PlainText,
    }
  }
}

#[instrument(
  level = "info",
  skip(upload),
  fields(filename = %upload.filename, media_type = %upload.media_type, bytes = upload.bytes.len())
)]
pub async fn extract_text(upload: &Upload) -> Result<String, ExtractError> {
  let path = ExtractionPath::for_media_type(&upload.media_type);
  debug!(target: "extract", ?path, "Extraction path selected");

  let raw = match path {
    ExtractionPath::Pdf => pdf::extract(&upload.bytes).await?,
    ExtractionPath::Docx => docx::extract(&upload.bytes)?,
    ExtractionPath::PlainText => decode_utf8(&upload.bytes)?,
  };

  let text = normalize(&raw);
  info!(target: "extract", ?path, raw_chars = raw.chars().count(), chars = text.chars().count(), "Text extracted");
  Ok(text)
}

fn decode_utf8(bytes: &[u8]) -> Result<String, ExtractError> {
  let text = String::from_utf8(bytes.to_vec())?;
  Ok(match text.strip_prefix('\u{feff}') {
    Some(rest) => rest.to_string(),
    None => text,
  })
}

/// Unify line endings, strip trailing whitespace per line, keep at most one
/// blank line in a row and trim the whole text.
pub fn normalize(raw: &str) -> String {
  let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
  let mut out = String::with_capacity(unified.len());
  let mut blank_run = 0usize;

  for line in unified.lines() {
    let line = line.trim_end();
    if line.is_empty() {
      blank_run += 1;
      if blank_run > 1 {
        continue;
      }
    } else {
      blank_run = 0;
    }
    out.push_str(line);
    out.push('\n');
  }

  out.trim().to_string()
}
