//! PDF text via `pdf-extract`.

use crate::error::ExtractError;

/// The parser is CPU-bound and may panic on hostile input, so it runs on the
/// blocking pool; a panic surfaces as a join error.
pub(super) async fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
  let owned = bytes.to_vec();
  tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&owned))
    .await
    .map_err(|e| ExtractError::Pdf(format!("parser task aborted: {e}")))?
    .map_err(|e| ExtractError::Pdf(e.to_string()))
}
