use std::path::Path;

use clausegraph_core::document::RawDocument;
use clausegraph_core::error::{ClauseGraphError, Result};

const PAGE_SEPARATOR: &str = "\n\n";

/// Read a contract from disk. Plain text is taken as is; PDF page texts are
/// joined with a blank line between pages.
pub async fn load_document(path: impl AsRef<Path>) -> Result<RawDocument> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let content = match ext.as_str() {
        "txt" => tokio::fs::read_to_string(path).await?,
        "pdf" => pdf_text(&tokio::fs::read(path).await?)?,
        "" => return Err(ClauseGraphError::UnsupportedFormat(path.display().to_string())),
        other => return Err(ClauseGraphError::UnsupportedFormat(format!(".{other}"))),
    };

    tracing::debug!(
        path = %path.display(),
        format = %ext,
        bytes = content.len(),
        "Loaded document"
    );

    Ok(RawDocument::new(path.display().to_string(), content))
}

/// Text of every page, in page order.
pub fn pdf_text(bytes: &[u8]) -> Result<String> {
    let document =
        lopdf::Document::load_mem(bytes).map_err(|e| ClauseGraphError::Pdf(e.to_string()))?;

    let mut pages = Vec::new();
    for page_number in document.get_pages().keys() {
        let text = document
            .extract_text(&[*page_number])
            .map_err(|e| ClauseGraphError::Pdf(format!("page {page_number}: {e}")))?;
        pages.push(text.trim_end().to_string());
    }

    Ok(pages.join(PAGE_SEPARATOR))
}
