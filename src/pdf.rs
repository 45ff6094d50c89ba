use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Raw extracted text of one page, numbered from 1.
#[derive(Debug, Clone)]
pub struct PdfPage {
    pub number: usize,
    pub text: String,
}

/// Extract per-page text in page order.
///
/// A page whose text cannot be extracted comes back empty rather than
/// failing the whole document.
pub fn extract_pages(path: &Path) -> Result<Vec<PdfPage>> {
    let doc = lopdf::Document::load(path)
        .with_context(|| format!("Failed to open PDF {}", path.display()))?;

    let pages = doc
        .get_pages()
        .into_keys()
        .map(|number| {
            let text = doc.extract_text(&[number]).unwrap_or_else(|e| {
                warn!("No text on page {} of {}: {}", number, path.display(), e);
                String::new()
            });
            PdfPage {
                number: number as usize,
                text,
            }
        })
        .collect::<Vec<_>>();

    debug!("Extracted {} pages from {}", pages.len(), path.display());
    Ok(pages)
}
