//! Page rendering for classification requests.
//!
//! Turning a document into something a vision engine can look at is a
//! collaborator concern; the pipeline only depends on [`PageRenderer`].
//! [`SourceRenderer`] needs no rasteriser: image files are sent as-is, and
//! every page inside the window of a PDF is cut into its own one-page PDF,
//! which the engine accepts as a document block.

use std::path::Path;
use thiserror::Error;

use crate::models::{Document, MediaType, PageImage};
use crate::page_window::PageWindow;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("PDF processing failed: {0}")]
    Pdf(String),

    #[error("page {page} is outside the document ({page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },
}

pub trait PageRenderer: Send + Sync {
    /// Render exactly the pages in `window`, in page order.
    fn render(&self, document: &Document, window: PageWindow)
        -> Result<Vec<PageImage>, RenderError>;
}

/// Renders straight from the source file.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceRenderer;

impl PageRenderer for SourceRenderer {
    fn render(
        &self,
        document: &Document,
        window: PageWindow,
    ) -> Result<Vec<PageImage>, RenderError> {
        let path = &document.path;
        let media_type = path
            .extension()
            .and_then(|e| MediaType::from_extension(&e.to_string_lossy()))
            .ok_or_else(|| RenderError::UnsupportedType(path.display().to_string()))?;
        let bytes = read(path)?;

        match media_type {
            MediaType::Pdf => split_pdf_pages(&bytes, window),
            MediaType::Jpeg | MediaType::Png => {
                if window.len() > 1 {
                    return Err(RenderError::PageOutOfRange {
                        page: 2,
                        page_count: 1,
                    });
                }
                Ok(vec![PageImage {
                    page_number: 1,
                    media_type,
                    data: bytes,
                }])
            }
        }
    }
}

fn read(path: &Path) -> Result<Vec<u8>, RenderError> {
    std::fs::read(path).map_err(|source| RenderError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Produce one single-page PDF per page in `window`.
pub fn split_pdf_pages(bytes: &[u8], window: PageWindow) -> Result<Vec<PageImage>, RenderError> {
    let probe = lopdf::Document::load_mem(bytes).map_err(|e| RenderError::Pdf(e.to_string()))?;
    let page_numbers: Vec<u32> = probe.get_pages().keys().copied().collect();
    let page_count = page_numbers.len() as u32;

    let mut pages = Vec::with_capacity(window.len());
    for page in window.pages() {
        if page > page_count {
            return Err(RenderError::PageOutOfRange { page, page_count });
        }
        let mut single =
            lopdf::Document::load_mem(bytes).map_err(|e| RenderError::Pdf(e.to_string()))?;
        let others: Vec<u32> = page_numbers.iter().copied().filter(|n| *n != page).collect();
        single.delete_pages(&others);
        single.prune_objects();

        let mut data = Vec::new();
        single
            .save_to(&mut data)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        pages.push(PageImage {
            page_number: page,
            media_type: MediaType::Pdf,
            data,
        });
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::test_pdf::pdf_with_pages;
    use crate::page_window::select_window;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn page_count(bytes: &[u8]) -> usize {
        lopdf::Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[test]
    fn splits_window_pages_of_long_pdf() {
        let bytes = pdf_with_pages(&["p1", "p2", "p3", "p4", "p5 signature", "p6"]);
        let pages = split_pdf_pages(&bytes, select_window(6).unwrap()).unwrap();

        assert_eq!(
            pages.iter().map(|p| p.page_number).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        for page in &pages {
            assert_eq!(page.media_type, MediaType::Pdf);
            assert_eq!(page_count(&page.data), 1);
        }
    }

    #[test]
    fn window_larger_than_document_is_rejected() {
        let bytes = pdf_with_pages(&["only"]);
        let err = split_pdf_pages(&bytes, select_window(3).unwrap()).unwrap_err();
        assert!(matches!(err, RenderError::PageOutOfRange { page: 2, .. }));
    }

    #[test]
    fn image_is_sent_as_is() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("receipt.png");
        std::fs::write(&path, b"\x89PNG fake").unwrap();
        let doc = Document {
            path: path.clone(),
            page_count: 1,
            protected: false,
        };

        let pages = SourceRenderer
            .render(&doc, select_window(1).unwrap())
            .unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].media_type, MediaType::Png);
        assert_eq!(pages[0].data, b"\x89PNG fake");
    }

    #[test]
    fn unsupported_extension() {
        let doc = Document {
            path: PathBuf::from("/tmp/notes.docx"),
            page_count: 1,
            protected: false,
        };
        assert!(matches!(
            SourceRenderer.render(&doc, select_window(1).unwrap()),
            Err(RenderError::UnsupportedType(_))
        ));
    }
}
