//! Deliverable rendering.
//!
//! The pipeline hands a summary and ordered slides to a
//! [`DocumentRenderer`] and stores whatever bytes come back; the default
//! implementation produces a PDF.

mod pdf;

pub use pdf::PdfRenderer;

use crate::error::Result;
use crate::slides::Slide;

/// Capability for assembling the study packet document.
pub trait DocumentRenderer: Send + Sync {
    /// Render one summary page followed by one page per slide, in order.
    fn render(&self, summary: &str, slides: &[Slide]) -> Result<Vec<u8>>;
}
