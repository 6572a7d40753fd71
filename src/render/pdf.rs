//! PDF assembly with genpdf.

use super::DocumentRenderer;
use crate::config::RenderSettings;
use crate::error::{LektorError, Result};
use crate::slides::Slide;
use genpdf::elements::{Break, Image, PageBreak, Paragraph};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::Alignment;
use std::path::PathBuf;
use tracing::{debug, instrument};

/// PDF renderer using a single TTF font for all styles.
pub struct PdfRenderer {
    font_path: PathBuf,
    title: String,
}

impl PdfRenderer {
    pub fn new(settings: &RenderSettings) -> Self {
        Self {
            font_path: crate::config::Settings::expand_path(&settings.font_path),
            title: settings.title.clone(),
        }
    }

    fn load_fonts(&self) -> Result<FontFamily<FontData>> {
        let bytes = std::fs::read(&self.font_path).map_err(|e| {
            LektorError::Render(format!(
                "Cannot read font {}: {} (set render.font_path)",
                self.font_path.display(),
                e
            ))
        })?;

        let data = FontData::new(bytes, None)
            .map_err(|e| LektorError::Render(format!("Invalid font data: {}", e)))?;

        // One face covers every style, like the original DejaVu setup.
        Ok(FontFamily {
            regular: data.clone(),
            bold: data.clone(),
            italic: data.clone(),
            bold_italic: data,
        })
    }
}

impl DocumentRenderer for PdfRenderer {
    #[instrument(skip(self, summary, slides), fields(slides = slides.len()))]
    fn render(&self, summary: &str, slides: &[Slide]) -> Result<Vec<u8>> {
        let fonts = self.load_fonts()?;

        let mut doc = genpdf::Document::new(fonts);
        doc.set_title(self.title.as_str());
        doc.set_font_size(12);

        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // Summary page
        doc.push(Paragraph::new(format!("{}:", self.title)));
        doc.push(Break::new(1));
        for line in summary.lines() {
            doc.push(Paragraph::new(line.to_string()));
        }

        // One page per slide, in scene order
        for slide in slides {
            doc.push(PageBreak::new());
            doc.push(Paragraph::new(format!("Slide {}", slide.index)));
            doc.push(Break::new(1));

            let image = Image::from_path(&slide.image_path)
                .map_err(|e| {
                    LektorError::Render(format!(
                        "Cannot embed slide {}: {}",
                        slide.index, e
                    ))
                })?
                .with_alignment(Alignment::Center);
            doc.push(image);

            if !slide.text.is_empty() {
                doc.push(Break::new(1));
                doc.push(Paragraph::new("OCR Text:"));
                for line in slide.text.lines() {
                    doc.push(Paragraph::new(line.to_string()));
                }
            }
        }

        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| LektorError::Render(format!("PDF rendering failed: {}", e)))?;

        debug!(bytes = buffer.len(), "Deliverable rendered");
        Ok(buffer)
    }
}
