//! PDF rendering via `printpdf`

use super::blocks::wrap_text;
use super::PrescriptionDocument;
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use thiserror::Error;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const TOP: f32 = 280.0;
const BOTTOM: f32 = 20.0;
const LEFT: f32 = 20.0;
const INDENT: f32 = 25.0;
const BODY_WRAP: usize = 90;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF font error: {0}")]
    Font(String),
    #[error("PDF save error: {0}")]
    Save(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns a layout model into document bytes
pub trait PrescriptionRenderer: Send + Sync {
    fn render(&self, document: &PrescriptionDocument) -> Result<Vec<u8>, RenderError>;
}

/// A4 PDF renderer.
///
/// Built-in Helvetica only covers Latin text; point `font_path` at a TTF with
/// Devanagari or Telugu glyphs for prescriptions in those scripts.
#[derive(Debug, Clone, Default)]
pub struct PrintPdfRenderer {
    font_path: Option<PathBuf>,
}

impl PrintPdfRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font_file(path: impl Into<PathBuf>) -> Self {
        Self {
            font_path: Some(path.into()),
        }
    }

    fn fonts(
        &self,
        doc: &PdfDocumentReference,
    ) -> Result<(IndirectFontRef, IndirectFontRef), RenderError> {
        if let Some(path) = &self.font_path {
            let font = doc
                .add_external_font(File::open(path)?)
                .map_err(|e| RenderError::Font(e.to_string()))?;
            return Ok((font.clone(), font));
        }
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Font(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Font(e.to_string()))?;
        Ok((regular, bold))
    }
}

/// Writes lines top to bottom, opening a new page at the bottom margin
struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl PageCursor<'_> {
    fn line(&mut self, text: &str, size: f32, x: f32, height: f32, font: &IndirectFontRef) {
        if self.y < BOTTOM {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = TOP;
        }
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
        self.y -= height;
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }
}

impl PrescriptionRenderer for PrintPdfRenderer {
    fn render(&self, document: &PrescriptionDocument) -> Result<Vec<u8>, RenderError> {
        let (doc, page1, layer1) =
            PdfDocument::new(&document.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let (font, bold) = self.fonts(&doc)?;

        let mut cursor = PageCursor {
            doc: &doc,
            layer: doc.get_page(page1).get_layer(layer1),
            y: TOP,
        };

        cursor.line(&document.title, 16.0, LEFT, 8.0, &bold);
        cursor.line(&format!("Date: {}", document.formatted_date()), 9.0, LEFT, 8.0, &font);

        cursor.line("PATIENT DETAILS", 11.0, LEFT, 6.0, &bold);
        for (label, value) in &document.patient_details {
            cursor.line(&format!("{label}: {value}"), 10.0, INDENT, 5.0, &font);
        }
        cursor.gap(4.0);

        cursor.line("PRESCRIPTION", 11.0, LEFT, 6.0, &bold);
        for block in &document.blocks {
            for source_line in block.lines() {
                for line in wrap_text(source_line, BODY_WRAP) {
                    cursor.line(&line, 10.0, INDENT, 5.0, &font);
                }
            }
            cursor.gap(3.0);
        }

        cursor.gap(6.0);
        for line in wrap_text(&document.disclaimer, 110) {
            cursor.line(&line, 8.0, LEFT, 4.0, &font);
        }

        drop(cursor);
        let mut buf = BufWriter::new(Vec::new());
        doc.save(&mut buf)
            .map_err(|e| RenderError::Save(e.to_string()))?;
        buf.into_inner()
            .map_err(|e| RenderError::Save(format!("buffer flush failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consultation::{Language, PatientProfile};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn document(prescription: &str) -> PrescriptionDocument {
        let profile = PatientProfile {
            name: "Asha".to_string(),
            age: 30,
            gender: "Female".to_string(),
            phone: "9876543210".to_string(),
            weight: "60".to_string(),
            allergies: "none".to_string(),
            language: Language::English,
        };
        PrescriptionDocument::new(
            Uuid::new_v4(),
            &profile,
            prescription,
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        )
    }

    #[test]
    fn test_renders_pdf_bytes() {
        let doc = document("Diagnosis: viral fever\n\nMedicines: Paracetamol 500mg");
        let bytes = PrintPdfRenderer::new().render(&doc).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_prescription_paginates() {
        let long = (0..120)
            .map(|i| format!("Instruction {i}: drink plenty of water and rest well"))
            .collect::<Vec<_>>()
            .join("\n\n");
        let bytes = PrintPdfRenderer::new().render(&document(&long)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_missing_font_file_is_error() {
        let renderer = PrintPdfRenderer::with_font_file("/nonexistent/font.ttf");
        let err = renderer.render(&document("Rest")).unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
    }
}
