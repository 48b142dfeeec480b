//! Prescription finalization
//!
//! Turns a finalized session into a document: paragraph blocks in original
//! order, patient identity, and the rendering date.

mod blocks;
mod document;
mod render;

pub use blocks::split_blocks;
pub use document::{PrescriptionDocument, RenderedPrescription, DISCLAIMER, DOCUMENT_TITLE};
pub use render::{PrescriptionRenderer, PrintPdfRenderer, RenderError};

use crate::consultation::Session;
use crate::error::ConsultError;
use chrono::{Local, NaiveDate};
use std::sync::Arc;

/// Hands finalized sessions to a renderer
pub struct Finalizer {
    renderer: Arc<dyn PrescriptionRenderer>,
}

impl Finalizer {
    pub fn new(renderer: Arc<dyn PrescriptionRenderer>) -> Self {
        Self { renderer }
    }

    /// Render the prescription dated today (local time)
    pub fn finalize(&self, session: &Session) -> Result<RenderedPrescription, ConsultError> {
        self.finalize_on(session, Local::now().date_naive())
    }

    pub fn finalize_on(
        &self,
        session: &Session,
        date: NaiveDate,
    ) -> Result<RenderedPrescription, ConsultError> {
        let prescription = session.prescription().ok_or(ConsultError::NotFinalized)?;
        let document =
            PrescriptionDocument::new(session.id(), session.profile(), prescription, date);

        let bytes = self.renderer.render(&document).map_err(|e| {
            tracing::warn!(session_id = %session.id(), error = %e, "Prescription rendering failed");
            ConsultError::RenderFailed(e.to_string())
        })?;

        tracing::info!(
            session_id = %session.id(),
            blocks = document.blocks.len(),
            bytes = bytes.len(),
            "Prescription rendered"
        );

        Ok(RenderedPrescription { document, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consultation::{Language, PatientProfile};
    use crate::testing::{finalized_session, FailingRenderer};

    fn asha() -> PatientProfile {
        PatientProfile {
            name: "Asha".to_string(),
            age: 30,
            gender: "Female".to_string(),
            phone: "9876543210".to_string(),
            weight: "60".to_string(),
            allergies: "none".to_string(),
            language: Language::English,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_collecting_session_rejected() {
        let finalizer = Finalizer::new(Arc::new(PrintPdfRenderer::new()));
        let session = Session::new(asha());
        let err = finalizer.finalize(&session).unwrap_err();
        assert_eq!(err, ConsultError::NotFinalized);
    }

    #[test]
    fn test_paragraph_order_preserved() {
        let finalizer = Finalizer::new(Arc::new(PrintPdfRenderer::new()));
        let session = finalized_session(asha(), "FINAL PRESCRIPTION\nA\n\nB\n\nC");

        let rendered = finalizer.finalize_on(&session, date()).unwrap();
        assert_eq!(rendered.document.blocks, vec!["A", "B", "C"]);
        assert!(rendered.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_document_has_identity_and_date() {
        let finalizer = Finalizer::new(Arc::new(PrintPdfRenderer::new()));
        let session = finalized_session(
            asha(),
            "FINAL PRESCRIPTION\n\nDiagnosis: viral fever\n\nMedicines: Paracetamol 500mg",
        );

        let rendered = finalizer.finalize_on(&session, date()).unwrap();
        let doc = &rendered.document;
        assert_eq!(
            doc.blocks,
            vec!["Diagnosis: viral fever", "Medicines: Paracetamol 500mg"]
        );
        assert!(doc
            .patient_details
            .contains(&("Name".to_string(), "Asha".to_string())));
        assert!(doc
            .patient_details
            .contains(&("Age".to_string(), "30".to_string())));
        assert!(doc
            .patient_details
            .contains(&("Weight".to_string(), "60 kg".to_string())));
        assert_eq!(doc.formatted_date(), "19 October 2026");
        assert_eq!(doc.session_id, session.id());
        assert_eq!(doc.file_name(), format!("prescription-{}.pdf", session.id()));
    }

    #[test]
    fn test_renderer_error_maps_to_render_failed() {
        let finalizer = Finalizer::new(Arc::new(FailingRenderer));
        let session = finalized_session(asha(), "FINAL PRESCRIPTION\nRest");
        let err = finalizer.finalize_on(&session, date()).unwrap_err();
        assert!(matches!(err, ConsultError::RenderFailed(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_write_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let finalizer = Finalizer::new(Arc::new(PrintPdfRenderer::new()));
        let session = finalized_session(asha(), "FINAL PRESCRIPTION\nRest");

        let rendered = finalizer.finalize_on(&session, date()).unwrap();
        let path = rendered.write_to(dir.path()).unwrap();
        assert!(path.ends_with(rendered.document.file_name()));
        assert_eq!(std::fs::read(&path).unwrap(), rendered.bytes);
    }
}
