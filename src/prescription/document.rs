//! Layout model handed to the renderer

use super::blocks::split_blocks;
use crate::consultation::PatientProfile;
use chrono::NaiveDate;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const DOCUMENT_TITLE: &str = "Medical Prescription";

pub const DISCLAIMER: &str =
    "AI-generated guidance from a simulated consultation. Confirm with a licensed doctor before taking any medicine.";

/// Everything a rendered prescription must show, in display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrescriptionDocument {
    pub title: String,
    pub session_id: Uuid,
    pub date: NaiveDate,
    /// Label/value pairs identifying the patient
    pub patient_details: Vec<(String, String)>,
    /// Prescription paragraphs in original order
    pub blocks: Vec<String>,
    pub disclaimer: String,
}

impl PrescriptionDocument {
    pub fn new(
        session_id: Uuid,
        profile: &PatientProfile,
        prescription: &str,
        date: NaiveDate,
    ) -> Self {
        let patient_details = vec![
            ("Name".to_string(), profile.name.clone()),
            ("Age".to_string(), profile.age.to_string()),
            ("Gender".to_string(), profile.gender.clone()),
            ("Phone".to_string(), profile.phone.clone()),
            ("Weight".to_string(), format!("{} kg", profile.weight)),
            ("Allergies".to_string(), profile.allergies_or_none().to_string()),
            ("Language".to_string(), profile.language.to_string()),
        ];

        Self {
            title: DOCUMENT_TITLE.to_string(),
            session_id,
            date,
            patient_details,
            blocks: split_blocks(prescription),
            disclaimer: DISCLAIMER.to_string(),
        }
    }

    pub fn formatted_date(&self) -> String {
        self.date.format("%d %B %Y").to_string()
    }

    pub fn file_name(&self) -> String {
        format!("prescription-{}.pdf", self.session_id)
    }
}

/// A finalized prescription: layout model plus rendered bytes
#[derive(Debug, Clone)]
pub struct RenderedPrescription {
    pub document: PrescriptionDocument,
    pub bytes: Vec<u8>,
}

impl RenderedPrescription {
    /// Write the PDF into `dir`, returning the file path
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.document.file_name());
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}
