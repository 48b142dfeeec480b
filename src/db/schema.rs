//! Database schema and types

use crate::consultation::PatientProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    age INTEGER NOT NULL,
    gender TEXT NOT NULL,
    phone TEXT NOT NULL,
    weight TEXT NOT NULL,
    allergies TEXT NOT NULL,
    language TEXT NOT NULL DEFAULT 'English',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_patients_created ON patients(created_at DESC);

CREATE TABLE IF NOT EXISTS prescriptions (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL,
    session_id TEXT NOT NULL,
    text TEXT NOT NULL,
    created_at TEXT NOT NULL,

    FOREIGN KEY (patient_id) REFERENCES patients(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_prescriptions_patient ON prescriptions(patient_id, created_at);
";

/// A registered patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: String,
    pub profile: PatientProfile,
    pub created_at: DateTime<Utc>,
}

/// An archived prescription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionRecord {
    pub id: String,
    pub patient_id: String,
    pub session_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
