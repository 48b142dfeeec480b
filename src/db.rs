//! Patient registry
//!
//! One row per registered patient keyed by a generated UUID, plus an archive
//! of finalized prescriptions. The consultation core only reads a profile
//! from here when a session starts.

mod schema;

pub use schema::*;

use crate::consultation::{Language, PatientProfile};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Patient not found: {0}")]
    PatientNotFound(String),
    #[error("Database lock poisoned")]
    LockPoisoned,
    #[error("Stored language is empty for patient {0}")]
    InvalidLanguage(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Patient Operations ====================

    /// Register a patient under a fresh identifier
    pub fn register_patient(&self, profile: &PatientProfile) -> DbResult<PatientRecord> {
        let conn = self.lock()?;
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO patients (id, name, age, gender, phone, weight, allergies, language, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                profile.name,
                profile.age,
                profile.gender,
                profile.phone,
                profile.weight,
                profile.allergies,
                profile.language.name(),
                now.to_rfc3339(),
            ],
        )?;

        tracing::info!(patient_id = %id, "Patient registered");

        Ok(PatientRecord {
            id,
            profile: profile.clone(),
            created_at: now,
        })
    }

    /// Get patient by ID
    pub fn get_patient(&self, id: &str) -> DbResult<PatientRecord> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                "SELECT id, name, age, gender, phone, weight, allergies, language, created_at
                 FROM patients WHERE id = ?1",
                params![id],
                RawPatient::from_row,
            )
            .optional()?
            .ok_or_else(|| DbError::PatientNotFound(id.to_string()))?;
        raw.into_record()
    }

    /// List patients, newest first
    pub fn list_patients(&self) -> DbResult<Vec<PatientRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, age, gender, phone, weight, allergies, language, created_at
             FROM patients ORDER BY created_at DESC",
        )?;
        let rows = stmt
            .query_map([], RawPatient::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(RawPatient::into_record).collect()
    }

    // ==================== Prescription Operations ====================

    /// Archive a finalized prescription
    pub fn save_prescription(
        &self,
        patient_id: &str,
        session_id: &Uuid,
        text: &str,
    ) -> DbResult<PrescriptionRecord> {
        let conn = self.lock()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM patients WHERE id = ?1)",
            params![patient_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(DbError::PatientNotFound(patient_id.to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO prescriptions (id, patient_id, session_id, text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, patient_id, session_id.to_string(), text, now.to_rfc3339()],
        )?;

        Ok(PrescriptionRecord {
            id,
            patient_id: patient_id.to_string(),
            session_id: session_id.to_string(),
            text: text.to_string(),
            created_at: now,
        })
    }

    /// Prescriptions for a patient, oldest first
    pub fn list_prescriptions(&self, patient_id: &str) -> DbResult<Vec<PrescriptionRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, patient_id, session_id, text, created_at
             FROM prescriptions WHERE patient_id = ?1 ORDER BY created_at ASC, rowid ASC",
        )?;
        let records = stmt
            .query_map(params![patient_id], |row| {
                Ok(PrescriptionRecord {
                    id: row.get(0)?,
                    patient_id: row.get(1)?,
                    session_id: row.get(2)?,
                    text: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

/// Row as stored, before the language column is validated
struct RawPatient {
    id: String,
    name: String,
    age: u32,
    gender: String,
    phone: String,
    weight: String,
    allergies: String,
    language: String,
    created_at: String,
}

impl RawPatient {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            age: row.get(2)?,
            gender: row.get(3)?,
            phone: row.get(4)?,
            weight: row.get(5)?,
            allergies: row.get(6)?,
            language: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    fn into_record(self) -> DbResult<PatientRecord> {
        let language: Language = self
            .language
            .parse()
            .map_err(|_| DbError::InvalidLanguage(self.id.clone()))?;
        Ok(PatientRecord {
            created_at: parse_datetime(&self.created_at),
            profile: PatientProfile {
                name: self.name,
                age: self.age,
                gender: self.gender,
                phone: self.phone,
                weight: self.weight,
                allergies: self.allergies,
                language,
            },
            id: self.id,
        })
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asha() -> PatientProfile {
        PatientProfile {
            name: "Asha".to_string(),
            age: 30,
            gender: "Female".to_string(),
            phone: "9876543210".to_string(),
            weight: "60".to_string(),
            allergies: "none".to_string(),
            language: Language::Telugu,
        }
    }

    #[test]
    fn test_register_and_get_patient() {
        let db = Database::open_in_memory().unwrap();

        let record = db.register_patient(&asha()).unwrap();
        assert!(Uuid::parse_str(&record.id).is_ok());

        let fetched = db.get_patient(&record.id).unwrap();
        assert_eq!(fetched.profile, asha());
        assert_eq!(fetched.id, record.id);
    }

    #[test]
    fn test_unknown_language_round_trips() {
        let db = Database::open_in_memory().unwrap();
        let mut profile = asha();
        profile.language = Language::Other("Kannada".to_string());

        let record = db.register_patient(&profile).unwrap();
        let fetched = db.get_patient(&record.id).unwrap();
        assert_eq!(fetched.profile.language, Language::Other("Kannada".to_string()));
    }

    #[test]
    fn test_missing_patient() {
        let db = Database::open_in_memory().unwrap();
        let err = db.get_patient("nope").unwrap_err();
        assert!(matches!(err, DbError::PatientNotFound(id) if id == "nope"));
    }

    #[test]
    fn test_each_registration_gets_unique_id() {
        let db = Database::open_in_memory().unwrap();
        let a = db.register_patient(&asha()).unwrap();
        let b = db.register_patient(&asha()).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(db.list_patients().unwrap().len(), 2);
    }

    #[test]
    fn test_prescription_archive() {
        let db = Database::open_in_memory().unwrap();
        let patient = db.register_patient(&asha()).unwrap();
        let session_id = Uuid::new_v4();

        db.save_prescription(&patient.id, &session_id, "Diagnosis: viral fever")
            .unwrap();
        db.save_prescription(&patient.id, &Uuid::new_v4(), "Diagnosis: common cold")
            .unwrap();

        let saved = db.list_prescriptions(&patient.id).unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].text, "Diagnosis: viral fever");
        assert_eq!(saved[0].session_id, session_id.to_string());

        let err = db
            .save_prescription("ghost", &session_id, "text")
            .unwrap_err();
        assert!(matches!(err, DbError::PatientNotFound(_)));
    }

    #[test]
    fn test_on_disk_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patients.db");

        let id = {
            let db = Database::open(&path).unwrap();
            db.register_patient(&asha()).unwrap().id
        };

        let reopened = Database::open(&path).unwrap();
        assert_eq!(reopened.get_patient(&id).unwrap().profile.name, "Asha");
    }
}
