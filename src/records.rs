use anyhow::Result;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Personal and medical details shown on the Profile screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    pub name: String,
    pub blood_type: String,
    pub physician: String,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
}

/// One past-diagnosis row on the History tab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: String,
    pub diagnosis: String,
}

/// The full read-only patient record backing the Profile screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    pub profile: PatientProfile,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl PatientRecord {
    /// Built-in sample record, used when no record file is configured.
    pub fn sample() -> Self {
        Self {
            profile: PatientProfile {
                name: "John Doe".to_string(),
                blood_type: "O+".to_string(),
                physician: "Dr. Sarah Johnson".to_string(),
                allergies: vec!["Penicillin".to_string(), "Peanuts".to_string()],
                conditions: vec!["Hypertension".to_string(), "Type 2 Diabetes".to_string()],
            },
            history: vec![
                HistoryEntry {
                    date: "2023-05-15".to_string(),
                    diagnosis: "Annual checkup - All normal".to_string(),
                },
                HistoryEntry {
                    date: "2023-02-10".to_string(),
                    diagnosis: "Flu symptoms - Prescribed rest and fluids".to_string(),
                },
                HistoryEntry {
                    date: "2022-11-05".to_string(),
                    diagnosis: "Follow-up for diabetes management".to_string(),
                },
            ],
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let record: PatientRecord = serde_json::from_str(&content)?;
        Ok(record)
    }

    /// Date of the most recent history entry, if any.
    pub fn last_checkup(&self) -> Option<&str> {
        self.history.first().map(|e| e.date.as_str())
    }
}

/// One completed diagnosis round trip, listed on the Report screen.
///
/// Reports live in memory for the life of the process; nothing is written to
/// disk.
#[derive(Debug, Clone)]
pub struct DiagnosisReport {
    pub created_at: DateTime<Local>,
    pub symptoms: String,
    pub recommendation: String,
}

impl DiagnosisReport {
    pub fn new(symptoms: String, recommendation: String) -> Self {
        Self {
            created_at: Local::now(),
            symptoms,
            recommendation,
        }
    }

    pub fn date(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M").to_string()
    }
}
