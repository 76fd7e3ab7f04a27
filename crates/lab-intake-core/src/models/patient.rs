//! Patient models.

use serde::{Deserialize, Serialize};

/// A patient record as stored locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Local UUID, generated on creation
    pub id: String,
    /// Given (first) name
    pub given_name: String,
    /// Family (last) name
    pub family_name: String,
    /// Display name used by the patient search control
    pub full_name: String,
    /// Date of birth (ISO-8601 date)
    pub date_of_birth: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Patient {
    /// Create a new patient with required fields.
    pub fn new(given_name: String, family_name: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        let full_name = format_full_name(&given_name, &family_name);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            given_name,
            family_name,
            full_name,
            date_of_birth: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Summary used to populate the patient selection control.
    pub fn summary(&self) -> PatientSummary {
        PatientSummary {
            id: self.id.clone(),
            full_name: self.full_name.clone(),
        }
    }
}

/// What the patient lookup hands back: enough to display and select.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub id: String,
    pub full_name: String,
}

fn format_full_name(given_name: &str, family_name: &str) -> String {
    [given_name.trim(), family_name.trim()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}
