//! Field validation for lab request drafts.

use serde::{Deserialize, Serialize};

use crate::models::LabDraft;

pub const PATIENT_REQUIRED: &str = "patient is required.";
pub const TYPE_REQUIRED: &str = "type is required.";
pub const CORRECT_ERRORS: &str = "please correct the errors below.";

/// Outcome of validating a draft.
///
/// A draft is valid exactly when `message` is `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LabValidation {
    /// Summary shown above the form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub lab_type: Option<String>,
}

impl LabValidation {
    pub fn is_valid(&self) -> bool {
        self.message.is_none()
    }

    /// `(field, message)` pairs for every failing field.
    pub fn field_errors(&self) -> Vec<(&'static str, &str)> {
        [("patient", &self.patient), ("type", &self.lab_type)]
            .into_iter()
            .filter_map(|(field, error)| error.as_deref().map(|e| (field, e)))
            .collect()
    }
}

/// Check a draft against the lab request rules.
///
/// Every rule runs, so all failing fields are reported together.
pub fn validate_lab_request(draft: &LabDraft) -> LabValidation {
    let mut result = LabValidation::default();

    if draft.patient.as_deref().map_or(true, str::is_empty) {
        result.patient = Some(PATIENT_REQUIRED.to_string());
    }

    if draft.lab_type.trim().is_empty() {
        result.lab_type = Some(TYPE_REQUIRED.to_string());
    }

    if result.patient.is_some() || result.lab_type.is_some() {
        result.message = Some(CORRECT_ERRORS.to_string());
    }

    result
}
