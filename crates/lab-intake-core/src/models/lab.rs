//! Lab request models: the editable draft, the record handed to storage and
//! the persisted lab.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Lab request status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LabStatus {
    /// Raised by a clinician, awaiting a result
    Requested,
    /// Result recorded
    Completed,
    /// Withdrawn before completion
    Canceled,
}

impl LabStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabStatus::Requested => "requested",
            LabStatus::Completed => "completed",
            LabStatus::Canceled => "canceled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "requested" => Some(LabStatus::Requested),
            "completed" => Some(LabStatus::Completed),
            "canceled" => Some(LabStatus::Canceled),
            _ => None,
        }
    }
}

/// A lab request being filled in (mutable, owned by the intake session).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabDraft {
    /// Selected patient ID, `None` until one is picked
    pub patient: Option<String>,
    /// Lab test type
    #[serde(rename = "type")]
    pub lab_type: String,
    /// Clinician notes
    pub notes: Vec<String>,
}

impl LabDraft {
    /// Replace the notes from the single text value the form collects.
    ///
    /// Blank text clears the notes; anything else becomes a one-element list.
    pub fn set_notes_text(&mut self, text: &str) {
        self.notes = if text.trim().is_empty() {
            Vec::new()
        } else {
            vec![text.to_string()]
        };
    }
}

/// A validated lab request ready to be saved. Has no ID yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewLab {
    pub patient: String,
    #[serde(rename = "type")]
    pub lab_type: String,
    pub notes: Vec<String>,
    pub status: LabStatus,
    /// ISO-8601, millisecond precision, UTC
    pub requested_on: String,
}

impl NewLab {
    /// Build the record to save from a draft, stamping status and request time.
    ///
    /// Returns `None` if the draft has no patient.
    pub fn from_draft(draft: &LabDraft, requested_on: DateTime<Utc>) -> Option<Self> {
        let patient = draft.patient.as_deref().filter(|p| !p.is_empty())?;

        Some(Self {
            patient: patient.to_string(),
            lab_type: draft.lab_type.clone(),
            notes: draft.notes.clone(),
            status: LabStatus::Requested,
            requested_on: format_timestamp(requested_on),
        })
    }
}

/// A persisted lab request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lab {
    /// Storage-assigned ID
    pub id: String,
    pub patient: String,
    #[serde(rename = "type")]
    pub lab_type: String,
    pub notes: Vec<String>,
    pub status: LabStatus,
    pub requested_on: String,
    pub completed_on: Option<String>,
    pub canceled_on: Option<String>,
    /// Free-text result, set on completion
    pub result: Option<String>,
}

impl Lab {
    /// Attach an ID to a new lab.
    pub fn from_new(id: String, lab: NewLab) -> Self {
        Self {
            id,
            patient: lab.patient,
            lab_type: lab.lab_type,
            notes: lab.notes,
            status: lab.status,
            requested_on: lab.requested_on,
            completed_on: None,
            canceled_on: None,
            result: None,
        }
    }

    /// Record a result. Returns false if the lab is not in `Requested`.
    pub fn complete(&mut self, result: String, at: DateTime<Utc>) -> bool {
        if self.status != LabStatus::Requested {
            return false;
        }
        self.status = LabStatus::Completed;
        self.result = Some(result);
        self.completed_on = Some(format_timestamp(at));
        true
    }

    /// Withdraw the request. Returns false if the lab is not in `Requested`.
    pub fn cancel(&mut self, at: DateTime<Utc>) -> bool {
        if self.status != LabStatus::Requested {
            return false;
        }
        self.status = LabStatus::Canceled;
        self.canceled_on = Some(format_timestamp(at));
        true
    }
}

/// Filter for searching stored labs. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabQuery {
    /// Case-insensitive substring of the lab type
    pub text: Option<String>,
    pub status: Option<LabStatus>,
    pub patient: Option<String>,
}

impl LabQuery {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn status(mut self, status: LabStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn patient(mut self, patient: impl Into<String>) -> Self {
        self.patient = Some(patient.into());
        self
    }
}

/// ISO-8601 with milliseconds and a `Z` suffix, e.g. `2020-04-01T10:00:00.000Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
