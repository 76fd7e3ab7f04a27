//! SQLite schema definition.

/// Complete database schema for lab intake.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    given_name TEXT NOT NULL,
    family_name TEXT NOT NULL,
    full_name TEXT NOT NULL,
    date_of_birth TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_full_name ON patients(full_name);

-- ============================================================================
-- Labs
-- ============================================================================

-- The patient column is not a foreign key: the lookup that produced the ID
-- may be backed by a different store.
CREATE TABLE IF NOT EXISTS labs (
    id TEXT PRIMARY KEY,
    patient TEXT NOT NULL,
    type TEXT NOT NULL,
    notes TEXT NOT NULL DEFAULT '[]',             -- JSON array of strings
    status TEXT NOT NULL DEFAULT 'requested'
        CHECK (status IN ('requested', 'completed', 'canceled')),
    requested_on TEXT NOT NULL,
    completed_on TEXT,
    canceled_on TEXT,
    result TEXT
);

CREATE INDEX IF NOT EXISTS idx_labs_patient ON labs(patient);
CREATE INDEX IF NOT EXISTS idx_labs_status ON labs(status);
CREATE INDEX IF NOT EXISTS idx_labs_requested_on ON labs(requested_on);
"#;
