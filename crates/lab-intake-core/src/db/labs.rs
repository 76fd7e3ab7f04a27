//! Lab request database operations.

use rusqlite::{params, types::Value, OptionalExtension, Row};

use super::{Database, DbError, DbResult, UNICODE_LOWER};
use crate::models::{Lab, LabQuery, LabStatus};

const LAB_COLUMNS: &str = "id, patient, type, notes, status, requested_on, \
                           completed_on, canceled_on, result";

impl Database {
    /// Insert a new lab.
    pub fn insert_lab(&self, lab: &Lab) -> DbResult<()> {
        if lab.id.is_empty() {
            return Err(DbError::Constraint("lab id must not be empty".into()));
        }
        let notes_json = serde_json::to_string(&lab.notes)?;

        self.conn.execute(
            r#"
            INSERT INTO labs (
                id, patient, type, notes, status, requested_on,
                completed_on, canceled_on, result
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                lab.id,
                lab.patient,
                lab.lab_type,
                notes_json,
                lab.status.as_str(),
                lab.requested_on,
                lab.completed_on,
                lab.canceled_on,
                lab.result,
            ],
        )?;
        Ok(())
    }

    /// Persist status, result and note changes of an existing lab.
    pub fn update_lab(&self, lab: &Lab) -> DbResult<()> {
        let notes_json = serde_json::to_string(&lab.notes)?;

        let rows_affected = self.conn.execute(
            r#"
            UPDATE labs SET
                notes = ?2,
                status = ?3,
                completed_on = ?4,
                canceled_on = ?5,
                result = ?6
            WHERE id = ?1
            "#,
            params![
                lab.id,
                notes_json,
                lab.status.as_str(),
                lab.completed_on,
                lab.canceled_on,
                lab.result,
            ],
        )?;
        if rows_affected == 0 {
            return Err(DbError::NotFound(format!("lab {}", lab.id)));
        }
        Ok(())
    }

    /// Get a lab by ID.
    pub fn get_lab(&self, id: &str) -> DbResult<Option<Lab>> {
        self.conn
            .query_row(
                &format!("SELECT {LAB_COLUMNS} FROM labs WHERE id = ?"),
                [id],
                lab_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List all labs for a patient, newest request first.
    pub fn list_labs_for_patient(&self, patient: &str) -> DbResult<Vec<Lab>> {
        self.search_labs(&LabQuery::default().patient(patient))
    }

    /// Search labs, newest request first.
    pub fn search_labs(&self, query: &LabQuery) -> DbResult<Vec<Lab>> {
        let mut clauses = Vec::new();
        let mut args: Vec<Value> = Vec::new();

        if let Some(text) = query.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            args.push(Value::Text(text.to_lowercase()));
            clauses.push(format!("instr({UNICODE_LOWER}(type), ?{}) > 0", args.len()));
        }
        if let Some(status) = query.status {
            args.push(Value::Text(status.as_str().to_string()));
            clauses.push(format!("status = ?{}", args.len()));
        }
        if let Some(patient) = &query.patient {
            args.push(Value::Text(patient.clone()));
            clauses.push(format!("patient = ?{}", args.len()));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LAB_COLUMNS} FROM labs {where_clause} ORDER BY requested_on DESC, id"
        ))?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args), lab_row)?;

        let mut labs = Vec::new();
        for row in rows {
            labs.push(row?.try_into()?);
        }
        Ok(labs)
    }
}

/// Intermediate row struct for database mapping.
struct LabRow {
    id: String,
    patient: String,
    lab_type: String,
    notes: String,
    status: String,
    requested_on: String,
    completed_on: Option<String>,
    canceled_on: Option<String>,
    result: Option<String>,
}

fn lab_row(row: &Row<'_>) -> rusqlite::Result<LabRow> {
    Ok(LabRow {
        id: row.get(0)?,
        patient: row.get(1)?,
        lab_type: row.get(2)?,
        notes: row.get(3)?,
        status: row.get(4)?,
        requested_on: row.get(5)?,
        completed_on: row.get(6)?,
        canceled_on: row.get(7)?,
        result: row.get(8)?,
    })
}

impl TryFrom<LabRow> for Lab {
    type Error = DbError;

    fn try_from(row: LabRow) -> Result<Self, Self::Error> {
        let notes: Vec<String> = serde_json::from_str(&row.notes)?;
        let status = LabStatus::parse(&row.status)
            .ok_or_else(|| DbError::Constraint(format!("Unknown lab status: {}", row.status)))?;

        Ok(Lab {
            id: row.id,
            patient: row.patient,
            lab_type: row.lab_type,
            notes,
            status,
            requested_on: row.requested_on,
            completed_on: row.completed_on,
            canceled_on: row.canceled_on,
            result: row.result,
        })
    }
}
