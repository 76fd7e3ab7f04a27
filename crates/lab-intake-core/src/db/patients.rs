//! Patient database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult, UNICODE_LOWER};
use crate::models::Patient;

const PATIENT_COLUMNS: &str =
    "id, given_name, family_name, full_name, date_of_birth, created_at, updated_at";

impl Database {
    /// Insert a new patient.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO patients (
                id, given_name, family_name, full_name, date_of_birth,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                patient.id,
                patient.given_name,
                patient.family_name,
                patient.full_name,
                patient.date_of_birth,
                patient.created_at,
                patient.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?"),
                [id],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all patients.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY full_name"
        ))?;

        let rows = stmt.query_map([], patient_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Search patients by full name.
    ///
    /// Matches any case-insensitive (Unicode) substring, then ranks prefix matches first
    /// and the rest by Jaro-Winkler similarity to the query.
    pub fn search_patients(&self, query: &str, limit: usize) -> DbResult<Vec<Patient>> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let needle = query.to_lowercase();
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {PATIENT_COLUMNS}
            FROM patients
            WHERE instr({UNICODE_LOWER}(full_name), ?1) > 0
            "#
        ))?;

        let rows = stmt.query_map([&needle], patient_from_row)?;
        let mut patients = rows.collect::<Result<Vec<_>, _>>()?;

        let mut scored: Vec<(bool, f64, Patient)> = patients
            .drain(..)
            .map(|p| {
                let name = p.full_name.to_lowercase();
                let prefix = name.starts_with(&needle);
                let score = strsim::jaro_winkler(&name, &needle);
                (prefix, score, p)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.0.cmp(&a.0)
                .then_with(|| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal))
                .then_with(|| a.2.full_name.cmp(&b.2.full_name))
        });
        scored.truncate(limit);

        Ok(scored.into_iter().map(|(_, _, p)| p).collect())
    }
}

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        given_name: row.get(1)?,
        family_name: row.get(2)?,
        full_name: row.get(3)?,
        date_of_birth: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();

        let mut patient = Patient::new("Jane".into(), "Doe".into());
        patient.date_of_birth = Some("1980-02-29".into());
        db.insert_patient(&patient).unwrap();

        let retrieved = db.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(retrieved, patient);
        assert!(db.get_patient("missing").unwrap().is_none());
    }

    #[test]
    fn test_search_patients_ranks_prefix_first() {
        let db = setup_db();

        let maxine = Patient::new("Maxine".into(), "Smith".into());
        let max = Patient::new("Max".into(), "Power".into());
        let alex = Patient::new("Alex".into(), "Maxwell".into());
        let luna = Patient::new("Luna".into(), "Lovegood".into());
        for p in [&maxine, &max, &alex, &luna] {
            db.insert_patient(p).unwrap();
        }

        let results = db.search_patients("max", 10).unwrap();
        assert_eq!(results.len(), 3);
        // Both prefix matches come before the substring-only match
        assert!(results[..2].iter().all(|p| p.full_name.starts_with("Max")));
        assert_eq!(results[2].id, alex.id);
    }

    #[test]
    fn test_search_patients_respects_limit_and_blank_query() {
        let db = setup_db();
        for given in ["Ann", "Anna", "Annie"] {
            db.insert_patient(&Patient::new(given.into(), "Lee".into()))
                .unwrap();
        }

        assert_eq!(db.search_patients("ann", 2).unwrap().len(), 2);
        assert!(db.search_patients("   ", 10).unwrap().is_empty());
    }

    #[test]
    fn test_search_patients_folds_non_ascii_case() {
        let db = setup_db();
        let muller = Patient::new("Jürgen".into(), "Müller".into());
        db.insert_patient(&muller).unwrap();
        db.insert_patient(&Patient::new("Anna".into(), "Muller".into()))
            .unwrap();

        let results = db.search_patients("MÜLLER", 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, muller.id);
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let db = setup_db();
        db.insert_patient(&Patient::new("Jane".into(), "Doe".into()))
            .unwrap();

        assert!(db.search_patients("%", 10).unwrap().is_empty());
        assert!(db.search_patients("_", 10).unwrap().is_empty());
    }

    #[test]
    fn test_list_patients_sorted() {
        let db = setup_db();
        db.insert_patient(&Patient::new("Zed".into(), "A".into()))
            .unwrap();
        db.insert_patient(&Patient::new("Amy".into(), "B".into()))
            .unwrap();

        let names: Vec<_> = db
            .list_patients()
            .unwrap()
            .into_iter()
            .map(|p| p.full_name)
            .collect();
        assert_eq!(names, vec!["Amy B", "Zed A"]);
    }
}
