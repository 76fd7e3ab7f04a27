//! SQLite-backed repositories.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::{LabRepository, PatientLookup, RepositoryResult};
use crate::config::{DatabaseLocation, IntakeConfig};
use crate::db::Database;
use crate::models::{Lab, LabQuery, NewLab, Patient, PatientSummary};

/// Thread-safe store shared by every session in the process.
///
/// Each call runs its SQLite work on the blocking pool.
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Open the database named by the config.
    pub fn open(config: &IntakeConfig) -> RepositoryResult<Self> {
        let db = match config.database() {
            DatabaseLocation::InMemory => Database::open_in_memory()?,
            DatabaseLocation::File(path) => Database::open(path)?,
        };
        Ok(Self::new(db))
    }

    pub fn open_in_memory() -> RepositoryResult<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    /// Register a patient so it can be found by the lookup.
    pub async fn add_patient(&self, patient: Patient) -> RepositoryResult<Patient> {
        self.with_db(move |db| {
            db.insert_patient(&patient)?;
            Ok(patient)
        })
        .await
    }

    /// Persist status or result changes to a stored lab.
    pub async fn update_lab(&self, lab: Lab) -> RepositoryResult<()> {
        self.with_db(move |db| Ok(db.update_lab(&lab)?)).await
    }

    async fn with_db<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> RepositoryResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let db = db.lock()?;
            f(&db)
        })
        .await?
    }
}

#[async_trait]
impl PatientLookup for SqliteStore {
    async fn search(&self, query: &str, limit: usize) -> RepositoryResult<Vec<PatientSummary>> {
        let query = query.to_string();
        self.with_db(move |db| {
            let patients = db.search_patients(&query, limit)?;
            Ok(patients.iter().map(Patient::summary).collect())
        })
        .await
    }
}

#[async_trait]
impl LabRepository for SqliteStore {
    async fn save(&self, lab: NewLab) -> RepositoryResult<Lab> {
        let lab = Lab::from_new(uuid::Uuid::new_v4().to_string(), lab);
        let saved = self
            .with_db(move |db| {
                db.insert_lab(&lab)?;
                Ok(lab)
            })
            .await?;

        debug!(lab_id = %saved.id, patient = %saved.patient, "lab saved");
        Ok(saved)
    }

    async fn find(&self, id: &str) -> RepositoryResult<Option<Lab>> {
        let id = id.to_string();
        self.with_db(move |db| Ok(db.get_lab(&id)?)).await
    }

    async fn search(&self, query: &LabQuery) -> RepositoryResult<Vec<Lab>> {
        let query = query.clone();
        self.with_db(move |db| Ok(db.search_labs(&query)?)).await
    }
}
