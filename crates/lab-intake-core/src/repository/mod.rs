//! Persistence boundary consumed by the intake session.
//!
//! The session only sees these traits; [`SqliteStore`] is the local
//! implementation.

mod sqlite;

pub use sqlite::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::db::DbError;
use crate::models::{Lab, LabQuery, NewLab, PatientSummary};

/// Repository errors.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Lock poisoned: {0}")]
    Poisoned(String),
}

impl<T> From<std::sync::PoisonError<T>> for RepositoryError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        RepositoryError::Poisoned(e.to_string())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Patient search backing the patient selection control.
#[async_trait]
pub trait PatientLookup: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> RepositoryResult<Vec<PatientSummary>>;
}

/// Document-style store for lab requests.
#[async_trait]
pub trait LabRepository: Send + Sync {
    /// Persist a new lab and return it with its assigned ID.
    async fn save(&self, lab: NewLab) -> RepositoryResult<Lab>;

    async fn find(&self, id: &str) -> RepositoryResult<Option<Lab>>;

    async fn search(&self, query: &LabQuery) -> RepositoryResult<Vec<Lab>>;
}
