//! Lab Intake Core Library
//!
//! Validation, session orchestration and local persistence for raising a new
//! lab request.
//!
//! # Architecture
//!
//! ```text
//! Patient search ──► select patient ─┐
//! Type / notes edits ────────────────┤
//!                                    ▼
//!                          [IntakeSession draft]
//!                                    │ submit
//!                                    ▼
//!                         validate_lab_request()
//!                          │                 │
//!                       errors             valid
//!                          │                 │
//!                  back to editing    stamp status + requestedOn
//!                                            │
//!                                    LabRepository::save
//!                                            │
//!                                   navigate(/labs/{id})
//! ```
//!
//! # Core Principle
//!
//! **Nothing reaches the repository while validation reports an error**, and a
//! session never has more than one save outstanding.
//!
//! # Modules
//!
//! - [`models`]: Domain types (LabDraft, NewLab, Lab, Patient)
//! - [`validation`]: Field rules for a lab request draft
//! - [`intake`]: Session state machine and its collaborator traits
//! - [`repository`]: Async persistence traits and the SQLite store
//! - [`db`]: SQLite database layer
//! - [`config`]: Runtime configuration
//! - [`clock`]: Injected time source

pub mod clock;
pub mod config;
pub mod db;
pub mod intake;
pub mod models;
pub mod repository;
pub mod validation;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, DatabaseLocation, IntakeConfig};
pub use db::{Database, DbError};
pub use intake::{
    Collaborators, IntakeError, IntakeSession, Navigator, SessionPhase, SubmitOutcome,
    TitleContext,
};
pub use models::{Lab, LabDraft, LabQuery, LabStatus, NewLab, Patient, PatientSummary};
pub use repository::{LabRepository, PatientLookup, RepositoryError, SqliteStore};
pub use validation::{validate_lab_request, LabValidation};

/// Open or create the store named by the config.
///
/// The returned store is cheap to clone; share one per process and hand a
/// clone to each session via [`Collaborators::from_store`].
pub fn open_store(config: &IntakeConfig) -> Result<SqliteStore, RepositoryError> {
    SqliteStore::open(config)
}
