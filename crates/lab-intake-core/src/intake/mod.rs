//! New-lab-request intake: the session state machine and the collaborators
//! it is wired to.
//!
//! ```text
//!  edits ──► Editing ──submit──► (validate) ──invalid──► Editing + errors
//!               │                     │
//!             cancel                valid
//!               │                     ▼
//!               ▼                  Saving ──repository error──► Editing + failure
//!         navigate(list)              │
//!                                     ├── saved, no id ──► Aborted
//!                                     ▼
//!                                   Done ──► navigate(detail)
//! ```

mod session;

pub use session::*;

use std::sync::Arc;
use thiserror::Error;

use crate::clock::{Clock, SystemClock};
use crate::repository::{LabRepository, PatientLookup, RepositoryError, SqliteStore};

/// Title key shown while the form is mounted.
pub const NEW_LAB_TITLE: &str = "labs.requests.new";
/// Surfaced when the repository rejects a save.
pub const SAVE_FAILED: &str = "unable to save lab request.";
/// Surfaced when the patient lookup fails.
pub const SEARCH_FAILED: &str = "unable to search patients.";

/// Intake session errors.
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("a save is already in progress for this session")]
    SaveInFlight,

    #[error("session is closed")]
    Closed,

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("repository reported success without assigning an identifier")]
    MissingIdentifier,
}

pub type IntakeResult<T> = Result<T, IntakeError>;

/// Receives route changes. The session does not check whether they succeed.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Page title provider, updated once when a session is mounted.
pub trait TitleContext: Send + Sync {
    fn update_title(&self, title: &str);
}

/// Everything a session talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub labs: Arc<dyn LabRepository>,
    pub patients: Arc<dyn PatientLookup>,
    pub navigator: Arc<dyn Navigator>,
    pub title: Arc<dyn TitleContext>,
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    /// Wire a session to the SQLite store and the system clock.
    pub fn from_store(
        store: SqliteStore,
        navigator: Arc<dyn Navigator>,
        title: Arc<dyn TitleContext>,
    ) -> Self {
        let store = Arc::new(store);
        Self {
            labs: store.clone(),
            patients: store,
            navigator,
            title,
            clock: Arc::new(SystemClock),
        }
    }
}
