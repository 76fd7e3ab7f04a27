//! One form-filling interaction, from mount to navigation away.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

use super::{Collaborators, IntakeError, IntakeResult, NEW_LAB_TITLE, SAVE_FAILED, SEARCH_FAILED};
use crate::config::IntakeConfig;
use crate::models::{LabDraft, NewLab, PatientSummary};
use crate::validation::{validate_lab_request, LabValidation};

/// Where a session is in its lifecycle.
///
/// Validation runs synchronously inside [`IntakeSession::submit`] and is never
/// observable as a phase of its own.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    /// Draft is editable. Carries whatever the last submit surfaced.
    Editing {
        errors: Option<LabValidation>,
        failure: Option<String>,
    },
    /// A save is outstanding; edits and submits are rejected.
    Saving,
    /// Saved and navigated away.
    Done { lab_id: String },
    /// The repository broke its contract; nothing more can happen here.
    Aborted { reason: String },
}

impl SessionPhase {
    fn editing() -> Self {
        SessionPhase::Editing {
            errors: None,
            failure: None,
        }
    }
}

/// Result of a submit that reached a decision.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Draft failed validation. Nothing was saved.
    Invalid(LabValidation),
    /// Lab saved and navigation requested.
    Saved { lab_id: String, route: String },
}

struct SessionState {
    draft: LabDraft,
    phase: SessionPhase,
}

pub struct IntakeSession {
    deps: Collaborators,
    config: IntakeConfig,
    state: Mutex<SessionState>,
}

impl IntakeSession {
    /// Mount a new session with an empty draft.
    pub fn new(deps: Collaborators, config: IntakeConfig) -> Self {
        deps.title.update_title(NEW_LAB_TITLE);
        Self {
            deps,
            config,
            state: Mutex::new(SessionState {
                draft: LabDraft::default(),
                phase: SessionPhase::editing(),
            }),
        }
    }

    // Nothing panics while holding the lock, so a poisoned state is still consistent.
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current draft.
    pub fn draft(&self) -> LabDraft {
        self.state().draft.clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state().phase.clone()
    }

    /// Field errors from the last rejected submit, if any.
    pub fn errors(&self) -> Option<LabValidation> {
        match &self.state().phase {
            SessionPhase::Editing { errors, .. } => errors.clone(),
            _ => None,
        }
    }

    /// Generic failure from the last repository error, if any.
    pub fn failure(&self) -> Option<String> {
        match &self.state().phase {
            SessionPhase::Editing { failure, .. } => failure.clone(),
            _ => None,
        }
    }

    // =========================================================================
    // Edits
    // =========================================================================

    /// Store the chosen patient's ID, or clear it.
    pub fn select_patient(&self, patient: Option<&PatientSummary>) -> IntakeResult<()> {
        self.edit(|draft| draft.patient = patient.map(|p| p.id.clone()))
    }

    pub fn set_type(&self, lab_type: &str) -> IntakeResult<()> {
        self.edit(|draft| draft.lab_type = lab_type.to_string())
    }

    /// Notes arrive as one text value and are kept as a list.
    pub fn set_notes(&self, notes: &str) -> IntakeResult<()> {
        self.edit(|draft| draft.set_notes_text(notes))
    }

    fn edit(&self, f: impl FnOnce(&mut LabDraft)) -> IntakeResult<()> {
        let mut state = self.state();
        check_editing(&state.phase)?;
        f(&mut state.draft);
        Ok(())
    }

    // =========================================================================
    // Patient lookup
    // =========================================================================

    /// Search patients for the selection control. A blank query returns
    /// nothing without hitting the lookup.
    pub async fn search_patients(&self, query: &str) -> IntakeResult<Vec<PatientSummary>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        match self
            .deps
            .patients
            .search(query, self.config.patient_search_limit())
            .await
        {
            Ok(patients) => Ok(patients),
            Err(e) => {
                warn!(error = %e, "patient search failed");
                if let SessionPhase::Editing { failure, .. } = &mut self.state().phase {
                    *failure = Some(SEARCH_FAILED.to_string());
                }
                Err(e.into())
            }
        }
    }

    // =========================================================================
    // Submit / cancel
    // =========================================================================

    /// Validate the draft and, if it passes, save it and navigate to its
    /// detail route.
    ///
    /// Rejected with [`IntakeError::SaveInFlight`] while another save from this
    /// session is outstanding. On a repository error, or if this future is
    /// dropped before the save resolves, the session returns to editing with
    /// the draft intact.
    pub async fn submit(&self) -> IntakeResult<SubmitOutcome> {
        let new_lab = {
            let mut state = self.state();
            check_editing(&state.phase)?;

            let validation = validate_lab_request(&state.draft);
            let new_lab = if validation.is_valid() {
                NewLab::from_draft(&state.draft, self.deps.clock.now())
            } else {
                None
            };

            let Some(new_lab) = new_lab else {
                debug!(errors = ?validation.field_errors(), "lab request rejected");
                state.phase = SessionPhase::Editing {
                    errors: Some(validation.clone()),
                    failure: None,
                };
                return Ok(SubmitOutcome::Invalid(validation));
            };

            state.phase = SessionPhase::Saving;
            new_lab
        };

        let guard = SavingGuard {
            session: self,
            armed: true,
        };
        let saved = self.deps.labs.save(new_lab).await;
        guard.disarm();

        let mut state = self.state();
        match saved {
            Ok(lab) if lab.id.trim().is_empty() => {
                error!("lab repository returned a saved lab without an id");
                state.phase = SessionPhase::Aborted {
                    reason: IntakeError::MissingIdentifier.to_string(),
                };
                Err(IntakeError::MissingIdentifier)
            }
            Ok(lab) => {
                let route = self.config.detail_route(&lab.id);
                state.phase = SessionPhase::Done {
                    lab_id: lab.id.clone(),
                };
                drop(state);

                info!(lab_id = %lab.id, %route, "lab request saved");
                self.deps.navigator.navigate(&route);
                Ok(SubmitOutcome::Saved {
                    lab_id: lab.id,
                    route,
                })
            }
            Err(e) => {
                warn!(error = %e, "saving lab request failed");
                state.phase = SessionPhase::Editing {
                    errors: None,
                    failure: Some(SAVE_FAILED.to_string()),
                };
                Err(e.into())
            }
        }
    }

    /// Leave the form for the list view. Nothing is validated or saved and the
    /// draft is left as is.
    pub fn cancel(&self) -> IntakeResult<String> {
        check_editing(&self.state().phase)?;

        let route = self.config.list_route().to_string();
        debug!(%route, "lab request cancelled");
        self.deps.navigator.navigate(&route);
        Ok(route)
    }
}

/// Returns the session to editing if a submit is dropped while its save is
/// outstanding, so the draft can be resubmitted.
struct SavingGuard<'a> {
    session: &'a IntakeSession,
    armed: bool,
}

impl SavingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.session.state();
        if state.phase == SessionPhase::Saving {
            warn!("submit dropped while saving; returning to editing");
            state.phase = SessionPhase::Editing {
                errors: None,
                failure: Some(SAVE_FAILED.to_string()),
            };
        }
    }
}

fn check_editing(phase: &SessionPhase) -> IntakeResult<()> {
    match phase {
        SessionPhase::Editing { .. } => Ok(()),
        SessionPhase::Saving => Err(IntakeError::SaveInFlight),
        SessionPhase::Done { .. } | SessionPhase::Aborted { .. } => Err(IntakeError::Closed),
    }
}
