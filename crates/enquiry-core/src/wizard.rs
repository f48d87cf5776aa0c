//! The booking enquiry wizard as an explicit state object.
//!
//! A [`Wizard`] owns at most one open session: the form store, the current
//! [`WizardState`] and the outcome of the last submission. Rendering layers
//! read it; only the operations below mutate it.

use crate::form::{ErrorMap, Field, FieldValue, FormData, FormSeed, FormStore};
use crate::steps::{WizardState, WizardStep};
use crate::validation;
use enquiry_error::{SubmissionResult, WizardError, WizardResult};
use log::{debug, info, warn};

pub const SUBMISSION_FAILED_MESSAGE: &str = "Something went wrong. Please try again.";

/// What the success screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub first_name: String,
    pub email: String,
}

/// Result of a "Next" press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved(WizardState),
    /// Validation failed; the errors are on the store.
    Blocked,
}

/// Proof that a submission attempt was started for a given session.
#[derive(Debug)]
pub struct SubmitTicket {
    session: u64,
    payload: FormData,
}

impl SubmitTicket {
    pub fn payload(&self) -> &FormData {
        &self.payload
    }

    pub fn session(&self) -> u64 {
        self.session
    }
}

#[derive(Debug)]
pub enum SubmitStart {
    Ready(SubmitTicket),
    /// An earlier step (or the contact step) failed validation; the wizard now
    /// shows that step with its errors.
    Invalid(WizardStep),
    /// Another attempt has not resolved yet.
    InFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitResolution {
    Succeeded,
    Failed,
    /// The session the ticket belonged to is gone.
    Discarded,
}

#[derive(Debug)]
struct Session {
    id: u64,
    store: FormStore,
    state: WizardState,
    submission_error: Option<String>,
    confirmation: Option<Confirmation>,
}

#[derive(Debug, Default)]
pub struct Wizard {
    session: Option<Session>,
    sessions_opened: u64,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh session, optionally with a package already chosen by the
    /// caller (e.g. a package card's "Book Now").
    pub fn open(&mut self, preselected_package: Option<&str>) -> WizardState {
        let seed = match preselected_package {
            Some(id) => FormSeed::with_package(id),
            None => FormSeed::default(),
        };
        self.open_seeded(seed)
    }

    /// Start a fresh session from a partial record. A non-empty seeded package
    /// positions the wizard on the package step.
    pub fn open_seeded(&mut self, seed: FormSeed) -> WizardState {
        if self.session.is_some() {
            self.close();
        }
        let state = if seed.has_package() {
            WizardState::Step2
        } else {
            WizardState::Step1
        };
        let mut store = FormStore::new();
        store.reset(seed);

        self.sessions_opened += 1;
        self.session = Some(Session {
            id: self.sessions_opened,
            store,
            state,
            submission_error: None,
            confirmation: None,
        });
        info!("Enquiry wizard opened (session {}) at {}", self.sessions_opened, state);
        state
    }

    /// Discard the session, whatever state it is in.
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            if session.state == WizardState::Submitting {
                info!(
                    "Enquiry wizard closed with a submission in flight (session {}); its result will be ignored",
                    session.id
                );
            } else {
                info!("Enquiry wizard closed (session {}) at {}", session.id, session.state);
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_id(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.id)
    }

    pub fn state(&self) -> Option<WizardState> {
        self.session.as_ref().map(|s| s.state)
    }

    /// Page to render; `None` when closed or after success.
    pub fn step(&self) -> Option<WizardStep> {
        self.state().and_then(|s| s.step())
    }

    pub fn data(&self) -> Option<&FormData> {
        self.session.as_ref().map(|s| s.store.data())
    }

    pub fn snapshot(&self) -> Option<FormData> {
        self.session.as_ref().map(|s| s.store.snapshot())
    }

    pub fn errors(&self) -> Option<&ErrorMap> {
        self.session.as_ref().map(|s| s.store.errors())
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.store.error(field))
    }

    /// Generic message from the last failed submission, kept apart from the
    /// per-field errors.
    pub fn submission_error(&self) -> Option<&str> {
        self.session
            .as_ref()
            .and_then(|s| s.submission_error.as_deref())
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        self.session.as_ref().and_then(|s| s.confirmation.as_ref())
    }

    pub fn can_go_back(&self) -> bool {
        self.state().and_then(|s| s.back_target()).is_some()
    }

    pub fn can_advance(&self) -> bool {
        self.state().and_then(|s| s.advance_target()).is_some()
    }

    /// False while an attempt is in flight; the submit control is disabled then.
    pub fn can_submit(&self) -> bool {
        self.state().is_some_and(|s| s.accepts_submit())
    }

    pub fn update(&mut self, field: Field, value: impl Into<FieldValue>) -> WizardResult<()> {
        let session = self.session_mut()?;
        session.store.update(field, value)?;
        debug!("Field {} updated", field);
        Ok(())
    }

    pub fn update_from_input(&mut self, field: Field, raw: &str) -> WizardResult<()> {
        let session = self.session_mut()?;
        session.store.update_from_input(field, raw)?;
        debug!("Field {} updated from input", field);
        Ok(())
    }

    /// Validate the current step and move forward when it passes. Always
    /// re-validates; an earlier failed attempt is not remembered.
    pub fn next(&mut self) -> WizardResult<Advance> {
        let session = self.session_mut()?;
        let state = session.state;
        let (step, target) = match (state.step(), state.advance_target()) {
            (Some(step), Some(target)) => (step, target),
            _ => {
                return Err(WizardError::NoNextStep {
                    state: state.to_string(),
                })
            }
        };

        let errors = validation::validate(step, session.store.data());
        if errors.is_empty() {
            session.store.set_errors(errors);
            session.state = target;
            info!("Step {} complete, now at {}", step.number(), target);
            Ok(Advance::Moved(target))
        } else {
            warn!(
                "Step {} blocked by invalid fields: {}",
                step.number(),
                field_list(&errors)
            );
            session.store.set_errors(errors);
            Ok(Advance::Blocked)
        }
    }

    pub fn back(&mut self) -> WizardResult<WizardState> {
        let session = self.session_mut()?;
        let target = session
            .state
            .back_target()
            .ok_or_else(|| WizardError::NoPreviousStep {
                state: session.state.to_string(),
            })?;
        // The failure banner belongs to the contact step only.
        if session.state == WizardState::SubmitFailed {
            session.submission_error = None;
        }
        session.state = target;
        debug!("Moved back to {}", target);
        Ok(target)
    }

    /// First half of a submission: guard, validate, move to `Submitting`.
    ///
    /// A session opened at the package step never validated step 1, so every
    /// step up to the contact step is checked here.
    pub fn begin_submit(&mut self) -> WizardResult<SubmitStart> {
        let session = self.session_mut()?;
        match session.state {
            WizardState::Submitting => {
                debug!("Submit ignored: an attempt is already in flight");
                return Ok(SubmitStart::InFlight);
            }
            state if !state.accepts_submit() => {
                return Err(WizardError::NotOnContactStep {
                    state: state.to_string(),
                })
            }
            _ => {}
        }

        session.submission_error = None;
        if let Some((step, errors)) =
            validation::first_invalid_step(WizardStep::Contact, session.store.data())
        {
            warn!(
                "Submit blocked at step {} by invalid fields: {}",
                step.number(),
                field_list(&errors)
            );
            session.store.set_errors(errors);
            session.state = WizardState::at(step);
            return Ok(SubmitStart::Invalid(step));
        }

        session.store.set_errors(ErrorMap::new());
        session.state = WizardState::Submitting;
        info!("Submitting enquiry (session {})", session.id);
        Ok(SubmitStart::Ready(SubmitTicket {
            session: session.id,
            payload: session.store.snapshot(),
        }))
    }

    /// Second half of a submission: apply the endpoint's answer, unless the
    /// session that started it has been closed or replaced.
    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        result: SubmissionResult<()>,
    ) -> SubmitResolution {
        let session = match self.session.as_mut() {
            Some(session) if session.id == ticket.session => session,
            _ => {
                info!(
                    "Discarding submission result for closed session {}",
                    ticket.session
                );
                return SubmitResolution::Discarded;
            }
        };
        if session.state != WizardState::Submitting {
            warn!(
                "Discarding submission result: session {} is at {}",
                session.id, session.state
            );
            return SubmitResolution::Discarded;
        }

        match result {
            Ok(()) => {
                session.state = WizardState::Success;
                session.confirmation = Some(Confirmation {
                    first_name: ticket.payload.first_name,
                    email: ticket.payload.email,
                });
                info!("Enquiry submitted (session {})", session.id);
                SubmitResolution::Succeeded
            }
            Err(err) => {
                session.state = WizardState::SubmitFailed;
                session.submission_error = Some(SUBMISSION_FAILED_MESSAGE.to_string());
                warn!("Enquiry submission failed (session {}): {}", session.id, err);
                SubmitResolution::Failed
            }
        }
    }

    fn session_mut(&mut self) -> WizardResult<&mut Session> {
        self.session.as_mut().ok_or(WizardError::WizardClosed)
    }
}

fn field_list(errors: &ErrorMap) -> String {
    errors
        .keys()
        .map(Field::wire_name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use enquiry_error::SubmissionError;

    fn fill_contact(wizard: &mut Wizard) {
        wizard.update(Field::FirstName, "Mia").unwrap();
        wizard.update(Field::LastName, "Korhonen").unwrap();
        wizard.update(Field::Email, "mia@example.fi").unwrap();
        wizard.update(Field::Phone, "0401234567").unwrap();
    }

    fn at_contact_step() -> Wizard {
        let mut wizard = Wizard::new();
        wizard.open(None);
        wizard
            .update(Field::DepartureDate, NaiveDate::from_ymd_opt(2025, 12, 10))
            .unwrap();
        wizard.next().unwrap();
        wizard.update(Field::SelectedPackage, "custom").unwrap();
        wizard.next().unwrap();
        assert_eq!(wizard.state(), Some(WizardState::Step3));
        wizard
    }

    #[test]
    fn closed_wizard_rejects_operations() {
        let mut wizard = Wizard::new();
        assert_eq!(wizard.next(), Err(WizardError::WizardClosed));
        assert_eq!(
            wizard.update(Field::Email, "a@b.com"),
            Err(WizardError::WizardClosed)
        );
        assert!(matches!(wizard.begin_submit(), Err(WizardError::WizardClosed)));
        assert!(wizard.state().is_none());
    }

    #[test]
    fn blank_step_one_stays_put() {
        let mut wizard = Wizard::new();
        wizard.open(None);
        assert_eq!(wizard.next().unwrap(), Advance::Blocked);
        assert_eq!(wizard.state(), Some(WizardState::Step1));
        assert_eq!(
            wizard.error(Field::DepartureDate),
            Some("Please select a departure date")
        );
    }

    #[test]
    fn back_on_first_step_is_a_contract_error() {
        let mut wizard = Wizard::new();
        wizard.open(None);
        assert!(!wizard.can_go_back());
        assert!(matches!(
            wizard.back(),
            Err(WizardError::NoPreviousStep { .. })
        ));
    }

    #[test]
    fn next_on_contact_step_is_a_contract_error() {
        let mut wizard = at_contact_step();
        assert!(!wizard.can_advance());
        assert_eq!(
            wizard.next(),
            Err(WizardError::NoNextStep {
                state: "Step3".to_string()
            })
        );
    }

    #[test]
    fn submit_before_contact_step_is_a_contract_error() {
        let mut wizard = Wizard::new();
        wizard.open(None);
        assert!(matches!(
            wizard.begin_submit(),
            Err(WizardError::NotOnContactStep { .. })
        ));
    }

    #[test]
    fn second_begin_while_in_flight_is_refused() {
        let mut wizard = at_contact_step();
        fill_contact(&mut wizard);
        let first = wizard.begin_submit().unwrap();
        assert!(matches!(first, SubmitStart::Ready(_)));
        assert!(matches!(wizard.begin_submit().unwrap(), SubmitStart::InFlight));
        assert!(!wizard.can_submit());
    }

    #[test]
    fn failure_uses_dedicated_slot_and_allows_retry() {
        let mut wizard = at_contact_step();
        fill_contact(&mut wizard);
        let SubmitStart::Ready(ticket) = wizard.begin_submit().unwrap() else {
            panic!("expected a ticket");
        };
        let resolution = wizard.finish_submit(ticket, Err(SubmissionError::status(500)));

        assert_eq!(resolution, SubmitResolution::Failed);
        assert_eq!(wizard.state(), Some(WizardState::SubmitFailed));
        assert_eq!(wizard.step(), Some(WizardStep::Contact));
        assert_eq!(wizard.submission_error(), Some(SUBMISSION_FAILED_MESSAGE));
        assert!(wizard.error(Field::Email).is_none());

        assert!(matches!(wizard.begin_submit().unwrap(), SubmitStart::Ready(_)));
        assert!(wizard.submission_error().is_none());
    }

    #[test]
    fn going_back_after_failure_drops_the_banner() {
        let mut wizard = at_contact_step();
        fill_contact(&mut wizard);
        let SubmitStart::Ready(ticket) = wizard.begin_submit().unwrap() else {
            panic!("expected a ticket");
        };
        wizard.finish_submit(ticket, Err(SubmissionError::status(503)));
        assert_eq!(wizard.submission_error(), Some(SUBMISSION_FAILED_MESSAGE));

        assert_eq!(wizard.back().unwrap(), WizardState::Step2);
        assert!(wizard.submission_error().is_none());
        assert_eq!(wizard.back().unwrap(), WizardState::Step1);
        assert!(wizard.submission_error().is_none());
        assert_eq!(wizard.data().unwrap().first_name, "Mia");
    }

    #[test]
    fn success_keeps_submitted_name_and_email() {
        let mut wizard = at_contact_step();
        fill_contact(&mut wizard);
        let SubmitStart::Ready(ticket) = wizard.begin_submit().unwrap() else {
            panic!("expected a ticket");
        };
        wizard.update(Field::FirstName, "Edited").unwrap();
        wizard.finish_submit(ticket, Ok(()));

        assert_eq!(wizard.state(), Some(WizardState::Success));
        assert_eq!(
            wizard.confirmation(),
            Some(&Confirmation {
                first_name: "Mia".to_string(),
                email: "mia@example.fi".to_string(),
            })
        );
        assert!(wizard.step().is_none());
    }

    #[test]
    fn result_after_close_is_discarded() {
        let mut wizard = at_contact_step();
        fill_contact(&mut wizard);
        let SubmitStart::Ready(ticket) = wizard.begin_submit().unwrap() else {
            panic!("expected a ticket");
        };
        wizard.close();
        wizard.open(Some("arctic-adventure-week"));

        assert_eq!(wizard.finish_submit(ticket, Ok(())), SubmitResolution::Discarded);
        assert_eq!(wizard.state(), Some(WizardState::Step2));
        assert!(wizard.confirmation().is_none());
    }

    #[test]
    fn preselected_package_starts_on_step_two_but_still_checks_dates() {
        let mut wizard = Wizard::new();
        assert_eq!(
            wizard.open(Some("magical-family-escape")),
            WizardState::Step2
        );
        assert_eq!(
            wizard.data().unwrap().selected_package,
            "magical-family-escape"
        );
        assert_eq!(wizard.next().unwrap(), Advance::Moved(WizardState::Step3));
        fill_contact(&mut wizard);

        let start = wizard.begin_submit().unwrap();
        assert!(matches!(start, SubmitStart::Invalid(WizardStep::DatesAndGuests)));
        assert_eq!(wizard.state(), Some(WizardState::Step1));
        assert!(wizard.error(Field::DepartureDate).is_some());
    }

    #[test]
    fn empty_preselection_starts_blank() {
        let mut wizard = Wizard::new();
        assert_eq!(wizard.open(Some("")), WizardState::Step1);
    }

    #[test]
    fn reopening_resets_everything() {
        let mut wizard = at_contact_step();
        fill_contact(&mut wizard);
        let first_session = wizard.session_id();
        wizard.close();
        assert!(!wizard.is_open());

        wizard.open(None);
        assert_ne!(wizard.session_id(), first_session);
        assert_eq!(wizard.snapshot(), Some(FormData::default()));
        assert!(wizard.errors().unwrap().is_empty());
    }
}
