use async_trait::async_trait;
use chrono::NaiveDate;
use enquiry_core::{
    Advance, EnquiryTransport, Field, FormData, SubmissionCoordinator, SubmissionError,
    SubmissionResult, SubmitOutcome, Wizard, WizardError, WizardState, WizardStep,
    SUBMISSION_FAILED_MESSAGE,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Answers from a queue; succeeds once the queue is empty.
#[derive(Default)]
struct ScriptedTransport {
    calls: AtomicUsize,
    answers: Mutex<VecDeque<SubmissionResult<()>>>,
    payloads: Mutex<Vec<FormData>>,
}

impl ScriptedTransport {
    fn answering(answers: Vec<SubmissionResult<()>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            ..Default::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EnquiryTransport for ScriptedTransport {
    async fn send(&self, enquiry: &FormData) -> SubmissionResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().unwrap().push(enquiry.clone());
        self.answers.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

/// Holds every request until the gate is opened.
struct GatedTransport {
    calls: Arc<AtomicUsize>,
    gate: Arc<Notify>,
}

#[async_trait]
impl EnquiryTransport for GatedTransport {
    async fn send(&self, _enquiry: &FormData) -> SubmissionResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(())
    }
}

fn departure() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 10).unwrap()
}

fn walk_to_contact(wizard: &mut Wizard) {
    wizard.update(Field::DepartureDate, departure()).unwrap();
    wizard.update(Field::Adults, 2u8).unwrap();
    assert_eq!(wizard.next().unwrap(), Advance::Moved(WizardState::Step2));
    wizard
        .update(Field::SelectedPackage, "magical-family-escape")
        .unwrap();
    assert_eq!(wizard.next().unwrap(), Advance::Moved(WizardState::Step3));
}

fn fill_contact(wizard: &mut Wizard) {
    wizard.update(Field::FirstName, "Olivia").unwrap();
    wizard.update(Field::LastName, "Hart").unwrap();
    wizard.update(Field::Email, "olivia.hart@example.co.uk").unwrap();
    wizard.update(Field::Phone, "07700 900123").unwrap();
}

fn ready_wizard() -> Arc<Mutex<Wizard>> {
    let mut wizard = Wizard::new();
    wizard.open(None);
    walk_to_contact(&mut wizard);
    fill_contact(&mut wizard);
    Arc::new(Mutex::new(wizard))
}

#[test]
fn missing_departure_date_blocks_step_one() {
    let mut wizard = Wizard::new();
    wizard.open(None);

    assert_eq!(wizard.next().unwrap(), Advance::Blocked);
    assert_eq!(wizard.state(), Some(WizardState::Step1));
    assert_eq!(
        wizard.error(Field::DepartureDate),
        Some("Please select a departure date")
    );

    // a second press re-validates instead of reusing the first result
    wizard.update(Field::DepartureDate, departure()).unwrap();
    assert!(wizard.error(Field::DepartureDate).is_none());
    assert_eq!(wizard.next().unwrap(), Advance::Moved(WizardState::Step2));
}

#[test]
fn valid_dates_and_package_reach_contact_step() {
    let mut wizard = Wizard::new();
    wizard.open(None);
    walk_to_contact(&mut wizard);
    assert_eq!(wizard.step(), Some(WizardStep::Contact));
    assert!(wizard.errors().unwrap().is_empty());

    assert_eq!(wizard.back().unwrap(), WizardState::Step2);
    assert_eq!(wizard.back().unwrap(), WizardState::Step1);
    assert_eq!(wizard.data().unwrap().selected_package, "magical-family-escape");
}

#[tokio::test]
async fn malformed_email_is_reported_until_corrected() {
    let mut wizard = Wizard::new();
    wizard.open(None);
    walk_to_contact(&mut wizard);
    fill_contact(&mut wizard);
    wizard.update(Field::Email, "not-an-email").unwrap();

    let transport = ScriptedTransport::default();
    let shared = Arc::new(Mutex::new(wizard));
    let coordinator = SubmissionCoordinator::new(shared.clone(), transport);

    let outcome = coordinator.submit().await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Invalid(WizardStep::Contact));
    assert_eq!(coordinator.transport().calls(), 0);
    {
        let wizard = shared.lock().unwrap();
        assert_eq!(wizard.error(Field::Email), Some("Please enter a valid email"));
        assert_eq!(wizard.state(), Some(WizardState::Step3));
    }

    shared.lock().unwrap().update(Field::Email, "a@b.com").unwrap();
    let outcome = coordinator.submit().await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Submitted);
    assert!(shared.lock().unwrap().error(Field::Email).is_none());
}

#[tokio::test]
async fn successful_submission_shows_confirmation() {
    let wizard = ready_wizard();
    let coordinator = SubmissionCoordinator::new(wizard.clone(), ScriptedTransport::default());

    assert_eq!(coordinator.submit().await.unwrap(), SubmitOutcome::Submitted);

    let wizard = coordinator.lock();
    assert_eq!(wizard.state(), Some(WizardState::Success));
    let confirmation = wizard.confirmation().unwrap();
    assert_eq!(confirmation.first_name, "Olivia");
    assert_eq!(confirmation.email, "olivia.hart@example.co.uk");

    let sent = coordinator.transport().payloads.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].departure_date, Some(departure()));
    assert_eq!(sent[0].selected_package, "magical-family-escape");
}

#[tokio::test]
async fn rejected_submission_can_be_retried_after_edit() {
    let wizard = ready_wizard();
    let transport = ScriptedTransport::answering(vec![Err(SubmissionError::status(502))]);
    let coordinator = SubmissionCoordinator::new(wizard, transport);

    assert_eq!(coordinator.submit().await.unwrap(), SubmitOutcome::Failed);
    {
        let mut wizard = coordinator.lock();
        assert_eq!(wizard.state(), Some(WizardState::SubmitFailed));
        assert_eq!(wizard.submission_error(), Some(SUBMISSION_FAILED_MESSAGE));
        assert_eq!(wizard.snapshot().unwrap().first_name, "Olivia");
        wizard.update(Field::Phone, "+44 7700 900456").unwrap();
    }

    assert_eq!(coordinator.submit().await.unwrap(), SubmitOutcome::Submitted);
    assert_eq!(coordinator.transport().calls(), 2);
    let sent = coordinator.transport().payloads.lock().unwrap();
    assert_eq!(sent[1].phone, "+44 7700 900456");
}

#[tokio::test]
async fn double_submit_makes_one_network_call() {
    let wizard = ready_wizard();
    let calls = Arc::new(AtomicUsize::new(0));
    let gate = Arc::new(Notify::new());
    let transport = GatedTransport {
        calls: calls.clone(),
        gate: gate.clone(),
    };
    let coordinator = SubmissionCoordinator::new(wizard, transport);

    let (first, second) = tokio::join!(coordinator.submit(), async {
        let outcome = coordinator.submit().await;
        gate.notify_one();
        outcome
    });

    assert_eq!(first.unwrap(), SubmitOutcome::Submitted);
    assert_eq!(second.unwrap(), SubmitOutcome::AlreadyInFlight);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn closing_mid_flight_discards_the_answer() {
    let wizard = ready_wizard();
    let calls = Arc::new(AtomicUsize::new(0));
    let gate = Arc::new(Notify::new());
    let transport = GatedTransport {
        calls: calls.clone(),
        gate: gate.clone(),
    };
    let coordinator = SubmissionCoordinator::new(wizard, transport);

    let (outcome, ()) = tokio::join!(coordinator.submit(), async {
        coordinator.lock().close();
        gate.notify_one();
    });

    assert_eq!(outcome.unwrap(), SubmitOutcome::Discarded);
    let wizard = coordinator.lock();
    assert!(!wizard.is_open());
    assert!(wizard.confirmation().is_none());
}

#[tokio::test]
async fn submit_from_package_step_is_a_contract_error() {
    let mut wizard = Wizard::new();
    wizard.open(Some("santa-express-weekend"));
    let coordinator =
        SubmissionCoordinator::new(Arc::new(Mutex::new(wizard)), ScriptedTransport::default());

    let err = coordinator.submit().await.unwrap_err();
    assert_eq!(
        err,
        WizardError::NotOnContactStep {
            state: "Step2".to_string()
        }
    );
    assert_eq!(coordinator.transport().calls(), 0);
}
