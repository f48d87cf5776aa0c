//! Key handling for the enquiry wizard screen.
//!
//! `App` translates key presses into wizard operations. It never submits by
//! itself: Enter on the contact step yields [`InputResult::Submit`] and the run
//! loop hands the request to the submission coordinator.

use crate::input::TextInput;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use enquiry_core::form::FieldKind;
use enquiry_core::validation::{MAX_ADULTS, MAX_CHILDREN};
use enquiry_core::{
    Advance, Confirmation, Field, FieldValue, PackageCatalogue, PackageOption, SubmitOutcome,
    Wizard, WizardResult, WizardState, WizardStep,
};
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Result of handling input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Quit,
    /// Start a submission attempt.
    Submit,
    /// The wizard was closed (cancel, escape, or after success).
    Closed,
}

const DATES_AND_GUESTS_FIELDS: &[Field] = &[
    Field::DepartureDate,
    Field::ReturnDate,
    Field::Adults,
    Field::Children,
    Field::ChildAges,
];

const PACKAGE_FIELDS: &[Field] = &[Field::SelectedPackage];

const CONTACT_FIELDS: &[Field] = &[
    Field::FirstName,
    Field::LastName,
    Field::Email,
    Field::Phone,
    Field::Message,
    Field::Newsletter,
];

pub fn step_fields(step: WizardStep) -> &'static [Field] {
    match step {
        WizardStep::DatesAndGuests => DATES_AND_GUESTS_FIELDS,
        WizardStep::Package => PACKAGE_FIELDS,
        WizardStep::Contact => CONTACT_FIELDS,
    }
}

pub struct App {
    wizard: Arc<Mutex<Wizard>>,
    catalogue: &'static PackageCatalogue,
    options: Vec<PackageOption>,
    focus: usize,
    package_cursor: usize,
    input: TextInput,
    shown_step: Option<WizardStep>,
    pub status_message: String,
    /// Set when the wizard is closed from the success screen.
    pub completed: Option<Confirmation>,
}

impl App {
    pub fn new(wizard: Arc<Mutex<Wizard>>) -> Self {
        let catalogue = PackageCatalogue::builtin();
        let mut app = Self {
            wizard,
            catalogue,
            options: catalogue.options(),
            focus: 0,
            package_cursor: 0,
            input: TextInput::default(),
            shown_step: None,
            status_message: String::new(),
            completed: None,
        };
        app.sync_step();
        app
    }

    pub fn lock(&self) -> MutexGuard<'_, Wizard> {
        self.wizard.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn wizard(&self) -> &Arc<Mutex<Wizard>> {
        &self.wizard
    }

    pub fn catalogue(&self) -> &'static PackageCatalogue {
        self.catalogue
    }

    pub fn options(&self) -> &[PackageOption] {
        &self.options
    }

    pub fn package_cursor(&self) -> usize {
        self.package_cursor
    }

    pub fn input(&self) -> &TextInput {
        &self.input
    }

    pub fn focused_field(&self) -> Option<Field> {
        let step = self.shown_step?;
        step_fields(step).get(self.focus).copied()
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> InputResult {
        if key.kind != KeyEventKind::Press {
            return InputResult::Continue;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return InputResult::Quit;
        }

        let Some(state) = self.lock().state() else {
            return InputResult::Closed;
        };
        self.sync_step();

        match state {
            WizardState::Success => match key.code {
                KeyCode::Enter | KeyCode::Esc => self.close(),
                _ => InputResult::Continue,
            },
            WizardState::Submitting => {
                if key.code == KeyCode::Esc {
                    return self.close();
                }
                self.status_message = "Submitting your enquiry...".to_string();
                InputResult::Continue
            }
            _ => self.handle_form_key(state, key),
        }
    }

    /// Reflect a finished (or refused) submission attempt in the status line.
    pub fn apply_outcome(&mut self, outcome: WizardResult<SubmitOutcome>) {
        self.status_message = match outcome {
            Ok(SubmitOutcome::Submitted) => "Enquiry sent.".to_string(),
            Ok(SubmitOutcome::Failed) => String::new(),
            Ok(SubmitOutcome::Invalid(step)) => {
                format!("Please check the {} step.", step.title())
            }
            Ok(SubmitOutcome::AlreadyInFlight) => "Still submitting...".to_string(),
            Ok(SubmitOutcome::Discarded) => String::new(),
            Err(err) => err.to_string(),
        };
        self.sync_step();
    }

    fn handle_form_key(&mut self, state: WizardState, key: KeyEvent) -> InputResult {
        let on_package_step = state.step() == Some(WizardStep::Package);
        match key.code {
            KeyCode::Enter => self.next_or_submit(state),
            KeyCode::Esc => {
                if self.lock().can_go_back() {
                    self.go_back();
                    InputResult::Continue
                } else {
                    self.close()
                }
            }
            KeyCode::Tab => {
                self.move_focus(1);
                InputResult::Continue
            }
            KeyCode::BackTab => {
                self.move_focus(-1);
                InputResult::Continue
            }
            KeyCode::Down | KeyCode::Right if on_package_step => {
                self.move_package_cursor(1);
                InputResult::Continue
            }
            KeyCode::Up | KeyCode::Left if on_package_step => {
                self.move_package_cursor(-1);
                InputResult::Continue
            }
            KeyCode::Char(' ') if on_package_step => {
                self.select_package(self.package_cursor);
                InputResult::Continue
            }
            KeyCode::Down => {
                self.move_focus(1);
                InputResult::Continue
            }
            KeyCode::Up => {
                self.move_focus(-1);
                InputResult::Continue
            }
            _ => {
                self.edit_focused(key);
                InputResult::Continue
            }
        }
    }

    fn next_or_submit(&mut self, state: WizardState) -> InputResult {
        if state.accepts_submit() {
            self.status_message = "Submitting your enquiry...".to_string();
            return InputResult::Submit;
        }
        let result = self.lock().next();
        match result {
            Ok(Advance::Moved(_)) => self.status_message.clear(),
            Ok(Advance::Blocked) => {
                self.status_message = "Please fix the highlighted fields.".to_string()
            }
            Err(err) => self.status_message = err.to_string(),
        }
        self.sync_step();
        InputResult::Continue
    }

    fn go_back(&mut self) {
        let result = self.lock().back();
        if let Err(err) = result {
            self.status_message = err.to_string();
        }
        self.sync_step();
    }

    fn close(&mut self) -> InputResult {
        let mut wizard = self.lock();
        let confirmation = wizard.confirmation().cloned();
        wizard.close();
        drop(wizard);
        self.completed = confirmation;
        self.shown_step = None;
        InputResult::Closed
    }

    fn edit_focused(&mut self, key: KeyEvent) {
        let Some(field) = self.focused_field() else {
            return;
        };
        let result = match field.kind() {
            FieldKind::Text => {
                if !self.input.handle_key(key) {
                    return;
                }
                self.lock().update(field, self.input.value())
            }
            FieldKind::Date => {
                if !self.input.handle_key(key) {
                    return;
                }
                // A half-typed date counts as no date until it parses.
                let mut wizard = self.lock();
                match wizard.update_from_input(field, self.input.value()) {
                    Ok(()) => Ok(()),
                    Err(_) => wizard.update(field, FieldValue::Date(None)),
                }
            }
            FieldKind::Count => {
                let delta: i16 = match key.code {
                    KeyCode::Right | KeyCode::Char('+') => 1,
                    KeyCode::Left | KeyCode::Char('-') => -1,
                    _ => return,
                };
                self.adjust_count(field, delta)
            }
            FieldKind::Flag => {
                if !matches!(key.code, KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right) {
                    return;
                }
                let mut wizard = self.lock();
                let current = wizard.data().is_some_and(|d| d.newsletter);
                wizard.update(field, !current)
            }
        };
        if let Err(err) = result {
            self.status_message = err.to_string();
        }
    }

    fn adjust_count(&mut self, field: Field, delta: i16) -> WizardResult<()> {
        let (min, max): (u8, u8) = match field {
            Field::Adults => (1, MAX_ADULTS),
            _ => (0, MAX_CHILDREN),
        };
        let mut wizard = self.lock();
        let current = match wizard.data().map(|d| d.get(field)) {
            Some(FieldValue::Count(n)) => n,
            _ => return Ok(()),
        };
        let next = (i16::from(current) + delta).clamp(i16::from(min), i16::from(max));
        if next == i16::from(current) {
            return Ok(());
        }
        wizard.update(field, next as u8)
    }

    fn move_focus(&mut self, delta: isize) {
        let Some(step) = self.shown_step else {
            return;
        };
        let len = step_fields(step).len() as isize;
        self.focus = (self.focus as isize + delta).rem_euclid(len) as usize;
        self.load_input();
    }

    fn move_package_cursor(&mut self, delta: isize) {
        let len = self.options.len() as isize;
        if len == 0 {
            return;
        }
        self.package_cursor = (self.package_cursor as isize + delta).rem_euclid(len) as usize;
        self.select_package(self.package_cursor);
    }

    fn select_package(&mut self, index: usize) {
        let Some(option) = self.options.get(index) else {
            return;
        };
        let id = option.id().to_string();
        debug!("Package option {} chosen", id);
        let result = self.lock().update(Field::SelectedPackage, id);
        if let Err(err) = result {
            self.status_message = err.to_string();
        }
    }

    /// Reset focus and the edit buffer when the visible step changed.
    fn sync_step(&mut self) {
        let (step, selected) = {
            let wizard = self.lock();
            let selected = wizard
                .data()
                .map(|d| d.selected_package.clone())
                .unwrap_or_default();
            (wizard.step(), selected)
        };
        if step == self.shown_step {
            return;
        }
        self.shown_step = step;
        self.focus = 0;
        self.package_cursor = self
            .options
            .iter()
            .position(|o| o.id() == selected)
            .unwrap_or(0);
        self.load_input();
    }

    fn load_input(&mut self) {
        let Some(field) = self.focused_field() else {
            return;
        };
        let value = self
            .lock()
            .data()
            .map(|d| d.get(field).display())
            .unwrap_or_default();
        self.input.set_value(value);
    }
}
