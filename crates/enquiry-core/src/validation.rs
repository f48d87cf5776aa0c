//! Per-step validation rules.
//!
//! Pure functions of the step and the current [`FormData`]: every applicable
//! rule runs and the failures are merged into one [`ErrorMap`].

use crate::form::{ErrorMap, Field, FormData};
use crate::steps::WizardStep;
use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_ADULTS: u8 = 6;
pub const MAX_CHILDREN: u8 = 6;

pub const MSG_DEPARTURE_REQUIRED: &str = "Please select a departure date";
pub const MSG_ADULT_REQUIRED: &str = "At least 1 adult is required";
pub const MSG_TOO_MANY_ADULTS: &str = "A maximum of 6 adults can be booked online";
pub const MSG_TOO_MANY_CHILDREN: &str = "A maximum of 6 children can be booked online";
pub const MSG_PACKAGE_REQUIRED: &str = "Please select a package";
pub const MSG_FIRST_NAME_REQUIRED: &str = "First name is required";
pub const MSG_LAST_NAME_REQUIRED: &str = "Last name is required";
pub const MSG_EMAIL_REQUIRED: &str = "Email is required";
pub const MSG_EMAIL_INVALID: &str = "Please enter a valid email";
pub const MSG_PHONE_REQUIRED: &str = "Phone number is required";

// local@domain.tld, no whitespace or extra '@' anywhere
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Errors for a single step. An empty map means the step may be left.
pub fn validate(step: WizardStep, data: &FormData) -> ErrorMap {
    let mut errors = ErrorMap::new();
    match step {
        WizardStep::DatesAndGuests => dates_and_guests(data, &mut errors),
        WizardStep::Package => package(data, &mut errors),
        WizardStep::Contact => contact(data, &mut errors),
    }
    errors
}

/// Errors for every step up to and including `step`.
pub fn validate_through(step: WizardStep, data: &FormData) -> ErrorMap {
    WizardStep::all()
        .iter()
        .filter(|s| **s <= step)
        .flat_map(|s| validate(*s, data))
        .collect()
}

/// First step (in order) whose rules fail, with that step's errors.
pub fn first_invalid_step(up_to: WizardStep, data: &FormData) -> Option<(WizardStep, ErrorMap)> {
    WizardStep::all()
        .iter()
        .filter(|s| **s <= up_to)
        .map(|s| (*s, validate(*s, data)))
        .find(|(_, errors)| !errors.is_empty())
}

fn dates_and_guests(data: &FormData, errors: &mut ErrorMap) {
    if data.departure_date.is_none() {
        errors.insert(Field::DepartureDate, MSG_DEPARTURE_REQUIRED.to_string());
    }
    if data.adults < 1 {
        errors.insert(Field::Adults, MSG_ADULT_REQUIRED.to_string());
    } else if data.adults > MAX_ADULTS {
        errors.insert(Field::Adults, MSG_TOO_MANY_ADULTS.to_string());
    }
    if data.children > MAX_CHILDREN {
        errors.insert(Field::Children, MSG_TOO_MANY_CHILDREN.to_string());
    }
}

fn package(data: &FormData, errors: &mut ErrorMap) {
    if data.selected_package.is_empty() {
        errors.insert(Field::SelectedPackage, MSG_PACKAGE_REQUIRED.to_string());
    }
}

fn contact(data: &FormData, errors: &mut ErrorMap) {
    require_text(errors, Field::FirstName, &data.first_name, MSG_FIRST_NAME_REQUIRED);
    require_text(errors, Field::LastName, &data.last_name, MSG_LAST_NAME_REQUIRED);
    if data.email.trim().is_empty() {
        errors.insert(Field::Email, MSG_EMAIL_REQUIRED.to_string());
    } else if !is_valid_email(&data.email) {
        errors.insert(Field::Email, MSG_EMAIL_INVALID.to_string());
    }
    require_text(errors, Field::Phone, &data.phone, MSG_PHONE_REQUIRED);
}

fn require_text(errors: &mut ErrorMap, field: Field, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(field, message.to_string());
    }
}
