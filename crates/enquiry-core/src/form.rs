//! The enquiry record and the store that owns it.
//!
//! Every edit goes through [`FormStore::update`], which also drops the edited
//! field's error entry. Errors only come back on the next validation pass.

use chrono::NaiveDate;
use enquiry_error::{WizardError, WizardResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_ADULTS: u8 = 2;
pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

/// Field name to human-readable message. A missing key means "no known error".
pub type ErrorMap = BTreeMap<Field, String>;

/// The record assembled across the three steps. Serializes to the body
/// expected by `POST /api/enquiries`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub adults: u8,
    pub children: u8,
    pub child_ages: String,
    pub selected_package: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub newsletter: bool,
}

impl Default for FormData {
    fn default() -> Self {
        Self {
            departure_date: None,
            return_date: None,
            adults: DEFAULT_ADULTS,
            children: 0,
            child_ages: String::new(),
            selected_package: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            message: String::new(),
            newsletter: false,
        }
    }
}

impl FormData {
    pub fn get(&self, field: Field) -> FieldValue {
        match field {
            Field::DepartureDate => FieldValue::Date(self.departure_date),
            Field::ReturnDate => FieldValue::Date(self.return_date),
            Field::Adults => FieldValue::Count(self.adults),
            Field::Children => FieldValue::Count(self.children),
            Field::ChildAges => FieldValue::Text(self.child_ages.clone()),
            Field::SelectedPackage => FieldValue::Text(self.selected_package.clone()),
            Field::FirstName => FieldValue::Text(self.first_name.clone()),
            Field::LastName => FieldValue::Text(self.last_name.clone()),
            Field::Email => FieldValue::Text(self.email.clone()),
            Field::Phone => FieldValue::Text(self.phone.clone()),
            Field::Message => FieldValue::Text(self.message.clone()),
            Field::Newsletter => FieldValue::Flag(self.newsletter),
        }
    }

    fn set(&mut self, field: Field, value: FieldValue) -> WizardResult<()> {
        let mismatch = || WizardError::FieldTypeMismatch {
            field: field.wire_name(),
            expected: field.kind().name(),
        };
        match (field, value) {
            (Field::DepartureDate, FieldValue::Date(d)) => self.departure_date = d,
            (Field::ReturnDate, FieldValue::Date(d)) => self.return_date = d,
            (Field::Adults, FieldValue::Count(n)) => self.adults = n,
            (Field::Children, FieldValue::Count(n)) => self.children = n,
            (Field::ChildAges, FieldValue::Text(s)) => self.child_ages = s,
            (Field::SelectedPackage, FieldValue::Text(s)) => self.selected_package = s,
            (Field::FirstName, FieldValue::Text(s)) => self.first_name = s,
            (Field::LastName, FieldValue::Text(s)) => self.last_name = s,
            (Field::Email, FieldValue::Text(s)) => self.email = s,
            (Field::Phone, FieldValue::Text(s)) => self.phone = s,
            (Field::Message, FieldValue::Text(s)) => self.message = s,
            (Field::Newsletter, FieldValue::Flag(b)) => self.newsletter = b,
            _ => return Err(mismatch()),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Date,
    Count,
    Text,
    Flag,
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Date => "date",
            FieldKind::Count => "count",
            FieldKind::Text => "text",
            FieldKind::Flag => "flag",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    DepartureDate,
    ReturnDate,
    Adults,
    Children,
    ChildAges,
    SelectedPackage,
    FirstName,
    LastName,
    Email,
    Phone,
    Message,
    Newsletter,
}

impl Field {
    pub fn all() -> &'static [Field] {
        &[
            Field::DepartureDate,
            Field::ReturnDate,
            Field::Adults,
            Field::Children,
            Field::ChildAges,
            Field::SelectedPackage,
            Field::FirstName,
            Field::LastName,
            Field::Email,
            Field::Phone,
            Field::Message,
            Field::Newsletter,
        ]
    }

    /// Key used in the JSON payload and in seed files.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Field::DepartureDate => "departureDate",
            Field::ReturnDate => "returnDate",
            Field::Adults => "adults",
            Field::Children => "children",
            Field::ChildAges => "childAges",
            Field::SelectedPackage => "selectedPackage",
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Message => "message",
            Field::Newsletter => "newsletter",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::DepartureDate => "Preferred Departure Date *",
            Field::ReturnDate => "Preferred Return Date",
            Field::Adults => "Adults *",
            Field::Children => "Children (0-17)",
            Field::ChildAges => "Children's Ages",
            Field::SelectedPackage => "Package *",
            Field::FirstName => "First Name *",
            Field::LastName => "Last Name *",
            Field::Email => "Email Address *",
            Field::Phone => "Phone Number *",
            Field::Message => "Message",
            Field::Newsletter => "Keep me updated with offers",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::DepartureDate | Field::ReturnDate => FieldKind::Date,
            Field::Adults | Field::Children => FieldKind::Count,
            Field::Newsletter => FieldKind::Flag,
            _ => FieldKind::Text,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Field {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::all()
            .iter()
            .copied()
            .find(|field| field.wire_name() == s)
            .ok_or_else(|| WizardError::UnknownField(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Date(Option<NaiveDate>),
    Count(u8),
    Text(String),
    Flag(bool),
}

impl FieldValue {
    /// Text shown in an input box for this value.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Date(Some(d)) => d.format(DATE_INPUT_FORMAT).to_string(),
            FieldValue::Date(None) => String::new(),
            FieldValue::Count(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Flag(true) => "yes".to_string(),
            FieldValue::Flag(false) => "no".to_string(),
        }
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(Some(value))
    }
}

impl From<Option<NaiveDate>> for FieldValue {
    fn from(value: Option<NaiveDate>) -> Self {
        FieldValue::Date(value)
    }
}

impl From<u8> for FieldValue {
    fn from(value: u8) -> Self {
        FieldValue::Count(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

/// Partial [`FormData`]: any key present overrides the default on reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FormSeed {
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub adults: Option<u8>,
    pub children: Option<u8>,
    pub child_ages: Option<String>,
    pub selected_package: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub newsletter: Option<bool>,
}

impl FormSeed {
    pub fn with_package(package_id: impl Into<String>) -> Self {
        Self {
            selected_package: Some(package_id.into()),
            ..Default::default()
        }
    }

    /// A seeded package only counts when it is non-empty.
    pub fn has_package(&self) -> bool {
        self.selected_package
            .as_deref()
            .is_some_and(|id| !id.is_empty())
    }

    fn apply(self, base: FormData) -> FormData {
        FormData {
            departure_date: self.departure_date.or(base.departure_date),
            return_date: self.return_date.or(base.return_date),
            adults: self.adults.unwrap_or(base.adults),
            children: self.children.unwrap_or(base.children),
            child_ages: self.child_ages.unwrap_or(base.child_ages),
            selected_package: self.selected_package.unwrap_or(base.selected_package),
            first_name: self.first_name.unwrap_or(base.first_name),
            last_name: self.last_name.unwrap_or(base.last_name),
            email: self.email.unwrap_or(base.email),
            phone: self.phone.unwrap_or(base.phone),
            message: self.message.unwrap_or(base.message),
            newsletter: self.newsletter.unwrap_or(base.newsletter),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormStore {
    data: FormData,
    errors: ErrorMap,
}

impl FormStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace one field's value and forget any error previously shown for it.
    pub fn update(&mut self, field: Field, value: impl Into<FieldValue>) -> WizardResult<()> {
        self.data.set(field, value.into())?;
        if self.errors.remove(&field).is_some() {
            debug!("Cleared error for {} after edit", field);
        }
        Ok(())
    }

    /// Parse raw text from an input control, then [`update`](Self::update).
    /// On a parse failure the store is untouched.
    pub fn update_from_input(&mut self, field: Field, raw: &str) -> WizardResult<()> {
        let value = parse_input(field, raw)?;
        self.update(field, value)
    }

    pub fn reset(&mut self, seed: FormSeed) {
        self.data = seed.apply(FormData::default());
        self.errors.clear();
    }

    pub fn snapshot(&self) -> FormData {
        self.data.clone()
    }

    pub fn data(&self) -> &FormData {
        &self.data
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Install the outcome of a validation pass, replacing what was shown before.
    pub(crate) fn set_errors(&mut self, errors: ErrorMap) {
        self.errors = errors;
    }
}

fn parse_input(field: Field, raw: &str) -> WizardResult<FieldValue> {
    let invalid = |reason: String| WizardError::InvalidInput {
        field: field.wire_name(),
        reason,
    };
    let trimmed = raw.trim();
    match field.kind() {
        FieldKind::Date if trimmed.is_empty() => Ok(FieldValue::Date(None)),
        FieldKind::Date => NaiveDate::parse_from_str(trimmed, DATE_INPUT_FORMAT)
            .map(FieldValue::from)
            .map_err(|e| invalid(format!("expected YYYY-MM-DD ({e})"))),
        FieldKind::Count => trimmed
            .parse::<u8>()
            .map(FieldValue::Count)
            .map_err(|e| invalid(e.to_string())),
        FieldKind::Flag => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Ok(FieldValue::Flag(true)),
            "false" | "no" | "n" | "0" | "" => Ok(FieldValue::Flag(false)),
            other => Err(invalid(format!("expected yes or no, got {other:?}"))),
        },
        FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_INPUT_FORMAT).unwrap()
    }

    #[test]
    fn defaults_match_a_fresh_enquiry() {
        let data = FormStore::new().snapshot();
        assert_eq!(data.adults, 2);
        assert_eq!(data.children, 0);
        assert!(data.departure_date.is_none());
        assert!(data.selected_package.is_empty());
        assert!(!data.newsletter);
    }

    #[test]
    fn update_clears_error_even_for_invalid_value() {
        let mut store = FormStore::new();
        let mut errors = ErrorMap::new();
        errors.insert(Field::Email, "Please enter a valid email".to_string());
        errors.insert(Field::Phone, "Phone number is required".to_string());
        store.set_errors(errors);

        store.update(Field::Email, "still-not-an-email").unwrap();

        assert!(store.error(Field::Email).is_none());
        assert_eq!(store.error(Field::Phone), Some("Phone number is required"));
    }

    #[test]
    fn update_rejects_wrong_kind() {
        let mut store = FormStore::new();
        let err = store.update(Field::Adults, "three").unwrap_err();
        assert_eq!(
            err,
            WizardError::FieldTypeMismatch {
                field: "adults",
                expected: "count"
            }
        );
        assert_eq!(store.data().adults, 2);
    }

    #[test]
    fn last_write_wins() {
        let mut store = FormStore::new();
        store.update(Field::FirstName, "Ann").unwrap();
        store.update(Field::FirstName, "Anna").unwrap();
        store.update(Field::Children, 3u8).unwrap();
        let data = store.snapshot();
        assert_eq!(data.first_name, "Anna");
        assert_eq!(data.children, 3);
    }

    #[test]
    fn reset_applies_seed_over_defaults_and_clears_errors() {
        let mut store = FormStore::new();
        store.update(Field::Email, "old@example.com").unwrap();
        let mut errors = ErrorMap::new();
        errors.insert(Field::FirstName, "First name is required".to_string());
        store.set_errors(errors);

        store.reset(FormSeed {
            selected_package: Some("santa-express-weekend".to_string()),
            adults: Some(4),
            ..Default::default()
        });

        let expected = FormData {
            selected_package: "santa-express-weekend".to_string(),
            adults: 4,
            ..FormData::default()
        };
        assert_eq!(store.snapshot(), expected);
        assert!(store.errors().is_empty());
    }

    #[test]
    fn input_parsing_per_kind() {
        let mut store = FormStore::new();
        store
            .update_from_input(Field::DepartureDate, " 2025-12-10 ")
            .unwrap();
        store.update_from_input(Field::Adults, "3").unwrap();
        store.update_from_input(Field::Newsletter, "Yes").unwrap();
        store.update_from_input(Field::Message, "  keep spacing ").unwrap();

        let data = store.snapshot();
        assert_eq!(data.departure_date, Some(date("2025-12-10")));
        assert_eq!(data.adults, 3);
        assert!(data.newsletter);
        assert_eq!(data.message, "  keep spacing ");

        store.update_from_input(Field::DepartureDate, "").unwrap();
        assert!(store.data().departure_date.is_none());
    }

    #[test]
    fn bad_input_leaves_store_untouched() {
        let mut store = FormStore::new();
        store.update(Field::ReturnDate, date("2026-01-04")).unwrap();
        let err = store
            .update_from_input(Field::ReturnDate, "04/01/2026")
            .unwrap_err();
        assert!(matches!(err, WizardError::InvalidInput { field: "returnDate", .. }));
        assert_eq!(store.data().return_date, Some(date("2026-01-04")));
    }

    #[test]
    fn payload_uses_camel_case_and_iso_dates() {
        let mut store = FormStore::new();
        store.update(Field::DepartureDate, date("2025-12-10")).unwrap();
        let json = serde_json::to_value(store.snapshot()).unwrap();
        assert_eq!(json["departureDate"], "2025-12-10");
        assert!(json["returnDate"].is_null());
        assert_eq!(json["adults"], 2);
        assert_eq!(json["newsletter"], false);
        assert_eq!(json["selectedPackage"], "");
    }

    #[test]
    fn field_names_round_trip_through_from_str() {
        for field in Field::all() {
            assert_eq!(field.wire_name().parse::<Field>().unwrap(), *field);
        }
        assert!("surname".parse::<Field>().is_err());
    }
}
