use std::io;
use thiserror::Error;

pub type WizardResult<T> = Result<T, WizardError>;
pub type SubmissionResult<T> = Result<T, SubmissionError>;

/// Caller defects in how the wizard state machine is driven.
///
/// Validation failures and failed submissions are never reported through this
/// type; they are surfaced as data on the wizard itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("The wizard is not open")]
    WizardClosed,

    #[error("No step follows {state}")]
    NoNextStep { state: String },

    #[error("No step precedes {state}")]
    NoPreviousStep { state: String },

    #[error("Submit requested from {state}; submission is only possible from the contact step")]
    NotOnContactStep { state: String },

    #[error("Field {field} expects a {expected} value")]
    FieldTypeMismatch {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Unknown field: {0}")]
    UnknownField(String),
}

/// The single failure kind for an enquiry that did not reach the endpoint.
///
/// The detail is kept for logs only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Enquiry submission failed: {detail}")]
pub struct SubmissionError {
    detail: String,
}

impl SubmissionError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    pub fn status(code: u16) -> Self {
        Self::new(format!("endpoint answered with status {code}"))
    }

    pub fn timed_out(timeout_secs: u64) -> Self {
        Self::new(format!("no response after {timeout_secs}s"))
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Config parse error: {0}")]
    Parse(String),

    #[error("Invalid endpoint URL {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("HTTP client setup failed: {0}")]
    HttpClient(String),
}
