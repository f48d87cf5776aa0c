//! Booking enquiry wizard core.
//!
//! `enquiry-core` holds the form store, the per-step validation rules, the
//! step state machine and the submission coordinator used by the terminal
//! front end (and any other shell that wants to embed the wizard).

pub mod catalogue;
pub mod config;
pub mod form;
pub mod logging;
pub mod steps;
pub mod submission;
pub mod validation;
pub mod wizard;

pub use catalogue::{PackageCatalogue, PackageOption, PackageSummary, CUSTOM_PACKAGE_ID};
pub use config::EnquiryConfig;
pub use enquiry_error::{
    ConfigError, SubmissionError, SubmissionResult, WizardError, WizardResult,
};
pub use form::{ErrorMap, Field, FieldValue, FormData, FormSeed, FormStore};
pub use steps::{WizardState, WizardStep};
pub use submission::{EnquiryTransport, HttpTransport, SubmissionCoordinator, SubmitOutcome};
pub use wizard::{Advance, Confirmation, Wizard, SUBMISSION_FAILED_MESSAGE};
