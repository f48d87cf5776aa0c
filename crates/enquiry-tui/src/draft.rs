//! Non-interactive enquiries from a TOML draft file.
//!
//! A draft uses the wire field names, for example:
//!
//! ```toml
//! departureDate = "2025-12-10"
//! adults = 2
//! selectedPackage = "magical-family-escape"
//! firstName = "Olivia"
//! lastName = "Hart"
//! email = "olivia.hart@example.co.uk"
//! phone = "07700 900123"
//! ```
//!
//! Dates are quoted `YYYY-MM-DD` strings.

use anyhow::{Context, Result};
use enquiry_core::{
    Advance, Confirmation, EnquiryTransport, FormSeed, SubmissionCoordinator, SubmitOutcome,
    WizardState, WizardStep, SUBMISSION_FAILED_MESSAGE,
};
use log::{info, warn};
use std::fmt;
use std::path::Path;

pub fn load_draft(path: &Path) -> Result<FormSeed> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read draft {}", path.display()))?;
    parse_draft(&contents).with_context(|| format!("Invalid draft {}", path.display()))
}

pub fn parse_draft(contents: &str) -> Result<FormSeed> {
    Ok(toml::from_str(contents)?)
}

/// What happened to a drafted enquiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftReport {
    Sent(Confirmation),
    /// The draft stopped at a step; each entry is `(label, message)`.
    Invalid {
        step: WizardStep,
        errors: Vec<(String, String)>,
    },
    Failed,
}

impl DraftReport {
    pub fn is_sent(&self) -> bool {
        matches!(self, DraftReport::Sent(_))
    }
}

impl fmt::Display for DraftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftReport::Sent(confirmation) => write!(
                f,
                "Thank You, {}! A confirmation will follow at {}.",
                confirmation.first_name, confirmation.email
            ),
            DraftReport::Invalid { step, errors } => {
                write!(f, "Step {} ({}) needs attention:", step.number(), step.title())?;
                for (label, message) in errors {
                    write!(f, "\n  {}: {}", label, message)?;
                }
                Ok(())
            }
            DraftReport::Failed => write!(f, "{}", SUBMISSION_FAILED_MESSAGE),
        }
    }
}

/// Open the wizard from `seed`, walk it to the contact step and submit.
///
/// The wizard is closed again before returning.
pub async fn submit_draft<T: EnquiryTransport>(
    coordinator: &SubmissionCoordinator<T>,
    seed: FormSeed,
) -> Result<DraftReport> {
    let walked = {
        let mut wizard = coordinator.lock();
        wizard.open_seeded(seed);
        walk_to_contact(&mut wizard)?
    };
    if let Some(report) = walked {
        coordinator.lock().close();
        return Ok(report);
    }

    let outcome = coordinator.submit().await?;
    let mut wizard = coordinator.lock();
    let report = match outcome {
        SubmitOutcome::Submitted => match wizard.confirmation() {
            Some(confirmation) => DraftReport::Sent(confirmation.clone()),
            None => DraftReport::Failed,
        },
        SubmitOutcome::Invalid(step) => invalid_report(&wizard, step),
        SubmitOutcome::Failed | SubmitOutcome::AlreadyInFlight | SubmitOutcome::Discarded => {
            warn!("Drafted enquiry was not sent: {:?}", outcome);
            DraftReport::Failed
        }
    };
    wizard.close();
    info!("Draft submission finished, sent = {}", report.is_sent());
    Ok(report)
}

fn walk_to_contact(wizard: &mut enquiry_core::Wizard) -> Result<Option<DraftReport>> {
    loop {
        match wizard.state() {
            Some(WizardState::Step3) => return Ok(None),
            Some(_) => {}
            None => anyhow::bail!("Wizard closed while walking the draft"),
        }
        if wizard.next()? == Advance::Blocked {
            let step = wizard
                .step()
                .unwrap_or(WizardStep::DatesAndGuests);
            return Ok(Some(invalid_report(wizard, step)));
        }
    }
}

fn invalid_report(wizard: &enquiry_core::Wizard, step: WizardStep) -> DraftReport {
    let errors = wizard
        .errors()
        .map(|errors| {
            errors
                .iter()
                .map(|(field, message)| (
                        field.label().trim_end_matches(" *").to_string(),
                        message.clone(),
                    ))
                .collect()
        })
        .unwrap_or_default();
    DraftReport::Invalid { step, errors }
}
