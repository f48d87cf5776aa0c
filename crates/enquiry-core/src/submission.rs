//! Sending a finished enquiry and feeding the answer back into the wizard.

use crate::config::EnquiryConfig;
use crate::form::FormData;
use crate::steps::WizardStep;
use crate::wizard::{SubmitResolution, SubmitStart, Wizard};
use async_trait::async_trait;
use enquiry_error::{ConfigError, SubmissionError, SubmissionResult, WizardResult};
use log::{debug, info};
use reqwest::Client;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use url::Url;

/// The remote side of a submission. Any failure is a [`SubmissionError`].
#[async_trait]
pub trait EnquiryTransport: Send + Sync {
    async fn send(&self, enquiry: &FormData) -> SubmissionResult<()>;
}

/// JSON `POST` to the enquiry endpoint; any 2xx counts as accepted and the
/// body is not read.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    timeout_secs: Option<u64>,
}

impl HttpTransport {
    pub fn new(config: &EnquiryConfig) -> Result<Self, ConfigError> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl EnquiryTransport for HttpTransport {
    async fn send(&self, enquiry: &FormData) -> SubmissionResult<()> {
        debug!("POST {}", self.endpoint);
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(enquiry)
            .send()
            .await
            .map_err(|e| match self.timeout_secs {
                Some(secs) if e.is_timeout() => SubmissionError::timed_out(secs),
                _ => SubmissionError::new(e.to_string()),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmissionError::status(status.as_u16()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The endpoint accepted the enquiry; the wizard is at `Success`.
    Submitted,
    /// The attempt failed; the wizard is at `SubmitFailed` and may retry.
    Failed,
    /// Validation failed; the wizard shows the given step with its errors.
    Invalid(WizardStep),
    /// Rejected without a network call: another attempt is still running.
    AlreadyInFlight,
    /// The wizard was closed (or reopened) before the answer arrived.
    Discarded,
}

/// Runs submissions for one wizard, allowing at most one in flight.
///
/// The wizard lock is only held while reading or applying state, never across
/// the network round trip.
pub struct SubmissionCoordinator<T> {
    wizard: Arc<Mutex<Wizard>>,
    transport: T,
}

impl<T: EnquiryTransport> SubmissionCoordinator<T> {
    pub fn new(wizard: Arc<Mutex<Wizard>>, transport: T) -> Self {
        Self { wizard, transport }
    }

    pub fn wizard(&self) -> &Arc<Mutex<Wizard>> {
        &self.wizard
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Lock the wizard for reading or driving the non-async operations.
    pub fn lock(&self) -> MutexGuard<'_, Wizard> {
        self.wizard.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn submit(&self) -> WizardResult<SubmitOutcome> {
        let ticket = {
            let mut wizard = self.lock();
            match wizard.begin_submit()? {
                SubmitStart::Ready(ticket) => ticket,
                SubmitStart::Invalid(step) => return Ok(SubmitOutcome::Invalid(step)),
                SubmitStart::InFlight => return Ok(SubmitOutcome::AlreadyInFlight),
            }
        };

        let result = self.transport.send(ticket.payload()).await;

        let resolution = self.lock().finish_submit(ticket, result);
        let outcome = match resolution {
            SubmitResolution::Succeeded => SubmitOutcome::Submitted,
            SubmitResolution::Failed => SubmitOutcome::Failed,
            SubmitResolution::Discarded => SubmitOutcome::Discarded,
        };
        info!("Submission finished: {:?}", outcome);
        Ok(outcome)
    }
}
