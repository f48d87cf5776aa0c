//! Background submissions for the terminal loop.
//!
//! The draw loop is synchronous, so each submission runs on a small tokio
//! runtime and reports back over a channel. Closing the wizard never aborts a
//! request that is already on the wire: [`SubmitWorker::finish`] lets it run to
//! completion (bounded by `drain`) before the runtime goes away.

use anyhow::Result;
use enquiry_core::{EnquiryTransport, SubmissionCoordinator, SubmitOutcome, WizardResult};
use log::{info, warn};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use tokio::runtime::Runtime;

pub struct SubmitWorker<T> {
    runtime: Runtime,
    coordinator: Arc<SubmissionCoordinator<T>>,
    pending: Option<mpsc::Receiver<WizardResult<SubmitOutcome>>>,
}

impl<T> SubmitWorker<T>
where
    T: EnquiryTransport + 'static,
{
    pub fn new(coordinator: Arc<SubmissionCoordinator<T>>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;
        Ok(Self {
            runtime,
            coordinator,
            pending: None,
        })
    }

    pub fn coordinator(&self) -> &Arc<SubmissionCoordinator<T>> {
        &self.coordinator
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Spawn a submission. Returns false when one is still running.
    pub fn start(&mut self) -> bool {
        if self.pending.is_some() {
            return false;
        }
        let (tx, rx) = mpsc::channel();
        self.pending = Some(rx);
        let coordinator = Arc::clone(&self.coordinator);
        self.runtime.spawn(async move {
            let outcome = coordinator.submit().await;
            let _ = tx.send(outcome);
        });
        true
    }

    /// Non-blocking check for a finished submission.
    pub fn poll(&mut self) -> Option<WizardResult<SubmitOutcome>> {
        let rx = self.pending.as_ref()?;
        match rx.try_recv() {
            Ok(outcome) => {
                self.pending = None;
                Some(outcome)
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.pending = None;
                None
            }
        }
    }

    /// Wait up to `drain` for an in-flight submission, then stop the runtime.
    pub fn finish(self, drain: Duration) -> Option<WizardResult<SubmitOutcome>> {
        let outcome = self.pending.as_ref().and_then(|rx| {
            info!("Waiting up to {}s for the enquiry in flight", drain.as_secs());
            match rx.recv_timeout(drain) {
                Ok(outcome) => Some(outcome),
                Err(_) => {
                    warn!("Enquiry still in flight at exit; abandoning it");
                    None
                }
            }
        });
        self.runtime.shutdown_timeout(Duration::from_millis(100));
        outcome
    }
}
