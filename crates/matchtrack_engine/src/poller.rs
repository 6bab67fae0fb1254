use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use matchtrack_core::{JobId, Msg};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use track_logging::{track_debug, track_trace};

use crate::MatchService;

/// Schedules one status query at a time per job, each bound to the job's
/// cancellation token.
///
/// A cancelled job never delivers another observation: the token is checked
/// before the delay, before the request and before the result is sent.
#[derive(Debug, Default)]
pub struct PollScheduler {
    tokens: HashMap<JobId, CancellationToken>,
}

impl PollScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queries `job_id` once after `delay` and reports the result on `tx`.
    pub fn schedule(
        &mut self,
        job_id: JobId,
        delay: Duration,
        service: Arc<dyn MatchService>,
        tx: mpsc::UnboundedSender<Msg>,
    ) {
        let token = self
            .tokens
            .entry(job_id.clone())
            .or_insert_with(CancellationToken::new)
            .clone();
        track_trace!("Poll for job {} scheduled in {:?}", job_id, delay);

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => return,
                result = service.status(&job_id) => result,
            };
            if token.is_cancelled() {
                track_debug!("Dropping status of cancelled job {}", job_id);
                return;
            }
            let _ = tx.send(Msg::StatusPolled {
                job_id,
                result: result.map_err(|err| err.message),
            });
        });
    }

    pub fn cancel(&mut self, job_id: &str) -> bool {
        match self.tokens.remove(job_id) {
            Some(token) => {
                token.cancel();
                track_debug!("Polling cancelled for job {}", job_id);
                true
            }
            None => false,
        }
    }

    /// Cancels every job except `active`.
    pub fn retain_only(&mut self, active: Option<&str>) {
        let stale: Vec<JobId> = self
            .tokens
            .keys()
            .filter(|job_id| Some(job_id.as_str()) != active)
            .cloned()
            .collect();
        for job_id in stale {
            self.cancel(&job_id);
        }
    }

    pub fn is_scheduled(&self, job_id: &str) -> bool {
        self.tokens.contains_key(job_id)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
