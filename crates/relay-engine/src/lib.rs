//! Run orchestration: submit a message, wait for the run, extract the reply.
//!
//! One call to [`Orchestrator::run`] owns exactly one thread/run pair on the
//! remote service. The wait is a polling loop with exponential backoff under
//! an overall deadline; polls that fail transiently are retried a bounded
//! number of times before the error surfaces.

use std::sync::Arc;
use std::time::Duration;

use relay_client::AgentsApi;
use relay_core::{RelayError, Run, RunStatus, ThreadMessage};
use tokio::time::Instant;
use tracing::{info, warn};

// Consecutive get-run failures tolerated before giving up on the run.
const MAX_POLL_FAILURES: u32 = 3;

/// Tuning for the status poll loop.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Overall deadline for the run to reach a terminal status.
    pub run_timeout: Duration,
    /// Delay before the first status poll; doubles on each subsequent poll.
    pub initial_interval: Duration,
    /// Upper bound for the poll delay.
    pub max_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            run_timeout: Duration::from_secs(120),
            initial_interval: Duration::from_millis(250),
            max_interval: Duration::from_secs(4),
        }
    }
}

/// Drives one agent run per inbound chat message.
pub struct Orchestrator {
    agents: Arc<dyn AgentsApi>,
    policy: PollPolicy,
}

impl Orchestrator {
    pub fn new(agents: Arc<dyn AgentsApi>, policy: PollPolicy) -> Self {
        Self { agents, policy }
    }

    /// Relays one message: creates a thread and run, waits for completion,
    /// and returns the agent's reply text.
    ///
    /// Returns an empty string when the completed run produced no text
    /// reply. Dropping the returned future stops all further polling.
    pub async fn run(&self, message: &str) -> Result<String, RelayError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(RelayError::InvalidRequest("message must not be empty".into()));
        }

        let started = Instant::now();
        let run = self.agents.create_thread_and_run(message).await?;
        let thread_id = run.thread_id.clone();
        info!(thread_id = %thread_id, run_id = %run.id, "agent run started");

        let status = self.wait_for_terminal(run).await?;
        if status != RunStatus::Completed {
            warn!(thread_id = %thread_id, %status, "agent run did not complete");
            return Err(RelayError::RunFailed { status });
        }

        let messages = self.agents.list_messages(&thread_id).await?;
        let reply = extract_reply(&messages);
        info!(
            thread_id = %thread_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            reply_chars = reply.len(),
            "agent run completed"
        );
        Ok(reply)
    }

    /// Polls the run until it reaches a terminal status or the deadline
    /// passes.
    async fn wait_for_terminal(&self, run: Run) -> Result<RunStatus, RelayError> {
        let deadline = Instant::now() + self.policy.run_timeout;
        let mut interval = self.policy.initial_interval;
        let mut failures = 0u32;
        let mut status = run.status;

        while !status.is_terminal() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(RelayError::RunTimeout {
                    waited_secs: self.policy.run_timeout.as_secs(),
                });
            }

            tokio::time::sleep(interval.min(remaining)).await;
            interval = (interval * 2).min(self.policy.max_interval);

            match self.agents.get_run(&run.thread_id, &run.id).await {
                Ok(current) => {
                    failures = 0;
                    status = current.status;
                }
                Err(err @ RelayError::Upstream(_)) => {
                    failures += 1;
                    if failures >= MAX_POLL_FAILURES {
                        return Err(err);
                    }
                    warn!(run_id = %run.id, failures, "status poll failed, retrying: {err}");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(status)
    }
}

/// Reply text of the newest message: its first content part if that part is
/// text, otherwise empty. An empty message list is not an error.
fn extract_reply(messages: &[ThreadMessage]) -> String {
    messages
        .first()
        .and_then(|m| m.content.first())
        .and_then(|part| part.as_text())
        .unwrap_or_default()
        .to_string()
}
