//! HTTP client for the hosted agent service.
//!
//! [`AgentsApi`] is the seam the orchestrator calls through; [`AgentsClient`]
//! implements it against the Azure AI Agents REST protocol. Authentication is
//! ambient: [`TokenProvider`] resolves a bearer token from the hosting
//! environment's workload identity, so no other crate handles credentials.

mod agents;
mod credentials;

pub use agents::AgentsClient;
pub use credentials::TokenProvider;

use async_trait::async_trait;
use relay_core::{RelayError, Run, ThreadMessage};

/// Operations the agent service exposes to the relay.
///
/// One conversation thread plus one run are created per call to
/// [`create_thread_and_run`](Self::create_thread_and_run); the pair is
/// observed by polling [`get_run`](Self::get_run) and harvested with
/// [`list_messages`](Self::list_messages), which returns messages
/// newest-first.
#[async_trait]
pub trait AgentsApi: Send + Sync {
    /// Creates a new thread seeded with one user message and starts a run
    /// of the configured agent against it.
    async fn create_thread_and_run(&self, message: &str) -> Result<Run, RelayError>;

    /// Fetches the current state of a run.
    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run, RelayError>;

    /// Lists the thread's messages, newest first.
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, RelayError>;
}
