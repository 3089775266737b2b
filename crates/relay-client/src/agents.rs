//! Reqwest implementation of [`AgentsApi`] against the Azure AI Agents
//! REST protocol.

use std::time::Duration;

use async_trait::async_trait;
use relay_core::{RelayError, Run, ThreadMessage};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AgentsApi, TokenProvider};

const AGENTS_API_VERSION: &str = "2025-05-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct CreateThreadAndRunRequest<'a> {
    assistant_id: &'a str,
    thread: ThreadPayload<'a>,
}

#[derive(Serialize)]
struct ThreadPayload<'a> {
    messages: Vec<InitialMessage<'a>>,
}

#[derive(Serialize)]
struct InitialMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessageList {
    data: Vec<ThreadMessage>,
}

fn upstream(e: impl ToString) -> RelayError {
    RelayError::Upstream(e.to_string())
}

/// Client for the agent service, bound to one project endpoint and one
/// agent id for the life of the process.
pub struct AgentsClient {
    client: Client,
    endpoint: String,
    agent_id: String,
    credentials: TokenProvider,
}

impl AgentsClient {
    pub fn new(endpoint: &str, agent_id: &str, credentials: TokenProvider) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            agent_id: agent_id.to_string(),
            credentials,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T, RelayError> {
        let token = self.credentials.token().await?;

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("api-version", AGENTS_API_VERSION)])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(upstream)?;

        decode(response).await
    }
}

/// Reads the body of a non-2xx response into the error, otherwise decodes
/// the payload.
async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, RelayError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(RelayError::Upstream(format!("HTTP {status}: {body}")));
    }
    response.json().await.map_err(upstream)
}

#[async_trait]
impl AgentsApi for AgentsClient {
    async fn create_thread_and_run(&self, message: &str) -> Result<Run, RelayError> {
        let token = self.credentials.token().await?;
        let url = format!("{}/threads/runs", self.endpoint);

        let request = CreateThreadAndRunRequest {
            assistant_id: &self.agent_id,
            thread: ThreadPayload {
                messages: vec![InitialMessage { role: "user", content: message }],
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .query(&[("api-version", AGENTS_API_VERSION)])
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(upstream)?;

        let run: Run = decode(response).await?;
        debug!(thread_id = %run.thread_id, run_id = %run.id, "created thread and run");
        Ok(run)
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run, RelayError> {
        self.get_json(format!("{}/threads/{}/runs/{}", self.endpoint, thread_id, run_id))
            .await
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, RelayError> {
        let token = self.credentials.token().await?;
        let url = format!("{}/threads/{}/messages", self.endpoint, thread_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            // Newest first, so the head of the list is the run's reply.
            .query(&[("api-version", AGENTS_API_VERSION), ("order", "desc")])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(upstream)?;

        let list: MessageList = decode(response).await?;
        Ok(list.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_matches_wire_shape() {
        let request = CreateThreadAndRunRequest {
            assistant_id: "asst_1",
            thread: ThreadPayload {
                messages: vec![InitialMessage { role: "user", content: "hi" }],
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "assistant_id": "asst_1",
                "thread": {"messages": [{"role": "user", "content": "hi"}]}
            })
        );
    }

    #[test]
    fn message_list_decodes_newest_first_payload() {
        let json = r#"{
            "object": "list",
            "data": [
                {"id": "msg_2", "role": "assistant",
                 "content": [{"type": "text", "text": {"value": "4", "annotations": []}}]},
                {"id": "msg_1", "role": "user",
                 "content": [{"type": "text", "text": {"value": "What is 2+2?", "annotations": []}}]}
            ],
            "first_id": "msg_2",
            "last_id": "msg_1",
            "has_more": false
        }"#;

        let list: MessageList = serde_json::from_str(json).unwrap();
        assert_eq!(list.data.len(), 2);
        assert_eq!(list.data[0].content[0].as_text(), Some("4"));
    }
}
