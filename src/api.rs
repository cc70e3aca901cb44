use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Ack, Event, EventDraft, EventId, EventPatch};

/// Every variant carries a message fit to show a user as-is.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    Fetch(String),
    #[error("{0}")]
    Create(String),
    #[error("{0}")]
    Update(String),
    #[error("{0}")]
    Delete(String),
}

impl ApiError {
    pub fn message(&self) -> &str {
        match self {
            ApiError::Fetch(msg)
            | ApiError::Create(msg)
            | ApiError::Update(msg)
            | ApiError::Delete(msg) => msg,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn fallback(self) -> &'static str {
        match self {
            Operation::Fetch => "Failed to fetch events",
            Operation::Create => "Failed to create event",
            Operation::Update => "Failed to update event",
            Operation::Delete => "Failed to delete event",
        }
    }

    fn error(self, message: impl Into<String>) -> ApiError {
        let message = message.into();
        match self {
            Operation::Fetch => ApiError::Fetch(message),
            Operation::Create => ApiError::Create(message),
            Operation::Update => ApiError::Update(message),
            Operation::Delete => ApiError::Delete(message),
        }
    }

    fn failed(self) -> ApiError {
        self.error(self.fallback())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// The event backend as the dashboard sees it.
#[async_trait]
pub trait EventBackend: Send + Sync {
    async fn list_events(&self) -> Result<Vec<Event>, ApiError>;
    async fn create_event(&self, draft: &EventDraft) -> Result<Event, ApiError>;
    async fn update_event(&self, id: &EventId, patch: &EventPatch) -> Result<Event, ApiError>;
    async fn delete_event(&self, id: &EventId) -> Result<Ack, ApiError>;
}

/// Thin HTTP client for the event backend. No retries; failures always reach
/// the caller.
#[derive(Clone, Debug)]
pub struct EventApi {
    base_url: String,
    client: Client,
}

impl EventApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, op: Operation) -> Result<Url, ApiError> {
        Url::parse(&format!("{}{}", self.base_url, path)).map_err(|err| {
            warn!(base_url = %self.base_url, "invalid event api url: {err}");
            op.failed()
        })
    }

    fn event_url(&self, id: &EventId, op: Operation) -> Result<Url, ApiError> {
        let mut url = self.url("/api/events", op)?;
        url.path_segments_mut()
            .map_err(|_| op.failed())?
            .push(id.as_str());
        Ok(url)
    }
}

#[async_trait]
impl EventBackend for EventApi {
    async fn list_events(&self) -> Result<Vec<Event>, ApiError> {
        let op = Operation::Fetch;
        let url = self.url("/api/getevents", op)?;
        debug!(%url, "fetching events");
        let response = self.client.get(url).send().await;
        let events: Vec<Event> = read_json(op, response).await?;
        debug!(count = events.len(), "fetched events");
        Ok(events)
    }

    async fn create_event(&self, draft: &EventDraft) -> Result<Event, ApiError> {
        let op = Operation::Create;
        let url = self.url("/api/events", op)?;
        debug!(event_name = %draft.event_name, "creating event");
        let response = self.client.post(url).json(&draft.payload()).send().await;
        read_json(op, response).await
    }

    async fn update_event(&self, id: &EventId, patch: &EventPatch) -> Result<Event, ApiError> {
        let op = Operation::Update;
        let url = self.event_url(id, op)?;
        debug!(%id, "updating event");
        let response = self.client.put(url).json(patch).send().await;
        read_json(op, response).await
    }

    async fn delete_event(&self, id: &EventId) -> Result<Ack, ApiError> {
        let op = Operation::Delete;
        let url = self.event_url(id, op)?;
        debug!(%id, "deleting event");
        let response = self.client.delete(url).send().await;
        let body = read_body(op, response).await?;
        if body.trim().is_empty() {
            return Ok(Ack::default());
        }
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }
}

async fn read_body(
    op: Operation,
    response: Result<Response, reqwest::Error>,
) -> Result<String, ApiError> {
    let response = response.map_err(|err| {
        warn!(?op, "event api request failed: {err}");
        op.failed()
    })?;
    let status = response.status();
    let body = response.text().await.map_err(|err| {
        warn!(?op, %status, "event api body read failed: {err}");
        op.failed()
    })?;

    if !status.is_success() {
        warn!(?op, %status, "event api error: {body}");
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|parsed| parsed.message)
            .filter(|msg| !msg.trim().is_empty());
        return Err(match message {
            Some(msg) => op.error(msg),
            None => op.failed(),
        });
    }

    Ok(body)
}

async fn read_json<T: DeserializeOwned>(
    op: Operation,
    response: Result<Response, reqwest::Error>,
) -> Result<T, ApiError> {
    let body = read_body(op, response).await?;
    serde_json::from_str(&body).map_err(|err| {
        warn!(?op, "event api payload did not match schema: {err}");
        op.failed()
    })
}
