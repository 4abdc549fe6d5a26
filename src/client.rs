//! Core backend trait and error types.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use thiserror::Error;

use crate::model::{SearchRequest, StreamEvent};
use crate::stream::{drain, EventSink};

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Backend returned HTTP {status}: {body}")]
    Backend {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Unauthorized: {detail}")]
    Unauthorized { detail: String },

    #[error("Stream cancelled")]
    StreamCancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Details the backend sends with a 401 when the session itself is bad,
/// as opposed to a valid session without access to the resource.
const SESSION_REJECTED: [&str; 2] = ["Not authenticated", "Invalid authentication credentials"];

impl ClientError {
    /// Whether the session is missing or expired and the user must sign in
    /// again.
    pub fn requires_sign_in(&self) -> bool {
        match self {
            ClientError::Unauthorized { detail } => SESSION_REJECTED.contains(&detail.as_str()),
            _ => false,
        }
    }

    /// HTTP status of a rejected request, if the backend answered.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            ClientError::Backend { status, .. } => Some(*status),
            ClientError::Unauthorized { .. } => Some(reqwest::StatusCode::UNAUTHORIZED),
            ClientError::Http(error) => error.status(),
            _ => None,
        }
    }
}

/// Boxed stream of decoded search events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, ClientError>> + Send>>;

/// A backend that can run streaming searches.
///
/// [`BackendClient`](crate::backend::BackendClient) talks to the real HTTP
/// API. Tests substitute their own implementation to feed canned streams.
///
/// # Example
/// ```rust,ignore
/// struct Canned(Vec<StreamEvent>);
///
/// #[async_trait]
/// impl SearchBackend for Canned {
///     async fn open_search(&self, _request: &SearchRequest) -> Result<EventStream, ClientError> {
///         Ok(Box::pin(futures::stream::iter(self.0.clone().into_iter().map(Ok))))
///     }
/// }
/// ```
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Start a search and return its event stream.
    ///
    /// Fails before any event is produced when the request is invalid or the
    /// backend rejects it.
    async fn open_search(&self, request: &SearchRequest) -> Result<EventStream, ClientError>;

    /// Run a search, delivering every event to `sink` in arrival order.
    ///
    /// Returns the number of events delivered. A transport failure mid-stream
    /// is returned as an error after the events that preceded it.
    async fn search(
        &self,
        request: &SearchRequest,
        sink: &mut (dyn EventSink + Send),
    ) -> Result<usize, ClientError> {
        let events = self.open_search(request).await?;
        drain(events, sink).await
    }
}
