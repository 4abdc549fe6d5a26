//! Caller-side handling of a search stream.
//!
//! The decoder only produces events; what they mean for a UI (a loading
//! flag, the status log, the final result list) lives here, owned by the
//! caller and updated through an [`EventSink`].

use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::client::{ClientError, SearchBackend};
use crate::model::{Item, SearchRequest, StreamEvent};

/// Receiver for decoded events, called in arrival order.
pub trait EventSink {
    fn on_event(&mut self, event: StreamEvent);
}

impl<F> EventSink for F
where
    F: FnMut(StreamEvent),
{
    fn on_event(&mut self, event: StreamEvent) {
        self(event)
    }
}

/// Forward every event of `events` to `sink`.
///
/// Returns the number of events delivered. Stops at the first transport
/// error and returns it.
pub async fn drain<S, K>(events: S, sink: &mut K) -> Result<usize, ClientError>
where
    S: Stream<Item = Result<StreamEvent, ClientError>>,
    K: EventSink + ?Sized,
{
    futures::pin_mut!(events);

    let mut delivered = 0;
    while let Some(event) = events.next().await {
        sink.on_event(event?);
        delivered += 1;
    }
    Ok(delivered)
}

/// State of one search as a UI would track it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchProgress {
    /// Status messages in arrival order
    pub statuses: Vec<String>,

    /// Result set, once a `results` event arrived
    pub items: Option<Vec<Item>>,

    /// Last error, either reported by the backend or from the transport
    pub error: Option<String>,

    /// Whether the loading indicator should be shown
    pub loading: bool,
}

impl SearchProgress {
    /// Fresh state for a search that is starting.
    pub fn begin() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    /// Fold one event into the state.
    pub fn apply(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Status { message } => self.statuses.push(message),
            StreamEvent::Results { items } => {
                debug!(count = items.len(), "search results received");
                self.items = Some(items);
                self.loading = false;
            }
            StreamEvent::Error { message } => {
                warn!(%message, "backend reported a search error");
                self.error = Some(message);
            }
        }
    }

    /// Record a transport failure. Any results seen so far are discarded.
    pub fn fail(&mut self, error: &ClientError) {
        self.error = Some(error.to_string());
        self.items = None;
        self.loading = false;
    }

    /// Mark the stream as finished.
    pub fn finish(&mut self) {
        self.loading = false;
    }

    /// Latest status message, if any.
    pub fn latest_status(&self) -> Option<&str> {
        self.statuses.last().map(String::as_str)
    }
}

impl EventSink for SearchProgress {
    fn on_event(&mut self, event: StreamEvent) {
        self.apply(event);
    }
}

/// Run a search to completion and return its final state.
///
/// Failures are recorded in [`SearchProgress::error`] rather than returned.
pub async fn run_search<B>(backend: &B, request: &SearchRequest) -> SearchProgress
where
    B: SearchBackend + ?Sized,
{
    let mut progress = SearchProgress::begin();

    if let Err(error) = backend.search(request, &mut progress).await {
        warn!(%error, "search failed");
        progress.fail(&error);
    }

    progress.finish();
    progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::EventStream;
    use async_trait::async_trait;
    use futures::stream;
    use nonempty::nonempty;

    fn status(message: &str) -> StreamEvent {
        StreamEvent::Status {
            message: message.to_string(),
        }
    }

    fn item(title: &str) -> Item {
        Item {
            title: title.to_string(),
            ..Item::default()
        }
    }

    fn request() -> SearchRequest {
        SearchRequest::new("habit tracker", nonempty!["producthunt".to_string()])
    }

    /// Replays a fixed script of events, optionally ending in a transport error.
    struct Scripted {
        events: Vec<StreamEvent>,
        fail_at_end: bool,
    }

    #[async_trait]
    impl SearchBackend for Scripted {
        async fn open_search(&self, request: &SearchRequest) -> Result<EventStream, ClientError> {
            request.validate()?;
            let mut results: Vec<Result<StreamEvent, ClientError>> =
                self.events.iter().cloned().map(Ok).collect();
            if self.fail_at_end {
                results.push(Err(ClientError::StreamCancelled));
            }
            Ok(Box::pin(stream::iter(results)))
        }
    }

    #[tokio::test]
    async fn test_drain_into_closure_sink() {
        let events = stream::iter(vec![Ok(status("a")), Ok(status("b"))]);
        let mut seen = Vec::new();
        let mut sink = |event: StreamEvent| seen.push(event);

        let delivered = drain(events, &mut sink).await.unwrap();

        assert_eq!(delivered, 2);
        assert_eq!(seen, vec![status("a"), status("b")]);
    }

    #[tokio::test]
    async fn test_drain_stops_at_transport_error() {
        let events = stream::iter(vec![
            Ok(status("a")),
            Err(ClientError::StreamCancelled),
            Ok(status("never")),
        ]);
        let mut progress = SearchProgress::begin();

        let result = drain(events, &mut progress).await;

        assert!(matches!(result, Err(ClientError::StreamCancelled)));
        assert_eq!(progress.statuses, vec!["a".to_string()]);
    }

    #[test]
    fn test_results_stop_loading() {
        let mut progress = SearchProgress::begin();
        progress.apply(status("Analyzing your search query..."));
        assert!(progress.loading);

        progress.apply(StreamEvent::Results {
            items: vec![item("one")],
        });
        assert!(!progress.loading);
        assert_eq!(progress.items, Some(vec![item("one")]));
        assert_eq!(progress.latest_status(), Some("Analyzing your search query..."));
    }

    #[test]
    fn test_error_event_is_data() {
        let mut progress = SearchProgress::begin();
        progress.apply(StreamEvent::Error {
            message: "quota exceeded".to_string(),
        });
        assert_eq!(progress.error.as_deref(), Some("quota exceeded"));
        assert!(progress.loading);
    }

    #[tokio::test]
    async fn test_run_search_success() {
        let backend = Scripted {
            events: vec![
                status("Searching"),
                status("Found 1 matching results"),
                StreamEvent::Results {
                    items: vec![item("Notion for labs")],
                },
            ],
            fail_at_end: false,
        };

        let progress = run_search(&backend, &request()).await;

        assert_eq!(progress.statuses.len(), 2);
        assert_eq!(progress.items, Some(vec![item("Notion for labs")]));
        assert_eq!(progress.error, None);
        assert!(!progress.loading);
    }

    #[tokio::test]
    async fn test_run_search_transport_failure_clears_items() {
        let backend = Scripted {
            events: vec![StreamEvent::Results {
                items: vec![item("partial")],
            }],
            fail_at_end: true,
        };

        let progress = run_search(&backend, &request()).await;

        assert_eq!(progress.items, None);
        assert_eq!(progress.error.as_deref(), Some("Stream cancelled"));
        assert!(!progress.loading);
    }

    #[tokio::test]
    async fn test_run_search_invalid_request() {
        let backend = Scripted {
            events: vec![],
            fail_at_end: false,
        };
        let request = SearchRequest::new(" ", nonempty!["reddit".to_string()]);

        let progress = run_search(&backend, &request).await;

        assert!(progress.statuses.is_empty());
        assert!(progress
            .error
            .as_deref()
            .is_some_and(|e| e.starts_with("Configuration error")));
    }
}
