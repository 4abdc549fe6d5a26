//! # foresight - Client library for the Foresight search backend
//!
//! Foresight searches Reddit, arXiv, Product Hunt, Y Combinator and other
//! sources for projects related to an idea, and helps refine the idea itself.
//! The backend streams search progress as Server-Sent Events; this crate
//! decodes that stream into typed events and tracks the resulting search
//! state.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Incremental SSE decoding that tolerates frames split across chunks
//! - Typed `status` / `results` / `error` events validated at the parse boundary
//! - Trait-based backend seam for testing without a server
//! - Idea documents, the idea assistant chat and plan usage over JSON endpoints
//! - Line-range edit application for assistant-suggested changes
//! - Expired sessions reported as a distinct `Unauthorized` error
//!
//! ## Example
//! ```no_run
//! use foresight::backend::BackendClient;
//! use foresight::model::SearchRequest;
//! use foresight::options::{HttpTransport, TransportOptions};
//! use foresight::stream::run_search;
//! use nonempty::nonempty;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = TransportOptions::new(HttpTransport::new("http://localhost:8000"));
//!     let client = BackendClient::new(transport)?;
//!
//!     let request = SearchRequest::new("habit tracker", nonempty!["reddit".to_string()]);
//!     let progress = run_search(&client, &request).await;
//!
//!     for status in &progress.statuses {
//!         println!("{}", status);
//!     }
//!     println!("{:?}", progress.items);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod client;
pub mod edits;
pub mod http;
pub mod ideas;
pub mod model;
pub mod options;
pub mod sse;
pub mod stream;

// Re-exports for convenience
pub use backend::BackendClient;
pub use client::{ClientError, EventStream, SearchBackend};
pub use ideas::{ChatRequest, ChatResponse, Idea, Message};
pub use model::{Item, SearchRequest, StreamEvent};
pub use sse::StreamDecoder;
pub use stream::{EventSink, SearchProgress};
