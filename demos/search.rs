//! Stream a live search and print progress as it arrives.
//!
//! Run with:
//! ```bash
//! export FORESIGHT_BACKEND_URL="http://localhost:8000"
//! cargo run --example search -- "note taking for researchers" reddit,arxiv
//! ```

use foresight::backend::BackendClient;
use foresight::client::SearchBackend;
use foresight::model::{SearchRequest, StreamEvent};
use foresight::stream::SearchProgress;
use nonempty::NonEmpty;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let query = args.next().ok_or("usage: search <query> [sources]")?;
    let sources = args.next().unwrap_or_else(|| "reddit".to_string());
    let sources = NonEmpty::from_vec(sources.split(',').map(str::to_string).collect())
        .ok_or("at least one source is required")?;

    let client = BackendClient::from_env()?;
    let request = SearchRequest::new(query, sources);

    let mut progress = SearchProgress::begin();
    let mut sink = |event: StreamEvent| {
        match &event {
            StreamEvent::Status { message } => println!("... {}", message),
            StreamEvent::Results { items } => println!("\n=== {} results ===", items.len()),
            StreamEvent::Error { message } => eprintln!("backend error: {}", message),
        }
        progress.apply(event);
    };

    if let Err(error) = client.search(&request, &mut sink).await {
        progress.fail(&error);
    }
    progress.finish();

    for item in progress.items.iter().flatten() {
        println!("[{}] {}\n    {}", item.source, item.title, item.link);
    }
    if let Some(error) = &progress.error {
        eprintln!("search failed: {}", error);
    }

    Ok(())
}
