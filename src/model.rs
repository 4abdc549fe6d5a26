//! Wire types shared by the search stream and the backend client.

use itertools::Itertools;
use nonempty::NonEmpty;
use serde::{Deserialize, Deserializer, Serialize};

use crate::client::ClientError;

/// A single search result.
///
/// Rows come straight from the database, so any string column may be
/// `null`; those decode to an empty string instead of rejecting the item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Item {
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    /// Source the item was scraped from (e.g. "reddit", "arxiv")
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub source_link: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_profile_url: Option<String>,

    /// Embedding similarity to the query, when the backend ranked the item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

/// Deserialize a field that may be `null`, falling back to `T::default()`.
///
/// Pair with `#[serde(default)]` so a missing key behaves the same way.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One decoded frame of the search stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// Progress message for the user
    Status { message: String },

    /// Final result set
    Results { items: Vec<Item> },

    /// Error reported by the backend as data
    Error { message: String },
}

impl StreamEvent {
    /// Values of the `type` field the decoder accepts.
    pub const KINDS: [&'static str; 3] = ["status", "results", "error"];

    /// The `type` tag of this event.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Status { .. } => "status",
            StreamEvent::Results { .. } => "results",
            StreamEvent::Error { .. } => "error",
        }
    }

    /// Whether the caller's loading indicator should stop on this event.
    ///
    /// The stream itself may continue afterwards.
    pub fn is_terminal_for_loading(&self) -> bool {
        matches!(self, StreamEvent::Results { .. })
    }
}

/// Filters applied to a search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchFilters {
    /// Only include items newer than this many days
    pub days_ago: u32,

    /// Maximum number of results per source
    pub results_per_source: u32,

    #[serde(default)]
    pub arxiv_categories: Vec<String>,

    #[serde(default)]
    pub reddit_categories: Vec<String>,

    #[serde(default)]
    pub product_hunt_categories: Vec<String>,

    #[serde(default)]
    pub ycombinator_categories: Vec<String>,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            days_ago: 20000,
            results_per_source: 25,
            arxiv_categories: Vec::new(),
            reddit_categories: Vec::new(),
            product_hunt_categories: Vec::new(),
            ycombinator_categories: Vec::new(),
        }
    }
}

/// A search query against one or more sources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,

    /// Sources to search; the backend requires at least one
    pub sources: NonEmpty<String>,

    #[serde(default)]
    pub filters: SearchFilters,
}

impl SearchRequest {
    /// Create a request with default filters.
    pub fn new(query: impl Into<String>, sources: NonEmpty<String>) -> Self {
        Self {
            query: query.into(),
            sources,
            filters: SearchFilters::default(),
        }
    }

    /// Set the filters.
    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Reject requests the backend would refuse.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.query.trim().is_empty() {
            return Err(ClientError::Config("search query must not be empty".to_string()));
        }
        if self.sources.iter().any(|s| s.trim().is_empty()) {
            return Err(ClientError::Config("search sources must not be blank".to_string()));
        }
        Ok(())
    }

    /// Query string parameters for `GET /api/search`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let filters = &self.filters;
        vec![
            ("query", self.query.trim().to_string()),
            ("valid_sources", self.sources.iter().join(",")),
            ("recency", filters.days_ago.to_string()),
            ("num_results", filters.results_per_source.to_string()),
            ("arxiv_categories", filters.arxiv_categories.iter().join(",")),
            ("reddit_categories", filters.reddit_categories.iter().join(",")),
            (
                "product_hunt_categories",
                filters.product_hunt_categories.iter().join(","),
            ),
            (
                "ycombinator_categories",
                filters.ycombinator_categories.iter().join(","),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nonempty::nonempty;

    #[test]
    fn test_stream_event_serde_tags() {
        let event: StreamEvent =
            serde_json::from_str(r#"{"type":"status","message":"Found 3 matching results"}"#)
                .unwrap();
        assert_eq!(event.kind(), "status");
        assert!(!event.is_terminal_for_loading());

        let json = serde_json::to_value(StreamEvent::Results { items: vec![] }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "results", "items": []}));
    }

    #[test]
    fn test_item_tolerates_missing_and_null_fields() {
        let item: Item =
            serde_json::from_str(r#"{"title":"t","image_url":null,"similarity":0.5}"#).unwrap();
        assert_eq!(item.title, "t");
        assert_eq!(item.link, "");
        assert_eq!(item.image_url, None);
        assert_eq!(item.similarity, Some(0.5));
    }

    #[test]
    fn test_item_tolerates_null_strings() {
        let item: Item = serde_json::from_str(
            r#"{"link":null,"title":"A","description":null,"source":null,"source_link":null}"#,
        )
        .unwrap();
        assert_eq!(item.title, "A");
        assert_eq!(item.description, "");
        assert_eq!(item.source, "");
    }

    #[test]
    fn test_item_omits_absent_optionals() {
        let json = serde_json::to_value(Item {
            title: "A".to_string(),
            author_name: Some("ada".to_string()),
            ..Item::default()
        })
        .unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object["author_name"], "ada");
        for key in ["image_url", "created_at", "author_profile_url", "similarity"] {
            assert!(!object.contains_key(key), "{key} should be omitted");
        }
        assert_eq!(object["description"], "");
    }

    #[test]
    fn test_query_pairs() {
        let request = SearchRequest::new(
            "  note taking for researchers ",
            nonempty!["reddit".to_string(), "arxiv".to_string()],
        )
        .with_filters(SearchFilters {
            days_ago: 30,
            results_per_source: 10,
            arxiv_categories: vec!["cs.AI".to_string(), "cs.HC".to_string()],
            ..SearchFilters::default()
        });

        let pairs = request.query_pairs();
        assert_eq!(pairs[0], ("query", "note taking for researchers".to_string()));
        assert_eq!(pairs[1], ("valid_sources", "reddit,arxiv".to_string()));
        assert_eq!(pairs[2], ("recency", "30".to_string()));
        assert_eq!(pairs[3], ("num_results", "10".to_string()));
        assert_eq!(pairs[4], ("arxiv_categories", "cs.AI,cs.HC".to_string()));
        assert_eq!(pairs[5], ("reddit_categories", String::new()));
        assert_eq!(pairs.len(), 8);
    }

    #[test]
    fn test_validate() {
        let sources = nonempty!["reddit".to_string()];
        assert!(SearchRequest::new("tools", sources.clone()).validate().is_ok());
        assert!(matches!(
            SearchRequest::new("   ", sources).validate(),
            Err(ClientError::Config(_))
        ));
        assert!(SearchRequest::new("tools", nonempty![" ".to_string()])
            .validate()
            .is_err());
    }

    #[test]
    fn test_default_filters() {
        let filters = SearchFilters::default();
        assert_eq!(filters.days_ago, 20000);
        assert_eq!(filters.results_per_source, 25);
    }
}
