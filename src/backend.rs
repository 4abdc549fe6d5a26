//! HTTP client for the Foresight backend.
//!
//! Searches run against `GET {base_url}/api/search`, which answers with a
//! `text/event-stream` body of status frames followed by a results frame.
//! Ideas, the idea assistant and plan usage are plain JSON endpoints under
//! the same base URL.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::client::{ClientError, EventStream, SearchBackend};
use crate::http::{add_access_token, add_extra_headers, build_http_client};
use crate::ideas::{ChatRequest, ChatResponse, Idea, IdeaUpdate, NewIdea, PlanInfo};
use crate::model::{null_as_default, SearchRequest};
use crate::options::{HttpTransport, TransportOptions};
use crate::sse::SSEResponseExt;

const SEARCH_PATH: [&str; 2] = ["api", "search"];
const IDEAS_PATH: [&str; 2] = ["api", "ideas"];
const CHAT_PATH: [&str; 2] = ["api", "chat"];
const PLAN_PATH: [&str; 3] = ["api", "user", "plan"];

#[derive(Deserialize)]
struct IdeaList {
    #[serde(default, deserialize_with = "null_as_default")]
    ideas: Vec<Idea>,
}

#[derive(Deserialize)]
struct IdeaEnvelope {
    idea: Idea,
}

#[derive(Deserialize)]
struct PlanEnvelope {
    plan_info: PlanInfo,
}

/// Backend client using HTTP transport.
pub struct BackendClient {
    http: reqwest::Client,
    transport_options: TransportOptions<HttpTransport>,
}

impl BackendClient {
    /// Create a client. Fails if the base URL is missing or the HTTP client
    /// cannot be built from the options.
    pub fn new(transport_options: TransportOptions<HttpTransport>) -> Result<Self, ClientError> {
        if transport_options.provider.base_url.is_none() {
            return Err(ClientError::Config("backend base URL is required".to_string()));
        }

        let http = build_http_client(&transport_options)?;
        Ok(Self {
            http,
            transport_options,
        })
    }

    /// Create a client configured from the environment.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(TransportOptions::new(HttpTransport::from_env()))
    }

    pub fn transport_options(&self) -> &TransportOptions<HttpTransport> {
        &self.transport_options
    }

    /// List the signed-in user's ideas.
    pub async fn list_ideas(&self) -> Result<Vec<Idea>, ClientError> {
        let url = self.url(&IDEAS_PATH)?;
        debug!(%url, "listing ideas");

        let list: IdeaList = self.send_json(self.request(Method::GET, url)).await?;
        Ok(list.ideas)
    }

    /// Fetch one idea with its chat history.
    pub async fn get_idea(&self, id: &str) -> Result<Idea, ClientError> {
        let url = self.url(&[IDEAS_PATH[0], IDEAS_PATH[1], id])?;
        debug!(%url, "fetching idea");

        let envelope: IdeaEnvelope = self.send_json(self.request(Method::GET, url)).await?;
        Ok(envelope.idea)
    }

    pub async fn create_idea(&self, idea: &NewIdea) -> Result<Idea, ClientError> {
        let url = self.url(&IDEAS_PATH)?;
        debug!(%url, name = %idea.name, "creating idea");

        self.send_json(self.request(Method::POST, url).json(idea)).await
    }

    /// Update the fields set in `update`. Returns the stored idea.
    pub async fn update_idea(&self, id: &str, update: &IdeaUpdate) -> Result<Idea, ClientError> {
        update.validate()?;

        let url = self.url(&[IDEAS_PATH[0], IDEAS_PATH[1], id])?;
        debug!(%url, "updating idea");

        self.send_json(self.request(Method::PUT, url).json(update)).await
    }

    pub async fn delete_idea(&self, id: &str) -> Result<(), ClientError> {
        let url = self.url(&[IDEAS_PATH[0], IDEAS_PATH[1], id])?;
        debug!(%url, "deleting idea");

        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    /// Ask the idea assistant. The backend stores both the prompt and the
    /// reply in the idea's chat history.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        request.validate()?;

        let url = self.url(&CHAT_PATH)?;
        debug!(
            %url,
            idea_id = %request.idea_id,
            mode = ?request.chat_mode,
            context = request.chat_context.len(),
            "sending chat prompt"
        );

        let response: ChatResponse = self
            .send_json(self.request(Method::POST, url).json(request))
            .await?;
        debug!(
            items = response.items.len(),
            edits = response.edits.len(),
            "chat reply received"
        );
        Ok(response)
    }

    /// Delete the chat history of an idea.
    pub async fn clear_chat(&self, idea_id: &str) -> Result<(), ClientError> {
        let url = self.url(&[CHAT_PATH[0], CHAT_PATH[1], idea_id])?;
        debug!(%url, "clearing chat history");

        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    /// Plan and usage counters of the signed-in user.
    pub async fn plan_info(&self) -> Result<PlanInfo, ClientError> {
        let url = self.url(&PLAN_PATH)?;
        debug!(%url, "fetching plan info");

        let envelope: PlanEnvelope = self.send_json(self.request(Method::GET, url)).await?;
        Ok(envelope.plan_info)
    }

    /// Join path segments onto the base URL. Segments are percent-encoded,
    /// so ids cannot escape their path position.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let base = self
            .transport_options
            .provider
            .base_url
            .as_deref()
            .ok_or_else(|| ClientError::Config("backend base URL is required".to_string()))?;

        let mut url = Url::parse(base)
            .map_err(|e| ClientError::Config(format!("invalid backend base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Config(format!("backend base URL has no path: {}", base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request carrying the session cookie and extra headers.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let transport = &self.transport_options.provider;
        let req = self.http.request(method, url);
        let req = add_access_token(req, &transport.access_token);
        add_extra_headers(req, &transport.extra_headers)
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, ClientError> {
        check_status(req.send().await?).await
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let body = self.send(req).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Pass successful responses through; read the body of anything else into
/// an error.
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!(%status, "backend rejected request");
    Err(rejected(status, body))
}

/// A 401 carries its reason in `detail`; other statuses keep the raw body.
fn rejected(status: StatusCode, body: String) -> ClientError {
    if status != StatusCode::UNAUTHORIZED {
        return ClientError::Backend { status, body };
    }

    let detail = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| value.get("detail")?.as_str().map(str::to_string))
        .unwrap_or(body);
    ClientError::Unauthorized { detail }
}

#[async_trait]
impl SearchBackend for BackendClient {
    async fn open_search(&self, request: &SearchRequest) -> Result<EventStream, ClientError> {
        request.validate()?;

        let url = self.url(&SEARCH_PATH)?;
        debug!(%url, sources = request.sources.len(), "opening search stream");

        let req = self
            .request(Method::GET, url)
            .query(&request.query_pairs())
            .header(ACCEPT, "text/event-stream");

        let response = self.send(req).await?;
        Ok(Box::pin(response.events()))
    }
}
