//! Ideas, the idea assistant chat, and plan usage.
//!
//! An idea is a small document with three editable sections. The assistant
//! answers chat prompts about it and may propose [`LineEdit`]s against the
//! section being edited.

use serde::{Deserialize, Serialize};

use crate::client::ClientError;
use crate::edits::{apply_line_edits, LineEdit};
use crate::model::{null_as_default, Item, SearchFilters};

/// Number of most recent messages sent along as chat context.
pub const CHAT_CONTEXT_LEN: usize = 6;

/// Role of the message sender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in an idea's chat history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,

    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,

    /// Search results attached to an assistant reply
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub items: Vec<Item>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            items: Vec::new(),
        }
    }
}

/// Editable sections of an idea.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdeaSection {
    #[default]
    Idea,
    Customers,
    Competitors,
}

/// An idea document as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Idea {
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub chats: Vec<Message>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub customers: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub competitors: String,
}

impl Idea {
    /// Text of one section.
    pub fn section(&self, section: IdeaSection) -> &str {
        match section {
            IdeaSection::Idea => &self.content,
            IdeaSection::Customers => &self.customers,
            IdeaSection::Competitors => &self.competitors,
        }
    }

    /// Replace the text of one section.
    pub fn set_section(&mut self, section: IdeaSection, text: String) {
        match section {
            IdeaSection::Idea => self.content = text,
            IdeaSection::Customers => self.customers = text,
            IdeaSection::Competitors => self.competitors = text,
        }
    }

    /// The section changes as an update payload.
    pub fn to_update(&self) -> IdeaUpdate {
        IdeaUpdate {
            name: Some(self.name.clone()),
            content: Some(self.content.clone()),
            customers: Some(self.customers.clone()),
            competitors: Some(self.competitors.clone()),
        }
    }
}

/// Body of `POST /api/ideas`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewIdea {
    pub name: String,
    pub content: String,
}

impl NewIdea {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: String::new(),
        }
    }
}

/// Body of `PUT /api/ideas/{id}`. Only the fields that are set are sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct IdeaUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub customers: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitors: Option<String>,
}

impl IdeaUpdate {
    /// The backend rejects updates without any field.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.name.is_none()
            && self.content.is_none()
            && self.customers.is_none()
            && self.competitors.is_none()
        {
            return Err(ClientError::Config("idea update has no fields".to_string()));
        }
        Ok(())
    }
}

/// How the assistant should answer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ChatMode {
    #[default]
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "search")]
    Search,
    #[serde(rename = "ai search")]
    AiSearch,
    #[serde(rename = "agent")]
    Agent,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    pub prompt: String,
    pub idea_id: String,
    pub idea_name: String,
    pub idea_content: String,
    pub chat_context: Vec<Message>,
    pub chat_mode: ChatMode,
    pub editing_active: bool,
    pub selected_section: IdeaSection,
    pub section_content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recency: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_results: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_sources: Option<Vec<String>>,
}

impl ChatRequest {
    /// Ask about `idea`, sending its last [`CHAT_CONTEXT_LEN`] messages.
    pub fn for_idea(
        idea: &Idea,
        prompt: impl Into<String>,
        chat_mode: ChatMode,
        section: IdeaSection,
    ) -> Self {
        let skip = idea.chats.len().saturating_sub(CHAT_CONTEXT_LEN);
        Self {
            prompt: prompt.into(),
            idea_id: idea.id.clone(),
            idea_name: idea.name.clone(),
            idea_content: idea.content.clone(),
            chat_context: idea.chats[skip..].to_vec(),
            chat_mode,
            editing_active: false,
            selected_section: section,
            section_content: idea.section(section).to_string(),
            recency: None,
            num_results: None,
            valid_sources: None,
        }
    }

    /// Let the assistant propose edits to the selected section.
    pub fn with_editing(mut self) -> Self {
        self.editing_active = true;
        self
    }

    /// Search parameters, used in [`ChatMode::Search`].
    pub fn with_search(mut self, sources: Vec<String>, filters: &SearchFilters) -> Self {
        self.recency = Some(filters.days_ago);
        self.num_results = Some(filters.results_per_source);
        self.valid_sources = Some(sources);
        self
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.prompt.trim().is_empty() {
            return Err(ClientError::Config("chat prompt must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Reply to `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Item>,

    /// Line-range edits against the selected section
    #[serde(default, deserialize_with = "null_as_default")]
    pub edits: Vec<LineEdit>,

    /// Whole-section replacement, sent by backends that do not produce edits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_content: Option<String>,
}

impl ChatResponse {
    /// The assistant message to append to the chat history.
    pub fn reply(&self) -> Message {
        Message {
            role: Role::Assistant,
            content: self.message.clone(),
            items: self.items.clone(),
        }
    }

    /// Apply the proposed changes to one section of `idea`.
    ///
    /// Edits take precedence over `updated_content`. Returns whether the
    /// section changed.
    pub fn apply_to(&self, idea: &mut Idea, section: IdeaSection) -> bool {
        let updated = if !self.edits.is_empty() {
            apply_line_edits(idea.section(section), self.edits.clone())
        } else if let Some(content) = &self.updated_content {
            content.clone()
        } else {
            return false;
        };

        let changed = updated != idea.section(section);
        idea.set_section(section, updated);
        changed
    }
}

/// Usage counters for the signed-in user's plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PlanInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_plan: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub used_searches: u32,

    #[serde(default, deserialize_with = "null_as_default")]
    pub used_normal_chats: u32,

    #[serde(default, deserialize_with = "null_as_default")]
    pub used_agent_chats: u32,
}

/// Quotas of a plan. `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanLimits {
    pub searches: Option<u32>,
    pub normal_chats: Option<u32>,
    pub agent_chats: Option<u32>,
}

impl PlanLimits {
    pub const FREE: PlanLimits = PlanLimits {
        searches: Some(25),
        normal_chats: Some(10),
        agent_chats: Some(0),
    };

    pub const PRO: PlanLimits = PlanLimits {
        searches: None,
        normal_chats: Some(50),
        agent_chats: Some(20),
    };
}

impl PlanInfo {
    /// Quotas for this plan; unknown plans get the free quotas.
    pub fn limits(&self) -> PlanLimits {
        match self.payment_plan.as_str() {
            "pro" => PlanLimits::PRO,
            _ => PlanLimits::FREE,
        }
    }

    /// Searches left, or `None` when unlimited.
    pub fn remaining_searches(&self) -> Option<u32> {
        remaining(self.limits().searches, self.used_searches)
    }

    /// Chats left in `mode`, or `None` when unlimited.
    pub fn remaining_chats(&self, mode: ChatMode) -> Option<u32> {
        let limits = self.limits();
        match mode {
            ChatMode::Agent => remaining(limits.agent_chats, self.used_agent_chats),
            ChatMode::Search => remaining(limits.searches, self.used_searches),
            ChatMode::Normal | ChatMode::AiSearch => {
                remaining(limits.normal_chats, self.used_normal_chats)
            }
        }
    }
}

fn remaining(limit: Option<u32>, used: u32) -> Option<u32> {
    limit.map(|limit| limit.saturating_sub(used))
}
