use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::Value;

// =============================================================================
// Enums
// =============================================================================

/// Author of a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Kind of portfolio record a selectable item was derived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Experience,
    Project,
}

impl Category {
    /// Section heading shown above items of this category.
    pub fn heading(&self) -> &'static str {
        match self {
            Category::Experience => "Experience",
            Category::Project => "Projects",
        }
    }
}

/// "Current topic" hint the reasoning service may leave in its state token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    Experience,
    Projects,
}

impl Topic {
    /// Parse a topic hint. Unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "experience" | "experiences" => Some(Topic::Experience),
            "projects" | "project" => Some(Topic::Projects),
            _ => None,
        }
    }
}

// =============================================================================
// Conversation
// =============================================================================

/// One message in the conversation.
///
/// `content` is what the human sees. A turn produced by picking an option
/// also carries the picked item, which is what goes over the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectableItem>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            selection: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            selection: None,
        }
    }

    /// A user turn recording a picked option, labelled for display.
    pub fn selection(item: SelectableItem) -> Self {
        Self {
            role: Role::User,
            content: format!("Selected: {}", item.label),
            selection: Some(item),
        }
    }

    pub fn is_selection(&self) -> bool {
        self.selection.is_some()
    }
}

/// Opaque continuation token issued by the reasoning service.
///
/// Held as the raw JSON text the service sent, so it is echoed back byte
/// for byte: key order, number spelling and big integers survive. `None`
/// is JSON `null`. The only field ever read is the optional `topic` hint,
/// and only through [`ConversationState::topic`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationState(Option<Box<RawValue>>);

#[derive(Deserialize)]
struct TopicHint {
    #[serde(default)]
    topic: Option<String>,
}

impl ConversationState {
    /// Build a token from a parsed value. Tokens received from the service
    /// come through deserialization instead and keep their exact text.
    pub fn new(value: Value) -> Self {
        if value.is_null() {
            return Self::empty();
        }
        Self(serde_json::value::to_raw_value(&value).ok())
    }

    /// Wrap raw JSON text without re-encoding it.
    pub fn from_raw(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// The state in play before the first exchange.
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// The token exactly as it will be sent.
    pub fn raw(&self) -> &str {
        self.0.as_deref().map_or("null", RawValue::get)
    }

    /// Parse the token, for inspection and tests.
    pub fn to_value(&self) -> Value {
        serde_json::from_str(self.raw()).unwrap_or(Value::Null)
    }

    /// Read the `topic` hint, if the token is an object carrying a
    /// recognised string under that key.
    pub fn topic(&self) -> Option<Topic> {
        let raw = self.0.as_deref()?;
        if !raw.get().trim_start().starts_with('{') {
            return None;
        }
        serde_json::from_str::<TopicHint>(raw.get())
            .ok()?
            .topic
            .as_deref()
            .and_then(Topic::parse)
    }
}

impl PartialEq for ConversationState {
    fn eq(&self, other: &Self) -> bool {
        self.raw() == other.raw()
    }
}

impl From<Value> for ConversationState {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// A validated reply from the reasoning service.
#[derive(Clone, Debug, PartialEq)]
pub struct DialogueReply {
    pub response_text: String,
    pub next_state: ConversationState,
    pub needs_interrupt: bool,
}

// =============================================================================
// Selection
// =============================================================================

/// One experience or project record offered as a pickable option.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectableItem {
    #[serde(rename = "type")]
    pub category: Category,
    pub id: String,
    /// Human-readable label, e.g. "10xScale.ai - AI Intern".
    pub label: String,
    /// Heading line for the option (company or project name).
    pub display_text: String,
    /// Secondary line: period, or tech stack when no period is known.
    pub period_or_meta: String,
}
