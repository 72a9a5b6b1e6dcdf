use serde::{ Serialize, Deserialize };
use serde_json::Value;

/// The two speaker labels the generation API accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// `"user"` stays a user turn; every other label, or none at all, becomes a model turn.
    pub fn coerce(label: Option<&Value>) -> Self {
        match label.and_then(Value::as_str) {
            Some("user") => Role::User,
            _ => Role::Model,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConversationMessage {
    pub role: Role,
    /// Forwarded to the provider untouched, whatever JSON type the client sent.
    pub content: Value,
}

impl ConversationMessage {
    pub fn from_value(raw: &Value) -> Self {
        Self {
            role: Role::coerce(raw.get("role")),
            content: raw.get("content").cloned().unwrap_or(Value::Null),
        }
    }
}

#[derive(Debug)]
pub struct ChatRequest {
    pub messages: Option<Value>,
}

impl ChatRequest {
    /// Reads a request body; `None` unless it is a JSON object.
    pub fn from_slice(body: &[u8]) -> Option<Self> {
        match serde_json::from_slice::<Value>(body).ok()? {
            Value::Object(mut fields) => Some(Self { messages: fields.remove("messages") }),
            _ => None,
        }
    }

    /// `None` when `messages` is absent or not an array.
    pub fn into_conversation(self) -> Option<Vec<ConversationMessage>> {
        match self.messages {
            Some(Value::Array(items)) => Some(items.iter().map(ConversationMessage::from_value).collect()),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub role: String,
    pub content: String,
}

impl ChatReply {
    pub fn assistant(content: String) -> Self {
        Self { role: "assistant".to_string(), content }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
