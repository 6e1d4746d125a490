//! Roles, priorities, and the chat message value object.
//!
//! Candidate content flows through the packer tagged with a [`Role`]:
//! caller adds an item → packer selects it → renderer emits a [`ChatMessage`]
//! or a section of delimited text.

use serde::{Deserialize, Serialize};

/// Selection rank for an item. Lower value = more important.
///
/// Any integer is accepted; sort order is the only semantic.
pub type Priority = i32;

/// Absolute must-have (system prompts).
pub const PRIORITY_SYSTEM: Priority = 0;
/// Critical user input (the current query).
pub const PRIORITY_USER: Priority = 10;
/// Important context (core retrieved documents).
pub const PRIORITY_HIGH: Priority = 20;
/// Normal priority (recent conversation turns).
pub const PRIORITY_MEDIUM: Priority = 30;
/// Optional content (old conversation history).
pub const PRIORITY_LOW: Priority = 40;

/// The semantic role of a candidate item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// System instructions (identity, rules)
    System,
    /// The current user query
    Query,
    /// Retrieved documents and other reference material
    Context,
    /// An earlier user turn
    UserHistory,
    /// An earlier assistant turn
    AssistantHistory,
}

impl Role {
    /// The priority assigned when the caller gives none.
    pub fn default_priority(self) -> Priority {
        match self {
            Role::System => PRIORITY_SYSTEM,
            Role::Query => PRIORITY_USER,
            Role::Context => PRIORITY_HIGH,
            Role::UserHistory | Role::AssistantHistory => PRIORITY_MEDIUM,
        }
    }

    /// Default priority for an item that may carry no role at all.
    ///
    /// Role-less items are treated as retrieved documents.
    pub fn priority_for(role: Option<Role>) -> Priority {
        role.map_or(PRIORITY_HIGH, Role::default_priority)
    }

    /// The role name used by chat-style APIs.
    pub fn chat_role(self) -> ChatRole {
        match self {
            Role::System | Role::Context => ChatRole::System,
            Role::Query | Role::UserHistory => ChatRole::User,
            Role::AssistantHistory => ChatRole::Assistant,
        }
    }

    /// Short label used in tag-wrapped text output.
    pub fn tag(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Query => "query",
            Role::Context => "context",
            Role::UserHistory => "user",
            Role::AssistantHistory => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::System => "system",
            Role::Query => "query",
            Role::Context => "context",
            Role::UserHistory => "user_history",
            Role::AssistantHistory => "assistant_history",
        };
        f.write_str(name)
    }
}

/// Role names understood by chat completion APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single `{role, content}` record of a chat request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}
