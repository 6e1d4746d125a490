//! Output encodings for a selection.
//!
//! | Mode | Output | Role-less items |
//! |------|--------|-----------------|
//! | [`RenderMode::Messages`] | `Vec<ChatMessage>` | omitted |
//! | [`RenderMode::Text`] + [`TextFormat::Plain`] | items joined by the separator | kept |
//! | [`RenderMode::Text`] + [`TextFormat::Grouped`] | `### SECTION:` blocks | kept, under CONTEXT |
//! | [`RenderMode::Text`] + [`TextFormat::Tagged`] | `<role>...</role>` blocks | kept, tagged `context` |

pub mod messages;
pub mod text;

pub use messages::render_messages;
pub use text::{render_text, TextFormat};

use refiner_core::ChatMessage;
use serde::{Deserialize, Serialize};

/// Which renderer a `pack` call uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    Messages,
    Text(TextFormat),
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderMode::Messages => write!(f, "messages"),
            RenderMode::Text(format) => write!(f, "text/{format}"),
        }
    }
}

/// The rendered payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderOutput {
    Messages(Vec<ChatMessage>),
    Text(String),
}

impl RenderOutput {
    pub fn as_messages(&self) -> Option<&[ChatMessage]> {
        match self {
            RenderOutput::Messages(messages) => Some(messages),
            RenderOutput::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RenderOutput::Text(text) => Some(text),
            RenderOutput::Messages(_) => None,
        }
    }
}
