//! Delimited text rendering for completion-style prompts.

use crate::item::SelectedItem;
use refiner_core::Role;
use serde::{Deserialize, Serialize};

/// Layout of a rendered text prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextFormat {
    /// Contents joined by the separator
    #[default]
    Plain,
    /// Fixed `### INSTRUCTIONS/CONTEXT/CONVERSATION/INPUT` sections
    Grouped,
    /// Each item wrapped in `<role>` tags
    Tagged,
}

impl std::fmt::Display for TextFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextFormat::Plain => write!(f, "plain"),
            TextFormat::Grouped => write!(f, "grouped"),
            TextFormat::Tagged => write!(f, "tagged"),
        }
    }
}

const INSTRUCTIONS_HEADER: &str = "### INSTRUCTIONS:";
const CONTEXT_HEADER: &str = "### CONTEXT:";
const CONVERSATION_HEADER: &str = "### CONVERSATION:";
const INPUT_HEADER: &str = "### INPUT:";

/// Tag name used by [`TextFormat::Tagged`]; role-less items are `context`.
pub(crate) fn tag_label(role: Option<Role>) -> &'static str {
    role.map_or("context", Role::tag)
}

/// Serialize `selected` (already in reading order) into one string.
pub fn render_text(selected: &[SelectedItem], format: TextFormat, separator: &str) -> String {
    match format {
        TextFormat::Plain => selected
            .iter()
            .map(|item| item.content.as_str())
            .collect::<Vec<_>>()
            .join(separator),
        TextFormat::Tagged => selected
            .iter()
            .map(|item| {
                let label = tag_label(item.role);
                format!("<{label}>\n{}\n</{label}>", item.content)
            })
            .collect::<Vec<_>>()
            .join(separator),
        TextFormat::Grouped => render_grouped(selected),
    }
}

fn render_grouped(selected: &[SelectedItem]) -> String {
    let mut instructions = Vec::new();
    let mut context = Vec::new();
    let mut conversation = Vec::new();
    let mut input = Vec::new();

    for item in selected {
        let content = item.content.as_str();
        match item.role {
            Some(Role::System) => instructions.push(content.to_string()),
            Some(Role::Context) | None => context.push(content),
            Some(Role::UserHistory) => conversation.push(format!("User: {content}")),
            Some(Role::AssistantHistory) => conversation.push(format!("Assistant: {content}")),
            Some(Role::Query) => input.push(content.to_string()),
        }
    }

    let mut sections = Vec::new();
    if !instructions.is_empty() {
        sections.push(format!("{INSTRUCTIONS_HEADER}\n{}", instructions.join("\n\n")));
    }
    if !context.is_empty() {
        // A lone document needs no bullet.
        let body = if let [only] = context.as_slice() {
            only.to_string()
        } else {
            context
                .iter()
                .map(|doc| format!("- {doc}"))
                .collect::<Vec<_>>()
                .join("\n\n")
        };
        sections.push(format!("{CONTEXT_HEADER}\n{body}"));
    }
    if !conversation.is_empty() {
        sections.push(format!("{CONVERSATION_HEADER}\n{}", conversation.join("\n")));
    }
    if !input.is_empty() {
        sections.push(format!("{INPUT_HEADER}\n{}", input.join("\n\n")));
    }

    sections.join("\n\n")
}
