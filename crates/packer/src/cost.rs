//! Render-mode overhead schedules.
//!
//! Selection is the same for every output encoding; what differs is how
//! much structure each encoding wraps around an item and how much it costs
//! up front. A [`CostModel`] captures exactly that, so the selector never
//! needs to know which renderer will run.

use crate::render::TextFormat;
use refiner_config::OverheadConfig;
use refiner_core::Role;
use refiner_tokens::TokenCounter;

/// Per-item and per-render overhead for one output encoding.
pub trait CostModel {
    /// One-time cost charged before any item is considered.
    fn reserved(&self) -> usize;

    /// Structural overhead for an item with `role`, on top of its content
    /// tokens.
    ///
    /// `None` means the encoding cannot represent the item at all; such
    /// items are never selected and never consume budget.
    fn item_overhead(&self, role: Option<Role>) -> Option<usize>;

    /// Full cost of an item under this model.
    fn cost(&self, role: Option<Role>, content_tokens: usize) -> Option<usize> {
        self.item_overhead(role)
            .map(|overhead| content_tokens + overhead)
    }
}

/// Chat message envelope: a fixed cost per message, nothing reserved.
#[derive(Debug, Clone, Copy)]
pub struct ChatCost {
    per_message: usize,
}

impl ChatCost {
    pub fn new(overhead: &OverheadConfig) -> Self {
        Self {
            per_message: overhead.per_message,
        }
    }
}

impl CostModel for ChatCost {
    fn reserved(&self) -> usize {
        0
    }

    fn item_overhead(&self, role: Option<Role>) -> Option<usize> {
        role.map(|_| self.per_message)
    }
}

/// Overheads for the delimited text encodings.
pub struct TextCost<'a> {
    format: TextFormat,
    overhead: &'a OverheadConfig,
    separator_tokens: usize,
    counter: &'a dyn TokenCounter,
}

impl<'a> TextCost<'a> {
    pub fn new(
        format: TextFormat,
        overhead: &'a OverheadConfig,
        separator: &str,
        counter: &'a dyn TokenCounter,
    ) -> Self {
        Self {
            format,
            overhead,
            separator_tokens: counter.count(separator),
            counter,
        }
    }

    fn tag_tokens(&self, role: Option<Role>) -> usize {
        let label = crate::render::text::tag_label(role);
        self.counter.count(&format!("<{label}>\n")) + self.counter.count(&format!("\n</{label}>"))
    }
}

impl CostModel for TextCost<'_> {
    fn reserved(&self) -> usize {
        match self.format {
            TextFormat::Grouped => self.overhead.grouped_reserved,
            TextFormat::Plain | TextFormat::Tagged => 0,
        }
    }

    fn item_overhead(&self, role: Option<Role>) -> Option<usize> {
        let overhead = match self.format {
            TextFormat::Plain => self.separator_tokens,
            TextFormat::Grouped => match role {
                Some(Role::System) => self.overhead.grouped_instruction,
                Some(Role::Context) | None => self.overhead.grouped_context,
                Some(Role::Query | Role::UserHistory | Role::AssistantHistory) => {
                    self.overhead.grouped_conversation
                }
            },
            TextFormat::Tagged => self.separator_tokens + self.tag_tokens(role),
        };
        Some(overhead)
    }
}
