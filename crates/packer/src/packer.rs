//! The packer: item store plus render entry points.

use crate::budget::{Budget, DEFAULT_SAFETY_FACTOR};
use crate::cost::{ChatCost, CostModel, TextCost};
use crate::item::{Candidate, Item, ItemInfo, SelectedItem};
use crate::render::{render_messages, render_text, RenderMode, RenderOutput, TextFormat};
use crate::selector::{select, Selection};
use refiner_config::{OverheadConfig, RefinerConfig};
use refiner_core::{ChatMessage, Operation, PackerError, Priority, Role, PRIORITY_LOW};
use refiner_tokens::{CharEstimator, TokenCounter};
use serde::{Deserialize, Serialize};
use std::cell::Cell;

// ── Result ────────────────────────────────────────────────────────────────

/// The outcome of one `pack` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackedResult {
    /// Items that fit, in insertion order.
    pub selected: Vec<SelectedItem>,
    /// Selected item costs plus the reserved overhead actually charged.
    pub token_usage: usize,
    pub item_count: usize,
    /// Zero when nothing was selected.
    pub reserved_overhead: usize,
    pub effective_max_tokens: usize,
    /// Stored items that were not rendered.
    pub dropped: usize,
    /// `token_usage` as a share of `effective_max_tokens` (0.0–100.0).
    pub utilization_pct: f32,
    pub output: RenderOutput,
}

impl PackedResult {
    /// The chat messages, when rendered in messages mode.
    pub fn messages(&self) -> Option<&[ChatMessage]> {
        self.output.as_messages()
    }

    /// The prompt text, when rendered in text mode.
    pub fn text(&self) -> Option<&str> {
        self.output.as_text()
    }

    pub fn to_json(&self) -> refiner_core::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ── Packer ────────────────────────────────────────────────────────────────

/// Collects prioritized items and packs them into a token budget.
///
/// Items are refined and measured once, when added. Each `pack` call then
/// prices them for the requested render mode, selects greedily by priority,
/// and renders the survivors in the order they were added. Packing never
/// changes the stored items, so the same packer can be rendered as chat
/// messages and as text without re-adding anything.
///
/// ```
/// use refiner_packer::{Candidate, Packer};
/// use refiner_core::Role;
///
/// let mut packer = Packer::new(1000)?;
/// packer
///     .add(Candidate::new("You are a helpful assistant.").with_role(Role::System))?
///     .add(Candidate::new("What is Rust?").with_role(Role::Query))?;
///
/// let result = packer.pack_messages();
/// assert_eq!(result.item_count, 2);
/// # Ok::<(), refiner_core::Error>(())
/// ```
pub struct Packer {
    budget: Budget,
    counter: Box<dyn TokenCounter>,
    overhead: OverheadConfig,
    separator: String,
    default_refiner: Option<Box<dyn Operation>>,
    items: Vec<Item>,
    next_sequence: u64,
}

impl Packer {
    /// A packer using the character estimator and the default safety factor.
    pub fn new(max_tokens: usize) -> Result<Self, PackerError> {
        Self::with_counter(max_tokens, CharEstimator::new())
    }

    /// A packer using `counter` for all measurements.
    pub fn with_counter(
        max_tokens: usize,
        counter: impl TokenCounter + 'static,
    ) -> Result<Self, PackerError> {
        Self::build(max_tokens, Box::new(counter), DEFAULT_SAFETY_FACTOR)
    }

    /// A packer configured entirely from `config`: budget, counter,
    /// overhead schedule, separator and default refinement pipeline.
    pub fn from_config(config: &RefinerConfig) -> refiner_core::Result<Self> {
        config.validate()?;
        let counter = refiner_tokens::build_counter(&config.tokenizer)?;
        let mut packer = Self::build(
            config.packer.max_tokens,
            counter,
            config.packer.safety_factor,
        )?
        .with_overhead(config.overhead.clone())
        .with_separator(config.packer.separator.clone());

        if !config.refine.is_empty() {
            let refiner = refiner_ops::build_refiner(&config.refine)?;
            packer.default_refiner = Some(Box::new(refiner));
        }
        Ok(packer)
    }

    fn build(
        max_tokens: usize,
        counter: Box<dyn TokenCounter>,
        safety_factor: f64,
    ) -> Result<Self, PackerError> {
        let budget = Budget::new(max_tokens, counter.is_exact(), safety_factor)?;
        tracing::debug!(
            max_tokens,
            effective_max_tokens = budget.effective_max_tokens(),
            counter = counter.name(),
            "Packer initialized"
        );
        Ok(Self {
            budget,
            counter,
            overhead: OverheadConfig::default(),
            separator: "\n\n".into(),
            default_refiner: None,
            items: Vec::new(),
            next_sequence: 0,
        })
    }

    /// Change the safety factor applied to estimated budgets.
    pub fn with_safety_factor(mut self, safety_factor: f64) -> Result<Self, PackerError> {
        self.budget = Budget::new(
            self.budget.max_tokens(),
            self.counter.is_exact(),
            safety_factor,
        )?;
        Ok(self)
    }

    /// Replace the overhead schedule used to price items.
    pub fn with_overhead(mut self, overhead: OverheadConfig) -> Self {
        self.overhead = overhead;
        self
    }

    /// Separator between items in plain and tagged text.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Run `op` on every item added from now on, before the item's own
    /// refinement steps.
    pub fn with_default_refiner(mut self, op: impl Operation + 'static) -> Self {
        self.default_refiner = Some(Box::new(op));
        self
    }

    // ── Item store ────────────────────────────────────────────────────────

    /// Refine, measure and store an item.
    ///
    /// Empty content is accepted. Refinement failures are returned as is;
    /// a half-refined item is never stored.
    pub fn add(&mut self, candidate: impl Into<Candidate>) -> refiner_core::Result<&mut Self> {
        let candidate = candidate.into();
        let priority = candidate.priority();
        let Candidate {
            mut content,
            role,
            refine,
            ..
        } = candidate;

        if let Some(op) = &self.default_refiner {
            content = op.process(&content)?;
        }
        for op in &refine {
            content = op.process(&content)?;
        }

        let content_tokens = self.counter.count(&content);
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        tracing::debug!(
            sequence,
            priority,
            role = ?role,
            content_tokens,
            "Added item"
        );

        self.items.push(Item {
            sequence,
            role,
            priority,
            content,
            content_tokens,
            last_cost: Cell::new(None),
        });
        Ok(self)
    }

    /// Add a batch of role-tagged messages at one priority
    /// (`PRIORITY_LOW` when `None`, so old history is dropped first).
    pub fn add_messages<S: AsRef<str>>(
        &mut self,
        messages: &[(Role, S)],
        priority: Option<Priority>,
    ) -> refiner_core::Result<&mut Self> {
        let priority = priority.unwrap_or(PRIORITY_LOW);
        for (role, content) in messages {
            self.add(
                Candidate::new(content.as_ref())
                    .with_role(*role)
                    .with_priority(priority),
            )?;
        }
        Ok(self)
    }

    /// Snapshot of every stored item, in insertion order.
    pub fn items(&self) -> Vec<ItemInfo> {
        self.items.iter().map(Item::info).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop every stored item. The budget and configuration are kept and
    /// sequence numbers start over from zero.
    pub fn reset(&mut self) -> &mut Self {
        self.items.clear();
        self.next_sequence = 0;
        tracing::debug!("Packer reset");
        self
    }

    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    pub fn effective_max_tokens(&self) -> usize {
        self.budget.effective_max_tokens()
    }

    // ── Rendering ─────────────────────────────────────────────────────────

    /// Select and render in the given mode.
    pub fn pack(&self, mode: RenderMode) -> PackedResult {
        let selection = match mode {
            RenderMode::Messages => self.select_with(&ChatCost::new(&self.overhead)),
            RenderMode::Text(format) => self.select_with(&TextCost::new(
                format,
                &self.overhead,
                &self.separator,
                self.counter.as_ref(),
            )),
        };

        let output = match mode {
            RenderMode::Messages => RenderOutput::Messages(render_messages(&selection.selected)),
            RenderMode::Text(format) => {
                RenderOutput::Text(render_text(&selection.selected, format, &self.separator))
            }
        };

        let effective = self.budget.effective_max_tokens();
        let item_count = selection.selected.len();
        let utilization_pct = if effective == 0 {
            0.0
        } else {
            (selection.token_usage as f32 / effective as f32) * 100.0
        };

        if item_count == 0 {
            tracing::warn!(
                %mode,
                stored = self.items.len(),
                effective_max_tokens = effective,
                "No items selected"
            );
        } else {
            tracing::info!(
                %mode,
                selected = item_count,
                stored = self.items.len(),
                token_usage = selection.token_usage,
                effective_max_tokens = effective,
                "Packed items"
            );
        }

        PackedResult {
            item_count,
            token_usage: selection.token_usage,
            reserved_overhead: selection.reserved,
            effective_max_tokens: effective,
            dropped: self.items.len() - item_count,
            utilization_pct,
            selected: selection.selected,
            output,
        }
    }

    /// Render as chat messages. Role-less items are left out.
    pub fn pack_messages(&self) -> PackedResult {
        self.pack(RenderMode::Messages)
    }

    /// Render as one text block in `format`.
    pub fn pack_text(&self, format: TextFormat) -> PackedResult {
        self.pack(RenderMode::Text(format))
    }

    fn select_with(&self, model: &dyn CostModel) -> Selection {
        let selection = select(&self.items, &self.budget, model);
        for (item, cost) in self.items.iter().zip(&selection.costs) {
            item.last_cost.set(*cost);
        }
        selection
    }
}

impl std::fmt::Debug for Packer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packer")
            .field("budget", &self.budget)
            .field("counter", &self.counter.name())
            .field("overhead", &self.overhead)
            .field("separator", &self.separator)
            .field("items", &self.items.len())
            .finish()
    }
}

impl From<PackedResult> for Vec<ChatMessage> {
    fn from(result: PackedResult) -> Self {
        match result.output {
            RenderOutput::Messages(messages) => messages,
            RenderOutput::Text(_) => Vec::new(),
        }
    }
}
