//! Greedy, priority-first selection under a token budget.
//!
//! # Algorithm
//!
//! 1. Price every item with the active [`CostModel`]
//! 2. Charge the model's reserved overhead; stop if it alone exceeds the budget
//! 3. Walk items by `(priority, sequence)` and accept each one that still fits
//! 4. Restore insertion order for rendering
//!
//! There is no backtracking and no second fill pass: an item that does not
//! fit when its turn comes is out of this render, even if a later, cheaper
//! item would have left room for it.

use crate::budget::Budget;
use crate::cost::CostModel;
use crate::item::{Item, SelectedItem};
use crate::order::restore_order;

/// Outcome of one selection pass.
#[derive(Debug)]
pub(crate) struct Selection {
    /// Accepted items, in insertion order.
    pub selected: Vec<SelectedItem>,
    /// Cost of every stored item (same indices), `None` when ineligible.
    pub costs: Vec<Option<usize>>,
    /// Reserved overhead actually charged; zero when nothing was selected.
    pub reserved: usize,
    pub token_usage: usize,
}

pub(crate) fn select(items: &[Item], budget: &Budget, model: &dyn CostModel) -> Selection {
    let costs: Vec<Option<usize>> = items
        .iter()
        .map(|item| model.cost(item.role, item.content_tokens))
        .collect();

    let effective = budget.effective_max_tokens();
    let reserved = model.reserved();

    let Some(mut remaining) = effective.checked_sub(reserved) else {
        tracing::debug!(
            reserved,
            effective,
            "Reserved overhead exceeds budget, selecting nothing"
        );
        return Selection {
            selected: Vec::new(),
            costs,
            reserved: 0,
            token_usage: 0,
        };
    };

    let mut order: Vec<usize> = (0..items.len()).collect();
    // Stable, and sequence is unique, so ties can only break by insertion.
    order.sort_by_key(|&i| (items[i].priority, items[i].sequence));

    let mut selected = Vec::new();
    let mut used = 0;

    for i in order {
        let item = &items[i];
        let Some(cost) = costs[i] else {
            tracing::debug!(sequence = item.sequence, "Skipped item: not representable in this mode");
            continue;
        };

        if cost <= remaining {
            remaining -= cost;
            used += cost;
            tracing::debug!(
                sequence = item.sequence,
                priority = item.priority,
                cost,
                remaining,
                "Selected item"
            );
            selected.push(SelectedItem {
                sequence: item.sequence,
                role: item.role,
                priority: item.priority,
                content: item.content.clone(),
                cost,
            });
        } else {
            tracing::debug!(
                sequence = item.sequence,
                priority = item.priority,
                cost,
                remaining,
                "Dropped item: would exceed budget"
            );
        }
    }

    restore_order(&mut selected);

    let reserved = if selected.is_empty() { 0 } else { reserved };
    Selection {
        selected,
        costs,
        reserved,
        token_usage: used + reserved,
    }
}
