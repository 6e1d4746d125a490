//! Property tests for selection invariants across every render mode.

use proptest::prelude::*;
use refiner_core::{Priority, Role};
use refiner_packer::{Candidate, Packer, RenderMode, TextFormat};

fn arb_role() -> impl Strategy<Value = Option<Role>> {
    prop::option::of(prop::sample::select(vec![
        Role::System,
        Role::Query,
        Role::Context,
        Role::UserHistory,
        Role::AssistantHistory,
    ]))
}

fn arb_item() -> impl Strategy<Value = (Option<Role>, Option<Priority>, usize)> {
    (arb_role(), prop::option::of(-5i32..50), 0usize..600)
}

fn arb_mode() -> impl Strategy<Value = RenderMode> {
    prop::sample::select(vec![
        RenderMode::Messages,
        RenderMode::Text(TextFormat::Plain),
        RenderMode::Text(TextFormat::Grouped),
        RenderMode::Text(TextFormat::Tagged),
    ])
}

fn build(max_tokens: usize, items: &[(Option<Role>, Option<Priority>, usize)]) -> Packer {
    let mut packer = Packer::new(max_tokens).unwrap();
    for (i, &(role, priority, len)) in items.iter().enumerate() {
        let mut candidate = Candidate::new(format!("{i}:{}", "y".repeat(len)));
        if let Some(role) = role {
            candidate = candidate.with_role(role);
        }
        if let Some(priority) = priority {
            candidate = candidate.with_priority(priority);
        }
        packer.add(candidate).unwrap();
    }
    packer
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// token_usage never exceeds the effective budget.
    #[test]
    fn prop_usage_within_budget(
        max_tokens in 1usize..1500,
        items in prop::collection::vec(arb_item(), 0..20),
        mode in arb_mode(),
    ) {
        let packer = build(max_tokens, &items);
        let result = packer.pack(mode);
        prop_assert!(
            result.token_usage <= result.effective_max_tokens,
            "usage {} > effective {}",
            result.token_usage,
            result.effective_max_tokens
        );
        let charged: usize = result.selected.iter().map(|s| s.cost).sum();
        prop_assert_eq!(result.token_usage, charged + result.reserved_overhead);
        prop_assert_eq!(result.item_count, result.selected.len());
        prop_assert_eq!(result.dropped, items.len() - result.item_count);
    }

    /// Rendered order always follows insertion order.
    #[test]
    fn prop_insertion_order_preserved(
        max_tokens in 1usize..1500,
        items in prop::collection::vec(arb_item(), 0..20),
        mode in arb_mode(),
    ) {
        let packer = build(max_tokens, &items);
        let result = packer.pack(mode);
        let sequences: Vec<u64> = result.selected.iter().map(|s| s.sequence).collect();
        prop_assert!(sequences.windows(2).all(|w| w[0] < w[1]), "{:?}", sequences);
    }

    /// Packing twice without changes gives the same result.
    #[test]
    fn prop_pack_is_idempotent(
        max_tokens in 1usize..1500,
        items in prop::collection::vec(arb_item(), 0..20),
        mode in arb_mode(),
    ) {
        let packer = build(max_tokens, &items);
        prop_assert_eq!(packer.pack(mode), packer.pack(mode));
    }

    /// A dropped item never loses its slot to a less important item that
    /// costs as much or more.
    #[test]
    fn prop_priority_monotonic(
        max_tokens in 1usize..1500,
        items in prop::collection::vec(arb_item(), 0..20),
        mode in arb_mode(),
    ) {
        let packer = build(max_tokens, &items);
        let result = packer.pack(mode);
        let infos = packer.items();

        for dropped in &infos {
            let Some(dropped_cost) = dropped.last_cost else { continue };
            if result.selected.iter().any(|s| s.sequence == dropped.sequence) {
                continue;
            }
            for kept in &result.selected {
                if kept.priority > dropped.priority {
                    prop_assert!(
                        kept.cost < dropped_cost,
                        "kept #{} (p{}, cost {}) over dropped #{} (p{}, cost {})",
                        kept.sequence, kept.priority, kept.cost,
                        dropped.sequence, dropped.priority, dropped_cost
                    );
                }
            }
        }
    }

    /// After reset, every mode renders nothing.
    #[test]
    fn prop_reset_clears(
        max_tokens in 1usize..1500,
        items in prop::collection::vec(arb_item(), 0..20),
        mode in arb_mode(),
    ) {
        let mut packer = build(max_tokens, &items);
        packer.reset();
        let result = packer.pack(mode);
        prop_assert_eq!(result.item_count, 0);
        prop_assert_eq!(result.token_usage, 0);
        prop_assert!(packer.items().is_empty());
    }
}
