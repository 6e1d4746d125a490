//! End-to-end packing scenarios.
//!
//! Sizes are built from repeated characters so the default estimator
//! (4 characters per token) gives exact, readable costs.

use refiner_core::{ChatRole, Role, PRIORITY_HIGH, PRIORITY_LOW, PRIORITY_MEDIUM};
use refiner_ops::{NormalizeWhitespace, RedactPii, StripHtml};
use refiner_packer::{Candidate, Packer, RenderMode, TextFormat};

/// Content that the estimator prices at exactly `tokens` tokens.
fn tokens(tokens: usize) -> String {
    "x".repeat(tokens * 4)
}

// ── Budget selection ─────────────────────────────────────────────────────

#[test]
fn history_is_dropped_when_budget_runs_out() {
    let mut packer = Packer::new(500).unwrap();
    assert_eq!(packer.effective_max_tokens(), 450);

    packer
        .add(Candidate::new(tokens(20)).with_role(Role::System))
        .unwrap()
        .add_messages(&[(Role::UserHistory, tokens(200))], None)
        .unwrap()
        .add(Candidate::new(tokens(100)).with_role(Role::Context))
        .unwrap()
        .add(Candidate::new(tokens(100)).with_role(Role::Context))
        .unwrap()
        .add(Candidate::new(tokens(100)).with_role(Role::Context))
        .unwrap()
        .add(Candidate::new(tokens(15)).with_role(Role::Query))
        .unwrap();

    let result = packer.pack_messages();

    // 335 content tokens + 5 envelopes of 4.
    assert_eq!(result.token_usage, 335 + 5 * 4);
    assert_eq!(result.item_count, 5);
    assert_eq!(result.dropped, 1);
    let sequences: Vec<u64> = result.selected.iter().map(|s| s.sequence).collect();
    assert_eq!(sequences, vec![0, 2, 3, 4, 5]);

    let roles: Vec<ChatRole> = result.messages().unwrap().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            ChatRole::System,
            ChatRole::System,
            ChatRole::System,
            ChatRole::System,
            ChatRole::User,
        ]
    );
}

#[test]
fn oversized_single_item_yields_empty_result() {
    let mut packer = Packer::new(100).unwrap();
    packer
        .add(Candidate::new(tokens(100)).with_role(Role::System))
        .unwrap();

    let result = packer.pack_messages();
    assert_eq!(result.item_count, 0);
    assert_eq!(result.token_usage, 0);
    assert!(result.messages().unwrap().is_empty());

    let text = packer.pack_text(TextFormat::Grouped);
    assert_eq!(text.text(), Some(""));
    assert_eq!(text.reserved_overhead, 0);
}

#[test]
fn equal_priority_tie_keeps_first_added() {
    let mut packer = Packer::new(100).unwrap();
    packer
        .add(Candidate::new(format!("A{}", tokens(60))).with_role(Role::Context))
        .unwrap()
        .add(Candidate::new(format!("B{}", tokens(60))).with_role(Role::Context))
        .unwrap();

    let result = packer.pack_messages();
    assert_eq!(result.item_count, 1);
    assert!(result.selected[0].content.starts_with('A'));
}

#[test]
fn explicit_priority_overrides_role() {
    let mut packer = Packer::new(100).unwrap();
    packer
        .add(
            Candidate::new(tokens(50))
                .with_role(Role::System)
                .with_priority(PRIORITY_LOW),
        )
        .unwrap()
        .add(
            Candidate::new(tokens(50))
                .with_role(Role::AssistantHistory)
                .with_priority(PRIORITY_HIGH),
        )
        .unwrap();

    let result = packer.pack_messages();
    assert_eq!(result.item_count, 1);
    assert_eq!(result.selected[0].role, Some(Role::AssistantHistory));
}

// ── Text formats ─────────────────────────────────────────────────────────

#[test]
fn grouped_headers_are_charged_once() {
    let mut packer = Packer::new(1000).unwrap();
    packer
        .add(Candidate::new(tokens(20)).with_role(Role::System))
        .unwrap()
        .add(tokens(100))
        .unwrap()
        .add(tokens(100))
        .unwrap();

    let plain = packer.pack_text(TextFormat::Plain);
    let grouped = packer.pack_text(TextFormat::Grouped);

    // Plain: one separator token per item.
    assert_eq!(plain.token_usage, 220 + 3);
    // Grouped: 30 reserved, system item free, 3 per document.
    assert_eq!(grouped.token_usage, 30 + 220 + 3 + 3);
    assert_eq!(grouped.reserved_overhead, 30);
    assert_eq!(grouped.token_usage - plain.token_usage, 30 + 6 - 3);

    let text = grouped.text().unwrap();
    assert_eq!(text.matches("### CONTEXT:").count(), 1);
    assert_eq!(text.matches("### INSTRUCTIONS:").count(), 1);
    assert_eq!(text.matches("\n- ").count(), 2);
}

#[test]
fn one_store_renders_every_way() {
    let mut packer = Packer::new(1000).unwrap();
    packer
        .add(Candidate::new("You answer briefly.").with_role(Role::System))
        .unwrap()
        .add("Rust was first released in 2015.")
        .unwrap()
        .add_messages(
            &[
                (Role::UserHistory, "Hi"),
                (Role::AssistantHistory, "Hello, how can I help?"),
            ],
            Some(PRIORITY_MEDIUM),
        )
        .unwrap()
        .add(Candidate::new("When was Rust released?").with_role(Role::Query))
        .unwrap();

    let plain = packer.pack(RenderMode::Text(TextFormat::Plain));
    assert_eq!(
        plain.text().unwrap(),
        "You answer briefly.\n\nRust was first released in 2015.\n\nHi\n\n\
         Hello, how can I help?\n\nWhen was Rust released?"
    );

    let grouped = packer.pack(RenderMode::Text(TextFormat::Grouped));
    assert_eq!(
        grouped.text().unwrap(),
        "### INSTRUCTIONS:\nYou answer briefly.\n\n\
         ### CONTEXT:\nRust was first released in 2015.\n\n\
         ### CONVERSATION:\nUser: Hi\nAssistant: Hello, how can I help?\n\n\
         ### INPUT:\nWhen was Rust released?"
    );

    let tagged = packer.pack(RenderMode::Text(TextFormat::Tagged));
    let tagged = tagged.text().unwrap();
    assert!(tagged.starts_with("<system>\nYou answer briefly.\n</system>\n\n<context>\n"));
    assert!(tagged.ends_with("<query>\nWhen was Rust released?\n</query>"));

    // The role-less document has no chat role and is left out.
    let messages = packer.pack(RenderMode::Messages);
    assert_eq!(messages.item_count, 4);
    assert_eq!(messages.messages().unwrap().len(), 4);
    assert_eq!(packer.len(), 5);
}

#[test]
fn custom_separator_applies_to_plain_and_tagged() {
    let mut packer = Packer::new(1000).unwrap().with_separator("\n---\n");
    packer.add("one").unwrap().add("two").unwrap();
    assert_eq!(
        packer.pack_text(TextFormat::Plain).text(),
        Some("one\n---\ntwo")
    );
    assert_eq!(
        packer.pack_text(TextFormat::Tagged).text(),
        Some("<context>\none\n</context>\n---\n<context>\ntwo\n</context>")
    );
}

// ── Refinement ───────────────────────────────────────────────────────────

#[test]
fn items_are_measured_after_refinement() {
    let html = format!("<div>{}</div>   <script>{}</script>", tokens(10), tokens(500));
    let mut packer = Packer::new(100).unwrap();
    packer
        .add(
            Candidate::new(html)
                .with_role(Role::Context)
                .refine_with(StripHtml::new())
                .refine_with(NormalizeWhitespace::new()),
        )
        .unwrap();

    let items = packer.items();
    let info = &items[0];
    assert_eq!(info.content, tokens(10));
    assert_eq!(info.content_tokens, 10);

    // Raw, the script body alone would blow the budget.
    assert_eq!(packer.pack_messages().item_count, 1);
}

#[test]
fn scrubbed_content_is_what_gets_rendered() {
    let mut packer = Packer::new(200).unwrap();
    packer
        .add(
            Candidate::new("Reach me at jane@example.com")
                .with_role(Role::UserHistory)
                .refine_with(RedactPii::new()),
        )
        .unwrap();
    let result = packer.pack_messages();
    assert_eq!(result.messages().unwrap()[0].content, "Reach me at [EMAIL]");
}

// ── Exact counting ───────────────────────────────────────────────────────

/// One token per whitespace-separated word; the definition asks for
/// truncation at 4 ids, which a budget counter must not honour.
#[cfg(feature = "exact")]
const TRUNCATING_WORD_LEVEL: &str = r#"{
  "version": "1.0",
  "truncation": {"direction": "Right", "max_length": 4, "strategy": "LongestFirst", "stride": 0},
  "padding": null,
  "added_tokens": [],
  "normalizer": null,
  "pre_tokenizer": {"type": "WhitespaceSplit"},
  "post_processor": null,
  "decoder": null,
  "model": {"type": "WordLevel", "vocab": {"[UNK]": 0, "w": 1}, "unk_token": "[UNK]"}
}"#;

#[cfg(feature = "exact")]
fn words(n: usize) -> String {
    vec!["w"; n].join(" ")
}

#[cfg(feature = "exact")]
#[test]
fn exact_counter_uses_full_budget() {
    let counter = refiner_tokens::ExactCounter::from_json(TRUNCATING_WORD_LEVEL, "words").unwrap();
    let mut packer = Packer::with_counter(100, counter).unwrap();
    assert_eq!(packer.effective_max_tokens(), 100);

    packer
        .add(Candidate::new(words(46)).with_role(Role::System))
        .unwrap()
        .add(Candidate::new(words(46)).with_role(Role::Context))
        .unwrap()
        .add(Candidate::new(words(1)).with_role(Role::UserHistory))
        .unwrap();

    let items = packer.items();
    assert_eq!(items[0].content_tokens, 46);

    // 46 + 4 twice fills the budget exactly; the history turn no longer fits.
    let result = packer.pack_messages();
    assert_eq!(result.token_usage, 100);
    assert_eq!(result.item_count, 2);
    assert_eq!(result.dropped, 1);
}

// ── Lifecycle ────────────────────────────────────────────────────────────

#[test]
fn pack_is_repeatable_and_reset_empties() {
    let mut packer = Packer::new(300).unwrap();
    packer
        .add(Candidate::new(tokens(40)).with_role(Role::System))
        .unwrap()
        .add(tokens(80))
        .unwrap();

    let first = packer.pack_text(TextFormat::Tagged);
    let second = packer.pack_text(TextFormat::Tagged);
    assert_eq!(first, second);

    packer.reset();
    let empty = packer.pack_text(TextFormat::Tagged);
    assert_eq!(empty.item_count, 0);
    assert_eq!(empty.token_usage, 0);
    assert_eq!(empty.effective_max_tokens, 270);
}
