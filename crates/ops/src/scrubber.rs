//! PII redaction.

use refiner_core::{Operation, RefineError};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// A category of personally identifiable information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiKind {
    Url,
    Email,
    CreditCard,
    Ssn,
    Phone,
    IpAddress,
}

impl PiiKind {
    /// All kinds, in the order they are applied.
    ///
    /// URLs go before emails (a URL may contain `user@host`), and card
    /// numbers before phones (a card contains phone-shaped digit runs).
    pub const ALL: [PiiKind; 6] = [
        PiiKind::Url,
        PiiKind::Email,
        PiiKind::CreditCard,
        PiiKind::Ssn,
        PiiKind::Phone,
        PiiKind::IpAddress,
    ];

    pub fn placeholder(self) -> &'static str {
        match self {
            PiiKind::Url => "[URL]",
            PiiKind::Email => "[EMAIL]",
            PiiKind::CreditCard => "[CARD]",
            PiiKind::Ssn => "[SSN]",
            PiiKind::Phone => "[PHONE]",
            PiiKind::IpAddress => "[IP]",
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            PiiKind::Url => &URL,
            PiiKind::Email => &EMAIL,
            PiiKind::CreditCard => &CREDIT_CARD,
            PiiKind::Ssn => &SSN,
            PiiKind::Phone => &PHONE,
            PiiKind::IpAddress => &IP_ADDRESS,
        }
    }
}

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"]+"#).expect("static pattern is valid"));
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("static pattern is valid")
});
static CREDIT_CARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\d{4}[- ]?){3}\d{4}\b").expect("static pattern is valid")
});
static SSN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("static pattern is valid"));
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?1[-. ]?)?(?:\(\d{3}\)|\b\d{3})[-. ]?\d{3}[-. ]?\d{4}\b")
        .expect("static pattern is valid")
});
static IP_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").expect("static pattern is valid")
});

#[derive(Debug, Clone)]
struct CustomPattern {
    name: String,
    regex: Regex,
    replacement: String,
}

/// Replace PII with fixed placeholders such as `[EMAIL]`.
#[derive(Debug, Clone)]
pub struct RedactPii {
    kinds: Vec<PiiKind>,
    custom: Vec<CustomPattern>,
}

impl RedactPii {
    /// Redact every built-in kind.
    pub fn new() -> Self {
        Self {
            kinds: PiiKind::ALL.to_vec(),
            custom: Vec::new(),
        }
    }

    /// Redact only the given kinds (still applied in the canonical order).
    pub fn only(kinds: &[PiiKind]) -> Self {
        Self {
            kinds: PiiKind::ALL
                .into_iter()
                .filter(|k| kinds.contains(k))
                .collect(),
            custom: Vec::new(),
        }
    }

    /// Add a caller-defined pattern, applied after the built-in kinds.
    ///
    /// The pattern is compiled here so that a malformed expression fails
    /// before any text is processed.
    pub fn with_pattern(
        mut self,
        name: impl Into<String>,
        pattern: &str,
        replacement: impl Into<String>,
    ) -> Result<Self, RefineError> {
        let name = name.into();
        let regex = Regex::new(pattern).map_err(|e| RefineError::InvalidOperation {
            operation: format!("redact_pii:{name}"),
            reason: e.to_string(),
        })?;
        self.custom.push(CustomPattern {
            name,
            regex,
            replacement: replacement.into(),
        });
        Ok(self)
    }

    /// Built-in kinds this instance redacts, in application order.
    pub fn kinds(&self) -> &[PiiKind] {
        &self.kinds
    }
}

impl Default for RedactPii {
    fn default() -> Self {
        Self::new()
    }
}

impl Operation for RedactPii {
    fn name(&self) -> &str {
        "redact_pii"
    }

    fn process(&self, text: &str) -> Result<String, RefineError> {
        let mut out = text.to_string();
        for kind in &self.kinds {
            out = kind
                .pattern()
                .replace_all(&out, kind.placeholder())
                .into_owned();
        }
        for custom in &self.custom {
            let replaced = custom
                .regex
                .replace_all(&out, regex_lite::NoExpand(&custom.replacement))
                .into_owned();
            if replaced != out {
                tracing::trace!(pattern = %custom.name, "Custom PII pattern matched");
            }
            out = replaced;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redact(text: &str) -> String {
        RedactPii::new().process(text).unwrap()
    }

    #[test]
    fn redacts_email_and_phone() {
        assert_eq!(
            redact("Call 555-123-4567 or email john.doe@example.com"),
            "Call [PHONE] or email [EMAIL]"
        );
    }

    #[test]
    fn redacts_parenthesized_phone() {
        assert_eq!(redact("Office: (555) 123-4567."), "Office: [PHONE].");
    }

    #[test]
    fn redacts_ssn_and_card() {
        assert_eq!(redact("SSN 123-45-6789"), "SSN [SSN]");
        assert_eq!(redact("Card 4111 1111 1111 1111 on file"), "Card [CARD] on file");
    }

    #[test]
    fn redacts_ip_and_url() {
        assert_eq!(redact("Host 192.168.1.10 is up"), "Host [IP] is up");
        assert_eq!(
            redact("See https://user@example.com/path?q=1 now"),
            "See [URL] now"
        );
    }

    #[test]
    fn only_keeps_canonical_order() {
        let op = RedactPii::only(&[PiiKind::IpAddress, PiiKind::Email, PiiKind::Url]);
        assert_eq!(op.kinds(), &[PiiKind::Url, PiiKind::Email, PiiKind::IpAddress]);
        assert_eq!(RedactPii::new().kinds(), &PiiKind::ALL);
    }

    #[test]
    fn only_selected_kinds() {
        let op = RedactPii::only(&[PiiKind::Email]);
        assert_eq!(
            op.process("a@b.io 555-123-4567").unwrap(),
            "[EMAIL] 555-123-4567"
        );
    }

    #[test]
    fn custom_pattern_applied_literally() {
        let op = RedactPii::only(&[])
            .with_pattern("employee_id", r"EMP-\d{5}", "[$EMPLOYEE]")
            .unwrap();
        assert_eq!(op.process("id EMP-12345").unwrap(), "id [$EMPLOYEE]");
    }

    #[test]
    fn malformed_custom_pattern_rejected() {
        let err = RedactPii::new().with_pattern("broken", r"(unclosed", "[X]").unwrap_err();
        assert!(matches!(err, RefineError::InvalidOperation { .. }));
    }

    #[test]
    fn clean_text_unchanged() {
        assert_eq!(redact("Nothing sensitive here."), "Nothing sensitive here.");
    }
}
