//! Cleaning operations: HTML stripping, whitespace and Unicode fixups.

use refiner_core::{Operation, RefineError};
use regex_lite::{Captures, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;

static SCRIPT_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?:script|style)\b[^>]*>.*?</(?:script|style)\s*>")
        .expect("static pattern is valid")
});
static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("static pattern is valid"));
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"</?([A-Za-z][A-Za-z0-9-]*)\b[^>]*>").expect("static pattern is valid")
});
static BOLD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?:strong|b)\b[^>]*>(.*?)</(?:strong|b)\s*>")
        .expect("static pattern is valid")
});
static ITALIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?:em|i)\b[^>]*>(.*?)</(?:em|i)\s*>").expect("static pattern is valid")
});
static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("static pattern is valid"));
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<li\b[^>]*>").expect("static pattern is valid"));
static HEADERS: LazyLock<Vec<(Regex, String)>> = LazyLock::new(|| {
    (1..=6)
        .map(|level| {
            let re = Regex::new(&format!(r"(?is)<h{level}\b[^>]*>(.*?)</h{level}\s*>"))
                .expect("static pattern is valid");
            (re, format!("{} ${{1}}", "#".repeat(level)))
        })
        .collect()
});

const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    // Last, so "&amp;lt;" decodes to "&lt;" and not "<".
    ("&amp;", "&"),
];

/// Remove HTML markup, optionally keeping light formatting as Markdown.
#[derive(Debug, Clone, Default)]
pub struct StripHtml {
    to_markdown: bool,
    preserve_tags: HashSet<String>,
}

impl StripHtml {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert bold, italic, headers, line breaks and list items to Markdown.
    pub fn to_markdown(mut self, enabled: bool) -> Self {
        self.to_markdown = enabled;
        self
    }

    /// Keep tags with these names (case-insensitive) verbatim.
    pub fn preserve_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.preserve_tags = tags
            .into_iter()
            .map(|t| t.as_ref().to_ascii_lowercase())
            .collect();
        self
    }

    fn markdownify(text: &str) -> String {
        let mut out = BOLD.replace_all(text, "**${1}**").into_owned();
        out = ITALIC.replace_all(&out, "*${1}*").into_owned();
        for (re, replacement) in HEADERS.iter() {
            out = re.replace_all(&out, replacement.as_str()).into_owned();
        }
        out = LINE_BREAK.replace_all(&out, "\n").into_owned();
        LIST_ITEM.replace_all(&out, "- ").into_owned()
    }
}

impl Operation for StripHtml {
    fn name(&self) -> &str {
        "strip_html"
    }

    fn process(&self, text: &str) -> Result<String, RefineError> {
        let mut out = SCRIPT_STYLE.replace_all(text, "").into_owned();
        out = COMMENT.replace_all(&out, "").into_owned();
        if self.to_markdown {
            out = Self::markdownify(&out);
        }

        out = TAG
            .replace_all(&out, |caps: &Captures| {
                let name = caps[1].to_ascii_lowercase();
                if self.preserve_tags.contains(&name) {
                    caps[0].to_string()
                } else {
                    String::new()
                }
            })
            .into_owned();

        for (entity, replacement) in ENTITIES {
            out = out.replace(entity, replacement);
        }

        Ok(out.trim().to_string())
    }
}

/// Collapse every run of whitespace (including newlines) into one space.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeWhitespace;

impl NormalizeWhitespace {
    pub fn new() -> Self {
        Self
    }
}

impl Operation for NormalizeWhitespace {
    fn name(&self) -> &str {
        "normalize_whitespace"
    }

    fn process(&self, text: &str) -> Result<String, RefineError> {
        Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}

/// Remove invisible characters that waste tokens.
#[derive(Debug, Clone, Copy)]
pub struct FixUnicode {
    remove_zero_width: bool,
    remove_control_chars: bool,
}

impl FixUnicode {
    pub fn new() -> Self {
        Self {
            remove_zero_width: true,
            remove_control_chars: true,
        }
    }

    pub fn remove_zero_width(mut self, enabled: bool) -> Self {
        self.remove_zero_width = enabled;
        self
    }

    /// Drop control characters other than `\n`, `\r` and `\t`.
    pub fn remove_control_chars(mut self, enabled: bool) -> Self {
        self.remove_control_chars = enabled;
        self
    }

    fn keep(&self, c: char) -> bool {
        let zero_width = matches!(
            c,
            '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}'
        );
        if zero_width {
            return !self.remove_zero_width;
        }
        if c.is_control() && !matches!(c, '\n' | '\r' | '\t') {
            return !self.remove_control_chars;
        }
        true
    }
}

impl Default for FixUnicode {
    fn default() -> Self {
        Self::new()
    }
}

impl Operation for FixUnicode {
    fn name(&self) -> &str {
        "fix_unicode"
    }

    fn process(&self, text: &str) -> Result<String, RefineError> {
        Ok(text.chars().filter(|&c| self.keep(c)).collect())
    }
}
