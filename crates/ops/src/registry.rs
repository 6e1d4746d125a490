//! Build operations from configuration.
//!
//! Each `[[refine]]` table in the config file names an operation by `kind`
//! and carries its options inline:
//!
//! ```toml
//! [[refine]]
//! kind = "strip_html"
//! to_markdown = true
//!
//! [[refine]]
//! kind = "truncate_tokens"
//! max_tokens = 200
//! strategy = "middle_out"
//!
//! [[refine]]
//! kind = "redact_pii"
//! types = ["email", "phone"]
//! patterns = { employee_id = { pattern = "EMP-\\d{6}", replacement = "[EMPLOYEE]" } }
//! ```

use crate::{
    Deduplicate, FixUnicode, Granularity, NormalizeWhitespace, PiiKind, RedactPii, Refiner,
    SimilarityMethod, StripHtml, TruncateStrategy, TruncateTokens,
};
use refiner_config::OperationConfig;
use refiner_core::{Operation, RefineError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

/// Operation kinds understood by [`build_operation`].
pub const KINDS: &[&str] = &[
    "strip_html",
    "normalize_whitespace",
    "fix_unicode",
    "truncate_tokens",
    "deduplicate",
    "redact_pii",
];

/// One entry of `redact_pii`'s `patterns` table.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CustomPatternConfig {
    pattern: String,
    #[serde(default = "default_replacement")]
    replacement: String,
}

fn default_replacement() -> String {
    "[REDACTED]".into()
}

/// Typed access to an operation's options. Rejects keys nobody asked for.
struct Options<'a> {
    kind: &'a str,
    config: &'a OperationConfig,
    seen: HashSet<&'a str>,
}

impl<'a> Options<'a> {
    fn new(config: &'a OperationConfig) -> Self {
        Self {
            kind: &config.kind,
            config,
            seen: HashSet::new(),
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> RefineError {
        RefineError::InvalidOperation {
            operation: self.kind.to_string(),
            reason: reason.into(),
        }
    }

    fn get<T: DeserializeOwned>(&mut self, key: &'static str) -> Result<Option<T>, RefineError> {
        self.seen.insert(key);
        match self.config.options.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| self.invalid(format!("option '{key}': {e}"))),
        }
    }

    fn require<T: DeserializeOwned>(&mut self, key: &'static str) -> Result<T, RefineError> {
        self.get(key)?
            .ok_or_else(|| self.invalid(format!("missing required option '{key}'")))
    }

    fn finish(self) -> Result<(), RefineError> {
        let mut unknown: Vec<&str> = self
            .config
            .options
            .keys()
            .map(String::as_str)
            .filter(|k| !self.seen.contains(k))
            .collect();
        if unknown.is_empty() {
            return Ok(());
        }
        unknown.sort_unstable();
        Err(self.invalid(format!("unknown option(s): {}", unknown.join(", "))))
    }
}

/// Construct a single operation from its configuration.
pub fn build_operation(config: &OperationConfig) -> Result<Box<dyn Operation>, RefineError> {
    let mut opts = Options::new(config);

    let op: Box<dyn Operation> = match config.kind.as_str() {
        "strip_html" => {
            let mut op = StripHtml::new();
            if let Some(md) = opts.get::<bool>("to_markdown")? {
                op = op.to_markdown(md);
            }
            if let Some(tags) = opts.get::<Vec<String>>("preserve_tags")? {
                op = op.preserve_tags(tags);
            }
            Box::new(op)
        }
        "normalize_whitespace" => Box::new(NormalizeWhitespace::new()),
        "fix_unicode" => {
            let mut op = FixUnicode::new();
            if let Some(v) = opts.get::<bool>("remove_zero_width")? {
                op = op.remove_zero_width(v);
            }
            if let Some(v) = opts.get::<bool>("remove_control_chars")? {
                op = op.remove_control_chars(v);
            }
            Box::new(op)
        }
        "truncate_tokens" => {
            let mut op = TruncateTokens::new(opts.require::<usize>("max_tokens")?);
            if let Some(s) = opts.get::<TruncateStrategy>("strategy")? {
                op = op.strategy(s);
            }
            if let Some(v) = opts.get::<bool>("respect_sentence_boundary")? {
                op = op.respect_sentence_boundary(v);
            }
            Box::new(op)
        }
        "deduplicate" => {
            let mut op = Deduplicate::new();
            if let Some(t) = opts.get::<f64>("similarity_threshold")? {
                if !(0.0..=1.0).contains(&t) {
                    return Err(opts.invalid(format!(
                        "similarity_threshold must be within 0.0..=1.0 (got {t})"
                    )));
                }
                op = op.threshold(t);
            }
            if let Some(m) = opts.get::<SimilarityMethod>("method")? {
                op = op.method(m);
            }
            if let Some(g) = opts.get::<Granularity>("granularity")? {
                op = op.granularity(g);
            }
            Box::new(op)
        }
        "redact_pii" => {
            let mut op = match opts.get::<Vec<PiiKind>>("types")? {
                Some(kinds) => RedactPii::only(&kinds),
                None => RedactPii::new(),
            };
            // BTreeMap: custom patterns apply in name order.
            let patterns = opts
                .get::<BTreeMap<String, CustomPatternConfig>>("patterns")?
                .unwrap_or_default();
            for (name, custom) in patterns {
                op = op.with_pattern(name, &custom.pattern, custom.replacement)?;
            }
            Box::new(op)
        }
        other => return Err(RefineError::UnknownOperation(other.to_string())),
    };

    opts.finish()?;
    tracing::debug!(kind = %config.kind, "Built refinement operation");
    Ok(op)
}

/// Construct a pipeline from an ordered list of operation configs.
pub fn build_refiner(configs: &[OperationConfig]) -> Result<Refiner, RefineError> {
    let mut refiner = Refiner::new();
    for config in configs {
        refiner.push(build_operation(config)?);
    }
    Ok(refiner)
}
