//! Operation trait — the abstraction over text refinement.
//!
//! Operations are what let the packer clean, compress, or scrub an item
//! before it is measured: strip HTML, collapse whitespace, redact PII, etc.

use crate::error::RefineError;

/// The core refinement trait.
///
/// Each operation (strip_html, normalize_whitespace, truncate_tokens, ...)
/// implements this trait. Operations are applied left-to-right and must
/// report failures instead of passing text through unchanged, since a
/// silently skipped step would corrupt downstream token accounting.
pub trait Operation {
    /// The unique name of this operation (e.g., "strip_html").
    fn name(&self) -> &str;

    /// Transform the input text.
    fn process(&self, text: &str) -> std::result::Result<String, RefineError>;
}

impl<T: Operation + ?Sized> Operation for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn process(&self, text: &str) -> std::result::Result<String, RefineError> {
        (**self).process(text)
    }
}

/// An operation backed by a plain `Fn(&str) -> String`.
pub struct FnOperation<F> {
    name: String,
    f: F,
}

impl<F> Operation for FnOperation<F>
where
    F: Fn(&str) -> String,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, text: &str) -> std::result::Result<String, RefineError> {
        Ok((self.f)(text))
    }
}

/// Wrap a closure as a named [`Operation`].
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnOperation<F>
where
    F: Fn(&str) -> String,
{
    FnOperation {
        name: name.into(),
        f,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_operation_processes_text() {
        let op = from_fn("upper", |s| s.to_uppercase());
        assert_eq!(op.name(), "upper");
        assert_eq!(op.process("hello").unwrap(), "HELLO");
    }

    #[test]
    fn boxed_operation_delegates() {
        let op: Box<dyn Operation> = Box::new(from_fn("trim", |s| s.trim().to_string()));
        assert_eq!(op.name(), "trim");
        assert_eq!(op.process("  x  ").unwrap(), "x");
    }
}
