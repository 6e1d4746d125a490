//! Sequential composition of operations.

use refiner_core::{Operation, RefineError};

/// Runs a chain of operations, feeding each one the previous output.
///
/// A `Refiner` is itself an [`Operation`], so pipelines nest and can be
/// handed to the packer like any single operation.
#[derive(Default)]
pub struct Refiner {
    ops: Vec<Box<dyn Operation>>,
}

impl Refiner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation, builder style.
    pub fn pipe(mut self, op: impl Operation + 'static) -> Self {
        self.ops.push(Box::new(op));
        self
    }

    pub fn push(&mut self, op: Box<dyn Operation>) {
        self.ops.push(op);
    }

    /// Apply every operation in order. Stops at the first failure.
    pub fn run(&self, text: &str) -> Result<String, RefineError> {
        let mut current = text.to_string();
        for op in &self.ops {
            let before = current.len();
            current = op.process(&current)?;
            tracing::trace!(
                operation = op.name(),
                bytes_before = before,
                bytes_after = current.len(),
                "Refine step"
            );
        }
        Ok(current)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Operation names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.ops.iter().map(|op| op.name()).collect()
    }
}

impl std::fmt::Debug for Refiner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Refiner")
            .field("ops", &self.names())
            .finish()
    }
}

impl Operation for Refiner {
    fn name(&self) -> &str {
        "refiner"
    }

    fn process(&self, text: &str) -> Result<String, RefineError> {
        self.run(text)
    }
}
