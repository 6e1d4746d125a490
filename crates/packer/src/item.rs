//! Candidate items and their stored form.

use refiner_core::{Operation, Priority, Role};
use serde::{Deserialize, Serialize};
use std::cell::Cell;

/// Content offered to the packer, before refinement and measurement.
///
/// ```
/// use refiner_packer::Candidate;
/// use refiner_core::{Role, PRIORITY_SYSTEM};
///
/// let c = Candidate::new("You are helpful.")
///     .with_role(Role::System)
///     .with_priority(PRIORITY_SYSTEM);
/// assert_eq!(c.priority(), PRIORITY_SYSTEM);
/// ```
pub struct Candidate {
    pub(crate) content: String,
    pub(crate) role: Option<Role>,
    pub(crate) priority: Option<Priority>,
    pub(crate) refine: Vec<Box<dyn Operation>>,
}

impl Candidate {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: None,
            priority: None,
            refine: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Override the role-derived default priority. Lower wins.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Apply `op` to the content before it is measured.
    ///
    /// Repeated calls run in the order they were made.
    pub fn refine_with(mut self, op: impl Operation + 'static) -> Self {
        self.refine.push(Box::new(op));
        self
    }

    /// The priority this candidate will be stored with.
    pub fn priority(&self) -> Priority {
        self.priority
            .unwrap_or_else(|| Role::priority_for(self.role))
    }
}

impl From<&str> for Candidate {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

impl From<String> for Candidate {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}

impl std::fmt::Debug for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate")
            .field("content", &self.content)
            .field("role", &self.role)
            .field("priority", &self.priority)
            .field(
                "refine",
                &self.refine.iter().map(|op| op.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// An item held by the packer: refined content plus its measured size.
///
/// `content_tokens` excludes render overhead, which depends on the mode
/// and is added at selection time.
#[derive(Debug)]
pub(crate) struct Item {
    pub sequence: u64,
    pub role: Option<Role>,
    pub priority: Priority,
    pub content: String,
    pub content_tokens: usize,
    /// Cost (content + overhead) from the most recent render.
    pub last_cost: Cell<Option<usize>>,
}

impl Item {
    pub fn info(&self) -> ItemInfo {
        ItemInfo {
            sequence: self.sequence,
            role: self.role,
            priority: self.priority,
            content: self.content.clone(),
            content_tokens: self.content_tokens,
            last_cost: self.last_cost.get(),
        }
    }
}

/// Read-only snapshot of a stored item, for introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInfo {
    pub sequence: u64,
    pub role: Option<Role>,
    pub priority: Priority,
    pub content: String,
    pub content_tokens: usize,
    /// `None` until the item has been through a render.
    pub last_cost: Option<usize>,
}

/// An item that made it into a render, with the cost it was charged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedItem {
    pub sequence: u64,
    pub role: Option<Role>,
    pub priority: Priority,
    pub content: String,
    pub cost: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use refiner_core::{from_fn, PRIORITY_HIGH, PRIORITY_LOW, PRIORITY_USER};

    #[test]
    fn priority_defaults_from_role() {
        assert_eq!(Candidate::new("q").with_role(Role::Query).priority(), PRIORITY_USER);
        assert_eq!(Candidate::new("doc").priority(), PRIORITY_HIGH);
    }

    #[test]
    fn explicit_priority_wins() {
        let c = Candidate::new("x")
            .with_role(Role::System)
            .with_priority(PRIORITY_LOW);
        assert_eq!(c.priority(), PRIORITY_LOW);
    }

    #[test]
    fn negative_priorities_are_legal() {
        assert_eq!(Candidate::new("x").with_priority(-5).priority(), -5);
    }

    #[test]
    fn from_str_and_string() {
        let a: Candidate = "text".into();
        let b: Candidate = String::from("text").into();
        assert_eq!(a.content, b.content);
        assert!(a.role.is_none());
    }

    #[test]
    fn debug_lists_refine_steps() {
        let c = Candidate::new("x").refine_with(from_fn("trim", |s: &str| s.trim().to_string()));
        assert!(format!("{c:?}").contains("trim"));
    }

    #[test]
    fn info_reflects_last_cost() {
        let item = Item {
            sequence: 3,
            role: None,
            priority: PRIORITY_HIGH,
            content: "abc".into(),
            content_tokens: 1,
            last_cost: Cell::new(None),
        };
        assert_eq!(item.info().last_cost, None);
        item.last_cost.set(Some(4));
        let info = item.info();
        assert_eq!(info.last_cost, Some(4));
        assert_eq!(info.sequence, 3);
    }
}
