//! Node protocol: the three operations every tree node exposes to the host
//! inspector.
//!
//! A node is built fresh for each inspection from a value handle and holds no
//! evaluation state of its own. `children` re-derives everything on each call,
//! so a second enumeration replays the first against the same value.

use crate::error::DerivationError;
use crate::value::{Introspect, Scalar};

use std::ops::Range;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Advisory layout hint. Never changes what the children are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StructureHint {
    #[default]
    None,
    MapLike,
    ArrayLike,
}

/// Which children a request asks for.
///
/// Hosts currently ask for everything; the offset/count shape is there so
/// paged enumeration of large containers can be added without changing the
/// protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: usize,
    pub count: Option<usize>,
}

impl Window {
    pub const ALL: Window = Window {
        offset: 0,
        count: None,
    };

    pub fn page(offset: usize, count: usize) -> Self {
        Self {
            offset,
            count: Some(count),
        }
    }

    /// Index range this window selects out of `len` children.
    pub fn range(&self, len: usize) -> Range<usize> {
        let start = self.offset.min(len);
        let end = match self.count {
            Some(n) => start.saturating_add(n).min(len),
            None => len,
        };
        start..end
    }

    /// Apply to an already-lazy iterator. Skipped items are still pulled, so
    /// only use this where producing an item is cheap.
    pub fn apply<'a, T: 'a>(
        &self,
        iter: impl Iterator<Item = T> + 'a,
    ) -> Box<dyn Iterator<Item = T> + 'a> {
        let it = iter.skip(self.offset);
        match self.count {
            Some(n) => Box::new(it.take(n)),
            None => Box::new(it),
        }
    }
}

impl Default for Window {
    fn default() -> Self {
        Window::ALL
    }
}

/// What sits behind one child slot.
pub enum Child<V> {
    /// A value read from the debuggee; the host may look up a printer for it.
    Value(V),
    /// A value computed by a derivation.
    Scalar(Scalar),
    /// A synthetic grouping node.
    Node(Box<dyn Node<V>>),
}

impl<V> Child<V> {
    pub fn node(node: impl Node<V> + 'static) -> Self {
        Child::Node(Box::new(node))
    }

    pub fn scalar(v: impl Into<Scalar>) -> Self {
        Child::Scalar(v.into())
    }
}

impl<V: Introspect> Child<V> {
    /// Trailing text the inspector shows for this child's line.
    pub fn display(&self) -> String {
        match self {
            Child::Value(v) => v.render(),
            Child::Scalar(s) => s.to_string(),
            Child::Node(n) => n.stringify().unwrap_or_default(),
        }
    }
}

impl<V> std::fmt::Debug for Child<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Child::Value(_) => f.write_str("Child::Value(..)"),
            Child::Scalar(s) => write!(f, "Child::Scalar({:?})", s),
            Child::Node(n) => write!(f, "Child::Node({:?})", n.stringify()),
        }
    }
}

/// One labelled child. A failed derivation still occupies its slot.
#[derive(Debug)]
pub struct Entry<V> {
    pub label: String,
    pub child: Result<Child<V>, DerivationError>,
}

impl<V> Entry<V> {
    pub fn ok(label: impl Into<String>, child: Child<V>) -> Self {
        Self {
            label: label.into(),
            child: Ok(child),
        }
    }

    pub fn failed(label: impl Into<String>, err: DerivationError) -> Self {
        Self {
            label: label.into(),
            child: Err(err),
        }
    }

    pub fn is_error(&self) -> bool {
        self.child.is_err()
    }
}

impl<V: Introspect> Entry<V> {
    pub fn display(&self) -> String {
        match &self.child {
            Ok(c) => c.display(),
            Err(e) => e.marker(),
        }
    }
}

pub type Children<'a, V> = Box<dyn Iterator<Item = Entry<V>> + 'a>;

pub trait Node<V> {
    /// Text for the node's own line; `None` leaves only the structure.
    fn stringify(&self) -> Option<String>;

    /// Children selected by `window`, computed one at a time as the consumer
    /// pulls them.
    fn children(&self, window: Window) -> Children<'_, V>;

    fn structure_hint(&self) -> StructureHint {
        StructureHint::None
    }
}

/// Run author-supplied code, turning both returned errors and panics into a
/// `DerivationError`.
pub fn isolate<T>(f: impl FnOnce() -> anyhow::Result<T>) -> Result<T, DerivationError> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(v)) => Ok(v),
        Ok(Err(e)) => Err(DerivationError::from(e)),
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic".to_string());
            Err(DerivationError::new(format!("panicked: {}", msg)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn window_range_clamps() {
        assert_eq!(Window::ALL.range(4), 0..4);
        assert_eq!(Window::page(1, 2).range(4), 1..3);
        assert_eq!(Window::page(3, 10).range(4), 3..4);
        assert_eq!(Window::page(9, 1).range(4), 4..4);
    }

    #[test]
    fn window_apply_skips_and_takes() {
        let v: Vec<i32> = Window::page(1, 2).apply(0..10).collect();
        assert_eq!(v, vec![1, 2]);
    }

    #[test]
    fn isolate_converts_errors() {
        let err = isolate::<()>(|| Err(anyhow!("no field"))).unwrap_err();
        assert_eq!(err.message, "no field");
        assert_eq!(err.marker(), "<error: no field>");
    }

    #[test]
    fn isolate_catches_panics() {
        let err = isolate::<()>(|| panic!("boom")).unwrap_err();
        assert_eq!(err.message, "panicked: boom");
    }
}
