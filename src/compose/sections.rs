//! Section nodes: static members, plain fields, and declared views.

use crate::error::DerivationError;
use crate::node::{Child, Children, Entry, Node, StructureHint, Window, isolate};
use crate::spec::{Derivation, ViewBody, ViewSpec};
use crate::summary::Summary;
use crate::value::Introspect;

/// Label of the entry standing in for a custom view that failed.
const ERROR_LABEL: &str = "<error>";

/// Class-level members of the value's type, or `None` when there are none to
/// show (including backends that cannot enumerate them).
pub fn static_section<V: Introspect>(value: &V) -> Option<StaticSection<V>> {
    match value.static_members() {
        Ok(members) if !members.is_empty() => Some(StaticSection { members }),
        Ok(_) => None,
        Err(e) => {
            tracing::trace!("no static section for {}: {}", value.declared_type_name(), e);
            None
        }
    }
}

pub struct StaticSection<V> {
    members: Vec<(String, V)>,
}

impl<V: Introspect> Node<V> for StaticSection<V> {
    fn stringify(&self) -> Option<String> {
        None
    }

    fn children(&self, window: Window) -> Children<'_, V> {
        let range = window.range(self.members.len());
        Box::new(
            self.members[range]
                .iter()
                .map(|(name, v)| Entry::ok(name.clone(), Child::Value(v.clone()))),
        )
    }

    fn structure_hint(&self) -> StructureHint {
        StructureHint::MapLike
    }
}

/// The value's own instance fields under the printer's summary.
pub struct RawSection<V> {
    value: V,
    summary: Option<Summary<V>>,
}

impl<V: Introspect> RawSection<V> {
    pub fn new(value: V, summary: Option<Summary<V>>) -> Self {
        Self { value, summary }
    }
}

impl<V: Introspect> Node<V> for RawSection<V> {
    fn stringify(&self) -> Option<String> {
        self.summary.as_ref().and_then(|s| s.format(&self.value))
    }

    fn children(&self, window: Window) -> Children<'_, V> {
        Box::new(field_entries(&self.value, window))
    }
}

/// Instance fields of `value` as plain entries. Values without fields yield
/// nothing.
pub fn field_entries<V: Introspect>(
    value: &V,
    window: Window,
) -> impl Iterator<Item = Entry<V>> + use<V> {
    let fields = match value.instance_fields() {
        Ok(fields) => fields,
        Err(e) => {
            tracing::trace!("no instance fields for {}: {}", value.declared_type_name(), e);
            Vec::new()
        }
    };
    let range = window.range(fields.len());
    fields
        .into_iter()
        .skip(range.start)
        .take(range.len())
        .map(|(name, v)| Entry::ok(name, Child::Value(v)))
}

/// A view declared as `(label, derivation)` pairs. Each derivation runs only
/// when its slot is pulled.
pub struct DerivedView<V> {
    value: V,
    name: String,
    summary: Option<Summary<V>>,
    nodes: Vec<(String, Derivation<V>)>,
}

impl<V: Introspect> Node<V> for DerivedView<V> {
    fn stringify(&self) -> Option<String> {
        self.summary.as_ref().and_then(|s| s.format(&self.value))
    }

    fn children(&self, window: Window) -> Children<'_, V> {
        let range = window.range(self.nodes.len());
        Box::new(self.nodes[range].iter().map(move |(label, derivation)| {
            match derivation.eval(&self.value) {
                Ok(child) => Entry::ok(label.clone(), child),
                Err(e) => {
                    tracing::warn!("view <{}> node {:?} failed: {}", self.name, label, e);
                    Entry::failed(label.clone(), e)
                }
            }
        }))
    }
}

/// A hand-written view node, shown under the view's summary.
pub struct CustomView<V> {
    inner: Box<dyn Node<V>>,
    summary: Option<Summary<V>>,
    value: V,
}

impl<V: Introspect> Node<V> for CustomView<V> {
    fn stringify(&self) -> Option<String> {
        self.summary.as_ref().and_then(|s| s.format(&self.value))
    }

    fn children(&self, window: Window) -> Children<'_, V> {
        match isolate(|| Ok(self.inner.children(window))) {
            Ok(children) => Box::new(Guarded {
                inner: Some(children),
            }),
            Err(e) => {
                tracing::warn!("custom view children failed: {}", e);
                window.apply(std::iter::once(Entry::failed(ERROR_LABEL, e)))
            }
        }
    }

    fn structure_hint(&self) -> StructureHint {
        isolate(|| Ok(self.inner.structure_hint())).unwrap_or_default()
    }
}

/// Runs each `next` of an author-written iterator under [`isolate`]. A panic
/// becomes one error entry and ends the sequence.
struct Guarded<'a, V> {
    inner: Option<Children<'a, V>>,
}

impl<V> Iterator for Guarded<'_, V> {
    type Item = Entry<V>;

    fn next(&mut self) -> Option<Entry<V>> {
        let children = self.inner.as_mut()?;
        match isolate(|| Ok(children.next())) {
            Ok(Some(entry)) => Some(entry),
            Ok(None) => {
                self.inner = None;
                None
            }
            Err(e) => {
                tracing::warn!("custom view child failed: {}", e);
                self.inner = None;
                Some(Entry::failed(ERROR_LABEL, e))
            }
        }
    }
}

/// Stand-in for a custom view whose factory failed; shows the failure as its
/// only child.
pub struct FailedView<V> {
    error: DerivationError,
    summary: Option<Summary<V>>,
    value: V,
}

impl<V: Introspect> Node<V> for FailedView<V> {
    fn stringify(&self) -> Option<String> {
        self.summary.as_ref().and_then(|s| s.format(&self.value))
    }

    fn children(&self, window: Window) -> Children<'_, V> {
        let range = window.range(1);
        Box::new(range.map(move |_| Entry::failed(ERROR_LABEL, self.error.clone())))
    }
}

/// Build the node for one view.
///
/// `summary` is the label for the section; the composer passes the view's own
/// summary for view sections and the printer summary when the view fills the
/// raw section.
pub fn build_view<V: Introspect>(
    value: &V,
    view: &ViewSpec<V>,
    summary: Option<Summary<V>>,
) -> Box<dyn Node<V>> {
    match &view.body {
        ViewBody::Nodes(nodes) => Box::new(DerivedView {
            value: value.clone(),
            name: view.name.clone(),
            summary,
            nodes: nodes.clone(),
        }),
        ViewBody::Custom(factory) => match isolate(|| factory(value)) {
            Ok(inner) => Box::new(CustomView {
                inner,
                summary,
                value: value.clone(),
            }),
            Err(error) => {
                tracing::warn!("view <{}> node factory failed: {}", view.name, error);
                Box::new(FailedView {
                    error,
                    summary,
                    value: value.clone(),
                })
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{computed, field};
    use crate::value::{Snapshot, TypeTable};
    use anyhow::bail;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn color() -> Snapshot {
        Snapshot::structure(
            "ColorRGBA",
            [
                ("r", Snapshot::int(34)),
                ("g", Snapshot::int(139)),
                ("b", Snapshot::int(34)),
                ("a", Snapshot::int(255)),
            ],
        )
    }

    fn listing(node: &dyn Node<Snapshot>, window: Window) -> Vec<(String, String)> {
        node.children(window)
            .map(|e| (e.label.clone(), e.display()))
            .collect()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn static_section_only_when_members_exist() {
        assert!(static_section(&color()).is_none());
        assert!(static_section(&Snapshot::int(1)).is_none());

        let mut table = TypeTable::new();
        table.declare_statics("ColorRGBA", [("instance_count", Snapshot::int(3))]);
        let c = color().with_types(Arc::new(table));
        let section = static_section(&c).unwrap();

        assert_eq!(section.stringify(), None);
        assert_eq!(section.structure_hint(), StructureHint::MapLike);
        assert_eq!(
            listing(&section, Window::ALL),
            pairs(&[("instance_count", "3")])
        );
    }

    #[test]
    fn raw_section_lists_fields_in_order() {
        let raw = RawSection::new(color(), Some(crate::summary::summary(true, true)));
        assert_eq!(
            raw.stringify().as_deref(),
            Some("ColorRGBA {r=34, g=139, b=34, a=255}")
        );
        assert_eq!(
            listing(&raw, Window::page(1, 2)),
            pairs(&[("g", "139"), ("b", "34")])
        );
    }

    #[test]
    fn failing_derivation_keeps_its_slot() {
        let view = ViewSpec::nodes(
            "Alpha",
            [
                ("raw", field("a")),
                ("missing", field("q")),
                ("broken", computed(|_: &Snapshot| -> anyhow::Result<i64> { bail!("bad") })),
                ("normalized", crate::spec::scaled("a", 1.0 / 255.0)),
            ],
        );
        let node = build_view(&color(), &view, None);
        assert_eq!(
            listing(node.as_ref(), Window::ALL),
            pairs(&[
                ("raw", "255"),
                ("missing", "<error: no field \"q\" in ColorRGBA>"),
                ("broken", "<error: bad>"),
                ("normalized", "1.0"),
            ])
        );
    }

    #[test]
    fn derivations_run_only_when_pulled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = |calls: &Arc<AtomicUsize>| {
            let calls = Arc::clone(calls);
            computed(move |_: &Snapshot| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(1i64)
            })
        };
        let view = ViewSpec::nodes(
            "Counted",
            [("a", counted(&calls)), ("b", counted(&calls)), ("c", counted(&calls))],
        );
        let node = build_view(&color(), &view, None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let mut children = node.children(Window::ALL);
        children.next();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        drop(children);

        // Jumping to the last slot skips the earlier derivations entirely.
        let last: Vec<_> = node.children(Window::page(2, 1)).collect();
        assert_eq!(last.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn enumeration_is_restartable() {
        let view = ViewSpec::nodes("Alpha", [("raw", field("a")), ("r", field("r"))]);
        let node = build_view(&color(), &view, None);
        assert_eq!(
            listing(node.as_ref(), Window::ALL),
            listing(node.as_ref(), Window::ALL)
        );
    }

    struct Components(Snapshot);

    impl Node<Snapshot> for Components {
        fn stringify(&self) -> Option<String> {
            Some("ignored".into())
        }

        fn children(&self, window: Window) -> Children<'_, Snapshot> {
            let names = [("red", "r"), ("green", "g"), ("blue", "b")];
            window.apply(names.into_iter().map(move |(label, f)| {
                match self.0.get_field(f) {
                    Ok(v) => Entry::ok(label, Child::Value(v)),
                    Err(e) => Entry::failed(label, DerivationError::new(e.to_string())),
                }
            }))
        }

        fn structure_hint(&self) -> StructureHint {
            StructureHint::MapLike
        }
    }

    #[test]
    fn custom_view_uses_view_summary() {
        let view = ViewSpec::custom("Components", |v: &Snapshot| Ok(Components(v.clone())));
        let node = build_view(&color(), &view, Some(Summary::fixed("rgb")));
        assert_eq!(node.stringify().as_deref(), Some("rgb"));
        assert_eq!(node.structure_hint(), StructureHint::MapLike);
        assert_eq!(
            listing(node.as_ref(), Window::ALL),
            pairs(&[("red", "34"), ("green", "139"), ("blue", "34")])
        );

        let unlabeled = build_view(&color(), &view, None);
        assert_eq!(unlabeled.stringify(), None);
    }

    /// Yields `good` entries, then panics on the next pull.
    struct Exploding {
        good: usize,
        in_children: bool,
    }

    impl Node<Snapshot> for Exploding {
        fn stringify(&self) -> Option<String> {
            None
        }

        fn children(&self, window: Window) -> Children<'_, Snapshot> {
            if self.in_children {
                panic!("custom node blew up");
            }
            let good = self.good;
            window.apply((0..).map(move |i| {
                if i == good {
                    panic!("row {} blew up", i);
                }
                Entry::ok(format!("[{}]", i), Child::scalar(i as i64))
            }))
        }

        fn structure_hint(&self) -> StructureHint {
            panic!("no hint")
        }
    }

    #[test]
    fn panicking_children_are_contained() {
        let view = ViewSpec::custom("Exploding", |_: &Snapshot| {
            Ok(Exploding {
                good: 0,
                in_children: true,
            })
        });
        let node = build_view(&color(), &view, None);
        assert_eq!(node.structure_hint(), StructureHint::None);

        let entries: Vec<_> = node.children(Window::ALL).collect();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_error());
        assert_eq!(
            entries[0].display(),
            "<error: panicked: custom node blew up>"
        );
    }

    #[test]
    fn panicking_row_ends_enumeration() {
        let view = ViewSpec::custom("Exploding", |_: &Snapshot| {
            Ok(Exploding {
                good: 2,
                in_children: false,
            })
        });
        let node = build_view(&color(), &view, None);
        assert_eq!(
            listing(node.as_ref(), Window::ALL),
            pairs(&[
                ("[0]", "0"),
                ("[1]", "1"),
                ("<error>", "<error: panicked: row 2 blew up>"),
            ])
        );
    }

    #[test]
    fn failing_factory_is_contained() {
        let view = ViewSpec::custom("Broken", |_: &Snapshot| -> anyhow::Result<Components> {
            bail!("cannot build")
        });
        let node = build_view(&color(), &view, None);
        assert_eq!(
            listing(node.as_ref(), Window::ALL),
            pairs(&[("<error>", "<error: cannot build>")])
        );
    }
}
