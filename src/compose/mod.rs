//! View-set composition: turns a printer declaration and a value into the
//! top-level node the inspector shows.
//!
//! Top-level order:
//! 1. `<Static>` when the type has class-level members
//! 2. `<Raw>` (plain fields, or the default view's content) under the printer
//!    summary
//! 3. every other view, in declared order
//!
//! A printer without views skips the sections: fields go directly under the
//! value, after `<Static>` if there is one.

pub mod flatten;
pub mod sections;

pub use flatten::FlattenNode;
pub use sections::{RawSection, StaticSection, build_view, static_section};

use crate::node::{Child, Children, Entry, Node, Window};
use crate::spec::{PrinterSpec, ViewSpec};
use crate::value::Introspect;

use std::sync::Arc;

pub const STATIC_LABEL: &str = "<Static>";
pub const RAW_LABEL: &str = "<Raw>";

/// Header label for a named view section.
pub fn section_label(name: &str) -> String {
    format!("<{}>", name)
}

/// Root node for one inspected value with a matched printer.
pub struct PrinterNode<V> {
    value: V,
    spec: Arc<PrinterSpec<V>>,
}

/// Compose the node tree for `value` under `spec`.
pub fn compose<V: Introspect>(value: V, spec: Arc<PrinterSpec<V>>) -> PrinterNode<V> {
    PrinterNode { value, spec }
}

/// One top-level slot, decided before any section content is evaluated.
enum Slot<'a, V> {
    Static(StaticSection<V>),
    Raw,
    View(&'a ViewSpec<V>),
    Field(String, V),
}

impl<V: Introspect> PrinterNode<V> {
    fn layout(&self) -> Vec<Slot<'_, V>> {
        let mut slots = Vec::new();

        if let Some(statics) = static_section(&self.value) {
            slots.push(Slot::Static(statics));
        }

        if self.spec.views().is_empty() {
            match self.value.instance_fields() {
                Ok(fields) => {
                    slots.extend(fields.into_iter().map(|(name, v)| Slot::Field(name, v)))
                }
                Err(e) => tracing::trace!(
                    "no instance fields for {}: {}",
                    self.value.declared_type_name(),
                    e
                ),
            }
        } else {
            slots.push(Slot::Raw);
            slots.extend(self.spec.section_views().map(Slot::View));
        }

        tracing::debug!(
            "layout for {}: {} top-level slots (default view: {:?})",
            self.value.declared_type_name(),
            slots.len(),
            self.spec.default_view_name()
        );
        slots
    }

    fn materialize(&self, slot: Slot<'_, V>) -> Entry<V> {
        match slot {
            Slot::Static(statics) => Entry::ok(STATIC_LABEL, Child::node(statics)),
            Slot::Raw => {
                let summary = self.spec.summary_formatter().cloned();
                let node: Box<dyn Node<V>> = match self.spec.default_view_spec() {
                    Some(view) => build_view(&self.value, view, summary),
                    None => Box::new(RawSection::new(self.value.clone(), summary)),
                };
                Entry::ok(RAW_LABEL, Child::Node(node))
            }
            Slot::View(view) => Entry::ok(
                section_label(&view.name),
                Child::Node(build_view(&self.value, view, view.summary.clone())),
            ),
            Slot::Field(name, v) => Entry::ok(name, Child::Value(v)),
        }
    }
}

impl<V: Introspect> Node<V> for PrinterNode<V> {
    fn stringify(&self) -> Option<String> {
        self.spec
            .summary_formatter()
            .and_then(|s| s.format(&self.value))
    }

    fn children(&self, window: Window) -> Children<'_, V> {
        let slots = self.layout();
        let range = window.range(slots.len());
        Box::new(
            slots
                .into_iter()
                .skip(range.start)
                .take(range.len())
                .map(move |slot| self.materialize(slot)),
        )
    }
}
