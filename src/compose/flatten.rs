//! Built-in custom node: every nested instance field, one line each.

use crate::node::{Child, Children, Entry, Node, StructureHint, Window};
use crate::value::Introspect;

/// Nesting deeper than this is shown as the aggregate's own rendering.
const MAX_DEPTH: usize = 8;

/// Lists all leaf fields under dotted labels (`origin.x`, `origin.y`, ...).
pub struct FlattenNode<V> {
    value: V,
}

impl<V: Introspect> FlattenNode<V> {
    pub fn new(value: V) -> Self {
        Self { value }
    }
}

impl<V: Introspect> Node<V> for FlattenNode<V> {
    fn stringify(&self) -> Option<String> {
        None
    }

    fn children(&self, window: Window) -> Children<'_, V> {
        window.apply(Leaves::new(&self.value))
    }

    fn structure_hint(&self) -> StructureHint {
        StructureHint::MapLike
    }
}

/// Depth-first walk. Each call to `next` expands only as far as the next leaf.
struct Leaves<V> {
    stack: Vec<(String, V, usize)>,
}

impl<V: Introspect> Leaves<V> {
    fn new(root: &V) -> Self {
        let mut stack = Vec::new();
        if let Ok(fields) = root.instance_fields() {
            stack.extend(fields.into_iter().rev().map(|(n, v)| (n, v, 1)));
        }
        Self { stack }
    }
}

impl<V: Introspect> Iterator for Leaves<V> {
    type Item = Entry<V>;

    fn next(&mut self) -> Option<Entry<V>> {
        while let Some((label, value, depth)) = self.stack.pop() {
            let nested = match value.instance_fields() {
                Ok(fields) if !fields.is_empty() && depth < MAX_DEPTH => fields,
                _ => return Some(Entry::ok(label, Child::Value(value))),
            };
            self.stack.extend(
                nested
                    .into_iter()
                    .rev()
                    .map(|(n, v)| (format!("{}.{}", label, n), v, depth + 1)),
            );
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Snapshot;
    use pretty_assertions::assert_eq;

    fn rect() -> Snapshot {
        let point = |x, y| {
            Snapshot::structure("Point", [("x", Snapshot::int(x)), ("y", Snapshot::int(y))])
        };
        Snapshot::structure(
            "Rect",
            [
                ("origin", point(1, 2)),
                ("size", point(3, 4)),
                ("tag", Snapshot::structure("Tag", [])),
                ("visible", Snapshot::boolean(true)),
            ],
        )
    }

    fn flat(window: Window) -> Vec<(String, String)> {
        FlattenNode::new(rect())
            .children(window)
            .map(|e| (e.label.clone(), e.display()))
            .collect()
    }

    #[test]
    fn walks_depth_first_in_declaration_order() {
        let expected: Vec<(String, String)> = [
            ("origin.x", "1"),
            ("origin.y", "2"),
            ("size.x", "3"),
            ("size.y", "4"),
            ("tag", "{}"),
            ("visible", "true"),
        ]
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect();
        assert_eq!(flat(Window::ALL), expected);
    }

    #[test]
    fn windowed_walk() {
        let labels: Vec<String> = flat(Window::page(3, 2))
            .into_iter()
            .map(|(l, _)| l)
            .collect();
        assert_eq!(labels, vec!["size.y", "tag"]);
    }
}
