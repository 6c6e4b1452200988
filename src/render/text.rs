use crate::node::{Child, Node, Window};
use crate::registry::Registry;
use crate::value::Introspect;

use std::fmt::Write;

/// How far the renderer drives the lazy tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Levels below the root to expand.
    pub max_depth: usize,
    /// Children requested per node; `None` asks for all of them.
    pub page: Option<usize>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_depth: 4,
            page: None,
        }
    }
}

/// Render one named value as an indented tree, expanding nodes the way an
/// inspector would if the user opened every row.
///
/// Values reached through the tree get the registry's printers too; aggregates
/// without one use the default layout.
pub fn render_value<V: Introspect>(
    name: &str,
    value: &V,
    registry: &Registry<V>,
    opts: &RenderOptions,
) -> anyhow::Result<String> {
    let mut out = String::new();
    match registry.inspect_or_default(value) {
        Some(node) => write_node(&mut out, name, &node, registry, opts, 0)?,
        None => writeln!(out, "{} = {}", name, value.render())?,
    }
    Ok(out)
}

fn write_line(out: &mut String, depth: usize, label: &str, text: &str) -> std::fmt::Result {
    let indent = "  ".repeat(depth);
    if text.is_empty() {
        writeln!(out, "{}{}", indent, label)
    } else {
        writeln!(out, "{}{} = {}", indent, label, text)
    }
}

fn write_node<V: Introspect>(
    out: &mut String,
    label: &str,
    node: &dyn Node<V>,
    registry: &Registry<V>,
    opts: &RenderOptions,
    depth: usize,
) -> anyhow::Result<()> {
    write_line(out, depth, label, &node.stringify().unwrap_or_default())?;
    if depth >= opts.max_depth {
        return Ok(());
    }

    // Ask for one extra child so we know whether to print a continuation row.
    let window = match opts.page {
        Some(n) => Window::page(0, n + 1),
        None => Window::ALL,
    };
    for (i, entry) in node.children(window).enumerate() {
        if opts.page.is_some_and(|n| i == n) {
            write_line(out, depth + 1, "...", "")?;
            break;
        }
        match entry.child {
            Ok(Child::Node(child)) => {
                write_node(out, &entry.label, child.as_ref(), registry, opts, depth + 1)?
            }
            Ok(Child::Value(v)) => match registry.inspect_or_default(&v) {
                Some(printer) => {
                    write_node(out, &entry.label, &printer, registry, opts, depth + 1)?
                }
                None => write_line(out, depth + 1, &entry.label, &v.render())?,
            },
            Ok(Child::Scalar(s)) => write_line(out, depth + 1, &entry.label, &s.to_string())?,
            Err(e) => write_line(out, depth + 1, &entry.label, &e.marker())?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{PrinterSpec, ViewSpec, field};
    use crate::summary::summary;
    use crate::value::Snapshot;
    use pretty_assertions::assert_eq;

    fn line() -> Snapshot {
        let point = |x, y| {
            Snapshot::structure("Point", [("x", Snapshot::int(x)), ("y", Snapshot::int(y))])
        };
        Snapshot::structure("Line", [("a", point(0, 0)), ("b", point(3, 4))])
    }

    fn registry() -> Registry<Snapshot> {
        let mut reg = Registry::new();
        reg.add_printer(
            "Point",
            PrinterSpec::new().summary(summary(false, false)),
        )
        .unwrap();
        reg.add_printer(
            "Line",
            PrinterSpec::new()
                .summary(summary(true, true))
                .view(ViewSpec::nodes("Ends", [("end", field("b.x"))])),
        )
        .unwrap();
        reg
    }

    #[test]
    fn renders_nested_printers() {
        let text = render_value("l", &line(), &registry(), &RenderOptions::default()).unwrap();
        let expected = "\
l = Line {a={x = 0, y = 0}, b={x = 3, y = 4}}
  <Raw> = Line {a={x = 0, y = 0}, b={x = 3, y = 4}}
    a = {0, 0}
      x = 0
      y = 0
    b = {3, 4}
      x = 3
      y = 4
  <Ends>
    end = 3
";
        assert_eq!(text, expected);
    }

    #[test]
    fn depth_limit_stops_expansion() {
        let opts = RenderOptions {
            max_depth: 1,
            page: None,
        };
        let text = render_value("l", &line(), &registry(), &opts).unwrap();
        let rows: Vec<&str> = text.lines().map(|l| l.trim_start()).collect();
        assert_eq!(
            rows,
            vec![
                "l = Line {a={x = 0, y = 0}, b={x = 3, y = 4}}",
                "<Raw> = Line {a={x = 0, y = 0}, b={x = 3, y = 4}}",
                "<Ends>",
            ]
        );
    }

    #[test]
    fn paging_marks_continuation() {
        let opts = RenderOptions {
            max_depth: 1,
            page: Some(1),
        };
        let text = render_value("l", &line(), &registry(), &opts).unwrap();
        assert!(text.ends_with("  ...\n"), "{}", text);
        assert!(!text.contains("<Ends>"));
    }

    struct Panicking;

    impl Node<Snapshot> for Panicking {
        fn stringify(&self) -> Option<String> {
            None
        }

        fn children(&self, _window: Window) -> crate::node::Children<'_, Snapshot> {
            panic!("custom node blew up")
        }
    }

    #[test]
    fn broken_custom_view_leaves_siblings_rendered() {
        let mut reg = Registry::new();
        reg.add_printer(
            "Point",
            PrinterSpec::new()
                .view(ViewSpec::custom("Broken", |_: &Snapshot| Ok(Panicking)))
                .view(ViewSpec::nodes("Good", [("x", field("x"))])),
        )
        .unwrap();
        let p = Snapshot::structure("Point", [("x", Snapshot::int(1)), ("y", Snapshot::int(2))]);

        let text = render_value("p", &p, &reg, &RenderOptions::default()).unwrap();
        let expected = "\
p
  <Raw>
    x = 1
    y = 2
  <Broken>
    <error> = <error: panicked: custom node blew up>
  <Good>
    x = 1
";
        assert_eq!(text, expected);
    }

    #[test]
    fn scalars_render_inline() {
        let text = render_value("n", &Snapshot::int(7), &registry(), &RenderOptions::default())
            .unwrap();
        assert_eq!(text, "n = 7\n");
    }
}
