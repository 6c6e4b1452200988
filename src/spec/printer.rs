//! Printer and view declarations plus their registration-time validation.

use super::derive::Derivation;
use crate::error::ConfigError;
use crate::node::Node;
use crate::summary::Summary;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Builds a hand-written node for views that need more than a flat list of
/// derivations.
pub type NodeFactory<V> = Arc<dyn Fn(&V) -> anyhow::Result<Box<dyn Node<V>>> + Send + Sync>;

/// What a view shows. Exactly one form per view.
pub enum ViewBody<V> {
    /// Ordered `(label, derivation)` pairs.
    Nodes(Vec<(String, Derivation<V>)>),
    /// A custom node built from the value.
    Custom(NodeFactory<V>),
}

impl<V> Clone for ViewBody<V> {
    fn clone(&self) -> Self {
        match self {
            ViewBody::Nodes(n) => ViewBody::Nodes(n.clone()),
            ViewBody::Custom(f) => ViewBody::Custom(Arc::clone(f)),
        }
    }
}

impl<V> fmt::Debug for ViewBody<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewBody::Nodes(nodes) => f
                .debug_tuple("Nodes")
                .field(&nodes.iter().map(|(l, _)| l.as_str()).collect::<Vec<_>>())
                .finish(),
            ViewBody::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One named view over a type.
#[derive(Debug, Clone)]
pub struct ViewSpec<V> {
    pub name: String,
    pub summary: Option<Summary<V>>,
    pub body: ViewBody<V>,
}

impl<V> ViewSpec<V> {
    pub fn nodes<'a>(
        name: impl Into<String>,
        nodes: impl IntoIterator<Item = (&'a str, Derivation<V>)>,
    ) -> Self {
        Self {
            name: name.into(),
            summary: None,
            body: ViewBody::Nodes(
                nodes
                    .into_iter()
                    .map(|(label, d)| (label.to_string(), d))
                    .collect(),
            ),
        }
    }

    pub fn custom<N>(
        name: impl Into<String>,
        factory: impl Fn(&V) -> anyhow::Result<N> + Send + Sync + 'static,
    ) -> Self
    where
        N: Node<V> + 'static,
    {
        let factory: NodeFactory<V> = Arc::new(move |v: &V| {
            let node: Box<dyn Node<V>> = Box::new(factory(v)?);
            Ok::<_, anyhow::Error>(node)
        });
        Self {
            name: name.into(),
            summary: None,
            body: ViewBody::Custom(factory),
        }
    }

    pub fn with_summary(mut self, summary: Summary<V>) -> Self {
        self.summary = Some(summary);
        self
    }
}

/// Everything registered for one type name.
#[derive(Debug, Clone)]
pub struct PrinterSpec<V> {
    summary: Option<Summary<V>>,
    default_view: Option<String>,
    views: Vec<ViewSpec<V>>,
}

impl<V> Default for PrinterSpec<V> {
    fn default() -> Self {
        Self {
            summary: None,
            default_view: None,
            views: Vec::new(),
        }
    }
}

impl<V> PrinterSpec<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label for the value and its raw/default section.
    pub fn summary(mut self, summary: Summary<V>) -> Self {
        self.summary = Some(summary);
        self
    }

    /// Append a view. Declaration order is display order.
    pub fn view(mut self, view: ViewSpec<V>) -> Self {
        self.views.push(view);
        self
    }

    /// Show the named view's content in the raw section.
    pub fn default_view(mut self, name: impl Into<String>) -> Self {
        self.default_view = Some(name.into());
        self
    }

    pub fn summary_formatter(&self) -> Option<&Summary<V>> {
        self.summary.as_ref()
    }

    pub fn views(&self) -> &[ViewSpec<V>] {
        &self.views
    }

    pub fn default_view_name(&self) -> Option<&str> {
        self.default_view.as_deref()
    }

    pub fn find_view(&self, name: &str) -> Option<&ViewSpec<V>> {
        self.views.iter().find(|v| v.name == name)
    }

    /// The view whose content replaces the raw field listing, if any.
    pub fn default_view_spec(&self) -> Option<&ViewSpec<V>> {
        self.default_view.as_deref().and_then(|n| self.find_view(n))
    }

    /// Views shown as their own sections, in declared order.
    pub fn section_views(&self) -> impl Iterator<Item = &ViewSpec<V>> {
        let default = self.default_view.as_deref();
        self.views
            .iter()
            .filter(move |v| Some(v.name.as_str()) != default)
    }

    /// Registration-time checks:
    /// - view names are unique
    /// - `default_view`, if set, names a declared view
    pub fn validate(&self, type_name: &str) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for v in &self.views {
            if !seen.insert(v.name.as_str()) {
                return Err(ConfigError::DuplicateView {
                    type_name: type_name.to_string(),
                    view: v.name.clone(),
                });
            }
        }

        if let Some(name) = &self.default_view {
            if !seen.contains(name.as_str()) {
                return Err(ConfigError::DanglingDefaultView {
                    type_name: type_name.to_string(),
                    name: name.clone(),
                    available: self.views.iter().map(|v| v.name.clone()).collect(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::derive::field;
    use crate::value::Snapshot;

    fn alpha() -> ViewSpec<Snapshot> {
        ViewSpec::nodes("Alpha", [("raw", field("a"))])
    }

    #[test]
    fn empty_spec_is_valid() {
        assert!(PrinterSpec::<Snapshot>::new().validate("T").is_ok());
    }

    #[test]
    fn duplicate_view_names_rejected() {
        let spec = PrinterSpec::new().view(alpha()).view(alpha());
        let err = spec.validate("ColorRGBA").unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateView { ref view, .. } if view == "Alpha"));
    }

    #[test]
    fn dangling_default_view_rejected() {
        let spec = PrinterSpec::new().view(alpha()).default_view("Beta");
        let err = spec.validate("ColorRGBA").unwrap_err();
        assert_eq!(
            err.to_string(),
            "printer for \"ColorRGBA\" names default view \"Beta\", but only [Alpha] are declared"
        );
    }

    #[test]
    fn default_view_is_excluded_from_sections() {
        let spec = PrinterSpec::new()
            .view(ViewSpec::nodes("Components", [("r", field("r"))]))
            .view(alpha())
            .view(ViewSpec::nodes("Stats", [("g", field("g"))]))
            .default_view("Alpha");
        spec.validate("ColorRGBA").unwrap();

        let names: Vec<&str> = spec.section_views().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Components", "Stats"]);
        assert_eq!(spec.default_view_spec().map(|v| v.name.as_str()), Some("Alpha"));
    }
}
