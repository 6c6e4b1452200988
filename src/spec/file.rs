//! Printers file (printers.json): declarative printer registrations.
//!
//! JSON shape:
//! {
//!   "printers": [
//!     {
//!       "type": "ColorRGBA",
//!       "match": "exact",                         // or "regex"
//!       "summary": { "named": true, "show_type": true },
//!       "default_view": "Alpha",                  // optional
//!       "views": [
//!         {
//!           "name": "Alpha",
//!           "summary": "",                        // literal text, or a format object
//!           "nodes": [
//!             { "label": "raw", "path": "a" },
//!             { "label": "normalized", "path": "a", "divide": 255 }
//!           ]
//!         },
//!         { "name": "All", "node": "flatten" }
//!       ]
//!     }
//!   ]
//! }
//!
//! A view must have exactly one of `nodes` / `node`. `node` names a factory
//! from [`NodeFactories`]; `flatten` is built in.

use super::derive::{self, Derivation};
use super::printer::{NodeFactory, PrinterSpec, ViewBody, ViewSpec};
use crate::compose::FlattenNode;
use crate::error::ConfigError;
use crate::node::Node;
use crate::registry::Registry;
use crate::summary::{Summary, SummaryFormat};
use crate::value::Introspect;

use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize)]
pub struct PrintersFile {
    #[serde(default)]
    pub printers: Vec<RawPrinter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPrinter {
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default, rename = "match")]
    pub match_kind: MatchKind,

    #[serde(default)]
    pub summary: Option<RawSummary>,

    #[serde(default)]
    pub default_view: Option<String>,

    #[serde(default)]
    pub views: Vec<RawView>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    #[default]
    Exact,
    Regex,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawSummary {
    Text(String),
    Format {
        #[serde(default)]
        named: bool,
        #[serde(default = "default_show_type")]
        show_type: bool,
        #[serde(default)]
        fields: Option<Vec<String>>,
    },
}

fn default_show_type() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawView {
    pub name: String,

    #[serde(default)]
    pub summary: Option<RawSummary>,

    #[serde(default)]
    pub nodes: Option<Vec<RawNode>>,

    #[serde(default)]
    pub node: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawNode {
    pub label: String,

    pub path: String,

    #[serde(default, rename = "as")]
    pub conversion: Option<Conversion>,

    #[serde(default)]
    pub scale: Option<f64>,

    #[serde(default)]
    pub divide: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conversion {
    Int,
    Float,
    Address,
}

/// Named node factories that `"node": "<name>"` can refer to.
pub struct NodeFactories<V> {
    map: BTreeMap<String, NodeFactory<V>>,
}

impl<V: Introspect> NodeFactories<V> {
    pub fn empty() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    /// The built-in set: `flatten`.
    pub fn with_builtins() -> Self {
        let flatten: NodeFactory<V> = Arc::new(|v: &V| {
            let node: Box<dyn Node<V>> = Box::new(FlattenNode::new(v.clone()));
            Ok::<_, anyhow::Error>(node)
        });
        let mut f = Self::empty();
        f.insert("flatten", flatten);
        f
    }

    pub fn insert(&mut self, name: impl Into<String>, factory: NodeFactory<V>) -> &mut Self {
        self.map.insert(name.into(), factory);
        self
    }

    pub fn get(&self, name: &str) -> Option<&NodeFactory<V>> {
        self.map.get(name)
    }
}

impl RawSummary {
    fn build<V: Introspect>(&self) -> Summary<V> {
        match self {
            RawSummary::Text(text) => Summary::fixed(text.clone()),
            RawSummary::Format {
                named,
                show_type,
                fields,
            } => {
                let fmt = SummaryFormat {
                    named: *named,
                    show_type: *show_type,
                    fields: fields.clone(),
                };
                Summary::new(move |v| fmt.format(v))
            }
        }
    }
}

impl RawNode {
    fn build<V: Introspect>(
        &self,
        type_name: &str,
        view: &str,
    ) -> Result<Derivation<V>, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidDerivation {
            type_name: type_name.to_string(),
            view: view.to_string(),
            label: self.label.clone(),
            reason: reason.to_string(),
        };

        if self.path.trim().is_empty() {
            return Err(invalid("empty path"));
        }
        let numeric = self.scale.is_some() || self.divide.is_some();
        if numeric && matches!(self.conversion, Some(Conversion::Int | Conversion::Address)) {
            return Err(invalid("scale/divide produce floating point values"));
        }
        if self.divide == Some(0.0) {
            return Err(invalid("divide by zero"));
        }

        Ok(match (self.scale, self.divide, self.conversion) {
            (Some(factor), None, _) => derive::scaled(&self.path, factor),
            (None, Some(divisor), _) => derive::divided(&self.path, divisor),
            (Some(factor), Some(divisor), _) => derive::scaled(&self.path, factor / divisor),
            (None, None, Some(Conversion::Int)) => derive::as_int(&self.path),
            (None, None, Some(Conversion::Float)) => derive::as_float(&self.path),
            (None, None, Some(Conversion::Address)) => derive::as_address(&self.path),
            (None, None, None) => derive::path(&self.path),
        })
    }
}

impl RawView {
    fn build<V: Introspect>(
        &self,
        type_name: &str,
        factories: &NodeFactories<V>,
    ) -> Result<ViewSpec<V>, ConfigError> {
        let view = match (&self.nodes, &self.node) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::AmbiguousViewBody {
                    type_name: type_name.to_string(),
                    view: self.name.clone(),
                });
            }
            (None, None) => {
                return Err(ConfigError::MissingViewBody {
                    type_name: type_name.to_string(),
                    view: self.name.clone(),
                });
            }
            (Some(nodes), None) => {
                let mut built = Vec::with_capacity(nodes.len());
                for n in nodes {
                    built.push((n.label.as_str(), n.build(type_name, &self.name)?));
                }
                ViewSpec::nodes(self.name.clone(), built)
            }
            (None, Some(factory)) => {
                let f = factories
                    .get(factory)
                    .ok_or_else(|| ConfigError::UnknownNodeFactory {
                        type_name: type_name.to_string(),
                        view: self.name.clone(),
                        factory: factory.clone(),
                    })?;
                ViewSpec {
                    name: self.name.clone(),
                    summary: None,
                    body: ViewBody::Custom(Arc::clone(f)),
                }
            }
        };

        Ok(match &self.summary {
            Some(s) => view.with_summary(s.build()),
            None => view,
        })
    }
}

impl RawPrinter {
    fn build<V: Introspect>(
        &self,
        factories: &NodeFactories<V>,
    ) -> Result<PrinterSpec<V>, ConfigError> {
        let mut spec = PrinterSpec::new();
        if let Some(s) = &self.summary {
            spec = spec.summary(s.build());
        }
        for v in &self.views {
            spec = spec.view(v.build(&self.type_name, factories)?);
        }
        if let Some(d) = &self.default_view {
            spec = spec.default_view(d.clone());
        }
        Ok(spec)
    }
}

impl PrintersFile {
    /// Build every printer and register it. Stops at the first configuration
    /// error; printers registered before it stay registered.
    pub fn register_into<V: Introspect>(
        &self,
        registry: &mut Registry<V>,
        factories: &NodeFactories<V>,
    ) -> Result<usize, ConfigError> {
        for p in &self.printers {
            let spec = p.build(factories)?;
            match p.match_kind {
                MatchKind::Exact => registry.add_printer(p.type_name.clone(), spec)?,
                MatchKind::Regex => registry.add_re_printer(&p.type_name, spec)?,
            }
        }
        Ok(self.printers.len())
    }
}

/// Read a printers file and register its printers with the built-in factories.
pub fn load_printers_file<V: Introspect>(
    path: &str,
    registry: &mut Registry<V>,
) -> anyhow::Result<usize> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read printers file {}", path))?;
    let file: PrintersFile =
        serde_json::from_str(&text).with_context(|| format!("parse printers file {}", path))?;
    let n = file
        .register_into(registry, &NodeFactories::with_builtins())
        .with_context(|| format!("register printers from {}", path))?;
    Ok(n)
}
