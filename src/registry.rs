//! Printer registry: populated once at startup, read-only during inspection.

use crate::compose::{PrinterNode, compose};
use crate::error::ConfigError;
use crate::spec::PrinterSpec;
use crate::value::Introspect;

use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

pub struct Registry<V> {
    exact: HashMap<String, Arc<PrinterSpec<V>>>,
    /// Pattern printers in registration order; the first match wins.
    patterns: Vec<(Regex, Arc<PrinterSpec<V>>)>,
    fallback: Arc<PrinterSpec<V>>,
}

impl<V> Default for Registry<V> {
    fn default() -> Self {
        Self {
            exact: HashMap::new(),
            patterns: Vec::new(),
            fallback: Arc::new(PrinterSpec::new()),
        }
    }
}

impl<V: Introspect> Registry<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `spec` for values whose declared type name is exactly
    /// `type_name`.
    pub fn add_printer(
        &mut self,
        type_name: impl Into<String>,
        spec: PrinterSpec<V>,
    ) -> Result<(), ConfigError> {
        let type_name = type_name.into();
        spec.validate(&type_name)?;
        if self.exact.contains_key(&type_name) {
            return Err(ConfigError::DuplicatePrinter { type_name });
        }
        tracing::debug!(
            "adding exact printer for type {} ({} views)",
            type_name,
            spec.views().len()
        );
        self.exact.insert(type_name, Arc::new(spec));
        Ok(())
    }

    /// Register `spec` for every type name matching `pattern` at its start
    /// (e.g. `std::vector<.*>`). Exact printers take precedence.
    pub fn add_re_printer(
        &mut self,
        pattern: &str,
        spec: PrinterSpec<V>,
    ) -> Result<(), ConfigError> {
        spec.validate(pattern)?;
        if self.has_pattern(pattern) {
            return Err(ConfigError::DuplicatePrinter {
                type_name: pattern.to_string(),
            });
        }
        let re = Regex::new(&format!("^(?:{})", pattern)).map_err(|source| {
            ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        tracing::debug!("adding pattern printer for types matching {}", pattern);
        self.patterns.push((re, Arc::new(spec)));
        Ok(())
    }

    fn has_pattern(&self, pattern: &str) -> bool {
        let anchored = format!("^(?:{})", pattern);
        self.patterns.iter().any(|(re, _)| re.as_str() == anchored)
    }

    pub fn lookup(&self, type_name: &str) -> Option<&Arc<PrinterSpec<V>>> {
        if let Some(spec) = self.exact.get(type_name) {
            tracing::debug!("exact match for type {}", type_name);
            return Some(spec);
        }
        let hit = self
            .patterns
            .iter()
            .find(|(re, _)| re.is_match(type_name));
        if let Some((re, _)) = hit {
            tracing::debug!("pattern match for type {} with {}", type_name, re.as_str());
        }
        hit.map(|(_, spec)| spec)
    }

    /// Compose the node tree for `value` if a printer is registered for its
    /// type.
    pub fn inspect(&self, value: &V) -> Option<PrinterNode<V>> {
        let spec = self.lookup(&value.declared_type_name())?;
        Some(compose(value.clone(), Arc::clone(spec)))
    }

    /// Like [`inspect`](Self::inspect), but aggregates without a registered
    /// printer still get the default layout (static section plus fields).
    /// Scalars without a printer return `None`.
    pub fn inspect_or_default(&self, value: &V) -> Option<PrinterNode<V>> {
        if let Some(node) = self.inspect(value) {
            return Some(node);
        }
        value
            .instance_fields()
            .ok()
            .map(|_| compose(value.clone(), Arc::clone(&self.fallback)))
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
