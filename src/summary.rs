//! One-line summaries for printer and view headers.

use crate::node::isolate;
use crate::value::Introspect;

use std::fmt;
use std::sync::Arc;

/// Shown in place of a field (or field list) the backend could not provide.
pub const UNAVAILABLE: &str = "<unavailable>";

/// A label formatter evaluated against the inspected value.
pub struct Summary<V> {
    inner: Arc<dyn Fn(&V) -> String + Send + Sync>,
}

impl<V> Clone for Summary<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> fmt::Debug for Summary<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Summary(..)")
    }
}

impl<V: 'static> Summary<V> {
    pub fn new(f: impl Fn(&V) -> String + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(f) }
    }

    /// A constant label. The empty string is allowed and renders nothing.
    pub fn fixed(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_| text.clone())
    }

    /// Evaluate against `value`. Empty output means "no label".
    pub fn format(&self, value: &V) -> Option<String> {
        let text = match isolate(|| Ok((self.inner)(value))) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("summary formatter failed: {}", e);
                e.marker()
            }
        };
        if text.is_empty() { None } else { Some(text) }
    }
}

/// Built-in formatter settings behind [`summary`] and [`summary_of`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryFormat {
    /// Render `name=value` rather than bare values.
    pub named: bool,
    /// Prefix with the value's declared type name.
    pub show_type: bool,
    /// Restrict to these fields, in this order. `None` means all instance
    /// fields in declaration order.
    pub fields: Option<Vec<String>>,
}

impl SummaryFormat {
    pub fn format<V: Introspect>(&self, value: &V) -> String {
        let parts: Vec<String> = match &self.fields {
            None => match value.instance_fields() {
                Ok(fields) => fields
                    .iter()
                    .map(|(name, v)| self.entry(name, &v.render()))
                    .collect(),
                Err(e) => {
                    tracing::trace!("summary: no instance fields: {}", e);
                    vec![UNAVAILABLE.to_string()]
                }
            },
            Some(names) => names
                .iter()
                .map(|name| match value.get_field(name) {
                    Ok(v) => self.entry(name, &v.render()),
                    Err(_) => self.entry(name, UNAVAILABLE),
                })
                .collect(),
        };

        let body = format!("{{{}}}", parts.join(", "));
        if self.show_type {
            format!("{} {}", value.declared_type_name(), body)
        } else {
            body
        }
    }

    fn entry(&self, name: &str, rendered: &str) -> String {
        if self.named {
            format!("{}={}", name, rendered)
        } else {
            rendered.to_string()
        }
    }
}

/// Summary over all instance fields: `Type {a=1, b=2}` / `{1, 2}`.
pub fn summary<V: Introspect>(named: bool, show_type: bool) -> Summary<V> {
    let fmt = SummaryFormat {
        named,
        show_type,
        fields: None,
    };
    Summary::new(move |v| fmt.format(v))
}

/// Summary over a selected subset of fields. Missing fields render as
/// [`UNAVAILABLE`] instead of failing the whole label.
pub fn summary_of<V: Introspect>(fields: &[&str], named: bool, show_type: bool) -> Summary<V> {
    let fmt = SummaryFormat {
        named,
        show_type,
        fields: Some(fields.iter().map(|f| f.to_string()).collect()),
    };
    Summary::new(move |v| fmt.format(v))
}
