//! The introspection boundary.
//!
//! The engine never looks inside a value on its own. Everything it knows about
//! an inspected value comes through [`Introspect`], which a debugger backend
//! implements over its native value handle.

pub mod snapshot;

pub use snapshot::{Snapshot, TypeTable};

use crate::error::IntrospectError;
use std::fmt;

/// Capability set the engine needs from a debugger value handle.
///
/// Handles are expected to be cheap to clone (a reference into the debuggee,
/// not a copy of its memory).
pub trait Introspect: Clone + 'static {
    /// Type name as declared in the debuggee, used for printer lookup and
    /// type-qualified summaries.
    fn declared_type_name(&self) -> String;

    fn get_field(&self, name: &str) -> Result<Self, IntrospectError>;

    /// Non-static data members in declaration order.
    fn instance_fields(&self) -> Result<Vec<(String, Self)>, IntrospectError>;

    /// Class-level data members of this value's type in declaration order.
    ///
    /// Backends return `Unsupported` for value kinds that cannot have any.
    fn static_members(&self) -> Result<Vec<(String, Self)>, IntrospectError>;

    fn to_i64(&self) -> Result<i64, IntrospectError>;

    fn to_f64(&self) -> Result<f64, IntrospectError>;

    fn to_address(&self) -> Result<u64, IntrospectError>;

    /// One-line rendering of the value as the debugger would show it.
    fn render(&self) -> String;
}

/// Follow a dotted member path (`"pos.x"`) from `value`.
pub fn get_path<V: Introspect>(value: &V, path: &str) -> Result<V, IntrospectError> {
    let mut cur = value.clone();
    for part in path.split('.').filter(|p| !p.is_empty()) {
        cur = cur.get_field(part)?;
    }
    Ok(cur)
}

/// A value synthesized by a derivation rather than read from the debuggee.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    Address(u64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            // Debug keeps the trailing `.0` on whole numbers.
            Scalar::Float(v) => write!(f, "{:?}", v),
            Scalar::Bool(v) => write!(f, "{}", v),
            Scalar::Address(v) => write!(f, "0x{:x}", v),
            Scalar::Text(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}
