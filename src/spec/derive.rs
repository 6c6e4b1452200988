//! Derivations: how one displayed child is computed from the inspected value.

use crate::error::DerivationError;
use crate::node::{Child, isolate};
use crate::value::{Introspect, Scalar, get_path};

use std::fmt;
use std::sync::Arc;

/// A pure function from the inspected value to one child. Must not mutate the
/// debuggee; may fail, and a failure only affects its own slot.
pub struct Derivation<V> {
    inner: Arc<dyn Fn(&V) -> anyhow::Result<Child<V>> + Send + Sync>,
}

impl<V> Clone for Derivation<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> fmt::Debug for Derivation<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Derivation(..)")
    }
}

impl<V> Derivation<V> {
    pub fn new(f: impl Fn(&V) -> anyhow::Result<Child<V>> + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(f) }
    }

    pub fn eval(&self, value: &V) -> Result<Child<V>, DerivationError> {
        isolate(|| (self.inner)(value))
    }
}

/// Synthesize a scalar from the value.
pub fn computed<V, S>(f: impl Fn(&V) -> anyhow::Result<S> + Send + Sync + 'static) -> Derivation<V>
where
    S: Into<Scalar>,
{
    Derivation::new(move |v| Ok(Child::Scalar(f(v)?.into())))
}

/// The raw member `name`.
pub fn field<V: Introspect>(name: &str) -> Derivation<V> {
    path(name)
}

/// The raw member at a dotted path, e.g. `"origin.x"`.
pub fn path<V: Introspect>(path: &str) -> Derivation<V> {
    let path = path.to_string();
    Derivation::new(move |v| Ok(Child::Value(get_path(v, &path)?)))
}

pub fn as_int<V: Introspect>(path: &str) -> Derivation<V> {
    let path = path.to_string();
    computed(move |v: &V| Ok(get_path(v, &path)?.to_i64()?))
}

pub fn as_float<V: Introspect>(path: &str) -> Derivation<V> {
    let path = path.to_string();
    computed(move |v: &V| Ok(get_path(v, &path)?.to_f64()?))
}

pub fn as_address<V: Introspect>(path: &str) -> Derivation<V> {
    let path = path.to_string();
    computed(move |v: &V| Ok(Scalar::Address(get_path(v, &path)?.to_address()?)))
}

/// The member at `path` as floating point, multiplied by `factor`.
pub fn scaled<V: Introspect>(path: &str, factor: f64) -> Derivation<V> {
    let path = path.to_string();
    computed(move |v: &V| Ok(get_path(v, &path)?.to_f64()? * factor))
}

/// The member at `path` as floating point, divided by `divisor`.
pub fn divided<V: Introspect>(path: &str, divisor: f64) -> Derivation<V> {
    let path = path.to_string();
    computed(move |v: &V| Ok(get_path(v, &path)?.to_f64()? / divisor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Snapshot;

    fn color() -> Snapshot {
        Snapshot::structure(
            "ColorRGBA",
            [("a", Snapshot::int(255)), ("name", Snapshot::text("forest"))],
        )
    }

    #[test]
    fn field_reads_raw_member() {
        let child = field::<Snapshot>("a").eval(&color()).unwrap();
        assert_eq!(child.display(), "255");
    }

    #[test]
    fn scaled_synthesizes_float() {
        let child = scaled::<Snapshot>("a", 1.0 / 255.0).eval(&color()).unwrap();
        assert_eq!(child.display(), "1.0");
    }

    #[test]
    fn divided_by_full_scale() {
        let child = divided::<Snapshot>("a", 255.0).eval(&color()).unwrap();
        assert_eq!(child.display(), "1.0");
    }

    #[test]
    fn missing_field_is_local_failure() {
        let err = field::<Snapshot>("q").eval(&color()).unwrap_err();
        assert_eq!(err.message, "no field \"q\" in ColorRGBA");
    }

    #[test]
    fn conversion_failure_is_reported() {
        let err = as_int::<Snapshot>("name").eval(&color()).unwrap_err();
        assert_eq!(err.message, "cannot convert const char * to integer");
    }
}
