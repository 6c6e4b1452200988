//! In-memory value model implementing [`Introspect`].
//!
//! Stands in for a live debugger: the CLI loads snapshots from a JSON values
//! file, tests build them directly.
//!
//! JSON shape:
//! {
//!   "types": [
//!     { "name": "ColorRGBA", "statics": [["instance_count", 3]] }
//!   ],
//!   "values": [
//!     {
//!       "name": "color",
//!       "value": { "type": "ColorRGBA", "fields": [["r", 34], ["g", 139]] }
//!     }
//!   ]
//! }
//!
//! Leaf values are JSON numbers, booleans and strings; pointers are written as
//! `{ "type": "int *", "address": 4096 }`.

use super::Introspect;
use crate::error::IntrospectError;

use anyhow::{Context, bail};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
enum Data {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Pointer {
        type_name: String,
        address: u64,
    },
    Struct {
        type_name: String,
        fields: Vec<(String, Arc<Data>)>,
    },
}

impl Data {
    fn type_name(&self) -> &str {
        match self {
            Data::Int(_) => "int",
            Data::Float(_) => "double",
            Data::Bool(_) => "bool",
            Data::Text(_) => "const char *",
            Data::Pointer { type_name, .. } | Data::Struct { type_name, .. } => type_name,
        }
    }
}

/// Class-level members per type name.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    statics: BTreeMap<String, Vec<(String, Arc<Data>)>>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the static members of `type_name`, replacing earlier ones.
    pub fn declare_statics<'a>(
        &mut self,
        type_name: &str,
        members: impl IntoIterator<Item = (&'a str, Snapshot)>,
    ) -> &mut Self {
        let members = members
            .into_iter()
            .map(|(name, v)| (name.to_string(), v.data))
            .collect();
        self.statics.insert(type_name.to_string(), members);
        self
    }
}

/// A value handle: a shared node of the value tree plus the type table it was
/// captured with.
#[derive(Debug, Clone)]
pub struct Snapshot {
    data: Arc<Data>,
    types: Arc<TypeTable>,
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Snapshot {
    fn leaf(data: Data) -> Self {
        Self {
            data: Arc::new(data),
            types: Arc::default(),
        }
    }

    fn child(&self, data: &Arc<Data>) -> Self {
        Self {
            data: Arc::clone(data),
            types: Arc::clone(&self.types),
        }
    }

    pub fn int(v: i64) -> Self {
        Self::leaf(Data::Int(v))
    }

    pub fn float(v: f64) -> Self {
        Self::leaf(Data::Float(v))
    }

    pub fn boolean(v: bool) -> Self {
        Self::leaf(Data::Bool(v))
    }

    pub fn text(v: impl Into<String>) -> Self {
        Self::leaf(Data::Text(v.into()))
    }

    pub fn pointer(type_name: impl Into<String>, address: u64) -> Self {
        Self::leaf(Data::Pointer {
            type_name: type_name.into(),
            address,
        })
    }

    pub fn structure<'a>(
        type_name: impl Into<String>,
        fields: impl IntoIterator<Item = (&'a str, Snapshot)>,
    ) -> Self {
        Self::leaf(Data::Struct {
            type_name: type_name.into(),
            fields: fields
                .into_iter()
                .map(|(name, v)| (name.to_string(), v.data))
                .collect(),
        })
    }

    /// Bind this value (and everything reachable from it) to a type table.
    pub fn with_types(self, types: Arc<TypeTable>) -> Self {
        Self {
            data: self.data,
            types,
        }
    }

    fn unsupported(&self, what: &'static str) -> IntrospectError {
        IntrospectError::Unsupported {
            type_name: self.data.type_name().to_string(),
            what,
        }
    }

    fn conversion(&self, target: &'static str) -> IntrospectError {
        IntrospectError::Conversion {
            type_name: self.data.type_name().to_string(),
            target,
        }
    }
}

impl Introspect for Snapshot {
    fn declared_type_name(&self) -> String {
        self.data.type_name().to_string()
    }

    fn get_field(&self, name: &str) -> Result<Self, IntrospectError> {
        match &*self.data {
            Data::Struct { type_name, fields } => fields
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| self.child(v))
                .ok_or_else(|| IntrospectError::FieldNotFound {
                    type_name: type_name.clone(),
                    field: name.to_string(),
                }),
            _ => Err(IntrospectError::FieldNotFound {
                type_name: self.declared_type_name(),
                field: name.to_string(),
            }),
        }
    }

    fn instance_fields(&self) -> Result<Vec<(String, Self)>, IntrospectError> {
        match &*self.data {
            Data::Struct { fields, .. } => Ok(fields
                .iter()
                .map(|(n, v)| (n.clone(), self.child(v)))
                .collect()),
            _ => Err(self.unsupported("instance fields")),
        }
    }

    fn static_members(&self) -> Result<Vec<(String, Self)>, IntrospectError> {
        match &*self.data {
            Data::Struct { type_name, .. } => Ok(self
                .types
                .statics
                .get(type_name)
                .map(|members| {
                    members
                        .iter()
                        .map(|(n, v)| (n.clone(), self.child(v)))
                        .collect()
                })
                .unwrap_or_default()),
            _ => Err(self.unsupported("static members")),
        }
    }

    fn to_i64(&self) -> Result<i64, IntrospectError> {
        match &*self.data {
            Data::Int(v) => Ok(*v),
            Data::Bool(v) => Ok(i64::from(*v)),
            Data::Float(v) => {
                let t = v.trunc();
                // `as` saturates; out-of-range and NaN must not pass as numbers.
                if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
                    Ok(t as i64)
                } else {
                    Err(self.conversion("integer"))
                }
            }
            Data::Pointer { address, .. } => {
                i64::try_from(*address).map_err(|_| self.conversion("integer"))
            }
            _ => Err(self.conversion("integer")),
        }
    }

    fn to_f64(&self) -> Result<f64, IntrospectError> {
        match &*self.data {
            Data::Int(v) => Ok(*v as f64),
            Data::Float(v) => Ok(*v),
            Data::Bool(v) => Ok(if *v { 1.0 } else { 0.0 }),
            _ => Err(self.conversion("floating point")),
        }
    }

    fn to_address(&self) -> Result<u64, IntrospectError> {
        match &*self.data {
            Data::Pointer { address, .. } => Ok(*address),
            Data::Int(v) => u64::try_from(*v).map_err(|_| self.conversion("address")),
            _ => Err(self.conversion("address")),
        }
    }

    fn render(&self) -> String {
        render_data(&self.data)
    }
}

fn render_data(data: &Data) -> String {
    match data {
        Data::Int(v) => v.to_string(),
        Data::Float(v) => format!("{:?}", v),
        Data::Bool(v) => v.to_string(),
        Data::Text(v) => format!("{:?}", v),
        Data::Pointer { type_name, address } => format!("({}) 0x{:x}", type_name, address),
        Data::Struct { fields, .. } => {
            if fields.is_empty() {
                return "{}".to_string();
            }
            let inner: Vec<String> = fields
                .iter()
                .map(|(n, v)| format!("{} = {}", n, render_data(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

// ---------------------------------------------------------------------------
// JSON values file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ValuesFile {
    #[serde(default)]
    pub types: Vec<RawType>,

    #[serde(default)]
    pub values: Vec<RawNamedValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawType {
    pub name: String,

    #[serde(default)]
    pub statics: Vec<(String, RawValue)>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawNamedValue {
    pub name: String,
    pub value: RawValue,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Pointer {
        #[serde(rename = "type")]
        type_name: String,
        address: u64,
    },
    Struct {
        #[serde(rename = "type")]
        type_name: String,
        #[serde(default)]
        fields: Vec<(String, RawValue)>,
    },
}

impl RawValue {
    fn into_data(self) -> Arc<Data> {
        Arc::new(match self {
            RawValue::Bool(v) => Data::Bool(v),
            RawValue::Int(v) => Data::Int(v),
            RawValue::Float(v) => Data::Float(v),
            RawValue::Text(v) => Data::Text(v),
            RawValue::Pointer { type_name, address } => Data::Pointer { type_name, address },
            RawValue::Struct { type_name, fields } => Data::Struct {
                type_name,
                fields: fields
                    .into_iter()
                    .map(|(n, v)| (n, v.into_data()))
                    .collect(),
            },
        })
    }
}

impl ValuesFile {
    /// Validate names and build the snapshots, all sharing one type table.
    pub fn validate_and_build(self) -> anyhow::Result<Vec<(String, Snapshot)>> {
        let mut table = TypeTable::new();
        for t in self.types {
            if table.statics.contains_key(&t.name) {
                bail!("duplicate type entry in values file: {}", t.name);
            }
            let members = t
                .statics
                .into_iter()
                .map(|(n, v)| (n, v.into_data()))
                .collect();
            table.statics.insert(t.name, members);
        }
        let types = Arc::new(table);

        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for v in self.values {
            if !seen.insert(v.name.clone()) {
                bail!("duplicate value name in values file: {}", v.name);
            }
            let snapshot = Snapshot {
                data: v.value.into_data(),
                types: Arc::clone(&types),
            };
            out.push((v.name, snapshot));
        }
        Ok(out)
    }
}

/// Read and build every named value from a JSON values file.
pub fn load_values_file(path: &str) -> anyhow::Result<Vec<(String, Snapshot)>> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read values file {}", path))?;
    let file: ValuesFile =
        serde_json::from_str(&text).with_context(|| format!("parse values file {}", path))?;
    file.validate_and_build()
        .with_context(|| format!("validate values file {}", path))
}
