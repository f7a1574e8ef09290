use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::FieldParseError;

/// Field name the storage engine uses for its primary key.
pub const PRIMARY_KEY: &str = "_id";

/// Declared type of a non-base query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Array,
    Id,
    Int,
    Bool,
    Date,
}

impl FieldType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Array => "array",
            Self::Id => "id",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Date => "date",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "array" => Ok(Self::Array),
            "id" => Ok(Self::Id),
            "int" => Ok(Self::Int),
            "bool" => Ok(Self::Bool),
            "date" => Ok(Self::Date),
            other => Err(format!("unknown field type: {other}")),
        }
    }
}

/// Per-endpoint declaration of the extra query parameters it accepts.
///
/// A schema is built by the call site and handed to the compiler by reference;
/// nothing about it is shared between calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: BTreeMap<String, FieldType>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style declaration. Re-declaring a name replaces its type.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.insert(name.into(), ty);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<FieldType> {
        self.fields.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, FieldType)> for Schema {
    fn from_iter<I: IntoIterator<Item = (K, FieldType)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect() }
    }
}

/// `name=type,name=type`, e.g. `age=int,tags=array`.
impl FromStr for Schema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|decl| {
                let (name, ty) =
                    decl.split_once('=').ok_or_else(|| format!("expected name=type, got {decl:?}"))?;
                let name = name.trim();
                if name.is_empty() {
                    return Err(format!("missing field name in {decl:?}"));
                }
                Ok((name.to_string(), ty.parse::<FieldType>()?))
            })
            .collect()
    }
}

/// Parses a storage identifier (24 hex characters).
///
/// # Errors
/// Returns `FieldParseError::Id` when the input is not a well-formed identifier.
pub fn parse_object_id(raw: &str) -> Result<ObjectId, FieldParseError> {
    ObjectId::parse_str(raw).map_err(|e| FieldParseError::Id(format!("{raw}: {e}")))
}
