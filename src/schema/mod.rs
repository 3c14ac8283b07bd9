pub mod merge;
pub mod types;

pub use merge::merge_schemas;
pub use types::ColumnType;

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Behavior when an operation names a column that does not exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropBehavior {
    /// Fail on absent columns
    Raise,
    /// Silently skip absent columns
    Ignore,
}

/// Ordered mapping from column name to [`ColumnType`].
///
/// Declaration order is preserved on iteration and serialization. A schema is
/// immutable once built; every algebra operation returns a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    // names[i] pairs with types[i]; indices maps a name to that position
    types: Vec<ColumnType>,
    indices: HashMap<String, usize>,
    names: Vec<String>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ColumnType> {
        self.indices.get(name).map(|&idx| &self.types[idx])
    }

    /// Like [`Schema::get`] but failing with `ColumnNotFound`
    pub fn column_type(&self, name: &str) -> Result<&ColumnType> {
        self.get(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// Column names in declaration order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Iterate `(name, type)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnType)> + '_ {
        self.names
            .iter()
            .zip(&self.types)
            .map(|(name, ty)| (name.as_str(), ty))
    }

    /// Builder-style append; an existing entry of the same name is replaced
    /// in place
    pub fn with(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.insert(name.into(), column_type);
        self
    }

    pub(crate) fn insert(&mut self, name: String, column_type: ColumnType) {
        match self.indices.get(&name).copied() {
            Some(idx) => self.types[idx] = column_type,
            None => {
                self.indices.insert(name.clone(), self.names.len());
                self.names.push(name);
                self.types.push(column_type);
            }
        }
    }

    pub(crate) fn try_insert(&mut self, name: String, column_type: ColumnType) -> Result<()> {
        if self.contains(&name) {
            return Err(Error::DuplicateColumnName(name));
        }
        self.insert(name, column_type);
        Ok(())
    }

    /// All columns of `self` followed by all columns of `other`; shared names
    /// fail with `DuplicateColumnName`
    pub fn combine(&self, other: &Schema) -> Result<Schema> {
        let mut out = self.clone();
        for (name, ty) in other.iter() {
            out.try_insert(name.to_string(), *ty)?;
        }
        Ok(out)
    }

    /// Override-merge: entries of `other` replace same-named entries of
    /// `self` in place, new entries append. This is the assignment path, in
    /// contrast to the strict [`Schema::combine`].
    pub fn updated(&self, other: &Schema) -> Schema {
        let mut out = self.clone();
        for (name, ty) in other.iter() {
            out.insert(name.to_string(), *ty);
        }
        out
    }

    /// Projection onto the requested columns, in request order
    pub fn select(&self, columns: &[&str]) -> Result<Schema> {
        let mut out = Schema::new();
        for &name in columns {
            out.try_insert(name.to_string(), *self.column_type(name)?)?;
        }
        Ok(out)
    }

    /// Rename columns per the mapping, keeping declaration order.
    ///
    /// Mapping keys that match no column are ignored; a rename target that
    /// collides with another resulting name fails.
    pub fn rename(&self, mapping: &HashMap<String, String>) -> Result<Schema> {
        let mut out = Schema::new();
        for (name, ty) in self.iter() {
            let new_name = mapping
                .get(name)
                .cloned()
                .unwrap_or_else(|| name.to_string());
            out.try_insert(new_name, *ty)?;
        }
        Ok(out)
    }

    /// Remove the named columns
    pub fn drop(&self, columns: &[&str], behavior: DropBehavior) -> Result<Schema> {
        if behavior == DropBehavior::Raise {
            for &name in columns {
                if !self.contains(name) {
                    return Err(Error::ColumnNotFound(name.to_string()));
                }
            }
        }
        let mut out = Schema::new();
        for (name, ty) in self.iter() {
            if !columns.contains(&name) {
                out.insert(name.to_string(), *ty);
            }
        }
        Ok(out)
    }

    /// Narrow nullability: force `nullable = false` on the subset columns
    /// (all columns when `None`); others pass through unchanged
    pub fn without_nulls(&self, subset: Option<&[&str]>) -> Schema {
        let mut out = Schema::new();
        for (name, ty) in self.iter() {
            let affected = subset.map_or(true, |names| names.contains(&name));
            let narrowed = if affected {
                ColumnType {
                    nullable: false,
                    ..*ty
                }
            } else {
                *ty
            };
            out.insert(name.to_string(), narrowed);
        }
        out
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, ty)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, ty)?;
        }
        write!(f, "}}")
    }
}

impl<S: Into<String>> FromIterator<(S, ColumnType)> for Schema {
    fn from_iter<I: IntoIterator<Item = (S, ColumnType)>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for (name, ty) in iter {
            schema.insert(name.into(), ty);
        }
        schema
    }
}

impl<S: Into<String>> From<Vec<(S, ColumnType)>> for Schema {
    fn from(columns: Vec<(S, ColumnType)>) -> Self {
        columns.into_iter().collect()
    }
}

impl<S: Into<String>, const N: usize> From<[(S, ColumnType); N]> for Schema {
    fn from(columns: [(S, ColumnType); N]) -> Self {
        columns.into_iter().collect()
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, ty) in self.iter() {
            map.serialize_entry(name, ty)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = Schema;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a map of column names to column types")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Schema, A::Error> {
                let mut schema = Schema::new();
                while let Some((name, ty)) = access.next_entry::<String, ColumnType>()? {
                    schema
                        .try_insert(name, ty)
                        .map_err(serde::de::Error::custom)?;
                }
                Ok(schema)
            }
        }

        deserializer.deserialize_map(SchemaVisitor)
    }
}
