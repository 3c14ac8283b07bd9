use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::schema::{ColumnType, Schema};

/// Derive the schema of a join.
///
/// `left_on` and `right_on` pair key columns positionally. `inner` marks an
/// inner join, which cannot introduce nulls from unmatched rows; `one_to_one`
/// marks a join that cannot duplicate rows, which is the only case where
/// uniqueness survives on non-key columns.
///
/// Output order mirrors the engine's join output: left columns in declaration
/// order (shared non-key names suffixed), then right columns minus key names
/// already emitted.
pub fn merge_schemas(
    left: &Schema,
    right: &Schema,
    left_on: &[String],
    right_on: &[String],
    suffixes: (&str, &str),
    inner: bool,
    one_to_one: bool,
) -> Result<Schema> {
    if left_on.len() != right_on.len() {
        return Err(Error::JoinKeyLengthMismatch {
            left: left_on.len(),
            right: right_on.len(),
        });
    }

    // Merged key types, addressable under both sides' names
    let mut key_types: HashMap<&str, ColumnType> = HashMap::new();
    for (left_name, right_name) in left_on.iter().zip(right_on) {
        let left_type = left.column_type(left_name)?;
        let right_type = right.column_type(right_name)?;
        if left_type.representation != right_type.representation {
            return Err(Error::MergeTypeMismatch {
                left: left_name.clone(),
                right: right_name.clone(),
                left_type: left_type.representation,
                right_type: right_type.representation,
            });
        }
        let merged = ColumnType {
            representation: left_type.representation,
            // An inner join cannot surface nulls from unmatched left keys
            nullable: (!inner && left_type.nullable) || right_type.nullable,
            unique: left_type.unique && right_type.unique,
        };
        key_types.insert(left_name.as_str(), merged);
        key_types.insert(right_name.as_str(), merged);
    }

    let mut out = Schema::new();
    for (name, ty) in left.iter() {
        if let Some(merged) = key_types.get(name) {
            out.try_insert(name.to_string(), *merged)?;
        } else if right.contains(name) {
            out.try_insert(format!("{}{}", name, suffixes.0), relax(*ty, inner, one_to_one))?;
        } else {
            out.try_insert(name.to_string(), relax(*ty, inner, one_to_one))?;
        }
    }
    for (name, ty) in right.iter() {
        if let Some(merged) = key_types.get(name) {
            if !out.contains(name) {
                out.try_insert(name.to_string(), *merged)?;
            }
        } else if left.contains(name) {
            out.try_insert(format!("{}{}", name, suffixes.1), relax(*ty, inner, one_to_one))?;
        } else {
            out.try_insert(name.to_string(), relax(*ty, inner, one_to_one))?;
        }
    }
    Ok(out)
}

/// Constraint relaxation for non-key columns crossing a join: any join that
/// is not inner may introduce nulls, and any join that is not one-to-one may
/// duplicate values.
fn relax(column_type: ColumnType, inner: bool, one_to_one: bool) -> ColumnType {
    let mut out = column_type;
    if !inner {
        out.nullable = true;
    }
    if !one_to_one {
        out.unique = false;
    }
    out
}
