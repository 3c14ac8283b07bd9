use std::collections::{HashMap, HashSet};

use crate::column::Column;
use crate::error::{Error, Result};
use crate::frame::core::DataFrame;

/// Enumeration representing join types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
    /// Only rows with a key match on both sides
    #[default]
    Inner,
    /// All left rows, matching right rows where present
    Left,
    /// All right rows, matching left rows where present
    Right,
    /// All rows from both sides
    Outer,
}

impl DataFrame {
    /// Multi-key equality join.
    ///
    /// Key columns are paired positionally and must have matching physical
    /// types. Null keys never match. When a key pair shares one name the two
    /// columns are coalesced into a single output column; other columns
    /// appearing on both sides get the respective suffix.
    pub fn join(
        &self,
        other: &DataFrame,
        left_on: &[String],
        right_on: &[String],
        how: JoinType,
        suffixes: (&str, &str),
    ) -> Result<DataFrame> {
        if left_on.is_empty() || right_on.is_empty() {
            return Err(Error::MissingJoinKeys);
        }
        if left_on.len() != right_on.len() {
            return Err(Error::JoinKeyLengthMismatch {
                left: left_on.len(),
                right: right_on.len(),
            });
        }

        let left_keys: Vec<&Column> = left_on
            .iter()
            .map(|name| self.column(name))
            .collect::<Result<_>>()?;
        let right_keys: Vec<&Column> = right_on
            .iter()
            .map(|name| other.column(name))
            .collect::<Result<_>>()?;

        for ((left_name, left_col), (right_name, right_col)) in left_on
            .iter()
            .zip(&left_keys)
            .zip(right_on.iter().zip(&right_keys))
        {
            if left_col.physical_type() != right_col.physical_type() {
                return Err(Error::MergeTypeMismatch {
                    left: left_name.clone(),
                    right: right_name.clone(),
                    left_type: left_col.physical_type(),
                    right_type: right_col.physical_type(),
                });
            }
        }

        // Hash the right side by rendered key tuples
        let mut right_map: HashMap<Vec<String>, Vec<usize>> = HashMap::new();
        for row in 0..other.row_count {
            if let Some(key) = row_key(&right_keys, row) {
                right_map.entry(key).or_default().push(row);
            }
        }

        let mut pairs: Vec<(Option<usize>, Option<usize>)> = Vec::new();
        let mut right_matched = vec![false; other.row_count];
        for row in 0..self.row_count {
            let matches = row_key(&left_keys, row).and_then(|key| right_map.get(&key));
            match matches {
                Some(rows) => {
                    for &right_row in rows {
                        pairs.push((Some(row), Some(right_row)));
                        right_matched[right_row] = true;
                    }
                }
                None => {
                    if how == JoinType::Left || how == JoinType::Outer {
                        pairs.push((Some(row), None));
                    }
                }
            }
        }
        if how == JoinType::Right || how == JoinType::Outer {
            for (right_row, matched) in right_matched.iter().enumerate() {
                if !matched {
                    pairs.push((None, Some(right_row)));
                }
            }
        }

        let left_indices: Vec<Option<usize>> = pairs.iter().map(|p| p.0).collect();
        let right_indices: Vec<Option<usize>> = pairs.iter().map(|p| p.1).collect();

        // Key pairs sharing a name produce one coalesced column
        let coalesced: HashSet<&str> = left_on
            .iter()
            .zip(right_on)
            .filter(|(l, r)| l == r)
            .map(|(l, _)| l.as_str())
            .collect();
        let key_names: HashSet<&str> = left_on
            .iter()
            .chain(right_on)
            .map(String::as_str)
            .collect();

        let mut result = DataFrame::new();
        for (name, column) in self.column_names.iter().zip(&self.columns) {
            if coalesced.contains(name.as_str()) {
                let taken_left = column.take(&left_indices);
                let taken_right = other.column(name)?.take(&right_indices);
                result.add_column(name.clone(), taken_left.coalesce(&taken_right)?)?;
            } else if !key_names.contains(name.as_str()) && other.contains_column(name) {
                result.add_column(
                    format!("{}{}", name, suffixes.0),
                    column.take(&left_indices),
                )?;
            } else {
                result.add_column(name.clone(), column.take(&left_indices))?;
            }
        }
        for (name, column) in other.column_names.iter().zip(&other.columns) {
            if coalesced.contains(name.as_str()) {
                continue;
            } else if !key_names.contains(name.as_str()) && self.contains_column(name) {
                result.add_column(
                    format!("{}{}", name, suffixes.1),
                    column.take(&right_indices),
                )?;
            } else {
                result.add_column(name.clone(), column.take(&right_indices))?;
            }
        }
        result.row_count = pairs.len();
        Ok(result)
    }
}

fn row_key(columns: &[&Column], row: usize) -> Option<Vec<String>> {
    columns.iter().map(|col| col.format_value(row)).collect()
}
