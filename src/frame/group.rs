use std::cmp::Ordering;
use std::collections::HashMap;

use crate::column::{Column, Float64Column, Int64Column};
use crate::error::{Error, Result};
use crate::frame::core::DataFrame;

/// Enumeration of the engine's reduction primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Sum,
    Mean,
    Median,
    Min,
    Max,
    Mode,
    First,
    Last,
}

/// Structure representing grouping results
pub struct GroupBy<'a> {
    df: &'a DataFrame,
    by: Vec<String>,
    // Row indices per group, in first-occurrence order
    groups: Vec<Vec<usize>>,
}

impl DataFrame {
    /// Group rows by the rendered values of the given columns
    pub fn group_by<I, S>(&self, by: I) -> Result<GroupBy<'_>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let by: Vec<String> = by.into_iter().map(|s| s.as_ref().to_string()).collect();
        let key_columns: Vec<&Column> = by
            .iter()
            .map(|name| self.column(name))
            .collect::<Result<_>>()?;

        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut positions: HashMap<Vec<String>, usize> = HashMap::new();
        for row in 0..self.row_count {
            let key: Vec<String> = key_columns
                .iter()
                .map(|col| {
                    col.format_value(row)
                        .unwrap_or_else(|| "NULL".to_string())
                })
                .collect();
            match positions.get(&key).copied() {
                Some(pos) => groups[pos].push(row),
                None => {
                    positions.insert(key, groups.len());
                    groups.push(vec![row]);
                }
            }
        }

        Ok(GroupBy {
            df: self,
            by,
            groups,
        })
    }
}

impl<'a> GroupBy<'a> {
    /// Number of groups
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Reduce every group with the given specs.
    ///
    /// Each spec is `(output column, source column, reduction)`. The output
    /// frame carries the grouping columns first, one row per group in
    /// first-occurrence order, then one column per spec in spec order.
    pub fn aggregate(&self, specs: &[(String, String, Reduction)]) -> Result<DataFrame> {
        let mut result = DataFrame::new();

        let first_rows: Vec<Option<usize>> = self
            .groups
            .iter()
            .map(|rows| rows.first().copied())
            .collect();
        for name in &self.by {
            let column = self.df.column(name)?;
            result.add_column(name.clone(), column.take(&first_rows))?;
        }

        for (out_name, source, reduction) in specs {
            let column = self.df.column(source)?;
            let reduced = reduce_column(column, source, &self.groups, *reduction)?;
            result.add_column(out_name.clone(), reduced)?;
        }
        result.row_count = self.groups.len();
        Ok(result)
    }
}

fn reduce_column(
    column: &Column,
    name: &str,
    groups: &[Vec<usize>],
    reduction: Reduction,
) -> Result<Column> {
    match reduction {
        Reduction::First => Ok(select_rows(column, groups, |rows, col| {
            rows.iter().copied().find(|&row| !col.is_null(row))
        })),
        Reduction::Last => Ok(select_rows(column, groups, |rows, col| {
            rows.iter().rev().copied().find(|&row| !col.is_null(row))
        })),
        Reduction::Min => Ok(select_rows(column, groups, |rows, col| {
            best_row(rows, col, Ordering::Less)
        })),
        Reduction::Max => Ok(select_rows(column, groups, |rows, col| {
            best_row(rows, col, Ordering::Greater)
        })),
        Reduction::Mode => Ok(select_rows(column, groups, mode_row)),
        Reduction::Sum => sum_column(column, name, groups),
        Reduction::Mean => {
            let means = groups
                .iter()
                .map(|rows| {
                    let values = numeric_values(column, name, rows)?;
                    if values.is_empty() {
                        Ok(None)
                    } else {
                        Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
                    }
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Column::Float64(Float64Column::from_options(means)))
        }
        Reduction::Median => {
            let medians = groups
                .iter()
                .map(|rows| {
                    let mut values = numeric_values(column, name, rows)?;
                    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
                    Ok(median_of_sorted(&values))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Column::Float64(Float64Column::from_options(medians)))
        }
    }
}

/// Build the output column by picking one source row per group
fn select_rows<F>(column: &Column, groups: &[Vec<usize>], pick: F) -> Column
where
    F: Fn(&[usize], &Column) -> Option<usize>,
{
    let indices: Vec<Option<usize>> = groups.iter().map(|rows| pick(rows, column)).collect();
    column.take(&indices)
}

fn best_row(rows: &[usize], column: &Column, wanted: Ordering) -> Option<usize> {
    let mut best: Option<usize> = None;
    for &row in rows {
        if column.is_null(row) {
            continue;
        }
        best = match best {
            None => Some(row),
            Some(current) => {
                if column.compare_values(row, current) == Some(wanted) {
                    Some(row)
                } else {
                    Some(current)
                }
            }
        };
    }
    best
}

/// Most frequent non-null value; ties go to the value seen first
fn mode_row(rows: &[usize], column: &Column) -> Option<usize> {
    let mut counts: Vec<(usize, usize)> = Vec::new(); // (count, first row)
    let mut positions: HashMap<String, usize> = HashMap::new();
    for &row in rows {
        if let Some(key) = column.format_value(row) {
            match positions.get(&key).copied() {
                Some(pos) => counts[pos].0 += 1,
                None => {
                    positions.insert(key, counts.len());
                    counts.push((1, row));
                }
            }
        }
    }
    let mut best: Option<(usize, usize)> = None;
    for (count, row) in counts {
        if best.map_or(true, |(best_count, _)| count > best_count) {
            best = Some((count, row));
        }
    }
    best.map(|(_, row)| row)
}

fn sum_column(column: &Column, name: &str, groups: &[Vec<usize>]) -> Result<Column> {
    match column {
        Column::Int64(col) => {
            let sums: Vec<i64> = groups
                .iter()
                .map(|rows| {
                    rows.iter()
                        .filter_map(|&row| col.get(row).ok().flatten().copied())
                        .sum()
                })
                .collect();
            Ok(Column::Int64(Int64Column::new(sums)))
        }
        Column::Float64(col) => {
            let sums: Vec<f64> = groups
                .iter()
                .map(|rows| {
                    rows.iter()
                        .filter_map(|&row| col.get(row).ok().flatten().copied())
                        .sum()
                })
                .collect();
            Ok(Column::Float64(Float64Column::new(sums)))
        }
        _ => Err(Error::Type(format!(
            "Column '{}' is not a numeric type",
            name
        ))),
    }
}

fn numeric_values(column: &Column, name: &str, rows: &[usize]) -> Result<Vec<f64>> {
    match column {
        Column::Int64(col) => Ok(rows
            .iter()
            .filter_map(|&row| col.get(row).ok().flatten().map(|v| *v as f64))
            .collect()),
        Column::Float64(col) => Ok(rows
            .iter()
            .filter_map(|&row| col.get(row).ok().flatten().copied())
            .collect()),
        _ => Err(Error::Type(format!(
            "Column '{}' is not a numeric type",
            name
        ))),
    }
}

fn median_of_sorted(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}
