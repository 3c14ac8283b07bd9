use crate::error::{Error, Result};
use crate::frame::core::DataFrame;

/// Row-removal policy for null handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropNaHow {
    /// Drop a row when any of the considered columns is null
    Any,
    /// Drop a row only when all of the considered columns are null
    All,
}

impl DataFrame {
    /// New DataFrame with the rows selected by `indices`, in that order.
    /// A `None` index produces an all-null row.
    pub fn take_rows(&self, indices: &[Option<usize>]) -> Self {
        let mut df = Self::new();
        for (name, column) in self.column_names.iter().zip(&self.columns) {
            // add_column cannot fail here: names are already unique and all
            // taken columns share indices.len() rows
            let _ = df.add_column(name.clone(), column.take(indices));
        }
        df.row_count = indices.len();
        df
    }

    /// New DataFrame keeping the rows where `mask` is true
    pub fn filter_rows(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.row_count {
            return Err(Error::InconsistentRowCount {
                expected: self.row_count,
                found: mask.len(),
            });
        }
        let indices: Vec<Option<usize>> = mask
            .iter()
            .enumerate()
            .filter(|(_, &keep)| keep)
            .map(|(i, _)| Some(i))
            .collect();
        Ok(self.take_rows(&indices))
    }

    /// New DataFrame without rows containing nulls, per `how`, considering
    /// only `subset` columns (all columns when `None`)
    pub fn drop_null_rows(&self, how: DropNaHow, subset: Option<&[&str]>) -> Result<Self> {
        let considered: Vec<&str> = match subset {
            Some(names) => {
                for &name in names {
                    if !self.contains_column(name) {
                        return Err(Error::ColumnNotFound(name.to_string()));
                    }
                }
                names.to_vec()
            }
            None => self.column_names.iter().map(String::as_str).collect(),
        };

        if considered.is_empty() {
            return Ok(self.clone());
        }

        let mut mask = Vec::with_capacity(self.row_count);
        for row in 0..self.row_count {
            let null_flags = considered
                .iter()
                .map(|&name| self.column(name).map(|c| c.is_null(row)));
            let mut any_null = false;
            let mut all_null = true;
            for flag in null_flags {
                let is_null = flag?;
                any_null |= is_null;
                all_null &= is_null;
            }
            let drop = match how {
                DropNaHow::Any => any_null,
                DropNaHow::All => all_null,
            };
            mask.push(!drop);
        }
        self.filter_rows(&mask)
    }
}
