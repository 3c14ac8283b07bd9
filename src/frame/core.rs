use std::collections::HashMap;
use std::fmt;

use crate::column::{Column, PhysicalType};
use crate::error::{Error, Result};

/// Column-oriented dataframe: named columns of equal length in insertion order.
#[derive(Debug, Clone, Default)]
pub struct DataFrame {
    pub(crate) columns: Vec<Column>,
    pub(crate) column_indices: HashMap<String, usize>,
    pub(crate) column_names: Vec<String>,
    pub(crate) row_count: usize,
}

impl DataFrame {
    /// Create a new empty DataFrame
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a DataFrame from an ordered list of named columns
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        let mut df = Self::new();
        for (name, column) in columns {
            df.add_column(name, column)?;
        }
        Ok(df)
    }

    /// Append a column; the name must be fresh and the length consistent
    pub fn add_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.column_indices.contains_key(&name) {
            return Err(Error::DuplicateColumnName(name));
        }
        if !self.columns.is_empty() && column.len() != self.row_count {
            return Err(Error::InconsistentRowCount {
                expected: self.row_count,
                found: column.len(),
            });
        }

        if self.columns.is_empty() {
            self.row_count = column.len();
        }
        self.column_indices.insert(name.clone(), self.columns.len());
        self.column_names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Add a column or replace an existing one in place
    pub fn set_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        match self.column_indices.get(&name).copied() {
            Some(idx) => {
                if column.len() != self.row_count {
                    return Err(Error::InconsistentRowCount {
                        expected: self.row_count,
                        found: column.len(),
                    });
                }
                self.columns[idx] = column;
                Ok(())
            }
            None => self.add_column(name, column),
        }
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.column_indices.contains_key(name)
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.column_indices
            .get(name)
            .map(|&idx| &self.columns[idx])
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// New DataFrame containing only the requested columns, in request order
    pub fn select_columns(&self, columns: &[&str]) -> Result<Self> {
        let mut df = Self::new();
        for &name in columns {
            df.add_column(name, self.column(name)?.clone())?;
        }
        Ok(df)
    }

    /// New DataFrame with columns renamed per the mapping.
    ///
    /// Mapping keys that match no column are ignored; a rename that would
    /// collide with another resulting column name fails.
    pub fn rename_columns(&self, mapping: &HashMap<String, String>) -> Result<Self> {
        let mut df = Self::new();
        for (name, column) in self.column_names.iter().zip(&self.columns) {
            let new_name = mapping.get(name).unwrap_or(name);
            df.add_column(new_name.clone(), column.clone())?;
        }
        df.row_count = self.row_count;
        Ok(df)
    }

    /// New DataFrame without the named columns
    pub fn drop_columns(&self, columns: &[&str], ignore_missing: bool) -> Result<Self> {
        if !ignore_missing {
            for &name in columns {
                if !self.contains_column(name) {
                    return Err(Error::ColumnNotFound(name.to_string()));
                }
            }
        }
        let mut df = Self::new();
        for (name, column) in self.column_names.iter().zip(&self.columns) {
            if !columns.contains(&name.as_str()) {
                df.add_column(name.clone(), column.clone())?;
            }
        }
        df.row_count = if df.columns.is_empty() { 0 } else { self.row_count };
        Ok(df)
    }

    /// The physical types of all columns, in column order
    pub fn physical_types(&self) -> Vec<PhysicalType> {
        self.columns.iter().map(Column::physical_type).collect()
    }
}

impl fmt::Display for DataFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Maximum display rows
        const MAX_ROWS: usize = 10;

        if self.columns.is_empty() {
            return write!(f, "DataFrame (0 rows x 0 columns)");
        }

        writeln!(
            f,
            "DataFrame ({} rows x {} columns):",
            self.row_count,
            self.columns.len()
        )?;

        write!(f, "{:<5} |", "idx")?;
        for name in &self.column_names {
            write!(f, " {:<15} |", name)?;
        }
        writeln!(f)?;

        write!(f, "{:-<5}-+", "")?;
        for _ in &self.column_names {
            write!(f, "-{:-<15}-+", "")?;
        }
        writeln!(f)?;

        let display_rows = std::cmp::min(self.row_count, MAX_ROWS);
        for i in 0..display_rows {
            write!(f, "{:<5} |", i)?;
            for column in &self.columns {
                let rendered = match column.format_value(i) {
                    Some(value) => match column {
                        Column::String(_) => format!("\"{}\"", value),
                        _ => value,
                    },
                    None => "NULL".to_string(),
                };
                write!(f, " {:<15} |", rendered)?;
            }
            writeln!(f)?;
        }

        if self.row_count > MAX_ROWS {
            writeln!(f, "... ({} more rows)", self.row_count - MAX_ROWS)?;
        }

        Ok(())
    }
}
