use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use log::{debug, trace};

use crate::aggregations::AggregateExpr;
use crate::column::Column;
use crate::error::{Error, Result};
use crate::frame::{DataFrame, DropNaHow, JoinType, Reduction};
use crate::schema::{merge_schemas, types, DropBehavior, Schema};

/// Declared relationship between join keys, checked against the schemas
/// before a join executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToOne,
    #[default]
    ManyToMany,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::OneToOne => "one-to-one",
            Cardinality::OneToMany => "one-to-many",
            Cardinality::ManyToOne => "many-to-one",
            Cardinality::ManyToMany => "many-to-many",
        }
    }

    fn left_is_one(&self) -> bool {
        matches!(self, Cardinality::OneToOne | Cardinality::OneToMany)
    }

    fn right_is_one(&self) -> bool {
        matches!(self, Cardinality::OneToOne | Cardinality::ManyToOne)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Cardinality {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "one-to-one" => Ok(Cardinality::OneToOne),
            "one-to-many" => Ok(Cardinality::OneToMany),
            "many-to-one" => Ok(Cardinality::ManyToOne),
            "many-to-many" => Ok(Cardinality::ManyToMany),
            _ => Err(Error::InvalidCardinality(value.to_string())),
        }
    }
}

/// Options describing a merge: join keys, join type, declared cardinality
/// and collision suffixes.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub how: JoinType,
    pub cardinality: Cardinality,
    pub on: Option<Vec<String>>,
    pub left_on: Option<Vec<String>>,
    pub right_on: Option<Vec<String>>,
    pub suffixes: (String, String),
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            how: JoinType::default(),
            cardinality: Cardinality::default(),
            on: None,
            left_on: None,
            right_on: None,
            suffixes: ("_x".to_string(), "_y".to_string()),
        }
    }
}

impl MergeOptions {
    /// Join on columns sharing a name on both sides
    pub fn on<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            on: Some(keys.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Join on differently named key columns, paired positionally
    pub fn left_right<I, J, S, T>(left_on: I, right_on: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            left_on: Some(left_on.into_iter().map(Into::into).collect()),
            right_on: Some(right_on.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn how(mut self, how: JoinType) -> Self {
        self.how = how;
        self
    }

    pub fn cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    pub fn suffixes(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.suffixes = (left.into(), right.into());
        self
    }

    fn resolved_keys(&self) -> Result<(Vec<String>, Vec<String>)> {
        if let Some(on) = &self.on {
            if on.is_empty() {
                return Err(Error::MissingJoinKeys);
            }
            return Ok((on.clone(), on.clone()));
        }
        match (&self.left_on, &self.right_on) {
            (Some(left_on), Some(right_on)) if !left_on.is_empty() && !right_on.is_empty() => {
                if left_on.len() != right_on.len() {
                    return Err(Error::JoinKeyLengthMismatch {
                        left: left_on.len(),
                        right: right_on.len(),
                    });
                }
                Ok((left_on.clone(), right_on.clone()))
            }
            _ => Err(Error::MissingJoinKeys),
        }
    }
}

/// A raw dataframe paired with a declared [`Schema`].
///
/// Operations never mutate in place: each one derives a new schema through
/// the schema algebra, delegates the data transform to the engine and returns
/// a new frame. The schema is guaranteed to hold against the data only
/// immediately after [`TypedFrame::validate`].
#[derive(Debug, Clone)]
pub struct TypedFrame {
    data: DataFrame,
    schema: Schema,
}

impl TypedFrame {
    /// Pair raw data with a declared schema. No checking happens here; call
    /// [`TypedFrame::validate`] to enforce the schema.
    pub fn new(data: DataFrame, schema: impl Into<Schema>) -> Self {
        Self {
            data,
            schema: schema.into(),
        }
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn row_count(&self) -> usize {
        self.data.row_count()
    }

    /// Detach the raw data and schema
    pub fn into_parts(self) -> (DataFrame, Schema) {
        (self.data, self.schema)
    }

    /// Enforce the schema against the data.
    ///
    /// Columns are reordered to schema order (data columns missing from the
    /// schema are dropped) and converted to their declared representations.
    /// Missing columns fail with `MissingColumns`, impossible conversions
    /// with `TypeConversion`. With `strict`, nulls in non-nullable columns
    /// fail with `NullConstraint` and duplicates in unique columns with
    /// `UniquenessViolation`.
    pub fn validate(self, strict: bool) -> Result<Self> {
        debug!(
            "validating {} rows against {} schema columns (strict: {})",
            self.data.row_count(),
            self.schema.len(),
            strict
        );

        let missing: Vec<String> = self
            .schema
            .names()
            .iter()
            .filter(|name| !self.data.contains_column(name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingColumns(missing));
        }

        let mut data = DataFrame::new();
        for (name, ty) in self.schema.iter() {
            let column = self.data.column(name)?;
            let found = column.physical_type();
            let converted = if found == ty.representation {
                column.clone()
            } else {
                trace!("converting column {} from {} to {}", name, found, ty.representation);
                column
                    .cast(ty.representation)
                    .map_err(|_| Error::TypeConversion {
                        column: name.to_string(),
                        expected: ty.representation,
                        found,
                    })?
            };
            data.add_column(name.to_string(), converted)?;
        }

        if strict {
            for (name, ty) in self.schema.iter() {
                if !ty.nullable && data.column(name)?.null_count() > 0 {
                    return Err(Error::NullConstraint(name.to_string()));
                }
            }
            for (name, ty) in self.schema.iter() {
                if ty.unique && has_duplicates(data.column(name)?) {
                    return Err(Error::UniquenessViolation(name.to_string()));
                }
            }
        }

        Ok(Self {
            data,
            schema: self.schema,
        })
    }

    /// Add or overwrite columns.
    ///
    /// `additions` declares the type of every assigned column; an addition
    /// whose name already exists replaces that entry in place, new entries
    /// append. The result is validated (non-strict).
    pub fn assign<I, S>(&self, columns: I, additions: impl Into<Schema>) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        let mut data = self.data.clone();
        for (name, column) in columns {
            data.set_column(name, column)?;
        }
        let schema = self.schema.updated(&additions.into());
        Self { data, schema }.validate(false)
    }

    /// Keep the rows for which the predicate returns true. The schema passes
    /// through unchanged: filtering cannot alter types, and can only shrink
    /// a duplicate set.
    pub fn filter<F>(&self, predicate: F) -> Result<Self>
    where
        F: Fn(&DataFrame, usize) -> bool,
    {
        let mask: Vec<bool> = (0..self.data.row_count())
            .map(|row| predicate(&self.data, row))
            .collect();
        Ok(Self {
            data: self.data.filter_rows(&mask)?,
            schema: self.schema.clone(),
        })
    }

    /// Escape hatch: apply an arbitrary engine transform and declare the
    /// resulting schema, which is then validated (non-strict).
    pub fn pipe<F>(&self, func: F, schema: impl Into<Schema>) -> Result<Self>
    where
        F: FnOnce(&DataFrame) -> Result<DataFrame>,
    {
        Self {
            data: func(&self.data)?,
            schema: schema.into(),
        }
        .validate(false)
    }

    /// Rename data columns and schema keys together
    pub fn rename(&self, mapping: &HashMap<String, String>) -> Result<Self> {
        Ok(Self {
            data: self.data.rename_columns(mapping)?,
            schema: self.schema.rename(mapping)?,
        })
    }

    /// Remove the named columns from data and schema
    pub fn drop(&self, columns: &[&str], behavior: DropBehavior) -> Result<Self> {
        Ok(Self {
            data: self
                .data
                .drop_columns(columns, behavior == DropBehavior::Ignore)?,
            schema: self.schema.drop(columns, behavior)?,
        })
    }

    /// Project onto the requested columns, in request order
    pub fn select(&self, columns: &[&str]) -> Result<Self> {
        Ok(Self {
            data: self.data.select_columns(columns)?,
            schema: self.schema.select(columns)?,
        })
    }

    /// Replace the schema wholesale and validate, triggering conversion.
    /// Data columns absent from the new schema are dropped.
    pub fn astype(&self, schema: impl Into<Schema>) -> Result<Self> {
        Self {
            data: self.data.clone(),
            schema: schema.into(),
        }
        .validate(false)
    }

    /// Remove rows containing nulls and narrow the affected columns'
    /// nullability accordingly
    pub fn dropna(&self, how: DropNaHow, subset: Option<&[&str]>) -> Result<Self> {
        Ok(Self {
            data: self.data.drop_null_rows(how, subset)?,
            schema: self.schema.without_nulls(subset),
        })
    }

    /// Schema-checked join.
    ///
    /// The declared cardinality is verified against both schemas before any
    /// row is touched: a `one` side requires its key columns unique and
    /// non-nullable. The output schema comes from [`merge_schemas`]; the
    /// result is not re-validated.
    pub fn merge(&self, right: &TypedFrame, options: MergeOptions) -> Result<Self> {
        let (left_on, right_on) = options.resolved_keys()?;

        if options.cardinality.left_is_one() {
            for name in &left_on {
                let ty = self.schema.column_type(name)?;
                if !ty.unique || ty.nullable {
                    return Err(Error::CardinalityViolation {
                        column: name.clone(),
                        side: "one-to-x",
                    });
                }
            }
        }
        if options.cardinality.right_is_one() {
            for name in &right_on {
                let ty = right.schema.column_type(name)?;
                if !ty.unique || ty.nullable {
                    return Err(Error::CardinalityViolation {
                        column: name.clone(),
                        side: "x-to-one",
                    });
                }
            }
        }

        debug!(
            "merging on {:?}/{:?} ({}, {})",
            left_on, right_on, options.how_name(), options.cardinality
        );

        let schema = merge_schemas(
            &self.schema,
            &right.schema,
            &left_on,
            &right_on,
            (&options.suffixes.0, &options.suffixes.1),
            options.how == JoinType::Inner,
            options.cardinality == Cardinality::OneToOne,
        )?;
        let data = self.data.join(
            &right.data,
            &left_on,
            &right_on,
            options.how,
            (&options.suffixes.0, &options.suffixes.1),
        )?;
        Ok(Self { data, schema })
    }

    /// Group by the `by` columns and reduce with the named aggregations.
    ///
    /// The output schema keeps each `by` column's type — marked unique when
    /// grouping by a single column — and derives each aggregation's type from
    /// its source column. The result is not re-validated.
    pub fn aggregate<A, I>(&self, by: &[&str], aggregations: I) -> Result<Self>
    where
        A: AggregateExpr,
        I: IntoIterator<Item = (String, A)>,
    {
        let aggregations: Vec<(String, A)> = aggregations.into_iter().collect();

        let mut schema = Schema::new();
        for &name in by {
            let ty = *self.schema.column_type(name)?;
            let ty = if by.len() == 1 { types::unique(ty) } else { ty };
            schema.insert(name.to_string(), ty);
        }

        let mut specs: Vec<(String, String, Reduction)> = Vec::with_capacity(aggregations.len());
        for (out_name, aggregation) in &aggregations {
            let input = self.schema.column_type(aggregation.column())?;
            schema.insert(out_name.clone(), aggregation.output_type(input));
            specs.push((
                out_name.clone(),
                aggregation.column().to_string(),
                aggregation.reduction(),
            ));
        }

        debug!("aggregating by {:?} into {} columns", by, specs.len());
        let data = self.data.group_by(by)?.aggregate(&specs)?;
        Ok(Self { data, schema })
    }
}

impl MergeOptions {
    fn how_name(&self) -> &'static str {
        match self.how {
            JoinType::Inner => "inner",
            JoinType::Left => "left",
            JoinType::Right => "right",
            JoinType::Outer => "outer",
        }
    }
}

impl fmt::Display for TypedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data)?;
        writeln!(f)?;
        for (name, ty) in self.schema.iter() {
            writeln!(f, "{}: {}", name, ty)?;
        }
        Ok(())
    }
}

/// Duplicate check over rendered values; nulls compare equal to each other
fn has_duplicates(column: &Column) -> bool {
    let mut seen: HashSet<Option<String>> = HashSet::with_capacity(column.len());
    for row in 0..column.len() {
        if !seen.insert(column.format_value(row)) {
            return true;
        }
    }
    false
}
