//! Boolean filter tree attached to a query's WHERE clause.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Read access to the fields of a row, used to evaluate a [`Filter`] in memory.
pub trait FieldSource {
    /// Value of `field`, or `None` when the field is not set on the row.
    fn field(&self, name: &str) -> Option<&str>;
}

impl FieldSource for std::collections::HashMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl FieldSource for std::collections::BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// Filter predicate over document fields.
///
/// Interior nodes are binary so that composition keeps an explicit left and
/// right operand: `a.and(b)` always yields `And(a, b)`, never a flattened list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// `field IS NULL`
    IsNull(String),
    /// `field IS NOT NULL`
    IsNotNull(String),
    /// `field = 'value'`
    Eq { field: String, value: String },
    /// `field <> 'value'`
    NotEq { field: String, value: String },
    /// `field IN ('a', 'b', ...)`
    In { field: String, values: Vec<String> },
    /// Conjunction
    And(Box<Filter>, Box<Filter>),
    /// Disjunction
    Or(Box<Filter>, Box<Filter>),
    /// Negation
    Not(Box<Filter>),
}

impl Filter {
    pub fn is_null(field: impl Into<String>) -> Self {
        Filter::IsNull(field.into())
    }

    pub fn is_not_null(field: impl Into<String>) -> Self {
        Filter::IsNotNull(field.into())
    }

    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn not_eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::NotEq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn in_list<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// `self AND rhs`, with `self` as the left operand.
    pub fn and(self, rhs: Filter) -> Self {
        Filter::And(Box::new(self), Box::new(rhs))
    }

    /// `self OR rhs`, with `self` as the left operand.
    pub fn or(self, rhs: Filter) -> Self {
        Filter::Or(Box::new(self), Box::new(rhs))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Filter::Not(Box::new(self))
    }

    /// Check if a row matches this filter.
    ///
    /// Comparisons against an unset field are false, as in SQL; only
    /// `IS NULL` matches an unset field.
    pub fn matches(&self, row: &dyn FieldSource) -> bool {
        match self {
            Filter::IsNull(field) => row.field(field).is_none(),
            Filter::IsNotNull(field) => row.field(field).is_some(),
            Filter::Eq { field, value } => row.field(field).map(|v| v == value).unwrap_or(false),
            Filter::NotEq { field, value } => {
                row.field(field).map(|v| v != value).unwrap_or(false)
            }
            Filter::In { field, values } => row
                .field(field)
                .map(|v| values.iter().any(|candidate| candidate == v))
                .unwrap_or(false),
            Filter::And(left, right) => left.matches(row) && right.matches(row),
            Filter::Or(left, right) => left.matches(row) || right.matches(row),
            Filter::Not(inner) => !inner.matches(row),
        }
    }

    /// True if `conjunct` is this filter or one of its top-level AND operands.
    pub fn contains_conjunct(&self, conjunct: &Filter) -> bool {
        if self == conjunct {
            return true;
        }
        match self {
            Filter::And(left, right) => {
                left.contains_conjunct(conjunct) || right.contains_conjunct(conjunct)
            }
            _ => false,
        }
    }

    /// Names of every field referenced anywhere in the tree, in first-seen order.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Filter::IsNull(field)
            | Filter::IsNotNull(field)
            | Filter::Eq { field, .. }
            | Filter::NotEq { field, .. }
            | Filter::In { field, .. } => {
                if !out.contains(&field.as_str()) {
                    out.push(field);
                }
            }
            Filter::And(left, right) | Filter::Or(left, right) => {
                left.collect_fields(out);
                right.collect_fields(out);
            }
            Filter::Not(inner) => inner.collect_fields(out),
        }
    }

    fn is_binary(&self) -> bool {
        matches!(self, Filter::And(..) | Filter::Or(..))
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    write!(f, "'{}'", value.replace('\'', "''"))
}

fn write_operand(f: &mut fmt::Formatter<'_>, parent: &Filter, child: &Filter) -> fmt::Result {
    let same_op = matches!(
        (parent, child),
        (Filter::And(..), Filter::And(..)) | (Filter::Or(..), Filter::Or(..))
    );
    if child.is_binary() && !same_op {
        write!(f, "({})", child)
    } else {
        write!(f, "{}", child)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::IsNull(field) => write!(f, "{} IS NULL", field),
            Filter::IsNotNull(field) => write!(f, "{} IS NOT NULL", field),
            Filter::Eq { field, value } => {
                write!(f, "{} = ", field)?;
                write_literal(f, value)
            }
            Filter::NotEq { field, value } => {
                write!(f, "{} <> ", field)?;
                write_literal(f, value)
            }
            Filter::In { field, values } => {
                write!(f, "{} IN (", field)?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_literal(f, value)?;
                }
                f.write_str(")")
            }
            Filter::And(left, right) => {
                write_operand(f, self, left)?;
                f.write_str(" AND ")?;
                write_operand(f, self, right)
            }
            Filter::Or(left, right) => {
                write_operand(f, self, left)?;
                f.write_str(" OR ")?;
                write_operand(f, self, right)
            }
            Filter::Not(inner) => {
                if inner.is_binary() {
                    write!(f, "NOT ({})", inner)
                } else {
                    write!(f, "NOT {}", inner)
                }
            }
        }
    }
}
