use std::fmt;
use std::str::FromStr;

use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region Record

/// Static SQL schema of a record type.
///
/// `sql_tags` lists one tag per field in declared order, formatted as
/// `column[,add][,set][,sort]`. An empty tag leaves the field out.
/// `sql_values` yields one entry per tag, `None` for absent values.
pub trait SqlRecord {
    fn sql_tags() -> &'static [&'static str];

    fn sql_values(&self) -> Vec<Option<EnumSqlValue>>;
}

/// Positional parameter bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumSqlValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Bytes(Vec<u8>),
}

impl fmt::Display for EnumSqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Bytes(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

impl From<i32> for EnumSqlValue {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<i64> for EnumSqlValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for EnumSqlValue {
    fn from(value: u32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<f32> for EnumSqlValue {
    fn from(value: f32) -> Self {
        Self::Float(value as f64)
    }
}

impl From<f64> for EnumSqlValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for EnumSqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for EnumSqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<bool> for EnumSqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<u8>> for EnumSqlValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

/// Record argument of a build: one row or a batch.
#[derive(Debug)]
pub enum EnumSqlModel<'a, T> {
    Row(&'a T),
    Rows(&'a [T]),
}

impl<T> Clone for EnumSqlModel<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for EnumSqlModel<'_, T> {}

impl<T> EnumSqlModel<'_, T> {
    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::Row(_) => "row",
            Self::Rows(_) => "rows",
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Tag

/// Parsed `column,flag,...` tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecSqlFieldTag {
    pub idx_field: usize,
    pub column: String,
    pub if_add: bool,
    pub if_set: bool,
    pub if_sort: bool,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Fragment

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumSqlAction {
    AddRow,
    AddRows,
    Set,
}

impl EnumSqlAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddRow => "add-row",
            Self::AddRows => "add-rows",
            Self::Set => "set",
        }
    }
}

impl fmt::Display for EnumSqlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnumSqlAction {
    type Err = SqlBuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add-row" => Ok(Self::AddRow),
            "add-rows" => Ok(Self::AddRows),
            "set" => Ok(Self::Set),
            _ => Err(SqlBuildError::Parameter {
                message: format!("unknown action `{s}`"),
            }),
        }
    }
}

/// SQL text plus positional parameters in placeholder order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecSqlFragment {
    pub sql: String,
    pub params: Vec<EnumSqlValue>,
}

impl SpecSqlFragment {
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqlBuildError {
    #[error("Parameter error: {message}")]
    Parameter { message: String },
    #[error("Invalid sql tag `{tag}` on field {idx_field}")]
    InvalidTag { idx_field: usize, tag: String },
    #[error("Schema mismatch: {n_tags} tags but {n_values} values")]
    SchemaMismatch { n_tags: usize, n_values: usize },
    #[error("No data to build sql from")]
    NoData,
    #[error("Column count differs: row {idx_row} has {n_found}, expected {n_expected}")]
    RaggedBatch {
        idx_row: usize,
        n_expected: usize,
        n_found: usize,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
