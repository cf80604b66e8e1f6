//! Shared XLSX specification models.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::formatter::EnumFormatter;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Top border override.
    pub top: Option<i64>,
    /// Bottom border override.
    pub bottom: Option<i64>,
    /// Left border override.
    pub left: Option<i64>,
    /// Right border override.
    pub right: Option<i64>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Lay `other` over `self`: every field `other` sets wins.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            top: other.top.or(self.top),
            bottom: other.bottom.or(self.bottom),
            left: other.left.or(self.left),
            right: other.right.or(self.right),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValue

/// Normalized cell value during conversion/write pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
}

impl EnumCellValue {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Display text: integral numbers print without a fraction, `None` is empty.
    pub fn to_text(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::String(v) => v.clone(),
            Self::Number(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15 => {
                format!("{}", *v as i64)
            }
            Self::Number(v) => v.to_string(),
            Self::Boolean(v) => v.to_string(),
        }
    }
}

impl fmt::Display for EnumCellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<i32> for EnumCellValue {
    fn from(value: i32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i64> for EnumCellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<f32> for EnumCellValue {
    fn from(value: f32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for EnumCellValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl<T: Into<EnumCellValue>> From<Option<T>> for EnumCellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Record

/// Per-field spreadsheet tag: display column name plus formatter options.
///
/// An empty `column` leaves the field out of export and import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecXlsxFieldTag {
    pub column: &'static str,
    /// Query-string options, e.g. `enum=1:Active,2:Closed` or `time=%Y-%m-%d`.
    pub formatter: &'static str,
}

impl SpecXlsxFieldTag {
    pub const fn new(column: &'static str) -> Self {
        Self {
            column,
            formatter: "",
        }
    }

    pub const fn with_formatter(column: &'static str, formatter: &'static str) -> Self {
        Self { column, formatter }
    }

    pub const fn skip() -> Self {
        Self::new("")
    }

    pub fn is_tagged(&self) -> bool {
        !self.column.is_empty()
    }
}

/// Mutable handle to one record field, used by import coercion.
#[derive(Debug)]
pub enum EnumFieldSlot<'a> {
    Int(&'a mut i32),
    Int64(&'a mut i64),
    Str(&'a mut String),
    F32(&'a mut f32),
    F64(&'a mut f64),
    Bool(&'a mut bool),
    OptInt(&'a mut Option<i32>),
    OptInt64(&'a mut Option<i64>),
    OptStr(&'a mut Option<String>),
    OptF32(&'a mut Option<f32>),
    OptF64(&'a mut Option<f64>),
    OptBool(&'a mut Option<bool>),
    /// Field type the importer cannot fill; carries the type name for logs.
    Unsupported(&'static str),
}

/// Static spreadsheet schema of a record type.
///
/// `xlsx_tags` has one entry per field in declared order; `idx_field`
/// arguments index into it.
pub trait XlsxRecord: Default {
    fn xlsx_tags() -> &'static [SpecXlsxFieldTag];

    fn xlsx_value(&self, idx_field: usize) -> EnumCellValue;

    fn xlsx_slot(&mut self, idx_field: usize) -> EnumFieldSlot<'_>;
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetSpecification

/// Caller override for one column, keyed by column name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecColumnOverride {
    pub width: Option<f64>,
    /// Collapse contiguous equal values into merged cells.
    pub if_merge: bool,
    /// Runs whose value starts with this prefix are never merged. Empty disables.
    pub merge_exclude: String,
    /// Laid over the sheet content format for this column.
    pub format: Option<SpecCellFormat>,
}

/// Frozen rows/columns, applied verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecFreezePane {
    pub row: u32,
    pub col: u16,
}

/// One sheet to export.
#[derive(Debug)]
pub struct SpecSheet<'a, T> {
    pub name: String,
    pub records: &'a [T],
    /// Falls back to the exporter header format.
    pub fmt_header: Option<SpecCellFormat>,
    /// Falls back to the exporter content format.
    pub fmt_content: Option<SpecCellFormat>,
    pub freeze_pane: Option<SpecFreezePane>,
    pub columns: BTreeMap<String, SpecColumnOverride>,
}

impl<'a, T> SpecSheet<'a, T> {
    pub fn new(name: impl Into<String>, records: &'a [T]) -> Self {
        Self {
            name: name.into(),
            records,
            fmt_header: None,
            fmt_content: None,
            freeze_pane: None,
            columns: BTreeMap::new(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>, spec: SpecColumnOverride) -> Self {
        self.columns.insert(column.into(), spec);
        self
    }

    pub fn with_freeze_pane(mut self, row: u32, col: u16) -> Self {
        self.freeze_pane = Some(SpecFreezePane { row, col });
        self
    }
}

/// Planned export column for one tagged field.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecColumnPlan {
    pub idx_field: usize,
    /// Zero-based worksheet column.
    pub idx_col: u16,
    pub column: String,
    pub width: Option<f64>,
    pub if_merge: bool,
    pub merge_exclude: String,
    pub fmt_content: SpecCellFormat,
    pub formatter: Option<EnumFormatter>,
    /// Dropdown labels when the field declares an enum table.
    pub l_dropdown_labels: Vec<String>,
}

/// Vertical merge emitted for one run (zero-based worksheet rows, inclusive).
#[derive(Debug, Clone, PartialEq)]
pub struct SpecMergeRange {
    pub row_start: u32,
    pub row_end: u32,
    pub value: EnumCellValue,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-sheet export report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxSheetReport {
    /// Actual unique sheet name in workbook.
    pub sheet_name: String,
    pub n_rows: usize,
    pub n_merges: usize,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxSheetReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

#[derive(Debug, Error)]
pub enum XlsxError {
    #[error("Too many tagged columns: {n_cols} > {n_max}")]
    ColumnOverflow { n_cols: usize, n_max: usize },
    #[error("Too many rows: {n_rows} > {n_max}")]
    RowOverflow { n_rows: usize, n_max: usize },
    #[error("Invalid formatter `{formatter}` on column `{column}`: {message}")]
    InvalidFormatter {
        column: String,
        formatter: String,
        message: String,
    },
    #[error("Index overflow: {0}")]
    IndexOverflow(String),
    #[error("Cannot write after finish().")]
    Finished,
    #[error("xlsx write error: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
    #[error("xlsx read error: {0}")]
    Read(#[from] calamine::XlsxError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
