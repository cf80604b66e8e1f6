//! Stateless helper utilities shared by the exporter and importer.

use crate::conf::{N_LEN_EXCEL_SHEET_NAME_MAX, TUP_EXCEL_ILLEGAL};
use crate::spec::{EnumCellValue, EnumFieldSlot, SpecMergeRange, XlsxError};

////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to a valid Excel sheet name.
///
/// Excel also rejects names that start or end with `'`.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    let c_name: String = c_name
        .trim()
        .trim_matches('\'')
        .trim()
        .chars()
        .take(N_LEN_EXCEL_SHEET_NAME_MAX)
        .collect();
    let c_name = c_name.trim_end_matches('\'').trim_end();
    if c_name.is_empty() {
        return "Sheet".to_string();
    }
    c_name.to_string()
}

/// `0 -> "A"`, `25 -> "Z"`, `26 -> "AA"`.
pub fn derive_column_letter(idx_col: usize) -> String {
    let mut l_chars = Vec::new();
    let mut n_rest = idx_col + 1;
    while n_rest > 0 {
        let n_digit = (n_rest - 1) % 26;
        l_chars.push((b'A' + n_digit as u8) as char);
        n_rest = (n_rest - 1) / 26;
    }
    l_chars.iter().rev().collect()
}

pub(crate) fn cast_row_num(value: usize) -> Result<u32, XlsxError> {
    u32::try_from(value).map_err(|_| XlsxError::IndexOverflow(format!("row index {value}")))
}

pub(crate) fn cast_col_num(value: usize) -> Result<u16, XlsxError> {
    u16::try_from(value).map_err(|_| XlsxError::IndexOverflow(format!("column index {value}")))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MergeRuns

#[derive(Debug)]
struct MergeRun {
    row_start: u32,
    row_end: u32,
    c_text: String,
    value: EnumCellValue,
}

/// Tracks contiguous equal values down one column.
///
/// A run closes when the value changes or on [`Self::finish`]. Closed runs
/// longer than one row are emitted unless their text is empty or starts with
/// the exclusion prefix.
#[derive(Debug, Default)]
pub struct MergeRunTracker {
    merge_exclude: String,
    run_current: Option<MergeRun>,
}

impl MergeRunTracker {
    pub fn new(merge_exclude: impl Into<String>) -> Self {
        Self {
            merge_exclude: merge_exclude.into(),
            run_current: None,
        }
    }

    /// Feed the value written at `row`; rows must be pushed in increasing order.
    pub fn push(&mut self, row: u32, value: &EnumCellValue) -> Option<SpecMergeRange> {
        let c_text = value.to_text();
        if let Some(run) = self.run_current.as_mut()
            && run.c_text == c_text
        {
            run.row_end = row;
            return None;
        }

        let range_closed = self.close();
        self.run_current = Some(MergeRun {
            row_start: row,
            row_end: row,
            c_text,
            value: value.clone(),
        });
        range_closed
    }

    /// Close the open run, if any.
    pub fn finish(&mut self) -> Option<SpecMergeRange> {
        self.close()
    }

    fn close(&mut self) -> Option<SpecMergeRange> {
        let run = self.run_current.take()?;
        if run.row_end <= run.row_start || run.c_text.is_empty() {
            return None;
        }
        if !self.merge_exclude.is_empty() && run.c_text.starts_with(&self.merge_exclude) {
            return None;
        }
        Some(SpecMergeRange {
            row_start: run.row_start,
            row_end: run.row_end,
            value: run.value,
        })
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ImportCoercion

/// Store `text` into the field behind `slot`.
///
/// Bool fields are `true` only for the text `"true"`. On error the field is
/// left untouched.
pub fn apply_cell_text(slot: EnumFieldSlot<'_>, text: &str) -> Result<(), String> {
    fn parse<T>(text: &str) -> Result<T, String>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        text.parse::<T>()
            .map_err(|err| format!("cannot parse `{text}`: {err}"))
    }

    match slot {
        EnumFieldSlot::Int(v) => *v = parse(text)?,
        EnumFieldSlot::Int64(v) => *v = parse(text)?,
        EnumFieldSlot::Str(v) => *v = text.to_string(),
        EnumFieldSlot::F32(v) => *v = parse(text)?,
        EnumFieldSlot::F64(v) => *v = parse(text)?,
        EnumFieldSlot::Bool(v) => *v = text == "true",
        EnumFieldSlot::OptInt(v) => *v = Some(parse(text)?),
        EnumFieldSlot::OptInt64(v) => *v = Some(parse(text)?),
        EnumFieldSlot::OptStr(v) => *v = Some(text.to_string()),
        EnumFieldSlot::OptF32(v) => *v = Some(parse(text)?),
        EnumFieldSlot::OptF64(v) => *v = Some(parse(text)?),
        EnumFieldSlot::OptBool(v) => *v = Some(text == "true"),
        EnumFieldSlot::Unsupported(type_name) => {
            return Err(format!("unsupported field type `{type_name}`"));
        }
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
