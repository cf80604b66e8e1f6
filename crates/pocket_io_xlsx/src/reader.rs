//! Tag-driven XLSX importer over calamine.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use crate::formatter::{EnumFormatter, SpecFormatterOptions};
use crate::spec::{XlsxError, XlsxRecord};
use crate::util::apply_cell_text;

/// Header match for one sheet column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecImportColumn {
    pub idx_field: usize,
    pub column: String,
    pub formatter: Option<EnumFormatter>,
}

/// Map header cells to fields by exact column name. Unmatched headers map to `None`.
pub fn plan_import_columns<T: XlsxRecord>(
    l_header: &[String],
) -> Result<Vec<Option<SpecImportColumn>>, XlsxError> {
    let l_tags = T::xlsx_tags();
    let mut l_columns = Vec::with_capacity(l_header.len());
    for c_header in l_header {
        let Some((idx_field, tag)) = l_tags
            .iter()
            .enumerate()
            .find(|(_, tag)| tag.is_tagged() && tag.column == c_header)
        else {
            tracing::debug!(header = %c_header, "Ignoring unmatched header");
            l_columns.push(None);
            continue;
        };

        let options = SpecFormatterOptions::parse(tag.formatter).map_err(|message| {
            XlsxError::InvalidFormatter {
                column: tag.column.to_string(),
                formatter: tag.formatter.to_string(),
                message,
            }
        })?;
        l_columns.push(Some(SpecImportColumn {
            idx_field,
            column: tag.column.to_string(),
            formatter: options.resolve(),
        }));
    }
    Ok(l_columns)
}

/// Workbook opened for import.
pub struct XlsxImporter {
    workbook: Xlsx<Cursor<Vec<u8>>>,
}

impl XlsxImporter {
    pub fn from_bytes(v_bytes: &[u8]) -> Result<Self, XlsxError> {
        let workbook = Xlsx::new(Cursor::new(v_bytes.to_vec())).inspect_err(|err| {
            tracing::error!(error = %err, "Failed to open workbook");
        })?;
        Ok(Self { workbook })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// Append one record per data row of `sheet_name` to `l_out`.
    ///
    /// The first row is the header. Empty cells are skipped; a cell that
    /// cannot be coerced is logged and leaves the field at its default.
    /// Returns the number of records appended.
    pub fn read_sheet_into<T: XlsxRecord>(
        &mut self,
        sheet_name: &str,
        l_out: &mut Vec<T>,
    ) -> Result<usize, XlsxError> {
        let range = self.workbook.worksheet_range(sheet_name).inspect_err(|err| {
            tracing::error!(sheet = sheet_name, error = %err, "Failed to read sheet");
        })?;

        let mut iter_rows = range.rows();
        let Some(row_header) = iter_rows.next() else {
            return Ok(0);
        };
        let l_header: Vec<String> = row_header.iter().map(derive_cell_text).collect();
        let l_columns = plan_import_columns::<T>(&l_header)?;

        let n_before = l_out.len();
        for (idx_row, row) in iter_rows.enumerate() {
            let mut record = T::default();
            for (idx_cell, cell) in row.iter().enumerate() {
                let Some(Some(spec_col)) = l_columns.get(idx_cell) else {
                    continue;
                };
                let c_text = derive_cell_text(cell);
                if c_text.is_empty() {
                    continue;
                }

                let c_value = match &spec_col.formatter {
                    Some(formatter) => formatter.format_import(&c_text),
                    None => c_text,
                };
                if let Err(message) = apply_cell_text(record.xlsx_slot(spec_col.idx_field), &c_value) {
                    tracing::error!(
                        sheet = sheet_name,
                        row = idx_row + 2,
                        column = %spec_col.column,
                        error = %message,
                        "Failed to import cell"
                    );
                }
            }
            l_out.push(record);
        }
        Ok(l_out.len() - n_before)
    }

    pub fn read_sheet<T: XlsxRecord>(&mut self, sheet_name: &str) -> Result<Vec<T>, XlsxError> {
        let mut l_out = Vec::new();
        self.read_sheet_into(sheet_name, &mut l_out)?;
        Ok(l_out)
    }
}

/// Import one sheet from xlsx bytes.
pub fn import_sheet<T: XlsxRecord>(v_bytes: &[u8], sheet_name: &str) -> Result<Vec<T>, XlsxError> {
    XlsxImporter::from_bytes(v_bytes)?.read_sheet(sheet_name)
}

fn derive_cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(val) => val.clone(),
        _ => cell.to_string(),
    }
}
