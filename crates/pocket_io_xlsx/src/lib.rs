//! `pocket_io_xlsx`:
//! tag-driven record <-> spreadsheet mapping.
//!
//! - `conf`      : constants and default formats
//! - `spec`      : record trait, sheet/column models, errors
//! - `formatter` : enum/time cell formatters
//! - `util`      : pure helpers (sheet names, merge runs, coercion)
//! - `writer`    : exporter over rust_xlsxwriter
//! - `reader`    : importer over calamine
pub mod conf;
pub mod formatter;
pub mod reader;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_TAGGED_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
    derive_default_content_format, derive_default_header_format,
};
pub use formatter::{EnumFormatter, SpecEnumTable, SpecFormatterOptions};
pub use reader::{SpecImportColumn, XlsxImporter, import_sheet, plan_import_columns};
pub use spec::{
    EnumCellValue, EnumFieldSlot, SpecCellFormat, SpecColumnOverride, SpecColumnPlan,
    SpecFreezePane, SpecMergeRange, SpecSheet, SpecXlsxFieldTag, SpecXlsxSheetReport, XlsxError,
    XlsxRecord,
};
pub use util::{MergeRunTracker, apply_cell_text, derive_column_letter, sanitize_sheet_name};
pub use writer::{XlsxExporter, export_sheet, plan_columns};
