//! XLSX constants and default format presets.

use crate::spec::SpecCellFormat;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];
/// Tagged fields are laid out on single-letter columns `A..=Z`.
pub const N_NCOLS_TAGGED_MAX: usize = 26;

/// Formatter option key holding `code:label` pairs.
pub const C_FORMATTER_KEY_ENUM: &str = "enum";
/// Formatter option key holding a time layout.
pub const C_FORMATTER_KEY_TIME: &str = "time";
/// Text written by the import time formatter when parsing fails.
pub const C_TIME_IMPORT_FALLBACK: &str = "0";

/// Header row: amber fill with thin borders.
pub fn derive_default_header_format() -> SpecCellFormat {
    SpecCellFormat {
        border: Some(1),
        bg_color: Some("#FFC408".to_string()),
        ..Default::default()
    }
}

/// Body cells: thin borders, left aligned, wrapped.
pub fn derive_default_content_format() -> SpecCellFormat {
    SpecCellFormat {
        border: Some(1),
        align: Some("left".to_string()),
        text_wrap: Some(true),
        ..Default::default()
    }
}
