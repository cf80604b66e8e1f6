//! Tag-driven XLSX exporter: one sheet per record group, buffered in memory.

use std::collections::BTreeSet;

use rust_xlsxwriter::{DataValidation, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_TAGGED_MAX, N_NROWS_EXCEL_MAX,
    derive_default_content_format, derive_default_header_format,
};
use crate::formatter::SpecFormatterOptions;
use crate::spec::{
    EnumCellValue, SpecCellFormat, SpecColumnPlan, SpecMergeRange, SpecSheet, SpecXlsxSheetReport,
    XlsxError, XlsxRecord,
};
use crate::util::{
    MergeRunTracker, cast_col_num, cast_row_num, derive_column_letter, sanitize_sheet_name,
};

/// Stateful workbook exporter.
pub struct XlsxExporter {
    workbook: Workbook,
    fmt_header: SpecCellFormat,
    fmt_content: SpecCellFormat,
    set_sheet_names_existing: BTreeSet<String>,
    l_reports: Vec<SpecXlsxSheetReport>,
    n_sheets: usize,
    if_finished: bool,
}

impl Default for XlsxExporter {
    fn default() -> Self {
        Self::new(derive_default_header_format(), derive_default_content_format())
    }
}

impl XlsxExporter {
    /// Create exporter with workbook-wide header/content formats.
    ///
    /// The workbook is buffered in memory until [`Self::finish`] is called.
    pub fn new(fmt_header: SpecCellFormat, fmt_content: SpecCellFormat) -> Self {
        Self {
            workbook: Workbook::new(),
            fmt_header,
            fmt_content,
            set_sheet_names_existing: BTreeSet::new(),
            l_reports: Vec::new(),
            n_sheets: 0,
            if_finished: false,
        }
    }

    /// Return immutable snapshot of per-sheet reports.
    pub fn report(&self) -> Vec<SpecXlsxSheetReport> {
        self.l_reports.clone()
    }

    /// Activate the last sheet and serialize the workbook.
    ///
    /// Further writes fail; calling again returns the same workbook.
    pub fn finish(&mut self) -> Result<Vec<u8>, XlsxError> {
        if !self.if_finished && self.n_sheets > 0 {
            self.workbook
                .worksheet_from_index(self.n_sheets - 1)?
                .set_active(true);
        }
        self.if_finished = true;
        Ok(self.workbook.save_to_buffer()?)
    }

    /// Write one sheet: header row, body rows, dropdowns, merges, freeze pane.
    pub fn write_sheet<T: XlsxRecord>(&mut self, sheet: &SpecSheet<'_, T>) -> Result<(), XlsxError> {
        if self.if_finished {
            return Err(XlsxError::Finished);
        }
        if sheet.records.len() + 1 > N_NROWS_EXCEL_MAX {
            return Err(XlsxError::RowOverflow {
                n_rows: sheet.records.len() + 1,
                n_max: N_NROWS_EXCEL_MAX,
            });
        }

        let fmt_content_sheet = sheet
            .fmt_content
            .clone()
            .unwrap_or_else(|| self.fmt_content.clone());
        let l_plans = plan_columns::<T>(sheet, &fmt_content_sheet)?;

        let fmt_header = derive_rust_xlsx_format(
            sheet.fmt_header.as_ref().unwrap_or(&self.fmt_header),
        );
        let sheet_name_unique = self.derive_unique_sheet_name(&sanitize_sheet_name(&sheet.name, "_"));
        let mut report = SpecXlsxSheetReport {
            sheet_name: sheet_name_unique.clone(),
            n_rows: sheet.records.len(),
            ..Default::default()
        };

        // Built detached; only a fully written sheet joins the workbook.
        let mut worksheet = Worksheet::new();
        worksheet.set_name(&sheet_name_unique)?;
        write_header(&mut worksheet, &l_plans, &fmt_header, sheet.records.len(), &mut report)?;
        write_body(&mut worksheet, &l_plans, sheet.records, &mut report)?;
        if let Some(pane) = sheet.freeze_pane {
            worksheet.set_freeze_panes(pane.row, pane.col)?;
        }

        self.workbook.push_worksheet(worksheet);
        self.n_sheets += 1;
        self.set_sheet_names_existing
            .insert(sheet_name_unique.to_lowercase());

        tracing::debug!(
            sheet = %report.sheet_name,
            n_rows = report.n_rows,
            n_merges = report.n_merges,
            n_warnings = report.warnings.len(),
            "Exported sheet"
        );
        self.l_reports.push(report);
        Ok(())
    }

    /// Excel compares sheet names case-insensitively.
    fn derive_unique_sheet_name(&self, name: &str) -> String {
        if !self.set_sheet_names_existing.contains(&name.to_lowercase()) {
            return name.to_string();
        }

        let base_name: String = name
            .chars()
            .take(usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX - 3))
            .collect();

        let mut n_idx = 2usize;
        loop {
            let candidate: String = format!("{base_name}__{n_idx}")
                .chars()
                .take(N_LEN_EXCEL_SHEET_NAME_MAX)
                .collect();
            if !self.set_sheet_names_existing.contains(&candidate.to_lowercase()) {
                return candidate;
            }
            n_idx += 1;
        }
    }
}

/// Export a single sheet to xlsx bytes.
pub fn export_sheet<T: XlsxRecord>(sheet: &SpecSheet<'_, T>) -> Result<Vec<u8>, XlsxError> {
    let mut exporter = XlsxExporter::default();
    exporter.write_sheet(sheet)?;
    exporter.finish()
}

/// Assign consecutive columns to tagged fields in declared order.
pub fn plan_columns<T: XlsxRecord>(
    sheet: &SpecSheet<'_, T>,
    fmt_content_sheet: &SpecCellFormat,
) -> Result<Vec<SpecColumnPlan>, XlsxError> {
    let l_tagged: Vec<(usize, _)> = T::xlsx_tags()
        .iter()
        .enumerate()
        .filter(|(_, tag)| tag.is_tagged())
        .collect();
    if l_tagged.len() > N_NCOLS_TAGGED_MAX {
        tracing::error!(n_cols = l_tagged.len(), "Too many tagged columns");
        return Err(XlsxError::ColumnOverflow {
            n_cols: l_tagged.len(),
            n_max: N_NCOLS_TAGGED_MAX,
        });
    }

    let mut l_plans = Vec::with_capacity(l_tagged.len());
    for (n_idx_col, (idx_field, tag)) in l_tagged.into_iter().enumerate() {
        let options = SpecFormatterOptions::parse(tag.formatter).map_err(|message| {
            tracing::error!(
                column = tag.column,
                formatter = tag.formatter,
                error = %message,
                "Invalid formatter"
            );
            XlsxError::InvalidFormatter {
                column: tag.column.to_string(),
                formatter: tag.formatter.to_string(),
                message,
            }
        })?;

        let spec_override = sheet.columns.get(tag.column);
        l_plans.push(SpecColumnPlan {
            idx_field,
            idx_col: cast_col_num(n_idx_col)?,
            column: tag.column.to_string(),
            width: spec_override.and_then(|spec| spec.width),
            if_merge: spec_override.is_some_and(|spec| spec.if_merge),
            merge_exclude: spec_override
                .map(|spec| spec.merge_exclude.clone())
                .unwrap_or_default(),
            fmt_content: spec_override
                .and_then(|spec| spec.format.as_ref())
                .map(|fmt| fmt_content_sheet.merge(fmt))
                .unwrap_or_else(|| fmt_content_sheet.clone()),
            formatter: options.resolve(),
            l_dropdown_labels: options
                .enum_table
                .as_ref()
                .map(|table| table.labels())
                .unwrap_or_default(),
        });
    }
    Ok(l_plans)
}

fn write_header(
    worksheet: &mut Worksheet,
    l_plans: &[SpecColumnPlan],
    fmt_header: &Format,
    n_rows: usize,
    report: &mut SpecXlsxSheetReport,
) -> Result<(), XlsxError> {
    for plan in l_plans {
        worksheet.write_string_with_format(0, plan.idx_col, &plan.column, fmt_header)?;
        if let Some(width) = plan.width {
            worksheet.set_column_width(plan.idx_col, width)?;
        }

        if plan.l_dropdown_labels.is_empty() || n_rows == 0 {
            continue;
        }
        let n_row_last = cast_row_num(n_rows)?;
        let res = DataValidation::new()
            .allow_list_strings(&plan.l_dropdown_labels)
            .and_then(|validation| {
                worksheet
                    .add_data_validation(1, plan.idx_col, n_row_last, plan.idx_col, &validation)
                    .map(|_| ())
            });
        if let Err(err) = res {
            tracing::warn!(column = %plan.column, error = %err, "Failed to add dropdown validation");
            report.warn(format!(
                "Dropdown for column {} ({:?}) skipped: {err}",
                derive_column_letter(plan.idx_col as usize),
                plan.column
            ));
        }
    }
    Ok(())
}

fn write_body<T: XlsxRecord>(
    worksheet: &mut Worksheet,
    l_plans: &[SpecColumnPlan],
    l_records: &[T],
    report: &mut SpecXlsxSheetReport,
) -> Result<(), XlsxError> {
    let l_formats: Vec<Format> = l_plans
        .iter()
        .map(|plan| derive_rust_xlsx_format(&plan.fmt_content))
        .collect();
    let mut l_trackers: Vec<Option<MergeRunTracker>> = l_plans
        .iter()
        .map(|plan| plan.if_merge.then(|| MergeRunTracker::new(plan.merge_exclude.clone())))
        .collect();

    for (idx_record, record) in l_records.iter().enumerate() {
        let n_row = cast_row_num(idx_record + 1)?;
        for (idx_plan, plan) in l_plans.iter().enumerate() {
            let value_raw = record.xlsx_value(plan.idx_field);
            let value = match &plan.formatter {
                Some(formatter) if !value_raw.is_none() => {
                    EnumCellValue::String(formatter.format_export(&value_raw.to_text()))
                }
                _ => value_raw,
            };
            write_cell_with_format(worksheet, n_row, plan.idx_col, &value, &l_formats[idx_plan])?;

            if let Some(tracker) = l_trackers[idx_plan].as_mut()
                && let Some(range) = tracker.push(n_row, &value)
            {
                write_merge(worksheet, plan.idx_col, &range, &l_formats[idx_plan])?;
                report.n_merges += 1;
            }
        }
    }

    for (idx_plan, tracker) in l_trackers.iter_mut().enumerate() {
        if let Some(tracker) = tracker.as_mut()
            && let Some(range) = tracker.finish()
        {
            write_merge(worksheet, l_plans[idx_plan].idx_col, &range, &l_formats[idx_plan])?;
            report.n_merges += 1;
        }
    }
    Ok(())
}

fn write_merge(
    worksheet: &mut Worksheet,
    n_col: u16,
    range: &SpecMergeRange,
    format: &Format,
) -> Result<(), XlsxError> {
    worksheet.merge_range(range.row_start, n_col, range.row_end, n_col, "", format)?;
    // merge_range blanks the covered cells; restore the typed value in each row.
    for n_row in range.row_start..=range.row_end {
        write_cell_with_format(worksheet, n_row, n_col, &range.value, format)?;
    }
    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    n_row: u32,
    n_col: u16,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), XlsxError> {
    match value {
        EnumCellValue::None => {
            worksheet.write_blank(n_row, n_col, format)?;
        }
        EnumCellValue::String(val) => {
            worksheet.write_string_with_format(n_row, n_col, val, format)?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number_with_format(n_row, n_col, *val, format)?;
        }
        EnumCellValue::Boolean(val) => {
            worksheet.write_boolean_with_format(n_row, n_col, *val, format)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if spec.italic.unwrap_or(false) {
        format = format.set_italic();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }

    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    if let Some(val) = spec.top {
        format = format.set_border_top(derive_format_border(val));
    }
    if let Some(val) = spec.bottom {
        format = format.set_border_bottom(derive_format_border(val));
    }
    if let Some(val) = spec.left {
        format = format.set_border_left(derive_format_border(val));
    }
    if let Some(val) = spec.right {
        format = format.set_border_right(derive_format_border(val));
    }

    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "justify" => Some(FormatAlign::Justify),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use calamine::{Reader, Xlsx};

    use super::*;
    use crate::spec::{EnumFieldSlot, SpecColumnOverride, SpecXlsxFieldTag};

    fn read_zip_entry(v_bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(v_bytes.to_vec())).unwrap();
        let mut c_xml = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut c_xml)
            .unwrap();
        c_xml
    }

    fn read_sheet_names(v_bytes: &[u8]) -> Vec<String> {
        Xlsx::new(Cursor::new(v_bytes.to_vec()))
            .unwrap()
            .sheet_names()
    }

    fn task(id: i64, state: i32, owner: &str) -> Task {
        Task {
            id,
            state,
            owner: Some(owner.to_string()),
            ..Default::default()
        }
    }

    #[derive(Debug, Default)]
    struct Wide {
        values: [i32; 27],
    }

    impl XlsxRecord for Wide {
        fn xlsx_tags() -> &'static [SpecXlsxFieldTag] {
            const C_NAMES: [&str; 27] = [
                "c01", "c02", "c03", "c04", "c05", "c06", "c07", "c08", "c09", "c10", "c11",
                "c12", "c13", "c14", "c15", "c16", "c17", "c18", "c19", "c20", "c21", "c22",
                "c23", "c24", "c25", "c26", "c27",
            ];
            const TAGS: [SpecXlsxFieldTag; 27] = {
                let mut tags = [SpecXlsxFieldTag::skip(); 27];
                let mut idx = 0;
                while idx < 27 {
                    tags[idx] = SpecXlsxFieldTag::new(C_NAMES[idx]);
                    idx += 1;
                }
                tags
            };
            &TAGS
        }

        fn xlsx_value(&self, idx_field: usize) -> EnumCellValue {
            self.values[idx_field].into()
        }

        fn xlsx_slot(&mut self, idx_field: usize) -> EnumFieldSlot<'_> {
            EnumFieldSlot::Int(&mut self.values[idx_field])
        }
    }

    #[derive(Debug, Default)]
    struct Task {
        id: i64,
        secret: String,
        state: i32,
        owner: Option<String>,
    }

    impl XlsxRecord for Task {
        fn xlsx_tags() -> &'static [SpecXlsxFieldTag] {
            const TAGS: [SpecXlsxFieldTag; 4] = [
                SpecXlsxFieldTag::new("ID"),
                SpecXlsxFieldTag::skip(),
                SpecXlsxFieldTag::with_formatter("State", "enum=1:Open,2:Done"),
                SpecXlsxFieldTag::new("Owner"),
            ];
            &TAGS
        }

        fn xlsx_value(&self, idx_field: usize) -> EnumCellValue {
            match idx_field {
                0 => self.id.into(),
                1 => self.secret.as_str().into(),
                2 => self.state.into(),
                3 => self.owner.clone().into(),
                _ => EnumCellValue::None,
            }
        }

        fn xlsx_slot(&mut self, idx_field: usize) -> EnumFieldSlot<'_> {
            match idx_field {
                0 => EnumFieldSlot::Int64(&mut self.id),
                1 => EnumFieldSlot::Str(&mut self.secret),
                2 => EnumFieldSlot::Int(&mut self.state),
                3 => EnumFieldSlot::OptStr(&mut self.owner),
                _ => EnumFieldSlot::Unsupported("unknown"),
            }
        }
    }

    #[test]
    fn twenty_seven_tagged_fields_are_rejected() {
        let l_records = vec![Wide::default()];
        let sheet = SpecSheet::new("wide", &l_records);
        let err = XlsxExporter::default().write_sheet(&sheet).unwrap_err();
        assert!(matches!(
            err,
            XlsxError::ColumnOverflow {
                n_cols: 27,
                n_max: 26
            }
        ));
    }

    #[test]
    fn plan_assigns_consecutive_columns_and_overrides() {
        let l_records: Vec<Task> = Vec::new();
        let fmt_owner = SpecCellFormat {
            bold: Some(true),
            ..Default::default()
        };
        let sheet = SpecSheet::new("tasks", &l_records).with_column(
            "Owner",
            SpecColumnOverride {
                width: Some(20.0),
                if_merge: true,
                merge_exclude: "-".to_string(),
                format: Some(fmt_owner.clone()),
            },
        );

        let fmt_content = derive_default_content_format();
        let l_plans = plan_columns(&sheet, &fmt_content).unwrap();
        assert_eq!(
            l_plans
                .iter()
                .map(|plan| (plan.idx_field, plan.idx_col))
                .collect::<Vec<_>>(),
            vec![(0, 0), (2, 1), (3, 2)]
        );
        assert_eq!(l_plans[1].l_dropdown_labels, vec!["Open", "Done"]);
        assert!(l_plans[1].formatter.is_some());
        assert_eq!(l_plans[0].fmt_content, fmt_content);
        assert_eq!(l_plans[2].fmt_content, fmt_content.merge(&fmt_owner));
        assert_eq!(l_plans[2].fmt_content.bold, Some(true));
        assert_eq!(l_plans[2].fmt_content.border, Some(1));
        assert_eq!(l_plans[2].width, Some(20.0));
        assert!(l_plans[2].if_merge && !l_plans[0].if_merge);
    }

    #[test]
    fn export_reports_merges_and_rejects_after_finish() {
        let l_records = vec![
            Task {
                id: 1,
                state: 1,
                owner: Some("amy".to_string()),
                ..Default::default()
            },
            Task {
                id: 2,
                state: 2,
                owner: Some("amy".to_string()),
                ..Default::default()
            },
            Task {
                id: 3,
                state: 2,
                owner: Some("-bot".to_string()),
                ..Default::default()
            },
            Task {
                id: 4,
                state: 1,
                owner: Some("-bot".to_string()),
                ..Default::default()
            },
        ];
        let sheet = SpecSheet::new("tasks/2024", &l_records)
            .with_column(
                "Owner",
                SpecColumnOverride {
                    if_merge: true,
                    merge_exclude: "-".to_string(),
                    ..Default::default()
                },
            )
            .with_freeze_pane(1, 0);

        let mut exporter = XlsxExporter::default();
        exporter.write_sheet(&sheet).unwrap();
        exporter.write_sheet(&sheet).unwrap();
        let l_reports = exporter.report();
        assert_eq!(l_reports[0].sheet_name, "tasks_2024");
        assert_eq!(l_reports[1].sheet_name, "tasks_2024__2");
        assert_eq!(l_reports[0].n_rows, 4);
        assert_eq!(l_reports[0].n_merges, 1);
        assert!(l_reports[0].warnings.is_empty());

        let v_bytes = exporter.finish().unwrap();
        assert!(v_bytes.starts_with(b"PK"));
        assert!(matches!(
            exporter.write_sheet(&sheet),
            Err(XlsxError::Finished)
        ));
    }

    #[test]
    fn empty_sheet_exports_header_only() {
        let l_records: Vec<Task> = Vec::new();
        let sheet = SpecSheet::new("empty", &l_records).with_freeze_pane(1, 1);
        let v_bytes = export_sheet(&sheet).unwrap();
        assert!(!v_bytes.is_empty());
    }

    #[test]
    fn oversized_dropdown_becomes_warning() {
        #[derive(Debug, Default)]
        struct Coded {
            code: i32,
        }

        impl XlsxRecord for Coded {
            fn xlsx_tags() -> &'static [SpecXlsxFieldTag] {
                const TAGS: [SpecXlsxFieldTag; 1] = [SpecXlsxFieldTag::with_formatter(
                    "Code",
                    "enum=1:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa,\
                     2:bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb,\
                     3:cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc",
                )];
                &TAGS
            }

            fn xlsx_value(&self, _idx_field: usize) -> EnumCellValue {
                self.code.into()
            }

            fn xlsx_slot(&mut self, _idx_field: usize) -> EnumFieldSlot<'_> {
                EnumFieldSlot::Int(&mut self.code)
            }
        }

        let l_records = vec![Coded { code: 1 }];
        let mut exporter = XlsxExporter::default();
        exporter
            .write_sheet(&SpecSheet::new("coded", &l_records))
            .unwrap();
        assert_eq!(exporter.report()[0].warnings.len(), 1);
        assert!(exporter.finish().is_ok());
    }
    #[test]
    fn dropdown_and_freeze_pane_land_in_sheet_xml() {
        let l_records = vec![task(1, 1, "amy"), task(2, 2, "bob"), task(3, 1, "cy"), task(4, 2, "di")];
        let sheet = SpecSheet::new("tasks", &l_records).with_freeze_pane(1, 1);
        let v_bytes = export_sheet(&sheet).unwrap();

        let c_xml = read_zip_entry(&v_bytes, "xl/worksheets/sheet1.xml");
        assert!(c_xml.contains("<dataValidation"));
        assert!(c_xml.contains(r#"type="list""#));
        assert!(c_xml.contains(r#"sqref="B2:B5""#));
        assert!(c_xml.contains("Open,Done"));
        assert!(c_xml.contains("<pane"));
        assert!(c_xml.contains(r#"xSplit="1""#));
        assert!(c_xml.contains(r#"ySplit="1""#));
        assert!(c_xml.contains(r#"topLeftCell="B2""#));
        assert!(c_xml.contains(r#"state="frozen""#));
    }

    #[test]
    fn sheet_without_records_has_no_dropdown() {
        let l_records: Vec<Task> = Vec::new();
        let v_bytes = export_sheet(&SpecSheet::new("empty", &l_records)).unwrap();
        let c_xml = read_zip_entry(&v_bytes, "xl/worksheets/sheet1.xml");
        assert!(!c_xml.contains("<dataValidation"));
        assert!(!c_xml.contains("<pane"));
    }

    #[test]
    fn failed_sheet_leaves_no_worksheet_behind() {
        let l_bad = vec![task(1, 1, &"x".repeat(40_000))];
        let l_good = vec![task(2, 2, "amy")];

        let mut exporter = XlsxExporter::default();
        assert!(exporter.write_sheet(&SpecSheet::new("bad", &l_bad)).is_err());
        exporter.write_sheet(&SpecSheet::new("ok", &l_good)).unwrap();
        exporter.write_sheet(&SpecSheet::new("bad", &l_good)).unwrap();
        assert_eq!(exporter.report().len(), 2);

        let v_bytes = exporter.finish().unwrap();
        assert_eq!(read_sheet_names(&v_bytes), vec!["ok", "bad"]);
        let c_workbook = read_zip_entry(&v_bytes, "xl/workbook.xml");
        assert!(c_workbook.contains(r#"activeTab="1""#));
    }

    #[test]
    fn apostrophes_are_stripped_from_sheet_names() {
        let l_records = vec![task(1, 1, "amy")];
        let mut exporter = XlsxExporter::default();
        exporter
            .write_sheet(&SpecSheet::new("'quoted'", &l_records))
            .unwrap();
        let v_bytes = exporter.finish().unwrap();
        assert_eq!(read_sheet_names(&v_bytes), vec!["quoted"]);
    }

    #[test]
    fn sheet_names_are_deduplicated_ignoring_case() {
        let l_records = vec![task(1, 1, "amy")];
        let mut exporter = XlsxExporter::default();
        exporter.write_sheet(&SpecSheet::new("Data", &l_records)).unwrap();
        exporter.write_sheet(&SpecSheet::new("data", &l_records)).unwrap();
        exporter.write_sheet(&SpecSheet::new("DATA__2", &l_records)).unwrap();

        let l_names: Vec<String> = exporter
            .report()
            .into_iter()
            .map(|report| report.sheet_name)
            .collect();
        assert_eq!(l_names, vec!["Data", "data__2", "DATA__2__2"]);

        let v_bytes = exporter.finish().unwrap();
        assert_eq!(read_sheet_names(&v_bytes), l_names);
    }
}
