//! Bidirectional cell formatters declared through `formatter` tag options.

use std::collections::BTreeMap;

use pocket_util::{SpecQuery, format_unix_seconds, parse_unix_seconds};

use crate::conf::{C_FORMATTER_KEY_ENUM, C_FORMATTER_KEY_TIME, C_TIME_IMPORT_FALLBACK};

/// `code:label` translation table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecEnumTable {
    l_pairs: Vec<(String, String)>,
    dict_code_to_label: BTreeMap<String, String>,
    dict_label_to_code: BTreeMap<String, String>,
}

impl SpecEnumTable {
    /// Parse comma-separated `code:label` pairs. Each pair needs a `:`.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut table = Self::default();
        for c_pair in text.split(',') {
            let Some((code, label)) = c_pair.split_once(':') else {
                return Err(format!("enum pair `{c_pair}` has no `:`"));
            };
            table.l_pairs.push((code.to_string(), label.to_string()));
            table
                .dict_code_to_label
                .insert(code.to_string(), label.to_string());
            table
                .dict_label_to_code
                .insert(label.to_string(), code.to_string());
        }
        Ok(table)
    }

    /// Declared pairs in order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.l_pairs
    }

    /// Labels in declared order, used for the dropdown list.
    pub fn labels(&self) -> Vec<String> {
        self.l_pairs.iter().map(|(_, label)| label.clone()).collect()
    }

    pub fn label_of(&self, code: &str) -> Option<&str> {
        self.dict_code_to_label.get(code).map(String::as_str)
    }

    pub fn code_of(&self, label: &str) -> Option<&str> {
        self.dict_label_to_code.get(label).map(String::as_str)
    }
}

/// Closed set of formatters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumFormatter {
    /// code -> label on export, label -> code on import.
    Enum(SpecEnumTable),
    /// Epoch seconds <-> rendered time in a layout (UTC).
    Time(String),
}

impl EnumFormatter {
    /// Stored value text -> cell text. Unmatched or unparseable input yields `""`.
    pub fn format_export(&self, text: &str) -> String {
        match self {
            Self::Enum(table) => table.label_of(text).unwrap_or_default().to_string(),
            Self::Time(layout) => {
                let Ok(n_secs) = text.trim().parse::<i64>() else {
                    tracing::error!(text, layout = %layout, "Time export expects epoch seconds");
                    return String::new();
                };
                format_unix_seconds(n_secs, layout).unwrap_or_else(|| {
                    tracing::error!(n_secs, layout = %layout, "Failed to render time");
                    String::new()
                })
            }
        }
    }

    /// Cell text -> stored value text. Unparseable time yields `"0"`.
    pub fn format_import(&self, text: &str) -> String {
        match self {
            Self::Enum(table) => table.code_of(text).unwrap_or_default().to_string(),
            Self::Time(layout) => match parse_unix_seconds(text, layout) {
                Some(n_secs) => n_secs.to_string(),
                None => {
                    tracing::error!(text, layout = %layout, "Failed to parse time");
                    C_TIME_IMPORT_FALLBACK.to_string()
                }
            },
        }
    }
}

/// Decoded formatter options of one field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecFormatterOptions {
    pub enum_table: Option<SpecEnumTable>,
    pub time_layout: Option<String>,
}

impl SpecFormatterOptions {
    /// Decode `enum=...&time=...`. An empty string yields no options.
    ///
    /// A `%` that does not start a two-hex-digit escape is kept literally so
    /// strftime layouts can be written as-is.
    pub fn parse(text: &str) -> Result<Self, String> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        let query = SpecQuery::parse(&escape_bare_percent(text)).map_err(|err| err.to_string())?;
        let enum_table = query
            .get_str(C_FORMATTER_KEY_ENUM)
            .map(SpecEnumTable::parse)
            .transpose()?;
        let time_layout = query.get_str(C_FORMATTER_KEY_TIME).map(str::to_string);
        Ok(Self {
            enum_table,
            time_layout,
        })
    }

    /// Active formatter. Enum registers first, time overwrites it.
    pub fn resolve(&self) -> Option<EnumFormatter> {
        let mut formatter = self.enum_table.clone().map(EnumFormatter::Enum);
        if let Some(layout) = &self.time_layout {
            formatter = Some(EnumFormatter::Time(layout.clone()));
        }
        formatter
    }
}

fn escape_bare_percent(text: &str) -> String {
    let l_bytes = text.as_bytes();
    let mut c_out = String::with_capacity(text.len());
    for (idx, chr) in text.char_indices() {
        let if_escape = chr == '%'
            && l_bytes
                .get(idx + 1..idx + 3)
                .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));
        if chr == '%' && !if_escape {
            c_out.push_str("%25");
        } else {
            c_out.push(chr);
        }
    }
    c_out
}
