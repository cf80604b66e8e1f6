use crate::spec::{SpecSqlFieldTag, SqlBuildError, SqlRecord};

/// Parse one `column[,flag...]` tag. Returns `None` for an empty tag.
pub fn parse_sql_tag(idx_field: usize, tag: &str) -> Result<Option<SpecSqlFieldTag>, SqlBuildError> {
    if tag.trim().is_empty() {
        return Ok(None);
    }

    let mut l_tokens = tag.split(',').map(str::trim);
    let column = l_tokens.next().unwrap_or_default();
    if column.is_empty() {
        return Err(SqlBuildError::InvalidTag {
            idx_field,
            tag: tag.to_string(),
        });
    }

    let mut spec_tag = SpecSqlFieldTag {
        idx_field,
        column: column.to_string(),
        ..Default::default()
    };
    for token in l_tokens {
        match token {
            "add" => spec_tag.if_add = true,
            "set" => spec_tag.if_set = true,
            "sort" => spec_tag.if_sort = true,
            "" => {}
            _ => tracing::debug!(idx_field, token, "Ignoring unknown sql tag flag"),
        }
    }
    Ok(Some(spec_tag))
}

/// Tagged fields of `T` in declared order.
pub fn derive_field_tags<T: SqlRecord>() -> Result<Vec<SpecSqlFieldTag>, SqlBuildError> {
    let mut l_tags = Vec::new();
    for (idx_field, tag) in T::sql_tags().iter().enumerate() {
        if let Some(spec_tag) = parse_sql_tag(idx_field, tag)? {
            l_tags.push(spec_tag);
        }
    }
    Ok(l_tags)
}

pub(crate) fn quote_column(column: &str) -> String {
    format!("`{column}`")
}
