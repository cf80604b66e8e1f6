use std::collections::BTreeMap;

use crate::spec::{
    EnumSqlAction, EnumSqlModel, EnumSqlValue, SpecSqlFieldTag, SpecSqlFragment, SqlBuildError,
    SqlRecord,
};
use crate::util::{derive_field_tags, quote_column};

/// Builds insert statements and `SET` fragments from tagged records.
///
/// Fields tagged `column[,add][,set][,sort]` participate; a `None` value is
/// never serialized. Inserts take every tagged present field, `SET`
/// fragments only the `set`-flagged ones.
#[derive(Debug)]
pub struct SqlBuilder<'a, T> {
    table: String,
    model: EnumSqlModel<'a, T>,
}

impl<'a, T: SqlRecord> SqlBuilder<'a, T> {
    pub fn new(table: impl Into<String>, model: EnumSqlModel<'a, T>) -> Self {
        Self {
            table: table.into(),
            model,
        }
    }

    /// ``INSERT INTO `table`(`a`,`b`) VALUES (?,?)``
    pub fn build_insert_row(&self) -> Result<SpecSqlFragment, SqlBuildError> {
        let fragment = self.generate(EnumSqlAction::AddRow)?;
        Ok(self.prefix_insert(fragment))
    }

    /// ``INSERT INTO `table`(`a`,`b`) VALUES (?,?),(?,?)``
    pub fn build_insert(&self) -> Result<SpecSqlFragment, SqlBuildError> {
        let fragment = self.generate(EnumSqlAction::AddRows)?;
        Ok(self.prefix_insert(fragment))
    }

    /// `` `a`=?,`b`=? `` over `set`-flagged present fields. Empty when none qualify.
    pub fn build_set(&self) -> Result<SpecSqlFragment, SqlBuildError> {
        self.generate(EnumSqlAction::Set)
    }

    /// Column and placeholder part of the statement for `action`.
    pub fn generate(&self, action: EnumSqlAction) -> Result<SpecSqlFragment, SqlBuildError> {
        let res = derive_field_tags::<T>().and_then(|l_tags| match (action, self.model) {
            (EnumSqlAction::AddRow, EnumSqlModel::Row(record)) => plan_insert_row(&l_tags, record),
            (EnumSqlAction::AddRows, EnumSqlModel::Rows(l_records)) => {
                plan_insert_rows(&l_tags, l_records)
            }
            (EnumSqlAction::Set, EnumSqlModel::Row(record)) => plan_set(&l_tags, record),
            (action, model) => Err(SqlBuildError::Parameter {
                message: format!("action `{action}` does not accept {}", model.shape_name()),
            }),
        });
        res.inspect_err(|err| {
            tracing::error!(table = %self.table, action = %action, error = %err, "Failed to generate sql");
        })
    }

    fn prefix_insert(&self, fragment: SpecSqlFragment) -> SpecSqlFragment {
        SpecSqlFragment {
            sql: format!("INSERT INTO {}{}", quote_column(&self.table), fragment.sql),
            params: fragment.params,
        }
    }
}

/// Every tagged present field keyed by column name, flags ignored.
///
/// `None` when no field is present.
pub fn derive_update_params<T: SqlRecord>(
    record: &T,
) -> Result<Option<BTreeMap<String, EnumSqlValue>>, SqlBuildError> {
    let l_tags = derive_field_tags::<T>()?;
    let dict_params: BTreeMap<String, EnumSqlValue> = collect_present_values(&l_tags, record)?
        .into_iter()
        .map(|(spec_tag, value)| (spec_tag.column.clone(), value))
        .collect();
    Ok((!dict_params.is_empty()).then_some(dict_params))
}

////////////////////////////////////////////////////////////////////////////////
// #region Plan

fn collect_present_values<'t, T: SqlRecord>(
    l_tags: &'t [SpecSqlFieldTag],
    record: &T,
) -> Result<Vec<(&'t SpecSqlFieldTag, EnumSqlValue)>, SqlBuildError> {
    let mut l_values = record.sql_values();
    let n_tags = T::sql_tags().len();
    if l_values.len() != n_tags {
        return Err(SqlBuildError::SchemaMismatch {
            n_tags,
            n_values: l_values.len(),
        });
    }

    Ok(l_tags
        .iter()
        .filter_map(|spec_tag| {
            l_values
                .get_mut(spec_tag.idx_field)
                .and_then(Option::take)
                .map(|value| (spec_tag, value))
        })
        .collect())
}

fn join_columns(l_present: &[(&SpecSqlFieldTag, EnumSqlValue)]) -> String {
    l_present
        .iter()
        .map(|(spec_tag, _)| quote_column(&spec_tag.column))
        .collect::<Vec<_>>()
        .join(",")
}

fn join_placeholders(n_count: usize) -> String {
    vec!["?"; n_count].join(",")
}

fn plan_insert_row<T: SqlRecord>(
    l_tags: &[SpecSqlFieldTag],
    record: &T,
) -> Result<SpecSqlFragment, SqlBuildError> {
    let l_present = collect_present_values(l_tags, record)?;
    if l_present.is_empty() {
        return Err(SqlBuildError::NoData);
    }

    Ok(SpecSqlFragment {
        sql: format!(
            "({}) VALUES ({})",
            join_columns(&l_present),
            join_placeholders(l_present.len())
        ),
        params: l_present.into_iter().map(|(_, value)| value).collect(),
    })
}

/// Columns come from the first record; later records only need the same count.
fn plan_insert_rows<T: SqlRecord>(
    l_tags: &[SpecSqlFieldTag],
    l_records: &[T],
) -> Result<SpecSqlFragment, SqlBuildError> {
    let mut c_columns = String::new();
    let mut l_rows = Vec::with_capacity(l_records.len());
    let mut l_params = Vec::new();
    let mut n_expected = 0usize;

    for (idx_row, record) in l_records.iter().enumerate() {
        let l_present = collect_present_values(l_tags, record)?;
        if idx_row == 0 {
            if l_present.is_empty() {
                return Err(SqlBuildError::NoData);
            }
            c_columns = join_columns(&l_present);
            n_expected = l_present.len();
        } else if l_present.len() != n_expected {
            return Err(SqlBuildError::RaggedBatch {
                idx_row,
                n_expected,
                n_found: l_present.len(),
            });
        }

        l_rows.push(format!("({})", join_placeholders(l_present.len())));
        l_params.extend(l_present.into_iter().map(|(_, value)| value));
    }

    if l_rows.is_empty() {
        return Err(SqlBuildError::NoData);
    }
    Ok(SpecSqlFragment {
        sql: format!("({c_columns}) VALUES {}", l_rows.join(",")),
        params: l_params,
    })
}

fn plan_set<T: SqlRecord>(
    l_tags: &[SpecSqlFieldTag],
    record: &T,
) -> Result<SpecSqlFragment, SqlBuildError> {
    let l_set_tags: Vec<SpecSqlFieldTag> = l_tags.iter().filter(|tag| tag.if_set).cloned().collect();
    let l_present = collect_present_values(&l_set_tags, record)?;

    Ok(SpecSqlFragment {
        sql: l_present
            .iter()
            .map(|(spec_tag, _)| format!("{}=?", quote_column(&spec_tag.column)))
            .collect::<Vec<_>>()
            .join(","),
        params: l_present.into_iter().map(|(_, value)| value).collect(),
    })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use pocket_log::{EnumLogLevel, EnumLogSink, SpecLogOptions, SpecMemoryWriter, build_subscriber};
    use rusqlite::{Connection, params_from_iter, types::Value};

    use super::*;

    #[derive(Debug, Default, Clone)]
    struct User {
        id: Option<i64>,
        name: Option<String>,
        age: Option<i32>,
        score: Option<f64>,
        active: Option<bool>,
        note: String,
    }

    impl SqlRecord for User {
        fn sql_tags() -> &'static [&'static str] {
            &["id,add", "name,add,set", "age,set", "score", "active,set", ""]
        }

        fn sql_values(&self) -> Vec<Option<EnumSqlValue>> {
            vec![
                self.id.map(EnumSqlValue::from),
                self.name.clone().map(EnumSqlValue::from),
                self.age.map(EnumSqlValue::from),
                self.score.map(EnumSqlValue::from),
                self.active.map(EnumSqlValue::from),
                Some(EnumSqlValue::from(self.note.as_str())),
            ]
        }
    }

    fn user(id: i64, name: &str, age: i32) -> User {
        User {
            id: Some(id),
            name: Some(name.to_string()),
            age: Some(age),
            ..Default::default()
        }
    }

    fn to_sqlite_values(l_params: &[EnumSqlValue]) -> Vec<Value> {
        l_params
            .iter()
            .map(|value| match value {
                EnumSqlValue::Int(v) => Value::Integer(*v),
                EnumSqlValue::Float(v) => Value::Real(*v),
                EnumSqlValue::Text(v) => Value::Text(v.clone()),
                EnumSqlValue::Bool(v) => Value::Integer(*v as i64),
                EnumSqlValue::Bytes(v) => Value::Blob(v.clone()),
            })
            .collect()
    }

    fn open_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE `user` (id INTEGER PRIMARY KEY, name TEXT, age INTEGER, score REAL, active INTEGER)",
        )
        .unwrap();
        conn
    }

    fn count_rows(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM `user`", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn insert_row_skips_absent_and_untagged_fields() {
        let record = user(1, "ann", 30);
        let fragment = SqlBuilder::new("user", EnumSqlModel::Row(&record))
            .build_insert_row()
            .unwrap();

        assert_eq!(
            fragment.sql,
            "INSERT INTO `user`(`id`,`name`,`age`) VALUES (?,?,?)"
        );
        assert_eq!(
            fragment.params,
            vec![
                EnumSqlValue::Int(1),
                EnumSqlValue::Text("ann".to_string()),
                EnumSqlValue::Int(30)
            ]
        );

        let conn = open_db();
        conn.execute(&fragment.sql, params_from_iter(to_sqlite_values(&fragment.params)))
            .unwrap();
        let (name, age): (String, i64) = conn
            .query_row("SELECT name, age FROM `user` WHERE id = 1", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!((name.as_str(), age), ("ann", 30));
    }

    #[test]
    fn insert_row_without_present_fields_fails() {
        let record = User::default();
        let res = SqlBuilder::new("user", EnumSqlModel::Row(&record)).build_insert_row();
        assert_eq!(res, Err(SqlBuildError::NoData));
    }

    #[test]
    fn insert_rows_params_scale_with_rows() {
        let l_records = vec![user(1, "ann", 30), user(2, "bob", 41), user(3, "cy", 19)];
        let fragment = SqlBuilder::new("user", EnumSqlModel::Rows(&l_records))
            .build_insert()
            .unwrap();

        assert_eq!(
            fragment.sql,
            "INSERT INTO `user`(`id`,`name`,`age`) VALUES (?,?,?),(?,?,?),(?,?,?)"
        );
        assert_eq!(fragment.params.len(), 3 * l_records.len());

        let conn = open_db();
        conn.execute(&fragment.sql, params_from_iter(to_sqlite_values(&fragment.params)))
            .unwrap();
        assert_eq!(count_rows(&conn), 3);
    }

    #[test]
    fn insert_rows_rejects_ragged_batch() {
        let mut short = user(2, "bob", 41);
        short.age = None;
        let l_records = vec![user(1, "ann", 30), short];

        let res = SqlBuilder::new("user", EnumSqlModel::Rows(&l_records)).build_insert();
        assert_eq!(
            res,
            Err(SqlBuildError::RaggedBatch {
                idx_row: 1,
                n_expected: 3,
                n_found: 2
            })
        );
    }

    #[test]
    fn insert_rows_accepts_sparse_rows_of_equal_width() {
        // Only the count is compared: the second row binds `score` into the `age` slot.
        let mut sparse = user(2, "bob", 0);
        sparse.age = None;
        sparse.score = Some(9.5);
        let l_records = vec![user(1, "ann", 30), sparse];

        let fragment = SqlBuilder::new("user", EnumSqlModel::Rows(&l_records))
            .build_insert()
            .unwrap();
        assert_eq!(
            fragment.sql,
            "INSERT INTO `user`(`id`,`name`,`age`) VALUES (?,?,?),(?,?,?)"
        );
        assert_eq!(fragment.params[5], EnumSqlValue::Float(9.5));
    }

    #[test]
    fn insert_rows_empty_or_blank_first_row_fails() {
        let l_empty: Vec<User> = Vec::new();
        assert_eq!(
            SqlBuilder::new("user", EnumSqlModel::Rows(&l_empty)).build_insert(),
            Err(SqlBuildError::NoData)
        );

        let l_records = vec![User::default(), user(1, "ann", 30)];
        assert_eq!(
            SqlBuilder::new("user", EnumSqlModel::Rows(&l_records)).build_insert(),
            Err(SqlBuildError::NoData)
        );
    }

    #[test]
    fn set_fragment_uses_set_flag_only() {
        let mut record = user(7, "dee", 52);
        record.score = Some(1.0);
        record.active = Some(true);

        let fragment = SqlBuilder::new("user", EnumSqlModel::Row(&record))
            .build_set()
            .unwrap();
        assert_eq!(fragment.sql, "`name`=?,`age`=?,`active`=?");
        assert_eq!(fragment.params.len(), 3);

        let conn = open_db();
        let insert = SqlBuilder::new("user", EnumSqlModel::Row(&user(7, "old", 1)))
            .build_insert_row()
            .unwrap();
        conn.execute(&insert.sql, params_from_iter(to_sqlite_values(&insert.params)))
            .unwrap();

        let mut l_params = to_sqlite_values(&fragment.params);
        l_params.push(Value::Integer(7));
        conn.execute(
            &format!("UPDATE `user` SET {} WHERE id = ?", fragment.sql),
            params_from_iter(l_params),
        )
        .unwrap();
        let (name, active): (String, i64) = conn
            .query_row("SELECT name, active FROM `user` WHERE id = 7", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!((name.as_str(), active), ("dee", 1));
    }

    #[test]
    fn set_fragment_empty_when_nothing_to_set() {
        let record = User {
            id: Some(1),
            score: Some(2.0),
            ..Default::default()
        };
        let fragment = SqlBuilder::new("user", EnumSqlModel::Row(&record))
            .build_set()
            .unwrap();
        assert!(fragment.is_empty());
        assert!(fragment.params.is_empty());
    }

    #[test]
    fn wrong_model_shape_is_parameter_error() {
        let record = user(1, "ann", 30);
        let l_records = vec![record.clone()];

        assert!(matches!(
            SqlBuilder::new("user", EnumSqlModel::Row(&record)).build_insert(),
            Err(SqlBuildError::Parameter { .. })
        ));
        assert!(matches!(
            SqlBuilder::new("user", EnumSqlModel::Rows(&l_records)).build_insert_row(),
            Err(SqlBuildError::Parameter { .. })
        ));
        assert!(matches!(
            SqlBuilder::new("user", EnumSqlModel::Rows(&l_records)).build_set(),
            Err(SqlBuildError::Parameter { .. })
        ));
    }

    #[test]
    fn generate_by_action_name() {
        let record = user(1, "ann", 30);
        let action: EnumSqlAction = "add-row".parse().unwrap();
        let fragment = SqlBuilder::new("user", EnumSqlModel::Row(&record))
            .generate(action)
            .unwrap();
        assert_eq!(fragment.sql, "(`id`,`name`,`age`) VALUES (?,?,?)");
        assert!("drop".parse::<EnumSqlAction>().is_err());
    }

    #[test]
    fn failed_generation_is_logged() {
        let sink = SpecMemoryWriter::new();
        let options = SpecLogOptions {
            level: EnumLogLevel::Error,
            sink: EnumLogSink::Memory(sink.clone()),
            if_respect_env: false,
            ..Default::default()
        };
        let subscriber = build_subscriber(&options).unwrap();
        let record = user(1, "ann", 30);

        tracing::subscriber::with_default(subscriber, || {
            let _ = SqlBuilder::new("user", EnumSqlModel::Row(&record)).build_insert();
        });

        let txt = sink.contents();
        assert!(txt.contains("Failed to generate sql"));
        assert!(txt.contains("add-rows"));
    }

    #[test]
    fn mismatched_value_list_is_schema_error() {
        struct Broken;
        impl SqlRecord for Broken {
            fn sql_tags() -> &'static [&'static str] {
                &["a", "b"]
            }
            fn sql_values(&self) -> Vec<Option<EnumSqlValue>> {
                vec![Some(EnumSqlValue::Int(1))]
            }
        }

        assert_eq!(
            SqlBuilder::new("t", EnumSqlModel::Row(&Broken)).build_insert_row(),
            Err(SqlBuildError::SchemaMismatch {
                n_tags: 2,
                n_values: 1
            })
        );
    }

    #[test]
    fn update_params_by_name() {
        let mut record = user(1, "ann", 30);
        record.score = Some(3.5);
        let dict_params = derive_update_params(&record).unwrap().unwrap();

        assert_eq!(dict_params.len(), 4);
        assert_eq!(dict_params["score"], EnumSqlValue::Float(3.5));
        assert_eq!(dict_params["name"], EnumSqlValue::Text("ann".to_string()));
        assert!(!dict_params.contains_key("note"));
        assert_eq!(derive_update_params(&User::default()).unwrap(), None);
    }
}
