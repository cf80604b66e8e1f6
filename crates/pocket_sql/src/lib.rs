pub mod builder;
pub mod spec;
pub mod util;

pub use builder::{SqlBuilder, derive_update_params};
pub use spec::{
    EnumSqlAction, EnumSqlModel, EnumSqlValue, SpecSqlFieldTag, SpecSqlFragment, SqlBuildError,
    SqlRecord,
};
pub use util::{derive_field_tags, parse_sql_tag};
