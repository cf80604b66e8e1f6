//! `pocket_util` v1:
//! Small stateless helpers shared across the pocket kit.
//!
//! - `date`   : epoch clocks, calendar helpers and time-layout conversion
//! - `math`   : integer power and min/max helpers
//! - `id`     : uuid, sonyflake and numeric captcha generation
//! - `string` : hashing, case conversion and hex decoding
//! - `query`  : form-urlencoded option decoding
pub mod date;
pub mod id;
pub mod math;
pub mod query;
pub mod string;

pub use date::{
    convert_reference_layout, derive_days_of_month, derive_days_of_month_by_time,
    format_unix_seconds, get_day, get_month, get_year, parse_unix_seconds, unix_millisecond,
    unix_second,
};
pub use id::{
    IdError, SonyflakeGenerator, SpecSonyflakeParts, SpecSonyflakeSettings,
    create_number_captcha, generate_uuid, generate_uuid_str, sonyflake_id,
};
pub use math::{float_max, float_min, int_max, int_min, pow};
pub use query::{QueryError, SpecQuery};
pub use string::{
    StringError, hex_str_to_u16, hex_str_to_u32, hex_str_to_u64, md5_hex, snake_string,
    utf8_index,
};
