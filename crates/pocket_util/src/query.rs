//! Form-urlencoded option strings such as `enum=1:On,0:Off&time=%Y-%m-%d`.

use std::collections::BTreeMap;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid query `{text}`: {message}")]
    InvalidQuery { text: String, message: String },
    #[error("Invalid value `{value}` for query key `{key}`: {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

/// Decoded query: key -> values in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecQuery {
    dict_values: BTreeMap<String, Vec<String>>,
}

impl SpecQuery {
    /// Decode `text` as `application/x-www-form-urlencoded`.
    ///
    /// `;` separators and malformed percent escapes are rejected.
    pub fn parse(text: &str) -> Result<Self, QueryError> {
        validate_query_text(text)?;

        let mut dict_values: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in url::form_urlencoded::parse(text.as_bytes()) {
            dict_values
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        Ok(Self { dict_values })
    }

    pub fn is_empty(&self) -> bool {
        self.dict_values.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.dict_values.contains_key(key)
    }

    /// All values for `key`.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.dict_values
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// First value for `key` when it is non-empty.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get_all(key)
            .first()
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>, QueryError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let Some(value) = self.get_str(key) else {
            return Ok(None);
        };
        value
            .parse::<T>()
            .map(Some)
            .map_err(|err| QueryError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
                message: err.to_string(),
            })
    }

    /// `Some(true)` only for the literal `"true"`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_str(key).map(|value| value == "true")
    }

    /// Comma-split first value, each item parsed as `T`.
    pub fn get_list<T>(&self, key: &str) -> Result<Option<Vec<T>>, QueryError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let Some(value) = self.get_str(key) else {
            return Ok(None);
        };
        value
            .split(',')
            .map(|item| {
                item.parse::<T>().map_err(|err| QueryError::InvalidValue {
                    key: key.to_string(),
                    value: item.to_string(),
                    message: err.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

fn validate_query_text(text: &str) -> Result<(), QueryError> {
    let invalid = |message: &str| QueryError::InvalidQuery {
        text: text.to_string(),
        message: message.to_string(),
    };

    if text.contains(';') {
        return Err(invalid("semicolon separator"));
    }
    let l_bytes = text.as_bytes();
    for (idx, byte) in l_bytes.iter().enumerate() {
        if *byte != b'%' {
            continue;
        }
        let if_escape_ok = l_bytes
            .get(idx + 1..idx + 3)
            .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));
        if !if_escape_ok {
            return Err(invalid("malformed percent escape"));
        }
    }
    Ok(())
}
