//! UUID, sonyflake and numeric captcha generation.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use rand::Rng;
use sonyflake::Sonyflake;
use thiserror::Error;
use uuid::Uuid;

use crate::math::pow;

/// Largest digit count accepted by [`create_number_captcha`].
pub const N_CAPTCHA_DIGITS_MAX: usize = 18;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("Captcha digit count must be within 1..={N_CAPTCHA_DIGITS_MAX}, got {0}")]
    InvalidCaptchaDigit(usize),
    #[error("Sonyflake error: {0}")]
    Sonyflake(String),
}

////////////////////////////////////////////////////////////////////////////////
// #region Uuid

/// Random (v4) UUID.
pub fn generate_uuid() -> Uuid {
    Uuid::new_v4()
}

/// Random (v4) UUID in lowercase hyphenated form.
pub fn generate_uuid_str() -> String {
    generate_uuid().to_string()
}

/// Zero-padded random number with exactly `digit` digits, e.g. `"004213"`.
pub fn create_number_captcha(digit: usize) -> Result<String, IdError> {
    if digit == 0 || digit > N_CAPTCHA_DIGITS_MAX {
        return Err(IdError::InvalidCaptchaDigit(digit));
    }
    let n_upper = pow(10, digit as u32);
    let n_value = rand::thread_rng().gen_range(0..n_upper);
    Ok(format!("{n_value:0digit$}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Sonyflake

/// Sonyflake generator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSonyflakeSettings {
    /// Epoch of the time field; the library default is 2014-09-01T00:00:00Z.
    pub start_time: Option<DateTime<Utc>>,
    /// Machine id stored in the low 16 bits.
    pub machine_id: u16,
}

impl Default for SpecSonyflakeSettings {
    fn default() -> Self {
        Self {
            start_time: None,
            machine_id: (std::process::id() & 0xFFFF) as u16,
        }
    }
}

/// Decomposed sonyflake id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecSonyflakeParts {
    /// Elapsed 10 ms units since the generator start time.
    pub time: u64,
    pub sequence: u64,
    pub machine_id: u64,
}

/// Shareable handle over a [`Sonyflake`] instance.
#[derive(Clone)]
pub struct SonyflakeGenerator {
    inner: Sonyflake,
    machine_id: u16,
}

impl SonyflakeGenerator {
    pub fn new(settings: SpecSonyflakeSettings) -> Result<Self, IdError> {
        let machine_id = settings.machine_id;
        let fn_machine_id =
            move || -> Result<u16, Box<dyn std::error::Error + Send + Sync>> { Ok(machine_id) };

        let mut builder = Sonyflake::builder().machine_id(&fn_machine_id);
        if let Some(dt_start) = settings.start_time {
            builder = builder.start_time(dt_start);
        }
        let inner = builder.finalize().map_err(|err| {
            tracing::error!(machine_id, error = %err, "Failed to build sonyflake generator");
            IdError::Sonyflake(err.to_string())
        })?;
        Ok(Self { inner, machine_id })
    }

    pub fn machine_id(&self) -> u16 {
        self.machine_id
    }

    /// Next id. Blocks for up to one time unit when the sequence wraps.
    pub fn next_id(&self) -> Result<u64, IdError> {
        self.inner
            .next_id()
            .map_err(|err| IdError::Sonyflake(err.to_string()))
    }

    /// Split an id into its time, sequence and machine-id fields.
    pub fn decompose(id: u64) -> SpecSonyflakeParts {
        let parts = sonyflake::decompose(id);
        SpecSonyflakeParts {
            time: parts.time,
            sequence: parts.sequence,
            machine_id: parts.machine_id,
        }
    }
}

static SONYFLAKE_DEFAULT: OnceLock<SonyflakeGenerator> = OnceLock::new();

/// Next id from the process-wide default generator.
pub fn sonyflake_id() -> Result<u64, IdError> {
    if let Some(generator) = SONYFLAKE_DEFAULT.get() {
        return generator.next_id();
    }
    let generator = SonyflakeGenerator::new(SpecSonyflakeSettings::default())?;
    SONYFLAKE_DEFAULT.get_or_init(|| generator).next_id()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
