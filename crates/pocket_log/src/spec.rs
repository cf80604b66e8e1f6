//! Logger levels, sinks and options.

use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;

////////////////////////////////////////////////////////////////////////////////
// #region Levels

/// Severity levels, most severe first.
///
/// `Panic` and `Fatal` are kept for configuration compatibility; both map to
/// the `ERROR` filter since `tracing` has nothing above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumLogLevel {
    Panic,
    Fatal,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl EnumLogLevel {
    /// Filter that lets this level and everything more severe through.
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Panic | Self::Fatal | Self::Error => LevelFilter::ERROR,
            Self::Warn => LevelFilter::WARN,
            Self::Info => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }

    /// Lowercase name, also usable as an `EnvFilter` directive.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Panic => "panic",
            Self::Fatal => "fatal",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for EnumLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnumLogLevel {
    type Err = LogInitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "panic" => Ok(Self::Panic),
            "fatal" => Ok(Self::Fatal),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(LogInitError::InvalidLevel(s.to_string())),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Sinks

/// Shared in-memory byte sink, mostly for capturing log output in tests.
#[derive(Debug, Clone, Default)]
pub struct SpecMemoryWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl SpecMemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        match self.buffer.lock() {
            Ok(buffer) => String::from_utf8_lossy(&buffer).to_string(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).to_string(),
        }
    }
}

impl io::Write for SpecMemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut buffer = self
            .buffer
            .lock()
            .map_err(|_| io::Error::other("memory log sink poisoned"))?;
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Output destination.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumLogSink {
    #[default]
    Stdout,
    Stderr,
    /// Only constructible in code.
    #[serde(skip)]
    Memory(SpecMemoryWriter),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region OptionsAndErrors

/// Logger configuration, set once at process start.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpecLogOptions {
    /// Most verbose level that is emitted.
    pub level: EnumLogLevel,
    /// Output destination.
    pub sink: EnumLogSink,
    /// Let `RUST_LOG` override `level` when it is set.
    pub if_respect_env: bool,
    /// Print the event target (module path).
    pub if_with_target: bool,
    /// Print the caller `file:line`.
    pub if_with_file_line: bool,
    /// Colored output.
    pub if_ansi: bool,
}

impl Default for SpecLogOptions {
    fn default() -> Self {
        Self {
            level: EnumLogLevel::Info,
            sink: EnumLogSink::Stdout,
            if_respect_env: true,
            if_with_target: false,
            if_with_file_line: true,
            if_ansi: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum LogInitError {
    #[error("Unknown log level: {0:?}")]
    InvalidLevel(String),
    #[error("Invalid log filter directive: {0}")]
    InvalidFilter(String),
    #[error("A global logger is already installed: {0}")]
    AlreadyInitialized(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
