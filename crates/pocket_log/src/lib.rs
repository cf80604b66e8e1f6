//! `pocket_log` v1:
//! Leveled logger configuration for the pocket kit.
//!
//! Library crates in this workspace log through `tracing` macros only; the
//! host process installs one subscriber at start-up through [`init`].
//! - `spec` : levels, sinks, options and errors
//! - `init` : subscriber construction and installation
pub mod init;
pub mod spec;

pub use init::{build_subscriber, init, init_test};
pub use spec::{EnumLogLevel, EnumLogSink, LogInitError, SpecLogOptions, SpecMemoryWriter};
