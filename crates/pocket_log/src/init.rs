//! Subscriber construction and installation.

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::spec::{EnumLogSink, LogInitError, SpecLogOptions};

/// Build a subscriber from `options` without installing it.
///
/// Useful with `tracing::subscriber::with_default` to scope a logger to a
/// block.
pub fn build_subscriber(
    options: &SpecLogOptions,
) -> Result<Box<dyn Subscriber + Send + Sync>, LogInitError> {
    let filter = derive_env_filter(options)?;
    let writer = match &options.sink {
        EnumLogSink::Stdout => BoxMakeWriter::new(std::io::stdout),
        EnumLogSink::Stderr => BoxMakeWriter::new(std::io::stderr),
        EnumLogSink::Memory(sink) => {
            let sink = sink.clone();
            BoxMakeWriter::new(move || sink.clone())
        }
    };

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(options.if_with_target)
        .with_file(options.if_with_file_line)
        .with_line_number(options.if_with_file_line)
        .with_ansi(options.if_ansi)
        .finish();
    Ok(Box::new(subscriber))
}

/// Install the process-wide logger. Fails if one is already installed.
pub fn init(options: &SpecLogOptions) -> Result<(), LogInitError> {
    let subscriber = build_subscriber(options)?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| LogInitError::AlreadyInitialized(err.to_string()))
}

/// Debug-level logger routed to the test harness writer. Idempotent.
pub fn init_test() {
    fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init()
        .ok();
}

fn derive_env_filter(options: &SpecLogOptions) -> Result<EnvFilter, LogInitError> {
    if options.if_respect_env
        && let Ok(filter) = EnvFilter::try_from_default_env()
    {
        return Ok(filter);
    }
    EnvFilter::try_new(options.level.to_level_filter().to_string())
        .map_err(|err| LogInitError::InvalidFilter(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{EnumLogLevel, SpecMemoryWriter};

    fn options_with_memory(level: EnumLogLevel, sink: &SpecMemoryWriter) -> SpecLogOptions {
        SpecLogOptions {
            level,
            sink: EnumLogSink::Memory(sink.clone()),
            if_respect_env: false,
            ..SpecLogOptions::default()
        }
    }

    #[test]
    fn memory_sink_captures_enabled_levels_only() {
        let sink = SpecMemoryWriter::new();
        let subscriber =
            build_subscriber(&options_with_memory(EnumLogLevel::Warn, &sink)).expect("build");

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("hidden info");
            tracing::warn!("visible warn");
            tracing::error!(code = 7, "visible error");
        });

        let txt = sink.contents();
        assert!(!txt.contains("hidden info"));
        assert!(txt.contains("WARN"));
        assert!(txt.contains("visible warn"));
        assert!(txt.contains("visible error"));
        assert!(txt.contains("code=7"));
    }

    #[test]
    fn file_line_is_printed_when_enabled() {
        let sink = SpecMemoryWriter::new();
        let subscriber =
            build_subscriber(&options_with_memory(EnumLogLevel::Info, &sink)).expect("build");

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("where am i");
        });

        assert!(sink.contents().contains("init.rs:"));
    }

    #[test]
    fn test_logger_can_be_installed_twice() {
        init_test();
        init_test();
        tracing::debug!("after repeated init");
    }

    #[test]
    fn trace_level_lets_everything_through() {
        let sink = SpecMemoryWriter::new();
        let subscriber =
            build_subscriber(&options_with_memory(EnumLogLevel::Trace, &sink)).expect("build");

        tracing::subscriber::with_default(subscriber, || {
            tracing::trace!("fine grained");
        });

        assert!(sink.contents().contains("fine grained"));
    }
}
