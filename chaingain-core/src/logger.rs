//! Bridge from the crate's `tracing` events to a host-provided logger.

use std::fmt::{self, Write as _};
use std::sync::{Arc, OnceLock};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// Trait representing a logger that receives the crate's log messages.
///
/// Host applications implement it to route messages into their own logging
/// facility.
///
/// # Examples
///
/// ```rust
/// use chaingain_core::logger::{LogLevel, Logger};
///
/// struct StderrLogger;
///
/// impl Logger for StderrLogger {
///     fn log(&self, level: LogLevel, message: String) {
///         eprintln!("[{level:?}] {message}");
///     }
/// }
/// ```
///
/// ## Swift
///
/// ```swift
/// class ChainGainLoggerBridge: ChainGain.Logger {
///     func log(level: ChainGain.LogLevel, message: String) {
///         Log.log(level.toCoreLevel(), message)
///     }
/// }
///
/// ChainGain.setLogger(logger: ChainGainLoggerBridge()) // once, at startup
/// ```
#[cfg_attr(feature = "ffi", uniffi::export(with_foreign))]
pub trait Logger: Sync + Send {
    /// Logs a message at the specified log level.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum LogLevel {
    /// Very low priority, often extremely detailed messages.
    Trace,
    /// Lower priority debugging information.
    Debug,
    /// Progress of the application.
    Info,
    /// Potentially harmful situations.
    Warn,
    /// Errors the application may still recover from.
    Error,
}

impl From<&Level> for LogLevel {
    fn from(level: &Level) -> Self {
        match *level {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            Level::INFO => Self::Info,
            Level::DEBUG => Self::Debug,
            _ => Self::Trace,
        }
    }
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// Collects an event's message followed by its `key=value` fields.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.trim_start().to_string()
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}

/// Forwards `tracing` events to the host [`Logger`].
///
/// Debug and trace events are only forwarded from this crate; dependencies
/// are noisy at those levels.
struct ForeignLayer;

impl<S: Subscriber> Layer<S> for ForeignLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let is_verbose = *metadata.level() == Level::DEBUG || *metadata.level() == Level::TRACE;
        if is_verbose && !metadata.target().starts_with("chaingain") {
            return;
        }

        let Some(logger) = LOGGER_INSTANCE.get() else {
            return;
        };
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        logger.log(metadata.level().into(), visitor.finish());
    }
}

/// Sets the global logger.
///
/// Call once, before any logging occurs. Later calls are ignored.
#[cfg_attr(feature = "ffi", uniffi::export)]
pub fn set_logger(logger: Arc<dyn Logger>) {
    if LOGGER_INSTANCE.set(logger).is_err() {
        eprintln!("Logger already set");
        return;
    }

    if let Err(e) = tracing_subscriber::registry().with(ForeignLayer).try_init() {
        eprintln!("Failed to set logger: {e}");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingLogger {
        records: Mutex<Vec<(LogLevel, String)>>,
    }

    impl Logger for RecordingLogger {
        fn log(&self, level: LogLevel, message: String) {
            self.records.lock().unwrap().push((level, message));
        }
    }

    #[test]
    fn test_forwards_events_to_host_logger() {
        let logger = Arc::new(RecordingLogger::default());
        set_logger(logger.clone());

        tracing::info!(target: "chaingain_core::logger_test", card = 3, "answer checked");
        tracing::debug!(target: "chaingain_core::logger_test", "request sent");
        tracing::debug!(target: "hyper::logger_test", "connection pooled");

        let records = logger.records.lock().unwrap();
        assert!(records.contains(&(LogLevel::Info, "answer checked card=3".to_string())));
        assert!(records.contains(&(LogLevel::Debug, "request sent".to_string())));
        assert!(!records.iter().any(|(_, m)| m == "connection pooled"));
    }
}
