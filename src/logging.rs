//! Logging abstraction layer.
//!
//! Two layers live here:
//!
//! 1. Macros that dispatch to either the [`log`](https://docs.rs/log) or
//!    [`tracing`](https://docs.rs/tracing) crate depending on which feature is
//!    enabled. The two features are **mutually exclusive** — enable at most one.
//! 2. The [`Logger`] collaborator: an injectable, leveled sink that
//!    interceptors and routers receive as `Option<Arc<dyn Logger>>`. Absence
//!    means the messages are dropped.
//!
//! | Feature    | Backend         | Default |
//! |------------|-----------------|---------|
//! | `log`      | `log` crate     | yes     |
//! | `tracing`  | `tracing` crate | no      |
//!
//! # Available macros
//!
//! - `trace_log!` — finest-grained diagnostic output.
//! - `debug_log!` — information useful for debugging.
//! - `info_log!` — general informational messages.
//! - `warn_log!` — potentially harmful situations.
//! - `error_log!` — error events that might still allow the app to continue.
//!
//! ```ignore
//! use screen_navigator::{debug_log, warn_log};
//!
//! debug_log!("Resolving destination '{}'", name);
//! warn_log!("Interceptor '{}' vetoed navigation", interceptor);
//! ```

use std::fmt;
use std::sync::Arc;

/// Emit a **trace**-level log message.
///
/// Dispatches to `log::trace!` or `tracing::trace!` depending on the
/// enabled feature flag. Accepts `format!`-style arguments.
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!($($arg)*);
        #[cfg(feature = "log")]
        ::log::trace!($($arg)*);
    };
}

/// Emit a **debug**-level log message.
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!($($arg)*);
        #[cfg(feature = "log")]
        ::log::debug!($($arg)*);
    };
}

/// Emit an **info**-level log message.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::info!($($arg)*);
        #[cfg(feature = "log")]
        ::log::info!($($arg)*);
    };
}

/// Emit a **warn**-level log message.
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::warn!($($arg)*);
        #[cfg(feature = "log")]
        ::log::warn!($($arg)*);
    };
}

/// Emit an **error**-level log message.
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::error!($($arg)*);
        #[cfg(feature = "log")]
        ::log::error!($($arg)*);
    };
}

// ============================================================================
// Logger collaborator
// ============================================================================

/// Severity attached to a [`Logger`] message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Leveled message sink injected into routers and interceptors.
///
/// # Example
///
/// ```
/// use screen_navigator::logging::{LogLevel, Logger};
/// use std::sync::Mutex;
///
/// #[derive(Default)]
/// struct Collect(Mutex<Vec<String>>);
///
/// impl Logger for Collect {
///     fn log(&self, level: LogLevel, message: &str) {
///         self.0.lock().unwrap().push(format!("{level}: {message}"));
///     }
/// }
///
/// let logger = Collect::default();
/// logger.log(LogLevel::Info, "ready");
/// assert_eq!(logger.0.lock().unwrap()[0], "INFO: ready");
/// ```
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

/// Shared optional logger handle. `None` silences the collaborator.
pub type SharedLogger = Option<Arc<dyn Logger>>;

/// [`Logger`] that forwards to the crate's logging macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => {
                trace_log!("{}", message);
            }
            LogLevel::Debug => {
                debug_log!("{}", message);
            }
            LogLevel::Info => {
                info_log!("{}", message);
            }
            LogLevel::Warn => {
                warn_log!("{}", message);
            }
            LogLevel::Error => {
                error_log!("{}", message);
            }
        }
    }
}

/// Send `message` to `logger` if one is configured.
pub(crate) fn emit(logger: &SharedLogger, level: LogLevel, message: impl FnOnce() -> String) {
    if let Some(logger) = logger {
        logger.log(level, &message());
    }
}
