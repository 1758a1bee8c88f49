/// Fennec3D Engine - process-level logging hub
///
/// The render core never owns a log sink. The application injects one with
/// `Engine::set_logger()` (wrap it in `AsyncLogger` to keep sink I/O off the
/// frame), and the `engine_*` macros route through here.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{OnceLock, RwLock};
use std::time::{Instant, SystemTime};
use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};

// ===== INTERNAL STATE =====

/// Injected logger (DefaultLogger until replaced)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Reference point of `Engine::time()`
static START: OnceLock<Instant> = OnceLock::new();

/// Entries below this severity are discarded before reaching the logger
static MIN_SEVERITY: AtomicU8 = AtomicU8::new(LogSeverity::Debug as u8);

fn logger_lock() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

fn severity_from_u8(value: u8) -> LogSeverity {
    match value {
        0 => LogSeverity::Trace,
        1 => LogSeverity::Debug,
        2 => LogSeverity::Info,
        3 => LogSeverity::Warn,
        _ => LogSeverity::Error,
    }
}

// ===== PUBLIC API =====

/// Logging entry point shared by every engine component
///
/// # Example
///
/// ```no_run
/// use fennec_3d_engine::fennec3d::{Engine, log::{AsyncLogger, DefaultLogger, LogSeverity}};
///
/// Engine::set_logger(AsyncLogger::new(DefaultLogger));
/// Engine::set_min_severity(LogSeverity::Info);
/// ```
pub struct Engine;

impl Engine {
    /// Replace the current logger
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut lock) = logger_lock().write() {
            *lock = Box::new(logger);
        }
    }

    /// Restore the colored console logger
    pub fn reset_logger() {
        if let Ok(mut lock) = logger_lock().write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Discard entries less severe than `severity`
    pub fn set_min_severity(severity: LogSeverity) {
        MIN_SEVERITY.store(severity as u8, Ordering::Relaxed);
    }

    /// Current severity threshold
    pub fn min_severity() -> LogSeverity {
        severity_from_u8(MIN_SEVERITY.load(Ordering::Relaxed))
    }

    /// Seconds elapsed since the engine clock was first read
    pub fn time() -> f32 {
        START.get_or_init(Instant::now).elapsed().as_secs_f32()
    }

    /// Log without location (used by engine_trace!..engine_warn!)
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::dispatch(severity, source, message, None, None);
    }

    /// Log with file:line (used by engine_error!)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        Self::dispatch(severity, source, message, Some(file), Some(line));
    }

    fn dispatch(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: Option<&'static str>,
        line: Option<u32>,
    ) {
        if severity < Self::min_severity() {
            return;
        }
        if let Ok(lock) = logger_lock().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file,
                line,
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
