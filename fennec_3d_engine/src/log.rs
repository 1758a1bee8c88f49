//! Logging for Fennec3D
//!
//! - `Logger` trait, injected through `Engine::set_logger`
//! - Severity levels (Trace, Debug, Info, Warn, Error)
//! - Colored console output by default
//! - `AsyncLogger` to move sink I/O off the render thread
//! - File and line information on ERROR entries

use colored::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::sync::Mutex;
use std::thread::JoinHandle;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Logger trait for custom sinks (file, network, in-game console...)
///
/// # Example
///
/// ```no_run
/// use fennec_3d_engine::fennec3d::log::{Logger, LogEntry};
///
/// struct FileLogger {
///     file: std::fs::File,
/// }
///
/// impl Logger for FileLogger {
///     fn log(&self, entry: &LogEntry) {
///         // Write to file...
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Handle one entry
    fn log(&self, entry: &LogEntry);
}

/// One log message with its metadata
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level
    pub severity: LogSeverity,

    /// When the entry was created (not when it was written)
    pub timestamp: SystemTime,

    /// Source module (e.g., "fennec3d::Framebuffer", "fennec3d::gl")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (only for detailed ERROR logs)
    pub file: Option<&'static str>,

    /// Source line (only for detailed ERROR logs)
    pub line: Option<u32>,
}

impl LogEntry {
    /// Render the entry without colors: `[timestamp] [SEVERITY] [source] message (file:line)`
    pub fn format_plain(&self) -> String {
        let mut out = format!(
            "[{}] [{}] [{}] {}",
            format_timestamp(self.timestamp),
            self.severity.label(),
            self.source,
            self.message
        );
        if let (Some(file), Some(line)) = (self.file, self.line) {
            out.push_str(&format!(" ({}:{})", file, line));
        }
        out
    }
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Per-draw detail, very noisy
    Trace,

    /// Development information
    Debug,

    /// Setup milestones (passes created, maps computed)
    Info,

    /// Recoverable oddities
    Warn,

    /// Failures, reported with file:line
    Error,
}

impl LogSeverity {
    /// Fixed-width label used by the console format
    pub fn label(&self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }
}

fn format_timestamp(timestamp: SystemTime) -> String {
    let datetime: DateTime<Local> = timestamp.into();
    datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Default logger: colored console output
///
/// Colors:
/// - Trace: bright black
/// - Debug: cyan
/// - Info: green
/// - Warn: yellow
/// - Error: bold red
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let timestamp = format_timestamp(entry.timestamp);

        let label = entry.severity.label();
        let severity_str = match entry.severity {
            LogSeverity::Trace => label.bright_black(),
            LogSeverity::Debug => label.cyan(),
            LogSeverity::Info => label.green(),
            LogSeverity::Warn => label.yellow(),
            LogSeverity::Error => label.red().bold(),
        };

        let source = entry.source.bright_blue();

        if let (Some(file), Some(line)) = (entry.file, entry.line) {
            println!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp, severity_str, source, entry.message, file, line
            );
        } else {
            println!("[{}] [{}] [{}] {}", timestamp, severity_str, source, entry.message);
        }
    }
}

// ===== ASYNC LOGGER =====

/// Forwards entries to an inner logger on a background thread.
///
/// The queue is bounded. When it is full the entry is dropped and counted
/// instead of stalling the frame. Dropping the `AsyncLogger` drains the
/// queue and joins the worker.
pub struct AsyncLogger {
    sender: Mutex<Option<SyncSender<LogEntry>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    dropped: AtomicU64,
}

impl AsyncLogger {
    /// Default queue capacity
    pub const DEFAULT_CAPACITY: usize = 1024;

    /// Wrap `inner` with the default queue capacity
    pub fn new<L: Logger + 'static>(inner: L) -> Self {
        Self::with_capacity(inner, Self::DEFAULT_CAPACITY)
    }

    /// Wrap `inner` with a queue holding at most `capacity` pending entries
    pub fn with_capacity<L: Logger + 'static>(inner: L, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::sync_channel::<LogEntry>(capacity.max(1));
        let worker = std::thread::Builder::new()
            .name("fennec3d-log".to_string())
            .spawn(move || {
                for entry in receiver {
                    inner.log(&entry);
                }
            })
            .ok();

        Self {
            sender: Mutex::new(worker.as_ref().map(|_| sender)),
            worker: Mutex::new(worker),
            dropped: AtomicU64::new(0),
        }
    }

    /// Number of entries discarded because the queue was full
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Logger for AsyncLogger {
    fn log(&self, entry: &LogEntry) {
        let Ok(guard) = self.sender.lock() else {
            return;
        };
        let Some(sender) = guard.as_ref() else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        };
        match sender.try_send(entry.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

impl Drop for AsyncLogger {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop once the queue is drained.
        if let Ok(mut sender) = self.sender.lock() {
            sender.take();
        }
        if let Ok(mut worker) = self.worker.lock() {
            if let Some(handle) = worker.take() {
                let _ = handle.join();
            }
        }
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message
///
/// # Example
///
/// ```ignore
/// engine_trace!("fennec3d::TextureRegistry", "bound unit {}", unit);
/// ```
#[macro_export]
macro_rules! engine_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::fennec3d::Engine::log(
            $crate::fennec3d::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a DEBUG message
#[macro_export]
macro_rules! engine_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::fennec3d::Engine::log(
            $crate::fennec3d::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an INFO message
///
/// # Example
///
/// ```ignore
/// engine_info!("fennec3d::Ibl", "Prefiltered {} mips", num_mips);
/// ```
#[macro_export]
macro_rules! engine_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::fennec3d::Engine::log(
            $crate::fennec3d::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a WARN message
#[macro_export]
macro_rules! engine_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::fennec3d::Engine::log(
            $crate::fennec3d::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an ERROR message with file:line information
#[macro_export]
macro_rules! engine_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::fennec3d::Engine::log_detailed(
            $crate::fennec3d::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
