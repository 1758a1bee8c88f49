/// OpenGL debug output - KHR_debug messages routed into the engine log
///
/// The driver callback classifies each message by severity and category,
/// filters it against the installed configuration, counts it, and logs it
/// through `Engine::log` under the `fennec3d::GlDebug` source. Identical
/// messages are grouped and tagged with their repeat count.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use fennec_3d_engine::fennec3d::log::LogSeverity;
use fennec_3d_engine::fennec3d::Engine;
use glow::HasContext;
use rustc_hash::FxHashMap;

/// Global debug configuration (read by the driver callback)
static DEBUG_CONFIG: Mutex<Option<GlDebugConfig>> = Mutex::new(None);

/// Global message counters
static DEBUG_STATS: DebugStatsTracker = DebugStatsTracker::new();

/// Occurrences of each distinct message
static MESSAGE_TRACKER: Mutex<Option<FxHashMap<String, u32>>> = Mutex::new(None);

const LOG_SOURCE: &str = "fennec3d::GlDebug";

// ============================================================================
// Configuration
// ============================================================================

/// Lowest severity that gets reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSeverity {
    ErrorsOnly,
    ErrorsAndWarnings,
    All,
}

/// Message categories to report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugMessageFilter {
    pub show_api: bool,
    pub show_shader_compiler: bool,
    pub show_performance: bool,
    pub show_other: bool,
}

impl Default for DebugMessageFilter {
    fn default() -> Self {
        Self { show_api: true, show_shader_compiler: true, show_performance: true, show_other: true }
    }
}

#[derive(Debug, Clone)]
pub struct GlDebugConfig {
    pub severity: DebugSeverity,
    pub message_filter: DebugMessageFilter,
    /// Panic on the first error message (strict mode)
    pub panic_on_error: bool,
    pub enable_stats: bool,
}

impl Default for GlDebugConfig {
    fn default() -> Self {
        Self {
            severity: DebugSeverity::ErrorsAndWarnings,
            message_filter: DebugMessageFilter::default(),
            panic_on_error: false,
            enable_stats: true,
        }
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Counts of reported messages per severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugStats {
    pub errors: u32,
    pub warnings: u32,
    pub info: u32,
    pub notifications: u32,
}

impl DebugStats {
    pub fn total(&self) -> u32 {
        self.errors + self.warnings + self.info + self.notifications
    }
}

struct DebugStatsTracker {
    errors: AtomicU32,
    warnings: AtomicU32,
    info: AtomicU32,
    notifications: AtomicU32,
}

impl DebugStatsTracker {
    const fn new() -> Self {
        Self {
            errors: AtomicU32::new(0),
            warnings: AtomicU32::new(0),
            info: AtomicU32::new(0),
            notifications: AtomicU32::new(0),
        }
    }

    fn increment(&self, level: MessageLevel) {
        let counter = match level {
            MessageLevel::Error => &self.errors,
            MessageLevel::Warning => &self.warnings,
            MessageLevel::Info => &self.info,
            MessageLevel::Notification => &self.notifications,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn get(&self) -> DebugStats {
        DebugStats {
            errors: self.errors.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
            info: self.info.load(Ordering::Relaxed),
            notifications: self.notifications.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.errors.store(0, Ordering::Relaxed);
        self.warnings.store(0, Ordering::Relaxed);
        self.info.store(0, Ordering::Relaxed);
        self.notifications.store(0, Ordering::Relaxed);
    }
}

// ============================================================================
// Classification
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MessageLevel {
    Error,
    Warning,
    Info,
    Notification,
}

impl MessageLevel {
    /// Error type messages are errors whatever severity the driver gave them
    fn classify(gl_type: u32, severity: u32) -> Self {
        if gl_type == glow::DEBUG_TYPE_ERROR {
            return MessageLevel::Error;
        }
        match severity {
            glow::DEBUG_SEVERITY_HIGH => MessageLevel::Error,
            glow::DEBUG_SEVERITY_MEDIUM => MessageLevel::Warning,
            glow::DEBUG_SEVERITY_LOW => MessageLevel::Info,
            _ => MessageLevel::Notification,
        }
    }

    fn passes(self, severity: DebugSeverity) -> bool {
        match severity {
            DebugSeverity::ErrorsOnly => self == MessageLevel::Error,
            DebugSeverity::ErrorsAndWarnings => matches!(self, MessageLevel::Error | MessageLevel::Warning),
            DebugSeverity::All => true,
        }
    }

    fn log_severity(self) -> LogSeverity {
        match self {
            MessageLevel::Error => LogSeverity::Error,
            MessageLevel::Warning => LogSeverity::Warn,
            MessageLevel::Info => LogSeverity::Info,
            MessageLevel::Notification => LogSeverity::Debug,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MessageCategory {
    Api,
    ShaderCompiler,
    Performance,
    Other,
}

impl MessageCategory {
    fn classify(source: u32, gl_type: u32) -> Self {
        if gl_type == glow::DEBUG_TYPE_PERFORMANCE {
            MessageCategory::Performance
        } else if source == glow::DEBUG_SOURCE_SHADER_COMPILER {
            MessageCategory::ShaderCompiler
        } else if source == glow::DEBUG_SOURCE_API {
            MessageCategory::Api
        } else {
            MessageCategory::Other
        }
    }

    fn passes(self, filter: &DebugMessageFilter) -> bool {
        match self {
            MessageCategory::Api => filter.show_api,
            MessageCategory::ShaderCompiler => filter.show_shader_compiler,
            MessageCategory::Performance => filter.show_performance,
            MessageCategory::Other => filter.show_other,
        }
    }

    fn label(self) -> &'static str {
        match self {
            MessageCategory::Api => "API",
            MessageCategory::ShaderCompiler => "Shader compiler",
            MessageCategory::Performance => "Performance",
            MessageCategory::Other => "Other",
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Install `config`, resetting the statistics and the message tracker
pub fn init_debug_config(config: GlDebugConfig) {
    DEBUG_STATS.reset();
    if let Ok(mut tracker) = MESSAGE_TRACKER.lock() {
        *tracker = Some(FxHashMap::default());
    }
    if let Ok(mut current) = DEBUG_CONFIG.lock() {
        *current = Some(config);
    }
}

/// Enable synchronous debug output on `gl` and route it through `handle_debug_message`
///
/// # Safety
/// `gl` must be current on this thread.
pub unsafe fn install_debug_callback(gl: &mut glow::Context, config: GlDebugConfig) {
    init_debug_config(config);
    gl.enable(glow::DEBUG_OUTPUT);
    gl.enable(glow::DEBUG_OUTPUT_SYNCHRONOUS);
    gl.debug_message_callback(|source, gl_type, id, severity, message| {
        handle_debug_message(source, gl_type, id, severity, message);
    });
}

pub fn debug_stats() -> DebugStats {
    DEBUG_STATS.get()
}

/// Log a summary of the messages reported since the last `init_debug_config`
pub fn log_debug_stats_report() {
    let stats = debug_stats();
    if stats.total() == 0 {
        Engine::log(LogSeverity::Info, LOG_SOURCE, "No GL debug messages".to_string());
        return;
    }

    let repeated = match MESSAGE_TRACKER.lock() {
        Ok(tracker) => tracker
            .as_ref()
            .map_or(0, |messages| messages.values().filter(|&&count| count > 1).count()),
        Err(_) => 0,
    };
    Engine::log(
        LogSeverity::Info,
        LOG_SOURCE,
        format!(
            "GL debug messages: {} errors, {} warnings, {} info, {} notifications ({} repeated)",
            stats.errors, stats.warnings, stats.info, stats.notifications, repeated
        ),
    );
}

/// Classify, filter, count and log one driver message
///
/// Returns whether the message was reported. Without an installed
/// configuration every message is dropped.
pub fn handle_debug_message(source: u32, gl_type: u32, id: u32, severity: u32, message: &str) -> bool {
    let config = match DEBUG_CONFIG.lock() {
        Ok(guard) => match guard.as_ref() {
            Some(config) => config.clone(),
            None => return false,
        },
        Err(_) => return false,
    };

    let level = MessageLevel::classify(gl_type, severity);
    let category = MessageCategory::classify(source, gl_type);
    if !level.passes(config.severity) || !category.passes(&config.message_filter) {
        return false;
    }

    let occurrences = if config.enable_stats {
        DEBUG_STATS.increment(level);
        track_message(message)
    } else {
        1
    };
    let repeat = if occurrences > 1 { format!(" [x{}]", occurrences) } else { String::new() };

    Engine::log(
        level.log_severity(),
        LOG_SOURCE,
        format!("[{}] #{}{} {}", category.label(), id, repeat, message),
    );

    if config.panic_on_error && level == MessageLevel::Error {
        panic!("GL error in strict mode: [{}] #{} {}", category.label(), id, message);
    }
    true
}

fn track_message(message: &str) -> u32 {
    match MESSAGE_TRACKER.lock() {
        Ok(mut tracker) => {
            let messages = tracker.get_or_insert_with(FxHashMap::default);
            let count = messages.entry(message.to_string()).or_insert(0);
            *count += 1;
            *count
        }
        Err(_) => 1,
    }
}

#[cfg(test)]
#[path = "debug_tests.rs"]
mod tests;
