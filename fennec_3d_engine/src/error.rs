//! Error types for the Fennec3D engine
//!
//! Covers backend failures, configuration mistakes made while wiring passes
//! together, and GPU resource failures (incomplete framebuffers, shader
//! compile/link errors). Uniform lookup misses are not errors.

use std::fmt;

/// Result type for Fennec3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fennec3D engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (OpenGL driver, context loss, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (stale handle, wrong attachment kind, etc.)
    InvalidResource(String),

    /// Initialization failed (engine, device, passes)
    InitializationFailed(String),

    /// Pass setup mistake: duplicate depth attachment, cubemap face out of
    /// range, unbalanced usage block, mip out of range...
    InvalidState(String),

    /// Framebuffer is not complete after attaching a buffer
    IncompleteFramebuffer(String),

    /// Shader compilation or program link failure
    ShaderError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Error::IncompleteFramebuffer(msg) => write!(f, "Incomplete framebuffer: {}", msg),
            Error::ShaderError(msg) => write!(f, "Shader error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Build an [`Error`], logging it at ERROR severity first.
///
/// The variant defaults to `BackendError`; pass a variant name first to
/// pick another one.
///
/// # Example
///
/// ```ignore
/// let err = engine_err!(InvalidState, "fennec3d::Framebuffer", "face {} out of range", face);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($kind:ident, $source:literal, $($arg:tt)+) => {{
        let message = format!($($arg)+);
        $crate::engine_error!($source, "{}", message);
        $crate::fennec3d::Error::$kind(message)
    }};
    ($source:literal, $($arg:tt)+) => {
        $crate::engine_err!(BackendError, $source, $($arg)+)
    };
}

/// Log an error and return it from the current function.
///
/// # Example
///
/// ```ignore
/// engine_bail!(InvalidState, "fennec3d::TextureRegistry", "pop without matching push");
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($($arg:tt)+) => {
        return Err($crate::engine_err!($($arg)+))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
