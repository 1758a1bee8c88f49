//! GPU resource owners
//!
//! RAII wrappers over device handles. Each one releases its device object
//! exactly once when dropped.

pub mod texture;

pub use texture::{Renderbuffer, Texture, UNBOUNDED_MAX_MIP};
