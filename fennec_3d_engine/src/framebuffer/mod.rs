//! Framebuffers and their attachments

mod attachment;
mod buffer_type;
mod framebuffer;

pub use attachment::{Attachment, AttachmentResource, AttachmentTarget};
pub use buffer_type::{AttachmentKind, BufferType};
pub use framebuffer::{Framebuffer, DEFAULT_CLEAR_COLOR};
