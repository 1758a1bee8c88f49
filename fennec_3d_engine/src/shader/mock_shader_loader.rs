/// Mock shader loader for unit tests
///
/// Serves a trivial body for any path and remembers what was requested.

use std::cell::RefCell;

use crate::error::Result;
use crate::shader::ShaderSourceLoader;

#[derive(Default)]
pub struct MockShaderLoader {
    requested: RefCell<Vec<String>>,
}

impl MockShaderLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every path read so far, in order
    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl ShaderSourceLoader for MockShaderLoader {
    fn read(&self, path: &str) -> Result<String> {
        self.requested.borrow_mut().push(path.to_string());
        Ok(format!("// {}\nvoid main() {{}}", path))
    }
}
