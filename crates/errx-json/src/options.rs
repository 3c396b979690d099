//! Serializer configuration.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::Result;

/// Limits applied while serializing an error graph.
///
/// Every field has a default, so a config file only needs the values it
/// changes:
///
/// ```toml
/// max_depth = 8
/// include_standard_errors = false
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerializeOptions {
    /// Nesting levels before a node is replaced by `"(max depth reached)"`.
    pub max_depth: usize,
    /// Frames kept per stack trace; 0 keeps all of them.
    pub max_stack_frames: usize,
    /// Whether unclassified causes are serialized.
    pub include_standard_errors: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            max_depth: 32,
            max_stack_frames: 32,
            include_standard_errors: true,
        }
    }
}

impl SerializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_stack_frames(mut self, max_stack_frames: usize) -> Self {
        self.max_stack_frames = max_stack_frames;
        self
    }

    pub fn with_include_standard_errors(mut self, include: bool) -> Self {
        self.include_standard_errors = include;
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let options: SerializeOptions = toml::from_str(text)
            .map_err(|err| crate::Error::from(err).with_operation("options::from_toml_str"))?;
        Ok(options)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|err| {
                crate::Error::from(err)
                    .with_operation("options::from_path")
                    .with_context("path", path.display().to_string())
            })?;
        Self::from_toml_str(&text)
            .map_err(|err| err.with_context("path", path.display().to_string()))
    }
}
