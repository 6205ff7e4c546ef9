//! The per-file state threaded through every compile stage.

use serde_json::{Map, Value};
use std::path::{Component, Path};

/// One template file at compile time.
///
/// Stages never mutate a unit in place: each stage reads the current unit
/// and, when it rewrites something, returns a new one. The unit is consumed
/// once at the end of compilation by page assembly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateUnit {
    /// Template text, rewritten by each stage.
    pub content: String,

    /// Parent-directory chain from the file's directory back to the source
    /// root (`""`, `"/.."`, `"/../.."`). Set once by the orchestrator.
    pub relative_path: String,

    /// Page settings from front matter.
    pub metadata: Map<String, Value>,

    /// PHP fragments executed before the main body (section captures).
    pub before: Vec<String>,

    /// PHP fragments executed after the main body (layout includes).
    pub after: Vec<String>,
}

impl TemplateUnit {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Same unit with a new text buffer.
    pub fn with_content(&self, content: String) -> Self {
        Self {
            content,
            relative_path: self.relative_path.clone(),
            metadata: self.metadata.clone(),
            before: self.before.clone(),
            after: self.after.clone(),
        }
    }

    /// A standalone unit for one `before` fragment: same path and settings,
    /// no fragments of its own.
    pub fn fragment(&self, content: String) -> Self {
        Self {
            content,
            relative_path: self.relative_path.clone(),
            metadata: self.metadata.clone(),
            ..Self::default()
        }
    }

    /// Same unit with a new text buffer and extra `before` fragments.
    pub fn with_before(&self, content: String, fragments: Vec<String>) -> Self {
        let mut next = self.with_content(content);
        next.before.extend(fragments);
        next
    }

    /// String metadata value, if present.
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

/// Derive the relative-path context for a logical output path.
///
/// The path is relative to the source root; each directory level becomes
/// one `/..` segment.
///
/// | Logical path            | Relative path |
/// |-------------------------|---------------|
/// | `index.php`             | `""`          |
/// | `about/index.php`       | `"/.."`       |
/// | `blog/post/index.php`   | `"/../.."`    |
pub fn relative_path(logical: &Path) -> String {
    let depth = logical.parent().map_or(0, |dir| {
        dir.components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .count()
    });
    "/..".repeat(depth)
}
