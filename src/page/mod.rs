//! Pages and partials.
//!
//! A template under the source root is one of:
//!
//! - **page**: has front matter, a pretty output path, a URL and is wrapped
//!   into a full PHP program by [`assemble`]
//! - **partial**: lives in a convention directory (`_includes`, `_layouts`,
//!   `_plugins`, `_data`) and is compiled as-is
//!
//! # Flow
//!
//! ```text
//! Page::parse() ──► Page::render() ──► Rendered { output, text }
//!      │                  │
//!      ▼                  ▼
//!  front matter,     Compiler::compile(),
//!  output path       page assembly
//! ```

pub mod assemble;
mod error;
pub mod frontmatter;
pub mod paths;

pub use assemble::PageContext;
pub use error::PageError;

use crate::compiler::{CompileReport, Compiler, Conventions, TemplateUnit};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Page,
    Partial,
}

/// A parsed template, ready to compile.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub kind: PageKind,
    /// Source path relative to the source root.
    pub source: PathBuf,
    /// Output path relative to the output root.
    pub output: PathBuf,
    /// Front matter (always empty for partials).
    pub front_matter: Map<String, Value>,
    /// Template text without front matter.
    pub body: String,
}

/// A compiled template.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// Output path relative to the output root.
    pub output: PathBuf,
    pub text: String,
    pub report: CompileReport,
    /// Section captures a partial defined; they have nowhere to run.
    pub dropped_sections: usize,
}

impl Page {
    /// Classify and parse a template. `source` is relative to the source root.
    pub fn parse(source: &Path, text: &str, dirs: &Conventions) -> Result<Self, PageError> {
        if dirs.is_partial(source) {
            return Ok(Self {
                kind: PageKind::Partial,
                source: source.to_path_buf(),
                output: paths::strip_blade(source),
                front_matter: Map::new(),
                body: text.to_owned(),
            });
        }

        let (front_matter, body) = frontmatter::split(text)?;
        let permalink = front_matter.get("permalink").and_then(Value::as_str);
        let output = paths::page_output(source, permalink)?;

        Ok(Self {
            kind: PageKind::Page,
            source: source.to_path_buf(),
            output,
            front_matter,
            body: body.to_owned(),
        })
    }

    /// Read and parse a template from disk.
    pub fn load(root: &Path, source: &Path, dirs: &Conventions) -> Result<Self, PageError> {
        let full = root.join(source);
        let text = std::fs::read_to_string(&full).map_err(|e| PageError::Io(full, e))?;
        Self::parse(source, &text, dirs)
    }

    pub fn url(&self) -> Option<String> {
        (self.kind == PageKind::Page).then(|| paths::page_url(&self.output))
    }

    /// Compile the template. `modified` is the source mtime in Unix seconds.
    pub fn render(&self, compiler: &Compiler, modified: u64) -> Rendered {
        let unit = TemplateUnit::new(self.body.as_str()).with_metadata(self.front_matter.clone());
        let compiled = compiler.compile(unit, &self.output);
        let options = compiler.options();

        let (text, dropped_sections) = match self.kind {
            PageKind::Partial => (compiled.unit.content, compiled.unit.before.len()),
            PageKind::Page => {
                let url = paths::page_url(&self.output);
                let ctx = PageContext {
                    url: &url,
                    modified,
                    buffer: options.buffer.as_deref(),
                    dirs: &options.dirs,
                };
                (assemble::page(compiled.unit, &ctx), 0)
            }
        };

        Rendered {
            output: self.output.clone(),
            text,
            report: compiled.report,
            dropped_sections,
        }
    }
}
