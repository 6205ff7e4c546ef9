//! Template directive compiler.
//!
//! Rewrites directive syntax embedded in markup into PHP. The compiler is a
//! region-oriented rewrite system, not a parser: each [`rules::Rule`] scans
//! the text for its own directive family and replaces what it recognizes.
//! Expressions inside directive arguments are passed to PHP untouched.
//!
//! - **unit**: [`TemplateUnit`], the per-file state threaded through stages
//! - **scan**: directive call and paired-region scanning
//! - **rules**: one rule per directive family
//! - **pipeline**: [`Compiler`], stage order and reporting
//!
//! # Example
//!
//! ```
//! use bladerunner::compiler::Compiler;
//! use std::path::Path;
//!
//! let compiled = Compiler::default().compile_str("@if($user)Hi@endif", Path::new("index.php"));
//! assert_eq!(
//!     compiled.unit.content,
//!     "<?php if ($user) : ?>Hi<?php endif; ?>"
//! );
//! ```

mod options;
mod pipeline;
mod unit;

pub mod php;
pub mod rules;
pub mod scan;

// ============================================================================
// Public API
// ============================================================================

pub use options::{CompileOptions, Conventions};
pub use pipeline::{CompileReport, Compiled, Compiler};
pub use unit::{TemplateUnit, relative_path};
