//! `[build]` section configuration.
//!
//! Contains source/output paths, output escaping and the convention
//! directory names.

use super::defaults;
use crate::compiler::Conventions;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in bladerunner.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// source = "source"        # Template root
/// output = "public"        # Output directory
/// safe_output = true       # HTML-escape {{ }} output
/// buffer = "minify"        # Pass every page through minify()
///
/// [build.dirs]
/// includes = "partials"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Template source directory.
    #[serde(default = "defaults::build::source")]
    #[educe(Default = defaults::build::source())]
    pub source: PathBuf,

    /// Build output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Clear output directory before each build.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub clean: bool,

    /// HTML-escape `{{ }}` interpolation.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub safe_output: bool,

    /// PHP function every page's output is passed through.
    #[serde(default = "defaults::build::buffer")]
    #[educe(Default = defaults::build::buffer())]
    pub buffer: Option<String>,

    /// Convention directory names under the source root.
    #[serde(default)]
    pub dirs: Conventions,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_defaults() {
        let config = BuildConfig::default();
        assert_eq!(config.source, PathBuf::from("source"));
        assert_eq!(config.output, PathBuf::from("public"));
        assert!(config.safe_output);
        assert!(!config.clean);
        assert!(config.buffer.is_none());
        assert_eq!(config.dirs.includes, "_includes");
    }

    #[test]
    fn test_build_config_partial_toml() {
        let config: BuildConfig = toml::from_str(
            r#"
            output = "dist"
            buffer = "minify"
            [dirs]
            layouts = "layouts"
        "#,
        )
        .unwrap();
        assert_eq!(config.source, PathBuf::from("source"));
        assert_eq!(config.output, PathBuf::from("dist"));
        assert_eq!(config.buffer.as_deref(), Some("minify"));
        assert_eq!(config.dirs.layouts, "layouts");
        assert_eq!(config.dirs.data, "_data");
    }

    #[test]
    fn test_build_config_unknown_field() {
        let result: Result<BuildConfig, _> = toml::from_str("minify = true");
        assert!(result.is_err());
    }
}
