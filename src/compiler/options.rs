//! Per-invocation compile options.

use crate::config::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};

/// Names of the convention directories under the source root.
///
/// `includes` is where `@include` and `@component` look, `layouts` holds
/// page layouts, and every `.php` file in `plugins` and `data` is included
/// ahead of each page body.
#[derive(Debug, Clone, PartialEq, Eq, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct Conventions {
    #[serde(default = "defaults::dirs::includes")]
    #[educe(Default = defaults::dirs::includes())]
    pub includes: String,

    #[serde(default = "defaults::dirs::layouts")]
    #[educe(Default = defaults::dirs::layouts())]
    pub layouts: String,

    #[serde(default = "defaults::dirs::plugins")]
    #[educe(Default = defaults::dirs::plugins())]
    pub plugins: String,

    #[serde(default = "defaults::dirs::data")]
    #[educe(Default = defaults::dirs::data())]
    pub data: String,
}

impl Conventions {
    pub fn names(&self) -> [&str; 4] {
        [&self.includes, &self.layouts, &self.plugins, &self.data]
    }

    /// Whether any directory component of `path` is a convention directory.
    ///
    /// Only whole components count: `my_includes/x.blade` is not a partial.
    pub fn is_partial(&self, path: &Path) -> bool {
        let names = self.names();
        path.parent().is_some_and(|dir| {
            dir.components()
                .filter_map(|c| c.as_os_str().to_str())
                .any(|c| names.contains(&c))
        })
    }
}

/// Options for one compiler instance.
#[derive(Debug, Clone, PartialEq, Educe)]
#[educe(Default)]
pub struct CompileOptions {
    /// HTML-escape `{{ }}` output.
    #[educe(Default = true)]
    pub safe_output: bool,

    /// PHP function wrapping the whole page output, e.g. `minify`.
    pub buffer: Option<String>,

    pub dirs: Conventions,

    /// Text-substitution directives (`name` → template with `{args}`),
    /// applied after the built-ins in name order.
    pub directives: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_conventions() {
        let dirs = Conventions::default();
        assert_eq!(dirs.names(), ["_includes", "_layouts", "_plugins", "_data"]);
    }

    #[test]
    fn test_default_options() {
        let options = CompileOptions::default();
        assert!(options.safe_output);
        assert!(options.buffer.is_none());
        assert!(options.directives.is_empty());
    }

    #[test]
    fn test_is_partial() {
        let dirs = Conventions::default();
        assert!(dirs.is_partial(Path::new("_includes/nav.blade")));
        assert!(dirs.is_partial(Path::new("blog/_layouts/post.blade.php")));
        assert!(!dirs.is_partial(Path::new("index.blade")));
        assert!(!dirs.is_partial(Path::new("my_includes/nav.blade")));
        // The file name itself does not count
        assert!(!dirs.is_partial(Path::new("_data")));
    }

    #[test]
    fn test_conventions_partial_toml() {
        let dirs: Conventions = toml::from_str(r#"includes = "partials""#).unwrap();
        assert_eq!(dirs.includes, "partials");
        assert_eq!(dirs.layouts, "_layouts");
    }
}
