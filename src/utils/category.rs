//! File category classification for watch mode and incremental builds.
//!
//! # File Categories
//!
//! | Category   | Rebuild Strategy      | Example Files                     |
//! |------------|-----------------------|-----------------------------------|
//! | Template   | Incremental (single)  | `source/**/*.blade`               |
//! | Static     | Incremental (copy)    | `source/css/site.css`             |
//! | Config     | Full rebuild          | `bladerunner.toml`                |
//! | Unknown    | Ignored               | Files outside watched paths       |
//!
//! Partials are included by PHP at request time, so changing one never
//! requires recompiling the pages that use it.

use crate::{config::SiteConfig, page::paths::is_template};
use std::{
    env,
    path::{Path, PathBuf},
    time::SystemTime,
};

use super::fs::latest_mtime;

/// Category of a changed file, used to determine rebuild strategy in watch mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    /// `.blade` / `.blade.php` under the source root
    Template,
    /// Any other file under the source root, copied verbatim
    Static,
    /// Project configuration - requires full rebuild
    Config,
    /// File outside watched paths
    Unknown,
}

impl FileCategory {
    /// Get the short name for this category (used in logs)
    pub const fn name(self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Static => "static",
            Self::Config => "config",
            Self::Unknown => "unknown",
        }
    }
}

/// Categorize a file path to determine how changes should be handled.
pub fn categorize_path(path: &Path, config: &SiteConfig) -> FileCategory {
    let path = normalize_path(path);

    if path == config.config_path {
        FileCategory::Config
    } else if path.starts_with(&config.build.output) {
        // Output nested under the source root must not feed back into builds
        FileCategory::Unknown
    } else if path.starts_with(&config.build.source) {
        if is_template(&path) {
            FileCategory::Template
        } else {
            FileCategory::Static
        }
    } else {
        FileCategory::Unknown
    }
}

/// Normalize a path to absolute form for reliable comparison.
///
/// Config paths are already canonicalized, so we need to canonicalize
/// incoming paths (e.g., from file watcher) before comparison. Deleted
/// files cannot be canonicalized; their parent usually still can.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name())
            && let Ok(parent) = parent.canonicalize()
        {
            return parent.join(name);
        }
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Modification time of everything compiled output depends on besides its
/// own source: the config file.
pub fn get_deps_mtime(config: &SiteConfig) -> Option<SystemTime> {
    latest_mtime(&config.config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config_in(root: &Path) -> SiteConfig {
        SiteConfig::load(root, Path::new("bladerunner.toml")).unwrap()
    }

    #[test]
    fn test_category_name() {
        assert_eq!(FileCategory::Template.name(), "template");
        assert_eq!(FileCategory::Static.name(), "static");
        assert_eq!(FileCategory::Config.name(), "config");
        assert_eq!(FileCategory::Unknown.name(), "unknown");
    }

    #[test]
    fn test_categorize_path() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("source/_includes")).unwrap();
        fs::write(root.join("bladerunner.toml"), "").unwrap();
        fs::write(root.join("source/index.blade"), "").unwrap();
        fs::write(root.join("source/_includes/nav.blade.php"), "").unwrap();
        fs::write(root.join("source/site.css"), "").unwrap();
        fs::write(root.join("README.md"), "").unwrap();
        let config = config_in(root);

        let cat = |p: &str| categorize_path(&root.join(p), &config);
        assert_eq!(cat("bladerunner.toml"), FileCategory::Config);
        assert_eq!(cat("source/index.blade"), FileCategory::Template);
        assert_eq!(cat("source/_includes/nav.blade.php"), FileCategory::Template);
        assert_eq!(cat("source/site.css"), FileCategory::Static);
        assert_eq!(cat("README.md"), FileCategory::Unknown);
    }

    #[test]
    fn test_categorize_deleted_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("source")).unwrap();
        let config = config_in(dir.path());
        let gone = dir.path().join("source/gone.blade");
        assert_eq!(categorize_path(&gone, &config), FileCategory::Template);
    }

    #[test]
    fn test_normalize_path_relative() {
        let normalized = normalize_path(Path::new("relative/path/file.txt"));
        assert!(normalized.is_absolute());
    }
}
