//! Source → output path mapping.
//!
//! | Source                 | Front matter          | Output                |
//! |------------------------|-----------------------|-----------------------|
//! | `index.blade`          |                       | `index.php`           |
//! | `about.blade.php`      |                       | `about/index.php`     |
//! | `blog/index.blade`     |                       | `blog/index.php`      |
//! | `post.blade`           | `permalink: /a/b/`    | `a/b/index.php`       |
//! | `feed.blade`           | `permalink: feed.xml` | `feed.xml`            |
//!
//! All paths are relative to the source (and output) root.

use super::PageError;
use std::path::{Component, Path, PathBuf};

const INDEX: &str = "index.php";

/// Whether a file is a template: `*.blade` or `*.blade.php`.
pub fn is_template(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| template_stem(n).is_some())
}

fn template_stem(name: &str) -> Option<&str> {
    name.strip_suffix(".blade.php")
        .or_else(|| name.strip_suffix(".blade"))
        .filter(|stem| !stem.is_empty())
}

/// Replace the template extension with `.php`.
pub fn strip_blade(path: &Path) -> PathBuf {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    match template_stem(name) {
        Some(stem) => path.with_file_name(format!("{stem}.php")),
        None => path.to_path_buf(),
    }
}

/// Output path of a page (not a partial).
pub fn page_output(source: &Path, permalink: Option<&str>) -> Result<PathBuf, PageError> {
    if let Some(permalink) = permalink {
        return permalink_output(permalink);
    }

    let php = strip_blade(source);
    if php.file_name().is_some_and(|n| n == INDEX) {
        return Ok(php);
    }
    Ok(php.with_extension("").join(INDEX))
}

fn permalink_output(permalink: &str) -> Result<PathBuf, PageError> {
    let trimmed = permalink.trim().trim_end_matches('/').trim_start_matches('/');
    let path = PathBuf::from(trimmed);

    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(PageError::InvalidPath(permalink.to_owned()));
    }
    if trimmed.is_empty() {
        return Ok(PathBuf::from(INDEX));
    }

    if has_extension(trimmed) {
        Ok(path)
    } else {
        Ok(path.join(INDEX))
    }
}

/// A trailing `.ext` of lowercase ASCII letters.
fn has_extension(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| !ext.is_empty() && ext.bytes().all(|b| b.is_ascii_lowercase()))
}

/// Public URL of an output path: `/` for the root index, otherwise `/`
/// followed by the output directory (or file, for permalinks with an
/// extension).
pub fn page_url(output: &Path) -> String {
    let path = output.to_string_lossy().replace('\\', "/");
    if path == INDEX {
        return "/".to_owned();
    }
    let trimmed = path.strip_suffix(&format!("/{INDEX}")).unwrap_or(&path);
    format!("/{trimmed}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_template() {
        assert!(is_template(Path::new("index.blade")));
        assert!(is_template(Path::new("a/b.blade.php")));
        assert!(!is_template(Path::new("style.css")));
        assert!(!is_template(Path::new("plain.php")));
        assert!(!is_template(Path::new(".blade")));
    }

    #[test]
    fn test_strip_blade() {
        assert_eq!(strip_blade(Path::new("a/b.blade.php")), Path::new("a/b.php"));
        assert_eq!(strip_blade(Path::new("nav.blade")), Path::new("nav.php"));
        assert_eq!(strip_blade(Path::new("x.css")), Path::new("x.css"));
    }

    #[test]
    fn test_page_output_index() {
        assert_eq!(page_output(Path::new("index.blade"), None).unwrap(), Path::new("index.php"));
        assert_eq!(
            page_output(Path::new("blog/index.blade.php"), None).unwrap(),
            Path::new("blog/index.php")
        );
    }

    #[test]
    fn test_page_output_pretty() {
        assert_eq!(
            page_output(Path::new("about.blade"), None).unwrap(),
            Path::new("about/index.php")
        );
        assert_eq!(
            page_output(Path::new("blog/first.blade.php"), None).unwrap(),
            Path::new("blog/first/index.php")
        );
    }

    #[test]
    fn test_page_output_permalink() {
        assert_eq!(
            page_output(Path::new("x.blade"), Some("/a/b/")).unwrap(),
            Path::new("a/b/index.php")
        );
        assert_eq!(
            page_output(Path::new("x.blade"), Some("feed.xml")).unwrap(),
            Path::new("feed.xml")
        );
        assert_eq!(page_output(Path::new("x.blade"), Some("/")).unwrap(), Path::new("index.php"));
    }

    #[test]
    fn test_page_output_permalink_escape() {
        assert!(matches!(
            page_output(Path::new("x.blade"), Some("../outside")),
            Err(PageError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_page_url() {
        assert_eq!(page_url(Path::new("index.php")), "/");
        assert_eq!(page_url(Path::new("about/index.php")), "/about");
        assert_eq!(page_url(Path::new("blog/first/index.php")), "/blog/first");
        assert_eq!(page_url(Path::new("feed.xml")), "/feed.xml");
    }
}
