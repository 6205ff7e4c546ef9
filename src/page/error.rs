//! Page-level error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Invalid front matter")]
    FrontMatter(#[from] serde_yaml::Error),

    #[error("Front matter must be a mapping, found {0}")]
    FrontMatterShape(&'static str),

    #[error("Invalid output path `{0}`")]
    InvalidPath(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_page_error_display() {
        let io_err = PageError::Io(
            PathBuf::from("index.blade"),
            Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        assert!(io_err.to_string().contains("index.blade"));

        let path_err = PageError::InvalidPath("../escape".into());
        assert!(path_err.to_string().contains("../escape"));

        let shape_err = PageError::FrontMatterShape("a list");
        assert!(shape_err.to_string().contains("a list"));
    }
}
