//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn source() -> PathBuf {
        "source".into()
    }

    pub fn output() -> PathBuf {
        "public".into()
    }

    pub fn buffer() -> Option<String> {
        None
    }
}

// ============================================================================
// [build.dirs] Section Defaults
// ============================================================================

pub mod dirs {
    pub fn includes() -> String {
        "_includes".into()
    }

    pub fn layouts() -> String {
        "_layouts".into()
    }

    pub fn plugins() -> String {
        "_plugins".into()
    }

    pub fn data() -> String {
        "_data".into()
    }
}
