//! YAML front matter.
//!
//! ```text
//! ---
//! title: Home
//! layout: base
//! ---
//! <h1>{{ $page->title }}</h1>
//! ```

use super::PageError;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static FRONT_MATTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A---\r?\n?([\s\S]*?)\r?\n?---\r?\n?").unwrap());

/// Split a leading front matter block from the body.
///
/// Text without a block yields an empty mapping and the text unchanged.
/// An empty block yields an empty mapping.
pub fn split(text: &str) -> Result<(Map<String, Value>, &str), PageError> {
    let Some(caps) = FRONT_MATTER.captures(text) else {
        return Ok((Map::new(), text));
    };
    let end = caps.get(0).map_or(0, |m| m.end());
    let yaml = caps.get(1).map_or("", |m| m.as_str());

    Ok((parse(yaml)?, &text[end..]))
}

fn parse(yaml: &str) -> Result<Map<String, Value>, PageError> {
    if yaml.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        Value::Array(_) => Err(PageError::FrontMatterShape("a list")),
        Value::String(_) => Err(PageError::FrontMatterShape("a string")),
        Value::Number(_) => Err(PageError::FrontMatterShape("a number")),
        Value::Bool(_) => Err(PageError::FrontMatterShape("a boolean")),
    }
}
