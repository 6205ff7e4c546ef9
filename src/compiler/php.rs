//! PHP fragment builders shared by the rules and page assembly.

use super::scan::{bare_name, unquote};

/// Re-quote a template literal as a PHP double-quoted string.
///
/// The inner text keeps its backslash escapes. `$` is escaped so a value
/// written as a plain string never interpolates variables.
pub fn string_literal(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len() + 2);
    out.push('"');
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                // Keep escapes, but a quote of the other style needs no backslash
                match chars.next() {
                    Some('\'') => out.push('\''),
                    Some(next) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => out.push_str("\\\\"),
                }
            }
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// A value argument: quoted literals become PHP strings, anything else
/// passes through as an expression evaluated at runtime.
pub fn value(arg: &str) -> String {
    match unquote(arg) {
        Some(inner) => string_literal(inner),
        None => arg.trim().to_owned(),
    }
}

/// PHP expression for a file under one of the convention directories.
///
/// `name` is a dotted template name: `'partials.nav'` → `partials/nav.php`.
pub fn dir_path(relative_path: &str, dir: &str, name: &str) -> String {
    let file = bare_name(name).replace('.', "/");
    format!(r#"dirname(__FILE__) . "{relative_path}/{dir}/{file}.php""#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_literal_plain() {
        assert_eq!(string_literal("Hi"), r#""Hi""#);
        assert_eq!(string_literal(""), r#""""#);
    }

    #[test]
    fn test_string_literal_escapes() {
        assert_eq!(string_literal(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(string_literal("cost $5"), r#""cost \$5""#);
        assert_eq!(string_literal(r"it\'s"), r#""it's""#);
        assert_eq!(string_literal(r"a\nb"), r#""a\nb""#);
    }

    #[test]
    fn test_value() {
        assert_eq!(value("'Hi'"), r#""Hi""#);
        assert_eq!(value(" $title "), "$title");
        assert_eq!(value("strtoupper('x')"), "strtoupper('x')");
    }

    #[test]
    fn test_dir_path() {
        assert_eq!(
            dir_path("/..", "_includes", "'partials.nav'"),
            r#"dirname(__FILE__) . "/../_includes/partials/nav.php""#
        );
        assert_eq!(
            dir_path("", "_layouts", "base"),
            r#"dirname(__FILE__) . "/_layouts/base.php""#
        );
    }
}
