//! Passes that run outside the directive order: comment stripping before
//! the built-ins, output tags and the generic call after the extensions,
//! and tag closure at the very end.

use super::{BUILTIN_ORDER, Outcome, Rule};
use crate::compiler::{
    scan::{matching_paren, replace_all},
    unit::TemplateUnit,
};
use regex::Regex;
use std::sync::LazyLock;

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{--[\s\S]*?--\}\}").unwrap());
static ESCAPED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{!!\s*(\S.*?)\s*!!\}").unwrap());
static ECHO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{\s*(\S.*?)\s*\}\}").unwrap());
static CALL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@([A-Za-z_]+) ?\(").unwrap());
static END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@end([A-Za-z_]+)").unwrap());

/// Directive words owned by the built-in rules. One of them left in the
/// text was malformed and stays as written.
fn is_builtin(name: &str) -> bool {
    BUILTIN_ORDER.contains(&name) || name == "slot"
}

/// `a or b` is shorthand for a null-coalescing default.
fn coalesce(expr: &str) -> String {
    expr.replace(" or ", " ?? ")
}

/// Removes `{{-- … --}}` comments. Running it twice changes nothing.
pub struct Comments;

impl Rule for Comments {
    fn name(&self) -> &str {
        "comments"
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        Outcome::content(unit, replace_all(&COMMENT, &unit.content, |_| String::new()))
    }
}

/// `{!! expr !!}`: unescaped echo.
pub struct EscapedOutput;

impl Rule for EscapedOutput {
    fn name(&self) -> &str {
        "escaped-output"
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        let text = replace_all(&ESCAPED, &unit.content, |caps| {
            format!("<?php echo {}; ?>", coalesce(&caps[1]))
        });
        Outcome::content(unit, text)
    }
}

/// Catch-all for directives nothing else claimed.
///
/// `@name(args)` is treated as a call to a project-defined PHP function used
/// as a condition, and every remaining `@endname` closes it. A call followed
/// by `{` on the same line is left alone, since it is most likely inline
/// script or style text. Built-in directive words are never claimed here.
pub struct GenericCall;

impl GenericCall {
    fn calls(text: &str) -> Option<String> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut pos = 0;

        while let Some(caps) = CALL.captures_at(text, pos) {
            let Some(whole) = caps.get(0) else { break };
            let open = whole.end() - 1;
            if is_builtin(&caps[1]) {
                pos = whole.end();
                continue;
            }
            let Some(close) = matching_paren(text, open) else {
                pos = whole.end();
                continue;
            };

            let line_rest = text[close + 1..].split('\n').next().unwrap_or_default();
            if line_rest.contains('{') {
                pos = whole.end();
                continue;
            }

            out.push_str(&text[last..whole.start()]);
            out.push_str(&format!("<?php if ({}({})) : ?>", &caps[1], &text[open + 1..close]));
            last = close + 1;
            pos = last;
        }

        if last == 0 {
            return None;
        }
        out.push_str(&text[last..]);
        Some(out)
    }
}

impl Rule for GenericCall {
    fn name(&self) -> &str {
        "generic-call"
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        let opened = Self::calls(&unit.content);
        let text = opened.as_deref().unwrap_or(&unit.content);
        let closed = replace_all(&END, text, |caps| {
            if is_builtin(&caps[1]) {
                caps[0].to_owned()
            } else {
                "<?php endif; ?>".to_owned()
            }
        })
        .filter(|closed| closed != text);
        Outcome::content(unit, closed.or(opened))
    }
}

/// `{{ expr }}`: echo with a `""` fallback, HTML-escaped when `safe`.
pub struct Interpolation {
    safe: bool,
}

impl Interpolation {
    pub const fn new(safe: bool) -> Self {
        Self { safe }
    }
}

impl Rule for Interpolation {
    fn name(&self) -> &str {
        "interpolation"
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        let text = replace_all(&ECHO, &unit.content, |caps| {
            let expr = coalesce(&format!("{} or \"\"", &caps[1]));
            if self.safe {
                format!("<?php echo htmlspecialchars({expr}, ENT_QUOTES, 'UTF-8', false); ?>")
            } else {
                format!("<?php echo {expr}; ?>")
            }
        });
        Outcome::content(unit, text)
    }
}

/// Appends `?>` when the last `<?php` opened in the text is never closed.
pub struct CloseTag;

impl Rule for CloseTag {
    fn name(&self) -> &str {
        "close-tag"
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        let text = &unit.content;
        let unclosed = text
            .rfind("<?php")
            .is_some_and(|start| !text[start..].contains("?>"));
        Outcome::content(unit, unclosed.then(|| format!("{text}?>")))
    }
}
