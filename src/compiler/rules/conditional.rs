//! Conditional family: `@if`, `@elseif`, `@else`, `@unless`, `@empty`.
//!
//! Open and close tags are rewritten independently of each other. Nesting is
//! not checked: an `@endif` without an `@if` still becomes `endif`.

use super::{Outcome, Rule};
use crate::compiler::{
    scan::{opener, replace_all, replace_literal, rewrite_calls, token},
    unit::TemplateUnit,
};
use regex::Regex;

const ENDIF: &str = "<?php endif; ?>";

/// Rewrite openers with `open` and the literal close tag to `endif`.
fn conditional(
    unit: &TemplateUnit,
    re: &Regex,
    close: &str,
    open: impl Fn(&str) -> String,
) -> Outcome {
    let opened = rewrite_calls(re, &unit.content, |call| Some(open(call.args)));
    let text = opened.as_deref().unwrap_or(&unit.content);
    let closed = replace_literal(text, close, ENDIF);
    Outcome::content(unit, closed.or(opened))
}

/// `@if(expr)` … `@endif`.
pub struct If {
    open: Regex,
}

impl If {
    pub fn new() -> Self {
        Self { open: opener("if") }
    }
}

impl Rule for If {
    fn name(&self) -> &str {
        "if"
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        conditional(unit, &self.open, "@endif", |expr| format!("<?php if ({expr}) : ?>"))
    }
}

/// `@elseif(expr)`.
pub struct ElseIf {
    open: Regex,
}

impl ElseIf {
    pub fn new() -> Self {
        Self { open: opener("elseif") }
    }
}

impl Rule for ElseIf {
    fn name(&self) -> &str {
        "elseif"
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        let text = rewrite_calls(&self.open, &unit.content, |call| {
            Some(format!("<?php elseif ({}) : ?>", call.args))
        });
        Outcome::content(unit, text)
    }
}

/// Bare `@else`. Runs before `elseif`, so `@elseif` must not match.
pub struct Else {
    token: Regex,
}

impl Else {
    pub fn new() -> Self {
        Self { token: token("@else") }
    }
}

impl Rule for Else {
    fn name(&self) -> &str {
        "else"
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        let text = replace_all(&self.token, &unit.content, |_| "<?php else : ?>".to_owned());
        Outcome::content(unit, text)
    }
}

/// `@unless(expr)` … `@endunless`: negated `if`.
pub struct Unless {
    open: Regex,
}

impl Unless {
    pub fn new() -> Self {
        Self { open: opener("unless") }
    }
}

impl Rule for Unless {
    fn name(&self) -> &str {
        "unless"
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        conditional(unit, &self.open, "@endunless", |expr| {
            format!("<?php if (!({expr})) : ?>")
        })
    }
}

/// `@empty(expr)` … `@endempty`: true when the value is empty or falsy.
pub struct Empty {
    open: Regex,
}

impl Empty {
    pub fn new() -> Self {
        Self { open: opener("empty") }
    }
}

impl Rule for Empty {
    fn name(&self) -> &str {
        "empty"
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        conditional(unit, &self.open, "@endempty", |expr| {
            format!("<?php if (empty({expr}) || !({expr})) : ?>")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::rules::run;

    #[test]
    fn test_if_endif() {
        assert_eq!(
            run(&If::new(), "@if(true)\nX\n@endif"),
            "<?php if (true) : ?>\nX\n<?php endif; ?>"
        );
    }

    #[test]
    fn test_if_with_space_and_nested_parens() {
        assert_eq!(
            run(&If::new(), "@if (count($xs) > 0)<b>(n)</b>"),
            "<?php if (count($xs) > 0) : ?><b>(n)</b>"
        );
    }

    #[test]
    fn test_if_close_only() {
        // Tags are rewritten independently
        assert_eq!(run(&If::new(), "x @endif"), "x <?php endif; ?>");
    }

    #[test]
    fn test_if_unclosed_paren_passes_through() {
        let rule = If::new();
        let unit = TemplateUnit::new("@if($a");
        assert_eq!(rule.apply(&unit), Outcome::Unmatched);
    }

    #[test]
    fn test_elseif() {
        assert_eq!(
            run(&ElseIf::new(), "@elseif($b)"),
            "<?php elseif ($b) : ?>"
        );
    }

    #[test]
    fn test_else_skips_elseif() {
        assert_eq!(run(&Else::new(), "@elseif($b)"), "@elseif($b)");
        assert_eq!(run(&Else::new(), "a\n@else\nb"), "a\n<?php else : ?>\nb");
        assert_eq!(run(&Else::new(), "@else<p>b</p>"), "<?php else : ?><p>b</p>");
    }

    #[test]
    fn test_unless() {
        assert_eq!(
            run(&Unless::new(), "@unless($user)\nguest\n@endunless"),
            "<?php if (!($user)) : ?>\nguest\n<?php endif; ?>"
        );
    }

    #[test]
    fn test_empty() {
        assert_eq!(
            run(&Empty::new(), "@empty($posts)none@endempty"),
            "<?php if (empty($posts) || !($posts)) : ?>none<?php endif; ?>"
        );
    }

    #[test]
    fn test_if_does_not_touch_other_directives() {
        let text = "@unless($a) @elseif($b) @endunless";
        assert_eq!(If::new().apply(&TemplateUnit::new(text)), Outcome::Unmatched);
    }
}
