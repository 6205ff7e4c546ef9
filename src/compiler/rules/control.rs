//! Loop control (`@break`, `@continue`) and page properties (`@set`).

use super::{Outcome, Rule};
use crate::compiler::{
    scan::{opener, replace_all, rewrite_calls, split_first, token, unquote},
    unit::TemplateUnit,
};
use regex::Regex;

/// Shared shape of `@break` and `@continue`: a guarded form with a
/// condition and a bare unconditional form.
struct LoopControl {
    keyword: &'static str,
    guarded: Regex,
    bare: Regex,
}

impl LoopControl {
    fn new(keyword: &'static str) -> Self {
        Self {
            keyword,
            guarded: opener(keyword),
            bare: token(&format!("@{keyword}")),
        }
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        let keyword = self.keyword;
        let guarded = rewrite_calls(&self.guarded, &unit.content, |call| {
            Some(format!("<?php if ({}) {{ {keyword}; }} ?>", call.args))
        });
        let text = guarded.as_deref().unwrap_or(&unit.content);
        let bare = replace_all(&self.bare, text, |_| format!("<?php {keyword}; ?>"));
        Outcome::content(unit, bare.or(guarded))
    }
}

/// `@break` / `@break(expr)`.
pub struct Break(LoopControl);

impl Break {
    pub fn new() -> Self {
        Self(LoopControl::new("break"))
    }
}

impl Rule for Break {
    fn name(&self) -> &str {
        "break"
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        self.0.apply(unit)
    }
}

/// `@continue` / `@continue(expr)`.
pub struct Continue(LoopControl);

impl Continue {
    pub fn new() -> Self {
        Self(LoopControl::new("continue"))
    }
}

impl Rule for Continue {
    fn name(&self) -> &str {
        "continue"
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        self.0.apply(unit)
    }
}

/// `@set('key', expr)`: assign into the `$page` object at runtime.
///
/// The key must be a quoted literal; anything else is left untouched.
pub struct Set {
    open: Regex,
}

impl Set {
    pub fn new() -> Self {
        Self { open: opener("set") }
    }
}

impl Rule for Set {
    fn name(&self) -> &str {
        "set"
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        let text = rewrite_calls(&self.open, &unit.content, |call| {
            let (key, value) = split_first(call.args)?;
            let key = unquote(key).filter(|k| !k.is_empty())?;
            Some(format!("<?php $page->{key} = {value}; ?>"))
        });
        Outcome::content(unit, text)
    }
}
