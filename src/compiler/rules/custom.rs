//! Extension rules supplied by the caller.
//!
//! Two flavors: [`FnRule`] wraps a closure for programmatic use, and
//! [`TemplateDirective`] is the `[directives]` table from the config file.

use super::{Outcome, Rule};
use crate::compiler::{
    scan::{opener, replace_all, rewrite_calls, token},
    unit::TemplateUnit,
};
use regex::Regex;
use std::fmt;

type RewriteFn = dyn Fn(&TemplateUnit) -> Option<TemplateUnit> + Send + Sync;

/// A named closure stage. Returning `None` means no match.
pub struct FnRule {
    name: String,
    rewrite: Box<RewriteFn>,
}

impl FnRule {
    pub fn new(
        name: impl Into<String>,
        rewrite: impl Fn(&TemplateUnit) -> Option<TemplateUnit> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            rewrite: Box::new(rewrite),
        }
    }
}

impl fmt::Debug for FnRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRule").field("name", &self.name).finish_non_exhaustive()
    }
}

impl Rule for FnRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        match (self.rewrite)(unit) {
            Some(next) => Outcome::Rewritten(next),
            None => Outcome::Unmatched,
        }
    }
}

/// A text-substitution directive: `@name(args)` becomes `template` with
/// every `{args}` replaced by the raw argument text.
///
/// ```toml
/// [directives]
/// datetime = "<?php echo date({args}); ?>"
/// ```
///
/// A bare `@name` substitutes an empty argument list.
#[derive(Debug, Clone)]
pub struct TemplateDirective {
    name: String,
    template: String,
    open: Regex,
    bare: Regex,
}

impl TemplateDirective {
    pub fn new(name: &str, template: &str) -> Self {
        Self {
            name: name.to_owned(),
            template: template.to_owned(),
            open: opener(name),
            bare: token(&format!("@{name}")),
        }
    }

    fn expand(&self, args: &str) -> String {
        self.template.replace("{args}", args)
    }
}

impl Rule for TemplateDirective {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        let called = rewrite_calls(&self.open, &unit.content, |call| Some(self.expand(call.args)));
        let text = called.as_deref().unwrap_or(&unit.content);
        let bare = replace_all(&self.bare, text, |_| self.expand(""));
        Outcome::content(unit, bare.or(called))
    }
}
