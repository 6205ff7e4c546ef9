//! Directive rules.
//!
//! Each rule recognizes one directive family and rewrites it to PHP. Rules
//! are pure: they read a [`TemplateUnit`] and either report
//! [`Outcome::Unmatched`] or return a new unit.
//!
//! # Order
//!
//! The built-in set runs in a fixed order (see [`builtins`]):
//!
//! ```text
//! break → component → continue → else → elseif → empty → for → foreach
//!       → set → if → include → push → section → stack → unless → while → yield
//! ```
//!
//! No rule emits `@` directive syntax, so a rule's output is never matched
//! by a later rule. Rules that leave text behind on purpose (a malformed
//! call, an unknown directive) leave it for extension rules and the generic
//! catch-all passes that run after the built-ins.

mod component;
mod conditional;
mod control;
mod custom;
mod include;
mod loops;
mod output;
mod section;
mod stack;

pub use component::Component;
pub use conditional::{Else, ElseIf, Empty, If, Unless};
pub use control::{Break, Continue, Set};
pub use custom::{FnRule, TemplateDirective};
pub use include::Include;
pub use loops::{Loop, LoopKind};
pub use output::{CloseTag, Comments, EscapedOutput, GenericCall, Interpolation};
pub use section::{Section, Yield};
pub use stack::{Push, Stack};

use super::{options::Conventions, unit::TemplateUnit};

/// Result of applying one rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing in the unit matched the rule.
    Unmatched,
    /// The rule matched and produced a new unit.
    Rewritten(TemplateUnit),
}

impl Outcome {
    /// Wrap a rewritten text buffer, `None` meaning no match.
    pub fn content(unit: &TemplateUnit, content: Option<String>) -> Self {
        match content {
            Some(content) => Self::Rewritten(unit.with_content(content)),
            None => Self::Unmatched,
        }
    }

    pub const fn is_rewritten(&self) -> bool {
        matches!(self, Self::Rewritten(_))
    }

    /// The rewritten unit, if any.
    pub fn into_unit(self) -> Option<TemplateUnit> {
        match self {
            Self::Rewritten(unit) => Some(unit),
            Self::Unmatched => None,
        }
    }
}

/// A named compile stage.
pub trait Rule: Send + Sync {
    /// Stage name, used for reports and extension replacement.
    fn name(&self) -> &str;

    fn apply(&self, unit: &TemplateUnit) -> Outcome;
}

/// Names of the built-in directive rules, in application order.
pub const BUILTIN_ORDER: &[&str] = &[
    "break", "component", "continue", "else", "elseif", "empty", "for", "foreach", "set", "if",
    "include", "push", "section", "stack", "unless", "while", "yield",
];

/// The built-in directive rules in application order.
pub fn builtins(dirs: &Conventions) -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(Break::new()),
        Box::new(Component::new(&dirs.includes)),
        Box::new(Continue::new()),
        Box::new(Else::new()),
        Box::new(ElseIf::new()),
        Box::new(Empty::new()),
        Box::new(Loop::new(LoopKind::For)),
        Box::new(Loop::new(LoopKind::Foreach)),
        Box::new(Set::new()),
        Box::new(If::new()),
        Box::new(Include::new(&dirs.includes)),
        Box::new(Push::new()),
        Box::new(Section::new()),
        Box::new(Stack::new()),
        Box::new(Unless::new()),
        Box::new(Loop::new(LoopKind::While)),
        Box::new(Yield::new()),
    ]
}

/// Apply a single rule, returning the unit unchanged on no match.
#[cfg(test)]
pub(crate) fn run(rule: &dyn Rule, text: &str) -> String {
    let unit = TemplateUnit::new(text);
    rule.apply(&unit).into_unit().unwrap_or(unit).content
}
