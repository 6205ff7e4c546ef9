//! Loop family: `@for`, `@foreach`, `@while`.
//!
//! All three share one algorithm. A `source as binding` clause is kept
//! verbatim, so `@foreach($items as $key => $item)` emits exactly that
//! binding. Emitted loops expose a `$loop` helper by convention (index,
//! iteration, remaining, count, first, last) that the page runtime provides.

use super::{Outcome, Rule};
use crate::compiler::{
    scan::{opener, replace_all, rewrite_calls, token},
    unit::TemplateUnit,
};
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    For,
    Foreach,
    While,
}

impl LoopKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::For => "for",
            Self::Foreach => "foreach",
            Self::While => "while",
        }
    }

    /// `foreach` is meaningless without a binding.
    const fn requires_binding(self) -> bool {
        matches!(self, Self::Foreach)
    }
}

pub struct Loop {
    kind: LoopKind,
    open: Regex,
    close: Regex,
}

impl Loop {
    pub fn new(kind: LoopKind) -> Self {
        let keyword = kind.keyword();
        Self {
            kind,
            open: opener(keyword),
            close: token(&format!("@end{keyword}")),
        }
    }

    fn header(&self, args: &str) -> Option<String> {
        let keyword = self.kind.keyword();
        match args.split_once(" as ") {
            Some((source, binding)) => Some(format!(
                "<?php {keyword} ({} as {}) : ?>",
                source.trim(),
                binding.trim()
            )),
            None if self.kind.requires_binding() => None,
            None => Some(format!("<?php {keyword} ({}) : ?>", args.trim())),
        }
    }
}

impl Rule for Loop {
    fn name(&self) -> &str {
        self.kind.keyword()
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        let opened = rewrite_calls(&self.open, &unit.content, |call| self.header(call.args));
        let text = opened.as_deref().unwrap_or(&unit.content);
        let end = format!("<?php end{}; ?>", self.kind.keyword());
        let closed = replace_all(&self.close, text, |_| end.clone());
        Outcome::content(unit, closed.or(opened))
    }
}
