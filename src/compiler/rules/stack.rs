//! Accumulation stacks: `@push` and `@stack`.
//!
//! Pushes are rewritten in place and prepend to `$stacks[name]`, so a stack
//! lists its entries newest-first.

use super::{Outcome, Rule};
use crate::compiler::{
    php,
    scan::{Policy, Regions, bare_name, opener, rewrite_calls, split_first, unquote},
    unit::TemplateUnit,
};
use regex::Regex;

fn merge(name: &str, value: &str) -> String {
    format!(r#"<?php $stacks["{name}"] = array_merge([{value}], $stacks["{name}"] ?? []); ?>"#)
}

/// `@push(name, value)` and `@push(name) … @endpush`.
pub struct Push {
    inline: Regex,
    blocks: Regions,
}

impl Push {
    pub fn new() -> Self {
        Self {
            inline: opener("push"),
            blocks: Regions::new("push", "@endpush", Policy::All),
        }
    }

    fn push_inline(&self, text: &str) -> Option<String> {
        rewrite_calls(&self.inline, text, |call| {
            let (name, value) = split_first(call.args)?;
            let name = bare_name(name);
            (!name.is_empty()).then(|| merge(&name, &php::value(value)))
        })
    }

    fn push_blocks(&self, text: &str) -> Option<String> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for block in self.blocks.find(text) {
            let name = bare_name(block.args);
            if name.is_empty() {
                continue;
            }
            out.push_str(&text[last..block.span.start]);
            out.push_str("<?php ob_start(); ?>\n");
            out.push_str(block.body);
            out.push('\n');
            out.push_str(&merge(&name, "ob_get_clean()"));
            last = block.span.end;
        }

        if last == 0 {
            return None;
        }
        out.push_str(&text[last..]);
        Some(out)
    }
}

impl Rule for Push {
    fn name(&self) -> &str {
        "push"
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        // Inline pushes first: their two-argument calls never open a block
        let inline = self.push_inline(&unit.content);
        let text = inline.as_deref().unwrap_or(&unit.content);
        let blocks = self.push_blocks(text);
        Outcome::content(unit, blocks.or(inline))
    }
}

/// `@stack('name')`: echo every entry pushed onto a stack.
pub struct Stack {
    open: Regex,
}

impl Stack {
    pub fn new() -> Self {
        Self { open: opener("stack") }
    }
}

impl Rule for Stack {
    fn name(&self) -> &str {
        "stack"
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        let text = rewrite_calls(&self.open, &unit.content, |call| {
            let name = unquote(call.args).filter(|n| !n.is_empty())?;
            Some(format!(r#"<?php echo join("", $stacks["{name}"] ?? []); ?>"#))
        });
        Outcome::content(unit, text)
    }
}
