//! `@component(name) … @endcomponent` with `@slot` arguments.
//!
//! A component renders `<includes>/<name>.php` with a `$slot` object in
//! scope. Slots come in two forms:
//!
//! ```text
//! @component('card')
//!     @slot('title', 'Hello')          single slot: name + value
//!     @slot('footer') … @endslot       block slot: buffered markup
//!     Everything else                  → $slot->content
//! @endcomponent
//! ```
//!
//! Components are rewritten one at a time, first match first, until none
//! remain.

use super::{Outcome, Rule};
use crate::compiler::{
    php,
    scan::{Policy, Region, Regions, bare_name, opener, remove_spans, rewrite_calls, split_first},
    unit::TemplateUnit,
};
use regex::Regex;

pub struct Component {
    components: Regions,
    slot: Regex,
    block_slots: Regions,
    dir: String,
}

impl Component {
    /// `dir` is the includes directory name (`_includes` by default).
    pub fn new(dir: &str) -> Self {
        Self {
            components: Regions::new("component", "@endcomponent", Policy::First),
            slot: opener("slot"),
            block_slots: Regions::new("slot", "@endslot", Policy::All),
            dir: dir.to_owned(),
        }
    }

    /// PHP replacing one component region, or `None` for a nameless one.
    fn render(&self, region: &Region, relative_path: &str) -> Option<String> {
        let name = region.args.trim();
        if bare_name(name).is_empty() {
            return None;
        }

        // Single slots first, so their two-argument calls never open a block
        let mut singles = Vec::new();
        let body = rewrite_calls(&self.slot, region.body, |call| {
            let (slot, value) = split_first(call.args)?;
            singles.push(format!(
                r#"<?php $slot->{} = {} ?? ""; ?>"#,
                bare_name(slot),
                php::value(value)
            ));
            Some(String::new())
        });
        let body = body.as_deref().unwrap_or(region.body);

        let blocks = self.block_slots.find(body);
        let spans: Vec<_> = blocks.iter().map(|b| b.span.clone()).collect();
        let content = remove_spans(body, &spans);

        let path = php::dir_path(relative_path, &self.dir, name);
        let mut parts = vec![
            "<?php ob_start(); ?>".to_owned(),
            "<?php $slot = (object) []; ?>".to_owned(),
            format!("<?php ob_start(); ?>{content}<?php $slot->content = ob_get_clean(); ?>"),
        ];
        parts.extend(singles);
        parts.extend(blocks.iter().map(|block| {
            format!(
                "<?php ob_start(); ?>{}<?php $slot->{} = ob_get_clean(); ?>",
                block.body,
                bare_name(block.args)
            )
        }));
        parts.push(format!(
            "<?php if (file_exists({path})) {{ include {path}; echo ob_get_clean(); }} else {{ ob_end_clean(); }} ?>"
        ));

        Some(parts.join("\n"))
    }
}

impl Rule for Component {
    fn name(&self) -> &str {
        "component"
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        let mut text = unit.content.clone();
        let mut from = 0;
        let mut changed = false;

        while let Some(region) = self.components.next(&text, from) {
            match self.render(&region, &unit.relative_path) {
                Some(php) => {
                    let span = region.span.clone();
                    from = span.start + php.len();
                    text.replace_range(span, &php);
                    changed = true;
                }
                // Leave a nameless component as written and look past it
                None => from = region.span.end,
            }
        }

        Outcome::content(unit, changed.then_some(text))
    }
}
