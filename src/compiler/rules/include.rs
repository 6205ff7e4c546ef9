//! `@include(name[, vars])`: conditionally include a partial.

use super::{Outcome, Rule};
use crate::compiler::{
    php,
    scan::{opener, rewrite_calls, split_first},
    unit::TemplateUnit,
};
use regex::Regex;

pub struct Include {
    open: Regex,
    dir: String,
}

impl Include {
    /// `dir` is the includes directory name (`_includes` by default).
    pub fn new(dir: &str) -> Self {
        Self {
            open: opener("include"),
            dir: dir.to_owned(),
        }
    }
}

impl Rule for Include {
    fn name(&self) -> &str {
        "include"
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        let text = rewrite_calls(&self.open, &unit.content, |call| {
            let (name, vars) = match split_first(call.args) {
                Some((name, vars)) => (name, Some(vars)),
                None => (call.args.trim(), None),
            };
            if name.is_empty() {
                return None;
            }

            let path = php::dir_path(&unit.relative_path, &self.dir, name);
            Some(match vars {
                Some(vars) => format!(
                    "<?php if (file_exists({path})) {{ ob_start(); extract({vars}); include {path}; echo ob_get_clean(); }} ?>"
                ),
                None => format!("<?php if (file_exists({path})) {{ include {path}; }} ?>"),
            })
        });
        Outcome::content(unit, text)
    }
}
