//! Named sections: `@section(name) … @endsection` and `@yield(name)`.
//!
//! Section bodies leave the page body and become `before` fragments that
//! fill `$sections[name]`. Page assembly runs every `before` fragment ahead
//! of the content, so a `@yield` in a layout always sees the captured text.

use super::{Outcome, Rule};
use crate::compiler::{
    scan::{Policy, Regions, bare_name, opener, remove_spans, rewrite_calls, unquote},
    unit::TemplateUnit,
};
use regex::Regex;

/// Buffer capture storing `body` into `$sections[name]`.
pub fn capture(name: &str, body: &str) -> String {
    format!("<?php ob_start(); ?>\n{body}\n<?php $sections[\"{name}\"] = ob_get_clean(); ?>")
}

pub struct Section {
    regions: Regions,
}

impl Section {
    pub fn new() -> Self {
        Self {
            regions: Regions::new("section", "@endsection", Policy::All),
        }
    }
}

impl Rule for Section {
    fn name(&self) -> &str {
        "section"
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        let (spans, fragments): (Vec<_>, Vec<_>) = self
            .regions
            .find(&unit.content)
            .into_iter()
            .filter_map(|region| {
                let name = bare_name(region.args);
                (!name.is_empty()).then(|| (region.span, capture(&name, region.body)))
            })
            .unzip();

        if spans.is_empty() {
            return Outcome::Unmatched;
        }

        let content = remove_spans(&unit.content, &spans);
        Outcome::Rewritten(unit.with_before(content, fragments))
    }
}

/// `@yield('name')`: echo a captured section, empty when unset.
pub struct Yield {
    open: Regex,
}

impl Yield {
    pub fn new() -> Self {
        Self { open: opener("yield") }
    }
}

impl Rule for Yield {
    fn name(&self) -> &str {
        "yield"
    }

    fn apply(&self, unit: &TemplateUnit) -> Outcome {
        let text = rewrite_calls(&self.open, &unit.content, |call| {
            let name = unquote(call.args)?;
            Some(format!(r#"<?php echo $sections["{name}"] ?? ""; ?>"#))
        });
        Outcome::content(unit, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::rules::run;

    #[test]
    fn test_section_moves_body_to_before() {
        let unit = TemplateUnit::new("a@section('title')Home@endsection b");
        let out = Section::new().apply(&unit).into_unit().unwrap();
        assert_eq!(out.content, "a b");
        assert_eq!(
            out.before,
            vec!["<?php ob_start(); ?>\nHome\n<?php $sections[\"title\"] = ob_get_clean(); ?>"]
        );
    }

    #[test]
    fn test_section_keeps_order() {
        let unit = TemplateUnit::new("@section(\"a\")1@endsection@section('b')\n2\n@endsection");
        let out = Section::new().apply(&unit).into_unit().unwrap();
        assert_eq!(out.content, "");
        assert_eq!(out.before.len(), 2);
        assert!(out.before[0].contains(r#"$sections["a"]"#));
        assert!(out.before[1].contains("\n\n2\n\n"));
    }

    #[test]
    fn test_section_unclosed_untouched() {
        let unit = TemplateUnit::new("@section('a') never closed");
        assert_eq!(Section::new().apply(&unit), Outcome::Unmatched);
    }

    #[test]
    fn test_section_nameless_untouched() {
        let unit = TemplateUnit::new("@section('')x@endsection");
        assert_eq!(Section::new().apply(&unit), Outcome::Unmatched);
    }

    #[test]
    fn test_yield() {
        assert_eq!(
            run(&Yield::new(), "<title>@yield('title')</title>"),
            r#"<title><?php echo $sections["title"] ?? ""; ?></title>"#
        );
        assert_eq!(
            run(&Yield::new(), "@yield ( \"body\" )"),
            r#"<?php echo $sections["body"] ?? ""; ?>"#
        );
    }

    #[test]
    fn test_yield_requires_literal_name() {
        assert_eq!(Yield::new().apply(&TemplateUnit::new("@yield($name)")), Outcome::Unmatched);
    }
}
