//! The compile orchestrator.
//!
//! ```text
//! raw text
//!   → comments            strip {{-- --}}
//!   → relative path       one /.. per directory level
//!   → built-in rules      fixed order, see rules::BUILTIN_ORDER
//!   → extension rules     registration order
//!   → escaped output      {!! !!}
//!   → generic call        @name(args) … @endname
//!   → interpolation       {{ }}
//!   → close tag           trailing ?>
//! ```
//!
//! A [`Compiler`] is built once and shared; compiling is a pure function of
//! the text, the logical output path and the options.

use super::{
    options::CompileOptions,
    rules::{
        self, CloseTag, Comments, EscapedOutput, FnRule, GenericCall, Interpolation, Outcome,
        Rule, TemplateDirective,
    },
    unit::{self, TemplateUnit},
};
use std::path::Path;

/// Names of the stages that rewrote a unit, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileReport {
    pub stages: Vec<String>,
}

impl CompileReport {
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// A compiled unit plus the stages that touched it.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub unit: TemplateUnit,
    pub report: CompileReport,
}

pub struct Compiler {
    options: CompileOptions,
    builtins: Vec<Box<dyn Rule>>,
    extensions: Vec<Box<dyn Rule>>,
    finals: Vec<Box<dyn Rule>>,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        let builtins = rules::builtins(&options.dirs);
        let extensions = options
            .directives
            .iter()
            .map(|(name, template)| Box::new(TemplateDirective::new(name, template)) as Box<dyn Rule>)
            .collect();
        let finals: Vec<Box<dyn Rule>> = vec![
            Box::new(EscapedOutput),
            Box::new(GenericCall),
            Box::new(Interpolation::new(options.safe_output)),
            Box::new(CloseTag),
        ];

        Self {
            options,
            builtins,
            extensions,
            finals,
        }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Register an extension rule after the built-ins.
    ///
    /// An extension with the same name as an existing one replaces it in
    /// place; otherwise it runs after every extension registered before it.
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        match self.extensions.iter().position(|r| r.name() == rule.name()) {
            Some(i) => self.extensions[i] = Box::new(rule),
            None => self.extensions.push(Box::new(rule)),
        }
        self
    }

    /// Register a closure as an extension rule. See [`Compiler::with_rule`].
    pub fn directive(
        self,
        name: impl Into<String>,
        rewrite: impl Fn(&TemplateUnit) -> Option<TemplateUnit> + Send + Sync + 'static,
    ) -> Self {
        self.with_rule(FnRule::new(name, rewrite))
    }

    /// Extension rule names in application order.
    pub fn extension_names(&self) -> Vec<&str> {
        self.extensions.iter().map(|r| r.name()).collect()
    }

    /// Compile a unit whose output will live at `logical` (relative to the
    /// output root).
    pub fn compile(&self, unit: TemplateUnit, logical: &Path) -> Compiled {
        let mut report = CompileReport::default();
        let mut unit = step(&Comments, unit, &mut report);
        unit.relative_path = unit::relative_path(logical);

        let stages = self.builtins.iter().chain(&self.extensions).chain(&self.finals);
        for rule in stages {
            unit = step(rule.as_ref(), unit, &mut report);
        }

        Compiled { unit, report }
    }

    /// Compile bare template text.
    pub fn compile_str(&self, text: &str, logical: &Path) -> Compiled {
        self.compile(TemplateUnit::new(text), logical)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompileOptions::default())
    }
}

/// Apply one stage to the body and to every `before` fragment that existed
/// when the stage started.
///
/// Section bodies leave the body half way through the built-ins; the stages
/// after `section` reach them here.
fn step(rule: &dyn Rule, unit: TemplateUnit, report: &mut CompileReport) -> TemplateUnit {
    let earlier = unit.before.len();
    let (mut unit, mut rewrote) = match rule.apply(&unit) {
        Outcome::Rewritten(next) => (next, true),
        Outcome::Unmatched => (unit, false),
    };

    for i in 0..earlier.min(unit.before.len()) {
        let fragment = unit.fragment(unit.before[i].clone());
        if let Outcome::Rewritten(next) = rule.apply(&fragment) {
            unit.before[i] = next.content;
            unit.before.extend(next.before);
            rewrote = true;
        }
    }

    if rewrote {
        report.stages.push(rule.name().to_owned());
    }
    unit
}
