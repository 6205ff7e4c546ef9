//! Directive scanning shared by the rule set.
//!
//! Directives are found with a regex for the opening `@name(` and a
//! quote-aware parenthesis scan for the arguments, so argument text may
//! contain nested calls, array literals and strings with parentheses.
//!
//! ```text
//! @include('card', ['title' => strtoupper($t)])
//! └──────┘└──────────────────────────────────┘
//!  opener         balanced arguments
//! ```
//!
//! [`Regions`] builds on this for paired directives (`@section … @endsection`).

use regex::{Captures, Regex};
use std::{borrow::Cow, ops::Range};

// ============================================================================
// Calls
// ============================================================================

/// One directive call found in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call<'a> {
    /// Byte span from `@` up to and including the closing `)`.
    pub span: Range<usize>,
    /// Directive name (`if`, `include`, ...).
    pub name: &'a str,
    /// Raw text between the parentheses.
    pub args: &'a str,
}

/// Compile an opener pattern for a fixed directive name: `@name` with an
/// optional single space before `(`.
pub fn opener(name: &str) -> Regex {
    Regex::new(&format!(r"@({}) ?\(", regex::escape(name))).expect("valid directive opener")
}

/// Compile a pattern for a bare token that must not run into an identifier.
pub fn token(literal: &str) -> Regex {
    Regex::new(&format!(r"{}\b", regex::escape(literal))).expect("valid directive token")
}

/// Index of the `)` closing the `(` at `open`.
///
/// Quoted strings are skipped (with backslash escapes), so `")"` inside an
/// argument does not close the call. Returns `None` when the text ends first.
pub fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'(') {
        return None;
    }

    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }

    None
}

/// The first call matching `opener` at or after byte `from`.
///
/// Openers whose parentheses never close are skipped.
pub fn next_call<'a>(opener: &Regex, text: &'a str, from: usize) -> Option<Call<'a>> {
    let mut pos = from;
    while let Some(caps) = opener.captures_at(text, pos) {
        let whole = caps.get(0)?;
        let open = whole.end() - 1;
        match matching_paren(text, open) {
            Some(close) => {
                return Some(Call {
                    span: whole.start()..close + 1,
                    name: caps.get(1).map_or("", |m| m.as_str()),
                    args: &text[open + 1..close],
                });
            }
            None => pos = whole.end(),
        }
    }
    None
}

/// All non-overlapping calls matching `opener`, left to right.
pub fn calls<'a>(opener: &Regex, text: &'a str) -> Vec<Call<'a>> {
    let mut found = Vec::new();
    let mut pos = 0;
    while let Some(call) = next_call(opener, text, pos) {
        pos = call.span.end;
        found.push(call);
    }
    found
}

/// Rewrite every call for which `rewrite` returns a replacement.
///
/// Returns `None` when nothing was replaced.
pub fn rewrite_calls(
    opener: &Regex,
    text: &str,
    mut rewrite: impl FnMut(&Call) -> Option<String>,
) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut changed = false;

    for call in calls(opener, text) {
        if let Some(replacement) = rewrite(&call) {
            out.push_str(&text[last..call.span.start]);
            out.push_str(&replacement);
            last = call.span.end;
            changed = true;
        }
    }

    if !changed {
        return None;
    }
    out.push_str(&text[last..]);
    Some(out)
}

/// Regex replacement that reports whether anything matched.
pub fn replace_all(
    pattern: &Regex,
    text: &str,
    rewrite: impl FnMut(&Captures) -> String,
) -> Option<String> {
    match pattern.replace_all(text, rewrite) {
        Cow::Borrowed(_) => None,
        Cow::Owned(s) => Some(s),
    }
}

/// Literal replacement that reports whether anything matched.
pub fn replace_literal(text: &str, from: &str, to: &str) -> Option<String> {
    text.contains(from).then(|| text.replace(from, to))
}

/// Remove spans from the text. Spans must be sorted and non-overlapping.
pub fn remove_spans(text: &str, spans: &[Range<usize>]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in spans {
        out.push_str(&text[last..span.start]);
        last = span.end;
    }
    out.push_str(&text[last..]);
    out
}

// ============================================================================
// Arguments
// ============================================================================

/// Split an argument list at its first top-level comma.
///
/// Commas inside quotes or brackets do not count. Returns the two trimmed
/// halves, or `None` for a single argument.
pub fn split_first(args: &str) -> Option<(&str, &str)> {
    let bytes = args.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth = depth.saturating_sub(1),
                b',' if depth == 0 => {
                    return Some((args[..i].trim(), args[i + 1..].trim()));
                }
                _ => {}
            },
        }
        i += 1;
    }

    None
}

/// Inner text of a single- or double-quoted literal.
///
/// The whole argument must be one literal: `'a' . 'b'` is an expression.
pub fn unquote(s: &str) -> Option<&str> {
    let s = s.trim();
    let bytes = s.as_bytes();
    let quote = *bytes.first()?;
    if quote != b'\'' && quote != b'"' {
        return None;
    }

    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b if b == quote => return (i == bytes.len() - 1).then(|| &s[1..i]),
            _ => {}
        }
        i += 1;
    }
    None
}

/// A name argument with every quote character dropped: `'card'` → `card`.
pub fn bare_name(arg: &str) -> String {
    arg.trim().chars().filter(|c| !matches!(c, '\'' | '"')).collect()
}

// ============================================================================
// Paired regions
// ============================================================================

/// How many regions a paired directive expects per pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Only the first region; callers rescan after rewriting it.
    First,
    /// Every non-overlapping region, left to right.
    All,
}

/// One `@open(args) body @close` region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region<'a> {
    /// Span from `@open` through the end of the close token.
    pub span: Range<usize>,
    /// Raw text between the opener's parentheses.
    pub args: &'a str,
    /// Text between the opener call and the close token.
    pub body: &'a str,
}

/// Paired-region extractor: an opener call followed by the nearest close
/// token. Regions do not nest; an inner opener is part of the outer body.
#[derive(Debug, Clone)]
pub struct Regions {
    open: Regex,
    close: &'static str,
    policy: Policy,
}

impl Regions {
    pub fn new(name: &str, close: &'static str, policy: Policy) -> Self {
        Self {
            open: opener(name),
            close,
            policy,
        }
    }

    /// The first region at or after byte `from`.
    ///
    /// When an opener has no close token after it, no later opener can
    /// have one either, so the search stops there.
    pub fn next<'a>(&self, text: &'a str, from: usize) -> Option<Region<'a>> {
        let call = next_call(&self.open, text, from)?;
        let body_start = call.span.end;
        let body_end = body_start + text[body_start..].find(self.close)?;

        Some(Region {
            span: call.span.start..body_end + self.close.len(),
            args: call.args,
            body: &text[body_start..body_end],
        })
    }

    /// Regions according to the policy.
    pub fn find<'a>(&self, text: &'a str) -> Vec<Region<'a>> {
        let mut found = Vec::new();
        let mut pos = 0;
        while let Some(region) = self.next(text, pos) {
            pos = region.span.end;
            found.push(region);
            if self.policy == Policy::First {
                break;
            }
        }
        found
    }
}
