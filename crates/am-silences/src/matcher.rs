//! Matcher expression parsing.
//!
//! Each positional argument is one of `label=value`, `label=~regex`, or, for the
//! first argument only, a bare `value` meaning `alertname=value`. Equality values
//! may contain brace alternations (`node={bar,baz}`, `alertname=foo{a,b}`); the
//! resulting matcher groups are the cartesian product of every argument's
//! alternatives.
//!
//! ```rust
//! use am_silences::matcher::parse_matcher_groups;
//!
//! let groups = parse_matcher_groups(&["alertname=foo", "node={bar,baz}"]).unwrap();
//! assert_eq!(groups.len(), 2);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, SilenceError};
use crate::types::{Matcher, MatcherGroup};

/// Label assumed for a bare first argument.
pub const DEFAULT_LABEL: &str = "alertname";

static LABEL_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap_or_else(|_| unreachable!()));

/// Parses matcher expressions into matcher groups.
///
/// An empty argument list yields no groups. Identical groups produced by
/// expansion are returned once, in first-seen order.
///
/// # Errors
///
/// Returns `SilenceError::InvalidMatcher` for malformed expressions, invalid label
/// names, uncompilable regexes, or unbalanced braces.
pub fn parse_matcher_groups<S: AsRef<str>>(args: &[S]) -> Result<Vec<MatcherGroup>> {
    if args.is_empty() {
        return Ok(Vec::new());
    }

    let mut groups = vec![MatcherGroup::new()];
    for (index, arg) in args.iter().enumerate() {
        let alternatives = parse_argument(arg.as_ref(), index == 0)?;

        let mut next = Vec::with_capacity(groups.len() * alternatives.len());
        for group in &groups {
            for matcher in &alternatives {
                let mut expanded = group.clone();
                expanded.insert(matcher.clone());
                if !next.contains(&expanded) {
                    next.push(expanded);
                }
            }
        }
        groups = next;
    }

    Ok(groups)
}

/// Parses one argument into its matcher alternatives.
fn parse_argument(arg: &str, first: bool) -> Result<Vec<Matcher>> {
    let invalid = |reason: &str| SilenceError::InvalidMatcher {
        input: arg.to_string(),
        reason: reason.to_string(),
    };

    let (name, value, is_regex) = match arg.find('=') {
        Some(idx) => {
            let rest = &arg[idx + 1..];
            match rest.strip_prefix('~') {
                Some(pattern) => (&arg[..idx], pattern, true),
                None => (&arg[..idx], rest, false),
            }
        }
        None if first => (DEFAULT_LABEL, arg, false),
        None => return Err(invalid("expected label=value or label=~regex")),
    };

    if !LABEL_NAME_REGEX.is_match(name) {
        return Err(invalid(&format!("invalid label name '{name}'")));
    }

    if is_regex {
        // Braces belong to the regex syntax here, so no alternation expansion.
        Regex::new(&format!("^(?:{value})$"))
            .map_err(|e| invalid(&format!("invalid regex: {e}")))?;
        return Ok(vec![Matcher::regex(name, value)]);
    }

    let values = expand_braces(value).map_err(|reason| invalid(&reason))?;
    Ok(values
        .into_iter()
        .map(|v| Matcher::equal(name, v))
        .collect())
}

/// Expands `{a,b}` alternations, left to right.
fn expand_braces(value: &str) -> std::result::Result<Vec<String>, String> {
    let Some(open) = value.find('{') else {
        if value.contains('}') {
            return Err("unbalanced '}'".to_string());
        }
        return Ok(vec![value.to_string()]);
    };

    let prefix = &value[..open];
    if prefix.contains('}') {
        return Err("unbalanced '}'".to_string());
    }

    let close = value[open..]
        .find('}')
        .map(|i| open + i)
        .ok_or_else(|| "unbalanced '{'".to_string())?;
    let body = &value[open + 1..close];
    if body.contains('{') {
        return Err("nested braces are not supported".to_string());
    }

    let tails = expand_braces(&value[close + 1..])?;
    let mut expanded = Vec::new();
    for alternative in body.split(',') {
        for tail in &tails {
            expanded.push(format!("{prefix}{alternative}{tail}"));
        }
    }
    Ok(expanded)
}
