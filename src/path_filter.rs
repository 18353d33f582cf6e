//! Path Filter
//!
//! Include/exclude globs are compiled to anchored regexes once, when the
//! configuration is resolved, and reused for every file of the run.

use log::warn;
use regex::{Regex, RegexBuilder};

use crate::error::TaggerError;

pub const MAX_PATTERN_LENGTH: usize = 200;
pub const MAX_PATTERN_WILDCARDS: usize = 10;
const MAX_COMPILED_SIZE: usize = 1 << 20;

#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub pattern: String,
    /// `None` when the pattern was rejected; it then never matches.
    pub matcher: Option<Regex>,
}

impl CompiledPattern {
    pub fn is_match(&self, path: &str) -> bool {
        self.matcher.as_ref().is_some_and(|re| re.is_match(path))
    }
}

pub fn compile(patterns: &[String]) -> Vec<CompiledPattern> {
    patterns
        .iter()
        .map(|pattern| {
            let matcher = match compile_pattern(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(pattern = pattern.as_str(); "Ignoring path pattern: {}", e);
                    None
                }
            };
            CompiledPattern {
                pattern: pattern.clone(),
                matcher,
            }
        })
        .collect()
}

pub fn matches(path: &str, compiled: &[CompiledPattern]) -> bool {
    compiled.iter().any(|p| p.is_match(path))
}

/// Include gate first (empty = everything), then the exclude gate.
/// `candidates` are alternative spellings of the same file; any hit counts.
pub fn should_process(
    candidates: &[&str],
    includes: &[CompiledPattern],
    excludes: &[CompiledPattern],
) -> bool {
    let included =
        includes.is_empty() || candidates.iter().any(|path| matches(path, includes));
    if !included {
        return false;
    }
    excludes.is_empty() || !candidates.iter().any(|path| matches(path, excludes))
}

fn compile_pattern(pattern: &str) -> Result<Regex, TaggerError> {
    if pattern.len() > MAX_PATTERN_LENGTH {
        return Err(invalid(
            pattern,
            format!("longer than {} characters", MAX_PATTERN_LENGTH),
        ));
    }
    let wildcards = count_wildcards(pattern);
    if wildcards > MAX_PATTERN_WILDCARDS {
        return Err(invalid(
            pattern,
            format!(
                "{} wildcards, at most {} allowed",
                wildcards, MAX_PATTERN_WILDCARDS
            ),
        ));
    }

    let source = glob_to_regex(pattern)?;
    RegexBuilder::new(&source)
        .size_limit(MAX_COMPILED_SIZE)
        .build()
        .map_err(|e| invalid(pattern, e.to_string()))
}

/// A run of `*` counts once, every `?` counts once.
fn count_wildcards(pattern: &str) -> usize {
    let mut count = 0;
    let mut prev_star = false;
    for c in pattern.chars() {
        match c {
            '*' if !prev_star => {
                count += 1;
                prev_star = true;
            }
            '*' => {}
            '?' => {
                count += 1;
                prev_star = false;
            }
            _ => prev_star = false,
        }
    }
    count
}

/// `**/` spans directories (including none), `**` anything, `*` and `?` stay
/// within a segment, `{a,b}` alternates.
pub fn glob_to_regex(pattern: &str) -> Result<String, TaggerError> {
    let glob = pattern.strip_prefix("./").unwrap_or(pattern);
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::from("^");
    let mut group_depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    while chars.get(i + 1) == Some(&'*') {
                        i += 1;
                    }
                    if chars.get(i + 1) == Some(&'/') {
                        i += 1;
                        out.push_str("(?:.*/)?");
                    } else {
                        out.push_str(".*");
                    }
                } else {
                    out.push_str("[^/]*");
                }
            }
            '?' => out.push_str("[^/]"),
            '{' => {
                group_depth += 1;
                out.push_str("(?:");
            }
            '}' if group_depth > 0 => {
                group_depth -= 1;
                out.push(')');
            }
            ',' if group_depth > 0 => out.push('|'),
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    if group_depth > 0 {
        return Err(invalid(pattern, "unbalanced `{`".to_string()));
    }

    out.push('$');
    Ok(out)
}

fn invalid(pattern: &str, reason: String) -> TaggerError {
    TaggerError::InvalidPattern {
        pattern: pattern.to_string(),
        reason,
    }
}
