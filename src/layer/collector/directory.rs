use super::{
    Collector, CollectorConfig, CollectorContext, CollectorError, CollectorResolver, Predicate,
};
use crate::ast::TokenReference;
use regex::Regex;
use std::path::Path;
use std::sync::Arc;

/// Forward-slash form of `path`, relative to `base` when it lies below it.
fn relative_path(path: &Path, base: Option<&Path>) -> String {
    let path = base
        .and_then(|base| path.strip_prefix(base).ok())
        .unwrap_or(path);
    path.to_string_lossy().replace('\\', "/")
}

/// References whose file path matches the `value` regex, case-insensitively.
pub struct DirectoryCollector;

impl Collector for DirectoryCollector {
    fn prepare(
        &self,
        config: &CollectorConfig,
        _resolver: &CollectorResolver,
    ) -> Result<Arc<dyn Predicate>, CollectorError> {
        Ok(Arc::new(PathRegex(config.regex("value", true)?)))
    }
}

struct PathRegex(Regex);

impl Predicate for PathRegex {
    fn satisfy(
        &self,
        reference: &TokenReference<'_>,
        ctx: &CollectorContext<'_>,
    ) -> Result<bool, CollectorError> {
        Ok(reference
            .filepath()
            .is_some_and(|path| self.0.is_match(&relative_path(path, ctx.base_path))))
    }
}

/// References whose file path matches the `value` glob.
pub struct GlobCollector;

impl Collector for GlobCollector {
    fn prepare(
        &self,
        config: &CollectorConfig,
        _resolver: &CollectorResolver,
    ) -> Result<Arc<dyn Predicate>, CollectorError> {
        Ok(Arc::new(PathGlob(config.require_str("value")?.replace('\\', "/"))))
    }
}

struct PathGlob(String);

impl Predicate for PathGlob {
    fn satisfy(
        &self,
        reference: &TokenReference<'_>,
        ctx: &CollectorContext<'_>,
    ) -> Result<bool, CollectorError> {
        Ok(reference
            .filepath()
            .is_some_and(|path| glob_match(&self.0, &relative_path(path, ctx.base_path))))
    }
}

/// Glob matching over `/`-separated segments.
///
/// `**` spans any number of segments (zero included), `*` any run of
/// characters inside one segment, `?` a single character. The whole path
/// must match; empty and `.` segments are ignored on both sides.
pub fn glob_match(pattern: &str, path: &str) -> bool {
    let pattern = pattern.replace('\\', "/");
    let path = path.replace('\\', "/");

    let pattern: Vec<&str> = segments(&pattern).collect();
    let path: Vec<&str> = segments(&path).collect();
    wildcard_match(&pattern, &path, |s| *s == "**", |s, t| match_segment(s, t))
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty() && *s != ".")
}

fn match_segment(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    wildcard_match(&pattern, &text, |c| *c == '*', |c, t| *c == '?' || c == t)
}

/// Matches `text` against `pattern`, where a star element stands for any
/// run of text elements.
///
/// Only the most recent star is retried on a mismatch, which keeps the
/// cost at O(pattern × text) however many stars there are.
fn wildcard_match<P, T>(
    pattern: &[P],
    text: &[T],
    is_star: impl Fn(&P) -> bool,
    matches: impl Fn(&P, &T) -> bool,
) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut retry: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && is_star(&pattern[p]) {
            retry = Some((p, t));
            p += 1;
        } else if p < pattern.len() && matches(&pattern[p], &text[t]) {
            p += 1;
            t += 1;
        } else if let Some((star, start)) = retry {
            p = star + 1;
            t = start + 1;
            retry = Some((star, start + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(is_star)
}
