//! Path patterns and segment matching.
//!
//! A [`Pattern`] is a registered path template, segmented by `/`. Each segment
//! is either a literal (must be byte-equal) or a `:name` wildcard (matches any
//! non-empty segment and captures it). Matching is a pure comparison of two
//! segment lists — no side effects, no allocation unless a match succeeds.
//!
//! Leading and trailing slashes are trimmed before segmenting, so `/stats` and
//! `/stats/` are the same path. Segment count is significant: a pattern only
//! ever matches a path with the same number of segments — there are no
//! variable-length or trailing wildcards.

use std::collections::HashMap;

/// One segment of a registered pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Segment {
    /// Matches a path segment byte-for-byte.
    Literal(String),
    /// `:name` — matches any non-empty path segment and captures it under `name`.
    Param(String),
}

/// A parsed path template, e.g. `mimic/:as/:quote`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

/// Strips leading and trailing `/` so `/stats` and `/stats/` segment identically.
pub(crate) fn trim_slashes(path: &str) -> &str {
    path.trim_start_matches('/').trim_end_matches('/')
}

/// Splits an incoming path into its segments after slash trimming.
///
/// The root path `/` yields a single empty segment, which matches the pattern
/// registered as `/` (whose sole segment is the empty literal).
pub(crate) fn segments(path: &str) -> Vec<&str> {
    trim_slashes(path).split('/').collect()
}

impl Pattern {
    pub(crate) fn parse(path: &str) -> Self {
        let raw = trim_slashes(path).to_owned();
        let segments = raw
            .split('/')
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_owned()),
                None => Segment::Literal(s.to_owned()),
            })
            .collect();
        Self { raw, segments }
    }

    /// The trimmed textual form. Two registrations share a route slot exactly
    /// when their `raw` forms are equal.
    pub(crate) fn raw(&self) -> &str {
        &self.raw
    }

    pub(crate) fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Matches `incoming` against this pattern.
    ///
    /// Returns the wildcard-name → captured-value mapping on a structural
    /// match, or `None`. Segment-count mismatch fails immediately; literal
    /// segments must be byte-equal; wildcards capture any non-empty segment.
    pub(crate) fn matches(&self, incoming: &[&str]) -> Option<HashMap<String, String>> {
        if incoming.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (want, &got) in self.segments.iter().zip(incoming) {
            match want {
                Segment::Literal(lit) => {
                    if lit != got {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if got.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), got.to_owned());
                }
            }
        }
        Some(params)
    }

    /// Returns this pattern re-rooted under `prefix`, for router mounting.
    ///
    /// Empty segments of the child are dropped first, so a child registered at
    /// `/` mounted under `/api` lands at exactly `api`, not `api/`.
    pub(crate) fn prefixed(&self, prefix: &Pattern) -> Pattern {
        let mut segments: Vec<Segment> = if prefix.raw.is_empty() {
            Vec::new()
        } else {
            prefix.segments.clone()
        };
        segments.extend(
            self.segments
                .iter()
                .filter(|s| !matches!(s, Segment::Literal(l) if l.is_empty()))
                .cloned(),
        );
        if segments.is_empty() {
            segments.push(Segment::Literal(String::new()));
        }

        let raw = segments
            .iter()
            .map(|s| match s {
                Segment::Literal(l) => l.clone(),
                Segment::Param(name) => format!(":{name}"),
            })
            .collect::<Vec<_>>()
            .join("/");
        Pattern { raw, segments }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
        Pattern::parse(pattern).matches(&segments(path))
    }

    #[test]
    fn literal_segments_must_be_equal() {
        assert!(capture("/stats", "/stats").is_some());
        assert!(capture("/stats", "/status").is_none());
        assert!(capture("/a/b", "/a/c").is_none());
    }

    #[test]
    fn segment_count_mismatch_never_matches() {
        assert!(capture("/a/b", "/a").is_none());
        assert!(capture("/a", "/a/b").is_none());
        assert!(capture("/mimic/:as", "/mimic/cat/meow").is_none());
    }

    #[test]
    fn wildcards_capture_values() {
        let params = capture("/mimic/:as/:quote", "/mimic/cat/meow").unwrap();
        assert_eq!(params.get("as").map(String::as_str), Some("cat"));
        assert_eq!(params.get("quote").map(String::as_str), Some("meow"));
    }

    #[test]
    fn wildcards_require_a_non_empty_segment() {
        assert!(capture("/:id", "/").is_none());
    }

    #[test]
    fn trailing_slashes_are_equivalent() {
        assert!(capture("/stats/", "/stats").is_some());
        assert!(capture("/stats", "/stats/").is_some());
        assert_eq!(Pattern::parse("/stats/").raw(), Pattern::parse("stats").raw());
    }

    #[test]
    fn root_matches_root() {
        assert!(capture("/", "/").is_some());
        assert!(capture("/", "/a").is_none());
    }

    #[test]
    fn prefixing_prepends_and_drops_empty_child_segments() {
        let prefix = Pattern::parse("/router/another");
        let child = Pattern::parse("/");
        assert_eq!(child.prefixed(&prefix).raw(), "router/another");

        let child = Pattern::parse("/users/:id");
        assert_eq!(child.prefixed(&prefix).raw(), "router/another/users/:id");
    }

    #[test]
    fn prefixing_under_root_keeps_the_child() {
        let root = Pattern::parse("/");
        let child = Pattern::parse("/users");
        assert_eq!(child.prefixed(&root).raw(), "users");
    }
}
