//! Range expansion.
//!
//! Turns a `(begin, end)` pair of decimal strings into the ascending, inclusive
//! sequence of codes between them. Bounds that do not parse yield an empty
//! sequence rather than an error.

use std::ops::RangeInclusive;

use serde::Deserialize;

/// An inclusive interval of codes, with bounds as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RangeDescriptor {
    /// First code, as decimal text
    #[serde(deserialize_with = "crate::request::scalar_string")]
    pub begin: String,
    /// Last code (inclusive), as decimal text
    #[serde(deserialize_with = "crate::request::scalar_string")]
    pub end: String,
}

impl RangeDescriptor {
    /// Creates a descriptor from any pair of string-like bounds.
    pub fn new(begin: impl Into<String>, end: impl Into<String>) -> Self {
        Self { begin: begin.into(), end: end.into() }
    }

    /// Expands this descriptor. See [`expand_range`].
    pub fn codes(&self) -> CodeRange {
        expand_range(&self.begin, &self.end)
    }
}

/// Lazily yields the decimal codes of one range, ascending with step 1.
#[derive(Debug, Clone)]
pub struct CodeRange {
    inner: Option<RangeInclusive<i64>>,
}

impl CodeRange {
    /// A range that yields nothing.
    pub fn empty() -> Self {
        Self { inner: None }
    }

    /// Number of codes still to be yielded, saturating at `u64::MAX`.
    pub fn len(&self) -> u64 {
        match &self.inner {
            Some(r) if !r.is_empty() => {
                let span = i128::from(*r.end()) - i128::from(*r.start()) + 1;
                u64::try_from(span).unwrap_or(u64::MAX)
            }
            _ => 0,
        }
    }

    /// Returns `true` when no codes remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Iterator for CodeRange {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.inner.as_mut()?.next().map(|n| n.to_string())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.len()) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

/// Expands `begin..=end` into decimal codes.
///
/// # Arguments
///
/// * `begin` - First code, parsed with [`parse_bound`].
/// * `end` - Last code (inclusive), parsed with [`parse_bound`].
///
/// # Returns
///
/// An empty range if either bound fails to parse or `begin > end`. Malformed
/// bounds are not an error: callers must read an empty [`CodeRange`] as
/// "nothing to do", never as a failure of the request.
///
/// # Example
///
/// ```
/// use qrbatch::range::expand_range;
///
/// let codes: Vec<String> = expand_range("8", "11").collect();
/// assert_eq!(codes, ["8", "9", "10", "11"]);
/// assert_eq!(expand_range("x", "3").count(), 0);
/// ```
pub fn expand_range(begin: &str, end: &str) -> CodeRange {
    match (parse_bound(begin), parse_bound(end)) {
        (Some(start), Some(finish)) => CodeRange { inner: Some(start..=finish) },
        _ => CodeRange::empty(),
    }
}

/// Parses the leading base-10 integer of `text`.
///
/// Leading whitespace and one sign are accepted; parsing stops at the first
/// non-digit, so `"12abc"` gives `12` and `"1.5"` gives `1`. Returns `None`
/// when no digit is found or the value does not fit in an `i64`.
pub fn parse_bound(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let magnitude = &rest[..digits];
    if negative {
        format!("-{magnitude}").parse().ok()
    } else {
        magnitude.parse().ok()
    }
}
