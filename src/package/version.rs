//! Version ordering for release manifests.
//!
//! Versions are compared segment by segment after canonicalization, so
//! `1.10` sorts after `1.9` and `1.0rc1` sorts before `1.0`. Plain string
//! ordering is never used.

use std::cmp::Ordering;
use std::fmt;

/// Pre-release and post-release markers, lowest first.
///
/// A word ranks by the first marker it starts with. `#` stands for a
/// numeric segment. Words matching no marker rank below `dev`.
const SPECIAL_FORMS: &[(&str, i8)] = &[
    ("dev", 0),
    ("alpha", 1),
    ("a", 1),
    ("beta", 2),
    ("b", 2),
    ("RC", 3),
    ("rc", 3),
    ("#", 4),
    ("pl", 5),
    ("p", 5),
];

const UNKNOWN_FORM: i8 = -6;
const NUMBER_FORM: i8 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Number(&'a str),
    Word(&'a str),
}

/// A version string ordered by [`compare_versions`].
///
/// Equality follows the ordering, so `Version::from("1.0") ==
/// Version::from("1-0")`.
#[derive(Debug, Clone)]
pub struct Version(String);

impl Version {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if `self` is strictly newer than `current`.
    pub fn is_newer_than(&self, current: &str) -> bool {
        compare_versions(&self.0, current) == Ordering::Greater
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Version {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_versions(&self.0, &other.0)
    }
}

/// Compare two version strings segment by segment.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left = canonicalize(a);
    let right = canonicalize(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let ordering = compare_segments(l, r);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    // One side ran out: a trailing number extends the version, a trailing
    // word is weighed against a numeric segment.
    match (left.get(right.len()), right.get(left.len())) {
        (Some(Segment::Number(_)), _) => Ordering::Greater,
        (Some(Segment::Word(w)), _) => form_rank(w).cmp(&NUMBER_FORM),
        (None, Some(Segment::Number(_))) => Ordering::Less,
        (None, Some(Segment::Word(w))) => NUMBER_FORM.cmp(&form_rank(w)),
        (None, None) => Ordering::Equal,
    }
}

/// Split a version into numeric and word segments.
///
/// Every non-alphanumeric character separates segments, and a boundary is
/// inserted wherever digits meet letters (`1.0rc1` -> `1`, `0`, `rc`, `1`).
fn canonicalize(version: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut start: Option<(usize, bool)> = None;

    for (idx, ch) in version.char_indices() {
        if !ch.is_ascii_alphanumeric() {
            if let Some((begin, numeric)) = start.take() {
                segments.push(segment(&version[begin..idx], numeric));
            }
            continue;
        }

        let numeric = ch.is_ascii_digit();
        match start {
            Some((begin, was_numeric)) if was_numeric != numeric => {
                segments.push(segment(&version[begin..idx], was_numeric));
                start = Some((idx, numeric));
            }
            Some(_) => {}
            None => start = Some((idx, numeric)),
        }
    }

    if let Some((begin, numeric)) = start {
        segments.push(segment(&version[begin..], numeric));
    }

    segments
}

fn segment(text: &str, numeric: bool) -> Segment<'_> {
    if numeric {
        Segment::Number(text)
    } else {
        Segment::Word(text)
    }
}

fn compare_segments(a: &Segment<'_>, b: &Segment<'_>) -> Ordering {
    match (a, b) {
        (Segment::Number(x), Segment::Number(y)) => compare_numeric(x, y),
        (Segment::Number(_), Segment::Word(w)) => NUMBER_FORM.cmp(&form_rank(w)),
        (Segment::Word(w), Segment::Number(_)) => form_rank(w).cmp(&NUMBER_FORM),
        (Segment::Word(x), Segment::Word(y)) => form_rank(x).cmp(&form_rank(y)),
    }
}

/// Compare digit strings of any length without parsing them.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn form_rank(word: &str) -> i8 {
    SPECIAL_FORMS
        .iter()
        .find(|(form, _)| word.starts_with(form))
        .map(|(_, rank)| *rank)
        .unwrap_or(UNKNOWN_FORM)
}
