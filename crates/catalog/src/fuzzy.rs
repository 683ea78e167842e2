//! Approximate title matching.
//!
//! Search narrows an already fetched page: items whose key text approximately
//! contains the search term survive, in their original order.

/// Float slack for threshold comparisons (`0.25 + 0.05` must still pass `0.3`).
const SCORE_EPSILON: f64 = 1e-9;

/// Approximate string comparison under a fixed similarity threshold.
pub trait FuzzyMatcher: Send + Sync {
    /// Best match score of `pattern` within `text` (0.0 is a perfect match),
    /// or `None` when no alignment is within the matcher's threshold.
    fn score(&self, pattern: &str, text: &str) -> Option<f64>;

    fn is_match(&self, pattern: &str, text: &str) -> bool {
        self.score(pattern, text).is_some()
    }
}

/// Keep the items whose key approximately matches `term`.
///
/// Returns a subsequence of `items`: relative order is preserved, nothing is
/// re-ranked. Items without a key never match.
pub fn retain_matches<T, M, F>(matcher: &M, items: Vec<T>, term: &str, key: F) -> Vec<T>
where
    M: FuzzyMatcher + ?Sized,
    F: Fn(&T) -> Option<&str>,
{
    items
        .into_iter()
        .filter(|item| key(item).is_some_and(|text| matcher.is_match(term, text)))
        .collect()
}

/// Case-insensitive approximate substring matcher.
///
/// For each start offset in the text, the pattern is aligned against the
/// closest prefix of the remaining text (Levenshtein distance). An alignment
/// scores `errors / pattern_len + |start - location| / distance`, so a match
/// costs more the more edits it needs and the further it sits from the
/// expected location. The best alignment must score at most `threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproximateMatcher {
    threshold: f64,
    location: usize,
    distance: usize,
}

impl Default for ApproximateMatcher {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            location: 0,
            distance: 100,
        }
    }
}

impl ApproximateMatcher {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// Expected character offset of a match.
    pub fn with_location(mut self, location: usize) -> Self {
        self.location = location;
        self
    }

    /// How far (in characters) from `location` a match may drift before its
    /// proximity penalty alone reaches 1.0. Zero demands an exact location.
    pub fn with_distance(mut self, distance: usize) -> Self {
        self.distance = distance;
        self
    }

    fn proximity(&self, start: usize) -> f64 {
        let drift = start.abs_diff(self.location);
        if self.distance == 0 {
            if drift == 0 { 0.0 } else { 1.0 }
        } else {
            drift as f64 / self.distance as f64
        }
    }
}

impl FuzzyMatcher for ApproximateMatcher {
    fn score(&self, pattern: &str, text: &str) -> Option<f64> {
        let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
        if pattern.is_empty() {
            return Some(0.0);
        }
        let text: Vec<char> = text.to_lowercase().chars().collect();
        let len = pattern.len() as f64;
        let limit = self.threshold + SCORE_EPSILON;

        let mut best: Option<f64> = None;
        for start in 0..text.len().max(1) {
            let proximity = self.proximity(start);
            if proximity > limit {
                if start > self.location {
                    break;
                }
                continue;
            }

            let window = &text[start.min(text.len())..text.len().min(start + 2 * pattern.len())];
            let score = prefix_distance(&pattern, window) as f64 / len + proximity;
            if score <= limit && best.is_none_or(|b| score < b) {
                best = Some(score);
                if score == 0.0 {
                    break;
                }
            }
        }
        best
    }
}

/// Minimum edit distance between `pattern` and any prefix of `text`.
fn prefix_distance(pattern: &[char], text: &[char]) -> usize {
    // prev[j] = distance(pattern[..i], text[..j])
    let mut prev: Vec<usize> = (0..=text.len()).collect();
    let mut cur = vec![0; text.len() + 1];

    for (i, &p) in pattern.iter().enumerate() {
        cur[0] = i + 1;
        for (j, &t) in text.iter().enumerate() {
            let substitution = prev[j] + usize::from(p != t);
            cur[j + 1] = substitution.min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    prev.into_iter().min().unwrap_or(pattern.len())
}
