//! Fuzzy term search over names and synonyms.
//!
//! Scoring is in `[0, 100]`:
//! - an exact (case-insensitive) name or synonym match scores 100 and is
//!   always ranked ahead of fuzzy hits;
//! - otherwise the score is a *partial ratio*: the shorter string is aligned
//!   against its best-matching substring of the longer one, and the edit
//!   distance of that alignment is turned into a percentage of the shorter
//!   length.
//!
//! Hashtag resolution uses [`anchored_ratio`] instead: the token is the only
//! side ever aligned, so a long token cannot match a short synonym it
//! happens to contain.
//!
//! Fuzzy scoring is embarrassingly parallel over terms and uses rayon.

use gograph_ontology::Term;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::TermStore;

/// Minimum fuzzy score for a hashtag token to resolve to a term.
pub const HASHTAG_MIN_SCORE: f64 = 70.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    pub limit: usize,
    pub min_score: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            min_score: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Name,
    Synonym,
}

impl MatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Name => "name",
            MatchType::Synonym => "synonym",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub term: Term,
    pub score: f64,
    pub match_type: MatchType,
    /// The name or synonym that produced the score.
    pub matched_text: String,
}

impl TermStore {
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchHit> {
        let query = query.trim().to_lowercase();
        if query.is_empty() || options.limit == 0 {
            return Vec::new();
        }

        let scored: Vec<SearchHit> = self
            .terms()
            .par_iter()
            .filter_map(|term| score_term(term, &query, options.min_score))
            .collect();

        let (mut exact, mut fuzzy): (Vec<SearchHit>, Vec<SearchHit>) = scored
            .into_iter()
            .partition(|hit| hit.match_type == MatchType::Exact);

        fuzzy.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.term.accession.cmp(&b.term.accession))
        });

        exact.extend(fuzzy);
        exact.truncate(options.limit);
        exact
    }

    /// Best fuzzy match for a hashtag token, scored with [`anchored_ratio`]
    /// against every name and synonym. Ties go to the lower accession.
    pub fn best_token_match(&self, token: &str, min_score: f64) -> Option<&Term> {
        let query = token.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        self.terms()
            .par_iter()
            .filter_map(|term| {
                let score = std::iter::once(&term.name)
                    .chain(term.synonyms.iter())
                    .map(|text| anchored_ratio(&query, &text.to_lowercase()))
                    .fold(0.0, f64::max);
                (score >= min_score).then_some((score, term))
            })
            .max_by(|(sa, ta), (sb, tb)| {
                sa.total_cmp(sb)
                    .then_with(|| tb.accession.cmp(&ta.accession))
            })
            .map(|(_, term)| term)
    }
}

fn score_term(term: &Term, query: &str, min_score: f64) -> Option<SearchHit> {
    if term.name.to_lowercase() == query {
        return Some(SearchHit {
            term: term.clone(),
            score: 100.0,
            match_type: MatchType::Exact,
            matched_text: term.name.clone(),
        });
    }
    if let Some(synonym) = term.synonyms.iter().find(|s| s.to_lowercase() == query) {
        return Some(SearchHit {
            term: term.clone(),
            score: 100.0,
            match_type: MatchType::Exact,
            matched_text: synonym.clone(),
        });
    }

    let mut best: Option<(f64, MatchType, &str)> = None;
    let candidates = std::iter::once((MatchType::Name, term.name.as_str())).chain(
        term.synonyms
            .iter()
            .map(|s| (MatchType::Synonym, s.as_str())),
    );
    for (match_type, text) in candidates {
        let score = partial_ratio(query, &text.to_lowercase());
        if score >= min_score && best.map_or(true, |(b, _, _)| score > b) {
            best = Some((score, match_type, text));
        }
    }

    best.map(|(score, match_type, text)| SearchHit {
        term: term.clone(),
        score,
        match_type,
        matched_text: text.to_string(),
    })
}

/// Similarity in `[0, 100]` of the shorter string to its best-matching
/// substring of the longer one.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    // Equal lengths are ordered lexicographically so the score is symmetric.
    let (short, long) = if (a.len(), &a) <= (b.len(), &b) {
        (a, b)
    } else {
        (b, a)
    };
    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }
    let distance = aligned_distance(&short, &long);
    100.0 * (1.0 - distance as f64 / short.len() as f64)
}

/// Similarity in `[0, 100]` of `query` to `candidate`, where only the query
/// is ever aligned inside the other string.
///
/// A candidate at least as long as the query scores like [`partial_ratio`].
/// A shorter candidate is compared whole, by edit distance over the query
/// length, so a short synonym buried in a long token does not match it.
pub fn anchored_ratio(query: &str, candidate: &str) -> f64 {
    let query: Vec<char> = query.chars().collect();
    let candidate: Vec<char> = candidate.chars().collect();
    if query.is_empty() {
        return if candidate.is_empty() { 100.0 } else { 0.0 };
    }

    let distance = if candidate.len() >= query.len() {
        aligned_distance(&query, &candidate)
    } else {
        levenshtein(&query, &candidate)
    };
    let distance = distance.min(query.len()) as f64;
    100.0 * (1.0 - distance / query.len() as f64)
}

/// Semi-global edit distance: `short` must be consumed entirely, but the
/// alignment may start and end anywhere in `long`, so row 0 of every column
/// is free.
fn aligned_distance(short: &[char], long: &[char]) -> usize {
    let n = short.len();
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr: Vec<usize> = vec![0; n + 1];
    let mut best = prev[n];

    for &c in long {
        curr[0] = 0;
        for j in 1..=n {
            let cost = usize::from(c != short[j - 1]);
            let deletion = prev[j] + 1;
            let insertion = curr[j - 1] + 1;
            let substitution = prev[j - 1] + cost;
            curr[j] = deletion.min(insertion).min(substitution);
        }
        best = best.min(curr[n]);
        std::mem::swap(&mut prev, &mut curr);
    }

    best.min(n)
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr: Vec<usize> = vec![0; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_ratio_scores() {
        assert_eq!(partial_ratio("cytoplasm", "cytoplasm"), 100.0);
        assert_eq!(partial_ratio("membrane", "plasma membrane"), 100.0);
        assert_eq!(partial_ratio("plasma membrane", "membrane"), 100.0);
        assert_eq!(partial_ratio("abc", "xyz"), 0.0);
        assert_eq!(partial_ratio("", ""), 100.0);
        assert_eq!(partial_ratio("", "x"), 0.0);

        let typo = partial_ratio("mitochondrin", "mitochondrion");
        assert!(typo > 90.0 && typo < 100.0, "typo score {typo}");
    }

    #[test]
    fn anchored_ratio_only_aligns_the_query() {
        // a short candidate inside a long query is compared whole
        assert_eq!(partial_ratio("nonexistentterm123", "er"), 100.0);
        assert!(anchored_ratio("nonexistentterm123", "er") < 20.0);
        assert!(anchored_ratio("water", "er") < 70.0);

        // a query inside a longer candidate still scores like partial_ratio
        assert_eq!(anchored_ratio("membrane", "plasma membrane"), 100.0);
        let typo = anchored_ratio("mitochondrin", "mitochondrion");
        assert!(typo > 90.0 && typo < 100.0, "typo score {typo}");

        assert_eq!(anchored_ratio("cytosol", "cytosol"), 100.0);
        assert_eq!(anchored_ratio("", "er"), 0.0);
    }

    #[test]
    fn levenshtein_distances() {
        let chars = |s: &str| s.chars().collect::<Vec<_>>();
        assert_eq!(levenshtein(&chars("kitten"), &chars("sitting")), 3);
        assert_eq!(levenshtein(&chars(""), &chars("er")), 2);
        assert_eq!(levenshtein(&chars("er"), &chars("er")), 0);
    }
}
