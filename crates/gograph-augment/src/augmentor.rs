//! Orchestration: scan once, fetch once, then generate independent rounds.

use std::collections::HashMap;

use gograph_ontology::{Term, TermRepository, TermSummary};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::AugmentError;
use crate::options::{AugmentationOptions, ResolvedOptions};
use crate::render::render;
use crate::scanner::{HashtagScanner, Mention};
use crate::selector::{select, FeatureChoice, RelationFeature, TermDetail};

/// Round counts at or above this are generated on the rayon pool.
pub const PARALLEL_ROUND_THRESHOLD: usize = 64;

/// Diagnostic view of one hashtag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashtagAnalysis {
    /// `#token` as written.
    pub surface: String,
    pub lookup_key: String,
    pub term: Option<Term>,
}

/// Everything a round needs, gathered before any randomness is used.
struct Prepared<'t> {
    text: &'t str,
    mentions: Vec<Mention>,
    /// Accession -> term detail, for mentions that resolved to a known term.
    details: HashMap<String, TermDetail>,
    /// Distinct resolved accessions in order of first appearance.
    accession_order: Vec<String>,
}

pub struct TextAugmentor<R> {
    repository: R,
    scanner: HashtagScanner,
}

impl<R: TermRepository> TextAugmentor<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            scanner: HashtagScanner::new(),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Produce exactly `options.num_variations` rewrites of `text`.
    ///
    /// Options are validated before the repository is touched. Any repository
    /// failure aborts the call; no partial list is returned.
    pub fn augment_text(
        &self,
        text: &str,
        options: &AugmentationOptions,
    ) -> Result<Vec<String>, AugmentError> {
        let resolved = options.resolve()?;
        let prepared = self.prepare(text, &resolved)?;

        tracing::debug!(
            seed = resolved.seed,
            rounds = resolved.num_variations,
            mentions = prepared.mentions.len(),
            terms = prepared.details.len(),
            relationship_override = resolved.relationship_override,
            "augmenting text"
        );

        let rounds = resolved.num_variations;
        let variations: Vec<String> = if rounds >= PARALLEL_ROUND_THRESHOLD {
            (0..rounds)
                .into_par_iter()
                .map(|round| prepared.round(&resolved, round))
                .collect()
        } else {
            (0..rounds)
                .map(|round| prepared.round(&resolved, round))
                .collect()
        };
        Ok(variations)
    }

    /// Resolution outcome for every hashtag in `text`, in order.
    pub fn analyze(&self, text: &str) -> Result<Vec<HashtagAnalysis>, AugmentError> {
        let mentions = self.scanner.scan(text, &self.repository)?;
        let mut terms: HashMap<String, Option<Term>> = HashMap::new();
        let mut out = Vec::with_capacity(mentions.len());

        for mention in mentions {
            let term = match &mention.accession {
                None => None,
                Some(accession) => match terms.get(accession) {
                    Some(term) => term.clone(),
                    None => {
                        let term = self.repository.get_term(accession)?;
                        terms.insert(accession.clone(), term.clone());
                        term
                    }
                },
            };
            out.push(HashtagAnalysis {
                surface: mention.token.surface(),
                lookup_key: mention.token.lookup_key,
                term,
            });
        }
        Ok(out)
    }

    fn prepare<'t>(
        &self,
        text: &'t str,
        options: &ResolvedOptions,
    ) -> Result<Prepared<'t>, AugmentError> {
        let mentions = self.scanner.scan(text, &self.repository)?;

        let mut fetched: HashMap<String, Option<TermDetail>> = HashMap::new();
        let mut accession_order = Vec::new();

        for mention in &mentions {
            let Some(accession) = &mention.accession else {
                continue;
            };
            if fetched.contains_key(accession) {
                continue;
            }
            let detail = self.fetch_detail(accession, options)?;
            if detail.is_some() {
                accession_order.push(accession.clone());
            }
            fetched.insert(accession.clone(), detail);
        }

        tracing::debug!(cached_terms = fetched.len(), "term details fetched");

        let details = fetched
            .into_iter()
            .filter_map(|(accession, detail)| Some((accession, detail?)))
            .collect();

        Ok(Prepared {
            text,
            mentions,
            details,
            accession_order,
        })
    }

    fn fetch_detail(
        &self,
        accession: &str,
        options: &ResolvedOptions,
    ) -> Result<Option<TermDetail>, AugmentError> {
        let Some(term) = self.repository.get_term(accession)? else {
            tracing::debug!(accession, "resolved accession has no term record");
            return Ok(None);
        };

        let mut detail = TermDetail::new(term);
        for feature in RelationFeature::ALL {
            if options.relation(feature) <= 0.0 {
                continue;
            }
            let related: Vec<TermSummary> = self
                .repository
                .get_related_within(
                    accession,
                    feature.kind(),
                    feature.direction(),
                    options.max_relationship_distance,
                )?
                .into_iter()
                .map(|r| r.term)
                .collect();
            detail = detail.with_relation(feature, related);
        }
        Ok(Some(detail))
    }
}

impl Prepared<'_> {
    fn round(&self, options: &ResolvedOptions, round: usize) -> String {
        let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
        rng.set_stream(round as u64);

        // mentions of the same term share one choice, whatever token named it
        let choices: HashMap<&str, FeatureChoice> = self
            .accession_order
            .iter()
            .filter_map(|accession| {
                let detail = self.details.get(accession)?;
                Some((accession.as_str(), select(detail, options, &mut rng)))
            })
            .collect();

        let mut out = String::with_capacity(self.text.len() * 2);
        let mut cursor = 0;
        for mention in &self.mentions {
            out.push_str(&self.text[cursor..mention.token.span.start]);
            let choice = mention
                .accession
                .as_deref()
                .and_then(|accession| choices.get(accession));
            match choice {
                Some(choice) => out.push_str(&render(choice)),
                None => out.push_str(&mention.token.token),
            }
            cursor = mention.token.span.end;
        }
        out.push_str(&self.text[cursor..]);
        out
    }
}
