//! Per-round feature selection. Every random decision of the engine is made
//! here, from a caller-supplied generator.
//!
//! Draw order for one term is fixed: first the seven inclusion Bernoullis
//! (synonym, definition, GO-ID, then the four relationship features), then the
//! data-dependent picks (synonym index, example shuffles, template indices).
//! Inclusion draws never depend on how much data a term has.

use gograph_ontology::{Direction, RelationKind, Term, TermSummary};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::options::ResolvedOptions;
use crate::render::templates;

/// Maximum parent examples per segment.
pub const PARENT_EXAMPLE_CAP: usize = 2;
/// Maximum child examples per segment.
pub const CHILD_EXAMPLE_CAP: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationFeature {
    IsAParents,
    PartOfParents,
    IsAChildren,
    PartOfChildren,
}

impl RelationFeature {
    /// Rendering order.
    pub const ALL: [RelationFeature; 4] = [
        RelationFeature::IsAParents,
        RelationFeature::PartOfParents,
        RelationFeature::IsAChildren,
        RelationFeature::PartOfChildren,
    ];

    pub fn index(self) -> usize {
        match self {
            RelationFeature::IsAParents => 0,
            RelationFeature::PartOfParents => 1,
            RelationFeature::IsAChildren => 2,
            RelationFeature::PartOfChildren => 3,
        }
    }

    pub fn kind(self) -> RelationKind {
        match self {
            RelationFeature::IsAParents | RelationFeature::IsAChildren => RelationKind::IsA,
            RelationFeature::PartOfParents | RelationFeature::PartOfChildren => {
                RelationKind::PartOf
            }
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            RelationFeature::IsAParents | RelationFeature::PartOfParents => Direction::Parent,
            RelationFeature::IsAChildren | RelationFeature::PartOfChildren => Direction::Child,
        }
    }

    pub fn cap(self) -> usize {
        match self.direction() {
            Direction::Parent => PARENT_EXAMPLE_CAP,
            Direction::Child => CHILD_EXAMPLE_CAP,
        }
    }
}

/// Everything the selector may draw from for one term, fetched up front.
#[derive(Debug, Clone, PartialEq)]
pub struct TermDetail {
    pub term: Term,
    /// Relationship pools, indexed by [`RelationFeature::index`].
    pub relations: [Vec<TermSummary>; 4],
}

impl TermDetail {
    pub fn new(term: Term) -> Self {
        Self {
            term,
            relations: Default::default(),
        }
    }

    pub fn with_relation(mut self, feature: RelationFeature, related: Vec<TermSummary>) -> Self {
        self.relations[feature.index()] = related;
        self
    }

    pub fn relation(&self, feature: RelationFeature) -> &[TermSummary] {
        &self.relations[feature.index()]
    }
}

/// Raw inclusion decisions for one term in one round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureDraws {
    pub use_synonym: bool,
    pub include_definition: bool,
    pub include_go_id: bool,
    pub relations: [bool; 4],
}

impl FeatureDraws {
    pub fn relation(&self, feature: RelationFeature) -> bool {
        self.relations[feature.index()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationChoice {
    pub feature: RelationFeature,
    /// Example names, already sampled and ordered.
    pub examples: Vec<String>,
    /// Index into the feature's phrasing bank.
    pub template: usize,
}

/// What one mention becomes in one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureChoice {
    /// Chosen synonym, or the canonical name.
    pub surface: String,
    pub go_id: Option<String>,
    /// Possibly truncated.
    pub definition: Option<String>,
    /// Only features that were drawn and had examples, in rendering order.
    pub relations: Vec<RelationChoice>,
    pub draws: FeatureDraws,
}

fn bernoulli<G: Rng + ?Sized>(rng: &mut G, p: f64) -> bool {
    rng.gen::<f64>() < p
}

pub fn draw<G: Rng + ?Sized>(options: &ResolvedOptions, rng: &mut G) -> FeatureDraws {
    let use_synonym = bernoulli(rng, options.synonym);
    let include_definition = bernoulli(rng, options.definition);
    let include_go_id = bernoulli(rng, options.go_id);
    let mut relations = [false; 4];
    for feature in RelationFeature::ALL {
        relations[feature.index()] = bernoulli(rng, options.relation(feature));
    }
    FeatureDraws {
        use_synonym,
        include_definition,
        include_go_id,
        relations,
    }
}

pub fn select<G: Rng + ?Sized>(
    detail: &TermDetail,
    options: &ResolvedOptions,
    rng: &mut G,
) -> FeatureChoice {
    let draws = draw(options, rng);
    let term = &detail.term;

    let synonym = if draws.use_synonym {
        term.synonyms.choose(rng)
    } else {
        None
    };
    let surface = synonym.unwrap_or(&term.name).clone();

    let go_id = draws.include_go_id.then(|| term.accession.clone());

    let definition = (draws.include_definition && !term.definition.trim().is_empty())
        .then(|| truncate_definition(&term.definition, options.definition_max_length));

    let mut relations = Vec::new();
    for feature in RelationFeature::ALL {
        let pool = detail.relation(feature);
        if !draws.relation(feature) || pool.is_empty() {
            continue;
        }
        let mut names: Vec<&str> = pool.iter().map(|t| t.name.as_str()).collect();
        let (picked, _) = names.partial_shuffle(rng, feature.cap());
        let examples = picked.iter().map(|s| s.to_string()).collect();
        let template = rng.gen_range(0..templates(feature).len());
        relations.push(RelationChoice {
            feature,
            examples,
            template,
        });
    }

    FeatureChoice {
        surface,
        go_id,
        definition,
        relations,
        draws,
    }
}

/// Cut `definition` to at most `max_len` characters, marking the cut with
/// `...` when there is room for it.
pub fn truncate_definition(definition: &str, max_len: Option<usize>) -> String {
    let Some(max_len) = max_len else {
        return definition.to_string();
    };
    if definition.chars().count() <= max_len {
        return definition.to_string();
    }
    if max_len > 3 {
        let mut cut: String = definition.chars().take(max_len - 3).collect();
        cut.push_str("...");
        cut
    } else {
        definition.chars().take(max_len).collect()
    }
}
