//! Augmentation options and their per-call resolution.
//!
//! [`AugmentationOptions`] is the flat, serializable record callers fill in
//! (CLI flags, JSON options files). [`ResolvedOptions`] is computed once per
//! call: it validates every knob and applies the legacy `relationship_prob`
//! override, so the selector reads exactly one probability per feature.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::selector::RelationFeature;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentationOptions {
    pub num_variations: usize,
    pub synonym_probability: f64,
    pub definition_probability: f64,
    pub go_id_probability: f64,
    pub is_a_parent_probability: f64,
    pub is_a_children_probability: f64,
    pub part_of_parent_probability: f64,
    pub part_of_children_probability: f64,
    /// Truncate included definitions to this many characters.
    pub definition_max_length: Option<usize>,
    /// Legacy knob: when set, replaces all four relationship probabilities.
    #[serde(alias = "relationship_probability")]
    pub relationship_prob: Option<f64>,
    /// Relationship examples are drawn from relatives up to this many hops away.
    pub max_relationship_distance: usize,
    /// `None` draws a fresh seed per call.
    pub seed: Option<u64>,
}

impl Default for AugmentationOptions {
    fn default() -> Self {
        Self {
            num_variations: 5,
            synonym_probability: 0.5,
            definition_probability: 0.3,
            go_id_probability: 0.2,
            is_a_parent_probability: 0.3,
            is_a_children_probability: 0.3,
            part_of_parent_probability: 0.3,
            part_of_children_probability: 0.3,
            definition_max_length: None,
            relationship_prob: None,
            max_relationship_distance: 1,
            seed: None,
        }
    }
}

impl AugmentationOptions {
    pub fn builder() -> AugmentationOptionsBuilder {
        AugmentationOptionsBuilder::default()
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.resolve_with_seed(0).map(|_| ())
    }

    /// Validate and apply the legacy override. `None` seeds are drawn here.
    pub fn resolve(&self) -> Result<ResolvedOptions, ConfigurationError> {
        let seed = self.seed.unwrap_or_else(rand::random);
        self.resolve_with_seed(seed)
    }

    fn resolve_with_seed(&self, seed: u64) -> Result<ResolvedOptions, ConfigurationError> {
        if self.num_variations == 0 {
            return Err(ConfigurationError::NoVariations);
        }
        if self.definition_max_length == Some(0) {
            return Err(ConfigurationError::ZeroDefinitionLength);
        }
        if self.max_relationship_distance == 0 {
            return Err(ConfigurationError::ZeroRelationshipDistance);
        }

        let synonym = probability("synonym_probability", self.synonym_probability)?;
        let definition = probability("definition_probability", self.definition_probability)?;
        let go_id = probability("go_id_probability", self.go_id_probability)?;

        let mut relations = [
            probability("is_a_parent_probability", self.is_a_parent_probability)?,
            probability("part_of_parent_probability", self.part_of_parent_probability)?,
            probability("is_a_children_probability", self.is_a_children_probability)?,
            probability("part_of_children_probability", self.part_of_children_probability)?,
        ];
        let relationship_override = match self.relationship_prob {
            Some(value) => {
                let value = probability("relationship_prob", value)?;
                relations = [value; 4];
                true
            }
            None => false,
        };

        Ok(ResolvedOptions {
            num_variations: self.num_variations,
            synonym,
            definition,
            go_id,
            relations,
            relationship_override,
            definition_max_length: self.definition_max_length,
            max_relationship_distance: self.max_relationship_distance,
            seed,
        })
    }
}

fn probability(field: &'static str, value: f64) -> Result<f64, ConfigurationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigurationError::ProbabilityOutOfRange { field, value })
    }
}

/// Options after validation and legacy-override merge. Immutable per call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub num_variations: usize,
    pub synonym: f64,
    pub definition: f64,
    pub go_id: f64,
    /// Indexed by [`RelationFeature::index`].
    relations: [f64; 4],
    /// True when `relationship_prob` replaced the individual settings.
    pub relationship_override: bool,
    pub definition_max_length: Option<usize>,
    pub max_relationship_distance: usize,
    pub seed: u64,
}

impl ResolvedOptions {
    pub fn relation(&self, feature: RelationFeature) -> f64 {
        self.relations[feature.index()]
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Fluent construction with validation at `build()` time.
#[derive(Debug, Clone, Default)]
pub struct AugmentationOptionsBuilder {
    options: AugmentationOptions,
}

impl AugmentationOptionsBuilder {
    pub fn num_variations(mut self, n: usize) -> Self {
        self.options.num_variations = n;
        self
    }

    pub fn synonym_probability(mut self, p: f64) -> Self {
        self.options.synonym_probability = p;
        self
    }

    pub fn definition_probability(mut self, p: f64) -> Self {
        self.options.definition_probability = p;
        self
    }

    pub fn go_id_probability(mut self, p: f64) -> Self {
        self.options.go_id_probability = p;
        self
    }

    pub fn is_a_parent_probability(mut self, p: f64) -> Self {
        self.options.is_a_parent_probability = p;
        self
    }

    pub fn is_a_children_probability(mut self, p: f64) -> Self {
        self.options.is_a_children_probability = p;
        self
    }

    pub fn part_of_parent_probability(mut self, p: f64) -> Self {
        self.options.part_of_parent_probability = p;
        self
    }

    pub fn part_of_children_probability(mut self, p: f64) -> Self {
        self.options.part_of_children_probability = p;
        self
    }

    /// Set all four relationship probabilities at once.
    pub fn relationship_probabilities(self, p: f64) -> Self {
        self.is_a_parent_probability(p)
            .is_a_children_probability(p)
            .part_of_parent_probability(p)
            .part_of_children_probability(p)
    }

    pub fn relationship_prob(mut self, p: f64) -> Self {
        self.options.relationship_prob = Some(p);
        self
    }

    pub fn definition_max_length(mut self, len: usize) -> Self {
        self.options.definition_max_length = Some(len);
        self
    }

    pub fn max_relationship_distance(mut self, hops: usize) -> Self {
        self.options.max_relationship_distance = hops;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.options.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<AugmentationOptions, ConfigurationError> {
        self.options.validate()?;
        Ok(self.options)
    }
}
