use gograph_ontology::RepositoryError;

/// Invalid augmentation options. Raised before any repository access.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("{field} must be within [0.0, 1.0], got {value}")]
    ProbabilityOutOfRange { field: &'static str, value: f64 },
    #[error("num_variations must be a positive integer")]
    NoVariations,
    #[error("definition_max_length must be a positive integer")]
    ZeroDefinitionLength,
    #[error("max_relationship_distance must be at least 1")]
    ZeroRelationshipDistance,
}

#[derive(Debug, thiserror::Error)]
pub enum AugmentError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// Surfaced verbatim from the repository; no partial output is returned.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
