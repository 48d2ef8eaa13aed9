//! # gograph-augment
//!
//! Hashtag-driven text augmentation over Gene Ontology terms.
//!
//! Input text marks ontology references with hashtags (`#cytoplasm`,
//! `#plasma_membrane`). For every requested variation the engine decides,
//! per term and per feature, whether to swap in a synonym and whether to
//! append the GO accession, the definition, or examples of related terms.
//! The selected pieces are rendered into one parenthesized annotation:
//!
//! ```text
//! The enzyme works in the #cytoplasm.
//! The enzyme works in the cytoplasm (GO:0005737; part of intracellular anatomical structure).
//! ```
//!
//! Generation is reproducible: round `r` of a call with seed `s` always draws
//! from ChaCha8 stream `r` of seed `s`, so the output depends only on the
//! text, the options and the repository contents.

pub mod augmentor;
pub mod error;
pub mod options;
pub mod render;
pub mod scanner;
pub mod selector;

pub use augmentor::{HashtagAnalysis, TextAugmentor, PARALLEL_ROUND_THRESHOLD};
pub use error::{AugmentError, ConfigurationError};
pub use options::{AugmentationOptions, AugmentationOptionsBuilder, ResolvedOptions};
pub use render::{format_list, render};
pub use scanner::{HashtagScanner, HashtagToken, Mention};
pub use selector::{
    select, truncate_definition, FeatureChoice, FeatureDraws, RelationChoice, RelationFeature,
    TermDetail, CHILD_EXAMPLE_CAP, PARENT_EXAMPLE_CAP,
};
