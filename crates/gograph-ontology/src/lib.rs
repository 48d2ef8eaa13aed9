//! Gene Ontology term model.
//!
//! This crate defines the small, shared vocabulary used across the workspace:
//!
//! - [`Term`]: a GO concept node (accession, name, definition, synonyms),
//! - [`TermSummary`] / [`RelatedTerm`]: lightweight views used for
//!   relationship sets and multi-hop traversal,
//! - [`RelationKind`] / [`Direction`]: the two relation kinds (IS_A, PART_OF)
//!   read in either direction,
//! - [`TermRepository`]: the narrow read API the augmentation engine consumes.
//!
//! Storage, ingestion and search live in sibling crates; nothing here performs I/O.

pub mod repository;

pub use repository::{RepositoryError, TermRepository};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix shared by every GO accession (`GO:0005737`).
pub const GO_ACCESSION_PREFIX: &str = "GO:";

/// Number of digits after the `GO:` prefix.
pub const GO_ACCESSION_DIGITS: usize = 7;

// ============================================================================
// Terms
// ============================================================================

/// A Gene Ontology term.
///
/// Terms are immutable once loaded; consumers receive owned clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Stable identifier, `GO:NNNNNNN`.
    pub accession: String,
    pub name: String,
    /// May be empty.
    #[serde(default)]
    pub definition: String,
    /// Ordered, may be empty.
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// GO namespace (`cellular_component`, `molecular_function`, `biological_process`).
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub comment: String,
}

impl Term {
    pub fn new(accession: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            accession: accession.into(),
            name: name.into(),
            definition: String::new(),
            synonyms: Vec::new(),
            namespace: None,
            comment: String::new(),
        }
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = definition.into();
        self
    }

    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn summary(&self) -> TermSummary {
        TermSummary {
            accession: self.accession.clone(),
            name: self.name.clone(),
        }
    }
}

/// Accession + name pair; the element type of a relationship set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermSummary {
    pub accession: String,
    pub name: String,
}

impl TermSummary {
    pub fn new(accession: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            accession: accession.into(),
            name: name.into(),
        }
    }
}

/// A related term reached through one or more hops of the same relation kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedTerm {
    pub term: TermSummary,
    /// 1 = direct relationship.
    pub distance: usize,
}

// ============================================================================
// Relations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    IsA,
    PartOf,
}

impl RelationKind {
    pub const ALL: [RelationKind; 2] = [RelationKind::IsA, RelationKind::PartOf];

    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::IsA => "is_a",
            RelationKind::PartOf => "part_of",
        }
    }

    /// Upper-case label used in reports (`IS_A`, `PART_OF`).
    pub fn label(self) -> &'static str {
        match self {
            RelationKind::IsA => "IS_A",
            RelationKind::PartOf => "PART_OF",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which end of a relation to read.
///
/// Edges point child → parent, so `Parent` follows edges forward and `Child`
/// follows them backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Parent,
    Child,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Parent, Direction::Child];

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Parent => "parent",
            Direction::Child => "child",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Accessions
// ============================================================================

/// True for `GO:` followed by exactly seven ASCII digits.
pub fn is_go_accession(s: &str) -> bool {
    s.strip_prefix(GO_ACCESSION_PREFIX).is_some_and(|digits| {
        digits.len() == GO_ACCESSION_DIGITS && digits.bytes().all(|b| b.is_ascii_digit())
    })
}

/// Extract `GO:NNNNNNN` from an OBO PURL (`http://purl.obolibrary.org/obo/GO_0005737`)
/// or return an already-normalized accession unchanged.
pub fn normalize_accession(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if is_go_accession(raw) {
        return Some(raw.to_string());
    }
    let (_, tail) = raw.rsplit_once("GO_")?;
    let digits: String = tail.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    Some(format!("{GO_ACCESSION_PREFIX}{digits}"))
}
