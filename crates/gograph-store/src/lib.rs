//! GO term store: an indexed, in-memory term graph.
//!
//! The store is built once from a [`GoOntology`] and is read-only afterwards:
//!
//! ```text
//!   go.json ──parse──► GoOntology ──from_ontology──► TermStore ──save──► store.gost
//!                                                       │
//!                                  TermRepository ◄─────┘  (augmentation, CLI)
//! ```
//!
//! Indexes:
//! - accession → term slot
//! - lowercased name / synonym → term slots (exact resolution)
//! - (slot, relation kind) → parent slots (forward) and child slots (backward)
//!
//! Snapshots use a small header (`GOST` + u32 version) followed by a bincode
//! payload of the ontology; indexes are rebuilt on load.

pub mod search;

pub use search::{anchored_ratio, partial_ratio, MatchType, SearchHit, SearchOptions, HASHTAG_MIN_SCORE};

use ahash::AHashMap;
use gograph_ingest_go::{Edge, GoOntology};
use gograph_ontology::{
    Direction, RelationKind, RepositoryError, Term, TermRepository, TermSummary,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SNAPSHOT_MAGIC: &[u8; 4] = b"GOST";
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid store snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("unsupported store snapshot version: {0}")]
    UnsupportedVersion(u32),
    #[error("snapshot encoding failed: {0}")]
    Encoding(#[from] bincode::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub terms: usize,
    pub synonyms: usize,
    pub is_a_relationships: usize,
    pub part_of_relationships: usize,
}

// ============================================================================
// Term store
// ============================================================================

#[derive(Debug, Default)]
pub struct TermStore {
    terms: Vec<Term>,
    edges: Vec<Edge>,
    by_accession: AHashMap<String, usize>,
    by_name: AHashMap<String, Vec<usize>>,
    by_synonym: AHashMap<String, Vec<usize>>,
    /// (child slot, kind) -> parent slots
    forward: AHashMap<(usize, RelationKind), Vec<usize>>,
    /// (parent slot, kind) -> child slots
    backward: AHashMap<(usize, RelationKind), Vec<usize>>,
}

impl TermStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build all indexes. Edges whose endpoints are unknown are ignored.
    pub fn from_ontology(ontology: GoOntology) -> Self {
        let GoOntology { terms, edges } = ontology;
        let mut store = Self {
            terms,
            ..Self::default()
        };

        for (slot, term) in store.terms.iter().enumerate() {
            store.by_accession.insert(term.accession.clone(), slot);
            store
                .by_name
                .entry(term.name.to_lowercase())
                .or_default()
                .push(slot);
            for synonym in &term.synonyms {
                let slots = store.by_synonym.entry(synonym.to_lowercase()).or_default();
                if !slots.contains(&slot) {
                    slots.push(slot);
                }
            }
        }

        let mut kept = Vec::with_capacity(edges.len());
        for edge in edges {
            let (Some(&child), Some(&parent)) = (
                store.by_accession.get(&edge.child),
                store.by_accession.get(&edge.parent),
            ) else {
                tracing::warn!(
                    child = %edge.child,
                    parent = %edge.parent,
                    kind = %edge.kind,
                    "dropping edge with unknown endpoint"
                );
                continue;
            };
            let parents = store.forward.entry((child, edge.kind)).or_default();
            if parents.contains(&parent) {
                continue;
            }
            parents.push(parent);
            store
                .backward
                .entry((parent, edge.kind))
                .or_default()
                .push(child);
            kept.push(edge);
        }
        store.edges = kept;

        tracing::debug!(
            terms = store.terms.len(),
            edges = store.edges.len(),
            "built term store indexes"
        );
        store
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn term(&self, accession: &str) -> Option<&Term> {
        self.by_accession.get(accession).map(|&slot| &self.terms[slot])
    }

    /// Direct relatives in edge insertion order.
    pub fn relationships(
        &self,
        accession: &str,
        kind: RelationKind,
        direction: Direction,
    ) -> Vec<&Term> {
        let Some(&slot) = self.by_accession.get(accession) else {
            return Vec::new();
        };
        let index = match direction {
            Direction::Parent => &self.forward,
            Direction::Child => &self.backward,
        };
        index
            .get(&(slot, kind))
            .map(|slots| slots.iter().map(|&s| &self.terms[s]).collect())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> StoreStats {
        let count = |kind: RelationKind| self.edges.iter().filter(|e| e.kind == kind).count();
        StoreStats {
            terms: self.terms.len(),
            synonyms: self.terms.iter().map(|t| t.synonyms.len()).sum(),
            is_a_relationships: count(RelationKind::IsA),
            part_of_relationships: count(RelationKind::PartOf),
        }
    }

    /// Exact (case-insensitive) name match, then exact synonym match.
    pub fn find_exact(&self, text: &str) -> Option<&Term> {
        let key = text.trim().to_lowercase();
        self.by_name
            .get(&key)
            .or_else(|| self.by_synonym.get(&key))
            .and_then(|slots| slots.first())
            .map(|&slot| &self.terms[slot])
    }

    /// Resolve a hashtag token: `_` reads as a space, exact matches win, then
    /// the best token-anchored fuzzy hit at or above [`HASHTAG_MIN_SCORE`].
    pub fn resolve_token(&self, token: &str) -> Option<&Term> {
        let text = token.replace('_', " ");
        self.find_exact(&text)
            .or_else(|| self.best_token_match(&text, HASHTAG_MIN_SCORE))
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    pub fn to_ontology(&self) -> GoOntology {
        GoOntology {
            terms: self.terms.clone(),
            edges: self.edges.clone(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        let payload = bincode::serialize(&(&self.terms, &self.edges))?;

        let mut out = Vec::with_capacity(payload.len() + 16);
        out.extend_from_slice(SNAPSHOT_MAGIC);
        out.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
        out.extend_from_slice(&(payload.len() as u64).to_le_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        if bytes.len() < 16 || &bytes[0..4] != SNAPSHOT_MAGIC {
            return Err(StoreError::InvalidSnapshot("missing GOST header".to_string()));
        }

        let mut word = [0u8; 4];
        word.copy_from_slice(&bytes[4..8]);
        let version = u32::from_le_bytes(word);
        if version != SNAPSHOT_VERSION {
            return Err(StoreError::UnsupportedVersion(version));
        }

        let mut len_bytes = [0u8; 8];
        len_bytes.copy_from_slice(&bytes[8..16]);
        let len = u64::from_le_bytes(len_bytes) as usize;
        let payload = bytes
            .get(16..)
            .filter(|rest| rest.len() == len)
            .ok_or_else(|| {
                StoreError::InvalidSnapshot(format!(
                    "payload length mismatch: header says {len}, found {}",
                    bytes.len() - 16
                ))
            })?;

        let (terms, edges): (Vec<Term>, Vec<Edge>) = bincode::deserialize(payload)?;
        Ok(Self::from_ontology(GoOntology { terms, edges }))
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_bytes()?)?;
        tracing::info!(path = %path.display(), terms = self.terms.len(), "saved term store");
        Ok(())
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let bytes = std::fs::read(path)?;
        let store = Self::from_bytes(&bytes)?;
        tracing::debug!(path = %path.display(), terms = store.len(), "opened term store");
        Ok(store)
    }
}

// ============================================================================
// Repository API
// ============================================================================

impl TermRepository for TermStore {
    fn get_term(&self, accession: &str) -> Result<Option<Term>, RepositoryError> {
        Ok(self.term(accession).cloned())
    }

    fn get_relationships(
        &self,
        accession: &str,
        kind: RelationKind,
        direction: Direction,
    ) -> Result<Vec<TermSummary>, RepositoryError> {
        Ok(self
            .relationships(accession, kind, direction)
            .into_iter()
            .map(Term::summary)
            .collect())
    }

    fn find_by_name_or_synonym(&self, token: &str) -> Result<Option<String>, RepositoryError> {
        Ok(self.resolve_token(token).map(|t| t.accession.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> TermStore {
        TermStore::from_ontology(GoOntology {
            terms: vec![
                Term::new("GO:0110165", "cellular anatomical entity"),
                Term::new("GO:0005737", "cytoplasm"),
                Term::new("GO:0005829", "cytosol").with_synonyms(["cytoplasmic matrix"]),
            ],
            edges: vec![
                Edge {
                    child: "GO:0005737".into(),
                    parent: "GO:0110165".into(),
                    kind: RelationKind::IsA,
                },
                Edge {
                    child: "GO:0005829".into(),
                    parent: "GO:0005737".into(),
                    kind: RelationKind::PartOf,
                },
                Edge {
                    child: "GO:0005829".into(),
                    parent: "GO:0005737".into(),
                    kind: RelationKind::PartOf,
                },
                Edge {
                    child: "GO:0005829".into(),
                    parent: "GO:0009999".into(),
                    kind: RelationKind::IsA,
                },
            ],
        })
    }

    #[test]
    fn adjacency_in_both_directions() {
        let store = tiny();
        let parents = store.relationships("GO:0005829", RelationKind::PartOf, Direction::Parent);
        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].name, "cytoplasm");

        let children = store.relationships("GO:0005737", RelationKind::PartOf, Direction::Child);
        assert_eq!(children[0].accession, "GO:0005829");

        assert!(store
            .relationships("GO:0005737", RelationKind::PartOf, Direction::Parent)
            .is_empty());
        assert!(store
            .relationships("GO:0000000", RelationKind::IsA, Direction::Child)
            .is_empty());
    }

    #[test]
    fn duplicate_and_dangling_edges_are_dropped() {
        let stats = tiny().stats();
        assert_eq!(
            stats,
            StoreStats {
                terms: 3,
                synonyms: 1,
                is_a_relationships: 1,
                part_of_relationships: 1,
            }
        );
    }

    #[test]
    fn exact_lookup_is_case_insensitive() {
        let store = tiny();
        assert_eq!(store.find_exact("Cytoplasm").unwrap().accession, "GO:0005737");
        assert_eq!(
            store.find_exact("CYTOPLASMIC MATRIX").unwrap().accession,
            "GO:0005829"
        );
        assert!(store.find_exact("nucleus").is_none());
    }

    #[test]
    fn token_resolution_reads_underscores_as_spaces() {
        let store = tiny();
        assert_eq!(
            store.find_by_name_or_synonym("cytoplasmic_matrix").unwrap().as_deref(),
            Some("GO:0005829")
        );
        assert_eq!(
            store.find_by_name_or_synonym("zzzzqqqq").unwrap(),
            None
        );
    }

    #[test]
    fn snapshot_header_is_checked() {
        assert!(matches!(
            TermStore::from_bytes(b"nope"),
            Err(StoreError::InvalidSnapshot(_))
        ));

        let mut bytes = tiny().to_bytes().unwrap();
        bytes[4] = 9;
        assert!(matches!(
            TermStore::from_bytes(&bytes),
            Err(StoreError::UnsupportedVersion(9))
        ));

        let mut bytes = tiny().to_bytes().unwrap();
        bytes.truncate(bytes.len() - 1);
        assert!(matches!(
            TermStore::from_bytes(&bytes),
            Err(StoreError::InvalidSnapshot(_))
        ));
    }
}
