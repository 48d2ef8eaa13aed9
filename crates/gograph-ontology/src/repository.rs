//! Read-only term repository API.
//!
//! The augmentation engine never talks to a store directly; it sees only this
//! trait. Implementations must be safe to share across threads because rounds
//! may be generated in parallel after all reads have completed.

use std::collections::{HashSet, VecDeque};

use crate::{Direction, RelatedTerm, RelationKind, Term, TermSummary};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// The backing store could not be reached (connection lost, file vanished, ...).
    #[error("term repository unavailable: {0}")]
    Unavailable(String),
}

pub trait TermRepository: Send + Sync {
    /// Fetch a term by accession; `Ok(None)` when the accession is unknown.
    fn get_term(&self, accession: &str) -> Result<Option<Term>, RepositoryError>;

    /// Direct relatives of `accession` for one relation kind and direction.
    ///
    /// Unknown accessions yield an empty set.
    fn get_relationships(
        &self,
        accession: &str,
        kind: RelationKind,
        direction: Direction,
    ) -> Result<Vec<TermSummary>, RepositoryError>;

    /// Resolve a free-text token (a term name or synonym) to an accession.
    fn find_by_name_or_synonym(&self, token: &str) -> Result<Option<String>, RepositoryError>;

    /// Relatives up to `max_distance` hops away, each reported once at its
    /// shortest distance, in breadth-first discovery order.
    fn get_related_within(
        &self,
        accession: &str,
        kind: RelationKind,
        direction: Direction,
        max_distance: usize,
    ) -> Result<Vec<RelatedTerm>, RepositoryError> {
        let mut out = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(accession.to_string());

        let mut queue: VecDeque<(String, usize)> = VecDeque::new();
        queue.push_back((accession.to_string(), 0));

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_distance {
                continue;
            }
            for related in self.get_relationships(&current, kind, direction)? {
                if !seen.insert(related.accession.clone()) {
                    continue;
                }
                queue.push_back((related.accession.clone(), depth + 1));
                out.push(RelatedTerm {
                    term: related,
                    distance: depth + 1,
                });
            }
        }

        Ok(out)
    }
}

impl<R: TermRepository + ?Sized> TermRepository for &R {
    fn get_term(&self, accession: &str) -> Result<Option<Term>, RepositoryError> {
        (**self).get_term(accession)
    }

    fn get_relationships(
        &self,
        accession: &str,
        kind: RelationKind,
        direction: Direction,
    ) -> Result<Vec<TermSummary>, RepositoryError> {
        (**self).get_relationships(accession, kind, direction)
    }

    fn find_by_name_or_synonym(&self, token: &str) -> Result<Option<String>, RepositoryError> {
        (**self).find_by_name_or_synonym(token)
    }

    fn get_related_within(
        &self,
        accession: &str,
        kind: RelationKind,
        direction: Direction,
        max_distance: usize,
    ) -> Result<Vec<RelatedTerm>, RepositoryError> {
        (**self).get_related_within(accession, kind, direction, max_distance)
    }
}

impl<R: TermRepository + ?Sized> TermRepository for std::sync::Arc<R> {
    fn get_term(&self, accession: &str) -> Result<Option<Term>, RepositoryError> {
        (**self).get_term(accession)
    }

    fn get_relationships(
        &self,
        accession: &str,
        kind: RelationKind,
        direction: Direction,
    ) -> Result<Vec<TermSummary>, RepositoryError> {
        (**self).get_relationships(accession, kind, direction)
    }

    fn find_by_name_or_synonym(&self, token: &str) -> Result<Option<String>, RepositoryError> {
        (**self).find_by_name_or_synonym(token)
    }

    fn get_related_within(
        &self,
        accession: &str,
        kind: RelationKind,
        direction: Direction,
        max_distance: usize,
    ) -> Result<Vec<RelatedTerm>, RepositoryError> {
        (**self).get_related_within(accession, kind, direction, max_distance)
    }
}
