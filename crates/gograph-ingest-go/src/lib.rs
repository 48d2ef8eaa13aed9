//! Gene Ontology ingestion (OBO-Graph JSON).
//!
//! Reads the `go.json` release format:
//!
//! ```text
//! { "graphs": [ { "nodes": [ { "id", "lbl", "meta": {...} } ],
//!                 "edges": [ { "sub", "pred", "obj" } ] } ] }
//! ```
//!
//! and produces a [`GoOntology`]: the retained [`Term`]s plus typed
//! child → parent [`Edge`]s. Filtering (namespace, deprecation) happens here so
//! the store only ever sees a consistent, closed term set: every edge endpoint
//! is a retained term.

use gograph_ontology::{normalize_accession, RelationKind, Term};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub const DEFAULT_NAMESPACE: &str = "cellular_component";

pub const NAMESPACE_PREDICATE: &str = "http://www.geneontology.org/formats/oboInOwl#hasOBONamespace";
pub const SUBCLASS_OF_PREDICATE: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
pub const PART_OF_PROPERTY: &str = "BFO_0000050";

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid OBO-Graph JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("OBO-Graph document contains no graphs")]
    NoGraphs,
}

// ============================================================================
// Output model
// ============================================================================

/// A typed edge, always pointing from the more specific term to the more general one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub child: String,
    pub parent: String,
    pub kind: RelationKind,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoOntology {
    pub terms: Vec<Term>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub nodes_seen: usize,
    pub terms_kept: usize,
    pub skipped_non_go: usize,
    pub skipped_deprecated: usize,
    pub skipped_namespace: usize,
    pub synonyms: usize,
    pub edges_kept: usize,
    /// Unknown predicate, non-GO endpoint, or endpoint outside the retained set.
    pub edges_dropped: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestOptions {
    /// `None` keeps every namespace.
    pub namespace: Option<String>,
    pub include_deprecated: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            namespace: Some(DEFAULT_NAMESPACE.to_string()),
            include_deprecated: false,
        }
    }
}

// ============================================================================
// OBO-Graph JSON shapes (only the fields we read)
// ============================================================================

#[derive(Debug, Deserialize)]
struct GraphDocument {
    #[serde(default)]
    graphs: Vec<Graph>,
}

#[derive(Debug, Deserialize)]
struct Graph {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<RawEdge>,
}

#[derive(Debug, Deserialize)]
struct Node {
    #[serde(default)]
    id: String,
    #[serde(default)]
    lbl: Option<String>,
    #[serde(default)]
    meta: Option<Meta>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Meta {
    #[serde(default)]
    definition: Option<Definition>,
    #[serde(default)]
    comments: Vec<String>,
    #[serde(default)]
    synonyms: Vec<SynonymValue>,
    #[serde(default)]
    basic_property_values: Vec<PropertyValue>,
    #[serde(default)]
    deprecated: bool,
}

#[derive(Debug, Deserialize)]
struct Definition {
    #[serde(default)]
    val: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SynonymValue {
    Structured {
        #[serde(default)]
        val: String,
    },
    Plain(String),
}

#[derive(Debug, Deserialize)]
struct PropertyValue {
    #[serde(default)]
    pred: String,
    #[serde(default)]
    val: String,
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    #[serde(default)]
    sub: String,
    #[serde(default)]
    pred: String,
    #[serde(default)]
    obj: String,
}

// ============================================================================
// Parsing
// ============================================================================

pub fn parse_go_json_file(
    path: &Path,
    options: &IngestOptions,
) -> Result<(GoOntology, IngestReport), IngestError> {
    let text = std::fs::read_to_string(path)?;
    parse_go_json(&text, options)
}

pub fn parse_go_json(
    text: &str,
    options: &IngestOptions,
) -> Result<(GoOntology, IngestReport), IngestError> {
    let document: GraphDocument = serde_json::from_str(text)?;
    let graph = document.graphs.into_iter().next().ok_or(IngestError::NoGraphs)?;

    let mut report = IngestReport::default();
    let mut terms: Vec<Term> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for node in graph.nodes {
        report.nodes_seen += 1;

        let Some(accession) = normalize_accession(&node.id) else {
            report.skipped_non_go += 1;
            continue;
        };

        let meta = node.meta.unwrap_or_default();
        if meta.deprecated && !options.include_deprecated {
            report.skipped_deprecated += 1;
            continue;
        }

        let namespace = namespace_of(&meta);
        if let Some(wanted) = options.namespace.as_deref() {
            if namespace.as_deref() != Some(wanted) {
                report.skipped_namespace += 1;
                continue;
            }
        }

        if index.contains_key(&accession) {
            tracing::warn!(accession = %accession, "duplicate GO node; keeping the first");
            continue;
        }

        let synonyms = synonyms_of(&meta);
        report.synonyms += synonyms.len();

        let term = Term {
            accession: accession.clone(),
            name: node.lbl.unwrap_or_default(),
            definition: meta.definition.map(|d| d.val).unwrap_or_default(),
            synonyms,
            namespace,
            comment: meta.comments.into_iter().next().unwrap_or_default(),
        };
        index.insert(accession, terms.len());
        terms.push(term);
    }
    report.terms_kept = terms.len();

    let mut edges: Vec<Edge> = Vec::new();
    let mut seen_edges: HashSet<Edge> = HashSet::new();
    for raw in graph.edges {
        let Some(kind) = relation_kind_of(&raw.pred) else {
            report.edges_dropped += 1;
            continue;
        };
        let (Some(child), Some(parent)) =
            (normalize_accession(&raw.sub), normalize_accession(&raw.obj))
        else {
            report.edges_dropped += 1;
            continue;
        };
        if !index.contains_key(&child) || !index.contains_key(&parent) {
            report.edges_dropped += 1;
            continue;
        }
        let edge = Edge {
            child,
            parent,
            kind,
        };
        if seen_edges.insert(edge.clone()) {
            edges.push(edge);
        }
    }
    report.edges_kept = edges.len();

    tracing::info!(
        terms = report.terms_kept,
        edges = report.edges_kept,
        namespace = options.namespace.as_deref().unwrap_or("all"),
        "parsed GO ontology"
    );

    Ok((GoOntology { terms, edges }, report))
}

fn namespace_of(meta: &Meta) -> Option<String> {
    meta.basic_property_values
        .iter()
        .find(|p| p.pred == NAMESPACE_PREDICATE)
        .map(|p| p.val.clone())
}

/// Exact and alternative-label synonyms, trimmed, deduplicated in first-seen order.
fn synonyms_of(meta: &Meta) -> Vec<String> {
    let listed = meta.synonyms.iter().map(|s| match s {
        SynonymValue::Structured { val } => val.as_str(),
        SynonymValue::Plain(val) => val.as_str(),
    });
    let alt_labels = meta
        .basic_property_values
        .iter()
        .filter(|p| p.pred.to_ascii_lowercase().contains("synonym") || p.pred.contains("altLabel"))
        .map(|p| p.val.as_str());

    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for syn in listed.chain(alt_labels) {
        let syn = syn.trim();
        if syn.is_empty() || !seen.insert(syn) {
            continue;
        }
        out.push(syn.to_string());
    }
    out
}

fn relation_kind_of(pred: &str) -> Option<RelationKind> {
    if pred == "is_a" || pred == SUBCLASS_OF_PREDICATE {
        Some(RelationKind::IsA)
    } else if pred.contains("part_of") || pred.contains(PART_OF_PROPERTY) {
        Some(RelationKind::PartOf)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, label: &str, namespace: &str) -> serde_json::Value {
        serde_json::json!({
            "id": format!("http://purl.obolibrary.org/obo/{id}"),
            "lbl": label,
            "type": "CLASS",
            "meta": {
                "definition": { "val": format!("Definition of {label}.") },
                "synonyms": [ { "pred": "hasExactSynonym", "val": format!("{label} alias") } ],
                "basicPropertyValues": [ { "pred": NAMESPACE_PREDICATE, "val": namespace } ]
            }
        })
    }

    fn document(nodes: Vec<serde_json::Value>, edges: Vec<serde_json::Value>) -> String {
        serde_json::json!({ "graphs": [ { "nodes": nodes, "edges": edges } ] }).to_string()
    }

    #[test]
    fn keeps_only_requested_namespace() {
        let text = document(
            vec![
                node("GO_0005737", "cytoplasm", "cellular_component"),
                node("GO_0003674", "molecular_function", "molecular_function"),
            ],
            vec![],
        );
        let (ontology, report) = parse_go_json(&text, &IngestOptions::default()).unwrap();
        assert_eq!(ontology.terms.len(), 1);
        assert_eq!(ontology.terms[0].accession, "GO:0005737");
        assert_eq!(ontology.terms[0].definition, "Definition of cytoplasm.");
        assert_eq!(ontology.terms[0].synonyms, vec!["cytoplasm alias".to_string()]);
        assert_eq!(report.skipped_namespace, 1);

        let all = IngestOptions {
            namespace: None,
            ..IngestOptions::default()
        };
        let (ontology, _) = parse_go_json(&text, &all).unwrap();
        assert_eq!(ontology.terms.len(), 2);
    }

    #[test]
    fn classifies_and_filters_edges() {
        let text = document(
            vec![
                node("GO_0005737", "cytoplasm", "cellular_component"),
                node("GO_0005622", "intracellular anatomical structure", "cellular_component"),
                node("GO_0005829", "cytosol", "cellular_component"),
            ],
            vec![
                serde_json::json!({"sub": "http://purl.obolibrary.org/obo/GO_0005737", "pred": "is_a", "obj": "http://purl.obolibrary.org/obo/GO_0005622"}),
                serde_json::json!({"sub": "http://purl.obolibrary.org/obo/GO_0005829", "pred": "http://purl.obolibrary.org/obo/BFO_0000050", "obj": "http://purl.obolibrary.org/obo/GO_0005737"}),
                serde_json::json!({"sub": "http://purl.obolibrary.org/obo/GO_0005829", "pred": "http://purl.obolibrary.org/obo/BFO_0000050", "obj": "http://purl.obolibrary.org/obo/GO_0005737"}),
                serde_json::json!({"sub": "http://purl.obolibrary.org/obo/GO_0005829", "pred": "http://purl.obolibrary.org/obo/RO_0002211", "obj": "http://purl.obolibrary.org/obo/GO_0005737"}),
                serde_json::json!({"sub": "http://purl.obolibrary.org/obo/GO_0005737", "pred": "is_a", "obj": "http://purl.obolibrary.org/obo/GO_9999999"}),
            ],
        );
        let (ontology, report) = parse_go_json(&text, &IngestOptions::default()).unwrap();
        assert_eq!(
            ontology.edges,
            vec![
                Edge {
                    child: "GO:0005737".into(),
                    parent: "GO:0005622".into(),
                    kind: RelationKind::IsA
                },
                Edge {
                    child: "GO:0005829".into(),
                    parent: "GO:0005737".into(),
                    kind: RelationKind::PartOf
                },
            ]
        );
        assert_eq!(report.edges_kept, 2);
        assert_eq!(report.edges_dropped, 2);
    }

    #[test]
    fn skips_deprecated_and_non_go_nodes() {
        let mut deprecated = node("GO_0000001", "old term", "cellular_component");
        deprecated["meta"]["deprecated"] = serde_json::json!(true);
        let chebi = serde_json::json!({"id": "http://purl.obolibrary.org/obo/CHEBI_15377", "lbl": "water"});
        let text = document(vec![deprecated, chebi], vec![]);

        let (ontology, report) = parse_go_json(&text, &IngestOptions::default()).unwrap();
        assert!(ontology.terms.is_empty());
        assert_eq!(report.skipped_deprecated, 1);
        assert_eq!(report.skipped_non_go, 1);
    }

    #[test]
    fn synonyms_are_deduplicated_in_order() {
        let text = serde_json::json!({"graphs": [{"nodes": [{
            "id": "http://purl.obolibrary.org/obo/GO_0005886",
            "lbl": "plasma membrane",
            "meta": {
                "synonyms": [
                    {"val": "cell membrane"},
                    {"val": " cytoplasmic membrane "},
                    {"val": "cell membrane"},
                    {"val": ""}
                ],
                "basicPropertyValues": [
                    {"pred": NAMESPACE_PREDICATE, "val": "cellular_component"},
                    {"pred": "http://www.w3.org/2004/02/skos/core#altLabel", "val": "plasmalemma"}
                ]
            }
        }]}]})
        .to_string();
        let (ontology, _) = parse_go_json(&text, &IngestOptions::default()).unwrap();
        assert_eq!(
            ontology.terms[0].synonyms,
            vec!["cell membrane", "cytoplasmic membrane", "plasmalemma"]
        );
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(matches!(
            parse_go_json("{not json", &IngestOptions::default()),
            Err(IngestError::Json(_))
        ));
        assert!(matches!(
            parse_go_json(r#"{"graphs": []}"#, &IngestOptions::default()),
            Err(IngestError::NoGraphs)
        ));
    }
}
