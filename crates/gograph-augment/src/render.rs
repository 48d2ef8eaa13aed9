//! Turning a [`FeatureChoice`] into text. Pure: no randomness, no I/O.

use crate::selector::{FeatureChoice, RelationChoice, RelationFeature};

const IS_A_PARENT_TEMPLATES: &[&str] = &[
    "a type of {}",
    "a kind of {}",
    "classified as {}",
    "categorized as {}",
    "a form of {}",
];

const PART_OF_PARENT_TEMPLATES: &[&str] = &[
    "part of {}",
    "found within {}",
    "located in {}",
    "a component of {}",
    "contained within {}",
];

const IS_A_CHILDREN_TEMPLATES: &[&str] = &[
    "includes examples such as {}",
    "encompasses types like {}",
    "has subtypes including {}",
    "includes varieties such as {}",
    "contains subtypes like {}",
    "comprises types such as {}",
];

const PART_OF_CHILDREN_TEMPLATES: &[&str] = &[
    "contains components such as {}",
    "includes structures like {}",
    "comprises elements such as {}",
    "houses components like {}",
    "contains parts such as {}",
    "includes examples like {}",
];

/// Phrasing bank for one relationship feature. `{}` marks the example list.
pub fn templates(feature: RelationFeature) -> &'static [&'static str] {
    match feature {
        RelationFeature::IsAParents => IS_A_PARENT_TEMPLATES,
        RelationFeature::PartOfParents => PART_OF_PARENT_TEMPLATES,
        RelationFeature::IsAChildren => IS_A_CHILDREN_TEMPLATES,
        RelationFeature::PartOfChildren => PART_OF_CHILDREN_TEMPLATES,
    }
}

/// `A`, `A and B`, `A, B, and C`.
pub fn format_list<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [one] => one.as_ref().to_string(),
        [a, b] => format!("{} and {}", a.as_ref(), b.as_ref()),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(|s| s.as_ref()).collect();
            format!("{}, and {}", head.join(", "), last.as_ref())
        }
    }
}

/// One annotation segment, or `None` when the relation has no examples.
pub fn relation_phrase(choice: &RelationChoice) -> Option<String> {
    if choice.examples.is_empty() {
        return None;
    }
    let bank = templates(choice.feature);
    let template = bank[choice.template % bank.len()];
    Some(template.replacen("{}", &format_list(choice.examples.as_slice()), 1))
}

/// Annotation segments in rendering order.
pub fn segments(choice: &FeatureChoice) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(go_id) = &choice.go_id {
        out.push(go_id.clone());
    }
    if let Some(definition) = &choice.definition {
        out.push(definition.clone());
    }
    out.extend(choice.relations.iter().filter_map(relation_phrase));
    out
}

/// The replacement for one mention: the surface form, optionally followed by
/// a single parenthesized annotation.
pub fn render(choice: &FeatureChoice) -> String {
    let segments = segments(choice);
    if segments.is_empty() {
        choice.surface.clone()
    } else {
        format!("{} ({})", choice.surface, segments.join("; "))
    }
}
