//! Hashtag discovery and resolution.

use std::collections::HashMap;
use std::ops::Range;

use gograph_ontology::{RepositoryError, TermRepository};
use regex::Regex;

/// One `#token` occurrence, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashtagToken {
    /// Byte range of the whole `#token` in the source text.
    pub span: Range<usize>,
    /// The run after `#`, verbatim.
    pub token: String,
    /// `token` with underscores turned into spaces.
    pub lookup_key: String,
}

impl HashtagToken {
    /// The `#token` text as it appears in the input.
    pub fn surface(&self) -> String {
        format!("#{}", self.token)
    }
}

/// A located hashtag and its resolution outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub token: HashtagToken,
    /// `None` when the repository could not resolve the lookup key; such
    /// mentions are rendered as the bare token in every variation.
    pub accession: Option<String>,
}

impl Mention {
    pub fn is_resolved(&self) -> bool {
        self.accession.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct HashtagScanner {
    pattern: Regex,
}

impl Default for HashtagScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl HashtagScanner {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"#(\w+)").expect("hashtag pattern is valid"),
        }
    }

    /// Every `#token` in `text`, left to right, non-overlapping.
    pub fn tokens(&self, text: &str) -> Vec<HashtagToken> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let run = caps.get(1)?.as_str();
                Some(HashtagToken {
                    span: whole.range(),
                    token: run.to_string(),
                    lookup_key: run.replace('_', " "),
                })
            })
            .collect()
    }

    /// Tokenize and resolve. Each distinct lookup key hits the repository once.
    pub fn scan<R>(&self, text: &str, repository: &R) -> Result<Vec<Mention>, RepositoryError>
    where
        R: TermRepository + ?Sized,
    {
        let mut resolved: HashMap<String, Option<String>> = HashMap::new();
        let mut mentions = Vec::new();

        for token in self.tokens(text) {
            let accession = match resolved.get(&token.lookup_key) {
                Some(hit) => hit.clone(),
                None => {
                    let hit = repository.find_by_name_or_synonym(&token.lookup_key)?;
                    if hit.is_none() {
                        tracing::debug!(token = %token.token, "hashtag did not resolve");
                    }
                    resolved.insert(token.lookup_key.clone(), hit.clone());
                    hit
                }
            };
            mentions.push(Mention { token, accession });
        }

        Ok(mentions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_tokens_in_order() {
        let scanner = HashtagScanner::new();
        let text = "In the #plasma_membrane and #ER, not # alone.";
        let tokens = scanner.tokens(text);

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].token, "plasma_membrane");
        assert_eq!(tokens[0].lookup_key, "plasma membrane");
        assert_eq!(&text[tokens[0].span.clone()], "#plasma_membrane");
        assert_eq!(tokens[1].token, "ER");
        assert_eq!(&text[tokens[1].span.clone()], "#ER");
    }

    #[test]
    fn adjacent_tags_do_not_overlap() {
        let scanner = HashtagScanner::new();
        let tokens = scanner.tokens("##a#b");
        let runs: Vec<&str> = tokens.iter().map(|t| t.token.as_str()).collect();
        assert_eq!(runs, vec!["a", "b"]);
        assert_eq!(tokens[0].span, 1..3);
        assert_eq!(tokens[1].span, 3..5);
    }

    #[test]
    fn no_tags() {
        assert!(HashtagScanner::new().tokens("plain text").is_empty());
    }

    #[test]
    fn unicode_word_characters() {
        let tokens = HashtagScanner::new().tokens("über #zellkörper!");
        assert_eq!(tokens[0].token, "zellkörper");
        assert_eq!(tokens[0].surface(), "#zellkörper");
    }
}
