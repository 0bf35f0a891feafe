use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

/// Common misspellings and synonyms mapped to the term the catalog uses
pub const DEFAULT_CORRECTIONS: &[(&str, &str)] = &[
    ("phome", "phone"),
    ("pone", "phone"),
    ("fone", "phone"),
    ("cellphone", "phone"),
    ("smartphone", "phone"),
    ("mobile", "phone"),
    ("tshirt", "clothing"),
    ("t-shirt", "clothing"),
    ("pant", "pants"),
    ("jean", "jeans"),
    ("trouser", "pants"),
    ("laptop", "computer"),
    ("notebook", "computer"),
    ("tablet", "tablet"),
    ("ipad", "tablet"),
    ("sneaker", "shoes"),
    ("boot", "shoes"),
    ("sandal", "shoes"),
    ("earphone", "headphones"),
    ("earbud", "headphones"),
    ("backpack", "bag"),
    ("purse", "bag"),
    ("guitar", "guitar"),
    ("piano", "piano"),
    ("drum", "drum"),
    ("furniture", "home"),
    ("decor", "home"),
    ("fitness", "sports"),
    ("exercise", "sports"),
    ("gym", "sports"),
];

static STANDARD: Lazy<QueryNormalizer> = Lazy::new(|| {
    QueryNormalizer::new(DEFAULT_CORRECTIONS).expect("default correction table compiles")
});

/// Whole-word, table-driven query correction
///
/// All corrections are matched against the original query in a single pass,
/// so the output of one correction is never re-examined by another.
#[derive(Debug, Clone)]
pub struct QueryNormalizer {
    corrections: HashMap<String, String>,
    pattern: Option<Regex>,
}

impl QueryNormalizer {
    pub fn new(corrections: &[(&str, &str)]) -> Result<Self, regex::Error> {
        let corrections: HashMap<String, String> = corrections
            .iter()
            .map(|(from, to)| (from.to_lowercase(), to.to_lowercase()))
            .collect();

        if corrections.is_empty() {
            return Ok(Self {
                corrections,
                pattern: None,
            });
        }

        // Longest first so alternation prefers the most specific key
        let mut keys: Vec<&String> = corrections.keys().collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alternation = keys
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))?;

        Ok(Self {
            corrections,
            pattern: Some(pattern),
        })
    }

    /// Normalizer loaded with [`DEFAULT_CORRECTIONS`]
    pub fn standard() -> Self {
        STANDARD.clone()
    }

    /// Trims, lowercases and applies every matching correction
    pub fn normalize(&self, query: &str) -> String {
        let query = query.trim().to_lowercase();
        let Some(pattern) = &self.pattern else {
            return query;
        };

        pattern
            .replace_all(&query, |caps: &Captures| {
                let word = &caps[0];
                match self.corrections.get(&word.to_lowercase()) {
                    Some(corrected) => {
                        tracing::debug!(from = %word, to = %corrected, "Corrected query term");
                        corrected.clone()
                    }
                    None => word.to_string(),
                }
            })
            .into_owned()
    }
}

impl Default for QueryNormalizer {
    fn default() -> Self {
        Self::standard()
    }
}
