//! Vocabulary building and term-frequency vectorization
//!
//! A vocabulary is rebuilt from the product collection on every ranking pass,
//! so vector positions are only comparable within that pass.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

use crate::models::Product;

/// Vocabulary terms shorter than this are dropped
const MIN_TERM_LEN: usize = 2;

static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9_]+").expect("word pattern is valid"));

/// Lowercases the text and splits it into alphanumeric word tokens
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Ordered, deduplicated term set for one product collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    terms: Vec<String>,
}

impl Vocabulary {
    /// Builds the vocabulary from title, category and subcategory of every product,
    /// keeping first-seen order
    pub fn build(products: &[Product]) -> Self {
        let mut seen = HashSet::new();
        let mut terms = Vec::new();

        for product in products {
            for token in tokenize(&product.searchable_text()) {
                if token.chars().count() >= MIN_TERM_LEN && seen.insert(token.clone()) {
                    terms.push(token);
                }
            }
        }

        Self { terms }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Term-frequency vector of `text`, one count per vocabulary term in order
    pub fn vectorize(&self, text: &str) -> Vec<f64> {
        let mut frequencies: HashMap<String, usize> = HashMap::new();
        for token in tokenize(text) {
            *frequencies.entry(token).or_insert(0) += 1;
        }

        self.terms
            .iter()
            .map(|term| frequencies.get(term).copied().unwrap_or(0) as f64)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Product> {
        vec![
            Product::new("P1", "Wireless Phone Charger", "Electronics", "Phones", 19.99),
            Product::new("P2", "Leather Phone Case", "Electronics", "Accessories", 12.0),
            Product::new("P3", "A Garden Hose 50ft", "Home", "Garden", 30.0),
        ]
    }

    #[test]
    fn test_tokenize_lowercases_and_splits_on_punctuation() {
        assert_eq!(
            tokenize("Red T-Shirt, size_XL (2 pack)"),
            vec!["red", "t", "shirt", "size_xl", "2", "pack"]
        );
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_vocabulary_preserves_first_seen_order_without_duplicates() {
        let vocabulary = Vocabulary::build(&catalog());
        assert_eq!(
            vocabulary.terms(),
            &[
                "wireless",
                "phone",
                "charger",
                "electronics",
                "phones",
                "leather",
                "case",
                "accessories",
                "garden",
                "hose",
                "50ft",
                "home",
            ]
        );
    }

    #[test]
    fn test_vocabulary_drops_single_character_terms() {
        let vocabulary = Vocabulary::build(&catalog());
        assert!(!vocabulary.terms().iter().any(|t| t == "a"));
    }

    #[test]
    fn test_vocabulary_of_empty_collection() {
        let vocabulary = Vocabulary::build(&[]);
        assert!(vocabulary.is_empty());
        assert!(vocabulary.vectorize("anything at all").is_empty());
    }

    #[test]
    fn test_vectorize_counts_in_vocabulary_order() {
        let vocabulary = Vocabulary::build(&catalog());
        let vector = vocabulary.vectorize("phone PHONE case unknown");

        assert_eq!(vector.len(), vocabulary.len());
        assert_eq!(vector[1], 2.0); // phone
        assert_eq!(vector[6], 1.0); // case
        assert_eq!(vector.iter().sum::<f64>(), 3.0);
    }

    #[test]
    fn test_vector_length_matches_vocabulary_for_any_text() {
        let vocabulary = Vocabulary::build(&catalog());
        for text in ["", "x", "garden garden garden", "completely unrelated words here"] {
            assert_eq!(vocabulary.vectorize(text).len(), vocabulary.len());
        }
    }
}
