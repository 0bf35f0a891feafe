use serde::{Deserialize, Serialize};

use crate::models::Product;

/// Query words shorter than this never earn a lexical boost
const MIN_BOOST_WORD_LEN: usize = 2;

/// Cosine similarity of two equal-length vectors
///
/// Returns 0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "vectors built against different vocabularies");

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let magnitude_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let magnitude_b = b.iter().map(|y| y * y).sum::<f64>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }
    dot / (magnitude_a * magnitude_b)
}

/// Additive weights awarded when a query word appears in a product field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostWeights {
    pub title: f64,
    pub subcategory: f64,
    pub category: f64,
}

impl BoostWeights {
    /// Weights used while narrowing candidates for the external recommender
    pub const PREFILTER: Self = Self {
        title: 0.30,
        subcategory: 0.25,
        category: 0.20,
    };

    /// Weights used by the standalone fallback ranking
    pub const FALLBACK: Self = Self {
        title: 0.40,
        subcategory: 0.35,
        category: 0.25,
    };

    pub const NONE: Self = Self {
        title: 0.0,
        subcategory: 0.0,
        category: 0.0,
    };
}

/// Substring-overlap bonus between the (normalized) query and a product
pub fn lexical_boost(query: &str, product: &Product, weights: &BoostWeights) -> f64 {
    let title = product.title.to_lowercase();
    let subcategory = product.subcategory_name.to_lowercase();
    let category = product.category_name.to_lowercase();

    query
        .split_whitespace()
        .filter(|word| word.chars().count() >= MIN_BOOST_WORD_LEN)
        .map(|word| {
            let word = word.to_lowercase();
            let mut boost = 0.0;
            if title.contains(&word) {
                boost += weights.title;
            }
            if subcategory.contains(&word) {
                boost += weights.subcategory;
            }
            if category.contains(&word) {
                boost += weights.category;
            }
            boost
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_cosine_identical_vectors() {
        let v = [1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_cosine_orthogonal_vectors() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]), 0.0);
    }

    #[test]
    fn test_cosine_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0, 3.0], &[0.0, 0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_cosine_is_symmetric_and_bounded() {
        let pairs: [([f64; 4], [f64; 4]); 4] = [
            ([1.0, 0.0, 2.0, 0.0], [1.0, 1.0, 1.0, 1.0]),
            ([3.0, 1.0, 0.0, 0.0], [0.0, 1.0, 4.0, 1.0]),
            ([0.0, 0.0, 0.0, 5.0], [0.0, 0.0, 0.0, 1.0]),
            ([2.0, 2.0, 2.0, 2.0], [1.0, 0.0, 0.0, 0.0]),
        ];

        for (a, b) in pairs {
            let ab = cosine_similarity(&a, &b);
            let ba = cosine_similarity(&b, &a);
            assert!((ab - ba).abs() < EPS);
            assert!((0.0..=1.0 + EPS).contains(&ab), "out of range: {}", ab);
        }
    }

    #[test]
    fn test_cosine_exact_half() {
        // [1,0,0,0] against [1,1,1,1]: 1 / (1 * 2)
        assert_eq!(
            cosine_similarity(&[1.0, 0.0, 0.0, 0.0], &[1.0, 1.0, 1.0, 1.0]),
            0.5
        );
    }

    #[test]
    fn test_lexical_boost_weights_each_field() {
        let product = Product::new("P1", "Running Shoes", "Fashion", "Shoes", 60.0);

        let boost = lexical_boost("shoes", &product, &BoostWeights::FALLBACK);
        assert!((boost - (0.40 + 0.35)).abs() < EPS);

        let boost = lexical_boost("fashion shoes", &product, &BoostWeights::PREFILTER);
        assert!((boost - (0.20 + 0.30 + 0.25)).abs() < EPS);
    }

    #[test]
    fn test_lexical_boost_matches_substrings() {
        let product = Product::new("P1", "Smartphone Case", "Electronics", "Accessories", 9.0);
        let boost = lexical_boost("phone", &product, &BoostWeights::FALLBACK);
        assert!((boost - 0.40).abs() < EPS);
    }

    #[test]
    fn test_lexical_boost_ignores_short_words() {
        let product = Product::new("P1", "A Lamp", "Home", "Lighting", 20.0);
        assert_eq!(lexical_boost("a", &product, &BoostWeights::FALLBACK), 0.0);
        assert_eq!(lexical_boost("", &product, &BoostWeights::FALLBACK), 0.0);
    }

    #[test]
    fn test_lexical_boost_counts_each_query_word() {
        let product = Product::new("P1", "Red Shoes", "Fashion", "Footwear", 45.0);
        let boost = lexical_boost("red shoes shoes", &product, &BoostWeights::FALLBACK);
        assert!((boost - 3.0 * 0.40).abs() < EPS);
    }
}
