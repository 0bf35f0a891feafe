use serde::{Deserialize, Serialize};

use crate::{
    models::{Product, ScoredProduct},
    services::{
        normalizer::QueryNormalizer,
        similarity::{cosine_similarity, lexical_boost, BoostWeights},
        text::Vocabulary,
    },
};

/// Scoring parameters for one ranking context
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankerConfig {
    /// Minimum combined score, inclusive
    pub threshold: f64,
    pub weights: BoostWeights,
    /// Maximum number of results returned
    pub max_results: usize,
}

impl RankerConfig {
    /// Narrows the catalog before it is sent to the external recommender
    pub const PREFILTER: Self = Self {
        threshold: 0.10,
        weights: BoostWeights::PREFILTER,
        max_results: 200,
    };

    /// Final answer when the external recommender is unavailable or unhelpful.
    /// Lexical overlap is weighted more heavily here.
    pub const FALLBACK: Self = Self {
        threshold: 0.05,
        weights: BoostWeights::FALLBACK,
        max_results: 20,
    };
}

/// Ranks a product collection against a free-text query
///
/// Every call normalizes the query, builds a fresh vocabulary from the given
/// products and scores each product by cosine similarity plus lexical boost.
/// Nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct SemanticRanker {
    normalizer: QueryNormalizer,
    config: RankerConfig,
}

impl SemanticRanker {
    pub fn new(normalizer: QueryNormalizer, config: RankerConfig) -> Self {
        Self { normalizer, config }
    }

    pub fn prefilter() -> Self {
        Self::new(QueryNormalizer::standard(), RankerConfig::PREFILTER)
    }

    pub fn fallback() -> Self {
        Self::new(QueryNormalizer::standard(), RankerConfig::FALLBACK)
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    /// Scored products at or above the threshold, best first, ties in input order
    pub fn rank<'a>(&self, query: &str, products: &'a [Product]) -> Vec<ScoredProduct<'a>> {
        let query = self.normalizer.normalize(query);

        let vocabulary = Vocabulary::build(products);
        let query_vector = vocabulary.vectorize(&query);

        tracing::debug!(
            query = %query,
            products = products.len(),
            vocabulary = vocabulary.len(),
            "Scoring products"
        );

        let mut scored: Vec<ScoredProduct<'a>> = products
            .iter()
            .map(|product| {
                let product_vector = vocabulary.vectorize(&product.searchable_text());
                let similarity = cosine_similarity(&query_vector, &product_vector);
                let boost = lexical_boost(&query, product, &self.config.weights);
                ScoredProduct {
                    product,
                    score: similarity + boost,
                }
            })
            .filter(|scored| scored.score >= self.config.threshold)
            .collect();

        // sort_by is stable, so equal scores keep collection order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(self.config.max_results);

        match (scored.first(), scored.last()) {
            (Some(top), Some(lowest)) => tracing::info!(
                query = %query,
                matched = scored.len(),
                threshold = self.config.threshold,
                top_score = top.score,
                lowest_score = lowest.score,
                top_title = %top.product.title,
                "Semantic ranking complete"
            ),
            _ => tracing::info!(
                query = %query,
                available = products.len(),
                "No products matched query"
            ),
        }

        scored
    }

    /// Ranked product ids, best first
    pub fn rank_ids(&self, query: &str, products: &[Product]) -> Vec<String> {
        self.rank(query, products)
            .into_iter()
            .map(|scored| scored.product.product_id.clone())
            .collect()
    }
}
