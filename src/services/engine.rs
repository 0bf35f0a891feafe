use std::{collections::HashSet, sync::Arc, time::Duration};

use crate::{
    models::{Product, ProductFilters},
    services::{
        merger::{merge, Recommendations},
        normalizer::QueryNormalizer,
        ranker::{RankerConfig, SemanticRanker},
        recommender::{
            ExternalRecommender, RecommenderAdapter, DEFAULT_TIMEOUT, PROMPT_CANDIDATE_LIMIT,
        },
    },
};

/// Static configuration of the recommendation engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub prefilter: RankerConfig,
    pub fallback: RankerConfig,
    /// Pre-filtered products sent to the external recommender
    pub candidate_limit: usize,
    pub recommender_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            prefilter: RankerConfig::PREFILTER,
            fallback: RankerConfig::FALLBACK,
            candidate_limit: PROMPT_CANDIDATE_LIMIT,
            recommender_timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Hybrid product recommendation for one search request
///
/// The fallback ranking always runs. When an external recommender is
/// configured, it ranks the pre-filtered candidates and its picks lead the
/// result; it never causes the search to fail.
#[derive(Clone)]
pub struct RecommendationEngine {
    normalizer: QueryNormalizer,
    prefilter: SemanticRanker,
    fallback: SemanticRanker,
    adapter: Option<RecommenderAdapter>,
}

impl RecommendationEngine {
    pub fn new(config: EngineConfig, recommender: Option<Arc<dyn ExternalRecommender>>) -> Self {
        let normalizer = QueryNormalizer::standard();
        let adapter = recommender.map(|provider| {
            RecommenderAdapter::new(provider, config.recommender_timeout)
                .with_candidate_limit(config.candidate_limit)
        });

        Self {
            prefilter: SemanticRanker::new(normalizer.clone(), config.prefilter),
            fallback: SemanticRanker::new(normalizer.clone(), config.fallback),
            normalizer,
            adapter,
        }
    }

    /// Engine that never consults an external service
    pub fn fallback_only() -> Self {
        Self::new(EngineConfig::default(), None)
    }

    pub fn has_external_recommender(&self) -> bool {
        self.adapter.is_some()
    }

    pub async fn recommend(
        &self,
        query: &str,
        filters: &ProductFilters,
        products: &[Product],
    ) -> Recommendations {
        let query = self.normalizer.normalize(query);
        if query.is_empty() {
            return Recommendations::empty();
        }

        tracing::info!(
            query = %query,
            filters = %filters,
            products = products.len(),
            "Processing recommendation request"
        );

        let external = match &self.adapter {
            Some(adapter) => self.external_ids(adapter, &query, filters, products).await,
            None => {
                tracing::info!("External recommender not configured, using fallback ranking");
                Vec::new()
            }
        };

        let fallback = self.fallback.rank_ids(&query, products);
        let recommendations = merge(external, fallback);

        tracing::info!(
            query = %query,
            source = ?recommendations.source,
            count = recommendations.ids.len(),
            "Returning recommendations"
        );

        recommendations
    }

    async fn external_ids(
        &self,
        adapter: &RecommenderAdapter,
        query: &str,
        filters: &ProductFilters,
        products: &[Product],
    ) -> Vec<String> {
        let candidates = self.prefilter.rank(query, products);
        if candidates.is_empty() {
            tracing::info!(
                provider = adapter.provider_name(),
                "No candidates passed the pre-filter, skipping external recommender"
            );
            return Vec::new();
        }

        let known_ids: HashSet<&str> = products.iter().map(|p| p.product_id.as_str()).collect();
        adapter.recommend(query, filters, &candidates, &known_ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::merger::RecommendationSource;
    use crate::services::recommender::{MockExternalRecommender, RecommenderError};

    fn unrelated_products(count: usize) -> Vec<Product> {
        (0..count)
            .map(|i| {
                Product::new(
                    format!("HOME{:03}", i),
                    format!("Kitchen Widget {}", i),
                    "Home",
                    "Kitchen",
                    12.0,
                )
            })
            .collect()
    }

    fn catalog_with_shoe() -> Vec<Product> {
        let mut products = unrelated_products(50);
        products.push(
            Product::new("SHOE001", "Premium Shoes Series 3", "Fashion", "Footwear", 45.0)
                .with_color("Red"),
        );
        products
    }

    fn engine_with(mock: MockExternalRecommender) -> RecommendationEngine {
        RecommendationEngine::new(EngineConfig::default(), Some(Arc::new(mock)))
    }

    fn mock_replying(reply: Result<String, RecommenderError>) -> MockExternalRecommender {
        let mut mock = MockExternalRecommender::new();
        mock.expect_name().return_const("mock");
        mock.expect_generate().times(1).return_once(move |_| reply);
        mock
    }

    #[tokio::test]
    async fn test_external_failure_falls_back_to_semantic_ranking() {
        let products = catalog_with_shoe();
        let engine = engine_with(mock_replying(Err(RecommenderError::Network(
            "fetch failed".to_string(),
        ))));

        let filters = ProductFilters {
            color: Some("Red".to_string()),
            max_price: Some(100.0),
            ..Default::default()
        };
        let result = engine.recommend("red shoes under 100", &filters, &products).await;

        assert_eq!(result.source, RecommendationSource::Fallback);
        assert_eq!(result.ids.first().map(String::as_str), Some("SHOE001"));
    }

    #[tokio::test]
    async fn test_external_ids_lead_and_fallback_fills() {
        let products = catalog_with_shoe();
        let engine = engine_with(mock_replying(Ok(r#"["HOME007", "SHOE001"]"#.to_string())));

        let result = engine
            .recommend("shoes", &ProductFilters::default(), &products)
            .await;

        assert_eq!(result.source, RecommendationSource::Hybrid);
        assert_eq!(result.ids, vec!["HOME007", "SHOE001"]);
    }

    #[tokio::test]
    async fn test_hallucinated_only_reply_uses_fallback() {
        let products = catalog_with_shoe();
        let engine = engine_with(mock_replying(Ok(r#"["NOT_A_PRODUCT"]"#.to_string())));

        let result = engine
            .recommend("premium shoes", &ProductFilters::default(), &products)
            .await;

        assert_eq!(result.source, RecommendationSource::Fallback);
        assert_eq!(result.ids, vec!["SHOE001"]);
    }

    #[tokio::test]
    async fn test_empty_query_does_no_work() {
        let mut mock = MockExternalRecommender::new();
        mock.expect_name().return_const("mock");
        mock.expect_generate().times(0);
        let engine = engine_with(mock);

        let result = engine
            .recommend("   ", &ProductFilters::default(), &catalog_with_shoe())
            .await;
        assert!(result.ids.is_empty());
    }

    #[tokio::test]
    async fn test_no_prefilter_candidates_skips_external_call() {
        let mut mock = MockExternalRecommender::new();
        mock.expect_name().return_const("mock");
        mock.expect_generate().times(0);
        let engine = engine_with(mock);

        let result = engine
            .recommend("telescope", &ProductFilters::default(), &unrelated_products(10))
            .await;
        assert!(result.ids.is_empty());
        assert_eq!(result.source, RecommendationSource::Fallback);
    }

    #[tokio::test]
    async fn test_fallback_only_engine() {
        let engine = RecommendationEngine::fallback_only();
        assert!(!engine.has_external_recommender());

        let products = vec![
            Product::new("P1", "Garden Hose", "Home", "Garden", 25.0),
            Product::new("P2", "Smartphone Case", "Electronics", "Accessories", 15.0),
        ];
        let result = engine
            .recommend("fone case", &ProductFilters::default(), &products)
            .await;
        assert_eq!(result.ids, vec!["P2"]);
    }

    #[tokio::test]
    async fn test_result_never_exceeds_twenty() {
        let products = unrelated_products(80);
        let reply: Vec<String> = products.iter().take(30).map(|p| p.product_id.clone()).collect();
        let engine = engine_with(mock_replying(Ok(serde_json::to_string(&reply).unwrap())));

        let result = engine
            .recommend("kitchen widget", &ProductFilters::default(), &products)
            .await;
        assert_eq!(result.ids.len(), 20);
    }
}
