//! External recommender abstraction
//!
//! A generative service may reorder the pre-filtered candidates into a better
//! answer, but the search never depends on it: every failure is classified,
//! logged and collapsed into an empty recommendation list so the fallback
//! ranking takes over.

use reqwest::StatusCode;
use std::{collections::HashSet, sync::Arc, time::Duration};

use crate::models::{ProductFilters, ScoredProduct};

pub mod gemini;
pub mod parse;
pub mod prompt;

pub use gemini::GeminiRecommender;
pub use parse::{parse_recommendations, ParsedReply, UnusableReply};

/// Candidates beyond this many pre-filtered products are never sent out
pub const PROMPT_CANDIDATE_LIMIT: usize = 150;

/// Default ceiling for one external call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Ways an external recommendation can fail. None of them reach the caller.
#[derive(thiserror::Error, Debug)]
pub enum RecommenderError {
    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("network timeout: {0}")]
    NetworkTimeout(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("rate limit or quota exceeded")]
    RateLimited,

    #[error("service temporarily overloaded")]
    Overloaded,

    #[error("model not found: {0}")]
    ModelUnavailable(String),

    #[error("service returned status {status}: {message}")]
    Service { status: u16, message: String },

    #[error("invalid service response: {0}")]
    InvalidResponse(String),

    #[error("recommender task failed: {0}")]
    Task(String),
}

impl RecommenderError {
    /// Classifies a non-success HTTP status
    pub fn from_status(status: StatusCode, body: String, model: &str) -> Self {
        match status {
            StatusCode::TOO_MANY_REQUESTS => RecommenderError::RateLimited,
            StatusCode::SERVICE_UNAVAILABLE => RecommenderError::Overloaded,
            StatusCode::NOT_FOUND => RecommenderError::ModelUnavailable(model.to_string()),
            _ => RecommenderError::Service {
                status: status.as_u16(),
                message: body,
            },
        }
    }
}

impl From<reqwest::Error> for RecommenderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RecommenderError::NetworkTimeout(err.to_string())
        } else if err.is_decode() {
            RecommenderError::InvalidResponse(err.to_string())
        } else {
            RecommenderError::Network(err.to_string())
        }
    }
}

/// A generative service that answers a free-text prompt with free text
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ExternalRecommender: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, RecommenderError>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Runs one bounded recommendation request against an [`ExternalRecommender`]
#[derive(Clone)]
pub struct RecommenderAdapter {
    provider: Arc<dyn ExternalRecommender>,
    timeout: Duration,
    candidate_limit: usize,
}

impl RecommenderAdapter {
    pub fn new(provider: Arc<dyn ExternalRecommender>, timeout: Duration) -> Self {
        Self {
            provider,
            timeout,
            candidate_limit: PROMPT_CANDIDATE_LIMIT,
        }
    }

    pub fn with_candidate_limit(mut self, candidate_limit: usize) -> Self {
        self.candidate_limit = candidate_limit;
        self
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Asks the provider to rank the top candidates
    ///
    /// Returns known product ids in the provider's order, or an empty list on
    /// any failure.
    pub async fn recommend(
        &self,
        query: &str,
        filters: &ProductFilters,
        candidates: &[ScoredProduct<'_>],
        known_ids: &HashSet<&str>,
    ) -> Vec<String> {
        let provider = self.provider.name();
        let candidates = &candidates[..candidates.len().min(self.candidate_limit)];

        let prompt = match prompt::build_prompt(query, filters, candidates) {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::error!(provider, error = %e, "Failed to build recommender prompt");
                return Vec::new();
            }
        };

        tracing::debug!(
            provider,
            candidates = candidates.len(),
            timeout_ms = self.timeout.as_millis() as u64,
            "Requesting external recommendations"
        );

        let reply = match self.generate_with_timeout(prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                log_failure(provider, &e);
                return Vec::new();
            }
        };

        match parse_recommendations(&reply, known_ids) {
            ParsedReply::Recommended(ids) => {
                tracing::info!(provider, count = ids.len(), "External recommender returned results");
                ids
            }
            ParsedReply::Unusable(reason) => {
                tracing::warn!(
                    provider,
                    reason = %reason,
                    "External recommender returned no usable results, using fallback ranking"
                );
                Vec::new()
            }
        }
    }

    /// Races the provider call against the timeout
    ///
    /// The call runs as its own task. If the timer wins, the task handle is
    /// dropped and the call is left to finish on its own; its result is ignored.
    async fn generate_with_timeout(&self, prompt: String) -> Result<String, RecommenderError> {
        let provider = Arc::clone(&self.provider);
        let call = tokio::spawn(async move { provider.generate(&prompt).await });

        tokio::select! {
            joined = call => match joined {
                Ok(result) => result,
                Err(e) => Err(RecommenderError::Task(e.to_string())),
            },
            _ = tokio::time::sleep(self.timeout) => Err(RecommenderError::Timeout(self.timeout)),
        }
    }
}

fn log_failure(provider: &'static str, err: &RecommenderError) {
    match err {
        RecommenderError::Timeout(after) => tracing::warn!(
            provider,
            timeout_ms = after.as_millis() as u64,
            "External recommender timed out, using fallback ranking"
        ),
        RecommenderError::NetworkTimeout(_) => tracing::warn!(
            provider,
            error = %err,
            "Network timeout reaching external recommender, using fallback ranking"
        ),
        RecommenderError::Network(_) => tracing::warn!(
            provider,
            error = %err,
            "Network error reaching external recommender, using fallback ranking"
        ),
        RecommenderError::RateLimited => tracing::warn!(
            provider,
            "External recommender quota exceeded, using fallback ranking"
        ),
        RecommenderError::Overloaded => tracing::warn!(
            provider,
            "External recommender overloaded, using fallback ranking"
        ),
        RecommenderError::ModelUnavailable(model) => tracing::warn!(
            provider,
            model = %model,
            "External recommender model not found, using fallback ranking"
        ),
        RecommenderError::Service { status, .. } => tracing::warn!(
            provider,
            status,
            error = %err,
            "External recommender error, using fallback ranking"
        ),
        RecommenderError::InvalidResponse(_) | RecommenderError::Task(_) => tracing::error!(
            provider,
            error = %err,
            "External recommender failed, using fallback ranking"
        ),
    }
}
