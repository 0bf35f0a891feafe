pub mod engine;
pub mod merger;
pub mod normalizer;
pub mod ranker;
pub mod recommender;
pub mod similarity;
pub mod text;

pub use engine::{EngineConfig, RecommendationEngine};
pub use merger::{RecommendationSource, Recommendations};
