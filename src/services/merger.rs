use serde::Serialize;
use std::collections::HashSet;

/// Upper bound on ids returned for one search
pub const MAX_RECOMMENDATIONS: usize = 20;

/// Leading positions flagged as highly recommended
pub const HIGHLY_RECOMMENDED_COUNT: usize = 5;

/// Which rankings contributed to a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    /// External recommender ids, topped up from the fallback ranking
    Hybrid,
    Fallback,
}

/// Final ordered product ids for one search, best first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendations {
    pub ids: Vec<String>,
    pub source: RecommendationSource,
}

impl Recommendations {
    pub fn empty() -> Self {
        Self {
            ids: Vec::new(),
            source: RecommendationSource::Fallback,
        }
    }

    pub fn is_highly_recommended(position: usize) -> bool {
        position < HIGHLY_RECOMMENDED_COUNT
    }
}

/// Combines external and fallback rankings
///
/// External ids keep their order and go first; fallback ids not already
/// present fill the remaining slots up to [`MAX_RECOMMENDATIONS`]. With no
/// external ids the fallback ranking is returned as is.
pub fn merge(external: Vec<String>, fallback: Vec<String>) -> Recommendations {
    if external.is_empty() {
        return Recommendations {
            ids: fallback,
            source: RecommendationSource::Fallback,
        };
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut ids = Vec::with_capacity(MAX_RECOMMENDATIONS);

    for id in external.into_iter().chain(fallback) {
        if ids.len() >= MAX_RECOMMENDATIONS {
            break;
        }
        if seen.insert(id.clone()) {
            ids.push(id);
        }
    }

    Recommendations {
        ids,
        source: RecommendationSource::Hybrid,
    }
}
