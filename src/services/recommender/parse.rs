//! Extraction of product ids from free-text recommender replies
//!
//! Grammar: the reply must contain a bracketed list (first `[` through the
//! last `]`), the list must parse as a JSON array, and only string elements
//! naming a known product survive. Anything else is an unusable reply.

use serde_json::Value;
use std::collections::HashSet;

use crate::services::merger::MAX_RECOMMENDATIONS;

/// Outcome of parsing a recommender reply
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedReply {
    Recommended(Vec<String>),
    Unusable(UnusableReply),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UnusableReply {
    #[error("reply contains no bracketed list")]
    NoList,
    #[error("bracketed list is not a valid JSON array")]
    Malformed,
    #[error("reply names no known product ids")]
    NoKnownIds,
}

/// Parses a reply into at most [`MAX_RECOMMENDATIONS`] distinct known ids, in reply order
pub fn parse_recommendations(text: &str, known_ids: &HashSet<&str>) -> ParsedReply {
    let Some(list) = bracketed_list(text) else {
        return ParsedReply::Unusable(UnusableReply::NoList);
    };

    let values: Vec<Value> = match serde_json::from_str(list) {
        Ok(values) => values,
        Err(e) => {
            tracing::debug!(error = %e, "Recommender reply list failed to parse");
            return ParsedReply::Unusable(UnusableReply::Malformed);
        }
    };

    let mut seen = HashSet::new();
    let ids: Vec<String> = values
        .into_iter()
        .filter_map(|value| match value {
            Value::String(id) => Some(id),
            _ => None,
        })
        .filter(|id| known_ids.contains(id.as_str()))
        .filter(|id| seen.insert(id.clone()))
        .take(MAX_RECOMMENDATIONS)
        .collect();

    if ids.is_empty() {
        ParsedReply::Unusable(UnusableReply::NoKnownIds)
    } else {
        ParsedReply::Recommended(ids)
    }
}

/// Slice from the first `[` through the last `]`
fn bracketed_list(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known() -> HashSet<&'static str> {
        ["PROD001", "PROD002", "PROD003"].into_iter().collect()
    }

    #[test]
    fn test_parses_plain_array() {
        let reply = r#"["PROD002", "PROD001"]"#;
        assert_eq!(
            parse_recommendations(reply, &known()),
            ParsedReply::Recommended(vec!["PROD002".to_string(), "PROD001".to_string()])
        );
    }

    #[test]
    fn test_parses_array_wrapped_in_prose_and_fences() {
        let reply = "Here are my picks:\n```json\n[\"PROD003\",\n \"PROD001\"]\n```\nEnjoy!";
        assert_eq!(
            parse_recommendations(reply, &known()),
            ParsedReply::Recommended(vec!["PROD003".to_string(), "PROD001".to_string()])
        );
    }

    #[test]
    fn test_drops_hallucinated_and_non_string_ids() {
        let reply = r#"["PROD999", 42, null, "PROD001", {"id": "PROD002"}]"#;
        assert_eq!(
            parse_recommendations(reply, &known()),
            ParsedReply::Recommended(vec!["PROD001".to_string()])
        );
    }

    #[test]
    fn test_drops_repeated_ids() {
        let reply = r#"["PROD001", "PROD002", "PROD001"]"#;
        assert_eq!(
            parse_recommendations(reply, &known()),
            ParsedReply::Recommended(vec!["PROD001".to_string(), "PROD002".to_string()])
        );
    }

    #[test]
    fn test_truncates_to_max_recommendations() {
        let ids: Vec<String> = (0..30).map(|i| format!("ID{:02}", i)).collect();
        let known: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let reply = serde_json::to_string(&ids).unwrap();

        match parse_recommendations(&reply, &known) {
            ParsedReply::Recommended(parsed) => {
                assert_eq!(parsed.len(), MAX_RECOMMENDATIONS);
                assert_eq!(parsed[0], "ID00");
                assert_eq!(parsed[19], "ID19");
            }
            other => panic!("expected recommendations, got {:?}", other),
        }
    }

    #[test]
    fn test_reply_without_list() {
        assert_eq!(
            parse_recommendations("I could not find anything relevant.", &known()),
            ParsedReply::Unusable(UnusableReply::NoList)
        );
        assert_eq!(
            parse_recommendations("] backwards [", &known()),
            ParsedReply::Unusable(UnusableReply::NoList)
        );
    }

    #[test]
    fn test_malformed_list() {
        assert_eq!(
            parse_recommendations("[PROD001, PROD002]", &known()),
            ParsedReply::Unusable(UnusableReply::Malformed)
        );
    }

    #[test]
    fn test_empty_or_unknown_list() {
        assert_eq!(
            parse_recommendations("[]", &known()),
            ParsedReply::Unusable(UnusableReply::NoKnownIds)
        );
        assert_eq!(
            parse_recommendations(r#"["NOPE"]"#, &known()),
            ParsedReply::Unusable(UnusableReply::NoKnownIds)
        );
    }
}
