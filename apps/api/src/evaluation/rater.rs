//! Automated rating pass — builds the rubric-guided request, invokes the
//! rating collaborator, and turns its reply into per-category raw ratings.
//!
//! The primary path deserializes the canonical JSON payload the prompt asks
//! for and validates it category-by-category; partial payloads are flagged,
//! never silently zero-filled. When the payload does not deserialize at all,
//! the free-text fallback parser takes over.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::evaluation::prompts::RATING_PROMPT_TEMPLATE;
use crate::llm_client::{strip_json_fences, LlmClient};
use crate::scoring::categories::{model_category, MODEL_CATEGORIES};
use crate::scoring::parser::{parse_reply, UNRATED};

/// Which parsing path produced the ratings. Surfaced in every rating
/// response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParserBackend {
    Structured,
    Fallback,
}

/// One entry of the canonical JSON payload. The justification the prompt
/// also asks for stays in the narrative shown to the operator; only the
/// rating token is machine-read.
#[derive(Debug, Clone, Deserialize)]
pub struct RatedCategory {
    pub category: String,
    pub rating: String,
}

/// The canonical JSON payload the rating prompt requests.
#[derive(Debug, Clone, Deserialize)]
pub struct RatingPayload {
    pub ratings: Vec<RatedCategory>,
    #[serde(default)]
    pub reported_total: Option<i64>,
}

/// The automated rater's output, cached in the session until the human
/// reviewer confirms and submits.
#[derive(Debug, Clone, Serialize)]
pub struct AutomatedRating {
    /// The raw reply, shown to the operator for audit.
    pub narrative: String,
    /// Canonical category name → raw token; every automated category is
    /// present, unrated ones as `"N/A"`.
    pub ratings: HashMap<String, String>,
    pub reported_total: Option<i64>,
    pub backend: ParserBackend,
    /// Validation findings worth showing the operator: missing categories,
    /// unrecognized names, a fallback parse. Never fatal.
    pub flags: Vec<String>,
}

/// Builds the user prompt for one rating request.
///
/// Refuses to build a request for an empty CV or an empty role.
pub fn build_rating_prompt(cv_text: &str, role: &str) -> Result<String, AppError> {
    if cv_text.trim().is_empty() {
        return Err(AppError::Precondition(
            "No CV text available — upload a readable document before scoring.".to_string(),
        ));
    }
    if role.trim().is_empty() {
        return Err(AppError::Precondition(
            "Target role must not be empty.".to_string(),
        ));
    }

    let category_list = MODEL_CATEGORIES
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {}", i + 1, c.name))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(RATING_PROMPT_TEMPLATE
        .replace("{role}", role.trim())
        .replace("{category_list}", &category_list)
        .replace("{cv_text}", cv_text))
}

/// Runs one automated rating pass: request → LLM → interpreted reply.
pub async fn rate_cv(
    llm: &LlmClient,
    rubric: &str,
    cv_text: &str,
    role: &str,
) -> Result<AutomatedRating, AppError> {
    let prompt = build_rating_prompt(cv_text, role)?;
    let response = llm
        .call(&prompt, rubric)
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;
    let narrative = response
        .text()
        .ok_or_else(|| AppError::Llm("rating reply contained no text".to_string()))?;

    let rating = interpret_reply(narrative);
    info!(
        backend = ?rating.backend,
        flags = rating.flags.len(),
        "automated rating parsed"
    );
    Ok(rating)
}

/// Turns a rater reply into an `AutomatedRating`: canonical JSON payload
/// first, free-text scraping as the fallback.
pub fn interpret_reply(narrative: &str) -> AutomatedRating {
    match serde_json::from_str::<RatingPayload>(strip_json_fences(narrative)) {
        Ok(payload) => from_payload(payload, narrative),
        Err(e) => {
            debug!("structured payload rejected ({e}), scanning reply text");
            from_fallback(narrative)
        }
    }
}

fn from_payload(payload: RatingPayload, narrative: &str) -> AutomatedRating {
    let mut ratings: HashMap<String, String> = HashMap::new();
    let mut flags = Vec::new();

    for entry in &payload.ratings {
        let Some(category) = model_category(&entry.category) else {
            flags.push(format!("unrecognized category: {}", entry.category));
            continue;
        };
        let token = entry.rating.trim();
        if token.is_empty() {
            flags.push(format!("empty rating for {}", category.name));
            continue;
        }
        // first entry wins; a duplicate never overwrites
        ratings
            .entry(category.name.to_string())
            .or_insert_with(|| token.to_lowercase());
    }

    for category in MODEL_CATEGORIES {
        if !ratings.contains_key(category.name) {
            flags.push(format!("missing rating for {}", category.name));
            ratings.insert(category.name.to_string(), UNRATED.to_string());
        }
    }

    AutomatedRating {
        narrative: narrative.to_string(),
        ratings,
        reported_total: payload.reported_total,
        backend: ParserBackend::Structured,
        flags,
    }
}

fn from_fallback(narrative: &str) -> AutomatedRating {
    let parsed = parse_reply(narrative);
    let mut flags = vec!["structured payload invalid; ratings scraped from reply text".to_string()];
    for name in parsed.missing() {
        flags.push(format!("missing rating for {name}"));
    }

    AutomatedRating {
        narrative: narrative.to_string(),
        ratings: parsed.to_map(),
        reported_total: parsed.reported_total,
        backend: ParserBackend::Fallback,
        flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_PAYLOAD: &str = r#"{
        "ratings": [
            {"category": "Education", "rating": "Strong", "justification": "Top-tier degree."},
            {"category": "Industry Experience", "rating": "moderate"},
            {"category": "Range of Experience", "rating": "sound"},
            {"category": "Benchmark of Career Exposure", "rating": "low"},
            {"category": "Average Length of Stay at Firms", "rating": "strong"},
            {"category": "Within Firm Alignment", "rating": "exceptional"}
        ],
        "reported_total": null
    }"#;

    #[test]
    fn test_prompt_refuses_empty_cv() {
        let err = build_rating_prompt("   \n", "Acme Corp").unwrap_err();
        assert!(matches!(err, AppError::Precondition(_)));
    }

    #[test]
    fn test_prompt_refuses_empty_role() {
        let err = build_rating_prompt("Jane Doe, engineer", "").unwrap_err();
        assert!(matches!(err, AppError::Precondition(_)));
    }

    #[test]
    fn test_prompt_lists_every_category_and_the_role() {
        let prompt = build_rating_prompt("Jane Doe, engineer", "Acme Corp").unwrap();
        for category in MODEL_CATEGORIES {
            assert!(prompt.contains(category.name), "missing {}", category.name);
        }
        assert!(prompt.contains("Acme Corp"));
        assert!(prompt.contains("Jane Doe, engineer"));
        assert!(!prompt.contains("{category_list}"));
    }

    #[test]
    fn test_complete_payload_parses_clean() {
        let rating = interpret_reply(FULL_PAYLOAD);
        assert_eq!(rating.backend, ParserBackend::Structured);
        assert!(rating.flags.is_empty());
        assert_eq!(rating.ratings["Education"], "strong");
        assert_eq!(rating.ratings["Within Firm Alignment"], "exceptional");
        assert_eq!(rating.ratings.len(), 6);
    }

    #[test]
    fn test_fenced_payload_still_structured() {
        let fenced = format!("```json\n{FULL_PAYLOAD}\n```");
        let rating = interpret_reply(&fenced);
        assert_eq!(rating.backend, ParserBackend::Structured);
    }

    #[test]
    fn test_partial_payload_flagged_not_zero_filled_silently() {
        let partial = r#"{"ratings": [{"category": "Education", "rating": "strong"}]}"#;
        let rating = interpret_reply(partial);
        assert_eq!(rating.backend, ParserBackend::Structured);
        assert_eq!(rating.ratings["Education"], "strong");
        assert_eq!(rating.ratings["Range of Experience"], UNRATED);
        assert_eq!(
            rating.flags.iter().filter(|f| f.starts_with("missing")).count(),
            5
        );
    }

    #[test]
    fn test_unrecognized_category_flagged() {
        let payload = r#"{"ratings": [{"category": "Charisma", "rating": "strong"}]}"#;
        let rating = interpret_reply(payload);
        assert!(rating
            .flags
            .iter()
            .any(|f| f.contains("unrecognized category: Charisma")));
    }

    #[test]
    fn test_duplicate_category_first_wins() {
        let payload = r#"{"ratings": [
            {"category": "Education", "rating": "strong"},
            {"category": "Education", "rating": "low"}
        ]}"#;
        let rating = interpret_reply(payload);
        assert_eq!(rating.ratings["Education"], "strong");
    }

    #[test]
    fn test_prose_reply_falls_back_to_text_scanning() {
        let prose = "Education: Strong\nIndustry Experience: Moderate\nTotal: 4\n";
        let rating = interpret_reply(prose);
        assert_eq!(rating.backend, ParserBackend::Fallback);
        assert_eq!(rating.ratings["Education"], "strong");
        assert_eq!(rating.ratings["Industry Experience"], "moderate");
        assert_eq!(rating.reported_total, Some(4));
        assert!(rating.flags[0].contains("scraped"));
    }

    #[test]
    fn test_interpret_is_idempotent() {
        let a = interpret_reply(FULL_PAYLOAD);
        let b = interpret_reply(FULL_PAYLOAD);
        assert_eq!(a.ratings, b.ratings);
        assert_eq!(a.flags, b.flags);
    }
}
