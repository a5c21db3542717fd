// LLM prompt constants for the evaluation module. The rubric itself is NOT
// here — it is loaded from disk at startup and sent verbatim as the system
// instructions, so rubric edits never require a redeploy.

/// Rating prompt template. Replace `{role}`, `{category_list}`, and
/// `{cv_text}` before sending.
///
/// This is the one canonical output layout: a JSON payload rather than prose
/// with a recap line. The free-text fallback parser covers replies that
/// drift from it.
pub const RATING_PROMPT_TEMPLATE: &str = r#"You are an evaluator scoring a candidate CV for a role at "{role}".

You MUST evaluate the CV using the rubric provided in the system instructions. Do NOT invent criteria not found in the rubric. Your goal is to return word-based ratings only, strictly using rubric-defined terms (e.g. low, moderate, sound, strong, exceptional).

Score exactly these categories, in this order:
{category_list}

Return a JSON object with this EXACT schema (no extra fields):
{
  "ratings": [
    {"category": "Education", "rating": "strong", "justification": "One short sentence."}
  ],
  "reported_total": null
}

HARD RULES:
1. `ratings` MUST contain exactly one entry per category listed above, using the exact category names.
2. `rating` MUST be a single rubric term. Do not calculate numeric scores yourself.
3. Leave `reported_total` as null.
4. Respond with valid JSON only. Do NOT include any text outside the JSON object. Do NOT use markdown code fences.

CV:
"""
{cv_text}
"""
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_has_all_placeholders() {
        assert!(RATING_PROMPT_TEMPLATE.contains("{role}"));
        assert!(RATING_PROMPT_TEMPLATE.contains("{category_list}"));
        assert!(RATING_PROMPT_TEMPLATE.contains("{cv_text}"));
    }
}
