use anyhow::{bail, Context, Result};

use crate::scoring::TotalPolicy;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// The shared access password operators must supply to unlock a session.
    pub access_password: String,
    pub anthropic_api_key: String,
    /// Path to the scoring rubric, read once at startup.
    pub rubric_path: String,
    pub spreadsheet_id: String,
    pub sheets_api_token: String,
    /// How a rater-reported total is treated relative to the re-summed one.
    pub total_policy: TotalPolicy,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            access_password: require_env("ACCESS_PASSWORD")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            rubric_path: std::env::var("RUBRIC_PATH")
                .unwrap_or_else(|_| "scoring_instructions.txt".to_string()),
            spreadsheet_id: require_env("SHEETS_SPREADSHEET_ID")?,
            sheets_api_token: require_env("SHEETS_API_TOKEN")?,
            total_policy: parse_total_policy(
                &std::env::var("TOTAL_POLICY").unwrap_or_else(|_| "recompute".to_string()),
            )?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_total_policy(value: &str) -> Result<TotalPolicy> {
    match value.trim().to_lowercase().as_str() {
        "recompute" | "prefer_recomputed" => Ok(TotalPolicy::PreferRecomputed),
        "reported" | "trust_reported" => Ok(TotalPolicy::TrustReported),
        other => bail!("TOTAL_POLICY must be 'recompute' or 'reported', got '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_policy_parses_both_spellings() {
        assert_eq!(
            parse_total_policy("recompute").unwrap(),
            TotalPolicy::PreferRecomputed
        );
        assert_eq!(
            parse_total_policy("trust_reported").unwrap(),
            TotalPolicy::TrustReported
        );
        assert_eq!(
            parse_total_policy(" Reported ").unwrap(),
            TotalPolicy::TrustReported
        );
    }

    #[test]
    fn test_total_policy_rejects_garbage() {
        assert!(parse_total_policy("maybe").is_err());
    }
}
