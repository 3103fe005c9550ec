// SPDX-License-Identifier: MIT

//! AI-generated motivational messages (Gemini).
//!
//! Strictly best-effort: an unconfigured key or any API failure produces
//! a canned Norwegian fallback instead of an error. Logging progress must
//! never fail because the motivation call did.

use std::time::Duration;

/// Returned when no Gemini API key is configured.
const FALLBACK_NOT_CONFIGURED: &str = "Godt jobbet! (AI er ikke konfigurert)";

/// Returned when the Gemini call fails for any reason.
const FALLBACK_ON_ERROR: &str = "Godt jobbet! Fortsett slik!";

/// Description fallback when no Gemini API key is configured.
const FALLBACK_DESCRIPTION_NOT_CONFIGURED: &str = "En spennende utfordring!";

/// Description fallback when the Gemini call fails.
const FALLBACK_DESCRIPTION_ON_ERROR: &str = "Bli med venner og nå målene deres sammen!";

/// Gemini client for short motivational messages.
#[derive(Clone)]
pub struct MotivationService {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl MotivationService {
    /// Create a new service. `api_key` of `None` disables the feature.
    pub fn new(api_key: Option<String>, timeout_secs: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key,
        }
    }

    /// Generate a short motivational message for a freshly logged amount.
    pub async fn motivate_log(&self, amount: f64, unit: &str, challenge_title: &str) -> String {
        let Some(api_key) = &self.api_key else {
            return FALLBACK_NOT_CONFIGURED.to_string();
        };

        let prompt = format!(
            "Generer en kort, morsom og motiverende melding på norsk til en bruker \
             som nettopp logget {} {} i utfordringen \"{}\". Hold det under 20 ord.",
            amount, unit, challenge_title
        );

        match self.generate(api_key, &prompt).await {
            Some(text) => text,
            None => FALLBACK_ON_ERROR.to_string(),
        }
    }

    /// Generate a short challenge description from its title, used when
    /// a challenge is created without one.
    pub async fn describe_challenge(&self, title: &str) -> String {
        let Some(api_key) = &self.api_key else {
            return FALLBACK_DESCRIPTION_NOT_CONFIGURED.to_string();
        };

        let prompt = format!(
            "Lag en engasjerende og kort beskrivelse (max 30 ord) på norsk for en \
             utfordring som heter \"{}\". Fokuser på samhold og konkurranse.",
            title
        );

        match self.generate(api_key, &prompt).await {
            Some(text) => text,
            None => FALLBACK_DESCRIPTION_ON_ERROR.to_string(),
        }
    }

    /// Call the generateContent endpoint; `None` on any failure.
    async fn generate(&self, api_key: &str, prompt: &str) -> Option<String> {
        let url = format!(
            "{}/models/gemini-pro:generateContent?key={}",
            self.base_url,
            urlencoding::encode(api_key)
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = match self.http.post(&url).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "Gemini request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Gemini returned an error");
            return None;
        }

        let payload: serde_json::Value = response.json().await.ok()?;
        extract_text(&payload)
    }
}

/// Pull the first candidate's text out of a generateContent response.
fn extract_text(payload: &serde_json::Value) -> Option<String> {
    let text = payload
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()?
        .trim();

    if text.is_empty() {
        return None;
    }
    Some(text.to_string())
}
