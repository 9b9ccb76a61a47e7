//! Optional narrative enrichment
//!
//! A `Narrator` asks an AI backend for a short plain-language summary of a
//! result. It never fails: errors, empty answers and timeouts all degrade to
//! `NARRATIVE_FALLBACK`.

use std::time::Duration;

use tracing::{debug, warn};

use crate::ai::{AIClient, NarrativeBackend};
use crate::models::Trend;
use crate::money::Money;

/// Text used whenever enrichment is unavailable
pub const NARRATIVE_FALLBACK: &str = "Analysis unavailable at this time.";

/// Numbers the narrative is written from
#[derive(Debug, Clone)]
pub struct NarrativePrompt {
    pub predicted_expense: Money,
    pub confidence: u8,
    pub trend: Trend,
    pub monthly_income: Money,
    /// Name and target amount of a goal to mention
    pub goal: Option<(String, Money)>,
    /// Symbol amounts are written with
    pub currency_symbol: String,
}

impl NarrativePrompt {
    /// Render the prompt sent to the backend
    pub fn render(&self) -> String {
        let mut prompt = String::from(
            "You are a concise personal finance assistant. Using only the figures below, \
             write 2-3 short sentences of practical insight. Do not invent numbers.\n\n",
        );
        let symbol = self.currency_symbol.as_str();
        prompt.push_str(&format!(
            "Predicted expenses next month: {}\n",
            self.predicted_expense.format_with_symbol(symbol)
        ));
        prompt.push_str(&format!("Forecast confidence: {}%\n", self.confidence));
        prompt.push_str(&format!("Spending trend: {}\n", self.trend));
        prompt.push_str(&format!(
            "Average monthly income: {}\n",
            self.monthly_income.format_with_symbol(symbol)
        ));
        if let Some((name, amount)) = &self.goal {
            prompt.push_str(&format!(
                "Savings goal: {} ({})\n",
                name,
                amount.format_with_symbol(symbol)
            ));
        }
        prompt
    }
}

/// Wraps an AI client with a timeout and a fixed fallback
#[derive(Clone)]
pub struct Narrator {
    client: AIClient,
    timeout: Duration,
}

impl Narrator {
    pub fn new(client: AIClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Build from `AI_BACKEND` and friends; None when no backend is configured
    pub fn from_env(timeout: Duration) -> Option<Self> {
        AIClient::from_env().map(|client| Self::new(client, timeout))
    }

    pub fn client(&self) -> &AIClient {
        &self.client
    }

    /// Generate narrative text for a forecast, or the fallback
    pub async fn narrate(&self, prompt: &NarrativePrompt) -> String {
        self.narrate_text(&prompt.render()).await
    }

    /// Send an already-rendered prompt, or return the fallback
    pub async fn narrate_text(&self, prompt: &str) -> String {
        match tokio::time::timeout(self.timeout, self.client.enrich(prompt)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                debug!(model = self.client.model(), "Narrative generated");
                text.trim().to_string()
            }
            Ok(Ok(_)) => {
                warn!(model = self.client.model(), "Narrative backend returned empty text");
                NARRATIVE_FALLBACK.to_string()
            }
            Ok(Err(e)) => {
                warn!(
                    host = self.client.host(),
                    "Narrative enrichment failed: {}", e
                );
                NARRATIVE_FALLBACK.to_string()
            }
            Err(_) => {
                warn!(
                    host = self.client.host(),
                    "Narrative enrichment timed out after {:?}", self.timeout
                );
                NARRATIVE_FALLBACK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;

    fn prompt() -> NarrativePrompt {
        NarrativePrompt {
            predicted_expense: Money::from_minor(113_333),
            confidence: 92,
            trend: Trend::Increasing,
            monthly_income: Money::from_minor(400_000),
            goal: Some(("House".to_string(), Money::from_minor(5_000_000))),
            currency_symbol: "$".to_string(),
        }
    }

    #[test]
    fn test_render_includes_figures() {
        let text = prompt().render();
        assert!(text.contains("$1133.33"));
        assert!(text.contains("92%"));
        assert!(text.contains("increasing"));
        assert!(text.contains("House ($50000.00)"));

        let mut euro = prompt();
        euro.currency_symbol = "€".to_string();
        let text = euro.render();
        assert!(text.contains("€1133.33"));
        assert!(!text.contains('$'));
    }

    #[tokio::test]
    async fn test_narrate_success() {
        let narrator = Narrator::new(
            AIClient::Mock(MockBackend::with_reply("  Spending is up.  ")),
            Duration::from_secs(1),
        );
        assert_eq!(narrator.narrate(&prompt()).await, "Spending is up.");
    }

    #[tokio::test]
    async fn test_narrate_failure_falls_back() {
        let narrator = Narrator::new(AIClient::Mock(MockBackend::unhealthy()), Duration::from_secs(1));
        assert_eq!(narrator.narrate(&prompt()).await, NARRATIVE_FALLBACK);
    }

    #[tokio::test]
    async fn test_narrate_empty_falls_back() {
        let narrator = Narrator::new(
            AIClient::Mock(MockBackend::with_reply("   ")),
            Duration::from_secs(1),
        );
        assert_eq!(narrator.narrate(&prompt()).await, NARRATIVE_FALLBACK);
    }

    #[tokio::test]
    async fn test_narrate_timeout_falls_back() {
        let slow = MockBackend::new().with_delay(Duration::from_millis(500));
        let narrator = Narrator::new(AIClient::Mock(slow), Duration::from_millis(20));
        assert_eq!(narrator.narrate(&prompt()).await, NARRATIVE_FALLBACK);
    }
}
