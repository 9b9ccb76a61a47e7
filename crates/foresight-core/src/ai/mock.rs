//! Mock backend for testing
//!
//! Returns a predictable narrative without a running LLM server. Can be
//! configured to fail or to respond slowly so timeout handling can be
//! exercised.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::NarrativeBackend;

/// Mock AI backend for testing
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Fixed reply; a canned summary of the prompt when unset
    pub reply: Option<String>,
    /// Return an error from `enrich`
    pub fail: bool,
    /// Sleep before answering
    pub delay: Option<Duration>,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            ..Default::default()
        }
    }

    /// Create an unhealthy mock backend whose calls fail
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            fail: true,
            ..Default::default()
        }
    }

    /// Always answer with `reply`
    pub fn with_reply(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            ..Self::new()
        }
    }

    /// Answer only after `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl NarrativeBackend for MockBackend {
    async fn enrich(&self, prompt: &str) -> Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(Error::InvalidData("Mock backend failure".into()));
        }
        Ok(match &self.reply {
            Some(reply) => reply.clone(),
            None => format!(
                "Mock narrative for: {}",
                prompt.lines().next().unwrap_or_default()
            ),
        })
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
