/*!
 * Mock provider for tests.
 *
 * Translates deterministically from a dictionary and can simulate the
 * failure modes the retry logic cares about: rate limiting, truncated
 * arrays, malformed output and hard request failures. Every request body is
 * captured so tests can assert on what was actually sent.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use std::sync::Mutex;

use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, CompletionResponse, Provider};

/// What the mock does with each request
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Translate every input via the dictionary (identity for unknown text)
    Working,
    /// Translate, then drop the last `drop` entries from the array
    Short { drop: usize },
    /// Rate-limit the first `failures` requests, then behave as Working
    RateLimitedFirst { failures: usize },
    /// Return output that is not a JSON array
    Malformed,
    /// Fail every request at the transport level
    Failing,
}

/// Configurable in-memory provider
#[derive(Debug, Clone)]
pub struct MockProvider {
    behavior: MockBehavior,
    dictionary: HashMap<String, String>,
    request_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    pub fn working() -> Self {
        Self::with_behavior(MockBehavior::Working)
    }

    pub fn with_dictionary(dictionary: HashMap<String, String>) -> Self {
        Self {
            dictionary,
            ..Self::working()
        }
    }

    pub fn short(drop: usize) -> Self {
        Self::with_behavior(MockBehavior::Short { drop })
    }

    pub fn rate_limited_first(failures: usize) -> Self {
        Self::with_behavior(MockBehavior::RateLimitedFirst { failures })
    }

    pub fn malformed() -> Self {
        Self::with_behavior(MockBehavior::Malformed)
    }

    pub fn failing() -> Self {
        Self::with_behavior(MockBehavior::Failing)
    }

    fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            dictionary: HashMap::new(),
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a dictionary entry
    pub fn learn(&mut self, source: &str, translation: &str) {
        self.dictionary
            .insert(source.to_string(), translation.to_string());
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// User payloads of every request received so far
    pub fn captured_requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn translate(&self, texts: &[String]) -> Vec<String> {
        texts
            .iter()
            .map(|text| {
                self.dictionary
                    .get(text)
                    .cloned()
                    .unwrap_or_else(|| text.clone())
            })
            .collect()
    }

    fn respond(&self, texts: &[String]) -> CompletionResponse {
        let translations = self.translate(texts);
        CompletionResponse {
            text: serde_json::to_string(&translations).unwrap_or_default(),
            prompt_tokens: Some(texts.len() as u64 * 10),
            completion_tokens: Some(translations.len() as u64 * 10),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.user.clone());
        }

        let texts: Vec<String> = serde_json::from_str(&request.user).unwrap_or_default();

        match &self.behavior {
            MockBehavior::Working => Ok(self.respond(&texts)),
            MockBehavior::Short { drop } => {
                let mut translations = self.translate(&texts);
                let keep = translations.len().saturating_sub(*drop);
                translations.truncate(keep);
                Ok(CompletionResponse {
                    text: serde_json::to_string(&translations).unwrap_or_default(),
                    prompt_tokens: None,
                    completion_tokens: None,
                })
            }
            MockBehavior::RateLimitedFirst { failures } => {
                if count <= *failures {
                    Err(ProviderError::RateLimitExceeded(
                        "mock rate limit".to_string(),
                    ))
                } else {
                    Ok(self.respond(&texts))
                }
            }
            MockBehavior::Malformed => Ok(CompletionResponse {
                text: "I would rather chat about something else.".to_string(),
                prompt_tokens: None,
                completion_tokens: None,
            }),
            MockBehavior::Failing => Err(ProviderError::RequestFailed(
                "mock transport failure".to_string(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
