/*!
 * Translation provider abstraction.
 *
 * A provider turns a completion request into model output; everything above
 * this layer (prompting, batching, retries) is provider-agnostic. The trait
 * is object-safe so the rest of the application can hold an `Arc<dyn
 * Provider>` and tests can substitute a mock.
 */

use async_trait::async_trait;

use crate::errors::ProviderError;

pub mod mock;
pub mod openai;

pub use mock::MockProvider;
pub use openai::OpenAI;

/// A single completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System prompt with the translation instructions
    pub system: String,
    /// User content, a JSON array of source strings
    pub user: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

/// Model output plus token accounting when the API reports it
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Raw model output text
    pub text: String,
    /// Tokens consumed by the prompt, if reported
    pub prompt_tokens: Option<u64>,
    /// Tokens generated, if reported
    pub completion_tokens: Option<u64>,
}

/// Common interface for translation providers
#[async_trait]
pub trait Provider: Send + Sync + std::fmt::Debug {
    /// Execute one completion request
    async fn complete(&self, request: CompletionRequest)
    -> Result<CompletionResponse, ProviderError>;

    /// Short provider name for logs
    fn name(&self) -> &'static str;
}
