/*!
 * Core translation service.
 *
 * Builds the prompt, calls the provider and parses the returned JSON array.
 * Rate-limited and malformed responses are retried with doubling backoff up
 * to the configured attempt budget; arrays shorter than the input are not an
 * error, the missing entries fall back to the source text with a diagnostic.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::app_config::{Config, TranslationCommonConfig, TranslationProvider};
use crate::errors::TranslationError;
use crate::language_utils::get_language_name;
use crate::providers::{CompletionRequest, OpenAI, Provider};

/// Result of translating one batch of texts
#[derive(Debug, Default)]
pub struct TranslationOutcome {
    /// Translations, index-aligned with the input texts
    pub translations: Vec<String>,
    /// Prompt tokens reported by the provider
    pub prompt_tokens: u64,
    /// Completion tokens reported by the provider
    pub completion_tokens: u64,
    /// Human-readable notes about degraded results
    pub diagnostics: Vec<String>,
}

/// Provider-agnostic translation service
#[derive(Clone)]
pub struct TranslationService {
    provider: Arc<dyn Provider>,
    common: TranslationCommonConfig,
    source_language: String,
    glossary: HashMap<String, HashMap<String, String>>,
    context_hint: String,
}

impl TranslationService {
    /// Build the service from the application configuration
    pub fn new(config: &Config) -> Self {
        let translation = &config.translation;
        let provider: Arc<dyn Provider> = match translation.provider {
            // LM Studio speaks the OpenAI chat completion API
            TranslationProvider::OpenAI | TranslationProvider::LMStudio => Arc::new(OpenAI::new(
                translation.get_api_key(),
                translation.get_endpoint(),
                translation.get_model(),
                translation.get_timeout_secs(),
            )),
        };

        Self {
            provider,
            common: translation.common.clone(),
            source_language: config.source_language.clone(),
            glossary: config.glossary.clone(),
            context_hint: translation.common.context_hint.clone(),
        }
    }

    /// Build the service around an explicit provider, used by tests
    pub fn with_provider(provider: Arc<dyn Provider>, config: &Config) -> Self {
        Self {
            provider,
            common: config.translation.common.clone(),
            source_language: config.source_language.clone(),
            glossary: config.glossary.clone(),
            context_hint: config.translation.common.context_hint.clone(),
        }
    }

    /// Translate a slice of texts into the target language.
    ///
    /// Returns translations index-aligned with `texts`. Individual entries
    /// may equal the source text when the provider dropped them.
    pub async fn translate_texts(
        &self,
        texts: &[String],
        target_language: &str,
    ) -> Result<TranslationOutcome, TranslationError> {
        if texts.is_empty() {
            return Ok(TranslationOutcome::default());
        }

        let system = self.build_system_prompt(target_language);
        let user = serde_json::to_string(texts)
            .map_err(|e| TranslationError::MalformedResponse(e.to_string()))?;
        let max_tokens = (user.len() as u32).saturating_mul(2).clamp(1024, 16_384);

        let mut backoff_ms = self.common.retry_backoff_ms;
        let mut last_error = String::new();

        for attempt in 1..=self.common.retry_count.max(1) {
            let request = CompletionRequest {
                system: system.clone(),
                user: user.clone(),
                temperature: self.common.temperature,
                max_tokens,
            };

            debug!(
                "Translation request to {} ({} texts, attempt {})",
                self.provider.name(),
                texts.len(),
                attempt
            );

            let result = match self.provider.complete(request).await {
                Ok(response) => {
                    let mut diagnostics = Vec::new();
                    match parse_translations(&response.text, texts, &mut diagnostics) {
                        Ok(translations) => Ok(TranslationOutcome {
                            translations,
                            prompt_tokens: response.prompt_tokens.unwrap_or(0),
                            completion_tokens: response.completion_tokens.unwrap_or(0),
                            diagnostics,
                        }),
                        Err(e) => Err(e),
                    }
                }
                Err(e) => Err(TranslationError::Provider(e)),
            };

            match result {
                Ok(outcome) => return Ok(outcome),
                Err(e) if e.is_retryable() && attempt < self.common.retry_count.max(1) => {
                    warn!(
                        "Translation attempt {} failed ({}), retrying in {} ms",
                        attempt, e, backoff_ms
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms = (backoff_ms * 2).min(self.common.retry_backoff_cap_ms);
                    last_error = e.to_string();
                }
                Err(e) if e.is_retryable() => {
                    last_error = e.to_string();
                }
                Err(e) => return Err(e),
            }
        }

        Err(TranslationError::RetriesExhausted {
            attempts: self.common.retry_count.max(1),
            message: last_error,
        })
    }

    /// Compose the system prompt, including any glossary for the target
    fn build_system_prompt(&self, target_language: &str) -> String {
        let source_name =
            get_language_name(&self.source_language).unwrap_or_else(|_| self.source_language.clone());
        let target_name =
            get_language_name(target_language).unwrap_or_else(|_| target_language.to_string());

        let mut prompt = format!(
            "You are a professional website translator. Translate each string in the \
             user's JSON array from {} to {}.\n\
             Rules:\n\
             - Respond with ONLY a JSON array of strings, the same length and order as the input.\n\
             - Strings may contain HTML tags, attributes, entities and comments; keep all markup \
             exactly as it appears and translate only human-readable text.\n\
             - Strings may be JSON documents; keep them valid JSON with the same structure and \
             translate only human-readable values.\n\
             - Preserve the tone and register of the source text.",
            source_name, target_name
        );

        let glossary = self
            .glossary
            .get(target_language)
            .cloned()
            .unwrap_or_default();
        if !glossary.is_empty() {
            prompt.push_str("\nEnforce this terminology:");
            let mut terms: Vec<_> = glossary.iter().collect();
            terms.sort();
            for (term, translation) in terms {
                if term == translation {
                    prompt.push_str(&format!("\n- Keep '{}' untranslated.", term));
                } else {
                    prompt.push_str(&format!("\n- Render '{}' as '{}'.", term, translation));
                }
            }
        }

        if !self.context_hint.is_empty() {
            prompt.push_str(&format!("\nContext about the site: {}", self.context_hint));
        }

        prompt
    }
}

/// Parse a provider response into translations aligned with `sources`.
///
/// Tolerates code fences and prose around the array. A shorter array is
/// padded with the source texts and recorded as a diagnostic; anything that
/// does not contain a parseable JSON array is a malformed response.
fn parse_translations(
    raw: &str,
    sources: &[String],
    diagnostics: &mut Vec<String>,
) -> Result<Vec<String>, TranslationError> {
    let trimmed = raw.trim();

    let start = trimmed.find('[');
    let end = trimmed.rfind(']');
    let slice = match (start, end) {
        (Some(s), Some(e)) if s < e => &trimmed[s..=e],
        _ => {
            return Err(TranslationError::MalformedResponse(
                "Response contains no JSON array".to_string(),
            ));
        }
    };

    let mut parsed: Vec<String> = serde_json::from_str(slice)
        .map_err(|e| TranslationError::MalformedResponse(e.to_string()))?;

    if parsed.len() < sources.len() {
        let note = format!(
            "Provider returned {} of {} translations; missing entries keep the source text",
            parsed.len(),
            sources.len()
        );
        warn!("{}", note);
        diagnostics.push(note);
        for source in &sources[parsed.len()..] {
            parsed.push(source.clone());
        }
    } else if parsed.len() > sources.len() {
        let note = format!(
            "Provider returned {} translations for {} texts; extra entries dropped",
            parsed.len(),
            sources.len()
        );
        warn!("{}", note);
        diagnostics.push(note);
        parsed.truncate(sources.len());
    }

    Ok(parsed)
}
