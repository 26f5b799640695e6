/*!
 * Batch translation of extracted units.
 *
 * Units are deduplicated by source text, chunked to the configured batch
 * size and sent sequentially through the translation service. Results are
 * resolved back to unit keys; units whose translation went missing or came
 * back empty keep their source text.
 */

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::errors::TranslationError;
use crate::html::TranslationUnit;
use crate::translation::core::TranslationService;

/// Translations for one document and one target language
#[derive(Debug, Default)]
pub struct TranslatedUnits {
    /// Unit key to translated text
    pub by_key: HashMap<String, String>,
    /// Prompt tokens across all requests
    pub prompt_tokens: u64,
    /// Completion tokens across all requests
    pub completion_tokens: u64,
    /// Notes about degraded results, collected across requests
    pub diagnostics: Vec<String>,
    /// Units that fell back to their source text
    pub fallback_count: usize,
    /// Number of provider requests made
    pub request_count: usize,
}

impl TranslatedUnits {
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Splits unit lists into provider-sized requests
pub struct BatchTranslator {
    service: TranslationService,
    batch_size: usize,
}

impl BatchTranslator {
    pub fn new(service: TranslationService, batch_size: usize) -> Self {
        Self {
            service,
            batch_size: batch_size.max(1),
        }
    }

    /// Translate all units into the target language.
    ///
    /// Identical source texts are sent once and fan back out to every unit
    /// that carried them.
    pub async fn translate_units(
        &self,
        units: &[TranslationUnit],
        target_language: &str,
    ) -> Result<TranslatedUnits, TranslationError> {
        let mut result = TranslatedUnits::default();
        if units.is_empty() {
            return Ok(result);
        }

        // Dedup while preserving first-seen order
        let mut seen = HashSet::new();
        let mut unique: Vec<String> = Vec::new();
        for unit in units {
            if seen.insert(unit.text.as_str()) {
                unique.push(unit.text.clone());
            }
        }

        debug!(
            "Translating {} units ({} unique texts) into {}",
            units.len(),
            unique.len(),
            target_language
        );

        let mut by_text: HashMap<String, String> = HashMap::new();
        for chunk in unique.chunks(self.batch_size) {
            let outcome = self.service.translate_texts(chunk, target_language).await?;
            result.request_count += 1;
            result.prompt_tokens += outcome.prompt_tokens;
            result.completion_tokens += outcome.completion_tokens;
            result.diagnostics.extend(outcome.diagnostics);

            for (source, translated) in chunk.iter().zip(outcome.translations) {
                by_text.insert(source.clone(), translated);
            }
        }

        for unit in units {
            let translated = match by_text.get(&unit.text) {
                Some(t) if !t.trim().is_empty() => t.clone(),
                _ => {
                    result.fallback_count += 1;
                    unit.text.clone()
                }
            };
            result.by_key.insert(unit.key.clone(), translated);
        }

        Ok(result)
    }
}
