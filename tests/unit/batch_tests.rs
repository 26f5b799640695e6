/*!
 * Tests for batch translation of unit lists
 */

use std::sync::Arc;

use weblingo::app_config::Config;
use weblingo::html::TranslationUnit;
use weblingo::providers::MockProvider;
use weblingo::translation::{BatchTranslator, TranslationService};

fn unit(key: &str, text: &str) -> TranslationUnit {
    TranslationUnit {
        key: key.to_string(),
        text: text.to_string(),
    }
}

fn translator(provider: MockProvider, batch_size: usize) -> BatchTranslator {
    let mut config = Config::default();
    config.translation.common.retry_backoff_ms = 1;
    let service = TranslationService::with_provider(Arc::new(provider), &config);
    BatchTranslator::new(service, batch_size)
}

#[tokio::test]
async fn test_translate_units_withDuplicateTexts_shouldSendEachTextOnce() {
    let mut provider = MockProvider::working();
    provider.learn("Read more", "Leer más");
    let probe = provider.clone();

    let units = vec![
        unit("BLOCK#0", "Read more"),
        unit("BLOCK#1", "Read more"),
        unit("BLOCK#2", "Read more"),
    ];

    let result = translator(provider, 20)
        .translate_units(&units, "es")
        .await
        .unwrap();

    let requests = probe.captured_requests();
    assert_eq!(requests.len(), 1);
    let sent: Vec<String> = serde_json::from_str(&requests[0]).unwrap();
    assert_eq!(sent, vec!["Read more"]);

    // Every unit resolves to the shared translation
    assert_eq!(result.by_key.get("BLOCK#0").unwrap(), "Leer más");
    assert_eq!(result.by_key.get("BLOCK#2").unwrap(), "Leer más");
}

#[tokio::test]
async fn test_translate_units_withManyTexts_shouldChunkByBatchSize() {
    let provider = MockProvider::working();
    let probe = provider.clone();

    let units: Vec<TranslationUnit> = (0..5)
        .map(|i| unit(&format!("BLOCK#{}", i), &format!("Text {}", i)))
        .collect();

    let result = translator(provider, 2)
        .translate_units(&units, "es")
        .await
        .unwrap();

    assert_eq!(probe.request_count(), 3);
    assert_eq!(result.request_count, 3);
    assert_eq!(result.by_key.len(), 5);
}

#[tokio::test]
async fn test_translate_units_withEmptyTranslation_shouldFallBackToSource() {
    let mut provider = MockProvider::working();
    provider.learn("Hello", "");

    let units = vec![unit("BLOCK#0", "Hello")];
    let result = translator(provider, 20)
        .translate_units(&units, "es")
        .await
        .unwrap();

    assert_eq!(result.by_key.get("BLOCK#0").unwrap(), "Hello");
    assert_eq!(result.fallback_count, 1);
}

#[tokio::test]
async fn test_translate_units_withNoUnits_shouldNotCallProvider() {
    let provider = MockProvider::working();
    let probe = provider.clone();

    let result = translator(provider, 20)
        .translate_units(&[], "es")
        .await
        .unwrap();

    assert!(result.by_key.is_empty());
    assert_eq!(probe.request_count(), 0);
}
