/*!
 * Tests for the translation service
 */

use std::collections::HashMap;
use std::sync::Arc;

use weblingo::app_config::Config;
use weblingo::errors::TranslationError;
use weblingo::providers::MockProvider;
use weblingo::translation::TranslationService;

fn test_config() -> Config {
    let mut config = Config::default();
    config.translation.common.retry_count = 3;
    config.translation.common.retry_backoff_ms = 1;
    config
}

fn service(provider: MockProvider) -> TranslationService {
    TranslationService::with_provider(Arc::new(provider), &test_config())
}

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_translate_texts_withWorkingProvider_shouldReturnAlignedTranslations() {
    let mut provider = MockProvider::working();
    provider.learn("Hello", "Hola");
    provider.learn("World", "Mundo");

    let outcome = service(provider)
        .translate_texts(&texts(&["Hello", "World"]), "es")
        .await
        .unwrap();

    assert_eq!(outcome.translations, vec!["Hola", "Mundo"]);
    assert!(outcome.diagnostics.is_empty());
    assert!(outcome.prompt_tokens > 0);
}

#[tokio::test]
async fn test_translate_texts_withEmptyInput_shouldSkipTheProvider() {
    let provider = MockProvider::working();
    let probe = provider.clone();

    let outcome = service(provider).translate_texts(&[], "es").await.unwrap();

    assert!(outcome.translations.is_empty());
    assert_eq!(probe.request_count(), 0);
}

#[tokio::test]
async fn test_translate_texts_withShortResponse_shouldBackfillAndDiagnose() {
    let provider = MockProvider::short(1);

    let outcome = service(provider)
        .translate_texts(&texts(&["One", "Two", "Three"]), "es")
        .await
        .unwrap();

    assert_eq!(outcome.translations.len(), 3);
    assert_eq!(outcome.translations[2], "Three");
    assert_eq!(outcome.diagnostics.len(), 1);
}

#[tokio::test]
async fn test_translate_texts_withTransientRateLimit_shouldRetryAndSucceed() {
    let provider = MockProvider::rate_limited_first(2);
    let probe = provider.clone();

    let outcome = service(provider)
        .translate_texts(&texts(&["Hello"]), "es")
        .await
        .unwrap();

    assert_eq!(outcome.translations, vec!["Hello"]);
    assert_eq!(probe.request_count(), 3);
}

#[tokio::test]
async fn test_translate_texts_withPersistentMalformedOutput_shouldExhaustRetries() {
    let provider = MockProvider::malformed();
    let probe = provider.clone();

    let result = service(provider)
        .translate_texts(&texts(&["Hello"]), "es")
        .await;

    assert!(matches!(
        result,
        Err(TranslationError::RetriesExhausted { attempts: 3, .. })
    ));
    assert_eq!(probe.request_count(), 3);
}

#[tokio::test]
async fn test_translate_texts_withTransportFailure_shouldFailWithoutRetry() {
    let provider = MockProvider::failing();
    let probe = provider.clone();

    let result = service(provider)
        .translate_texts(&texts(&["Hello"]), "es")
        .await;

    assert!(matches!(result, Err(TranslationError::Provider(_))));
    assert_eq!(probe.request_count(), 1);
}

#[tokio::test]
async fn test_translate_texts_withGlossary_shouldMentionTermsInPrompt() {
    let provider = MockProvider::working();
    let probe = provider.clone();

    let mut config = test_config();
    let mut terms = HashMap::new();
    terms.insert("weblingo".to_string(), "weblingo".to_string());
    config.glossary.insert("es".to_string(), terms);

    // The glossary is carried through the system prompt, which the mock does
    // not expose, so assert on the request payload shape instead
    let service = TranslationService::with_provider(Arc::new(provider), &config);
    service
        .translate_texts(&texts(&["weblingo rocks"]), "es")
        .await
        .unwrap();

    let requests = probe.captured_requests();
    assert_eq!(requests.len(), 1);
    let sent: Vec<String> = serde_json::from_str(&requests[0]).unwrap();
    assert_eq!(sent, vec!["weblingo rocks"]);
}
