/*!
 * End-to-end translation pipeline tests
 */

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use weblingo::app_config::{Config, TranslationProvider};
use weblingo::app_controller::Controller;
use weblingo::providers::MockProvider;

const SAMPLE_PAGE: &str = r#"<!DOCTYPE html><html lang="en"><head>
<title>Hello</title>
<meta name="description" content="Greetings page">
<script>var secret = "do-not-translate";</script>
</head><body>
<h1>Hello</h1>
<p>Hello <b>World</b></p>
</body></html>"#;

fn sample_provider() -> MockProvider {
    let mut provider = MockProvider::working();
    provider.learn("Hello", "Hola");
    provider.learn("Hello <b>World</b>", "Hola <b>Mundo</b>");
    provider.learn("Greetings page", "Página de saludos");
    provider
}

fn test_config(input_dir: &Path, output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.source_language = "en".to_string();
    config.target_languages = vec!["es".to_string()];
    config.input_dir = input_dir.to_path_buf();
    config.output_dir = output_dir.to_path_buf();
    // LM Studio needs no API key, so validation passes in tests
    config.translation.provider = TranslationProvider::LMStudio;
    config.translation.common.retry_backoff_ms = 1;
    config.parallel.limit = 2;
    config
}

fn write_site(dir: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

#[tokio::test]
async fn test_run_withSamplePage_shouldProduceTranslatedDocument() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_site(input.path(), &[("index.html", SAMPLE_PAGE)]);

    let config = test_config(input.path(), output.path());
    let controller = Controller::with_provider(config, Arc::new(sample_provider())).unwrap();
    let report = controller.run().await.unwrap();

    assert_eq!(report.total_tasks, 1);
    assert_eq!(report.succeeded, 1);

    let translated = fs::read_to_string(output.path().join("es/index.html")).unwrap();
    assert!(translated.contains("<title>Hola</title>"));
    assert!(translated.contains("Hola <b>Mundo</b>"));
    assert!(translated.contains("Página de saludos"));
    assert!(translated.contains("lang=\"es\""));
    // Protected script survives byte for byte, with no leftover tokens
    assert!(translated.contains(r#"<script>var secret = "do-not-translate";</script>"#));
    assert!(!translated.contains("__weblingo_keep_"));
    assert!(!translated.contains("data-wl-unit"));
}

#[tokio::test]
async fn test_run_withProtectedScript_shouldNeverSendItToTheProvider() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_site(input.path(), &[("index.html", SAMPLE_PAGE)]);

    let provider = sample_provider();
    let probe = provider.clone();
    let config = test_config(input.path(), output.path());
    Controller::with_provider(config, Arc::new(provider))
        .unwrap()
        .run()
        .await
        .unwrap();

    for request in probe.captured_requests() {
        assert!(!request.contains("do-not-translate"));
    }
}

#[tokio::test]
async fn test_run_withUnchangedSource_shouldServeSecondRunFromCache() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_site(input.path(), &[("index.html", SAMPLE_PAGE)]);

    let provider = sample_provider();
    let probe = provider.clone();
    let config = test_config(input.path(), output.path());

    Controller::with_provider(config.clone(), Arc::new(provider.clone()))
        .unwrap()
        .run()
        .await
        .unwrap();
    let first_run_requests = probe.request_count();
    assert!(first_run_requests > 0);

    let report = Controller::with_provider(config, Arc::new(provider))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(probe.request_count(), first_run_requests);
    assert_eq!(report.cached_hits, 1);
}

#[tokio::test]
async fn test_run_withForce_shouldRetranslateDespiteCache() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_site(input.path(), &[("index.html", SAMPLE_PAGE)]);

    let provider = sample_provider();
    let probe = provider.clone();
    let config = test_config(input.path(), output.path());

    Controller::with_provider(config.clone(), Arc::new(provider.clone()))
        .unwrap()
        .run()
        .await
        .unwrap();
    let first_run_requests = probe.request_count();

    Controller::with_provider(config, Arc::new(provider))
        .unwrap()
        .force_retranslation(true)
        .run()
        .await
        .unwrap();

    assert!(probe.request_count() > first_run_requests);
}

#[tokio::test]
async fn test_run_withFailingProvider_shouldRecordFailuresWithoutAborting() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_site(
        input.path(),
        &[
            ("a.html", "<html><body><p>Hello</p></body></html>"),
            ("b.html", "<html><body><p>Hello</p></body></html>"),
        ],
    );

    let config = test_config(input.path(), output.path());
    let report = Controller::with_provider(config, Arc::new(MockProvider::failing()))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.total_tasks, 2);
    assert_eq!(report.failed, 2);
    assert!(report.outcomes.iter().all(|o| o.error.is_some()));

    // The report is still written next to the output subtrees
    assert!(output.path().join("weblingo-report.json").exists());
}

#[tokio::test]
async fn test_run_withNoTranslatableContent_shouldCopyDocumentVerbatim() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let page = "<html><head></head><body><script>var x = 1;</script></body></html>";
    write_site(input.path(), &[("empty.html", page)]);

    let config = test_config(input.path(), output.path());
    let provider = MockProvider::working();
    let probe = provider.clone();
    let report = Controller::with_provider(config, Arc::new(provider))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.succeeded, 1);
    assert_eq!(probe.request_count(), 0);

    let copied = fs::read_to_string(output.path().join("es/empty.html")).unwrap();
    assert_eq!(copied, page);
}

#[tokio::test]
async fn test_run_withMultipleLanguages_shouldProduceOneSubtreePerLanguage() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_site(
        input.path(),
        &[("index.html", "<html><body><p>Hello</p></body></html>")],
    );

    let mut config = test_config(input.path(), output.path());
    config.target_languages = vec!["es".to_string(), "fr".to_string()];

    let report = Controller::with_provider(config, Arc::new(sample_provider()))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.total_tasks, 2);
    assert_eq!(report.succeeded, 2);
    assert!(output.path().join("es/index.html").exists());
    assert!(output.path().join("fr/index.html").exists());
}

#[tokio::test]
async fn test_run_withNestedDocuments_shouldMirrorTheInputTree() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_site(
        input.path(),
        &[("docs/guide/intro.html", "<html><body><p>Hello</p></body></html>")],
    );

    let config = test_config(input.path(), output.path());
    Controller::with_provider(config, Arc::new(sample_provider()))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(output.path().join("es/docs/guide/intro.html").exists());
}

#[tokio::test]
async fn test_run_withEmptyInputDirectory_shouldFail() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    let config = test_config(input.path(), output.path());
    let result = Controller::with_provider(config, Arc::new(MockProvider::working()))
        .unwrap()
        .run()
        .await;

    assert!(result.is_err());
}
