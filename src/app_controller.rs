/*!
 * Application controller.
 *
 * Expands the run into (document, language) tasks, executes them
 * concurrently under the configured parallelism limit and aggregates the
 * results into a run report. One task failing never stops its siblings;
 * failures are captured as outcome records instead.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use futures::{StreamExt, stream};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use tokio::sync::Semaphore;

use crate::app_config::Config;
use crate::cache::DocumentCache;
use crate::file_utils::FileManager;
use crate::html::{Extractor, Reinjector};
use crate::providers::Provider;
use crate::report::{RunReport, TaskOutcome};
use crate::translation::{BatchTranslator, TranslationService};

/// Orchestrates a full translation run
pub struct Controller {
    config: Config,
    service: TranslationService,
    force: bool,
}

impl Controller {
    /// Build a controller from a validated configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let service = TranslationService::new(&config);
        Ok(Self {
            config,
            service,
            force: false,
        })
    }

    /// Build a controller around an explicit provider, used by tests
    pub fn with_provider(config: Config, provider: Arc<dyn Provider>) -> Result<Self> {
        config.validate()?;
        let service = TranslationService::with_provider(provider, &config);
        Ok(Self {
            config,
            service,
            force: false,
        })
    }

    /// Retranslate everything, ignoring cached documents
    pub fn force_retranslation(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Run all tasks and write the report next to the output subtrees
    pub async fn run(&self) -> Result<RunReport> {
        let files = FileManager::find_html_files(&self.config.input_dir)?;
        if files.is_empty() {
            return Err(anyhow!(
                "No HTML documents found in {:?}",
                self.config.input_dir
            ));
        }

        let mut tasks: Vec<(PathBuf, String)> = Vec::new();
        for file in &files {
            for language in &self.config.target_languages {
                tasks.push((file.clone(), language.clone()));
            }
        }

        info!(
            "Translating {} documents into {} languages ({} tasks, {} in parallel)",
            files.len(),
            self.config.target_languages.len(),
            tasks.len(),
            self.config.parallel.limit
        );

        let cache = DocumentCache::new(
            self.config.output_dir.join(".weblingo-cache"),
            self.config.cache_enabled,
        );

        let progress = ProgressBar::new(tasks.len() as u64);
        progress.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} tasks",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );

        let semaphore = Arc::new(Semaphore::new(self.config.parallel.limit));
        let outcomes: Vec<TaskOutcome> = stream::iter(tasks)
            .map(|(file, language)| {
                let semaphore = Arc::clone(&semaphore);
                let cache = &cache;
                let progress = &progress;
                async move {
                    let _permit = semaphore.acquire_owned().await.ok();
                    let outcome = self.process_task(cache, &file, &language).await;
                    progress.inc(1);
                    outcome
                }
            })
            .buffer_unordered(self.config.parallel.limit)
            .collect()
            .await;

        progress.finish_and_clear();

        let report = RunReport::new(
            &self.config.source_language,
            &self.config.target_languages,
            outcomes,
        );
        let report_path = self.config.output_dir.join("weblingo-report.json");
        report.write_to(&report_path)?;

        info!(
            "Run complete: {}/{} tasks succeeded ({} from cache), report at {:?}",
            report.succeeded, report.total_tasks, report.cached_hits, report_path
        );

        Ok(report)
    }

    /// Run one task, converting any error into a failure outcome
    async fn process_task(
        &self,
        cache: &DocumentCache,
        file: &Path,
        language: &str,
    ) -> TaskOutcome {
        let source_key = FileManager::relative_key(&self.config.input_dir, file);

        match self
            .translate_document(cache, file, &source_key, language)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Task {} [{}] failed: {:#}", source_key, language, e);
                TaskOutcome::failure(&source_key, language, format!("{:#}", e))
            }
        }
    }

    async fn translate_document(
        &self,
        cache: &DocumentCache,
        file: &Path,
        source_key: &str,
        language: &str,
    ) -> Result<TaskOutcome> {
        let content = FileManager::read_to_string(file)?;
        let output_path = self.output_path(source_key, language);

        if !self.force {
            if let Some(html) = cache.get(source_key, &content, language) {
                FileManager::write_to_file(&output_path, &html)?;
                return Ok(TaskOutcome {
                    source: source_key.to_string(),
                    language: language.to_string(),
                    success: true,
                    cached: true,
                    unit_count: 0,
                    total_tokens: None,
                    error: None,
                });
            }
        }

        let extraction = Extractor::new(&self.config.safety).extract(&content);

        if extraction.units.is_empty() {
            debug!(
                "No translatable content in {}, copying verbatim",
                source_key
            );
            FileManager::write_to_file(&output_path, &content)?;
            cache.store(source_key, &content, language, &content)?;
            return Ok(TaskOutcome {
                source: source_key.to_string(),
                language: language.to_string(),
                success: true,
                cached: false,
                unit_count: 0,
                total_tokens: None,
                error: None,
            });
        }

        debug!(
            "Extracted {} units from {} for {}",
            extraction.units.len(),
            source_key,
            language
        );

        let translator = BatchTranslator::new(
            self.service.clone(),
            self.config.translation.common.batch_size,
        );
        let translated = translator
            .translate_units(&extraction.units, language)
            .await?;

        for note in &translated.diagnostics {
            warn!("{} [{}]: {}", source_key, language, note);
        }
        if translated.fallback_count > 0 {
            warn!(
                "{} [{}]: {} units kept their source text",
                source_key, language, translated.fallback_count
            );
        }

        let reinjector = Reinjector::new(
            &self.config.seo,
            &self.config.source_language,
            &self.config.target_languages,
        );
        let html = reinjector.reinject(&extraction, &translated.by_key, language, source_key)?;

        FileManager::write_to_file(&output_path, &html)?;
        cache.store(source_key, &content, language, &html)?;

        let total_tokens = translated.total_tokens();
        Ok(TaskOutcome {
            source: source_key.to_string(),
            language: language.to_string(),
            success: true,
            cached: false,
            unit_count: extraction.units.len(),
            total_tokens: (total_tokens > 0).then_some(total_tokens),
            error: None,
        })
    }

    /// Output location: `<output_dir>/<language>/<relative document path>`
    fn output_path(&self, source_key: &str, language: &str) -> PathBuf {
        let mut path = self.config.output_dir.join(language);
        for part in source_key.split('/') {
            path.push(part);
        }
        path
    }
}
