/*!
 * Run reporting.
 *
 * Every (document, language) task produces an outcome record; the run
 * report aggregates them and is written as JSON next to the translated
 * output so failures can be inspected after the run.
 */

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::file_utils::FileManager;

/// Outcome of one (document, language) task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutcome {
    /// Forward-slash path of the source document, relative to the input root
    pub source: String,
    /// Target language of the task
    pub language: String,
    /// Whether the task produced an output document
    pub success: bool,
    /// Whether the output came from the cache
    pub cached: bool,
    /// Number of translation units extracted
    pub unit_count: usize,
    /// Total provider tokens used, when the API reported usage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
    /// Error message for failed tasks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskOutcome {
    pub fn failure(source: &str, language: &str, error: String) -> Self {
        Self {
            source: source.to_string(),
            language: language.to_string(),
            success: false,
            cached: false,
            unit_count: 0,
            total_tokens: None,
            error: Some(error),
        }
    }
}

/// Aggregated report for a whole run
#[derive(Debug, Serialize, Deserialize)]
pub struct RunReport {
    /// RFC 3339 timestamp of report creation
    pub generated_at: String,
    pub source_language: String,
    pub target_languages: Vec<String>,
    pub total_tasks: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cached_hits: usize,
    pub outcomes: Vec<TaskOutcome>,
}

impl RunReport {
    pub fn new(
        source_language: &str,
        target_languages: &[String],
        outcomes: Vec<TaskOutcome>,
    ) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        let cached_hits = outcomes.iter().filter(|o| o.cached).count();

        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            source_language: source_language.to_string(),
            target_languages: target_languages.to_vec(),
            total_tasks: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            cached_hits,
            outcomes,
        }
    }

    /// Write the report as pretty-printed JSON
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        FileManager::write_to_file(path, &serialized)
    }
}
