/*!
 * # weblingo - Static site translation with AI
 *
 * A Rust library for translating static HTML sites into multiple languages
 * using LLM providers.
 *
 * ## Features
 *
 * - Extract translatable content from HTML documents (blocks, metadata,
 *   attributes, JSON-LD structured data)
 * - Protect scripts, styles and code fragments from translation
 * - Translate via OpenAI-compatible providers (OpenAI API, LM Studio)
 * - Deterministic reinjection that preserves document structure
 * - Per-language glossaries and hreflang alternate link injection
 * - Content-hash cache so unchanged documents are never retranslated
 * - Concurrent (document, language) task execution with a run report
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `html`: HTML document processing:
 *   - `html::extractor`: Translation unit extraction
 *   - `html::reinject`: Reinjection of translated units
 *   - `html::vault`: Placeholder vault for protected fragments
 *   - `html::dom`: html5ever DOM helpers
 * - `translation`: AI-powered translation services:
 *   - `translation::core`: Prompting, parsing and retries
 *   - `translation::batch`: Batch processing of unit lists
 * - `providers`: Client implementations for LLM providers
 * - `cache`: On-disk document cache
 * - `report`: Run reporting
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod cache;
pub mod errors;
pub mod file_utils;
pub mod html;
pub mod language_utils;
pub mod providers;
pub mod report;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use html::{ExtractionResult, Extractor, PlaceholderVault, Reinjector, TranslationUnit};
pub use language_utils::{get_language_name, primary_subtag, validate_language_code};
pub use report::{RunReport, TaskOutcome};
pub use translation::TranslationService;
pub use errors::{AppError, ProviderError, TranslationError};
