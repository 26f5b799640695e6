/*!
 * Translation orchestration.
 *
 * `core` owns prompting, response parsing and retries; `batch` splits the
 * unit list of a document into provider-sized requests and resolves the
 * results back to unit keys.
 */

pub mod batch;
pub mod core;

pub use batch::{BatchTranslator, TranslatedUnits};
pub use core::{TranslationOutcome, TranslationService};
