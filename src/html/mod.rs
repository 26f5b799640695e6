/*!
 * HTML document processing.
 *
 * Extraction pulls translatable units out of a document and leaves a tagged
 * skeleton behind; reinjection puts translated units back and restores the
 * protected fragments kept in the placeholder vault.
 */

pub mod dom;
pub mod extractor;
pub mod reinject;
pub mod vault;

pub use extractor::{ExtractionResult, Extractor, TranslationUnit};
pub use reinject::Reinjector;
pub use vault::{PlaceholderEntry, PlaceholderVault};
