use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// Target languages are BCP 47-style tags such as `es`, `de` or `pt-BR`;
/// validation only inspects the primary subtag, which must be a known
/// ISO 639-1 (2-letter) or ISO 639-3 (3-letter) code.
/// Extract the primary language subtag from a tag like `pt-BR`
pub fn primary_subtag(code: &str) -> &str {
    code.split(['-', '_']).next().unwrap_or(code)
}

/// Validate that a language tag has a known primary subtag
pub fn validate_language_code(code: &str) -> Result<()> {
    let primary = primary_subtag(code.trim()).to_lowercase();

    if primary.len() == 2 && Language::from_639_1(&primary).is_some() {
        return Ok(());
    }
    if primary.len() == 3 && Language::from_639_3(&primary).is_some() {
        return Ok(());
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Get the English language name from a tag
pub fn get_language_name(code: &str) -> Result<String> {
    let primary = primary_subtag(code.trim()).to_lowercase();

    let lang = if primary.len() == 2 {
        Language::from_639_1(&primary)
    } else {
        Language::from_639_3(&primary)
    };

    lang.map(|l| l.to_name().to_string())
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))
}
