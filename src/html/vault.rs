/*!
 * Placeholder vault for non-translatable fragments.
 *
 * Protected subtrees (scripts, styles, inline code) are swapped for opaque
 * comment tokens before extraction and swapped back after reinjection.
 * Comment nodes are used as carriers because the HTML5 tree builder moves
 * bare text out of `<head>`, while comments survive everywhere.
 */

use std::collections::HashMap;

use anyhow::{Result, anyhow};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

/// Token prefix shared by every placeholder
pub const TOKEN_PREFIX: &str = "__weblingo_keep_";

static TOKEN_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!--__weblingo_keep_(\d+)__-->").unwrap());

static TOKEN_ONLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:<!--)?__weblingo_keep_\d+__(?:-->)?").unwrap());

/// A single protected fragment
#[derive(Debug, Clone)]
pub struct PlaceholderEntry {
    /// The token, without comment delimiters
    pub token: String,
    /// Verbatim outer markup of the protected subtree
    pub raw_markup: String,
}

/// Maps placeholder tokens back to the original markup they replaced.
///
/// One vault is built per extraction and consumed by the matching
/// reinjection; tokens are never shared across documents.
#[derive(Debug, Default)]
pub struct PlaceholderVault {
    entries: Vec<PlaceholderEntry>,
}

impl PlaceholderVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of protected fragments
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store a fragment and return the token that stands in for it
    pub fn protect(&mut self, raw_markup: String) -> String {
        let token = format!("{}{}__", TOKEN_PREFIX, self.entries.len());
        self.entries.push(PlaceholderEntry {
            token: token.clone(),
            raw_markup,
        });
        token
    }

    /// The token rendered as the comment node text it travels in
    pub fn comment_markup(token: &str) -> String {
        format!("<!--{}-->", token)
    }

    /// Whether a string is nothing but placeholder tokens and whitespace
    pub fn is_placeholder_only(text: &str) -> bool {
        TOKEN_ONLY_RE.replace_all(text, "").trim().is_empty()
    }

    /// Replace every placeholder token in `html` with its original markup.
    ///
    /// Fails if any token substring is still present afterwards, which would
    /// mean protected content leaked into the output in mangled form. Tokens
    /// the translator dropped entirely are reported but not fatal.
    pub fn restore_all(&self, html: &str) -> Result<String> {
        let lookup: HashMap<usize, &str> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, entry.raw_markup.as_str()))
            .collect();

        let mut restored = 0usize;
        let result = TOKEN_COMMENT_RE
            .replace_all(html, |caps: &regex::Captures| {
                match caps[1].parse::<usize>().ok().and_then(|i| lookup.get(&i)) {
                    Some(markup) => {
                        restored += 1;
                        (*markup).to_string()
                    }
                    None => caps[0].to_string(),
                }
            })
            .to_string();

        if result.contains(TOKEN_PREFIX) {
            return Err(anyhow!(
                "Placeholder token leaked into the output document; protected content would be lost"
            ));
        }

        if restored < self.entries.len() {
            warn!(
                "{} of {} protected fragments were not present in the translated document",
                self.entries.len() - restored,
                self.entries.len()
            );
        }

        Ok(result)
    }
}
