/*!
 * On-disk document cache.
 *
 * A translated document is cached under its (source path, target language)
 * pair together with a content hash of the source. A cache hit requires the
 * hash to match, so edited source documents are always retranslated.
 */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::file_utils::FileManager;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    /// Forward-slash path of the source document, relative to the input root
    source: String,
    /// SHA-256 of the source document content
    content_hash: String,
    /// The translated document
    html: String,
}

/// Cache of translated documents, one file per (document, language) pair
pub struct DocumentCache {
    root: PathBuf,
    enabled: bool,
}

impl DocumentCache {
    pub fn new<P: AsRef<Path>>(root: P, enabled: bool) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            enabled,
        }
    }

    /// SHA-256 hex digest of a string
    pub fn content_hash(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn entry_path(&self, source_key: &str, language: &str) -> PathBuf {
        // Hash the key so nested paths map to flat file names
        let file_name = format!("{}.json", Self::content_hash(source_key));
        self.root.join(language).join(file_name)
    }

    /// Look up a cached translation; misses and stale entries return None
    pub fn get(&self, source_key: &str, content: &str, language: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let path = self.entry_path(source_key, language);
        let raw = std::fs::read_to_string(&path).ok()?;
        let entry: CacheEntry = serde_json::from_str(&raw).ok()?;

        if entry.content_hash != Self::content_hash(content) {
            debug!("Cache entry for {} [{}] is stale", source_key, language);
            return None;
        }

        debug!("Cache hit for {} [{}]", source_key, language);
        Some(entry.html)
    }

    /// Store a translated document
    pub fn store(
        &self,
        source_key: &str,
        content: &str,
        language: &str,
        html: &str,
    ) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let entry = CacheEntry {
            source: source_key.to_string(),
            content_hash: Self::content_hash(content),
            html: html.to_string(),
        };
        let path = self.entry_path(source_key, language);
        let serialized =
            serde_json::to_string(&entry).context("Failed to serialize cache entry")?;
        FileManager::write_to_file(&path, &serialized)?;

        debug!("Cached translation for {} [{}]", source_key, language);
        Ok(())
    }
}
