/*!
 * Reinjection of translated units into the document skeleton.
 *
 * Mirrors the extraction passes in the same order: metadata, JSON-LD,
 * attributes, tagged blocks. Positional passes (JSON-LD, attributes) walk
 * the skeleton with the same skip rules extraction used, so indexes line up
 * without any per-node bookkeeping in the skeleton itself.
 *
 * After the content passes the document gets its `lang` attribute and,
 * when configured, a rewritten set of `hreflang` alternate links. The very
 * last step restores vaulted fragments on the serialized output.
 */

use std::collections::HashMap;

use anyhow::Result;
use log::warn;
use markup5ever_rcdom::Handle;

use crate::app_config::SeoConfig;
use crate::html::dom;
use crate::html::extractor::{
    self, ExtractionResult, KEY_TITLE, UNIT_ATTR, is_json_ld, meta_singleton_key,
};

/// Rebuilds translated documents from a skeleton and translated units
pub struct Reinjector {
    seo: SeoConfig,
    source_language: String,
    target_languages: Vec<String>,
}

impl Reinjector {
    pub fn new(seo: &SeoConfig, source_language: &str, target_languages: &[String]) -> Self {
        Self {
            seo: seo.clone(),
            source_language: source_language.to_string(),
            target_languages: target_languages.to_vec(),
        }
    }

    /// Produce the translated document for one target language.
    ///
    /// `translations` maps unit keys to translated text; keys missing from
    /// the map keep their source content. `document_path` is the
    /// forward-slash path of the document relative to the input root, used
    /// to build alternate link URLs.
    pub fn reinject(
        &self,
        extraction: &ExtractionResult,
        translations: &HashMap<String, String>,
        target_language: &str,
        document_path: &str,
    ) -> Result<String> {
        let dom = dom::parse_html(&extraction.skeleton);
        let root = &dom.document;

        apply_singletons(root, translations);
        apply_structured_data(root, translations);
        apply_attributes(root, translations);
        apply_blocks(root, translations);

        self.set_document_language(root, target_language);
        if self.seo.inject_hreflang {
            self.inject_alternate_links(root, target_language, document_path);
        }

        let serialized = dom::serialize_document(&dom);
        extraction.vault.restore_all(&serialized)
    }

    fn set_document_language(&self, root: &Handle, target_language: &str) {
        if let Some(html) = dom::get_child_node_by_name(root, "html") {
            dom::set_node_attr(&html, "lang", Some(target_language.to_string()));
        }
    }

    /// Rewrite the alternate link set in `<head>`.
    ///
    /// Existing `rel="alternate"` links with an `hreflang` are dropped, then
    /// one link per language is appended. The language of the current
    /// document is emitted as `hreflang="x-default"` so every variant points
    /// to itself as the default.
    fn inject_alternate_links(&self, root: &Handle, target_language: &str, document_path: &str) {
        let head = match dom::get_child_node_by_name(root, "html")
            .and_then(|html| dom::get_child_node_by_name(&html, "head"))
        {
            Some(head) => head,
            None => return,
        };

        {
            let mut children = head.children.borrow_mut();
            children.retain(|child| {
                !(dom::get_node_name(child) == Some("link")
                    && dom::get_node_attr(child, "rel")
                        .map(|r| r.trim().eq_ignore_ascii_case("alternate"))
                        .unwrap_or(false)
                    && dom::get_node_attr(child, "hreflang").is_some())
            });
        }

        let mut languages = vec![self.source_language.clone()];
        languages.extend(self.target_languages.iter().cloned());

        let base = self.seo.base_url.trim_end_matches('/');
        let mut children = head.children.borrow_mut();
        for language in languages {
            let href = format!("{}/{}/{}", base, language, document_path);
            let hreflang = if language == target_language {
                "x-default".to_string()
            } else {
                language
            };
            children.push(dom::new_element(
                "link",
                &[
                    ("rel", "alternate"),
                    ("hreflang", hreflang.as_str()),
                    ("href", href.as_str()),
                ],
            ));
        }
    }
}

/// Title text and metadata content attributes
fn apply_singletons(root: &Handle, translations: &HashMap<String, String>) {
    if let Some(translated) = translations.get(KEY_TITLE) {
        if let Some(title) = dom::find_first(root, "title") {
            dom::set_text_content(&title, translated);
        }
    }

    dom::walk_elements(root, &mut |node, name| {
        if name != "meta" {
            return;
        }
        let key = match meta_singleton_key(node) {
            Some(key) => key,
            None => return,
        };
        if let Some(translated) = translations.get(key) {
            dom::set_node_attr(node, "content", Some(translated.clone()));
        }
    });
}

/// JSON-LD scripts, matched positionally against extraction.
///
/// Translated content that no longer parses as JSON is rejected and the
/// source JSON kept, so structured data never ships broken.
fn apply_structured_data(root: &Handle, translations: &HashMap<String, String>) {
    let mut index = 0usize;

    dom::walk_elements(root, &mut |node, name| {
        if name != "script" || !is_json_ld(node) {
            return;
        }
        let original = dom::text_content(node);
        if serde_json::from_str::<serde_json::Value>(&original).is_err() {
            return;
        }
        let key = format!("JSONLD#{}", index);
        index += 1;

        let translated = match translations.get(&key) {
            Some(t) => t,
            None => return,
        };
        match serde_json::from_str::<serde_json::Value>(translated) {
            Ok(value) => {
                if let Ok(serialized) = serde_json::to_string(&value) {
                    dom::set_text_content(node, &serialized);
                }
            }
            Err(e) => {
                warn!(
                    "Keeping source JSON-LD for {}: translated content is not valid JSON: {}",
                    key, e
                );
            }
        }
    });
}

/// Translatable attributes, matched positionally against extraction
fn apply_attributes(root: &Handle, translations: &HashMap<String, String>) {
    let mut counters = [0usize; 3];

    dom::walk_elements(root, &mut |node, _name| {
        for (slot, (attr, prefix)) in extractor::attribute_kinds().iter().enumerate() {
            if let Some(value) = dom::get_node_attr(node, attr) {
                if !value.trim().is_empty() {
                    let key = format!("{}#{}", prefix, counters[slot]);
                    counters[slot] += 1;
                    if let Some(translated) = translations.get(&key) {
                        dom::set_node_attr(node, attr, Some(translated.clone()));
                    }
                }
            }
        }
    });
}

/// Tagged block elements: replace children with the parsed translated
/// fragment and strip the tagging attribute. Tagged blocks never nest, so
/// translated content is not descended into.
fn apply_blocks(node: &Handle, translations: &HashMap<String, String>) {
    if let Some(key) = dom::get_node_attr(node, UNIT_ATTR) {
        if let Some(translated) = translations.get(&key) {
            let fragment = dom::parse_fragment_nodes(translated);
            let mut children = node.children.borrow_mut();
            children.clear();
            children.extend(fragment);
        }
        dom::set_node_attr(node, UNIT_ATTR, None);
        return;
    }

    let children: Vec<Handle> = node.children.borrow().iter().cloned().collect();
    for child in children {
        apply_blocks(&child, translations);
    }
}
