/*!
 * Content extraction from HTML documents.
 *
 * Walks a parsed document and pulls out every translatable unit: the title,
 * metadata, JSON-LD structured data, translatable attributes and innermost
 * block elements. Extraction leaves behind a skeleton document in which each
 * block is tagged with a unit key and each protected fragment is replaced by
 * a vault token, so reinjection can put everything back deterministically.
 */

use std::collections::HashMap;

use markup5ever_rcdom::Handle;

use crate::app_config::SafetyConfig;
use crate::html::dom;
use crate::html::vault::PlaceholderVault;

/// Unit key for the document title
pub const KEY_TITLE: &str = "TITLE";
/// Unit key for `<meta name="description">`
pub const KEY_META_DESCRIPTION: &str = "META_DESCRIPTION";
/// Unit key for `<meta name="keywords">`
pub const KEY_META_KEYWORDS: &str = "META_KEYWORDS";
/// Unit key for `<meta property="og:title">`
pub const KEY_OG_TITLE: &str = "OG_TITLE";
/// Unit key for `<meta property="og:description">`
pub const KEY_OG_DESCRIPTION: &str = "OG_DESCRIPTION";
/// Unit key for `<meta name="twitter:title">`
pub const KEY_TWITTER_TITLE: &str = "TWITTER_TITLE";
/// Unit key for `<meta name="twitter:description">`
pub const KEY_TWITTER_DESCRIPTION: &str = "TWITTER_DESCRIPTION";

/// Attribute used to tag extracted block elements in the skeleton
pub const UNIT_ATTR: &str = "data-wl-unit";

/// Elements whose inner markup forms a translation unit when they are
/// the innermost block with visible text
const BLOCK_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "dt", "dd", "td", "th", "blockquote",
    "figcaption", "caption", "label", "legend", "summary",
];

/// Elements protected as inline code when `preserve_code_blocks` is on
const CODE_TAGS: &[&str] = &["code", "pre", "kbd", "samp", "var"];

/// One translatable piece of a document
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    /// Stable key, unique within the document (`TITLE`, `BLOCK#3`, ...)
    pub key: String,
    /// Source text or inner markup to translate
    pub text: String,
}

/// Everything extraction produces for a single document
#[derive(Debug)]
pub struct ExtractionResult {
    /// Units in document order
    pub units: Vec<TranslationUnit>,
    /// Key to source text, index-aligned with `units`
    pub mapping: HashMap<String, String>,
    /// Serialized document with blocks tagged and protected content tokenized
    pub skeleton: String,
    /// Vault holding the protected fragments of this document
    pub vault: PlaceholderVault,
}

/// Collects units and keeps the key mapping in lockstep
#[derive(Default)]
struct UnitSink {
    units: Vec<TranslationUnit>,
    mapping: HashMap<String, String>,
}

impl UnitSink {
    fn push(&mut self, key: String, text: String) {
        self.mapping.insert(key.clone(), text.clone());
        self.units.push(TranslationUnit { key, text });
    }

    fn contains(&self, key: &str) -> bool {
        self.mapping.contains_key(key)
    }
}

/// Extracts translatable content from HTML documents
pub struct Extractor {
    safety: SafetyConfig,
}

impl Extractor {
    pub fn new(safety: &SafetyConfig) -> Self {
        Self {
            safety: safety.clone(),
        }
    }

    /// Extract all translatable units from a document.
    ///
    /// Passes run in a fixed order: protect non-translatable subtrees, then
    /// collect the title and metadata, JSON-LD scripts, translatable
    /// attributes, and finally innermost blocks. Reinjection relies on the
    /// same order when it locates positional units.
    pub fn extract(&self, html: &str) -> ExtractionResult {
        let dom = dom::parse_html(html);
        let mut vault = PlaceholderVault::new();
        let mut sink = UnitSink::default();

        self.protect_subtrees(&dom.document, &mut vault);
        collect_singletons(&dom.document, &mut sink);
        collect_structured_data(&dom.document, &mut sink);
        collect_attributes(&dom.document, &mut sink);
        collect_blocks(&dom.document, &mut 0, &mut sink);

        ExtractionResult {
            units: sink.units,
            mapping: sink.mapping,
            skeleton: dom::serialize_document(&dom),
            vault,
        }
    }

    /// Replace protected subtrees with vault comment tokens, depth-first
    fn protect_subtrees(&self, node: &Handle, vault: &mut PlaceholderVault) {
        let mut children = node.children.borrow_mut();
        let mut i = 0;

        while i < children.len() {
            let child = children[i].clone();

            if let Some(name) = dom::get_node_name(&child) {
                if self.should_protect(name, &child) {
                    let token = vault.protect(dom::serialize_outer(&child));
                    children[i] = dom::new_comment(&token);
                    i += 1;
                    continue;
                }
            }

            self.protect_subtrees(&child, vault);
            i += 1;
        }
    }

    fn should_protect(&self, name: &str, node: &Handle) -> bool {
        match name {
            // JSON-LD scripts carry translatable structured data and are
            // handled by their own extraction pass instead
            "script" => self.safety.preserve_scripts && !is_json_ld(node),
            "style" => self.safety.preserve_styles,
            _ => self.safety.preserve_code_blocks && CODE_TAGS.contains(&name),
        }
    }
}

/// Whether a script element holds JSON-LD structured data
pub fn is_json_ld(node: &Handle) -> bool {
    dom::get_node_attr(node, "type")
        .map(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
        .unwrap_or(false)
}

/// Whether a tag belongs to the block unit set
pub fn is_block_tag(name: &str) -> bool {
    BLOCK_TAGS.contains(&name)
}

/// Title and metadata singletons
fn collect_singletons(root: &Handle, sink: &mut UnitSink) {
    if let Some(title) = dom::find_first(root, "title") {
        let text = dom::text_content(&title);
        if !text.trim().is_empty() {
            sink.push(KEY_TITLE.to_string(), text);
        }
    }

    dom::walk_elements(root, &mut |node, name| {
        if name != "meta" {
            return;
        }
        let content = match dom::get_node_attr(node, "content") {
            Some(c) if !c.trim().is_empty() => c,
            _ => return,
        };
        let key = match meta_singleton_key(node) {
            Some(key) => key,
            None => return,
        };
        // First occurrence wins; reinjection updates every matching meta
        if !sink.contains(key) {
            sink.push(key.to_string(), content);
        }
    });
}

/// Map a meta element to its singleton unit key, if it has one
pub fn meta_singleton_key(node: &Handle) -> Option<&'static str> {
    if let Some(name) = dom::get_node_attr(node, "name") {
        return match name.trim().to_ascii_lowercase().as_str() {
            "description" => Some(KEY_META_DESCRIPTION),
            "keywords" => Some(KEY_META_KEYWORDS),
            "twitter:title" => Some(KEY_TWITTER_TITLE),
            "twitter:description" => Some(KEY_TWITTER_DESCRIPTION),
            _ => None,
        };
    }
    if let Some(property) = dom::get_node_attr(node, "property") {
        return match property.trim().to_ascii_lowercase().as_str() {
            "og:title" => Some(KEY_OG_TITLE),
            "og:description" => Some(KEY_OG_DESCRIPTION),
            _ => None,
        };
    }
    None
}

/// JSON-LD scripts, keyed by position among parseable ones.
///
/// Scripts whose content is not valid JSON are skipped without consuming an
/// index, and reinjection skips them the same way.
fn collect_structured_data(root: &Handle, sink: &mut UnitSink) {
    let mut index = 0usize;

    dom::walk_elements(root, &mut |node, name| {
        if name != "script" || !is_json_ld(node) {
            return;
        }
        let text = dom::text_content(node);
        if serde_json::from_str::<serde_json::Value>(&text).is_err() {
            log::debug!("Skipping JSON-LD script with unparseable content");
            return;
        }
        sink.push(format!("JSONLD#{}", index), text);
        index += 1;
    });
}

/// Translatable attributes, keyed by position per attribute kind.
///
/// Whitespace-only values are skipped without consuming an index; the
/// reinjection pass applies the identical rule so positions line up.
fn collect_attributes(root: &Handle, sink: &mut UnitSink) {
    let mut counters = [0usize; 3];

    dom::walk_elements(root, &mut |node, _name| {
        for (slot, (attr, prefix)) in attribute_kinds().iter().enumerate() {
            if let Some(value) = dom::get_node_attr(node, attr) {
                if !value.trim().is_empty() {
                    sink.push(format!("{}#{}", prefix, counters[slot]), value);
                    counters[slot] += 1;
                }
            }
        }
    });
}

/// Attribute kinds in the order both extraction and reinjection visit them
pub fn attribute_kinds() -> [(&'static str, &'static str); 3] {
    [
        ("alt", "IMG_ALT"),
        ("title", "TITLE_ATTR"),
        ("placeholder", "PLACEHOLDER"),
    ]
}

/// Innermost block elements with visible text.
///
/// A block qualifies when its tag is in the block set, it has at least one
/// non-whitespace text descendant and no block-set descendant. Qualifying
/// blocks are tagged with the unit key and not descended into.
fn collect_blocks(node: &Handle, counter: &mut usize, sink: &mut UnitSink) {
    if let Some(name) = dom::get_node_name(node) {
        if is_block_tag(name) && dom::has_visible_text(node) && !has_block_descendant(node) {
            let inner = dom::serialize_inner(node);
            if !PlaceholderVault::is_placeholder_only(&inner) {
                let key = format!("BLOCK#{}", *counter);
                *counter += 1;
                dom::set_node_attr(node, UNIT_ATTR, Some(key.clone()));
                sink.push(key, inner);
                return;
            }
        }
    }

    let children: Vec<Handle> = node.children.borrow().iter().cloned().collect();
    for child in children {
        collect_blocks(&child, counter, sink);
    }
}

fn has_block_descendant(node: &Handle) -> bool {
    node.children.borrow().iter().any(|child| {
        dom::get_node_name(child).map(is_block_tag).unwrap_or(false) || has_block_descendant(child)
    })
}
