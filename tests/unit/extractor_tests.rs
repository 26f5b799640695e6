/*!
 * Tests for HTML content extraction
 */

use weblingo::app_config::SafetyConfig;
use weblingo::html::Extractor;
use weblingo::html::extractor::{
    KEY_META_DESCRIPTION, KEY_OG_TITLE, KEY_TITLE, UNIT_ATTR,
};

fn extractor() -> Extractor {
    Extractor::new(&SafetyConfig::default())
}

fn unit_text<'a>(result: &'a weblingo::ExtractionResult, key: &str) -> &'a str {
    result
        .mapping
        .get(key)
        .map(|t| t.as_str())
        .unwrap_or_else(|| panic!("missing unit {}", key))
}

#[test]
fn test_extract_withSimplePage_shouldProduceTitleAndBlocks() {
    let html = "<html><head><title>Hello</title></head>\
                <body><h1>Hello</h1><p>Hello <b>World</b></p></body></html>";
    let result = extractor().extract(html);

    assert_eq!(unit_text(&result, KEY_TITLE), "Hello");
    assert_eq!(unit_text(&result, "BLOCK#0"), "Hello");
    assert_eq!(unit_text(&result, "BLOCK#1"), "Hello <b>World</b>");
    assert_eq!(result.units.len(), 3);
}

#[test]
fn test_extract_withSiblingBlocks_shouldNumberInDocumentOrder() {
    let html = "<html><body><div><p>A</p><p>B</p></div></body></html>";
    let result = extractor().extract(html);

    assert_eq!(unit_text(&result, "BLOCK#0"), "A");
    assert_eq!(unit_text(&result, "BLOCK#1"), "B");
}

#[test]
fn test_extract_withNestedBlocks_shouldOnlyTakeInnermost() {
    let html = "<html><body><ul><li><p>Inner</p></li></ul></body></html>";
    let result = extractor().extract(html);

    // The li contains a block descendant, so only the p qualifies
    assert_eq!(result.units.len(), 1);
    assert_eq!(unit_text(&result, "BLOCK#0"), "Inner");
}

#[test]
fn test_extract_withWhitespaceOnlyBlock_shouldSkipIt() {
    let html = "<html><body><p>   </p><p>Real</p></body></html>";
    let result = extractor().extract(html);

    assert_eq!(result.units.len(), 1);
    assert_eq!(unit_text(&result, "BLOCK#0"), "Real");
}

#[test]
fn test_extract_withScript_shouldVaultItAndKeepItOutOfUnits() {
    let html = "<html><body><p>Text</p><script>var secret = 42;</script></body></html>";
    let result = extractor().extract(html);

    assert_eq!(result.vault.len(), 1);
    assert!(!result.skeleton.contains("var secret"));
    assert!(result.skeleton.contains("__weblingo_keep_0__"));
    for unit in &result.units {
        assert!(!unit.text.contains("var secret"));
    }
}

#[test]
fn test_extract_withInlineCode_shouldCarryTokenInsideBlockUnit() {
    let html = "<html><body><p>Run <code>cargo build</code> now</p></body></html>";
    let result = extractor().extract(html);

    let block = unit_text(&result, "BLOCK#0");
    assert!(block.contains("<!--__weblingo_keep_0__-->"));
    assert!(!block.contains("cargo build"));
    assert_eq!(result.vault.len(), 1);
}

#[test]
fn test_extract_withDisabledCodeProtection_shouldKeepCodeInline() {
    let safety = SafetyConfig {
        preserve_code_blocks: false,
        ..SafetyConfig::default()
    };
    let html = "<html><body><p>Run <code>cargo build</code> now</p></body></html>";
    let result = Extractor::new(&safety).extract(html);

    assert_eq!(result.vault.len(), 0);
    assert!(unit_text(&result, "BLOCK#0").contains("cargo build"));
}

#[test]
fn test_extract_withMetadata_shouldProduceSingletonUnits() {
    let html = r#"<html><head>
        <title>Page</title>
        <meta name="description" content="A page">
        <meta property="og:title" content="Page OG">
        <meta name="viewport" content="width=device-width">
    </head><body></body></html>"#;
    let result = extractor().extract(html);

    assert_eq!(unit_text(&result, KEY_META_DESCRIPTION), "A page");
    assert_eq!(unit_text(&result, KEY_OG_TITLE), "Page OG");
    // viewport is not a translatable meta
    assert!(!result.mapping.keys().any(|k| k.contains("viewport")));
}

#[test]
fn test_extract_withAttributes_shouldSkipWhitespaceWithoutConsumingIndex() {
    let html = r#"<html><body>
        <img src="a.png" alt="   ">
        <img src="b.png" alt="A boat">
        <input placeholder="Your name">
    </body></html>"#;
    let result = extractor().extract(html);

    // The whitespace-only alt does not consume IMG_ALT#0
    assert_eq!(unit_text(&result, "IMG_ALT#0"), "A boat");
    assert_eq!(unit_text(&result, "PLACEHOLDER#0"), "Your name");
    assert!(!result.mapping.contains_key("IMG_ALT#1"));
}

#[test]
fn test_extract_withJsonLd_shouldExtractParseableScriptsOnly() {
    let html = r#"<html><head>
        <script type="application/ld+json">{"@type": "Article", "headline": "Hello"}</script>
        <script type="application/ld+json">not json at all</script>
    </head><body></body></html>"#;
    let result = extractor().extract(html);

    assert!(unit_text(&result, "JSONLD#0").contains("Article"));
    assert!(!result.mapping.contains_key("JSONLD#1"));
    // JSON-LD scripts are never vaulted
    assert_eq!(result.vault.len(), 0);
}

#[test]
fn test_extract_withBlocks_shouldTagSkeletonElements() {
    let html = "<html><body><p>Hello</p></body></html>";
    let result = extractor().extract(html);

    assert!(result.skeleton.contains(&format!("{}=\"BLOCK#0\"", UNIT_ATTR)));
}

#[test]
fn test_extract_withNoTranslatableContent_shouldReturnNoUnits() {
    let html = "<html><head></head><body><script>var x;</script></body></html>";
    let result = extractor().extract(html);

    assert!(result.units.is_empty());
}

#[test]
fn test_extract_withUnitsAndMapping_shouldStayIndexAligned() {
    let html = r#"<html><head><title>T</title></head>
        <body><p>One</p><img alt="Two"><p>Three</p></body></html>"#;
    let result = extractor().extract(html);

    assert_eq!(result.units.len(), result.mapping.len());
    for unit in &result.units {
        assert_eq!(result.mapping.get(&unit.key), Some(&unit.text));
    }
}
