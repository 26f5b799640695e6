/*!
 * Tests for the placeholder vault
 */

use weblingo::html::PlaceholderVault;

#[test]
fn test_protect_withFragments_shouldIssueSequentialTokens() {
    let mut vault = PlaceholderVault::new();
    let first = vault.protect("<script>var a = 1;</script>".to_string());
    let second = vault.protect("<style>body {}</style>".to_string());

    assert_eq!(first, "__weblingo_keep_0__");
    assert_eq!(second, "__weblingo_keep_1__");
    assert_eq!(vault.len(), 2);
}

#[test]
fn test_restore_all_withAllTokensPresent_shouldRestoreVerbatim() {
    let mut vault = PlaceholderVault::new();
    let token = vault.protect("<script>var a = 1;</script>".to_string());

    let html = format!("<body><!--{}--><p>Hola</p></body>", token);
    let restored = vault.restore_all(&html).unwrap();

    assert_eq!(restored, "<body><script>var a = 1;</script><p>Hola</p></body>");
}

#[test]
fn test_restore_all_withResidualToken_shouldFail() {
    let mut vault = PlaceholderVault::new();
    let token = vault.protect("<script></script>".to_string());

    // A bare token outside its comment carrier means the translator mangled it
    let html = format!("<p>{}</p>", token);
    assert!(vault.restore_all(&html).is_err());
}

#[test]
fn test_restore_all_withDroppedToken_shouldSucceedWithoutIt() {
    let mut vault = PlaceholderVault::new();
    vault.protect("<script></script>".to_string());

    // Translator dropped the comment entirely; not fatal
    let restored = vault.restore_all("<p>Hola</p>").unwrap();
    assert_eq!(restored, "<p>Hola</p>");
}

#[test]
fn test_restore_all_withUnknownTokenIndex_shouldFail() {
    let vault = PlaceholderVault::new();
    let result = vault.restore_all("<!--__weblingo_keep_7__-->");
    assert!(result.is_err());
}

#[test]
fn test_is_placeholder_only_withTokensAndWhitespace_shouldBeTrue() {
    assert!(PlaceholderVault::is_placeholder_only(
        "  <!--__weblingo_keep_0__-->  <!--__weblingo_keep_1__--> "
    ));
    assert!(PlaceholderVault::is_placeholder_only(""));
    assert!(!PlaceholderVault::is_placeholder_only(
        "text <!--__weblingo_keep_0__-->"
    ));
}
