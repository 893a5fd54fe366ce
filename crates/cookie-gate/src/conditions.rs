//! Fixed selector and phrase lists driving cookie-surface detection and
//! dismissal.

/// Known-good vendor selectors tried first (layer 1, "strict selectors").
pub const STRICT_ACCEPT_SELECTORS: &[&str] = &[
    "#onetrust-accept-btn-handler",
    ".onetrust-close-btn-handler",
    "#CybotCookiebotDialogBodyLevelButtonLevelOptinAllowAll",
    ".CybotCookiebotDialogBodyButton",
    ".cc-allow",
    ".cc-dismiss",
    "[data-testid=\"uc-accept-all-button\"]",
    "[data-testid=\"cookie-accept-all\"]",
    "[data-accept-all]",
    "#accept-all",
    ".accept-all",
];

/// Selectors identifying the presence of a cookie surface by id/class/
/// role/test-id, independent of vendor.
pub const COOKIE_SURFACE_SELECTORS: &[&str] = &[
    "[id*=cookie i]",
    "[class*=cookie i]",
    "[id*=consent i]",
    "[class*=consent i]",
    "[role=dialog]",
    "[role=alertdialog]",
    "[data-testid*=cookie i]",
    "[data-testid*=consent i]",
];

/// Body-text keywords that, combined with >=20 chars of matching text in a
/// visible block-level element, indicate a cookie surface.
pub const COOKIE_TEXT_KEYWORDS: &[&str] = &[
    "cookie",
    "cookies",
    "consent",
    "datenschutz",
    "privacy",
];

/// Accept-phrase patterns tried by the container+text-pattern layer and
/// scored by the vision-coordinate fallback.
pub const ACCEPT_PHRASES: &[&str] = &[
    "alle akzeptieren",
    "accept all cookies",
    "accept all",
    "zustimmen",
    "i agree",
    "allow all",
    "akzeptieren",
    "agree",
];

pub const MIN_COOKIE_TEXT_LEN: usize = 20;

/// Minimum length of text in a node for it to count as an "empty accessible
/// text" signal towards the SoM interactive-score heuristic is handled
/// elsewhere; here we just need a case-insensitive substring check.
pub fn text_matches_cookie_keywords(text: &str) -> bool {
    if text.chars().count() < MIN_COOKIE_TEXT_LEN {
        return false;
    }
    let lower = text.to_lowercase();
    COOKIE_TEXT_KEYWORDS.iter().any(|k| lower.contains(k))
}

pub fn text_matches_accept_phrase(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    ACCEPT_PHRASES
        .iter()
        .find(|phrase| lower.contains(*phrase))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_never_matches_even_with_keyword() {
        assert!(!text_matches_cookie_keywords("cookie"));
    }

    #[test]
    fn long_text_with_keyword_matches() {
        assert!(text_matches_cookie_keywords(
            "We use cookies to personalise content and analyse traffic."
        ));
    }

    #[test]
    fn accept_phrase_is_case_insensitive() {
        assert_eq!(
            text_matches_accept_phrase("ALLE AKZEPTIEREN"),
            Some("alle akzeptieren")
        );
    }
}
