//! Free-text sanitization.
//!
//! Every text field passes through [`sanitize`] before any further
//! validation. The sanitizer removes script-bearing content and residual
//! markup so that nothing executable or structural survives into the stores
//! or rendered pages downstream.

use std::sync::LazyLock;

use regex::Regex;

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("script pattern is valid")
});

static IFRAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<iframe[^>]*>.*?</iframe>").expect("iframe pattern is valid")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Sanitizes one free-text value.
///
/// Trims surrounding whitespace, removes `<script>` and `<iframe>` blocks
/// (case-insensitive, across newlines) including their content, then strips
/// any remaining angle-bracket markup.
///
/// # Example
///
/// ```
/// use clinrec_validation::sanitize;
///
/// assert_eq!(sanitize("  Urban "), "Urban");
/// assert_eq!(sanitize("Male<script>alert(1)</script>"), "Male");
/// ```
#[must_use]
pub fn sanitize(input: &str) -> String {
    let trimmed = input.trim();
    let without_scripts = SCRIPT_RE.replace_all(trimmed, "");
    let without_iframes = IFRAME_RE.replace_all(&without_scripts, "");
    TAG_RE.replace_all(&without_iframes, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_whitespace() {
        assert_eq!(sanitize("  Private  "), "Private");
    }

    #[test]
    fn strips_script_blocks_with_content() {
        assert_eq!(sanitize("<script>document.cookie</script>Rural"), "Rural");
        assert_eq!(sanitize("Rural<SCRIPT type='x'>x</SCRIPT>"), "Rural");
    }

    #[test]
    fn strips_script_blocks_across_newlines() {
        assert_eq!(sanitize("Yes<script>\nsteal()\n</script>"), "Yes");
    }

    #[test]
    fn strips_iframes_and_residual_tags() {
        assert_eq!(sanitize("<iframe src='x'>evil</iframe>Urban"), "Urban");
        assert_eq!(sanitize("<b>Male</b>"), "Male");
        assert_eq!(sanitize("<img src=x onerror=alert(1)>Other"), "Other");
    }

    #[test]
    fn leaves_clean_text_untouched() {
        assert_eq!(sanitize("never smoked"), "never smoked");
    }
}
