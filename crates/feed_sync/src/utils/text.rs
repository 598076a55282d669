//! Small text helpers shared by the feed parser and the drift checker.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Tags that survive description sanitization; everything else is stripped
/// down to its inner text.
const ALLOWED_TAGS: &[&str] = &[
    "a", "b", "i", "em", "strong", "p", "br", "ul", "ol", "li", "blockquote", "img",
];

static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").expect("invalid script regex"));
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)</?([a-zA-Z][a-zA-Z0-9]*)[^>]*/?>").expect("invalid tag regex"));
static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("invalid comment regex"));
static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(?:#(\d+)|#x([0-9a-fA-F]+)|([a-zA-Z]+));").expect("invalid entity regex"));

/// YouTube descriptions sometimes come back with \r\n line endings and
/// sometimes with \n; comparisons treat the two as equivalent.
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Decode the handful of HTML entities that show up in feed titles and
/// enclosure urls. Unknown named entities are left untouched.
pub fn unescape(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            if let Some(dec) = caps.get(1) {
                return dec
                    .as_str()
                    .parse::<u32>()
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_else(|| caps[0].to_string());
            }
            if let Some(hex) = caps.get(2) {
                return u32::from_str_radix(hex.as_str(), 16)
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_else(|| caps[0].to_string());
            }
            match &caps[3] {
                "amp" => "&".to_string(),
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                "nbsp" => " ".to_string(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Strip a feed-supplied description down to a small allowlist of markup.
/// Script and style blocks disappear with their contents, comments are
/// dropped, and any other tag is removed while its inner text is kept.
pub fn clean_html(html: &str) -> String {
    let without_scripts = SCRIPT_RE.replace_all(html, "");
    let without_comments = COMMENT_RE.replace_all(&without_scripts, "");
    TAG_RE
        .replace_all(&without_comments, |caps: &Captures| {
            let name = caps[1].to_ascii_lowercase();
            if ALLOWED_TAGS.contains(&name.as_str()) {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_newlines() {
        assert_eq!(
            normalize_newlines("hello\r\nthere"),
            normalize_newlines("hello\nthere")
        );
        assert_eq!(normalize_newlines("bare\rreturn"), "bare\nreturn");
        assert!(matches!(normalize_newlines("no crlf"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(unescape("&lt;b&gt;"), "<b>");
        assert_eq!(unescape("&#39;quoted&#39;"), "'quoted'");
        assert_eq!(unescape("&#x27;hex&#x27;"), "'hex'");
        assert_eq!(unescape("&unknown; stays"), "&unknown; stays");
    }

    #[test]
    fn test_clean_html_strips_script() {
        assert_eq!(
            clean_html("before<script>alert('x')</script>after"),
            "beforeafter"
        );
        assert_eq!(clean_html("a<style>p {}</style>b"), "ab");
    }

    #[test]
    fn test_clean_html_keeps_allowed_tags() {
        assert_eq!(
            clean_html("<p>Dave is a <strong>great</strong> advocate.</p>"),
            "<p>Dave is a <strong>great</strong> advocate.</p>"
        );
        assert_eq!(
            clean_html("<div class=\"wrap\"><em>kept</em></div>"),
            "<em>kept</em>"
        );
    }

    #[test]
    fn test_clean_html_drops_comments() {
        assert_eq!(clean_html("keep<!-- not this -->this"), "keepthis");
    }
}
