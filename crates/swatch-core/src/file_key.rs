use regex::Regex;
use std::sync::OnceLock;

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"figma\.com/(?:file|design|proto|board)/([A-Za-z0-9]+)")
            .expect("file url pattern is valid")
    })
}

fn is_bare_key(input: &str) -> bool {
    !input.is_empty() && input.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Extract a file key from either a bare key or a file URL
pub fn parse_file_key(input: &str) -> Option<&str> {
    let input = input.trim();
    if is_bare_key(input) {
        return Some(input);
    }
    url_pattern()
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
