//! Response comparison for the SQLi probes

use similar::TextDiff;

/// Similarity below this is treated as a different page. Dynamic pages
/// vary token-wise (timestamps, CSRF tokens); a 5% budget absorbs that
/// noise while still flagging changed error pages and suppressed
/// content.
const SIMILARITY_THRESHOLD: f64 = 0.95;

/// Bodies are compared on at most this prefix to bound diff cost
const MAX_COMPARE_BYTES: usize = 64 * 1024;

/// Whether two response bodies differ beyond dynamic-content noise.
///
/// Similarity is a character diff ratio on the [0, 1] scale where 1.0
/// means identical. Two empty bodies are never different.
pub fn is_different(original: &str, modified: &str) -> bool {
    if original.is_empty() && modified.is_empty() {
        return false;
    }
    let diff = TextDiff::from_chars(clip(original), clip(modified));
    f64::from(diff.ratio()) < SIMILARITY_THRESHOLD
}

/// Truncates to the comparison cap without splitting a code point
fn clip(body: &str) -> &str {
    if body.len() <= MAX_COMPARE_BYTES {
        return body;
    }
    let mut end = MAX_COMPARE_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// Case-insensitive scan returning the first keyword present in `body`
pub fn find_keyword(body: &str, keywords: &[&'static str]) -> Option<&'static str> {
    let lowered = body.to_lowercase();
    keywords.iter().copied().find(|k| lowered.contains(k))
}
