// ── Tag Normalizer ─────────────────────────────────────────────────────────
// Converts free-text input ("Rust, Systems Programming, async_io") into a
// list of canonical tag tokens (["rust", "systems-programming", "async-io"]).
// Pure function, no side effects. Duplicates are NOT removed here — dedup
// happens at the store via find-or-create.

use regex::Regex;
use std::sync::OnceLock;

/// Inputs longer than this are rejected outright (empty result).
const MAX_INPUT_CHARS: usize = 300;

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s\s+").expect("whitespace regex"))
}

fn non_tag_chars() -> &'static Regex {
    // Everything outside word chars, dot, hyphen, hash, and plus is stripped.
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w.\-#+]+").expect("strip regex"))
}

fn word_char() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w").expect("word regex"))
}

/// Normalize a comma-separated tag string into canonical tokens.
///
/// Steps, in order: length gate, whitespace collapse, trim, Unicode
/// lowercase, split on commas, then per token: trim, `_`/space → `-`,
/// strip non-tag characters, drop tokens left empty or without a single
/// word character. Token order matches input order.
pub fn normalize(input: &str) -> Vec<String> {
    if input.chars().count() > MAX_INPUT_CHARS {
        return Vec::new();
    }

    let collapsed = whitespace_runs().replace_all(input, " ");
    let lowered = collapsed.trim().to_lowercase();

    lowered
        .split(',')
        .filter_map(|raw| {
            let token = raw.trim();
            if token.is_empty() {
                return None;
            }
            let dashed: String = token
                .chars()
                .map(|c| if c == '_' || c == ' ' { '-' } else { c })
                .collect();
            let cleaned = non_tag_chars().replace_all(&dashed, "").into_owned();
            if cleaned.is_empty() || !word_char().is_match(&cleaned) {
                None
            } else {
                Some(cleaned)
            }
        })
        .collect()
}
