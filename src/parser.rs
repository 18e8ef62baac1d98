//! Extraction of codec identifiers from generated token text.
//!
//! The language model emits BiCodec codebook indices embedded in its text
//! output as `<|bicodec_semantic_N|>` and `<|bicodec_global_N|>` markers.
//! The parser is a fixed lexical-pattern matcher: it never fails, and it
//! performs no range validation — out-of-range indices are passed through
//! and left for the codec to reject.

use std::sync::LazyLock;

use regex::Regex;

use crate::protocol::{GLOBAL_ID_PATTERN, SEMANTIC_ID_PATTERN};

static SEMANTIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SEMANTIC_ID_PATTERN).expect("semantic id pattern"));
static GLOBAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(GLOBAL_ID_PATTERN).expect("global id pattern"));

/// Codec identifier sequences recovered from one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecIds {
    /// Linguistic/acoustic content tokens, in order of first appearance.
    /// Empty means the request terminates with an empty waveform.
    pub semantic: Vec<i64>,
    /// Speaker/style tokens; defaults to `[0]` when semantic tokens are
    /// present but no global marker was emitted.
    pub global: Vec<i64>,
}

impl CodecIds {
    /// True when the generation produced no semantic tokens at all. This is
    /// a valid terminal outcome, not an error; synthesis is skipped.
    pub fn is_empty(&self) -> bool {
        self.semantic.is_empty()
    }
}

fn capture_ids(re: &Regex, text: &str) -> Vec<i64> {
    re.captures_iter(text)
        .map(|caps| caps[1].parse::<i64>().unwrap_or(i64::MAX))
        .collect()
}

/// Parse generated token text into [`CodecIds`].
///
/// Deterministic for a fixed input; duplicates are kept and ordering follows
/// first appearance in the text.
pub fn parse(token_text: &str) -> CodecIds {
    let semantic = capture_ids(&SEMANTIC_RE, token_text);
    if semantic.is_empty() {
        return CodecIds {
            semantic,
            global: Vec::new(),
        };
    }
    let mut global = capture_ids(&GLOBAL_RE, token_text);
    if global.is_empty() {
        global.push(0);
    }
    CodecIds { semantic, global }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_both_sequences_in_appearance_order() {
        let text = "<|bicodec_global_7|>x<|bicodec_semantic_12|>y<|bicodec_semantic_45|>\
                    <|bicodec_global_7|>";
        let ids = parse(text);
        assert_eq!(ids.semantic, vec![12, 45]);
        // Duplicates are kept verbatim.
        assert_eq!(ids.global, vec![7, 7]);
    }

    #[test]
    fn missing_global_markers_default_to_zero() {
        let ids = parse("<|bicodec_semantic_12|><|bicodec_semantic_45|>");
        assert_eq!(ids.semantic, vec![12, 45]);
        assert_eq!(ids.global, vec![0]);
    }

    #[test]
    fn no_semantic_markers_is_the_terminal_empty_case() {
        let ids = parse("<|bicodec_global_3|> some stray text <|im_end|>");
        assert!(ids.is_empty());
        assert!(ids.global.is_empty());
    }

    #[test]
    fn parse_is_deterministic() {
        let text = "<|bicodec_semantic_1|><|bicodec_global_2|><|bicodec_semantic_1|>";
        assert_eq!(parse(text), parse(text));
    }

    #[test]
    fn malformed_markers_are_ignored_without_error() {
        let ids = parse("<|bicodec_semantic_|><|bicodec_semantic_a1|><|bicodec_semantic_9|");
        assert!(ids.is_empty());
    }
}
