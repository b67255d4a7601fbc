//! Response length limits.
//!
//! Tokens are whitespace-separated words. This is coarser than a BPE count
//! but stable across providers and cheap to compute.

/// Count whitespace-separated tokens.
pub fn count_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Cut `text` after its `max_tokens`-th token.
///
/// Text within the limit is returned unchanged, whitespace included.
/// Truncated text keeps the original spacing up to the cut and ends with `…`.
pub fn truncate_to_tokens(text: &str, max_tokens: usize) -> String {
    let mut seen = 0;
    let mut in_token = false;
    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if in_token {
                in_token = false;
                if seen == max_tokens {
                    // There is more text after the cut only if another token follows.
                    if text[idx..].trim().is_empty() {
                        return text.to_string();
                    }
                    return format!("{}…", &text[..idx]);
                }
            }
        } else if !in_token {
            in_token = true;
            seen += 1;
            if seen > max_tokens {
                return format!("{}…", text[..idx].trim_end());
            }
        }
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_words() {
        assert_eq!(count_tokens(""), 0);
        assert_eq!(count_tokens("  one\ttwo\nthree "), 3);
    }

    #[test]
    fn short_text_untouched() {
        let text = "1. Scope\n2. Build\n";
        assert_eq!(truncate_to_tokens(text, 4), text);
        assert_eq!(truncate_to_tokens(text, 40), text);
    }

    #[test]
    fn long_text_cut_at_limit() {
        assert_eq!(truncate_to_tokens("alpha beta gamma delta", 2), "alpha beta…");
        assert_eq!(truncate_to_tokens("alpha\n\nbeta", 1), "alpha…");
        assert_eq!(count_tokens(&truncate_to_tokens(&"w ".repeat(500), 400)), 400);
    }

    #[test]
    fn zero_limit_yields_marker_only() {
        assert_eq!(truncate_to_tokens("alpha", 0), "…");
        assert_eq!(truncate_to_tokens("", 0), "");
    }
}
