use std::ops::RangeInclusive;

/// Strips surrounding whitespace, quotation marks and punctuation.
pub fn cleanup_word(word: impl AsRef<str>) -> String {
    const QUOTATION_MARKS: &str = "„“‟”‟’’❝❞〝〞〟＂'‚‘❛❜`\"";
    const SYMBOLS: &str = "!$%^&*()_-+=<,>.?/{}[]\\|~\t\r\n";
    word.as_ref()
        .trim_matches(char::is_whitespace)
        .trim_matches(&QUOTATION_MARKS.chars().collect::<Vec<_>>()[..])
        .trim_matches(&SYMBOLS.chars().collect::<Vec<_>>()[..])
        .to_string()
}

/// Whether a cleaned token is a word worth indexing rather than tweet
/// noise (mentions, hashtags, links, numbers, emoji, markup, zalgo).
pub fn word_qualifies(word: &str) -> bool {
    use url::Url;

    // Zalgo detection algorithm
    fn is_zalgo(s: &str) -> bool {
        use zalgo::is_zalgo;
        const ZALGO_MIN_RATIO: f64 = 0.75;
        let chars = s.chars().collect::<Vec<_>>();
        chars.iter().filter(|&&c| is_zalgo(c)).count() as f64 / chars.len() as f64 > ZALGO_MIN_RATIO
    }

    fn is_emoji(s: &str) -> bool {
        const UNICODE_FITZPATRICK_RANGE: RangeInclusive<usize> = 0x1F3FB..=0x1F3FF;
        const UNICODE_EMOJI_BLOCK_RANGE: RangeInclusive<usize> = 0x1F600..=0x1F64F;
        s.chars().all(|c| {
            let c = c as usize;
            UNICODE_FITZPATRICK_RANGE.contains(&c) || UNICODE_EMOJI_BLOCK_RANGE.contains(&c)
        })
    }

    fn is_only_symbols(s: &str) -> bool {
        const SYMBOLS: &str = "!@#$%^&*()_-+=<,>.?/'\"{[}]\\|`~\t\r\n";
        s.chars().all(|c| SYMBOLS.contains(c))
    }

    fn is_url(s: &str) -> bool {
        const URL_PREFIXES: [&str; 5] = ["http://", "https://", "ftp://", "sftp://", "data:"];
        let is_proper_url = Url::parse(s).is_ok();
        let is_improper_url = URL_PREFIXES.iter().any(|prefix| s.starts_with(prefix));
        is_proper_url || is_improper_url
    }

    match word {
        // Empty or single characters
        s if s.chars().count() < 2 => false,
        // Mentions and hashtags
        s if s.starts_with('@') || s.starts_with('#') => false,
        s if is_url(s) => false,
        s if s.chars().all(char::is_numeric) => false,
        s if is_emoji(s) => false,
        s if s.chars().all(|c| c.is_ascii_control()) => false,
        // HTML escapes
        s if s.starts_with('&') && s.ends_with(';') => false,
        s if is_only_symbols(s) => false,
        s if is_zalgo(s) => false,
        // Retweet marker
        s if s.eq_ignore_ascii_case("rt") => false,
        _ => true,
    }
}

/// Lowercased, cleaned tokens of a tweet's text with the noise removed.
pub fn tweet_tokens(text: &str) -> Vec<String> {
    text.trim()
        .to_lowercase()
        .split_whitespace()
        .map(cleanup_word)
        .filter(|word| word_qualifies(word))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_word() {
        assert_eq!(cleanup_word("  \"hello!\" "), "hello");
        assert_eq!(cleanup_word("(world)."), "world");
    }

    #[test]
    fn test_tweet_tokens_drop_noise() {
        let tokens = tweet_tokens(
            "RT @smapp: Flooding in #Kyiv today! https://t.co/abc 2015 \u{1F600} ...",
        );
        assert_eq!(tokens, vec!["flooding", "in", "today"]);
    }

    #[test]
    fn test_word_qualifies() {
        assert!(word_qualifies("river"));
        assert!(!word_qualifies("a"));
        assert!(!word_qualifies("12345"));
        assert!(!word_qualifies("ftp://example"));
    }

    #[test]
    fn test_retweet_marker_in_any_case() {
        for marker in ["rt", "RT", "Rt"] {
            assert!(!word_qualifies(marker), "{marker}");
        }
        assert!(word_qualifies("rte"));
        assert_eq!(tweet_tokens("RT rt Rt storm"), vec!["storm"]);
    }
}
