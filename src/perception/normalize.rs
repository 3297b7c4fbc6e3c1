// Case and diacritic folding for on-screen text comparisons.
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Decomposes, drops combining marks, lowercases and maps every kind of
/// whitespace (apps love U+00A0 around currency symbols) to a plain space.
pub fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect()
}

/// Case- and diacritic-insensitive substring test.
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    fold(haystack).contains(&fold(needle))
}
