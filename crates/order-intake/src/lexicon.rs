//! Spoken and written quantities

const NUMBER_WORDS: [(&str, u32); 10] = [
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
];

/// Regex alternation matching any token [`value_of`] understands.
pub(crate) const QUANTITY_TOKEN: &str = r"\d+|one|two|three|four|five|six|seven|eight|nine|ten";

/// Value of a number word ("one" to "ten") or a digit string.
pub fn value_of(token: &str) -> Option<u32> {
    let token = token.trim();
    if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
        return token.parse().ok();
    }
    NUMBER_WORDS
        .iter()
        .find(|(word, _)| word.eq_ignore_ascii_case(token))
        .map(|&(_, value)| value)
}
