//! Candidate order lines from free-form conversation text

use crate::error::Result;
use crate::lexicon::{self, QUANTITY_TOKEN};
use crate::lines::RawOrderLine;
use crate::IntakeConfig;
use regex::{Captures, Match, Regex};
use tracing::debug;

const TERMINATOR: &str = r"(?:\.|,|\band\b|\bwith\b|$)";
const CONNECTORS: [&str; 2] = ["and", "with"];

/// Pattern-based extractor for spoken orders.
///
/// Two passes run over the text: quantity/item windows first, then a sweep
/// for well-known nouns mentioned without any quantity.
#[derive(Debug, Clone)]
pub struct TextOrderExtractor {
    patterns: Vec<(&'static str, Regex)>,
    known_items: Vec<String>,
}

impl TextOrderExtractor {
    /// Create an extractor using the vocabulary from `config`
    pub fn new(config: &IntakeConfig) -> Result<Self> {
        Self::with_known_items(config.known_items.iter().cloned())
    }

    pub fn with_known_items<I, S>(known_items: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        // Quantity before the item: "two rebel burgers and ..."
        let quantity_first = Regex::new(&format!(
            r"(?i)\b({QUANTITY_TOKEN})\b\s+([\w\s]+?)\s*{TERMINATOR}"
        ))?;
        // Item before the quantity: "fries 2, ..."
        let quantity_last = Regex::new(&format!(
            r"(?i)([\w\s]+?)\s+\b({QUANTITY_TOKEN})\b\s*{TERMINATOR}"
        ))?;

        let known_items = known_items
            .into_iter()
            .map(|s| {
                let s: String = s.into();
                s.trim().to_lowercase()
            })
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            patterns: vec![
                ("quantity_first", quantity_first),
                ("quantity_last", quantity_last),
            ],
            known_items,
        })
    }

    pub fn known_items(&self) -> &[String] {
        &self.known_items
    }

    /// Extract raw order lines.
    ///
    /// Quantity matches come back in the order they appear in the text,
    /// followed by any known names mentioned without a quantity.
    pub fn extract(&self, text: &str) -> Vec<RawOrderLine> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let lowered = text.to_lowercase();
        let mut found: Vec<(usize, RawOrderLine)> = Vec::new();
        for (pattern_name, regex) in &self.patterns {
            let mut at = 0;
            while let Some(captures) = regex.captures_at(text, at) {
                let (Some(whole), Some((quantity, item))) = (captures.get(0), split(&captures))
                else {
                    break;
                };
                match item_phrase(quantity, item) {
                    Some(name) => {
                        let count = lexicon::value_of(quantity.as_str()).unwrap_or(1);
                        debug!(
                            pattern = pattern_name,
                            item = name,
                            quantity = count,
                            "quantity match"
                        );
                        let line = RawOrderLine::new(name, count)
                            .with_modifiers(modifiers_for(&lowered, name));
                        found.push((whole.start(), line));
                        at = whole.end();
                    }
                    None => {
                        // Count belongs to the previous item; resume right after it
                        debug!(
                            pattern = pattern_name,
                            span = whole.as_str(),
                            "connector after quantity"
                        );
                        at = quantity.end();
                    }
                }
            }
        }
        found.sort_by_key(|(start, _)| *start);

        let mut lines: Vec<RawOrderLine> = found.into_iter().map(|(_, line)| line).collect();
        self.known_name_pass(&lowered, &mut lines);
        lines
    }

    fn known_name_pass(&self, lowered: &str, lines: &mut Vec<RawOrderLine>) {
        for noun in &self.known_items {
            if lines
                .iter()
                .any(|line| line.name.to_lowercase().contains(noun.as_str()))
            {
                continue;
            }
            if lowered.contains(noun.as_str()) {
                debug!(item = %noun, "mention without quantity");
                lines.push(RawOrderLine::new(noun.clone(), 1));
            }
        }
    }
}

/// Quantity and item captures, told apart by which one is a number.
fn split<'t>(captures: &Captures<'t>) -> Option<(Match<'t>, Match<'t>)> {
    let first = captures.get(1)?;
    let second = captures.get(2)?;
    if lexicon::value_of(first.as_str()).is_some() {
        Some((first, second))
    } else {
        Some((second, first))
    }
}

/// The item name for a match, or `None` when the match names no item.
///
/// After a quantity, a leading connector ("2 and a soda") means the count
/// belongs to the item before it. Before a quantity ("..., and cokes 3") the
/// connector only joins the previous item and is dropped.
fn item_phrase<'t>(quantity: Match<'t>, item: Match<'t>) -> Option<&'t str> {
    let mut phrase = item.as_str().trim();
    if quantity.start() < item.start() {
        if leading_connector(phrase).is_some() {
            return None;
        }
    } else {
        while let Some(rest) = leading_connector(phrase) {
            phrase = rest;
        }
    }
    (!phrase.is_empty()).then_some(phrase)
}

/// The rest of `phrase` when it starts with a connector word.
fn leading_connector(phrase: &str) -> Option<&str> {
    let (word, rest) = phrase.split_once(char::is_whitespace).unwrap_or((phrase, ""));
    CONNECTORS
        .iter()
        .any(|c| word.eq_ignore_ascii_case(c))
        .then(|| rest.trim_start())
}

/// Modifier phrases from an "<item> with a, b" clause anywhere in `lowered`.
fn modifiers_for(lowered: &str, item: &str) -> Vec<String> {
    let item = item.to_lowercase();
    for (position, _) in lowered.match_indices(item.as_str()) {
        let after = &lowered[position + item.len()..];
        let trimmed = after.trim_start();
        if trimmed.len() == after.len() {
            continue;
        }
        let Some(clause) = trimmed.strip_prefix("with") else {
            continue;
        };
        let list = clause.trim_start();
        if list.len() == clause.len() {
            continue;
        }

        let end = list
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == ',' || c.is_whitespace()))
            .unwrap_or(list.len());
        return list[..end]
            .split(',')
            .map(str::trim)
            .filter(|phrase| !phrase.is_empty())
            .map(str::to_string)
            .collect();
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> TextOrderExtractor {
        TextOrderExtractor::new(&IntakeConfig::default()).unwrap()
    }

    fn names(lines: &[RawOrderLine]) -> Vec<(&str, u32)> {
        lines
            .iter()
            .map(|l| (l.name.as_str(), l.quantity.get()))
            .collect()
    }

    #[test]
    fn test_quantity_then_item() {
        let lines = extractor().extract("can I get two rebel burgers and one coke");
        assert_eq!(names(&lines), vec![("rebel burgers", 2), ("coke", 1)]);
    }

    #[test]
    fn test_item_then_quantity() {
        let lines = extractor().extract("milkshakes 3, thanks");
        assert_eq!(names(&lines), vec![("milkshakes", 3)]);
    }

    #[test]
    fn test_digits_and_terminators() {
        let lines = extractor().extract("I'll take 2 cheeseburgers. Also 12 nuggets, please");
        assert_eq!(names(&lines), vec![("cheeseburgers", 2), ("nuggets", 12)]);
    }

    #[test]
    fn test_number_words_need_word_boundaries() {
        let lines = extractor().extract("someone often orders here");
        assert!(lines.is_empty());
    }

    #[test]
    fn test_modifier_clause() {
        let lines = extractor().extract("one poutine with gravy, extra curds");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name, "poutine");
        assert_eq!(lines[0].modifier_phrases, vec!["gravy", "extra curds"]);
    }

    #[test]
    fn test_known_name_without_quantity() {
        let lines = extractor().extract("I'd like some fries");
        assert_eq!(names(&lines), vec![("fries", 1)]);
        assert!(lines[0].modifier_phrases.is_empty());
    }

    #[test]
    fn test_known_name_not_duplicated() {
        let lines = extractor().extract("two fries and a coke");
        assert_eq!(names(&lines), vec![("fries", 2), ("coke", 1)]);
    }

    #[test]
    fn test_connector_is_not_an_item() {
        let lines = extractor().extract("fries 2 and a soda");
        assert_eq!(names(&lines), vec![("fries", 2), ("soda", 1)]);
    }

    #[test]
    fn test_quantity_after_connector_is_kept() {
        let lines = extractor().extract("fries 2 and 3 cokes");
        assert_eq!(names(&lines), vec![("fries", 2), ("cokes", 3)]);

        let lines = extractor().extract("burgers 2 and 3 fries");
        assert_eq!(names(&lines), vec![("burgers", 2), ("fries", 3)]);
    }

    #[test]
    fn test_connector_before_trailing_quantity_dropped() {
        let lines = extractor().extract("fries 2, and cokes 3");
        assert_eq!(names(&lines), vec![("fries", 2), ("cokes", 3)]);
    }

    #[test]
    fn test_modifier_clause_needs_with() {
        let lines = extractor().extract("two burgers without onions");
        assert_eq!(names(&lines), vec![("burgers without onions", 2)]);
        assert!(lines[0].modifier_phrases.is_empty());

        let lines = extractor().extract("One Poutine With Gravy");
        assert_eq!(lines[0].name, "Poutine");
        assert_eq!(lines[0].modifier_phrases, vec!["gravy"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(extractor().extract("").is_empty());
        assert!(extractor().extract("   ").is_empty());
    }

    #[test]
    fn test_custom_vocabulary() {
        let extractor = TextOrderExtractor::with_known_items(["Poutine", " "]).unwrap();
        assert_eq!(extractor.known_items(), ["poutine".to_string()]);
        let lines = extractor.extract("and a poutine, and a coke");
        assert_eq!(names(&lines), vec![("poutine", 1)]);
    }
}
