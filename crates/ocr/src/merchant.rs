use regex::Regex;
use slipscan_core::ExtractionConfig;

use crate::total::keyword_alternation;

/// Picks the merchant name from the receipt header: the first leading line
/// that reads like a name rather than a number run or a boilerplate label.
#[derive(Debug, Clone)]
pub struct MerchantExtractor {
    /// Matches lines whose first word is a deny-listed term; `None` when the
    /// deny list is empty.
    boilerplate: Option<Regex>,
    window: usize,
    min_alpha_ratio: f64,
    min_len: usize,
}

impl MerchantExtractor {
    pub fn new(config: &ExtractionConfig) -> Result<Self, regex::Error> {
        let boilerplate = if config.merchant_deny_terms.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(
                r"(?i)^[^A-Za-z]*(?:{})\b",
                keyword_alternation(&config.merchant_deny_terms)
            ))?)
        };
        Ok(Self {
            boilerplate,
            window: config.merchant_window,
            min_alpha_ratio: config.min_alpha_ratio,
            min_len: config.min_merchant_len,
        })
    }

    pub fn extract(&self, lines: &[&str]) -> Option<String> {
        lines
            .iter()
            .take(self.window)
            .filter(|l| alpha_ratio(l) >= self.min_alpha_ratio)
            .filter(|l| !self.is_boilerplate(l))
            .filter(|l| l.chars().count() >= self.min_len)
            .map(|l| sanitize(l))
            .find(|name| !name.is_empty())
    }

    pub fn is_boilerplate(&self, line: &str) -> bool {
        self.boilerplate.as_ref().is_some_and(|b| b.is_match(line))
    }
}

/// Share of ASCII letters among all characters of the line.
pub fn alpha_ratio(line: &str) -> f64 {
    let total = line.chars().count();
    if total == 0 {
        return 0.0;
    }
    let letters = line.chars().filter(char::is_ascii_alphabetic).count();
    letters as f64 / total as f64
}

/// Keep letters, digits, spaces and `.,&'-`; collapse whitespace runs.
pub fn sanitize(line: &str) -> String {
    let kept: String = line
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(*c, ' ' | '.' | ',' | '&' | '\'' | '-'))
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}
