use regex::Regex;
use rust_decimal::Decimal;
use slipscan_core::{parse_amount, CURRENCY_MARKERS};

use crate::types::{TotalMatch, TotalSource};

/// A decimal amount with exactly two fraction digits, thousands separators optional.
const AMOUNT: &str = r"[0-9]{1,3}(?:,[0-9]{3})+\.[0-9]{2}|[0-9]+\.[0-9]{2}";

re!(re_amount, AMOUNT);
// A currency marker immediately followed by an amount.
re!(re_currency_amount, &format!(
    "(?:{})(?:{})",
    keyword_alternation(CURRENCY_MARKERS),
    AMOUNT
));

/// Build an alternation from a term list, each term escaped. Spaces inside a
/// term match any run of whitespace.
pub(crate) fn keyword_alternation<S: AsRef<str>>(terms: &[S]) -> String {
    terms
        .iter()
        .map(|t| {
            t.as_ref()
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// Locates the receipt total: the bottom-most total keyword line that carries
/// an amount, else the largest amount printed anywhere.
#[derive(Debug, Clone)]
pub struct TotalExtractor {
    /// `None` for an empty keyword list: no line is a total line.
    keyword: Option<Regex>,
}

impl TotalExtractor {
    pub fn new(keywords: &[String]) -> Result<Self, regex::Error> {
        if keywords.is_empty() {
            return Ok(Self { keyword: None });
        }
        let keyword = Regex::new(&format!(r"(?i)\b(?:{})\b", keyword_alternation(keywords)))?;
        Ok(Self { keyword: Some(keyword) })
    }

    pub fn is_keyword_line(&self, line: &str) -> bool {
        self.keyword.as_ref().is_some_and(|k| k.is_match(line))
    }

    pub fn extract(&self, lines: &[&str]) -> Option<TotalMatch> {
        self.from_keyword_lines(lines).or_else(|| largest_amount(lines))
    }

    fn from_keyword_lines(&self, lines: &[&str]) -> Option<TotalMatch> {
        for line in lines.iter().rev() {
            if !self.is_keyword_line(line) {
                continue;
            }
            if let Some(m) = re_currency_amount().find(line) {
                tracing::debug!(line = %line, "total taken from currency amount on keyword line");
                return Some(TotalMatch::new(m.as_str(), TotalSource::Currency));
            }
            if let Some(amount) = bare_amount(line) {
                tracing::debug!(line = %line, "total taken from bare amount on keyword line");
                return Some(TotalMatch::new(amount, TotalSource::BareAmount));
            }
        }
        None
    }
}

/// First amount on the line that is not glued to a letter on either side.
fn bare_amount(line: &str) -> Option<&str> {
    re_amount()
        .find_iter(line)
        .find(|m| {
            let before = line[..m.start()].chars().next_back();
            let after = line[m.end()..].chars().next();
            !before.is_some_and(char::is_alphabetic) && !after.is_some_and(char::is_alphabetic)
        })
        .map(|m| m.as_str())
}

/// The numerically largest amount across all lines, kept in its printed form.
/// Ties keep the earliest occurrence. Nothing is returned unless the maximum
/// is strictly positive.
fn largest_amount(lines: &[&str]) -> Option<TotalMatch> {
    let mut best: Option<(Decimal, &str)> = None;
    for line in lines {
        for m in re_amount().find_iter(line) {
            let Some(value) = parse_amount(m.as_str()) else {
                continue;
            };
            if best.map_or(true, |(max, _)| value > max) {
                best = Some((value, m.as_str()));
            }
        }
    }

    let (value, text) = best?;
    if value <= Decimal::ZERO {
        return None;
    }
    tracing::debug!(amount = %text, "total taken from largest amount on receipt");
    Some(TotalMatch::new(text, TotalSource::LargestAmount))
}
