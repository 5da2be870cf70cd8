use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use slipscan_core::{parse_amount, ExtractionResult};

/// Which date layout produced a match. Variants are listed in the order the
/// date extractor tries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateShape {
    /// `YYYY-MM-DD`
    Iso,
    /// `MM-DD-YYYY`
    MonthDayYear,
    /// `DD-MM-YYYY`
    DayMonthYear,
    /// `DD Mon YYYY`
    TextMonth,
}

impl std::fmt::Display for DateShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateShape::Iso => write!(f, "iso"),
            DateShape::MonthDayYear => write!(f, "month_day_year"),
            DateShape::DayMonthYear => write!(f, "day_month_year"),
            DateShape::TextMonth => write!(f, "text_month"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateMatch {
    /// The matched substring, verbatim.
    pub text: String,
    pub shape: DateShape,
}

impl DateMatch {
    pub fn new(text: impl Into<String>, shape: DateShape) -> Self {
        Self { text: text.into(), shape }
    }

    /// Read the match as a calendar date. `None` when the text only matched
    /// syntactically (`31-02-2024`).
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        let (year, month, day) = match self.shape {
            DateShape::TextMonth => {
                let mut parts = self.text.split_whitespace();
                let day: u32 = parts.next()?.parse().ok()?;
                let month = month_from_name(parts.next()?)?;
                let year: i32 = parts.next()?.parse().ok()?;
                (year, month, day)
            }
            shape => {
                let nums: Vec<u32> = self
                    .text
                    .split(['-', '/', '.'])
                    .map(|p| p.parse().ok())
                    .collect::<Option<_>>()?;
                let &[a, b, c] = nums.as_slice() else {
                    return None;
                };
                match shape {
                    DateShape::Iso => (a as i32, b, c),
                    DateShape::MonthDayYear => (c as i32, a, b),
                    _ => (c as i32, b, a),
                }
            }
        };
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    let name = name.trim_end_matches([',', '.']).to_lowercase();
    let prefix = name.get(..3)?;
    match prefix {
        "jan" => Some(1), "feb" => Some(2), "mar" => Some(3), "apr" => Some(4),
        "may" => Some(5), "jun" => Some(6), "jul" => Some(7), "aug" => Some(8),
        "sep" => Some(9), "oct" => Some(10), "nov" => Some(11), "dec" => Some(12),
        _ => None,
    }
}

/// How the total was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalSource {
    /// Currency-tagged amount on a total keyword line.
    Currency,
    /// Plain decimal amount on a total keyword line.
    BareAmount,
    /// Largest amount anywhere on the receipt.
    LargestAmount,
}

impl std::fmt::Display for TotalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TotalSource::Currency => write!(f, "currency"),
            TotalSource::BareAmount => write!(f, "bare_amount"),
            TotalSource::LargestAmount => write!(f, "largest_amount"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalMatch {
    /// The matched substring, verbatim (currency marker included for
    /// [`TotalSource::Currency`]).
    pub text: String,
    pub source: TotalSource,
}

impl TotalMatch {
    pub fn new(text: impl Into<String>, source: TotalSource) -> Self {
        Self { text: text.into(), source }
    }

    pub fn amount(&self) -> Option<Decimal> {
        parse_amount(&self.text)
    }
}

/// Everything the extractors found for one receipt, with provenance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptFields {
    pub date: Option<DateMatch>,
    pub merchant: Option<String>,
    pub total: Option<TotalMatch>,
}

impl ReceiptFields {
    /// Flatten into the plain record, with empty strings for missing fields.
    pub fn to_result(&self, raw: &str) -> ExtractionResult {
        ExtractionResult::new(
            self.date.as_ref().map(|d| d.text.as_str()).unwrap_or_default(),
            self.merchant.as_deref().unwrap_or_default(),
            self.total.as_ref().map(|t| t.text.as_str()).unwrap_or_default(),
            raw,
        )
    }
}
