use rust_decimal::Decimal;
use std::str::FromStr;

/// Currency markers recognized in front of an amount.
pub const CURRENCY_MARKERS: &[&str] = &["$", "USD", "EUR", "£", "€"];

/// Parse an amount as printed on a receipt (`1,234.56`, `$11.00`, `EUR3.50`)
/// into a `Decimal`. Thousands separators and a leading currency marker are
/// dropped; the marker must touch the digits.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let mut s = s.trim();
    for marker in CURRENCY_MARKERS {
        if let Some(rest) = s.strip_prefix(marker) {
            s = rest;
            break;
        }
    }
    let clean = s.replace(',', "");
    if clean.is_empty() {
        return None;
    }
    Decimal::from_str(&clean).ok()
}
