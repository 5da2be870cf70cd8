use crate::types::{DateMatch, DateShape};

// Year 1900–2099, month 1–12, day 1–31; leading zeros optional.
re!(re_iso,
    r"\b(?:19|20)[0-9]{2}[-/.](?:0?[1-9]|1[0-2])[-/.](?:0?[1-9]|[12][0-9]|3[01])\b");
re!(re_month_day_year,
    r"\b(?:0?[1-9]|1[0-2])[-/.](?:0?[1-9]|[12][0-9]|3[01])[-/.](?:19|20)[0-9]{2}\b");
re!(re_day_month_year,
    r"\b(?:0?[1-9]|[12][0-9]|3[01])[-/.](?:0?[1-9]|1[0-2])[-/.](?:19|20)[0-9]{2}\b");
re!(re_text_month,
    r"(?i)\b(?:0?[1-9]|[12][0-9]|3[01])\s+(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?,?\s+(?:19|20)[0-9]{2}\b");

/// Date layouts in the order they are tried. The numeric layouts overlap
/// (`01-02-2024` fits both month-first and day-first), and this order is what
/// settles it.
pub const DATE_SHAPES: [DateShape; 4] = [
    DateShape::Iso,
    DateShape::MonthDayYear,
    DateShape::DayMonthYear,
    DateShape::TextMonth,
];

fn pattern(shape: DateShape) -> &'static regex::Regex {
    match shape {
        DateShape::Iso => re_iso(),
        DateShape::MonthDayYear => re_month_day_year(),
        DateShape::DayMonthYear => re_day_month_year(),
        DateShape::TextMonth => re_text_month(),
    }
}

/// Find the first date in `joined`, trying each layout over the whole text
/// before moving to the next one.
pub fn extract_date(joined: &str) -> Option<DateMatch> {
    DATE_SHAPES.iter().find_map(|&shape| {
        pattern(shape)
            .find(joined)
            .map(|m| DateMatch::new(m.as_str(), shape))
    })
}
