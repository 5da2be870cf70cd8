use serde::Serialize;
use slipscan_core::ExtractionResult;
use slipscan_ocr::{DateShape, ReceiptFields, TotalSource};

/// Shown in place of a field that was not found.
pub const PLACEHOLDER: &str = "—";

fn or_placeholder(value: &str) -> String {
    if value.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        // Dates matched across an OCR line break carry the joiner's newline.
        value.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Human-readable summary of one receipt.
pub fn render_text(result: &ExtractionResult, fields: &ReceiptFields) -> String {
    let date_hint = fields
        .date
        .as_ref()
        .and_then(|d| d.to_naive_date())
        .map(|d| d.to_string())
        .filter(|iso| iso != result.date())
        .map(|iso| format!(" ({iso})"))
        .unwrap_or_default();

    format!(
        "Date:     {}{date_hint}\nMerchant: {}\nTotal:    {}\n",
        or_placeholder(result.date()),
        or_placeholder(result.merchant()),
        or_placeholder(result.total()),
    )
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    result: &'a ExtractionResult,
    date_shape: Option<DateShape>,
    total_source: Option<TotalSource>,
    /// The total as a plain number, markers and separators removed.
    total_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hash: Option<&'a str>,
}

pub fn render_json(
    result: &ExtractionResult,
    fields: &ReceiptFields,
    hash: Option<&str>,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        result,
        date_shape: fields.date.as_ref().map(|d| d.shape),
        total_source: fields.total.as_ref().map(|t| t.source),
        total_amount: fields.total.as_ref().and_then(|t| t.amount()).map(|d| d.to_string()),
        hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use slipscan_ocr::Extractor;

    fn both(raw: &str) -> (ExtractionResult, ReceiptFields) {
        let fields = Extractor::shared().analyze(raw);
        (fields.to_result(raw), fields)
    }

    #[test]
    fn missing_fields_show_placeholder() {
        let (result, fields) = both("=====\n42");
        assert_eq!(
            render_text(&result, &fields),
            "Date:     —\nMerchant: —\nTotal:    —\n"
        );
    }

    #[test]
    fn non_iso_date_gets_calendar_hint() {
        let (result, fields) = both("Corner Deli\n03/04/2024\nTotal $7.00");
        let text = render_text(&result, &fields);
        assert!(text.contains("Date:     03/04/2024 (2024-03-04)"), "{text}");
        assert!(text.contains("Merchant: Corner Deli"));
        assert!(text.contains("Total:    $7.00"));
    }

    #[test]
    fn iso_and_impossible_dates_get_no_hint() {
        let (result, fields) = both("Deli\n2024-03-04");
        assert!(render_text(&result, &fields).contains("Date:     2024-03-04\n"));

        let (result, fields) = both("Deli\n31-02-2024");
        assert!(render_text(&result, &fields).contains("Date:     31-02-2024\n"));
    }

    #[test]
    fn json_carries_provenance() {
        let (result, fields) = both("Deli\nTotal 3.00");
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&result, &fields, Some("abc")).unwrap()).unwrap();
        assert_eq!(json["merchant"], "Deli");
        assert_eq!(json["total"], "3.00");
        assert_eq!(json["date"], "");
        assert_eq!(json["total_source"], "bare_amount");
        assert_eq!(json["date_shape"], serde_json::Value::Null);
        assert_eq!(json["hash"], "abc");
        assert_eq!(json["total_amount"], "3.00");
    }

    #[test]
    fn json_total_amount_drops_marker_and_separators() {
        let (result, fields) = both("Deli\nTotal $1,204.50");
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&result, &fields, None).unwrap()).unwrap();
        assert_eq!(json["total"], "$1,204.50");
        assert_eq!(json["total_amount"], "1204.50");
        assert!(json.get("hash").is_none());
    }
}
