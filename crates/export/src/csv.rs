use serde::{Deserialize, Serialize};
use slipscan_core::ExtractionResult;
use std::io::{Read, Write};
use thiserror::Error;

/// Column names of the exported record, in order.
pub const HEADER: [&str; 3] = ["Date", "Merchant", "Total"];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("Nothing to export: no field was extracted")]
    NothingToExport,
    #[error("No data rows")]
    NoDataRows,
}

/// One exported row. Serialized field names form the header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Merchant")]
    pub merchant: String,
    #[serde(rename = "Total")]
    pub total: String,
}

impl From<&ExtractionResult> for ExportRecord {
    fn from(r: &ExtractionResult) -> Self {
        Self {
            date: r.date().to_string(),
            merchant: r.merchant().to_string(),
            total: r.total().to_string(),
        }
    }
}

/// Export is offered only when at least one field was found.
pub fn is_exportable(result: &ExtractionResult) -> bool {
    result.has_any_field()
}

/// Write the header row and one data row. Fields holding a comma, double
/// quote or line break are quoted, with inner quotes doubled.
pub fn write_csv<W: Write>(result: &ExtractionResult, out: W) -> Result<(), ExportError> {
    if !is_exportable(result) {
        return Err(ExportError::NothingToExport);
    }
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(out);
    writer.write_record(HEADER)?;
    writer.serialize(ExportRecord::from(result))?;
    writer.flush()?;
    Ok(())
}

pub fn to_csv_string(result: &ExtractionResult) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(result, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

/// Read back the first data row of an exported file.
pub fn read_csv<R: Read>(data: R) -> Result<ExportRecord, ExportError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(data);
    match reader.deserialize().next() {
        Some(row) => Ok(row?),
        None => Err(ExportError::NoDataRows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(date: &str, merchant: &str, total: &str) -> ExtractionResult {
        ExtractionResult::new(date, merchant, total, "raw text")
    }

    #[test]
    fn plain_values_are_unquoted() {
        let csv = to_csv_string(&result("2024-01-01", "Fresh Foods Market", "$15.42")).unwrap();
        assert_eq!(csv, "Date,Merchant,Total\n2024-01-01,Fresh Foods Market,$15.42\n");
    }

    #[test]
    fn comma_and_quote_are_escaped() {
        let csv = to_csv_string(&result("", r#"Joe's "Diner", Inc."#, "1,024.00")).unwrap();
        assert_eq!(
            csv,
            "Date,Merchant,Total\n,\"Joe's \"\"Diner\"\", Inc.\",\"1,024.00\"\n"
        );
    }

    #[test]
    fn round_trip_through_reader() {
        let original = result("3 March \n 2021", r#"Joe's "Diner", Inc."#, "$1,204.50");
        let csv = to_csv_string(&original).unwrap();
        let back = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(back, ExportRecord::from(&original));
        assert_eq!(back.merchant, r#"Joe's "Diner", Inc."#);
        assert_eq!(back.date, "3 March \n 2021");
    }

    #[test]
    fn partial_record_exports_empty_cells() {
        let csv = to_csv_string(&result("", "", "9.00")).unwrap();
        assert_eq!(csv, "Date,Merchant,Total\n,,9.00\n");
        assert_eq!(read_csv(csv.as_bytes()).unwrap().total, "9.00");
    }

    #[test]
    fn empty_record_is_not_exportable() {
        let empty = ExtractionResult::empty("garbage");
        assert!(!is_exportable(&empty));
        assert!(matches!(to_csv_string(&empty), Err(ExportError::NothingToExport)));
    }

    #[test]
    fn header_only_file_has_no_rows() {
        let err = read_csv("Date,Merchant,Total\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ExportError::NoDataRows));
    }

    #[test]
    fn write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.csv");
        let file = std::fs::File::create(&path).unwrap();
        write_csv(&result("2024-01-01", "Deli", "$3.00"), file).unwrap();

        let back = read_csv(std::fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(back.merchant, "Deli");
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().next(), Some(HEADER.join(",").as_str()));
    }
}
