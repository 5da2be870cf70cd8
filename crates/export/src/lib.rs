pub mod csv;

pub use crate::csv::{
    is_exportable, read_csv, to_csv_string, write_csv, ExportError, ExportRecord, HEADER,
};
