//! Delimiter-aware tabular parsing and re-encoding
//!
//! Stored dataset content is a delimited text table whose first row is the
//! header. [`Table::parse`] reads it into memory with the delimiter recorded
//! at upload time; [`Table::encode`] re-serializes it in a requested output
//! format. Row and column order are preserved exactly and cell values pass
//! through as text without type coercion.

pub mod workbook;

use thiserror::Error;

/// Errors produced while parsing or re-encoding a table
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Delimiter must be a single ASCII character, got '{0}'")]
    InvalidDelimiter(String),

    #[error("Failed to convert file: {0}")]
    Malformed(String),
}

/// Requested output representation for a stored table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Tsv,
    /// Plain text with a caller-supplied delimiter
    Text { delimiter: u8 },
    /// Single-sheet spreadsheet workbook (xlsx)
    Workbook,
}

impl OutputFormat {
    /// MIME content type for HTTP responses
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "text/csv",
            OutputFormat::Tsv => "text/tab-separated-values",
            OutputFormat::Text { .. } => "text/plain",
            OutputFormat::Workbook => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            },
        }
    }

    /// File extension used in the download filename
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Text { .. } => "txt",
            OutputFormat::Workbook => "xlsx",
        }
    }

    fn delimiter(&self) -> Option<u8> {
        match self {
            OutputFormat::Csv => Some(b','),
            OutputFormat::Tsv => Some(b'\t'),
            OutputFormat::Text { delimiter } => Some(*delimiter),
            OutputFormat::Workbook => None,
        }
    }
}

/// Validate a delimiter string and return its single byte.
///
/// Delimiters are stored and transmitted as strings but must be exactly one
/// ASCII character for the csv reader/writer.
pub fn delimiter_byte(s: &str) -> Result<u8, TableError> {
    let bytes = s.as_bytes();
    if bytes.len() != 1 || !bytes[0].is_ascii() {
        return Err(TableError::InvalidDelimiter(s.to_string()));
    }
    Ok(bytes[0])
}

/// An in-memory rectangular table: one header row plus zero or more data rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse delimited text into a table.
    ///
    /// The first record is the header. Every data row must have the same
    /// number of fields as the header or parsing fails with the underlying
    /// csv error message. An empty payload is a valid table with no header
    /// and zero rows.
    pub fn parse(text: &str, delimiter: u8) -> Result<Self, TableError> {
        if text.is_empty() {
            return Ok(Self {
                header: Vec::new(),
                rows: Vec::new(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(false)
            .from_reader(text.as_bytes());

        let header = reader
            .headers()
            .map_err(|e| TableError::Malformed(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| TableError::Malformed(e.to_string()))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { header, rows })
    }

    /// Column names from the header row
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Data rows, in original order
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// True when the payload was empty (no header, no rows)
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.rows.is_empty()
    }

    /// Re-serialize the table in the requested output format.
    pub fn encode(&self, format: &OutputFormat) -> Result<Vec<u8>, TableError> {
        match format.delimiter() {
            Some(delimiter) => self.encode_delimited(delimiter),
            None => workbook::encode_workbook(self),
        }
    }

    fn encode_delimited(&self, delimiter: u8) -> Result<Vec<u8>, TableError> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());

        writer
            .write_record(&self.header)
            .map_err(|e| TableError::Malformed(e.to_string()))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|e| TableError::Malformed(e.to_string()))?;
        }

        writer
            .into_inner()
            .map_err(|e| TableError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_csv() {
        let table = Table::parse("a,b\n1,2\n3,4", b',').unwrap();
        assert_eq!(table.header(), &["a".to_string(), "b".to_string()]);
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0], vec!["1".to_string(), "2".to_string()]);
        assert_eq!(table.rows()[1], vec!["3".to_string(), "4".to_string()]);
    }

    #[test]
    fn test_parse_empty_payload_is_valid() {
        let table = Table::parse("", b',').unwrap();
        assert!(table.is_empty());
        assert_eq!(table.encode(&OutputFormat::Csv).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_parse_ragged_rows_fail() {
        let result = Table::parse("a,b\n1,2,3", b',');
        assert!(matches!(result, Err(TableError::Malformed(_))));
    }

    #[test]
    fn test_parse_semicolon_delimiter() {
        let table = Table::parse("x;y\n1;2", b';').unwrap();
        assert_eq!(table.header(), &["x".to_string(), "y".to_string()]);
        assert_eq!(table.rows()[0], vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_csv_to_tsv() {
        let table = Table::parse("a,b\n1,2\n3,4", b',').unwrap();
        let out = table.encode(&OutputFormat::Tsv).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a\tb\n1\t2\n3\t4\n");
    }

    #[test]
    fn test_csv_to_custom_delimiter() {
        let table = Table::parse("a,b\n1,2", b',').unwrap();
        let out = table.encode(&OutputFormat::Text { delimiter: b'|' }).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a|b\n1|2\n");
    }

    #[test]
    fn test_same_delimiter_round_trip() {
        let text = "a,b\n1,2\n3,4\n";
        let table = Table::parse(text, b',').unwrap();
        let out = table.encode(&OutputFormat::Csv).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), text);
    }

    #[test]
    fn test_cells_pass_through_as_text() {
        // Leading zeros and mixed types must survive re-encoding untouched
        let table = Table::parse("id,value\n007,3.50\nabc,1e5", b',').unwrap();
        let out = table.encode(&OutputFormat::Csv).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "id,value\n007,3.50\nabc,1e5\n");
    }

    #[test]
    fn test_row_and_column_order_preserved() {
        let table = Table::parse("z,a,m\n3,1,2\n9,7,8", b',').unwrap();
        assert_eq!(table.header(), &["z".to_string(), "a".to_string(), "m".to_string()]);
        let out = table.encode(&OutputFormat::Csv).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "z,a,m\n3,1,2\n9,7,8\n");
    }

    #[test]
    fn test_header_only_table() {
        let table = Table::parse("a,b", b',').unwrap();
        assert_eq!(table.rows().len(), 0);
        let out = table.encode(&OutputFormat::Csv).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a,b\n");
    }

    #[test]
    fn test_delimiter_byte_valid() {
        assert_eq!(delimiter_byte(",").unwrap(), b',');
        assert_eq!(delimiter_byte("|").unwrap(), b'|');
        assert_eq!(delimiter_byte("\t").unwrap(), b'\t');
    }

    #[test]
    fn test_delimiter_byte_invalid() {
        assert!(matches!(delimiter_byte(""), Err(TableError::InvalidDelimiter(_))));
        assert!(matches!(delimiter_byte(";;"), Err(TableError::InvalidDelimiter(_))));
        assert!(matches!(delimiter_byte("รถ"), Err(TableError::InvalidDelimiter(_))));
    }

    #[test]
    fn test_content_types() {
        assert_eq!(OutputFormat::Csv.content_type(), "text/csv");
        assert_eq!(OutputFormat::Tsv.content_type(), "text/tab-separated-values");
        assert_eq!(OutputFormat::Text { delimiter: b'|' }.content_type(), "text/plain");
        assert_eq!(OutputFormat::Csv.extension(), "csv");
        assert_eq!(OutputFormat::Tsv.extension(), "tsv");
        assert_eq!(OutputFormat::Text { delimiter: b'|' }.extension(), "txt");
        assert_eq!(OutputFormat::Workbook.extension(), "xlsx");
    }
}
