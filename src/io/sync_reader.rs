//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over operation records from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Design
//!
//! The SyncReader uses csv::Reader to read and deserialize CSV records
//! sequentially. It processes one row at a time without loading the entire
//! file into memory.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding
//! `Result<OperationRecord, LedgerError>` for each CSV row:
//!
//! ```no_run
//! use rust_bank_ledger::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("operations.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(record) => println!("Applying operation: {:?}", record),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual record errors are yielded as Err variants in the iterator
//! - Row-level CSV errors carry the line number

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::{LedgerError, OperationRecord};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

/// Synchronous CSV reader
///
/// Provides an iterator interface over operation records.
/// Maintains streaming behavior with constant memory usage.
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
}

impl SyncReader {
    /// Create a new SyncReader from a file path
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (amount and target are optional)
    /// - Use an 8KB buffer for efficient I/O
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the CSV file
    ///
    /// # Errors
    ///
    /// * `LedgerError::FileNotFound` if the path does not exist
    /// * `LedgerError::IoError` if the file could not be opened otherwise
    pub fn new(path: &Path) -> Result<Self, LedgerError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => LedgerError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => LedgerError::IoError {
                message: format!("Failed to open file '{}': {}", path.display(), e),
            },
        })?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self { reader })
    }
}

impl Iterator for SyncReader {
    type Item = Result<OperationRecord, LedgerError>;

    /// Get the next operation record from the CSV file
    ///
    /// # Returns
    ///
    /// * `Some(Ok(OperationRecord))` - Successfully parsed record
    /// * `Some(Err(LedgerError))` - Parse or conversion error
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<CsvRecord>();

        match deserializer.next()? {
            Ok(csv_record) => Some(convert_csv_record(csv_record)),
            Err(e) => Some(Err(LedgerError::from(e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OperationType;
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_sync_reader_new_fails_on_missing_file() {
        let result = SyncReader::new(Path::new("nonexistent.csv"));

        assert!(matches!(result, Err(LedgerError::FileNotFound { .. })));
    }

    #[test]
    fn test_sync_reader_iterates_open_and_transfer() {
        let file = create_temp_csv(
            "type,account,amount,target\nopen,1,100.0,\nopen,2,0,\ntransfer,1,25.5,2\n",
        );

        let records: Vec<_> = SyncReader::new(file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].op_type, OperationType::Open);
        assert_eq!(records[0].amount, Some(Decimal::new(1000, 1)));
        assert_eq!(records[2].op_type, OperationType::Transfer);
        assert_eq!(records[2].account, 1);
        assert_eq!(records[2].target, Some(2));
        assert_eq!(records[2].amount, Some(Decimal::new(255, 1)));
    }

    #[test]
    fn test_sync_reader_accepts_short_rows() {
        let file = create_temp_csv("type,account,amount,target\nsync,3\ndeposit,3,1\n");

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(records.len(), 2);
        let sync = records[0].as_ref().unwrap();
        assert_eq!(sync.op_type, OperationType::Sync);
        assert_eq!(sync.amount, None);
        assert_eq!(sync.target, None);
        assert!(records[1].is_ok());
    }

    #[test]
    fn test_sync_reader_continues_after_error() {
        let file = create_temp_csv(
            "type,account,amount,target\n\
            deposit,1,100.0,\n\
            deposit,2,invalid,\n\
            frobnicate,2,1,\n\
            deposit,x,1,\n\
            deposit,3,75.0,\n",
        );

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(records.len(), 5);
        assert!(records[0].is_ok());
        assert!(matches!(
            records[1],
            Err(LedgerError::MalformedAmount { account: 2, .. })
        ));
        assert!(matches!(
            records[2],
            Err(LedgerError::InvalidOperationType { .. })
        ));
        assert!(matches!(
            records[3],
            Err(LedgerError::ParseError { line: Some(_), .. })
        ));
        assert!(records[4].is_ok());
    }

    #[test]
    fn test_sync_reader_handles_whitespace() {
        let file = create_temp_csv("type,account,amount,target\n  Deposit  ,  1  ,  100.0  ,\n");

        let records: Vec<_> = SyncReader::new(file.path())
            .unwrap()
            .filter_map(Result::ok)
            .collect();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].account, 1);
        assert_eq!(records[0].amount, Some(Decimal::new(1000, 1)));
    }

    #[test]
    fn test_sync_reader_handles_empty_file_after_header() {
        let file = create_temp_csv("type,account,amount,target\n");

        assert_eq!(SyncReader::new(file.path()).unwrap().count(), 0);
    }
}
