//! CSV format handling for operation records and balance output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to domain types
//! - Balance output serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{AccountKey, AccountSnapshot, LedgerError, OperationRecord, OperationType};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns: type, account, amount, target.
/// The amount is optional because `sync` rows carry none, and the target is
/// only present on transfer rows.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub op_type: String,
    pub account: AccountKey,
    pub amount: Option<String>,
    pub target: Option<AccountKey>,
}

/// Convert a CsvRecord to an OperationRecord
///
/// This function:
/// - Parses the operation type (case-insensitive, `withdrawal` and
///   `synchronize` accepted as aliases)
/// - Parses the amount string into a Decimal (if present)
/// - Validates that amounts are present for every type but `sync`
/// - Validates that transfers name a target
///
/// Amount sign and scale are not checked here; the account rejects
/// non-positive amounts itself.
///
/// # Arguments
///
/// * `csv_record` - The deserialized CSV record
///
/// # Errors
///
/// Returns `InvalidOperationType`, `MalformedAmount`, `MissingAmount` or
/// `MissingTarget` describing the conversion failure.
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<OperationRecord, LedgerError> {
    let account = csv_record.account;
    let op_type = match csv_record.op_type.to_lowercase().as_str() {
        "open" => OperationType::Open,
        "deposit" => OperationType::Deposit,
        "withdraw" | "withdrawal" => OperationType::Withdraw,
        "transfer" => OperationType::Transfer,
        "sync" | "synchronize" => OperationType::Sync,
        _ => {
            return Err(LedgerError::invalid_operation_type(
                &csv_record.op_type,
                account,
            ))
        }
    };

    // `sync` rows carry no amount; anything in the column is ignored.
    let amount = match csv_record.amount {
        _ if !op_type.requires_amount() => None,
        Some(amount_str) if !amount_str.trim().is_empty() => {
            match Decimal::from_str(amount_str.trim()) {
                Ok(decimal) => Some(decimal),
                Err(_) => return Err(LedgerError::malformed_amount(&amount_str, account)),
            }
        }
        _ => None,
    };

    if op_type.requires_amount() && amount.is_none() {
        return Err(LedgerError::missing_amount(op_type.as_str(), account));
    }

    if op_type == OperationType::Transfer && csv_record.target.is_none() {
        return Err(LedgerError::MissingTarget { account });
    }

    // A target on anything but a transfer is ignored.
    let target = match op_type {
        OperationType::Transfer => csv_record.target,
        _ => None,
    };

    Ok(OperationRecord {
        op_type,
        account,
        amount,
        target,
    })
}

/// Write account balances to CSV format
///
/// Writes balances with columns: account, balance. Rows are sorted by
/// account key for deterministic output, and balances are rendered with four
/// decimal places.
///
/// # Arguments
///
/// * `snapshots` - Balances to write
/// * `output` - Writer receiving the CSV text
///
/// # Errors
///
/// Returns `LedgerError::IoError` if a write error occurred.
pub fn write_balances_csv(
    snapshots: &[AccountSnapshot],
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["account", "balance"])
        .map_err(|e| LedgerError::IoError {
            message: format!("Failed to write CSV header: {}", e),
        })?;

    let mut sorted = snapshots.to_vec();
    sorted.sort_by_key(|snapshot| snapshot.account);

    for snapshot in sorted {
        writer
            .write_record(&[
                snapshot.account.to_string(),
                format!("{:.4}", snapshot.balance),
            ])
            .map_err(|e| LedgerError::IoError {
                message: format!("Failed to write balance record: {}", e),
            })?;
    }

    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn csv_record(op_type: &str, amount: Option<&str>, target: Option<AccountKey>) -> CsvRecord {
        CsvRecord {
            op_type: op_type.to_string(),
            account: 1,
            amount: amount.map(|s| s.to_string()),
            target,
        }
    }

    #[rstest]
    #[case("open", OperationType::Open)]
    #[case("deposit", OperationType::Deposit)]
    #[case("withdraw", OperationType::Withdraw)]
    #[case("withdrawal", OperationType::Withdraw)]
    #[case("DEPOSIT", OperationType::Deposit)] // case insensitive
    fn test_convert_csv_record_with_amount(
        #[case] op_type: &str,
        #[case] expected_type: OperationType,
    ) {
        let record = convert_csv_record(csv_record(op_type, Some("100.0"), None)).unwrap();

        assert_eq!(record.op_type, expected_type);
        assert_eq!(record.account, 1);
        assert_eq!(record.amount, Some(Decimal::new(1000, 1)));
        assert_eq!(record.target, None);
    }

    #[rstest]
    #[case("sync")]
    #[case("Synchronize")]
    fn test_convert_csv_record_sync_without_amount(#[case] op_type: &str) {
        let record = convert_csv_record(csv_record(op_type, None, None)).unwrap();

        assert_eq!(record.op_type, OperationType::Sync);
        assert_eq!(record.amount, None);
    }

    #[test]
    fn test_convert_csv_record_sync_ignores_amount_column() {
        let record = convert_csv_record(csv_record("sync", Some("junk"), Some(4))).unwrap();

        assert_eq!(record.amount, None);
        assert_eq!(record.target, None);
    }

    #[test]
    fn test_convert_csv_record_transfer() {
        let record = convert_csv_record(csv_record("transfer", Some("5"), Some(2))).unwrap();

        assert_eq!(record.op_type, OperationType::Transfer);
        assert_eq!(record.target, Some(2));
        assert_eq!(record.accounts().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_convert_csv_record_drops_target_on_non_transfer() {
        let record = convert_csv_record(csv_record("deposit", Some("5"), Some(2))).unwrap();

        assert_eq!(record.target, None);
    }

    #[rstest]
    #[case::invalid_type("invalid", Some("100.0"), None, "Invalid operation type")]
    #[case::deposit_missing_amount("deposit", None, None, "requires an amount")]
    #[case::open_missing_amount("open", None, None, "requires an amount")]
    #[case::malformed_amount("deposit", Some("not_a_number"), None, "Malformed amount")]
    #[case::empty_amount("withdraw", Some(""), None, "requires an amount")]
    #[case::whitespace_amount("deposit", Some("  "), None, "requires an amount")]
    #[case::transfer_missing_target("transfer", Some("5"), None, "requires a target")]
    fn test_convert_csv_record_errors(
        #[case] op_type: &str,
        #[case] amount: Option<&str>,
        #[case] target: Option<AccountKey>,
        #[case] expected_error: &str,
    ) {
        let err = convert_csv_record(csv_record(op_type, amount, target)).unwrap_err();

        assert!(
            err.to_string().contains(expected_error),
            "unexpected error: {}",
            err
        );
    }

    #[rstest]
    #[case("  100.0  ", Decimal::new(1000, 1))] // whitespace trimming
    #[case("100.1234", Decimal::new(1001234, 4))]
    #[case("-5", Decimal::from(-5))] // sign is checked by the account
    #[case("0", Decimal::ZERO)]
    fn test_convert_csv_record_amount_parsing(#[case] amount: &str, #[case] expected: Decimal) {
        let record = convert_csv_record(csv_record("deposit", Some(amount), None)).unwrap();

        assert_eq!(record.amount, Some(expected));
    }

    #[rstest]
    #[case::single_account(
        vec![AccountSnapshot::new(1, Decimal::new(1000000, 4))],
        "account,balance\n1,100.0000\n"
    )]
    #[case::sorted_by_account(
        vec![
            AccountSnapshot::new(3, Decimal::ZERO),
            AccountSnapshot::new(1, Decimal::from(7)),
            AccountSnapshot::new(2, Decimal::new(5, 1)),
        ],
        "account,balance\n1,7.0000\n2,0.5000\n3,0.0000\n"
    )]
    #[case::empty(vec![], "account,balance\n")]
    #[case::four_decimal_precision(
        vec![AccountSnapshot::new(9, Decimal::new(1001234, 4))],
        "account,balance\n9,100.1234\n"
    )]
    fn test_write_balances_csv(
        #[case] snapshots: Vec<AccountSnapshot>,
        #[case] expected_output: &str,
    ) {
        let mut output = Vec::new();
        write_balances_csv(&snapshots, &mut output).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), expected_output);
    }
}
