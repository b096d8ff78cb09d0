//! End-to-end integration tests
//!
//! These tests validate the complete processing pipeline using predefined CSV
//! fixtures. Each test:
//! 1. Reads input.csv from a fixture directory
//! 2. Applies all operations through the selected strategy
//! 3. Generates output CSV
//! 4. Compares actual output with expected.csv
//!
//! Test fixtures are located in tests/fixtures/ and cover:
//! - Happy path scenarios
//! - Rejected operations (insufficient funds, self transfer, invalid amounts)
//! - Balance synchronization against a fixed and an unavailable oracle
//! - Unknown or duplicate accounts and malformed rows
//!
//! Each fixture is run twice: once with the sequential strategy and once with
//! the batched async strategy.

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_bank_ledger::cli::StrategyType;
    use rust_bank_ledger::core::OracleConfig;
    use rust_bank_ledger::strategy::{create_strategy, BatchConfig};
    use rust_decimal::Decimal;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;

    /// Balance reported by the oracle in fixtures that synchronize
    fn fixed_oracle() -> OracleConfig {
        OracleConfig::Fixed(Decimal::from(50))
    }

    /// Run a fixture by processing input.csv and comparing with expected.csv
    ///
    /// # Arguments
    ///
    /// * `fixture_name` - Name of the fixture directory (e.g., "happy_path")
    /// * `strategy_type` - Processing strategy to use (Sync or Async)
    /// * `oracle` - Oracle configuration used for `sync` records
    /// * `batch_size` - Batch size for the async strategy
    ///
    /// # Panics
    ///
    /// Panics if the fixture files cannot be read or the output differs from
    /// the expected output.
    fn run_test_fixture(
        fixture_name: &str,
        strategy_type: StrategyType,
        oracle: OracleConfig,
        batch_size: usize,
    ) {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let input_path = format!("{}/input.csv", fixture_dir);
        let expected_path = format!("{}/expected.csv", fixture_dir);

        assert!(
            Path::new(&input_path).exists(),
            "Input file not found: {}",
            input_path
        );
        assert!(
            Path::new(&expected_path).exists(),
            "Expected file not found: {}",
            expected_path
        );

        let oracle = oracle.build().expect("Invalid oracle configuration");
        let strategy = create_strategy(
            strategy_type.clone(),
            Some(BatchConfig::new(batch_size, 4)),
            oracle,
        );

        let mut temp_output = NamedTempFile::new().expect("Failed to create temp file");

        strategy
            .process(Path::new(&input_path), &mut temp_output)
            .unwrap_or_else(|e| panic!("Failed to process operations: {}", e));

        temp_output.flush().expect("Failed to flush temp file");

        let actual_output = fs::read_to_string(temp_output.path())
            .unwrap_or_else(|e| panic!("Failed to read temp output file: {}", e));
        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e));

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (strategy: {:?}, batch size: {})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, strategy_type, batch_size, actual_output, expected_output
        );
    }

    /// End-to-end test for all fixtures with both processing strategies
    #[rstest]
    #[case("happy_path", fixed_oracle())]
    #[case("insufficient_funds", fixed_oracle())]
    #[case("self_transfer", fixed_oracle())]
    #[case("sync_success", fixed_oracle())]
    #[case("sync_failure", OracleConfig::Unavailable)]
    #[case("unknown_accounts", fixed_oracle())]
    #[case("invalid_amounts", fixed_oracle())]
    #[case("malformed_data", fixed_oracle())]
    #[case("multiple_accounts", fixed_oracle())]
    #[case("empty_input", fixed_oracle())]
    fn test_fixtures(
        #[case] fixture: &str,
        #[case] oracle: OracleConfig,
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
        #[values(1000, 2)] batch_size: usize,
    ) {
        run_test_fixture(fixture, strategy, oracle, batch_size);
    }

    #[rstest]
    fn test_missing_input_is_fatal(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let oracle = OracleConfig::Unavailable.build().unwrap();
        let strategy = create_strategy(strategy, None, oracle);
        let mut output = Vec::new();

        let result = strategy.process(Path::new("tests/fixtures/does_not_exist.csv"), &mut output);

        assert!(result.is_err());
    }
}
