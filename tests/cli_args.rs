//! Integration tests for CLI argument handling
//!
//! Tests flag validation from the command line. Invalid configuration must be
//! rejected before the terminal is taken over.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_holocron"))
        .args(args)
        .output()
        .expect("Failed to execute holocron")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("holocron"), "Help should mention holocron");
    assert!(stdout.contains("--api-base"), "Help should mention --api-base");
    assert!(stdout.contains("--ephemeral"), "Help should mention --ephemeral");
    assert!(stdout.contains("--clear-cache"), "Help should mention --clear-cache");
}

#[test]
fn test_version_flag_exits_successfully() {
    let output = run_cli(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_zero_attempts_prints_error_and_exits() {
    let output = run_cli(&["--max-attempts", "0", "--ephemeral"]);
    assert!(!output.status.success(), "Expected zero attempts to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("max attempts"),
        "Should print error message about attempts: {}",
        stderr
    );
}

#[test]
fn test_invalid_api_base_prints_error_and_exits() {
    let output = run_cli(&["--api-base", "not a url", "--ephemeral"]);
    assert!(!output.status.success(), "Expected invalid URL to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid API base URL"),
        "Should print error message about the URL: {}",
        stderr
    );
}

#[test]
fn test_non_numeric_attempts_rejected_by_parser() {
    let output = run_cli(&["--max-attempts", "many"]);
    assert!(!output.status.success());
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use holocron::cli::{Cli, CliError, StartupConfig};
    use holocron::data::DEFAULT_API_BASE;

    #[test]
    fn test_cli_no_args_uses_public_api() {
        let cli = Cli::parse_from(["holocron"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.retry.max_attempts, 3);
        assert!(!config.ephemeral);
    }

    #[test]
    fn test_ephemeral_flag() {
        let cli = Cli::parse_from(["holocron", "--ephemeral"]);
        assert!(StartupConfig::from_cli(&cli).unwrap().ephemeral);
    }

    #[test]
    fn test_zero_attempts_is_error() {
        let cli = Cli::parse_from(["holocron", "--max-attempts", "0"]);
        let err = StartupConfig::from_cli(&cli).unwrap_err();
        assert!(matches!(err, CliError::InvalidMaxAttempts(0)));
    }

    #[test]
    fn test_try_parse_rejects_unknown_flag() {
        assert!(Cli::try_parse_from(["holocron", "--plan"]).is_err());
    }
}
