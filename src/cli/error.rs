// Error handling utilities for consistent error messages and exit codes

use std::process;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing files, bad flags, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Validate the number of months to display (1-12)
pub fn validate_month_count(count: u32) -> Result<u32, String> {
    if (1..=12).contains(&count) {
        Ok(count)
    } else {
        Err(format!("Invalid month count: {}. Must be between 1 and 12.", count))
    }
}

/// Validate a list of environment names given on the command line
pub fn validate_environment_names(names: &[String]) -> Result<(), String> {
    match names.iter().find(|name| name.trim().is_empty()) {
        Some(_) => Err("Environment name cannot be empty".to_string()),
        None => Ok(()),
    }
}
