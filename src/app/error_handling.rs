//! Error handling utilities
//!
//! Centralizes how a failed command is reported and which status the
//! process exits with.

use crate::error::LlmpipeError;
use tracing::error;

/// Exit status for an error that reached the top of `main`
///
/// `LlmpipeError` carries its own mapping (child exit codes pass through,
/// 127 and 126 for launch failures). Anything else is a general failure.
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<LlmpipeError>()
        .map_or(1, LlmpipeError::exit_code)
}

/// Handle fatal errors and exit with appropriate status code
///
/// # Verbose Mode Behavior
/// - `verbose = 0`: User-friendly messages only
/// - `verbose >= 1`: Includes the full error chain
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {}", error);

    if let Some(llmpipe_err) = error.downcast_ref::<LlmpipeError>() {
        eprintln!("{}", llmpipe_err.user_message());

        if verbose >= 1 {
            eprintln!("\nContext Chain:\n{}", llmpipe_err.developer_message());
        }
    } else {
        eprintln!("Error: {error}");

        if verbose >= 1 {
            eprintln!("\nError chain:");
            for (i, cause) in error.chain().enumerate() {
                eprintln!("  {}: {}", i, cause);
            }
        }
    }

    std::process::exit(exit_code_for(&error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subprocess::ProcessError;

    #[test]
    fn test_child_exit_code_passes_through() {
        let err: LlmpipeError = ProcessError::ExitCode(42).into();
        assert_eq!(exit_code_for(&anyhow::Error::new(err)), 42);
    }

    #[test]
    fn test_missing_program_exits_127() {
        let err: LlmpipeError = ProcessError::CommandNotFound("ollama".into()).into();
        assert_eq!(exit_code_for(&anyhow::Error::new(err)), 127);
    }

    #[test]
    fn test_config_error_exits_2() {
        let err = LlmpipeError::config("bad value");
        assert_eq!(exit_code_for(&anyhow::Error::new(err)), 2);
    }

    #[test]
    fn test_foreign_error_exits_1() {
        assert_eq!(exit_code_for(&anyhow::anyhow!("boom")), 1);
    }
}
