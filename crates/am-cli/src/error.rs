//! CLI error types.

use am_silences::SilenceError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// The silence workflow failed.
    #[error(transparent)]
    Silence(#[from] SilenceError),

    /// Invalid configuration outside the silence workflow.
    #[error("configuration error: {0}")]
    Config(String),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_errors_display_unchanged() {
        let err = CliError::from(SilenceError::NoNewSilences);
        assert_eq!(
            err.to_string(),
            "no new silences specified (enable verbose mode for more information)"
        );
    }

    #[test]
    fn cli_error_display_config() {
        let err = CliError::Config("unknown output format 'xml'".into());
        assert_eq!(
            err.to_string(),
            "configuration error: unknown output format 'xml'"
        );
    }

    #[test]
    fn cli_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let cli_err = CliError::from(io_err);
        assert!(matches!(cli_err, CliError::Io(_)));
    }
}
