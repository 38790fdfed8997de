//! Output formatting for CLI commands.
//!
//! Supports simple, extended and JSON output formats.

use std::io::Write;

use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter for command results.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Write a value to the output.
    ///
    /// JSON output is one compact document per line so that several results
    /// can be streamed to the same writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + PlainDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Simple => value.write_simple(writer)?,
            Format::Extended => value.write_extended(writer)?,
        }
        Ok(())
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Simple)
    }
}

/// Trait for types with a human-readable rendering.
pub trait PlainDisplay {
    /// Write the bare value.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_simple<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;

    /// Write the value with its context. Defaults to the simple rendering.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_extended<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        self.write_simple(writer)
    }
}
