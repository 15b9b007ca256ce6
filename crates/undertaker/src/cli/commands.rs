//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::will::WillForm;

/// Write command arguments.
#[derive(Debug, Args)]
pub struct WriteCommand {
    /// Your full legal name
    #[arg(short, long)]
    pub name: String,

    /// Date of birth (YYYY-MM-DD)
    #[arg(short, long, value_name = "DATE")]
    pub dob: String,

    /// Your final message
    #[arg(short, long, conflicts_with = "message_file")]
    pub message: Option<String>,

    /// Read the final message from a file
    #[arg(long, value_name = "FILE")]
    pub message_file: Option<PathBuf>,
}

impl WriteCommand {
    /// Build the form, reading the message file if one was given.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the message file cannot be read.
    pub fn to_form(&self) -> std::io::Result<WillForm> {
        let message = match (&self.message, &self.message_file) {
            (_, Some(path)) => std::fs::read_to_string(path)?,
            (Some(message), None) => message.clone(),
            (None, None) => String::new(),
        };
        Ok(WillForm::new(&self.name, &self.dob, message))
    }
}

/// Preview command arguments.
#[derive(Debug, Args)]
pub struct PreviewCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Download command arguments.
#[derive(Debug, Args)]
pub struct DownloadCommand {
    /// Where to write the PDF (defaults to the configured file name)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Send command arguments.
#[derive(Debug, Args)]
pub struct SendCommand {
    /// Recipient email address
    #[arg(short, long, value_name = "ADDRESS", default_value = "")]
    pub to: String,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}
