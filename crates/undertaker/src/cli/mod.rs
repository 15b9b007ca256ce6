//! Command-line interface for undertaker.
//!
//! This module provides the CLI structure for the `undertaker` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DownloadCommand, OutputFormat, PreviewCommand, SendCommand, StatusCommand,
    WriteCommand,
};

/// undertaker - Write your digital will
///
/// Save a final message, preview the latest one, and export it as a PDF to
/// keep or to email.
#[derive(Debug, Parser)]
#[command(name = "undertaker")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Act as this user id instead of the configured session
    #[arg(short, long, global = true, value_name = "UID")]
    pub user: Option<String>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write and save a new will
    Write(WriteCommand),

    /// Show your latest will
    Preview(PreviewCommand),

    /// Export your latest will as a PDF file
    Download(DownloadCommand),

    /// Email your latest will as a PDF attachment
    Send(SendCommand),

    /// Show session and storage status
    Status(StatusCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn status_cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            user: None,
            verbose,
            quiet,
            command: Command::Status(StatusCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "undertaker");
    }

    #[test]
    fn test_verbosity_quiet() {
        assert_eq!(
            status_cli(0, true).verbosity(),
            crate::logging::Verbosity::Quiet
        );
    }

    #[test]
    fn test_verbosity_normal() {
        assert_eq!(
            status_cli(0, false).verbosity(),
            crate::logging::Verbosity::Normal
        );
    }

    #[test]
    fn test_verbosity_verbose() {
        assert_eq!(
            status_cli(1, false).verbosity(),
            crate::logging::Verbosity::Verbose
        );
    }

    #[test]
    fn test_verbosity_trace() {
        assert_eq!(
            status_cli(2, false).verbosity(),
            crate::logging::Verbosity::Trace
        );
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_write() {
        let args = vec![
            "undertaker",
            "write",
            "--name",
            "Jane Doe",
            "--dob",
            "1990-01-01",
            "--message",
            "Take care of the cat.",
            "--user",
            "u1",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.user.as_deref(), Some("u1"));
        match cli.command {
            Command::Write(cmd) => {
                assert_eq!(cmd.name, "Jane Doe");
                assert_eq!(cmd.dob, "1990-01-01");
                assert_eq!(cmd.message.as_deref(), Some("Take care of the cat."));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_write_rejects_both_message_sources() {
        let args = vec![
            "undertaker",
            "write",
            "-n",
            "Jane Doe",
            "-d",
            "1990-01-01",
            "-m",
            "hi",
            "--message-file",
            "msg.txt",
        ];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_parse_preview_json() {
        let args = vec!["undertaker", "preview", "--format", "json"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Command::Preview(PreviewCommand {
                format: OutputFormat::Json
            })
        ));
    }

    #[test]
    fn test_parse_download() {
        let args = vec!["undertaker", "download", "-o", "/tmp/will.pdf"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Download(cmd) => {
                assert_eq!(cmd.output, Some(PathBuf::from("/tmp/will.pdf")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_send_without_recipient() {
        let args = vec!["undertaker", "send"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Send(cmd) => assert!(cmd.to.is_empty()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_status() {
        let args = vec!["undertaker", "status"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.command, Command::Status(_)));
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["undertaker", "-c", "/custom/config.toml", "status"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose() {
        let args = vec!["undertaker", "-v", "status"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_parse_with_quiet() {
        let args = vec!["undertaker", "-q", "status"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.quiet);
    }
}
