//! `undertaker` - CLI for writing and exporting a digital will
//!
//! This binary wires the capture and preview flows to the configured store,
//! session and email provider.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use undertaker::cli::{
    Cli, Command, ConfigCommand, DownloadCommand, OutputFormat, PreviewCommand, SendCommand,
    WriteCommand,
};
use undertaker::export::{EmailJsMailer, EmailSender};
use undertaker::{
    init_logging, load_preview, CaptureForm, Config, PreviewPage, PreviewState, Session,
    SqliteStore, WillStore, WillView,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    // An explicit --user wins over the configured session
    let session = match cli.user.clone() {
        Some(uid) => Some(Session::new(uid)),
        None => config.session(),
    };

    match cli.command {
        Command::Write(cmd) => handle_write(&config, session.as_ref(), &cmd).await,
        Command::Preview(cmd) => handle_preview(&config, session.as_ref(), &cmd).await,
        Command::Download(cmd) => handle_download(&config, session.as_ref(), &cmd).await,
        Command::Send(cmd) => handle_send(&config, session.as_ref(), cmd).await,
        Command::Status(cmd) => handle_status(&config, session.as_ref(), cmd.json).await,
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_store(config: &Config) -> anyhow::Result<SqliteStore> {
    let path = config.database_path();
    SqliteStore::open(&path).with_context(|| format!("failed to open store at {}", path.display()))
}

async fn handle_write(
    config: &Config,
    session: Option<&Session>,
    cmd: &WriteCommand,
) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let fields = cmd.to_form().context("failed to read message file")?;
    let mut form = CaptureForm::with_fields(fields);

    let outcome = form.submit(session, &store).await;
    let message = form.status().message().unwrap_or_default();
    match outcome {
        Ok(_) => {
            println!("{message}");
            Ok(())
        }
        Err(_) => bail!("{message}"),
    }
}

/// Load the caller's latest will or fail with the message the preview shows.
async fn latest_view(
    config: &Config,
    session: Option<&Session>,
    store: &dyn WillStore,
) -> anyhow::Result<WillView> {
    match load_preview(session, store, config.export.date_style).await {
        PreviewState::Ready(view) => Ok(view),
        state => bail!("{}", state.message().unwrap_or_default()),
    }
}

async fn handle_preview(
    config: &Config,
    session: Option<&Session>,
    cmd: &PreviewCommand,
) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let state = load_preview(session, &store, config.export.date_style).await;

    match &state {
        PreviewState::Ready(view) => match cmd.format {
            OutputFormat::Plain => print!("{}", view.to_plain_text()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(view)?),
        },
        PreviewState::NotFound => {
            println!("{}", state.message().unwrap_or_default());
        }
        PreviewState::Error(message) => bail!("{message}"),
    }
    Ok(())
}

async fn handle_download(
    config: &Config,
    session: Option<&Session>,
    cmd: &DownloadCommand,
) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let view = latest_view(config, session, &store).await?;
    let path = cmd
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.export.file_name));

    let page = PreviewPage::new(view, config.export.jpeg_quality);
    let notice = page.download(&path).await;
    if notice.is_error() {
        bail!("{notice}");
    }
    println!("{notice}");
    Ok(())
}

async fn handle_send(
    config: &Config,
    session: Option<&Session>,
    cmd: SendCommand,
) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let view = latest_view(config, session, &store).await?;

    let mailer = EmailJsMailer::new(&config.email)?;
    let sender = EmailSender::new(
        mailer,
        config.email.from_name.clone(),
        config.export.jpeg_quality,
    );

    let mut page = PreviewPage::new(view, config.export.jpeg_quality);
    page.set_recipient(cmd.to);
    if !page.recipient().trim().is_empty() {
        eprintln!("Sending email...");
    }

    let notice = page.send(&sender).await;
    if notice.is_error() {
        bail!("{notice}");
    }
    println!("{notice}");
    Ok(())
}

async fn handle_status(
    config: &Config,
    session: Option<&Session>,
    json: bool,
) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let stats = store.stats()?;
    let own_wills = match session {
        Some(session) => Some(store.count_for_owner(&session.uid).await?),
        None => None,
    };

    if json {
        let status = serde_json::json!({
            "signed_in": session.is_some(),
            "user": session.map(|s| s.uid.as_str()),
            "your_wills": own_wills,
            "total_wills": stats.total_wills,
            "newest_will": stats.newest_will,
            "database_path": store.path(),
            "database_size_bytes": stats.db_size_bytes,
            "email_configured": config.email.is_configured(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("undertaker status");
        println!("-----------------");
        match session {
            Some(session) => println!("Signed in as:  {}", session.label()),
            None => println!("Signed in as:  (nobody - set session.uid or pass --user)"),
        }
        if let Some(count) = own_wills {
            println!("Your wills:    {count}");
        }
        println!("Database:      {}", store.path().display());
        println!("Total wills:   {}", stats.total_wills);
        println!("Database size: {} bytes", stats.db_size_bytes);
        println!(
            "Email:         {}",
            if config.email.is_configured() {
                "configured"
            } else {
                "not configured"
            }
        );
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:  {}", config.database_path().display());
                println!();
                println!("[Session]");
                println!(
                    "  User id:        {}",
                    config.session.uid.as_deref().unwrap_or("(not set)")
                );
                println!();
                println!("[Email]");
                println!("  Endpoint:       {}", config.email.endpoint);
                println!("  Service id:     {}", config.email.service_id);
                println!("  Template id:    {}", config.email.template_id);
                println!("  From name:      {}", config.email.from_name);
                println!("  Timeout (secs): {}", config.email.timeout_secs);
                println!();
                println!("[Export]");
                println!("  File name:      {}", config.export.file_name);
                println!("  JPEG quality:   {}", config.export.jpeg_quality);
                println!("  Date style:     {:?}", config.export.date_style);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(config) if !config.email.is_configured() => {
                    println!("Configuration is valid (email credentials not set).");
                }
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
