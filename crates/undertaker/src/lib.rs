//! `undertaker` - Write, preview and export a digital will
//!
//! This library provides the capture and preview flows, the will store, and
//! the PDF export that can be saved to disk or sent by email.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod flow;
pub mod logging;
pub mod render;
pub mod session;
pub mod storage;
pub mod will;

pub use config::Config;
pub use error::{Error, Result};
pub use flow::{load_preview, CaptureForm, Notice, PreviewPage, PreviewState};
pub use logging::init_logging;
pub use render::{DateStyle, WillView};
pub use session::Session;
pub use storage::{SqliteStore, StorageStats, WillStore};
pub use will::{NewWill, WillForm, WillRecord};
