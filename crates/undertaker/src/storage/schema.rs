//! `SQLite` schema definitions for undertaker.

/// SQL statement to create the wills table.
///
/// Timestamps are RFC 3339 strings in UTC with a fixed number of fractional
/// digits, so ordering by the text column orders by time.
pub const CREATE_WILLS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS wills (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    request_id TEXT NOT NULL UNIQUE,
    full_name TEXT NOT NULL,
    date_of_birth TEXT NOT NULL,
    message TEXT NOT NULL,
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create an index for the latest-will-per-owner query.
pub const CREATE_OWNER_CREATED_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_wills_owner_created ON wills(user_id, created_at DESC)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_WILLS_TABLE,
    CREATE_OWNER_CREATED_INDEX,
    CREATE_METADATA_TABLE,
];
