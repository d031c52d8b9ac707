//! SQL schema for the persistent comment table.
//!
//! Every statement is idempotent so the schema step can run on each
//! startup (or from `guestbookd init-db`) without tracking versions.

/// Name of the comment table.
pub const COMMENTS_TABLE: &str = "comments";

/// `created_at` holds Unix time in milliseconds.
pub const CREATE_COMMENTS: &str = "CREATE TABLE IF NOT EXISTS comments (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    email       TEXT NOT NULL,
    comment     TEXT NOT NULL,
    color       TEXT NOT NULL DEFAULT 'black',
    created_at  INTEGER NOT NULL,
    ip_hash     TEXT,
    user_agent  TEXT
)";

pub const CREATE_CREATED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_comments_created_at ON comments (created_at DESC)";

pub const CREATE_EMAIL_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_comments_email ON comments (email)";

/// All schema statements in execution order.
pub const STATEMENTS: [&str; 3] = [CREATE_COMMENTS, CREATE_CREATED_AT_INDEX, CREATE_EMAIL_INDEX];
