//! Database schema and migrations for Depot.
//!
//! Migrations are applied sequentially; the `schema_version` table tracks
//! which have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: Initial schema - users table
    r#"
-- Users table. account_id is the stable public identifier handed out by the
-- auth layer; row ids stay internal.
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    account_id  TEXT NOT NULL UNIQUE,
    email       TEXT NOT NULL UNIQUE,
    full_name   TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_users_email ON users(email);
CREATE INDEX idx_users_account_id ON users(account_id);
"#,
    // v2: Pending passcodes for email sign-in
    r#"
-- One pending passcode per user. Only the SHA-256 hash of the code is
-- stored; consumed_at marks single-use consumption.
CREATE TABLE passcodes (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    code_hash   TEXT NOT NULL,
    attempts    INTEGER NOT NULL DEFAULT 0,
    expires_at  TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    consumed_at TEXT
);

CREATE INDEX idx_passcodes_user_id ON passcodes(user_id);
"#,
    // v3: Sessions
    r#"
-- Sessions are opaque secrets handed to the browser as a cookie; only the
-- secret's hash is stored.
CREATE TABLE sessions (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    secret_hash TEXT NOT NULL UNIQUE,
    expires_at  TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_sessions_secret_hash ON sessions(secret_hash);
CREATE INDEX idx_sessions_user_id ON sessions(user_id);
"#,
    // v4: File metadata
    r#"
-- File metadata. stored_name references the blob on disk. Owner account id
-- and email are denormalized so owner lookups can fall back when the row
-- reference drifts.
CREATE TABLE files (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    name             TEXT NOT NULL,
    kind             TEXT NOT NULL,
    extension        TEXT NOT NULL,
    size             INTEGER NOT NULL,
    owner_id         INTEGER NOT NULL REFERENCES users(id),
    owner_account_id TEXT NOT NULL,
    owner_email      TEXT NOT NULL,
    collaborators    TEXT NOT NULL DEFAULT '[]',
    stored_name      TEXT NOT NULL UNIQUE,
    created_at       TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at       TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_files_owner_id ON files(owner_id);
CREATE INDEX idx_files_kind ON files(kind);
CREATE INDEX idx_files_updated_at ON files(updated_at);
"#,
    // v5: Optional avatar URL on users
    r#"
ALTER TABLE users ADD COLUMN avatar_url TEXT;
"#,
];

/// Optional columns that later builds added to existing tables.
///
/// Databases created before a column existed are patched at startup by
/// `Database::ensure_compat_columns`, which probes the live table layout and
/// adds whatever is missing. Tuples are (table, column, ALTER statement).
pub const COMPAT_COLUMNS: &[(&str, &str, &str)] = &[
    (
        "users",
        "avatar_url",
        "ALTER TABLE users ADD COLUMN avatar_url TEXT",
    ),
    (
        "files",
        "collaborators",
        "ALTER TABLE files ADD COLUMN collaborators TEXT NOT NULL DEFAULT '[]'",
    ),
];
