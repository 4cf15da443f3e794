//! SQLite schema definition.

/// Local mirror of the hosted `users` table.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Visit records (one row per patient visit)
-- ============================================================================

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_number TEXT,
    name TEXT,
    father_name TEXT,
    doctor TEXT,
    corrective_doctor TEXT,
    services TEXT,
    which_tooth TEXT,
    return_doctor TEXT,
    return_reason TEXT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%S', 'now'))
);

-- Grouping and history lookups go through the file number
CREATE INDEX IF NOT EXISTS idx_users_file_number ON users(file_number);
"#;
