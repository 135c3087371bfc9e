pub const CURRENT_CYCLE_KEY: &str = "current_cycle";

/// Idempotent schema: items, per-cycle usage ledger, key/value metadata.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY,
    content TEXT NOT NULL CHECK (length(content) > 0),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS item_usage (
    id INTEGER PRIMARY KEY,
    item_id INTEGER NOT NULL REFERENCES items(id),
    cycle INTEGER NOT NULL,
    used_at TEXT NOT NULL,
    UNIQUE (item_id, cycle)
);

CREATE INDEX IF NOT EXISTS idx_item_usage_cycle ON item_usage(cycle);

CREATE TABLE IF NOT EXISTS rotation_metadata (
    key TEXT PRIMARY KEY,
    value INTEGER NOT NULL,
    updated_at TEXT NOT NULL
);

INSERT OR IGNORE INTO rotation_metadata (key, value, updated_at)
VALUES ('current_cycle', 0, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'));
"#;
