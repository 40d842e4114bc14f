// Database schema for the taxonomy store.
// Called once by TaxonomyStore::open()/open_in_memory() after pragmas.
// Adding a new table or column: append an idempotent CREATE TABLE IF NOT
// EXISTS or ALTER TABLE … ADD COLUMN at the end of run_migrations() —
// never modify existing SQL, to keep upgrade paths clean.

use crate::atoms::error::TaxonomyResult;
use log::info;
use rusqlite::Connection;

pub(crate) fn run_migrations(conn: &Connection) -> TaxonomyResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tag TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS taggings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tag_id INTEGER NOT NULL REFERENCES tags(id),
            user_id INTEGER,
            object_id INTEGER NOT NULL,
            date TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One row per (tag, object) when anonymous, per (tag, object, user)
        -- when attributed. The partial indexes double as the race guard for
        -- find-or-create.
        CREATE UNIQUE INDEX IF NOT EXISTS idx_taggings_anon
            ON taggings(tag_id, object_id) WHERE user_id IS NULL;
        CREATE UNIQUE INDEX IF NOT EXISTS idx_taggings_attributed
            ON taggings(tag_id, object_id, user_id) WHERE user_id IS NOT NULL;

        CREATE INDEX IF NOT EXISTS idx_taggings_object ON taggings(object_id);
        CREATE INDEX IF NOT EXISTS idx_taggings_user ON taggings(user_id);
        ",
    )?;

    info!("[taxonomy] Schema ready");
    Ok(())
}
