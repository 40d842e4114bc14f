// ── Taxonomy Store ─────────────────────────────────────────────────────────
// SQLite persistence for the tag dictionary and the ternary relation.
//
// Module layout:
//   schema    — idempotent table/index migrations
//   relations — tag + tagging find-or-create, lookups, bulk deletion
//   queries   — compiled-plan execution and ranking queries
//
// The engine holds no cross-call state of its own: every operation is one
// synchronous round-trip through the connection mutex. Find-or-create is
// made race-safe by the unique indexes plus insert-fail-then-reselect.

use crate::atoms::error::TaxonomyResult;
use crate::atoms::types::{Role, Tag, Tagging};
use crate::engine::plan::QueryPlan;
use log::info;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;

mod queries;
mod relations;
mod schema;

/// The persistence interface the facade and the pattern compiler consume.
/// `TaxonomyStore` is the bundled SQLite implementation; tests or hosts
/// with a different storage engine can supply their own.
pub trait RelationStore {
    /// Look a tag up by exact text; insert and return a new id if absent.
    fn find_or_create_tag(&self, text: &str) -> TaxonomyResult<i64>;

    fn find_tag(&self, text: &str) -> TaxonomyResult<Option<Tag>>;

    fn tag_by_id(&self, id: i64) -> TaxonomyResult<Option<Tag>>;

    /// Always fails with `Integrity`: tag text is immutable once created,
    /// otherwise two taggings pointing at one id could diverge in meaning.
    fn rename_tag(&self, id: i64, new_text: &str) -> TaxonomyResult<()>;

    /// Look a tagging up by its uniqueness key (user-qualified when
    /// `user_id` is present); insert with the current timestamp if absent.
    fn find_or_create_tagging(
        &self,
        tag_id: i64,
        object_id: i64,
        user_id: Option<i64>,
    ) -> TaxonomyResult<i64>;

    fn tagging_by_id(&self, id: i64) -> TaxonomyResult<Option<Tagging>>;

    /// Delete every tagging whose column for `role` equals `id`; returns
    /// the number of rows removed.
    fn clear_for(&self, role: Role, id: i64) -> TaxonomyResult<usize>;

    /// Run a compiled query plan. Rows come back in result order as
    /// `(id, usage)`; usage is `None` for flat (non-aggregated) plans.
    fn execute(&self, plan: &QueryPlan) -> TaxonomyResult<Vec<(i64, Option<i64>)>>;

    /// Most-used ids for a role, `(id, count)`, usage descending with
    /// ties broken by ascending id. The optional filter constrains rows
    /// to those whose filter-role column equals the given id.
    fn popular(
        &self,
        role: Role,
        limit: u32,
        offset: u32,
        filter: Option<(Role, i64)>,
    ) -> TaxonomyResult<Vec<(i64, i64)>>;

    /// Most-recently-used ids for a role, `(id, last_date)`, newest first.
    fn recent(
        &self,
        role: Role,
        limit: u32,
        offset: u32,
        filter: Option<(Role, i64)>,
    ) -> TaxonomyResult<Vec<(i64, String)>>;
}

/// Thread-safe SQLite-backed store.
pub struct TaxonomyStore {
    /// The SQLite connection, protected by a Mutex.
    conn: Mutex<Connection>,
}

impl TaxonomyStore {
    /// Open (or create) the database at `path` and initialize tables.
    pub fn open(path: impl AsRef<Path>) -> TaxonomyResult<Self> {
        let path = path.as_ref();
        info!("[taxonomy] Opening store at {:?}", path);
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;").ok();
        Self::init(conn)
    }

    /// Open an in-memory database. Used by tests and short-lived tools.
    pub fn open_in_memory() -> TaxonomyResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> TaxonomyResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;").ok();
        schema::run_migrations(&conn)?;
        Ok(TaxonomyStore {
            conn: Mutex::new(conn),
        })
    }
}
