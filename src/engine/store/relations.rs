// ── Store: Relation CRUD ───────────────────────────────────────────────────
// Tag dictionary and tagging rows. All methods follow the same pattern:
// &self, lock conn, rusqlite params.
//
// Tags and taggings are never updated in place. Tags are find-or-create
// and delete only; taggings are find-or-create and delete only. The date
// column is written once on insert.

use super::{RelationStore, TaxonomyStore};
use crate::atoms::error::{TaxonomyError, TaxonomyResult};
use crate::atoms::types::{Role, Tag, Tagging};
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension};

/// True when an insert lost the find-or-create race to a unique index.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn tag_id_by_text(conn: &Connection, text: &str) -> TaxonomyResult<Option<i64>> {
    let id = conn
        .query_row("SELECT id FROM tags WHERE tag = ?1", params![text], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(id)
}

fn tagging_id_by_key(
    conn: &Connection,
    tag_id: i64,
    object_id: i64,
    user_id: Option<i64>,
) -> TaxonomyResult<Option<i64>> {
    let id = match user_id {
        Some(user) => conn
            .query_row(
                "SELECT id FROM taggings
                 WHERE tag_id = ?1 AND object_id = ?2 AND user_id = ?3",
                params![tag_id, object_id, user],
                |row| row.get(0),
            )
            .optional()?,
        None => conn
            .query_row(
                "SELECT id FROM taggings
                 WHERE tag_id = ?1 AND object_id = ?2 AND user_id IS NULL",
                params![tag_id, object_id],
                |row| row.get(0),
            )
            .optional()?,
    };
    Ok(id)
}

impl RelationStore for TaxonomyStore {
    fn find_or_create_tag(&self, text: &str) -> TaxonomyResult<i64> {
        let conn = self.conn.lock();
        if let Some(id) = tag_id_by_text(&conn, text)? {
            return Ok(id);
        }
        match conn.execute("INSERT INTO tags (tag) VALUES (?1)", params![text]) {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(err) if is_unique_violation(&err) => {
                // A concurrent caller created the same text between our
                // select and insert. Their row wins.
                warn!("[taxonomy] Lost find-or-create race for tag {text:?}, reselecting");
                tag_id_by_text(&conn, text)?.ok_or_else(|| {
                    TaxonomyError::Other(format!("tag {text:?} vanished after unique violation"))
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn find_tag(&self, text: &str) -> TaxonomyResult<Option<Tag>> {
        let conn = self.conn.lock();
        let tag = conn
            .query_row(
                "SELECT id, tag FROM tags WHERE tag = ?1",
                params![text],
                |row| {
                    Ok(Tag {
                        id: row.get(0)?,
                        text: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(tag)
    }

    fn tag_by_id(&self, id: i64) -> TaxonomyResult<Option<Tag>> {
        let conn = self.conn.lock();
        let tag = conn
            .query_row(
                "SELECT id, tag FROM tags WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Tag {
                        id: row.get(0)?,
                        text: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(tag)
    }

    fn rename_tag(&self, id: i64, _new_text: &str) -> TaxonomyResult<()> {
        Err(TaxonomyError::integrity(format!(
            "tag {id} cannot be renamed; tag text is immutable (create and delete only)"
        )))
    }

    fn find_or_create_tagging(
        &self,
        tag_id: i64,
        object_id: i64,
        user_id: Option<i64>,
    ) -> TaxonomyResult<i64> {
        let conn = self.conn.lock();
        if let Some(id) = tagging_id_by_key(&conn, tag_id, object_id, user_id)? {
            return Ok(id);
        }
        let date = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let inserted = conn.execute(
            "INSERT INTO taggings (tag_id, object_id, user_id, date)
             VALUES (?1, ?2, ?3, ?4)",
            params![tag_id, object_id, user_id, date],
        );
        match inserted {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(err) if is_unique_violation(&err) => {
                warn!(
                    "[taxonomy] Lost find-or-create race for tagging \
                     (tag {tag_id}, object {object_id}), reselecting"
                );
                tagging_id_by_key(&conn, tag_id, object_id, user_id)?.ok_or_else(|| {
                    TaxonomyError::Other("tagging vanished after unique violation".into())
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn tagging_by_id(&self, id: i64) -> TaxonomyResult<Option<Tagging>> {
        let conn = self.conn.lock();
        let tagging = conn
            .query_row(
                "SELECT id, tag_id, user_id, object_id, date FROM taggings WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Tagging {
                        id: row.get(0)?,
                        tag_id: row.get(1)?,
                        user_id: row.get(2)?,
                        object_id: row.get(3)?,
                        date: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(tagging)
    }

    fn clear_for(&self, role: Role, id: i64) -> TaxonomyResult<usize> {
        let conn = self.conn.lock();
        let removed = conn.execute(
            &format!("DELETE FROM taggings WHERE {} = ?1", role.column()),
            params![id],
        )?;
        if removed > 0 {
            info!(
                "[taxonomy] Cleared {removed} taggings for {} {id}",
                role.column()
            );
        }
        Ok(removed)
    }

    fn execute(&self, plan: &crate::engine::plan::QueryPlan) -> TaxonomyResult<Vec<(i64, Option<i64>)>> {
        super::queries::execute_plan(self, plan)
    }

    fn popular(
        &self,
        role: Role,
        limit: u32,
        offset: u32,
        filter: Option<(Role, i64)>,
    ) -> TaxonomyResult<Vec<(i64, i64)>> {
        super::queries::popular(self, role, limit, offset, filter)
    }

    fn recent(
        &self,
        role: Role,
        limit: u32,
        offset: u32,
        filter: Option<(Role, i64)>,
    ) -> TaxonomyResult<Vec<(i64, String)>> {
        super::queries::recent(self, role, limit, offset, filter)
    }
}
