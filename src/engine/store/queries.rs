// ── Store: Plan Execution & Rankings ───────────────────────────────────────
// Runs compiled query plans and the single-step popularity/recency
// aggregations. Column names are always taken from the Role enum, never
// from caller strings.

use super::TaxonomyStore;
use crate::atoms::error::TaxonomyResult;
use crate::atoms::types::Role;
use crate::engine::plan::{PlanRenderer, QueryPlan, SqliteRenderer};

/// Execute a compiled plan, preserving row order.
pub(super) fn execute_plan(
    store: &TaxonomyStore,
    plan: &QueryPlan,
) -> TaxonomyResult<Vec<(i64, Option<i64>)>> {
    let rendered = SqliteRenderer.render(plan);
    let conn = store.conn.lock();
    let mut stmt = conn.prepare(&rendered.sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(rendered.params.iter()), |row| {
        let id: i64 = row.get(0)?;
        let usage = if plan.aggregate {
            Some(row.get::<_, i64>(1)?)
        } else {
            None
        };
        Ok((id, usage))
    })?;
    let collected: Result<Vec<_>, _> = rows.collect();
    Ok(collected?)
}

/// Shared body for popular/recent: one count-or-max group query over a
/// single role column. NULL group values (anonymous user rows) are never
/// meaningful groups and are skipped.
fn ranking_sql(
    role: Role,
    value_expr: &str,
    order_expr: &str,
    filter: Option<(Role, i64)>,
) -> (String, Vec<i64>) {
    let column = role.column();
    let mut sql = format!(
        "SELECT {column}, {value_expr} FROM taggings WHERE {column} IS NOT NULL"
    );
    let mut params = Vec::new();
    if let Some((filter_role, filter_id)) = filter {
        sql.push_str(&format!(" AND {} = ?", filter_role.column()));
        params.push(filter_id);
    }
    sql.push_str(&format!(
        " GROUP BY {column} ORDER BY {order_expr} LIMIT ? OFFSET ?"
    ));
    (sql, params)
}

pub(super) fn popular(
    store: &TaxonomyStore,
    role: Role,
    limit: u32,
    offset: u32,
    filter: Option<(Role, i64)>,
) -> TaxonomyResult<Vec<(i64, i64)>> {
    let (sql, mut params) = ranking_sql(
        role,
        "COUNT(*) AS usage",
        &format!("usage DESC, {} ASC", role.column()),
        filter,
    );
    params.push(i64::from(limit));
    params.push(i64::from(offset));

    let conn = store.conn.lock();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
    })?;
    let collected: Result<Vec<_>, _> = rows.collect();
    Ok(collected?)
}

pub(super) fn recent(
    store: &TaxonomyStore,
    role: Role,
    limit: u32,
    offset: u32,
    filter: Option<(Role, i64)>,
) -> TaxonomyResult<Vec<(i64, String)>> {
    let (sql, mut params) = ranking_sql(
        role,
        "MAX(date) AS last_used",
        &format!("last_used DESC, {} ASC", role.column()),
        filter,
    );
    params.push(i64::from(limit));
    params.push(i64::from(offset));

    let conn = store.conn.lock();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
    })?;
    let collected: Result<Vec<_>, _> = rows.collect();
    Ok(collected?)
}
