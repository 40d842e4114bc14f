// ── Query Plan IR ──────────────────────────────────────────────────────────
// Typed intermediate representation for compiled pattern queries, plus the
// renderer that lowers a plan to parameterized SQL.
//
// The IR keeps the recursive compilation logic (pattern.rs) independent of
// any storage syntax: a plan is a tree of selection steps over the taggings
// relation, decorated at the outermost step only with aggregation,
// self-exclusion, and pagination. Renderers are swappable behind the
// `PlanRenderer` trait; `SqliteRenderer` is the one the bundled store uses.
//
// Parameter slots are fixed by convention:
//   ?1 — seed id (equality filter on the innermost step, and the
//        self-exclusion comparison on the outermost one)
//   ?2 — LIMIT     ?3 — OFFSET     ?4 — HAVING threshold (when present)

use crate::atoms::types::Role;

/// Name of the ternary relation table. Must match store/schema.rs.
pub(crate) const RELATION_TABLE: &str = "taggings";

// ── Selection tree ─────────────────────────────────────────────────────────

/// One chain of traversal steps, innermost-first in the nesting.
///
/// Each step selects one role's column filtered on the adjacent role's
/// column. The seed step compares against the literal seed id; every
/// enclosing step is a plain membership test over its inner step's rows.
/// Nested steps are always flat (never aggregated) so that `IN (…)`
/// denotes set membership, not a grouped result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Innermost step: `SELECT select WHERE filter = <seed>`.
    Seed { select: Role, filter: Role },
    /// Enclosing step: `SELECT select WHERE filter IN (<inner>)`.
    Nested {
        select: Role,
        filter: Role,
        inner: Box<Selection>,
    },
}

impl Selection {
    /// The column the whole plan ultimately returns.
    pub fn select_role(&self) -> Role {
        match self {
            Selection::Seed { select, .. } | Selection::Nested { select, .. } => *select,
        }
    }
}

// ── Plan ───────────────────────────────────────────────────────────────────

/// A fully compiled pattern query, ready for rendering and execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub selection: Selection,
    /// The literal id the innermost step filters on.
    pub seed: i64,
    /// Group the outermost step by its column, count usage, and order by
    /// usage descending (ties by ascending id).
    pub aggregate: bool,
    /// Exclude the seed id from the outer result. Set only when the target
    /// role equals the seed role — cross-role patterns compare ids from
    /// different spaces, where exclusion is meaningless.
    pub exclude_seed: bool,
    /// `HAVING usage >= ?` threshold. Requires `aggregate`; ignored when
    /// the plan is flat.
    pub min_shared: Option<i64>,
    pub limit: u32,
    pub offset: u32,
}

impl QueryPlan {
    /// The role whose ids this plan returns.
    pub fn target_role(&self) -> Role {
        self.selection.select_role()
    }
}

// ── Renderer ───────────────────────────────────────────────────────────────

/// A rendered plan: one SQL string plus its positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedQuery {
    pub sql: String,
    pub params: Vec<i64>,
}

/// Lowers a `QueryPlan` into the target store's query language.
pub trait PlanRenderer {
    fn render(&self, plan: &QueryPlan) -> RenderedQuery;
}

/// The SQLite backend. Produces a single parameterized statement; the
/// aggregated form selects `(id, usage)`, the flat form a distinct `(id)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteRenderer;

impl PlanRenderer for SqliteRenderer {
    fn render(&self, plan: &QueryPlan) -> RenderedQuery {
        let (column, mut where_clause) = outer_parts(&plan.selection);

        // NULL group/member values can only come from the nullable user
        // column; they are never meaningful results.
        if plan.selection.select_role() == Role::User {
            where_clause.push_str(" AND user_id IS NOT NULL");
        }
        if plan.aggregate && plan.exclude_seed {
            where_clause.push_str(&format!(" AND {column} != ?1"));
        }

        let mut params = vec![plan.seed, i64::from(plan.limit), i64::from(plan.offset)];

        let sql = if plan.aggregate {
            let having = match plan.min_shared {
                Some(threshold) => {
                    params.push(threshold);
                    " HAVING usage >= ?4".to_string()
                }
                None => String::new(),
            };
            format!(
                "SELECT {column}, COUNT(*) AS usage FROM {RELATION_TABLE} \
                 WHERE {where_clause} GROUP BY {column}{having} \
                 ORDER BY usage DESC, {column} ASC LIMIT ?2 OFFSET ?3"
            )
        } else {
            format!(
                "SELECT DISTINCT {column} FROM {RELATION_TABLE} \
                 WHERE {where_clause} LIMIT ?2 OFFSET ?3"
            )
        };

        RenderedQuery { sql, params }
    }
}

/// Split the outermost step into its selected column and WHERE clause,
/// rendering every nested step as a flat subquery along the way.
fn outer_parts(selection: &Selection) -> (&'static str, String) {
    match selection {
        Selection::Seed { select, filter } => {
            (select.column(), format!("{} = ?1", filter.column()))
        }
        Selection::Nested {
            select,
            filter,
            inner,
        } => (
            select.column(),
            format!("{} IN ({})", filter.column(), render_subquery(inner)),
        ),
    }
}

/// Render a nested step as a complete flat subquery.
fn render_subquery(selection: &Selection) -> String {
    let (column, where_clause) = outer_parts(selection);
    format!("SELECT DISTINCT {column} FROM {RELATION_TABLE} WHERE {where_clause}")
}
