// ── Pattern Compiler ───────────────────────────────────────────────────────
// Parses the algebraic pattern notation and compiles it into a query plan.
//
// A pattern is a nested-call expression over the roles {T, U, O}, read
// innermost-out: `T(U(O))` means "find tags by first finding the users
// reachable from the seed object". The leftmost (outermost) role is the
// target — what the caller gets back — and the rightmost (innermost) role
// is the seed — what the caller supplies an id for.
//
// Twelve meaningful two-step traversals (and any deeper chain) fall out of
// one recursive compiler instead of a dozen hand-written queries. The one
// rule that keeps results correct: aggregation only ever decorates the
// outermost step.

use crate::atoms::error::{TaxonomyError, TaxonomyResult};
use crate::atoms::types::{QueryOptions, Role};
use crate::engine::plan::{QueryPlan, Selection};

/// A parsed pattern: the chain of roles, target-first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    roles: Vec<Role>,
}

impl Pattern {
    /// Parse a pattern string. Case-insensitive; parentheses and
    /// whitespace carry no meaning and are skipped. Any other character
    /// is an unknown role token. At least two roles are required (a
    /// target and a seed).
    pub fn parse(input: &str) -> TaxonomyResult<Pattern> {
        let mut roles = Vec::new();
        for c in input.chars() {
            if c == '(' || c == ')' || c.is_whitespace() {
                continue;
            }
            match Role::from_token(c) {
                Some(role) => roles.push(role),
                None => {
                    return Err(TaxonomyError::pattern(format!(
                        "unknown role token {c:?} in pattern {input:?}"
                    )))
                }
            }
        }
        if roles.len() < 2 {
            return Err(TaxonomyError::pattern(format!(
                "pattern {input:?} needs a target and a seed role"
            )));
        }
        Ok(Pattern { roles })
    }

    /// The role the compiled query returns ids for (outermost).
    pub fn target(&self) -> Role {
        self.roles[0]
    }

    /// The role the caller supplies the seed id for (innermost).
    pub fn seed_role(&self) -> Role {
        self.roles[self.roles.len() - 1]
    }

    /// Number of traversal steps the chain compiles to.
    pub fn depth(&self) -> usize {
        self.roles.len() - 1
    }

    /// Compile the chain into a query plan for the given seed id.
    ///
    /// Step k selects role k's column filtered on role k+1's column; the
    /// innermost step compares against the seed id, every enclosing step
    /// is a membership test over its inner step. Self-exclusion applies
    /// only when the target role equals the seed role.
    pub fn compile(&self, seed: i64, options: &QueryOptions) -> QueryPlan {
        let n = self.roles.len() - 1;
        let mut selection = Selection::Seed {
            select: self.roles[n - 1],
            filter: self.roles[n],
        };
        for k in (0..n.saturating_sub(1)).rev() {
            selection = Selection::Nested {
                select: self.roles[k],
                filter: self.roles[k + 1],
                inner: Box::new(selection),
            };
        }

        QueryPlan {
            selection,
            seed,
            aggregate: options.sort_by_usage,
            exclude_seed: options.sort_by_usage && self.target() == self.seed_role(),
            min_shared: options.min_shared,
            limit: options.limit,
            offset: options.offset,
        }
    }
}

/// Parse a seed id arriving as text from a transport boundary.
pub fn parse_seed_id(raw: &str) -> TaxonomyResult<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaxonomyError::validation("seed id is missing"));
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| TaxonomyError::validation(format!("seed id {trimmed:?} is not numeric")))
}
