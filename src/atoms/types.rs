// ── Atoms: Pure Data Types ─────────────────────────────────────────────────
// Plain struct/enum definitions with no logic beyond trivial accessors.
// Atoms layer rule: no I/O, no side effects, no imports from engine/.

use serde::{Deserialize, Serialize};

// ── Roles ──────────────────────────────────────────────────────────────────

/// One of the three perspectives on the ternary relation.
///
/// A role is both a symbolic token in the pattern language (`t`, `u`, `o`)
/// and a concrete column of the `taggings` table. Keeping the mapping on a
/// closed enum means pattern parsing can never hand unvalidated column
/// names to the query renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Tag,
    User,
    Object,
}

impl Role {
    /// The `taggings` column this role selects and filters on.
    pub fn column(self) -> &'static str {
        match self {
            Role::Tag => "tag_id",
            Role::User => "user_id",
            Role::Object => "object_id",
        }
    }

    /// Parse a single pattern-language token (case-insensitive).
    pub fn from_token(token: char) -> Option<Role> {
        match token.to_ascii_lowercase() {
            't' => Some(Role::Tag),
            'u' => Some(Role::User),
            'o' => Some(Role::Object),
            _ => None,
        }
    }
}

// ── Entities ───────────────────────────────────────────────────────────────

/// A row of the tag dictionary. Identity is by text content: the text is
/// unique and immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub text: String,
}

/// One row of the ternary relation: "user U applied tag T to object O at
/// time D". `user_id` is `None` for anonymous taggings. The `date` is an
/// ISO-8601 UTC timestamp, written once on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tagging {
    pub id: i64,
    pub tag_id: i64,
    pub user_id: Option<i64>,
    pub object_id: i64,
    pub date: String,
}

// ── Query options ──────────────────────────────────────────────────────────

/// Knobs for a pattern query. `Default` gives the common case: first page
/// of twenty results, ordered by usage count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Maximum number of rows returned (outermost step only).
    pub limit: u32,
    /// Rows skipped before the first returned one.
    pub offset: u32,
    /// Group the outermost step and order by usage count descending
    /// (ties break by ascending id). When false the result is a flat
    /// distinct set and every usage value is `None`.
    pub sort_by_usage: bool,
    /// Minimum usage count a group must reach to be returned. Only
    /// meaningful together with `sort_by_usage`; ignored otherwise.
    pub min_shared: Option<i64>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            limit: 20,
            offset: 0,
            sort_by_usage: true,
            min_shared: None,
        }
    }
}
