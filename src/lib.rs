// ── folkso: a folksonomy engine ────────────────────────────────────────────
//
// Maintains many-to-many-to-many relationships between three entity kinds
// (Tags, Users, Objects) in a single ternary relation table, and answers
// relationship queries written in a tiny algebraic pattern language:
//
//   `T(O)`     — tags of an object
//   `T(U(O))`  — tags used by the users of an object
//   `O(T(O))`  — objects sharing tags with an object ("related posts")
//
// The pattern compiler lowers a pattern string into a typed query plan
// (nested membership subqueries, optionally decorated with usage-count
// aggregation on the outermost step) which a renderer turns into
// parameterized SQL for the SQLite-backed store.
//
// Module layout:
//   atoms/   — pure data types and the error enum; no I/O, no engine imports
//   engine/  — normalizer, pattern compiler, plan IR, store, aggregation

pub mod atoms;
pub mod engine;

pub use atoms::error::{TaxonomyError, TaxonomyResult};
pub use atoms::types::{QueryOptions, Role, Tag, Tagging};
pub use engine::cloud::scale_sizes;
pub use engine::normalize::normalize as normalize_tags;
pub use engine::pattern::{parse_seed_id, Pattern};
pub use engine::plan::{PlanRenderer, QueryPlan, RenderedQuery, Selection, SqliteRenderer};
pub use engine::store::{RelationStore, TaxonomyStore};
pub use engine::taxonomy::Taxonomy;
