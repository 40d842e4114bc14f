// ── Engine Layer ───────────────────────────────────────────────────────────
//
// Module layout:
//   normalize — free-text tag input → canonical tag tokens
//   pattern   — pattern string → role chain → query plan
//   plan      — typed query-plan IR + SQL renderer backend
//   store     — SQLite persistence (tags dictionary + taggings relation)
//   cloud     — popularity/recency ranking and tag-cloud sizing
//   taxonomy  — the public facade tying the pieces together

pub mod cloud;
pub mod normalize;
pub mod pattern;
pub mod plan;
pub mod store;
pub mod taxonomy;
