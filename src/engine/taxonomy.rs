// ── Taxonomy Facade ────────────────────────────────────────────────────────
// The crate's public surface: a store plus an optional acting user,
// composed — not inherited. The acting user is threaded explicitly; there
// is no hidden session global. Every query is one synchronous round-trip
// to the store.

use crate::atoms::error::{TaxonomyError, TaxonomyResult};
use crate::atoms::types::{QueryOptions, Role, Tag};
use crate::engine::cloud;
use crate::engine::normalize;
use crate::engine::pattern::Pattern;
use crate::engine::store::RelationStore;
use std::collections::BTreeMap;

pub struct Taxonomy<S> {
    store: S,
    /// Default user id stamped onto taggings created without an explicit
    /// one. `None` means taggings default to anonymous.
    actor: Option<i64>,
}

impl<S: RelationStore> Taxonomy<S> {
    pub fn new(store: S) -> Self {
        Taxonomy { store, actor: None }
    }

    pub fn with_actor(store: S, user_id: i64) -> Self {
        Taxonomy {
            store,
            actor: Some(user_id),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Tags ───────────────────────────────────────────────────────────────

    /// Normalize free-text input into canonical tag tokens.
    pub fn normalize_tags(&self, input: &str) -> Vec<String> {
        normalize::normalize(input)
    }

    /// Find or create the tag for the first token `text` normalizes to.
    /// Text that normalizes to nothing is rejected.
    pub fn find_or_create_tag(&self, text: &str) -> TaxonomyResult<i64> {
        let token = normalize::normalize(text)
            .into_iter()
            .next()
            .ok_or_else(|| {
                TaxonomyError::validation(format!("no usable tag in {text:?}"))
            })?;
        self.store.find_or_create_tag(&token)
    }

    pub fn find_tag(&self, text: &str) -> TaxonomyResult<Option<Tag>> {
        self.store.find_tag(text)
    }

    pub fn tag_by_id(&self, id: i64) -> TaxonomyResult<Option<Tag>> {
        self.store.tag_by_id(id)
    }

    /// Always fails: tag text is immutable once created.
    pub fn rename_tag(&self, id: i64, new_text: &str) -> TaxonomyResult<()> {
        self.store.rename_tag(id, new_text)
    }

    // ── Taggings ───────────────────────────────────────────────────────────

    /// Apply a tag to an object (create-or-find). When `user_id` is
    /// `None` the facade's actor, if any, is stamped on instead.
    pub fn tag(&self, tag_id: i64, object_id: i64, user_id: Option<i64>) -> TaxonomyResult<i64> {
        self.store
            .find_or_create_tagging(tag_id, object_id, user_id.or(self.actor))
    }

    /// Normalize a free-text tag string and apply every resulting tag to
    /// the object. Returns the tagging ids in token order.
    pub fn apply_tags(
        &self,
        input: &str,
        object_id: i64,
        user_id: Option<i64>,
    ) -> TaxonomyResult<Vec<i64>> {
        let user = user_id.or(self.actor);
        let mut tagging_ids = Vec::new();
        for token in normalize::normalize(input) {
            let tag_id = self.store.find_or_create_tag(&token)?;
            tagging_ids.push(self.store.find_or_create_tagging(tag_id, object_id, user)?);
        }
        Ok(tagging_ids)
    }

    /// Remove every tagging touching the given entity. Returns the count.
    pub fn untag_all(&self, role: Role, id: i64) -> TaxonomyResult<usize> {
        self.store.clear_for(role, id)
    }

    // ── Pattern queries ────────────────────────────────────────────────────

    /// Compile and run a pattern query, e.g. `query("T(O)", post_id, …)`
    /// for the tags of a post. Results are `(id, usage)` in result order;
    /// usage is `None` when `sort_by_usage` is off.
    pub fn query(
        &self,
        pattern: &str,
        seed: i64,
        options: &QueryOptions,
    ) -> TaxonomyResult<Vec<(i64, Option<i64>)>> {
        let plan = Pattern::parse(pattern)?.compile(seed, options);
        self.store.execute(&plan)
    }

    /// Tags that co-occur on the same objects as `tag_id`, most shared
    /// first. Sugar for `query("t(o(t))", …)`.
    pub fn similar_tags(&self, tag_id: i64, limit: u32) -> TaxonomyResult<Vec<(i64, Option<i64>)>> {
        self.query(
            "t(o(t))",
            tag_id,
            &QueryOptions {
                limit,
                ..QueryOptions::default()
            },
        )
    }

    /// Objects sharing at least `min_shared` tags with `object_id`, most
    /// shared first. Sugar for `query("o(t(o))", …)` with a HAVING
    /// threshold.
    pub fn similar_objects(
        &self,
        object_id: i64,
        limit: u32,
        min_shared: i64,
    ) -> TaxonomyResult<Vec<(i64, Option<i64>)>> {
        self.query(
            "o(t(o))",
            object_id,
            &QueryOptions {
                limit,
                min_shared: Some(min_shared),
                ..QueryOptions::default()
            },
        )
    }

    // ── Rankings & sizing ──────────────────────────────────────────────────

    /// Most-used ids for a role, `(id, count)`.
    pub fn popular(&self, role: Role, limit: u32, offset: u32) -> TaxonomyResult<Vec<(i64, i64)>> {
        self.store.popular(role, limit, offset, None)
    }

    /// `popular` constrained to rows whose filter-role column equals the
    /// given id, e.g. the popular tags of a single object.
    pub fn popular_filtered(
        &self,
        role: Role,
        limit: u32,
        offset: u32,
        filter: (Role, i64),
    ) -> TaxonomyResult<Vec<(i64, i64)>> {
        self.store.popular(role, limit, offset, Some(filter))
    }

    /// Most-recently-used ids for a role, `(id, last_date)`.
    pub fn recent(&self, role: Role, limit: u32, offset: u32) -> TaxonomyResult<Vec<(i64, String)>> {
        self.store.recent(role, limit, offset, None)
    }

    /// Scale usage counts into display sizes for a tag cloud.
    pub fn scale_sizes(
        &self,
        counts: &[(i64, i64)],
        min_size: u32,
        max_size: u32,
    ) -> BTreeMap<i64, u32> {
        cloud::scale_sizes(counts, min_size, max_size)
    }
}
