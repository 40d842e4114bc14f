// ── Integration tests ──────────────────────────────────────────────────────
// End-to-end flows against an in-memory SQLite store. Single binary
// (declared via [[test]] in Cargo.toml).

use folkso::{
    parse_seed_id, QueryOptions, RelationStore, Role, TaxonomyError, Taxonomy, TaxonomyStore,
};

fn taxonomy() -> Taxonomy<TaxonomyStore> {
    Taxonomy::new(TaxonomyStore::open_in_memory().expect("in-memory store"))
}

/// Ids of a query result, usage values dropped.
fn ids(rows: &[(i64, Option<i64>)]) -> Vec<i64> {
    rows.iter().map(|&(id, _)| id).collect()
}

// ═════════════════════════════════════════════════════════════════════════
// Tagging lifecycle
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn tagging_is_idempotent() {
    let tx = taxonomy();
    let tag = tx.find_or_create_tag("rust").unwrap();

    let first = tx.tag(tag, 5, None).unwrap();
    let second = tx.tag(tag, 5, None).unwrap();
    assert_eq!(first, second);

    // Exactly one row behind that key.
    assert_eq!(tx.untag_all(Role::Object, 5).unwrap(), 1);
}

#[test]
fn attributed_and_anonymous_taggings_are_distinct_rows() {
    let tx = taxonomy();
    let tag = tx.find_or_create_tag("rust").unwrap();

    let anon = tx.tag(tag, 5, None).unwrap();
    let attributed = tx.tag(tag, 5, Some(9)).unwrap();
    assert_ne!(anon, attributed);

    // Same attributed key again → same row.
    assert_eq!(tx.tag(tag, 5, Some(9)).unwrap(), attributed);
    assert_eq!(tx.untag_all(Role::Object, 5).unwrap(), 2);
}

#[test]
fn actor_is_stamped_when_user_omitted() {
    let tx = Taxonomy::with_actor(TaxonomyStore::open_in_memory().unwrap(), 42);
    let tag = tx.find_or_create_tag("rust").unwrap();

    let id = tx.tag(tag, 1, None).unwrap();
    let row = tx.store().tagging_by_id(id).unwrap().unwrap();
    assert_eq!(row.user_id, Some(42));

    // An explicit user always wins over the actor.
    let other = tx.tag(tag, 1, Some(7)).unwrap();
    let row = tx.store().tagging_by_id(other).unwrap().unwrap();
    assert_eq!(row.user_id, Some(7));
}

#[test]
fn find_or_create_tag_reuses_by_text() {
    let tx = taxonomy();
    let a = tx.find_or_create_tag("rust").unwrap();
    let b = tx.find_or_create_tag("Rust").unwrap(); // normalizes to the same token
    assert_eq!(a, b);

    let tag = tx.find_tag("rust").unwrap().unwrap();
    assert_eq!(tag.id, a);
    assert_eq!(tag.text, "rust");
    assert_eq!(tx.tag_by_id(a).unwrap().unwrap().text, "rust");
}

#[test]
fn garbage_tag_text_is_rejected() {
    let tx = taxonomy();
    assert!(matches!(
        tx.find_or_create_tag("!!!"),
        Err(TaxonomyError::Validation(_))
    ));
    let long = "a".repeat(301);
    assert!(matches!(
        tx.find_or_create_tag(&long),
        Err(TaxonomyError::Validation(_))
    ));
}

#[test]
fn apply_tags_normalizes_and_dedups_through_the_store() {
    let tx = taxonomy();
    let ids = tx.apply_tags("Rust, rust, Web_Dev", 3, Some(1)).unwrap();
    assert_eq!(ids.len(), 3);
    // "Rust" and "rust" normalize to one tag → one tagging row.
    assert_eq!(ids[0], ids[1]);
    assert_ne!(ids[0], ids[2]);

    let tags = tx.query("T(O)", 3, &QueryOptions::default()).unwrap();
    assert_eq!(tags.len(), 2);
}

#[test]
fn tags_are_immutable() {
    let tx = taxonomy();
    let id = tx.find_or_create_tag("rust").unwrap();
    assert!(matches!(
        tx.rename_tag(id, "crab"),
        Err(TaxonomyError::Integrity(_))
    ));
    // Unreferenced or referenced makes no difference.
    tx.tag(id, 1, None).unwrap();
    assert!(matches!(
        tx.rename_tag(id, "crab"),
        Err(TaxonomyError::Integrity(_))
    ));
}

#[test]
fn clear_for_removes_by_role_and_reports_count() {
    let tx = taxonomy();
    tx.apply_tags("a, b, c", 5, Some(1)).unwrap();
    tx.apply_tags("a, b", 6, Some(1)).unwrap();
    tx.apply_tags("c", 7, Some(2)).unwrap();

    assert_eq!(tx.untag_all(Role::Object, 5).unwrap(), 3);
    assert!(tx.query("T(O)", 5, &QueryOptions::default()).unwrap().is_empty());

    // Other objects untouched.
    assert_eq!(tx.query("T(O)", 6, &QueryOptions::default()).unwrap().len(), 2);

    assert_eq!(tx.untag_all(Role::User, 1).unwrap(), 2);
    assert_eq!(tx.untag_all(Role::User, 1).unwrap(), 0);
}

// ═════════════════════════════════════════════════════════════════════════
// Pattern queries
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn tags_of_object_round_trip_without_aggregation() {
    let tx = taxonomy();
    let a = tx.find_or_create_tag("a").unwrap();
    let b = tx.find_or_create_tag("b").unwrap();
    tx.tag(a, 5, None).unwrap();
    tx.tag(b, 5, None).unwrap();
    tx.tag(a, 6, None).unwrap();

    let flat = QueryOptions {
        sort_by_usage: false,
        ..QueryOptions::default()
    };
    let rows = tx.query("T(O)", 5, &flat).unwrap();
    assert_eq!(ids(&rows), vec![a, b]);
    // No aggregation column when usage sorting is off.
    assert!(rows.iter().all(|&(_, usage)| usage.is_none()));
}

#[test]
fn tags_of_users_of_object_traverses_two_steps() {
    let tx = taxonomy();
    let a = tx.find_or_create_tag("a").unwrap();
    let b = tx.find_or_create_tag("b").unwrap();
    let c = tx.find_or_create_tag("c").unwrap();
    let d = tx.find_or_create_tag("d").unwrap();

    tx.tag(a, 1, Some(10)).unwrap(); // user 10 touched object 1
    tx.tag(b, 2, Some(10)).unwrap(); // …and tagged object 2 elsewhere
    tx.tag(c, 1, Some(11)).unwrap(); // user 11 touched object 1
    tx.tag(d, 9, Some(12)).unwrap(); // user 12 never touched object 1

    let rows = tx.query("T(U(O))", 1, &QueryOptions::default()).unwrap();
    let mut got = ids(&rows);
    got.sort_unstable();
    assert_eq!(got, vec![a, b, c]);
}

#[test]
fn empty_results_are_ok_not_errors() {
    let tx = taxonomy();
    assert!(tx.query("T(O)", 999, &QueryOptions::default()).unwrap().is_empty());
    assert!(tx.popular(Role::Tag, 10, 0).unwrap().is_empty());
    assert!(tx.recent(Role::Tag, 10, 0).unwrap().is_empty());
}

#[test]
fn unknown_tokens_and_short_patterns_fail() {
    let tx = taxonomy();
    assert!(matches!(
        tx.query("T(X)", 1, &QueryOptions::default()),
        Err(TaxonomyError::InvalidPattern(_))
    ));
    assert!(matches!(
        tx.query("T", 1, &QueryOptions::default()),
        Err(TaxonomyError::InvalidPattern(_))
    ));
}

#[test]
fn similar_tags_excludes_the_seed_and_orders_by_overlap() {
    let tx = taxonomy();
    let a = tx.find_or_create_tag("a").unwrap();
    let b = tx.find_or_create_tag("b").unwrap();
    let c = tx.find_or_create_tag("c").unwrap();

    // Object 1 carries a+b+c, object 2 carries a+c.
    for (tag, object) in [(a, 1), (b, 1), (c, 1), (a, 2), (c, 2)] {
        tx.tag(tag, object, None).unwrap();
    }

    let rows = tx.similar_tags(a, 10).unwrap();
    assert_eq!(rows, vec![(c, Some(2)), (b, Some(1))]);
    assert!(!ids(&rows).contains(&a));
}

#[test]
fn similar_objects_honors_min_shared_threshold() {
    let tx = taxonomy();
    tx.apply_tags("a, b, c", 1, None).unwrap();
    tx.apply_tags("a, b", 2, None).unwrap();
    tx.apply_tags("c", 3, None).unwrap();

    let strict = tx.similar_objects(1, 10, 2).unwrap();
    assert_eq!(strict, vec![(2, Some(2))]);

    let loose = tx.similar_objects(1, 10, 1).unwrap();
    assert_eq!(loose, vec![(2, Some(2)), (3, Some(1))]);
}

#[test]
fn cross_role_patterns_do_not_exclude_the_seed_id() {
    let tx = taxonomy();
    let t = tx.find_or_create_tag("a").unwrap();
    // Object id happens to collide numerically with the tag id.
    tx.tag(t, t, None).unwrap();

    let rows = tx.query("T(O)", t, &QueryOptions::default()).unwrap();
    assert_eq!(ids(&rows), vec![t]);
}

#[test]
fn depth_three_patterns_compose() {
    let tx = taxonomy();
    tx.apply_tags("a, b", 1, None).unwrap();
    tx.apply_tags("a, c", 2, None).unwrap();
    tx.apply_tags("d", 3, None).unwrap();

    // Tags of the objects sharing a tag with object 1.
    let rows = tx.query("T(O(T(O)))", 1, &QueryOptions::default()).unwrap();
    let mut got: Vec<String> = ids(&rows)
        .into_iter()
        .map(|id| tx.tag_by_id(id).unwrap().unwrap().text)
        .collect();
    got.sort();
    assert_eq!(got, vec!["a", "b", "c"]);
}

#[test]
fn limit_and_offset_paginate_the_outermost_step() {
    let tx = taxonomy();
    for object in 1..=5 {
        tx.apply_tags("a", object, None).unwrap();
    }
    let a = tx.find_tag("a").unwrap().unwrap().id;

    let flat = |limit, offset| QueryOptions {
        sort_by_usage: false,
        limit,
        offset,
        ..QueryOptions::default()
    };
    let page = tx.query("O(T)", a, &flat(2, 0)).unwrap();
    assert_eq!(page.len(), 2);
    let rest = tx.query("O(T)", a, &flat(10, 4)).unwrap();
    assert_eq!(rest.len(), 1);
}

// ═════════════════════════════════════════════════════════════════════════
// Rankings & sizing
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn popular_orders_by_usage_with_ascending_id_ties() {
    let tx = taxonomy();
    let t1 = tx.find_or_create_tag("one").unwrap();
    let t2 = tx.find_or_create_tag("two").unwrap();
    let t3 = tx.find_or_create_tag("three").unwrap();

    for object in 1..=5 {
        tx.tag(t1, object, None).unwrap();
        tx.tag(t2, object, None).unwrap();
    }
    for object in 1..=10 {
        tx.tag(t3, object, Some(1)).unwrap();
    }

    let rows = tx.popular(Role::Tag, 10, 0).unwrap();
    assert_eq!(rows, vec![(t3, 10), (t1, 5), (t2, 5)]);

    // Pagination applies after ordering.
    let second_page = tx.popular(Role::Tag, 10, 1).unwrap();
    assert_eq!(second_page, vec![(t1, 5), (t2, 5)]);
}

#[test]
fn popular_filtered_constrains_to_one_entity() {
    let tx = taxonomy();
    let a = tx.find_or_create_tag("a").unwrap();
    let b = tx.find_or_create_tag("b").unwrap();
    tx.tag(a, 1, Some(7)).unwrap();
    tx.tag(b, 1, Some(7)).unwrap();
    tx.tag(a, 2, Some(8)).unwrap();

    let rows = tx
        .popular_filtered(Role::Tag, 10, 0, (Role::User, 7))
        .unwrap();
    assert_eq!(rows, vec![(a, 1), (b, 1)]);
}

#[test]
fn popular_users_skip_anonymous_rows() {
    let tx = taxonomy();
    let a = tx.find_or_create_tag("a").unwrap();
    tx.tag(a, 1, None).unwrap();
    tx.tag(a, 2, Some(7)).unwrap();

    let rows = tx.popular(Role::User, 10, 0).unwrap();
    assert_eq!(rows, vec![(7, 1)]);
}

#[test]
fn recent_reports_latest_date_per_group() {
    let tx = taxonomy();
    let a = tx.find_or_create_tag("a").unwrap();
    let b = tx.find_or_create_tag("b").unwrap();
    tx.tag(a, 1, None).unwrap();
    tx.tag(b, 2, None).unwrap();
    tx.tag(a, 3, None).unwrap();

    let rows = tx.recent(Role::Tag, 10, 0).unwrap();
    assert_eq!(rows.len(), 2);
    // Newest first, never increasing.
    for pair in rows.windows(2) {
        assert!(pair[0].1 >= pair[1].1);
    }
    let got: Vec<i64> = rows.iter().map(|&(id, _)| id).collect();
    assert!(got.contains(&a) && got.contains(&b));
}

#[test]
fn cloud_sizes_flow_from_popular_counts() {
    let tx = taxonomy();
    let hot = tx.find_or_create_tag("hot").unwrap();
    let cold = tx.find_or_create_tag("cold").unwrap();
    for object in 1..=10 {
        tx.tag(hot, object, None).unwrap();
    }
    tx.tag(cold, 1, None).unwrap();

    let counts = tx.popular(Role::Tag, 10, 0).unwrap();
    let sizes = tx.scale_sizes(&counts, 100, 250);
    assert_eq!(sizes[&hot], 250);
    assert_eq!(sizes[&cold], 100);
}

// ═════════════════════════════════════════════════════════════════════════
// Boundary parsing
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn seed_ids_from_transports_are_validated() {
    assert_eq!(parse_seed_id("42").unwrap(), 42);
    assert!(matches!(parse_seed_id(""), Err(TaxonomyError::Validation(_))));
    assert!(matches!(
        parse_seed_id("5; DROP TABLE tags"),
        Err(TaxonomyError::Validation(_))
    ));
}
