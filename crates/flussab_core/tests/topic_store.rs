use flussab_core::{StoreError, TopicStore};
use std::collections::HashSet;

fn names(store: &TopicStore) -> Vec<&str> {
    store.topics().iter().map(|t| t.name.as_str()).collect()
}

#[test]
fn add_topic_inserts_at_head() {
    let mut store = TopicStore::new();
    store.add_topic("Shopping").unwrap().unwrap();
    store.add_topic("Work").unwrap().unwrap();

    assert_eq!(names(&store), vec!["Work", "Shopping"]);
    assert_eq!(store.len(), 2);
}

#[test]
fn add_topic_increments_count_by_one_for_each_valid_name() {
    let mut store = TopicStore::new();
    for (index, name) in ["a", " b", "c ", "\td\n", "same", "same"].iter().enumerate() {
        let id = store.add_topic(name).unwrap().expect("name is not blank");
        assert_eq!(store.len(), index + 1);
        assert_eq!(store.topics()[0].id, id);
    }
}

#[test]
fn blank_topic_names_are_ignored() {
    let mut store = TopicStore::new();
    assert_eq!(store.add_topic("").unwrap(), None);
    assert_eq!(store.add_topic("   ").unwrap(), None);
    assert_eq!(store.add_topic("\n\t").unwrap(), None);
    assert!(store.is_empty());
}

#[test]
fn topic_name_is_stored_trimmed() {
    let mut store = TopicStore::new();
    let id = store.add_topic("  Garden  ").unwrap().unwrap();
    assert_eq!(store.get(id).unwrap().name, "Garden");
}

#[test]
fn duplicate_names_get_distinct_ids() {
    let mut store = TopicStore::new();
    let first = store.add_topic("Ideas").unwrap().unwrap();
    let second = store.add_topic("Ideas").unwrap().unwrap();
    assert_ne!(first, second);
    assert_eq!(store.len(), 2);
}

#[test]
fn ids_are_unique_and_increasing_within_one_millisecond_burst() {
    let mut store = TopicStore::new();
    let ids: Vec<i64> = (0..200)
        .map(|i| store.add_topic(&format!("topic {i}")).unwrap().unwrap())
        .collect();

    let unique: HashSet<i64> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn details_keep_insertion_order() {
    let mut store = TopicStore::new();
    let id = store.add_topic("Shopping").unwrap().unwrap();

    assert!(store.add_detail(id, "Milk").unwrap());
    assert!(store.add_detail(id, "Eggs").unwrap());

    assert_eq!(store.get(id).unwrap().details, vec!["Milk", "Eggs"]);
}

#[test]
fn details_are_stored_verbatim_and_may_repeat() {
    let mut store = TopicStore::new();
    let id = store.add_topic("Shopping").unwrap().unwrap();

    store.add_detail(id, "  Milk  ").unwrap();
    store.add_detail(id, "  Milk  ").unwrap();

    assert_eq!(store.get(id).unwrap().details, vec!["  Milk  ", "  Milk  "]);
}

#[test]
fn blank_details_are_ignored() {
    let mut store = TopicStore::new();
    let id = store.add_topic("Shopping").unwrap().unwrap();
    store.add_detail(id, "Milk").unwrap();

    assert!(!store.add_detail(id, "").unwrap());
    assert!(!store.add_detail(id, "  ").unwrap());
    assert_eq!(store.get(id).unwrap().details, vec!["Milk"]);
}

#[test]
fn add_detail_to_unknown_topic_fails_with_not_found() {
    let mut store = TopicStore::new();
    store.add_topic("Shopping").unwrap().unwrap();

    let err = store.add_detail(12345, "Milk").unwrap_err();
    assert!(matches!(err, StoreError::TopicNotFound(12345)));
}

#[test]
fn blank_detail_for_unknown_topic_is_still_a_no_op() {
    let mut store = TopicStore::new();
    assert!(!store.add_detail(12345, " ").unwrap());
}

#[test]
fn details_only_touch_their_topic() {
    let mut store = TopicStore::new();
    let shopping = store.add_topic("Shopping").unwrap().unwrap();
    let work = store.add_topic("Work").unwrap().unwrap();

    store.add_detail(shopping, "Milk").unwrap();
    store.add_detail(work, "Report").unwrap();

    assert_eq!(store.get(shopping).unwrap().details, vec!["Milk"]);
    assert_eq!(store.get(work).unwrap().details, vec!["Report"]);
    assert_eq!(names(&store), vec!["Work", "Shopping"]);
}

#[test]
fn new_topic_becomes_sole_active_topic() {
    let mut store = TopicStore::new();
    let first = store.add_topic("first").unwrap().unwrap();
    assert_eq!(store.active(), Some(first));

    let second = store.add_topic("second").unwrap().unwrap();
    assert_eq!(store.active(), Some(second));
    assert!(!store.get(first).unwrap().expanded);
}

#[test]
fn set_active_switches_and_toggles() {
    let mut store = TopicStore::new();
    let first = store.add_topic("first").unwrap().unwrap();
    let second = store.add_topic("second").unwrap().unwrap();

    assert_eq!(store.set_active(first).unwrap(), Some(first));
    assert_eq!(store.active(), Some(first));
    assert!(!store.get(second).unwrap().expanded);

    assert_eq!(store.set_active(first).unwrap(), None);
    assert_eq!(store.active(), None);

    assert_eq!(store.set_active(second).unwrap(), Some(second));
    assert_eq!(store.topics().iter().filter(|t| t.expanded).count(), 1);
}

#[test]
fn set_active_unknown_topic_keeps_state() {
    let mut store = TopicStore::new();
    let id = store.add_topic("only").unwrap().unwrap();

    let err = store.set_active(id + 1_000).unwrap_err();
    assert!(matches!(err, StoreError::TopicNotFound(_)));
    assert_eq!(store.active(), Some(id));
}

#[test]
fn set_active_does_not_change_data_or_order() {
    let mut store = TopicStore::new();
    let first = store.add_topic("first").unwrap().unwrap();
    store.add_detail(first, "x").unwrap();
    store.add_topic("second").unwrap().unwrap();

    store.set_active(first).unwrap();

    assert_eq!(names(&store), vec!["second", "first"]);
    assert_eq!(store.get(first).unwrap().details, vec!["x"]);
}
