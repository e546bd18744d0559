use tagcache::{unsync::Cache, CacheError, CacheSetup, UsageError};

fn setup<V>(name: &str, tags: &[&str], payload: V) -> CacheSetup<V> {
    CacheSetup::new(name)
        .invalidators(tags.iter().copied())
        .payload(payload)
}

#[test]
fn round_trip() {
    let mut cache = Cache::new();

    assert!(cache.add(setup("a", &["t1"], 42)).is_ok());
    assert_eq!(cache.get("a"), Some(&42));

    assert!(cache.remove("a").is_ok());
    assert_eq!(cache.get("a"), None);
    assert!(!cache.get_all().contains_key("a"));
}

#[test]
fn tag_fan_out() {
    let mut cache = Cache::new();

    cache.add(setup("a", &["t1", "t2"], 1)).unwrap();
    cache.add(setup("b", &["t2"], 2)).unwrap();

    assert_eq!(cache.invalidate("t2"), Ok(2));
    assert_eq!(cache.get("a"), None);
    assert_eq!(cache.get("b"), None);

    let result = cache.invalidate("t1");
    assert_eq!(
        result,
        Err(CacheError::Usage(UsageError::UnknownInvalidator(
            "t1".into()
        )))
    );
    assert!(result.unwrap_err().is_usage());
}

#[test]
fn update_retagging() {
    let mut cache = Cache::new();

    cache.add(setup("a", &["t1"], 1)).unwrap();
    cache.update(setup("a", &["t2"], 2)).unwrap();

    assert!(cache.invalidate("t1").is_err());
    assert_eq!(cache.invalidate("t2"), Ok(1));
    assert_eq!(cache.get("a"), None);
}

#[test]
fn validation_rejection() {
    let mut cache = Cache::new();

    assert!(cache.add(setup("a", &[], 1)).is_err());
    assert!(!cache.contains("a"));

    assert!(cache.add(setup("a", &["t1"], 1)).is_ok());
    assert_eq!(cache.get("a"), Some(&1));
}

#[test]
fn uniqueness() {
    let mut cache = Cache::new();

    cache.add(setup("a", &["t1"], "first")).unwrap();
    assert!(cache.add(setup("a", &["t2"], "second")).is_err());

    let entry = cache.get_entry("a").unwrap();
    assert_eq!(entry.payload(), &"first");
    assert_eq!(entry.invalidators().collect::<Vec<_>>(), vec!["t1"]);
    assert_eq!(cache.entry_count(), 1);
}

#[test]
fn independent_instances() {
    let mut users = Cache::new();
    let mut orders = Cache::new();

    users.add(setup("u1", &["shared"], 1)).unwrap();
    orders.add(setup("o1", &["shared"], 2)).unwrap();

    assert_eq!(users.invalidate("shared"), Ok(1));
    assert_eq!(orders.get("o1"), Some(&2));
    assert!(orders.has_invalidator("shared"));
}

#[test]
fn payloads_may_be_empty_values() {
    let mut cache = Cache::new();

    cache.add(setup("none", &["t1"], None::<u32>)).unwrap();
    cache.add(setup("zero", &["t1"], Some(0))).unwrap();

    assert_eq!(cache.get("none"), Some(&None));
    assert_eq!(cache.get("zero"), Some(&Some(0)));
    assert_eq!(cache.get("missing"), None);
}
