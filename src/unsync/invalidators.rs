use smallvec::SmallVec;
use std::{collections::HashMap, hash::BuildHasher, rc::Rc};

// Names of the entries subscribed to one tag, in subscription order.
pub(crate) type Subscribers = SmallVec<[Rc<str>; 4]>;

/// The reverse index from an invalidator tag to the names of the entries
/// subscribed to it.
///
/// A tag is present only while at least one entry is subscribed to it, and an
/// entry name appears at most once per tag.
pub(crate) struct InvalidatorIndex<S> {
    map: HashMap<Rc<str>, Subscribers, S>,
}

impl<S> InvalidatorIndex<S>
where
    S: BuildHasher,
{
    pub(crate) fn with_capacity_and_hasher(capacity: usize, build_hasher: S) -> Self {
        Self {
            map: HashMap::with_capacity_and_hasher(capacity, build_hasher),
        }
    }

    /// Subscribes `name` to every tag in `tags`. Already subscribed tags are left
    /// as they are.
    pub(crate) fn register(&mut self, name: &Rc<str>, tags: &[Rc<str>]) {
        for tag in tags {
            self.subscribe(tag, name);
        }
    }

    /// Unsubscribes `name` from every tag in `tags`, or from every tag in the
    /// index when `tags` is `None`. Tags left without subscribers are dropped.
    pub(crate) fn unregister(&mut self, name: &str, tags: Option<&[Rc<str>]>) {
        if let Some(tags) = tags {
            for tag in tags {
                self.unsubscribe(tag, name);
            }
        } else {
            self.map.retain(|_, names| {
                names.retain(|n| **n != *name);
                !names.is_empty()
            });
        }
    }

    /// Moves the subscriptions of `name` from `old_tags` to `new_tags`. Tags
    /// present in both are not touched.
    pub(crate) fn retag(&mut self, name: &Rc<str>, old_tags: &[Rc<str>], new_tags: &[Rc<str>]) {
        for tag in old_tags.iter().filter(|t| !new_tags.contains(*t)) {
            self.unsubscribe(tag, name);
        }
        for tag in new_tags.iter().filter(|t| !old_tags.contains(*t)) {
            self.subscribe(tag, name);
        }
    }

    pub(crate) fn subscribe(&mut self, tag: &Rc<str>, name: &Rc<str>) {
        if let Some(names) = self.map.get_mut(&**tag) {
            if !names.contains(name) {
                names.push(Rc::clone(name));
            }
        } else {
            let mut names = Subscribers::new();
            names.push(Rc::clone(name));
            self.map.insert(Rc::clone(tag), names);
        }
    }

    pub(crate) fn unsubscribe(&mut self, tag: &str, name: &str) {
        if let Some(names) = self.map.get_mut(tag) {
            if let Some(pos) = names.iter().position(|n| **n == *name) {
                names.remove(pos);
            }
            if names.is_empty() {
                self.map.remove(tag);
            }
        }
    }

    pub(crate) fn subscribers(&self, tag: &str) -> Option<&[Rc<str>]> {
        self.map.get(tag).map(|names| names.as_slice())
    }

    /// Returns a copy of the subscribers of `tag`, safe to hold while the index is
    /// being modified.
    pub(crate) fn snapshot(&self, tag: &str) -> Option<Subscribers> {
        self.map.get(tag).cloned()
    }

    pub(crate) fn contains(&self, tag: &str) -> bool {
        self.map.contains_key(tag)
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Rc<str>, &[Rc<str>])> + '_ {
        self.map.iter().map(|(tag, names)| (tag, names.as_slice()))
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
    }

    pub(crate) fn count_subscriptions(&self, tag: &str, name: &str) -> usize {
        self.subscribers(tag)
            .map(|names| names.iter().filter(|n| ***n == *name).count())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::InvalidatorIndex;
    use crate::common::to_tags;

    use std::{collections::hash_map::RandomState, rc::Rc};

    fn index() -> InvalidatorIndex<RandomState> {
        InvalidatorIndex::with_capacity_and_hasher(0, RandomState::default())
    }

    fn names(index: &InvalidatorIndex<RandomState>, tag: &str) -> Option<Vec<String>> {
        index
            .subscribers(tag)
            .map(|names| names.iter().map(|n| n.to_string()).collect())
    }

    fn tags(tags: &[&str]) -> Vec<Rc<str>> {
        tags.iter().map(|t| Rc::from(*t)).collect()
    }

    #[test]
    fn register_is_an_idempotent_union() {
        let mut index = index();
        let a: Rc<str> = Rc::from("a");
        let b: Rc<str> = Rc::from("b");

        // Repeated tags in a single call.
        index.register(&a, &tags(&["t1", "t1"]));
        assert_eq!(names(&index, "t1"), Some(vec!["a".into()]));

        // Repeated calls.
        index.register(&a, &tags(&["t1"]));
        index.register(&b, &tags(&["t1", "t2"]));
        index.register(&a, &tags(&["t1"]));
        assert_eq!(names(&index, "t1"), Some(vec!["a".into(), "b".into()]));
        assert_eq!(names(&index, "t2"), Some(vec!["b".into()]));
        assert_eq!(index.count_subscriptions("t1", "a"), 1);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn unregister_drops_empty_tags() {
        let mut index = index();
        let a: Rc<str> = Rc::from("a");
        let b: Rc<str> = Rc::from("b");

        index.register(&a, &tags(&["t1", "t2"]));
        index.register(&b, &tags(&["t2"]));

        index.unregister("a", Some(tags(&["t1", "t2"]).as_slice()));
        assert!(!index.contains("t1"));
        assert_eq!(names(&index, "t2"), Some(vec!["b".into()]));

        // Unknown names and tags are ignored.
        index.unregister("a", Some(tags(&["t2", "t3"]).as_slice()));
        index.unregister("c", Some(tags(&["t2"]).as_slice()));
        assert_eq!(names(&index, "t2"), Some(vec!["b".into()]));

        index.unregister("b", Some(tags(&["t2"]).as_slice()));
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn unregister_everywhere() {
        let mut index = index();
        let a: Rc<str> = Rc::from("a");
        let b: Rc<str> = Rc::from("b");

        index.register(&a, &tags(&["t1", "t2", "t3"]));
        index.register(&b, &tags(&["t3"]));

        index.unregister("a", None);
        assert!(!index.contains("t1"));
        assert!(!index.contains("t2"));
        assert_eq!(names(&index, "t3"), Some(vec!["b".into()]));
    }

    #[test]
    fn retag_touches_only_the_difference() {
        let mut index = index();
        let a: Rc<str> = Rc::from("a");
        let b: Rc<str> = Rc::from("b");

        index.register(&a, &tags(&["keep", "drop"]));
        index.register(&b, &tags(&["keep"]));
        // "a" comes first on "keep"; a retag must not move it to the back.
        assert_eq!(names(&index, "keep"), Some(vec!["a".into(), "b".into()]));

        let old = to_tags(["keep", "drop"]);
        let new = to_tags(["keep", "new"]);
        index.retag(&a, &old, &new);

        assert_eq!(names(&index, "keep"), Some(vec!["a".into(), "b".into()]));
        assert!(!index.contains("drop"));
        assert_eq!(names(&index, "new"), Some(vec!["a".into()]));
    }

    #[test]
    fn snapshot_is_detached() {
        let mut index = index();
        let a: Rc<str> = Rc::from("a");

        index.register(&a, &tags(&["t1"]));
        let snapshot = index.snapshot("t1").unwrap();
        index.unregister("a", Some(tags(&["t1"]).as_slice()));

        assert_eq!(snapshot.len(), 1);
        assert!(index.snapshot("t1").is_none());
    }
}
