use smallvec::SmallVec;
use std::rc::Rc;

pub(crate) mod entry;
pub(crate) mod error;
pub(crate) mod setup;
pub(crate) mod time;

/// Invalidator tags held by a single entry, in first-seen order.
pub(crate) type Tags = SmallVec<[Rc<str>; 4]>;

// Collects tags, dropping repeated ones so that each tag appears once.
pub(crate) fn to_tags<I, T>(tags: I) -> Tags
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let mut collected = Tags::new();
    for tag in tags {
        let tag: String = tag.into();
        if !collected.iter().any(|t| **t == *tag) {
            collected.push(Rc::from(tag));
        }
    }
    collected
}

#[cfg(test)]
mod tests {
    use super::to_tags;

    #[test]
    fn to_tags_keeps_first_occurrence_order() {
        let tags = to_tags(["b", "a", "b", "c", "a"]);
        let tags: Vec<&str> = tags.iter().map(|t| &**t).collect();
        assert_eq!(tags, vec!["b", "a", "c"]);
    }

    #[test]
    fn to_tags_accepts_owned_strings() {
        let tags = to_tags(vec!["x".to_string(), String::new()]);
        assert_eq!(tags.len(), 2);
        assert_eq!(&*tags[1], "");
    }
}
