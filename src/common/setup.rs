use super::{error::UsageError, to_tags, Tags};

use std::fmt;

/// Describes an entry to be added to, or updated in, a cache.
///
/// A setup is built field by field. All three fields are required, and
/// [`validate`](#method.validate) checks them in this order:
///
/// 1. the payload is present. Any value counts, including `None` when the
///    payload type is an `Option`, so "no payload given" is distinct from "the
///    payload is empty".
/// 2. the name is present and not empty.
/// 3. the invalidators are present and there is at least one of them.
///
/// # Examples
///
/// ```rust
/// use tagcache::{CacheSetup, UsageError};
///
/// let setup = CacheSetup::new("report:2024").invalidators(["reports"]).payload(42);
/// assert!(setup.is_valid());
///
/// let setup = CacheSetup::new("report:2024").payload(42);
/// assert_eq!(setup.validate(), Err(UsageError::MissingInvalidators));
///
/// let setup: CacheSetup<u32> = CacheSetup::new("report:2024").invalidators(["reports"]);
/// assert_eq!(setup.validate(), Err(UsageError::MissingPayload));
/// ```
#[derive(Clone)]
pub struct CacheSetup<V> {
    name: Option<String>,
    invalidators: Option<Vec<String>>,
    payload: Option<V>,
}

impl<V> Default for CacheSetup<V> {
    fn default() -> Self {
        Self {
            name: None,
            invalidators: None,
            payload: None,
        }
    }
}

impl<V> fmt::Debug for CacheSetup<V>
where
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheSetup")
            .field("name", &self.name)
            .field("invalidators", &self.invalidators)
            .field("payload", &self.payload)
            .finish()
    }
}

impl<V> CacheSetup<V> {
    /// Starts a setup for the entry named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self::default().name(name)
    }

    pub fn name(self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    /// Sets the invalidator tags of the entry. Repeated tags are kept once.
    pub fn invalidators<I, T>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            invalidators: Some(tags.into_iter().map(Into::into).collect()),
            ..self
        }
    }

    pub fn payload(self, payload: V) -> Self {
        Self {
            payload: Some(payload),
            ..self
        }
    }

    /// Checks that the setup can be stored, without side effects. Returns the
    /// first problem found.
    pub fn validate(&self) -> Result<(), UsageError> {
        if self.payload.is_none() {
            return Err(UsageError::MissingPayload);
        }
        match self.name.as_deref() {
            None => return Err(UsageError::MissingName),
            Some("") => return Err(UsageError::EmptyName),
            Some(_) => {}
        }
        match self.invalidators.as_deref() {
            None => Err(UsageError::MissingInvalidators),
            Some([]) => Err(UsageError::EmptyInvalidators),
            Some(_) => Ok(()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    // Checks the fields in the same order as `validate`.
    pub(crate) fn into_parts(self) -> Result<(String, Tags, V), UsageError> {
        let Self {
            name,
            invalidators,
            payload,
        } = self;

        let payload = payload.ok_or(UsageError::MissingPayload)?;
        let name = name.ok_or(UsageError::MissingName)?;
        if name.is_empty() {
            return Err(UsageError::EmptyName);
        }
        let tags = to_tags(invalidators.ok_or(UsageError::MissingInvalidators)?);
        if tags.is_empty() {
            return Err(UsageError::EmptyInvalidators);
        }

        Ok((name, tags, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::CacheSetup;
    use crate::UsageError;

    #[test]
    fn validation_order() {
        let setup = CacheSetup::<u32>::default();
        assert_eq!(setup.validate(), Err(UsageError::MissingPayload));

        let setup = setup.payload(1);
        assert_eq!(setup.validate(), Err(UsageError::MissingName));

        let setup = setup.name("");
        assert_eq!(setup.validate(), Err(UsageError::EmptyName));

        let setup = setup.name("a");
        assert_eq!(setup.validate(), Err(UsageError::MissingInvalidators));

        let setup = setup.invalidators(Vec::<String>::new());
        assert_eq!(setup.validate(), Err(UsageError::EmptyInvalidators));

        let setup = setup.invalidators(["t1"]);
        assert_eq!(setup.validate(), Ok(()));
        assert!(setup.is_valid());
    }

    #[test]
    fn empty_payload_is_still_a_payload() {
        let setup = CacheSetup::new("a").invalidators(["t1"]).payload(None::<u32>);
        assert!(setup.is_valid());

        let setup = CacheSetup::new("a").invalidators(["t1"]).payload(0);
        assert!(setup.is_valid());

        let setup = CacheSetup::new("a").invalidators(["t1"]).payload(false);
        assert!(setup.is_valid());
    }

    #[test]
    fn into_parts_agrees_with_validate() {
        let setups = vec![
            CacheSetup::<u8>::default(),
            CacheSetup::default().payload(1),
            CacheSetup::new("").payload(1),
            CacheSetup::new("a").payload(1),
            CacheSetup::new("a").payload(1).invalidators(Vec::<&str>::new()),
            CacheSetup::new("a").payload(1).invalidators(["t1"]),
        ];

        for setup in setups {
            let expected = setup.validate();
            assert_eq!(setup.into_parts().map(|_| ()), expected);
        }
    }

    #[test]
    fn into_parts_drops_repeated_tags() {
        let (name, tags, payload) = CacheSetup::new("a")
            .invalidators(["t1", "t2", "t1"])
            .payload("alice")
            .into_parts()
            .unwrap();

        assert_eq!(name, "a");
        assert_eq!(payload, "alice");
        let tags: Vec<&str> = tags.iter().map(|t| &**t).collect();
        assert_eq!(tags, vec!["t1", "t2"]);
    }
}
