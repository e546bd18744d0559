use std::time::Instant as StdInstant;

#[cfg(test)]
use std::{sync::Arc, time::Duration};

#[cfg(test)]
use parking_lot::Mutex;

pub(crate) type Instant = StdInstant;

/// Reads entry timestamps from `std::time::Instant`. In tests, a mocked clock
/// stands still until its `Mock` is advanced.
#[derive(Clone, Default)]
pub(crate) struct Clock {
    #[cfg(test)]
    mock: Option<Arc<Mock>>,
}

impl Clock {
    pub(crate) fn new() -> Clock {
        Clock::default()
    }

    #[cfg(not(test))]
    pub(crate) fn now(&self) -> Instant {
        StdInstant::now()
    }

    #[cfg(test)]
    pub(crate) fn now(&self) -> Instant {
        match &self.mock {
            Some(mock) => mock.now(),
            None => StdInstant::now(),
        }
    }

    #[cfg(test)]
    pub(crate) fn mock() -> (Clock, Arc<Mock>) {
        let mock = Arc::new(Mock {
            origin: StdInstant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        });
        let clock = Clock {
            mock: Some(Arc::clone(&mock)),
        };
        (clock, mock)
    }
}

// A frozen origin plus the time advanced by the test.
#[cfg(test)]
pub(crate) struct Mock {
    origin: StdInstant,
    elapsed: Mutex<Duration>,
}

#[cfg(test)]
impl Mock {
    pub(crate) fn increment(&self, amount: Duration) {
        *self.elapsed.lock() += amount;
    }

    fn now(&self) -> Instant {
        self.origin + *self.elapsed.lock()
    }
}
