pub(crate) type Clock = quanta::Clock;
pub(crate) type Instant = quanta::Instant;
