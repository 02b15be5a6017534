use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Stable identifier of one layer for the lifetime of the owning store.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Issues strictly increasing, timestamp-seeded layer ids.
#[derive(Clone, Debug)]
pub struct LayerIdGen {
    last: u64,
    follow_clock: bool,
}

impl Default for LayerIdGen {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerIdGen {
    /// Seed from the wall clock (milliseconds since the Unix epoch).
    pub fn new() -> Self {
        Self {
            last: now_millis().saturating_sub(1),
            follow_clock: true,
        }
    }

    /// Seed from an explicit value and count up from it, ignoring the clock.
    ///
    /// The first issued id is `start`.
    pub fn starting_at(start: u64) -> Self {
        Self {
            last: start.saturating_sub(1),
            follow_clock: false,
        }
    }

    /// Issue the next id.
    ///
    /// Ids track the clock when it is ahead and otherwise increment, so two ids issued in the same
    /// millisecond never collide.
    pub fn next_id(&mut self) -> LayerId {
        let next = self.last.saturating_add(1);
        let candidate = if self.follow_clock {
            now_millis().max(next)
        } else {
            next
        };
        self.last = candidate;
        LayerId(candidate)
    }

    /// Make sure ids issued from now on are greater than `id`.
    pub fn observe(&mut self, id: LayerId) {
        self.last = self.last.max(id.0);
    }
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
