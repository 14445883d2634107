//! IdGenerator port - minting task guids.
//!
//! Guids are ULIDs whose timestamp part comes from the injected [`Clock`],
//! so seeding a store under a `FixedClock` yields guids with a known
//! timestamp.

use ulid::Ulid;

use crate::domain::TaskGuid;
use crate::ports::Clock;

pub trait IdGenerator: Send + Sync {
    fn generate_task_guid(&self) -> TaskGuid;
}

/// ULID based generator.
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_task_guid(&self) -> TaskGuid {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        TaskGuid::from(Ulid::from_parts(timestamp_ms, rand::random()))
    }
}
