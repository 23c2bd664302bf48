//! Opaque identifiers for simulation entities, following the newtype
//! pattern used for `TechNodeId` in the wider workspace.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($name:ident, $prefix:literal) => {
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }
    };
}

id_type!(UserId, "user");
id_type!(ReleaseId, "release");
id_type!(TransactionId, "txn");
id_type!(EventId, "evt");

/// Monotonic id allocator; the engine owns one per entity kind so ids are
/// stable and collision-free for the lifetime of a run.
#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn next(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_is_monotonic_and_unique() {
        let mut alloc = IdAllocator::new();
        let ids: Vec<u64> = (0..100).map(|_| alloc.next()).collect();
        for w in ids.windows(2) {
            assert!(w[1] > w[0]);
        }
    }

    #[test]
    fn display_format() {
        assert_eq!(UserId(5).to_string(), "user_5");
        assert_eq!(EventId(7).to_string(), "evt_7");
    }
}
