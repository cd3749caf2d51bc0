//! Identifiers and simple allocators for core entities.

use serde::{Deserialize, Serialize};

/// Handle to a live animation instance owned by the manager.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstId(pub u32);

/// Monotonic allocator for instance ids and generated animation name counters.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_inst: u32,
    next_uid: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocator whose next generated-name counter is `uid`.
    pub fn starting_at(uid: u64) -> Self {
        Self {
            next_inst: 0,
            next_uid: uid,
        }
    }

    #[inline]
    pub fn alloc_inst(&mut self) -> InstId {
        let id = InstId(self.next_inst);
        self.next_inst = self.next_inst.wrapping_add(1);
        id
    }

    /// Next counter for a generated name. The flag is set when the counter wrapped.
    #[inline]
    pub fn alloc_uid(&mut self) -> (u64, bool) {
        let uid = self.next_uid;
        self.next_uid = self.next_uid.wrapping_add(1);
        (uid, self.next_uid < uid)
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
