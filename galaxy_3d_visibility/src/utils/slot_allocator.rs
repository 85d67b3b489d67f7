/// Allocates and recycles small `u32` slot indices under a fixed limit.
///
/// Each SubMap uses one allocator to hand out the arrival bit of its
/// portals: the traversal's visited set stores a `u64` mask per submap,
/// so a submap can never hold more than 64 live portals. Freed bits are
/// recycled on subsequent allocations, keeping every live bit below the
/// limit no matter how many portals were added and deleted over time.
///
/// # Example
///
/// ```ignore
/// let mut alloc = SlotAllocator::new(64);
/// let a = alloc.alloc();  // Some(0)
/// let b = alloc.alloc();  // Some(1)
/// alloc.free(0);          // 0 is now available
/// let c = alloc.alloc();  // Some(0) (recycled)
/// ```
#[derive(Debug, Clone)]
pub struct SlotAllocator {
    free_list: Vec<u32>,
    next_id: u32,
    len: u32,
    limit: u32,
}

impl SlotAllocator {
    /// Create a new empty allocator handing out indices in `0..limit`
    pub fn new(limit: u32) -> Self {
        Self {
            free_list: Vec::new(),
            next_id: 0,
            len: 0,
            limit,
        }
    }

    /// Allocate the next available slot index, `None` once `limit` slots are live
    pub fn alloc(&mut self) -> Option<u32> {
        let id = match self.free_list.pop() {
            Some(id) => id,
            None if self.next_id < self.limit => {
                let id = self.next_id;
                self.next_id += 1;
                id
            }
            None => return None,
        };
        self.len += 1;
        Some(id)
    }

    /// Return a slot index to the pool for reuse
    pub fn free(&mut self, id: u32) {
        debug_assert!(id < self.next_id, "freeing an unallocated slot: {}", id);
        debug_assert!(!self.free_list.contains(&id), "double free of slot: {}", id);
        self.len -= 1;
        self.free_list.push(id);
    }

    /// Highest index ever allocated + 1.
    pub fn high_water_mark(&self) -> u32 {
        self.next_id
    }

    /// Exclusive upper bound of every index this allocator returns
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of currently allocated slots
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether no slots are currently allocated
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "slot_allocator_tests.rs"]
mod tests;
