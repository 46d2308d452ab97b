use std::mem;

use smallvec::SmallVec;

use crate::constants::POOL_BLOCK_BYTES;

/// Index of a live slot in one pool, validated by generation.
///
/// A handle stays valid until the slot is freed; the slot's generation is
/// bumped at that point, so any retained copy of the handle is detected
/// as stale instead of silently reading reused memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Handle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

#[derive(Debug)]
enum SlotState<T> {
    Vacant { next_free: Option<u32> },
    Occupied(T),
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    state: SlotState<T>,
}

/// Allocation counters of one pool. `outstanding`, `lifetime` and
/// `high_water` count slots; `blocks` and `slots_per_block` describe how
/// much memory backs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    pub outstanding: usize,
    pub lifetime: usize,
    pub high_water: usize,
    pub blocks: usize,
    pub slots_per_block: usize,
}

/// Fixed-size slot pool for one node kind.
///
/// Slots live in blocks sized to roughly [`POOL_BLOCK_BYTES`]; vacant
/// slots form a singly linked free list threaded through slot indices.
/// The block registry keeps inline room for the first ten blocks before
/// spilling to the heap. Freed blocks are never returned individually;
/// dropping the pool releases everything at once.
#[derive(Debug)]
pub(crate) struct Pool<T> {
    blocks: SmallVec<[Box<[Slot<T>]>; 10]>,
    free_head: Option<u32>,
    outstanding: usize,
    lifetime: usize,
    high_water: usize,
    #[cfg(debug_assertions)]
    untracked: usize,
}

impl<T> Pool<T> {
    const SLOTS_PER_BLOCK: u32 = {
        let count = POOL_BLOCK_BYTES / mem::size_of::<Slot<T>>();
        if count == 0 {
            1
        } else {
            count as u32
        }
    };

    pub(crate) fn new() -> Self {
        Self {
            blocks: SmallVec::new(),
            free_head: None,
            outstanding: 0,
            lifetime: 0,
            high_water: 0,
            #[cfg(debug_assertions)]
            untracked: 0,
        }
    }

    pub(crate) fn slots_per_block() -> usize {
        Self::SLOTS_PER_BLOCK as usize
    }

    fn slot(&self, index: u32) -> &Slot<T> {
        let per = Self::SLOTS_PER_BLOCK;
        &self.blocks[(index / per) as usize][(index % per) as usize]
    }

    fn slot_mut(&mut self, index: u32) -> &mut Slot<T> {
        let per = Self::SLOTS_PER_BLOCK;
        &mut self.blocks[(index / per) as usize][(index % per) as usize]
    }

    // Appends one block of vacant slots chained into a fresh free list
    // and returns the index of the first of them.
    fn grow(&mut self) -> u32 {
        let per = Self::SLOTS_PER_BLOCK;
        let base = self.blocks.len() as u32 * per;
        let mut slots = Vec::with_capacity(per as usize);
        for offset in 0..per {
            let next_free = if offset + 1 < per {
                Some(base + offset + 1)
            } else {
                None
            };
            slots.push(Slot {
                generation: 0,
                state: SlotState::Vacant { next_free },
            });
        }
        self.blocks.push(slots.into_boxed_slice());
        log::trace!(
            "pool grew to {} block(s), {} slots of {} bytes each",
            self.blocks.len(),
            per,
            mem::size_of::<T>()
        );
        base
    }

    pub(crate) fn allocate(&mut self, value: T) -> Handle {
        let index = match self.free_head.take() {
            Some(index) => index,
            None => self.grow(),
        };
        let (generation, next_free) = {
            let slot = self.slot_mut(index);
            let next_free = match slot.state {
                SlotState::Vacant { next_free } => next_free,
                SlotState::Occupied(_) => panic!("pool free list points at an occupied slot"),
            };
            slot.state = SlotState::Occupied(value);
            (slot.generation, next_free)
        };
        self.free_head = next_free;
        self.outstanding += 1;
        self.lifetime += 1;
        if self.outstanding > self.high_water {
            self.high_water = self.outstanding;
        }
        #[cfg(debug_assertions)]
        {
            self.untracked += 1;
        }
        Handle { index, generation }
    }

    /// Returns the slot to the free list and bumps its generation so any
    /// retained handle to it is detected as stale from now on.
    pub(crate) fn free(&mut self, handle: Handle) -> T {
        let free_head = self.free_head;
        let value = {
            let slot = self.slot_mut(handle.index);
            if slot.generation != handle.generation {
                panic!("pool handle is stale or foreign");
            }
            let state = mem::replace(&mut slot.state, SlotState::Vacant { next_free: free_head });
            match state {
                SlotState::Occupied(value) => {
                    slot.generation = slot.generation.wrapping_add(1);
                    value
                }
                SlotState::Vacant { .. } => panic!("pool double free"),
            }
        };
        self.free_head = Some(handle.index);
        self.outstanding -= 1;
        value
    }

    pub(crate) fn get(&self, handle: Handle) -> &T {
        let slot = self.slot(handle.index);
        match &slot.state {
            SlotState::Occupied(value) if slot.generation == handle.generation => value,
            _ => panic!("pool handle is stale or foreign"),
        }
    }

    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        let slot = self.slot_mut(handle.index);
        match &mut slot.state {
            SlotState::Occupied(value) if slot.generation == handle.generation => value,
            _ => panic!("pool handle is stale or foreign"),
        }
    }

    pub(crate) fn stats(&self) -> PoolStats {
        PoolStats {
            outstanding: self.outstanding,
            lifetime: self.lifetime,
            high_water: self.high_water,
            blocks: self.blocks.len(),
            slots_per_block: Self::SLOTS_PER_BLOCK as usize,
        }
    }

    /// Marks one allocation as linked into the tree. Allocations start
    /// untracked; at teardown of an error-free document both counters
    /// must have returned to zero.
    #[cfg(debug_assertions)]
    pub(crate) fn set_tracked(&mut self) {
        self.untracked -= 1;
    }

    #[cfg(debug_assertions)]
    pub(crate) fn untracked(&self) -> usize {
        self.untracked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn allocate_and_read_back() {
        let mut pool = Pool::new();
        let a = pool.allocate(10_u64);
        let b = pool.allocate(20_u64);
        assert_ne!(a, b);
        assert_eq!(*pool.get(a), 10);
        assert_eq!(*pool.get(b), 20);
        *pool.get_mut(a) += 1;
        assert_eq!(*pool.get(a), 11);
    }

    #[rstest::rstest]
    fn free_returns_value_and_reuses_slot() {
        let mut pool = Pool::new();
        let a = pool.allocate(7_u64);
        assert_eq!(pool.free(a), 7);
        let b = pool.allocate(8_u64);
        assert_eq!(b.index, a.index);
        assert_ne!(b.generation, a.generation);
        assert_eq!(*pool.get(b), 8);
    }

    #[rstest::rstest]
    #[should_panic(expected = "stale or foreign")]
    fn stale_handle_get_panics() {
        let mut pool = Pool::new();
        let a = pool.allocate(1_u64);
        pool.free(a);
        pool.get(a);
    }

    #[rstest::rstest]
    #[should_panic(expected = "stale or foreign")]
    fn double_free_panics() {
        let mut pool = Pool::new();
        let a = pool.allocate(1_u64);
        pool.free(a);
        pool.free(a);
    }

    #[rstest::rstest]
    fn grows_one_block_at_a_time() {
        let mut pool = Pool::new();
        let per = Pool::<u64>::slots_per_block();
        let mut handles = Vec::new();
        for value in 0..per as u64 {
            handles.push(pool.allocate(value));
        }
        assert_eq!(pool.stats().blocks, 1);
        handles.push(pool.allocate(per as u64));
        assert_eq!(pool.stats().blocks, 2);
        for handle in handles {
            pool.free(handle);
        }
        assert_eq!(pool.stats().outstanding, 0);
    }

    #[rstest::rstest]
    fn block_count_bounded_by_live_peak() {
        let mut pool = Pool::new();
        let per = Pool::<u64>::slots_per_block();
        let live_peak = per + 1;
        for round in 0..50_u64 {
            let handles: Vec<_> = (0..live_peak).map(|_| pool.allocate(round)).collect();
            for handle in handles {
                pool.free(handle);
            }
        }
        let stats = pool.stats();
        assert_eq!(stats.blocks, 2);
        assert_eq!(stats.high_water, live_peak);
        assert_eq!(stats.lifetime, 50 * live_peak);
        assert_eq!(stats.outstanding, 0);
    }

    #[rstest::rstest]
    fn large_payloads_still_get_at_least_one_slot_per_block() {
        let mut pool = Pool::new();
        let value = [0_u8; 4096];
        let a = pool.allocate(value);
        assert_eq!(Pool::<[u8; 4096]>::slots_per_block(), 1);
        assert_eq!(pool.stats().blocks, 1);
        pool.free(a);
    }

    #[cfg(debug_assertions)]
    #[rstest::rstest]
    fn untracked_counter_balances_after_linking() {
        let mut pool = Pool::new();
        let a = pool.allocate(1_u64);
        let b = pool.allocate(2_u64);
        assert_eq!(pool.untracked(), 2);
        pool.set_tracked();
        pool.set_tracked();
        assert_eq!(pool.untracked(), 0);
        pool.free(a);
        pool.free(b);
        assert_eq!(pool.stats().outstanding, 0);
    }

    #[rstest::rstest]
    fn handles_survive_growth() {
        let mut pool = Pool::new();
        let per = Pool::<u64>::slots_per_block();
        let first = pool.allocate(42);
        for value in 0..(3 * per) as u64 {
            pool.allocate(value);
        }
        assert_eq!(*pool.get(first), 42);
    }
}
