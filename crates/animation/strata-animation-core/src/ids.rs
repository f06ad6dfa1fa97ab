//! Layer handles and their allocator.
//!
//! A `LayerId` is a non-owning handle into a `LayerPool`: slot index plus a
//! generation that is bumped whenever the slot is freed, so a handle kept by
//! a mix partner goes stale instead of aliasing a newer layer.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct LayerId {
    pub index: u32,
    pub generation: u32,
}

/// Slot allocator with a free list. Dense indices keep layers cache-local;
/// ids are opaque externally.
#[derive(Default, Debug)]
pub struct IdAllocator {
    generations: Vec<u32>,
    live: Vec<bool>,
    free: Vec<u32>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            generations: Vec::with_capacity(capacity),
            live: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    #[inline]
    pub fn alloc(&mut self) -> LayerId {
        if let Some(index) = self.free.pop() {
            let slot = index as usize;
            self.live[slot] = true;
            return LayerId {
                index,
                generation: self.generations[slot],
            };
        }
        let index = self.generations.len() as u32;
        self.generations.push(0);
        self.live.push(true);
        LayerId {
            index,
            generation: 0,
        }
    }

    /// Release a handle. Returns false if it was already stale.
    #[inline]
    pub fn release(&mut self, id: LayerId) -> bool {
        if !self.is_live(id) {
            return false;
        }
        let slot = id.index as usize;
        self.live[slot] = false;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.free.push(id.index);
        true
    }

    #[inline]
    pub fn is_live(&self, id: LayerId) -> bool {
        let slot = id.index as usize;
        slot < self.generations.len() && self.live[slot] && self.generations[slot] == id.generation
    }

    /// Number of slots ever handed out (live or free).
    #[inline]
    pub fn slots(&self) -> usize {
        self.generations.len()
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc().index, 0);
        assert_eq!(alloc.alloc().index, 1);
        assert_eq!(alloc.slots(), 2);
    }

    #[test]
    fn released_slot_is_reused_with_new_generation() {
        let mut alloc = IdAllocator::new();
        let a = alloc.alloc();
        assert!(alloc.release(a));
        assert!(!alloc.release(a));
        let b = alloc.alloc();
        assert_eq!(b.index, a.index);
        assert_ne!(b.generation, a.generation);
        assert!(!alloc.is_live(a));
        assert!(alloc.is_live(b));
    }

    #[test]
    fn reset_forgets_everything() {
        let mut alloc = IdAllocator::new();
        let a = alloc.alloc();
        alloc.reset();
        assert!(!alloc.is_live(a));
        assert_eq!(alloc.alloc().index, 0);
    }
}
