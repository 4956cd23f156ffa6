//! Slot+generation table mapping `dycore_index` values to instances.
//!
//! Hosts address instances by a plain `int`, so the handle is a
//! non-negative `i32`: the low 16 bits hold the slot, the next 15 bits a
//! generation counter. Destroyed indices carry a stale generation and
//! resolve to `None`; destroying twice is a no-op.

const SLOT_BITS: u32 = 16;
const SLOT_MASK: u32 = (1 << SLOT_BITS) - 1;
const GENERATION_MASK: u32 = (1 << 15) - 1;

/// Highest number of slots the encoding can address.
pub(crate) const MAX_SLOTS: usize = 1 << SLOT_BITS;

fn encode(slot: u32, generation: u32) -> i32 {
    ((generation << SLOT_BITS) | slot) as i32
}

fn decode(handle: i32) -> Option<(u32, u32)> {
    if handle < 0 {
        return None;
    }
    let h = handle as u32;
    Some((h & SLOT_MASK, h >> SLOT_BITS))
}

struct Slot<T> {
    generation: u32,
    data: Option<T>,
}

/// Maps `i32` indices to owned values, reusing slots through a free list.
pub(crate) struct HandleTable<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
}

impl<T> HandleTable<T> {
    /// Create an empty table.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Insert a value and return its index, or `None` if every slot is in
    /// use or retired.
    pub fn insert(&mut self, value: T) -> Option<i32> {
        if let Some(slot_idx) = self.free_list.pop() {
            let slot = &mut self.slots[slot_idx as usize];
            slot.data = Some(value);
            return Some(encode(slot_idx, slot.generation));
        }
        if self.slots.len() >= MAX_SLOTS {
            return None;
        }
        let slot_idx = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            data: Some(value),
        });
        Some(encode(slot_idx, 0))
    }

    /// Get a mutable reference to the value behind an index.
    pub fn get_mut(&mut self, handle: i32) -> Option<&mut T> {
        let (slot_idx, generation) = decode(handle)?;
        let slot = self.slots.get_mut(slot_idx as usize)?;
        if slot.generation != generation {
            return None;
        }
        slot.data.as_mut()
    }

    /// Remove the value behind an index, returning it.
    ///
    /// A slot whose generation wraps back to zero is retired rather than
    /// recycled, so an index from the first epoch can never resolve again.
    pub fn remove(&mut self, handle: i32) -> Option<T> {
        let (slot_idx, generation) = decode(handle)?;
        let slot = self.slots.get_mut(slot_idx as usize)?;
        if slot.generation != generation {
            return None;
        }
        let value = slot.data.take()?;
        slot.generation = (slot.generation + 1) & GENERATION_MASK;
        if slot.generation != 0 {
            self.free_list.push(slot_idx);
        }
        Some(value)
    }
}
