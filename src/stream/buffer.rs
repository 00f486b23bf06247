/// Fixed-capacity FIFO of the most recent entries.
///
/// Slots are addressed by a monotonically increasing write index modulo the
/// capacity, so a push never reallocates once the buffer is full and the
/// oldest entry is always at `write % capacity`.
#[derive(Debug, Clone)]
pub struct RollingBuffer<T> {
    slots: Vec<T>,
    capacity: usize,
    written: u64,
}

impl<T> RollingBuffer<T> {
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "rolling buffer capacity must be positive");
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            written: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    /// Total pushes over the buffer's lifetime.
    pub fn total_pushed(&self) -> u64 {
        self.written
    }

    /// Insert an entry, returning the evicted oldest one when full.
    pub fn push(&mut self, value: T) -> Option<T> {
        let slot = (self.written % self.capacity as u64) as usize;
        self.written += 1;
        if self.slots.len() < self.capacity {
            self.slots.push(value);
            None
        } else {
            Some(std::mem::replace(&mut self.slots[slot], value))
        }
    }

    /// Entries oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let start = if self.is_full() {
            (self.written % self.capacity as u64) as usize
        } else {
            0
        };
        let (newer, older) = self.slots.split_at(start);
        older.iter().chain(newer.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_the_last_n_entries_oldest_first() {
        let mut buf = RollingBuffer::new(3);
        assert!(buf.is_empty());
        assert_eq!(buf.push(1), None);
        assert_eq!(buf.push(2), None);
        assert_eq!(buf.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(buf.push(3), None);
        assert_eq!(buf.push(4), Some(1));
        assert_eq!(buf.push(5), Some(2));
        assert_eq!(buf.iter().copied().collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.total_pushed(), 5);
    }

    #[test]
    fn capacity_one_holds_latest() {
        let mut buf = RollingBuffer::new(1);
        buf.push("a");
        buf.push("b");
        assert_eq!(buf.iter().collect::<Vec<_>>(), vec![&"b"]);
    }

    #[test]
    #[should_panic]
    fn zero_capacity_panics() {
        let _ = RollingBuffer::<u8>::new(0);
    }
}
