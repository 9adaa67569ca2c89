//! Bounded per-channel history for moving-average filtering

/// Fixed-capacity ring buffer of recent channel values
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelHistory {
    slots: Box<[f32]>,
    /// Index of the oldest entry
    head: usize,
    len: usize,
}

impl ChannelHistory {
    /// Create an empty history. A zero capacity is raised to 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![0.0; capacity.max(1)].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    /// Create a history holding a single resting value
    pub fn seeded(capacity: usize, value: f32) -> Self {
        let mut history = Self::new(capacity);
        history.push(value);
        history
    }

    /// Append a value, evicting the oldest one when full
    pub fn push(&mut self, value: f32) {
        let capacity = self.capacity();
        if self.len < capacity {
            let tail = (self.head + self.len) % capacity;
            self.slots[tail] = value;
            self.len += 1;
        } else {
            self.slots[self.head] = value;
            self.head = (self.head + 1) % capacity;
        }
    }

    /// Arithmetic mean of the stored values (0 when empty)
    pub fn mean(&self) -> f32 {
        if self.len == 0 {
            return 0.0;
        }
        // f64 accumulation keeps the mean of identical values exact
        let sum: f64 = self.iter().map(f64::from).sum();
        (sum / self.len as f64) as f32
    }

    /// Values from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        let capacity = self.capacity();
        (0..self.len).map(move |i| self.slots[(self.head + i) % capacity])
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }
}
