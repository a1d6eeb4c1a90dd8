//! Bounded FIFO Window Implementation

use std::collections::VecDeque;

/// Fixed-capacity FIFO window, oldest sample evicted on overflow
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    /// Samples in insertion order (front = oldest)
    data: VecDeque<T>,
    /// Maximum number of samples retained
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Create a new window with given capacity.
    ///
    /// A capacity of zero is raised to one so the window can always hold
    /// the latest sample.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a sample, returning the evicted oldest sample if the window was full
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.data.len() >= self.capacity {
            self.data.pop_front()
        } else {
            None
        };
        self.data.push_back(item);
        evicted
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if window is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check if window holds `capacity` samples
    pub fn is_full(&self) -> bool {
        self.data.len() == self.capacity
    }

    /// Get the window capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl RingBuffer<f64> {
    /// Arithmetic mean of the held samples, `None` when empty
    pub fn mean(&self) -> Option<f64> {
        if self.data.is_empty() {
            return None;
        }
        Some(self.data.iter().sum::<f64>() / self.data.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_push_until_full() {
        let mut buffer = RingBuffer::new(10);
        assert!(buffer.is_empty());

        for i in 0..5 {
            assert_eq!(buffer.push(i), None);
        }

        assert_eq!(buffer.len(), 5);
        assert!(!buffer.is_full());
    }

    #[test]
    fn test_evicts_oldest() {
        let mut buffer = RingBuffer::new(3);

        assert_eq!(buffer.push(1), None);
        assert_eq!(buffer.push(2), None);
        assert_eq!(buffer.push(3), None);
        assert!(buffer.is_full());

        // Fourth sample pushes out the first
        assert_eq!(buffer.push(4), Some(1));
        assert_eq!(buffer.push(5), Some(2));
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_mean() {
        let mut buffer = RingBuffer::new(4);
        assert_eq!(buffer.mean(), None);

        for v in [0.2, 0.4, 0.6, 0.8] {
            buffer.push(v);
        }
        assert!((buffer.mean().unwrap() - 0.5).abs() < 1e-12);

        // Eviction shifts the mean
        buffer.push(1.0);
        assert!((buffer.mean().unwrap() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_zero_capacity_holds_latest() {
        let mut buffer = RingBuffer::new(0);
        assert_eq!(buffer.capacity(), 1);
        buffer.push(7);
        assert_eq!(buffer.push(8), Some(7));
        assert!(buffer.is_full());
    }

    proptest! {
        #[test]
        fn never_exceeds_capacity(capacity in 1usize..64, pushes in 0usize..256) {
            let mut buffer = RingBuffer::new(capacity);
            for i in 0..pushes {
                buffer.push(i);
                prop_assert!(buffer.len() <= capacity);
            }
            prop_assert_eq!(buffer.len(), pushes.min(capacity));
            prop_assert_eq!(buffer.is_full(), pushes >= capacity);
        }
    }
}
