//! Rolling Sample Window
//!
//! Provides a bounded FIFO window that keeps the most recent samples of a
//! per-frame signal. Once full, every push evicts the oldest sample.

mod buffer;

pub use buffer::RingBuffer;
