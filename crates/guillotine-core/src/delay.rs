//! Integer-sample delay lines.
//!
//! # Types
//!
//! - [`SampleDelay`] - Fixed-capacity ring delay with a runtime delay length,
//!   used for latency-matched bypass and linear-phase compensation
//! - [`HistoryBuffer`] - Sample history exposed as one contiguous slice,
//!   newest first, used as the FIR convolution window
//!
//! Both allocate once at construction and never reallocate.

use alloc::vec;
use alloc::vec::Vec;

use crate::Effect;

/// Ring-buffer delay of a whole number of samples.
///
/// # Example
///
/// ```rust
/// use guillotine_core::{Effect, SampleDelay};
///
/// let mut delay = SampleDelay::new(8);
/// delay.set_delay(2);
///
/// let out: Vec<f32> = [1.0, 2.0, 3.0, 4.0].iter().map(|&x| delay.process(x)).collect();
/// assert_eq!(out, [0.0, 0.0, 1.0, 2.0]);
/// ```
#[derive(Debug, Clone)]
pub struct SampleDelay {
    buffer: Vec<f32>,
    write_pos: usize,
    delay: usize,
}

impl SampleDelay {
    /// Create a delay line able to hold up to `max_delay` samples.
    pub fn new(max_delay: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay + 1],
            write_pos: 0,
            delay: 0,
        }
    }

    /// Set the delay length, clamped to the capacity given at construction.
    pub fn set_delay(&mut self, delay: usize) {
        self.delay = delay.min(self.capacity());
    }

    /// Current delay length in samples.
    pub fn delay(&self) -> usize {
        self.delay
    }

    /// Maximum delay length in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len() - 1
    }

    /// Zero the buffer.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

impl Effect for SampleDelay {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let len = self.buffer.len();
        self.buffer[self.write_pos] = input;
        let read_pos = (self.write_pos + len - self.delay) % len;
        self.write_pos = (self.write_pos + 1) % len;
        self.buffer[read_pos]
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {
        self.clear();
    }

    fn latency_samples(&self) -> usize {
        self.delay
    }
}

/// Fixed-length sample history readable as a contiguous window.
///
/// Every sample is written twice (at `pos` and `pos + len`) so
/// `window()[k]` is the sample pushed `k` pushes ago without wrap-around
/// logic in the convolution loop.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    buffer: Vec<f32>,
    pos: usize,
    len: usize,
}

impl HistoryBuffer {
    /// History of `len` samples, zero-initialized.
    pub fn new(len: usize) -> Self {
        let len = len.max(1);
        Self {
            buffer: vec![0.0; 2 * len],
            pos: 0,
            len,
        }
    }

    /// Push a sample, discarding the oldest.
    #[inline]
    pub fn push(&mut self, sample: f32) {
        self.pos = (self.pos + self.len - 1) % self.len;
        self.buffer[self.pos] = sample;
        self.buffer[self.pos + self.len] = sample;
    }

    /// The last `len` samples, newest first.
    #[inline]
    pub fn window(&self) -> &[f32] {
        &self.buffer[self.pos..self.pos + self.len]
    }

    /// Sample pushed `age` pushes ago (`0` = newest).
    #[inline]
    pub fn get(&self, age: usize) -> f32 {
        self.buffer[self.pos + age]
    }

    /// Number of samples held.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; a history holds at least one sample.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Zero the history.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }
}
