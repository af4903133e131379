//! Lock-free parameter hand-off between a control thread and the audio thread.
//!
//! Values are stored as atomic `u32` (f32 bit-cast), one per flat parameter
//! index. A sequence counter around every write lets the audio thread read a
//! consistent [`ClipperParams`] snapshot without locking: an odd counter means
//! a write is in flight, and a counter that changed during the read means the
//! snapshot may be torn and is retried.

use std::array;
use std::hint;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering, fence};

use crate::params::{ClipperParams, PARAM_COUNT};

struct SharedParamsData {
    /// Even when idle, odd while a writer is storing.
    sequence: AtomicU32,
    /// Current parameter values as f32 bit-cast to u32.
    values: [AtomicU32; PARAM_COUNT],
}

/// Cross-thread parameter store.
///
/// Cheap to clone; clones share the same storage.
///
/// ```rust
/// use guillotine_engine::{ClipperParams, SharedParams};
///
/// let shared = SharedParams::new(ClipperParams::default());
/// let control = shared.clone();
///
/// control.store(&ClipperParams { ceiling_db: -3.0, ..ClipperParams::default() });
/// assert_eq!(shared.snapshot().ceiling_db, -3.0);
/// ```
#[derive(Clone)]
pub struct SharedParams {
    inner: Arc<SharedParamsData>,
}

impl SharedParams {
    /// Store initialized from `params` (clamped).
    pub fn new(params: ClipperParams) -> Self {
        let params = params.clamped();
        let values = array::from_fn(|i| AtomicU32::new(params.get(i).unwrap_or(0.0).to_bits()));
        Self {
            inner: Arc::new(SharedParamsData {
                sequence: AtomicU32::new(0),
                values,
            }),
        }
    }

    /// Publish a full parameter set. Values are clamped first.
    pub fn store(&self, params: &ClipperParams) {
        let params = params.clamped();
        self.write(|values| {
            for (i, atomic) in values.iter().enumerate() {
                if let Some(v) = params.get(i) {
                    atomic.store(v.to_bits(), Ordering::Relaxed);
                }
            }
        });
    }

    /// Publish one parameter by flat index, clamped to its descriptor.
    ///
    /// Returns `false` for an unknown index.
    pub fn set_value(&self, index: usize, value: f32) -> bool {
        let mut scratch = ClipperParams::default();
        if !scratch.set(index, value) {
            return false;
        }
        let Some(clamped) = scratch.get(index) else {
            return false;
        };
        self.write(|values| values[index].store(clamped.to_bits(), Ordering::Relaxed));
        true
    }

    /// Read one parameter by flat index.
    pub fn get_value(&self, index: usize) -> Option<f32> {
        self.inner
            .values
            .get(index)
            .map(|v| f32::from_bits(v.load(Ordering::Acquire)))
    }

    /// Number of completed writes so far.
    ///
    /// The audio thread can compare this against the last value it saw to
    /// skip rebuilding an unchanged snapshot.
    pub fn version(&self) -> u32 {
        self.inner.sequence.load(Ordering::Acquire) / 2
    }

    /// Consistent snapshot of every parameter.
    ///
    /// Never blocks; spins only while a writer is mid-store.
    pub fn snapshot(&self) -> ClipperParams {
        let data = &*self.inner;
        loop {
            let before = data.sequence.load(Ordering::Acquire);
            if before & 1 == 1 {
                hint::spin_loop();
                continue;
            }
            let raw: [u32; PARAM_COUNT] =
                array::from_fn(|i| data.values[i].load(Ordering::Relaxed));
            fence(Ordering::Acquire);
            if data.sequence.load(Ordering::Relaxed) == before {
                let mut params = ClipperParams::default();
                for (i, bits) in raw.iter().enumerate() {
                    params.set(i, f32::from_bits(*bits));
                }
                return params;
            }
            hint::spin_loop();
        }
    }

    /// Snapshot only if something was written since `last_version`.
    ///
    /// Updates `last_version` when a snapshot is returned.
    pub fn snapshot_if_changed(&self, last_version: &mut u32) -> Option<ClipperParams> {
        let version = self.version();
        if version == *last_version {
            return None;
        }
        let params = self.snapshot();
        *last_version = version;
        Some(params)
    }

    fn write(&self, f: impl FnOnce(&[AtomicU32; PARAM_COUNT])) {
        let data = &*self.inner;
        // Claim the sequence: even -> odd. Concurrent writers wait their turn.
        let mut seq = data.sequence.load(Ordering::Relaxed);
        loop {
            if seq & 1 == 1 {
                hint::spin_loop();
                seq = data.sequence.load(Ordering::Relaxed);
                continue;
            }
            match data.sequence.compare_exchange_weak(
                seq,
                seq.wrapping_add(1),
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(current) => seq = current,
            }
        }
        fence(Ordering::Release);
        f(&data.values);
        data.sequence.store(seq.wrapping_add(2), Ordering::Release);
    }
}

impl std::fmt::Debug for SharedParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedParams")
            .field("version", &self.version())
            .field("params", &self.snapshot())
            .finish()
    }
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new(ClipperParams::default())
    }
}
