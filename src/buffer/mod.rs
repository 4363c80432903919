//! Thread-local buffer pool for decompression scratch space.
//!
//! Gzipped tiles are inflated into a pooled buffer so repeated ingestion does
//! not reallocate per tile. This module is an implementation detail.

use std::cell::RefCell;

/// Initial capacity for pooled buffers.
const DEFAULT_BUFFER_CAPACITY: usize = 256 * 1024; // 256 KiB

/// Buffers that grew beyond this are dropped instead of pooled.
const MAX_RETAINED_CAPACITY: usize = 4 * 1024 * 1024; // 4 MiB

/// Maximum number of buffers to keep per thread.
const MAX_POOL_SIZE: usize = 4;

thread_local! {
    static THREAD_BUFFER_POOL: RefCell<Vec<Vec<u8>>> = const { RefCell::new(Vec::new()) };
}

/// A reusable scratch buffer, returned to the pool on drop.
pub(crate) struct ScratchBuffer {
    data: Vec<u8>,
}

impl ScratchBuffer {
    /// Takes a buffer from the thread-local pool or creates a new one.
    pub(crate) fn take() -> Self {
        THREAD_BUFFER_POOL.with(|pool| {
            let mut pool = pool.borrow_mut();
            if let Some(data) = pool.pop() {
                Self { data }
            } else {
                Self {
                    data: Vec::with_capacity(DEFAULT_BUFFER_CAPACITY),
                }
            }
        })
    }

    /// The buffer contents.
    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access for filling the buffer.
    pub(crate) fn vec_mut(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }
}

impl Drop for ScratchBuffer {
    fn drop(&mut self) {
        if self.data.capacity() <= MAX_RETAINED_CAPACITY {
            self.data.clear();
            THREAD_BUFFER_POOL.with(|pool| {
                let mut pool = pool.borrow_mut();
                if pool.len() < MAX_POOL_SIZE {
                    pool.push(std::mem::take(&mut self.data));
                }
            });
        }
    }
}
