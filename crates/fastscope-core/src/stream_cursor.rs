//! Stream Cursor — absolute sample position across chunks
//!
//! The acquisition loop delivers the stream in arbitrarily sized chunks.
//! The cursor advances by exactly the chunk length on every `process` call,
//! so every emitted window-end index is absolute and the caller can slice
//! its own ring buffer with them even when windows straddle chunk
//! boundaries. It is never reset implicitly; reconfiguring the trigger
//! keeps the position, and only an explicit stream restart clears it.

use crate::types::SampleIndex;

/// Monotonic absolute sample index.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamCursor {
    position: SampleIndex,
}

impl StreamCursor {
    /// Cursor at the start of a stream.
    pub fn new() -> Self {
        Self { position: 0 }
    }

    /// Absolute index of the next sample to be processed.
    pub fn position(&self) -> SampleIndex {
        self.position
    }

    /// Advance past `count` processed samples.
    #[inline]
    pub fn advance(&mut self, count: u64) {
        self.position += count;
    }

    /// Restart the stream at index zero.
    pub fn restart(&mut self) {
        self.position = 0;
    }
}
