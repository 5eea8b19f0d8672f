//! Ring buffer for streamed process output.
//!
//! Output arrives in arbitrary chunks, so a multi-byte character may be split
//! across reads. [`RingBuffer::searchable`] exposes the longest valid UTF-8
//! prefix and leaves an incomplete trailing sequence for the next append.

use std::collections::VecDeque;
use std::fmt;

/// Default buffer capacity (1 MB).
pub const DEFAULT_CAPACITY: usize = 1024 * 1024;

/// A ring buffer for accumulating process output.
///
/// When the maximum size is reached the oldest data is discarded.
#[derive(Clone)]
pub struct RingBuffer {
    data: VecDeque<u8>,
    max_size: usize,
    total_written: usize,
    bytes_discarded: usize,
}

impl RingBuffer {
    /// Create a new ring buffer with the specified maximum size.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            data: VecDeque::with_capacity(max_size.min(DEFAULT_CAPACITY)),
            max_size,
            total_written: 0,
            bytes_discarded: 0,
        }
    }

    /// Append data to the buffer.
    ///
    /// If the buffer would exceed its maximum size, oldest data is discarded.
    pub fn append(&mut self, data: &[u8]) {
        self.total_written += data.len();

        if data.len() >= self.max_size {
            self.bytes_discarded += self.data.len() + data.len() - self.max_size;
            self.data.clear();
            self.data.extend(&data[data.len() - self.max_size..]);
            return;
        }

        let needed_space = (self.data.len() + data.len()).saturating_sub(self.max_size);
        if needed_space > 0 {
            self.bytes_discarded += needed_space;
            self.data.drain(..needed_space);
        }

        self.data.extend(data);
    }

    /// Get the current buffer contents as a contiguous slice.
    #[must_use]
    pub fn as_slice(&mut self) -> &[u8] {
        self.data.make_contiguous()
    }

    /// Get the current buffer contents as a string (lossy UTF-8 conversion).
    #[must_use]
    pub fn as_str_lossy(&mut self) -> String {
        String::from_utf8_lossy(self.as_slice()).into_owned()
    }

    /// The longest prefix of the buffer that is valid UTF-8.
    ///
    /// Invalid sequences are replaced with U+FFFD first; only an incomplete
    /// sequence at the very end is held back.
    pub fn searchable(&mut self) -> &str {
        let invalid = matches!(
            std::str::from_utf8(self.data.make_contiguous()),
            Err(err) if err.error_len().is_some()
        );
        if invalid {
            self.repair();
        }

        let bytes = self.data.make_contiguous();
        let valid = match std::str::from_utf8(bytes) {
            Ok(_) => bytes.len(),
            Err(err) => err.valid_up_to(),
        };
        std::str::from_utf8(&bytes[..valid]).unwrap_or_default()
    }

    fn repair(&mut self) {
        let bytes = self.data.make_contiguous();
        let tail_start = match std::str::from_utf8(bytes) {
            Ok(_) => return,
            Err(_) => trailing_incomplete_start(bytes),
        };
        let mut repaired = String::from_utf8_lossy(&bytes[..tail_start])
            .into_owned()
            .into_bytes();
        repaired.extend_from_slice(&bytes[tail_start..]);
        self.data = repaired.into();
    }

    /// Get the current length of the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the maximum size of the buffer.
    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    /// Get the total bytes written to the buffer.
    #[must_use]
    pub const fn total_written(&self) -> usize {
        self.total_written
    }

    /// Get the number of bytes that have been discarded due to overflow.
    #[must_use]
    pub const fn bytes_discarded(&self) -> usize {
        self.bytes_discarded
    }

    /// Consume data up to (but not including) `end`.
    pub fn consume(&mut self, end: usize) -> Vec<u8> {
        let end = end.min(self.data.len());
        self.data.drain(..end).collect()
    }

    /// Consume data up to `pos` and return it as a string (lossy conversion).
    pub fn consume_str(&mut self, pos: usize) -> String {
        let data = self.consume(pos);
        String::from_utf8_lossy(&data).into_owned()
    }
}

/// Start of a trailing incomplete UTF-8 sequence (at most 3 bytes), or `bytes.len()`.
fn trailing_incomplete_start(bytes: &[u8]) -> usize {
    let floor = bytes.len().saturating_sub(3);
    for start in (floor..bytes.len()).rev() {
        let b = bytes[start];
        if b & 0xC0 != 0x80 {
            let width = match b {
                0xC0..=0xDF => 2,
                0xE0..=0xEF => 3,
                0xF0..=0xF7 => 4,
                _ => return bytes.len(),
            };
            return if bytes.len() - start < width {
                start
            } else {
                bytes.len()
            };
        }
    }
    bytes.len()
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("len", &self.len())
            .field("max_size", &self.max_size)
            .field("total_written", &self.total_written)
            .field("bytes_discarded", &self.bytes_discarded)
            .finish()
    }
}
