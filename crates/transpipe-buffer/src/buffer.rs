use std::cmp::Ordering;

use tracing::trace;

use crate::error::{BufferError, Result};

/// Default multiplicative growth applied when an append does not fit.
pub const DEFAULT_GROWTH_FACTOR: f64 = 2.0;

/// Contiguous byte buffer with explicit capacity and a trailing zero sentinel.
///
/// Live bytes occupy `storage[head..head + len]`. Every byte of `storage`
/// outside that range is zero, so the byte after the last live byte is always
/// a sentinel. `storage.len()` is always `capacity + 1`.
#[derive(Debug, Clone)]
pub struct GrowableBuffer {
    storage: Vec<u8>,
    head: usize,
    len: usize,
    growth_factor: f64,
}

impl Default for GrowableBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl GrowableBuffer {
    /// Create an empty buffer with zero capacity and the default growth factor.
    pub fn new() -> Self {
        Self {
            storage: vec![0],
            head: 0,
            len: 0,
            growth_factor: DEFAULT_GROWTH_FACTOR,
        }
    }

    /// Create an empty buffer that grows by `growth_factor` when full.
    pub fn with_growth_factor(growth_factor: f64) -> Result<Self> {
        if !growth_factor.is_finite() || growth_factor <= 1.0 {
            return Err(BufferError::InvalidGrowthFactor(growth_factor));
        }
        Ok(Self {
            growth_factor,
            ..Self::new()
        })
    }

    /// Create a buffer holding a copy of `bytes`, with no spare capacity.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let mut buffer = Self::with_capacity(bytes.len())?;
        buffer.append(bytes)?;
        Ok(buffer)
    }

    /// Create an empty buffer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut buffer = Self::new();
        buffer.reserve_exact(capacity)?;
        Ok(buffer)
    }

    /// Number of live bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of bytes the buffer can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.storage.len() - 1
    }

    pub fn growth_factor(&self) -> f64 {
        self.growth_factor
    }

    /// The live bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.storage[self.head..self.head + self.len]
    }

    /// The live bytes followed by the zero sentinel.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.storage[self.head..=self.head + self.len]
    }

    pub fn get(&self, index: usize) -> Option<u8> {
        self.as_bytes().get(index).copied()
    }

    pub fn front(&self) -> Option<u8> {
        self.as_bytes().first().copied()
    }

    pub fn back(&self) -> Option<u8> {
        self.as_bytes().last().copied()
    }

    /// Ensure the total capacity is at least `capacity`, without geometric growth.
    pub fn reserve_exact(&mut self, capacity: usize) -> Result<()> {
        if capacity <= self.capacity() {
            return Ok(());
        }
        self.reallocate(capacity)
    }

    /// Append `bytes` to the tail, growing geometrically if they do not fit.
    ///
    /// On allocation failure the buffer is left exactly as it was.
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.make_room(bytes.len())?;

        let start = self.head + self.len;
        self.storage[start..start + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
        Ok(())
    }

    pub fn push_back(&mut self, byte: u8) -> Result<()> {
        self.append(&[byte])
    }

    pub fn push_front(&mut self, byte: u8) -> Result<()> {
        self.prepend(&[byte])
    }

    /// Insert `bytes` before the first live byte.
    ///
    /// Uses the space freed by earlier front pops when there is enough of it.
    pub fn prepend(&mut self, bytes: &[u8]) -> Result<()> {
        let n = bytes.len();
        if n == 0 {
            return Ok(());
        }

        if self.head >= n {
            self.head -= n;
        } else {
            self.make_room(n)?;
            self.compact();
            self.storage.copy_within(0..self.len, n);
        }

        let start = self.head;
        self.storage[start..start + n].copy_from_slice(bytes);
        self.len += n;
        Ok(())
    }

    /// Replace the contents with `bytes`.
    ///
    /// Grows geometrically when `bytes` exceed the capacity. On allocation
    /// failure the old contents are kept.
    pub fn assign(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > self.capacity() {
            let grown = (bytes.len() as f64 * self.growth_factor) as usize;
            self.reallocate(grown.max(bytes.len()))?;
        }
        self.clear();
        self.storage[..bytes.len()].copy_from_slice(bytes);
        self.len = bytes.len();
        Ok(())
    }

    /// Remove and return the first byte.
    pub fn pop_front(&mut self) -> Result<u8> {
        if self.len == 0 {
            return Err(BufferError::Empty);
        }
        let byte = std::mem::take(&mut self.storage[self.head]);
        self.head += 1;
        self.len -= 1;
        if self.len == 0 {
            self.head = 0;
        }
        Ok(byte)
    }

    /// Remove and return the last byte.
    pub fn pop_back(&mut self) -> Result<u8> {
        if self.len == 0 {
            return Err(BufferError::Empty);
        }
        self.len -= 1;
        let byte = std::mem::take(&mut self.storage[self.head + self.len]);
        if self.len == 0 {
            self.head = 0;
        }
        Ok(byte)
    }

    /// Remove up to `max` bytes from the front and return them in order.
    pub fn drain_front(&mut self, max: usize) -> Vec<u8> {
        let n = max.min(self.len);
        let range = self.head..self.head + n;
        let out = self.storage[range.clone()].to_vec();
        self.storage[range].fill(0);
        self.head += n;
        self.len -= n;
        if self.len == 0 {
            self.head = 0;
        }
        out
    }

    /// Copy up to `out.len() - 1` bytes into `out` and terminate them with a zero.
    ///
    /// Returns the number of bytes copied, not counting the terminator.
    pub fn to_buffer(&self, out: &mut [u8]) -> usize {
        let Some(room) = out.len().checked_sub(1) else {
            return 0;
        };
        let n = room.min(self.len);
        out[..n].copy_from_slice(&self.as_bytes()[..n]);
        out[n] = 0;
        n
    }

    /// Overwrite every live byte with `byte`.
    pub fn fill_with(&mut self, byte: u8) {
        let start = self.head;
        self.storage[start..start + self.len].fill(byte);
    }

    /// Zero the contents and reset the length. Capacity is kept.
    pub fn clear(&mut self) {
        self.storage.fill(0);
        self.head = 0;
        self.len = 0;
    }

    /// Release capacity down to the current length.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        if self.capacity() == self.len {
            return Ok(());
        }
        self.reallocate(self.len)
    }

    /// Zero and release the storage. Consuming `self` rules out any later access.
    pub fn destroy(mut self) {
        self.storage.fill(0);
        trace!(capacity = self.capacity(), "buffer destroyed");
    }

    fn make_room(&mut self, additional: usize) -> Result<()> {
        let needed = self
            .len
            .checked_add(additional)
            .ok_or(BufferError::OutOfMemory {
                requested: usize::MAX,
            })?;
        if self.head + needed <= self.capacity() {
            return Ok(());
        }
        if needed <= self.capacity() {
            self.compact();
            return Ok(());
        }

        // Float to usize casts saturate, so an absurd request still lands on
        // `reallocate`, which reports it as an allocation failure.
        let grown = (needed as f64 * self.growth_factor) as usize;
        let new_capacity = grown.max(needed);
        trace!(
            len = self.len,
            old_capacity = self.capacity(),
            new_capacity,
            "growing buffer"
        );
        self.reallocate(new_capacity)
    }

    fn compact(&mut self) {
        if self.head == 0 {
            return;
        }
        let end = self.head + self.len;
        self.storage.copy_within(self.head..end, 0);
        self.storage[self.len..end].fill(0);
        self.head = 0;
    }

    fn reallocate(&mut self, new_capacity: usize) -> Result<()> {
        debug_assert!(new_capacity >= self.len);
        let size = new_capacity
            .checked_add(1)
            .ok_or(BufferError::OutOfMemory {
                requested: new_capacity,
            })?;

        let mut storage = Vec::new();
        storage
            .try_reserve_exact(size)
            .map_err(|_| BufferError::OutOfMemory { requested: size })?;
        storage.extend_from_slice(self.as_bytes());
        storage.resize(size, 0);

        self.storage = storage;
        self.head = 0;
        Ok(())
    }
}

/// Equality and ordering look at the live bytes only.
impl PartialEq for GrowableBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for GrowableBuffer {}

impl PartialEq<[u8]> for GrowableBuffer {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialOrd for GrowableBuffer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GrowableBuffer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}
