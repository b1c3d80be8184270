//! Growable byte buffer backing each transpipe channel.
//!
//! [`GrowableBuffer`] keeps its bytes contiguous, always followed by a zero
//! sentinel, and tracks capacity separately from length. Front eviction moves a
//! head offset and compacts lazily, so draining a FIFO is amortized O(1) per byte.
//!
//! Destruction consumes a [`GrowableBuffer`]. Where a buffer is shared with code
//! that cannot track ownership statically, wrap it in a [`BufferHandle`], which
//! reports use-after-free and double destruction as errors.

pub mod buffer;
pub mod error;
pub mod handle;

pub use buffer::{GrowableBuffer, DEFAULT_GROWTH_FACTOR};
pub use error::{BufferError, Result};
pub use handle::BufferHandle;
