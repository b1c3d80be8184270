//! Exclusive, bounded, blocking byte channels that encode or decode in flight.
//!
//! # Crate Structure
//!
//! - [`buffer`]: growable byte buffer with front eviction and checked destruction
//! - [`cipher`]: the reversible alphabet shift applied on the write path
//! - [`channel`]: channels, sessions, interruption and the channel registry

/// Re-export buffer types.
pub mod buffer {
    pub use transpipe_buffer::*;
}

/// Re-export cipher types.
pub mod cipher {
    pub use transpipe_cipher::*;
}

/// Re-export channel types.
pub mod channel {
    pub use transpipe_channel::*;
}
