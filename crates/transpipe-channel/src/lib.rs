//! Exclusive, bounded, blocking byte channels.
//!
//! Each [`Channel`] accepts at most one reader and one writer at a time.
//! Writes transform their bytes with the channel's cipher direction and block
//! while the buffer is at its capacity limit; reads block while it is empty.
//! Either side returns short rather than waiting for a full request.
//!
//! The [`ChannelRegistry`] owns the fixed channel set:
//! - `trans0` (index 0) encodes what is written to it
//! - `trans1` (index 1) decodes what is written to it
//!
//! The boundary exposed to I/O wrappers is [`ChannelRegistry::open`] plus the
//! [`Session`] it returns: `write`, `read` and `close`.

pub mod channel;
pub mod config;
pub mod error;
pub mod registry;
pub mod session;

pub use channel::{Channel, ChannelStats, Role};
pub use config::{ChannelConfig, DEFAULT_CAPACITY_LIMIT};
pub use error::{ChannelError, ConfigError, Result};
pub use registry::{ChannelRegistry, CHANNELS};
pub use session::{Interrupter, OpenMode, Session};
