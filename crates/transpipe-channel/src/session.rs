use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tracing::warn;

use crate::channel::{Channel, Role};
use crate::error::{ChannelError, Result};

/// Roles requested when opening a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenMode {
    Read,
    Write,
    ReadWrite,
}

impl OpenMode {
    pub fn roles(self) -> &'static [Role] {
        match self {
            OpenMode::Read => &[Role::Reader],
            OpenMode::Write => &[Role::Writer],
            OpenMode::ReadWrite => &[Role::Writer, Role::Reader],
        }
    }

    pub fn can_read(self) -> bool {
        matches!(self, OpenMode::Read | OpenMode::ReadWrite)
    }

    pub fn can_write(self) -> bool {
        matches!(self, OpenMode::Write | OpenMode::ReadWrite)
    }
}

impl From<Role> for OpenMode {
    fn from(role: Role) -> Self {
        match role {
            Role::Reader => OpenMode::Read,
            Role::Writer => OpenMode::Write,
        }
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenMode::Read => f.write_str("read"),
            OpenMode::Write => f.write_str("write"),
            OpenMode::ReadWrite => f.write_str("read-write"),
        }
    }
}

/// An open channel holding one or both roles.
///
/// Roles are given back exactly once, by [`Session::close`] or on drop.
#[derive(Debug)]
pub struct Session {
    channel: Arc<Channel>,
    mode: OpenMode,
    interrupt: Arc<AtomicBool>,
    open: bool,
}

impl Session {
    pub(crate) fn new(channel: Arc<Channel>, mode: OpenMode) -> Self {
        Self {
            channel,
            mode,
            interrupt: Arc::new(AtomicBool::new(false)),
            open: true,
        }
    }

    pub fn channel(&self) -> &Arc<Channel> {
        &self.channel
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Write as much of `data` as currently fits, blocking while the channel is full.
    ///
    /// A return value smaller than `data.len()` is a short write; resubmit the rest.
    pub fn write(&self, data: &[u8]) -> Result<usize> {
        if !self.mode.can_write() {
            return Err(self.not_permitted(Role::Writer));
        }
        self.channel.write(data, &self.interrupt)
    }

    /// Read up to `max_len` bytes, blocking while the channel is empty.
    pub fn read(&self, max_len: usize) -> Result<Bytes> {
        if !self.mode.can_read() {
            return Err(self.not_permitted(Role::Reader));
        }
        self.channel.read(max_len, &self.interrupt)
    }

    /// A handle that aborts this session's current or next blocking call.
    pub fn interrupter(&self) -> Interrupter {
        Interrupter {
            channel: Arc::clone(&self.channel),
            flag: Arc::clone(&self.interrupt),
        }
    }

    /// Give the roles back.
    pub fn close(mut self) -> Result<()> {
        self.open = false;
        self.channel.release_roles(self.mode)
    }

    fn not_permitted(&self, role: Role) -> ChannelError {
        ChannelError::NotPermitted {
            channel: self.channel.name(),
            role,
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        if let Err(err) = self.channel.release_roles(self.mode) {
            warn!(channel = self.channel.name(), error = %err, "failed to release session roles");
        }
    }
}

/// Aborts a session's blocking wait from another thread.
///
/// The interrupted call returns [`ChannelError::Interrupted`] without changing
/// the channel. An interrupt raised while no call is waiting is held and
/// consumed by the session's next call.
#[derive(Debug, Clone)]
pub struct Interrupter {
    channel: Arc<Channel>,
    flag: Arc<AtomicBool>,
}

impl Interrupter {
    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::Release);
        self.channel.wake_waiters();
    }
}
