use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, info, warn};
use transpipe_buffer::{BufferHandle, GrowableBuffer};
use transpipe_cipher::{Caesar, Direction};

use crate::config::ChannelConfig;
use crate::error::{ChannelError, Result};
use crate::session::{OpenMode, Session};

/// The two exclusive roles a session can hold on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Reader,
    Writer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Reader => f.write_str("reader"),
            Role::Writer => f.write_str("writer"),
        }
    }
}

/// Point-in-time view of a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelStats {
    pub name: &'static str,
    pub direction: Direction,
    pub buffered: usize,
    pub capacity_limit: usize,
    pub buffer_capacity: usize,
    pub readers: usize,
    pub writers: usize,
    pub shut_down: bool,
}

#[derive(Debug)]
struct State {
    buffer: BufferHandle,
    readers: usize,
    writers: usize,
}

impl State {
    fn holders(&mut self, role: Role) -> &mut usize {
        match role {
            Role::Reader => &mut self.readers,
            Role::Writer => &mut self.writers,
        }
    }
}

/// A bounded, blocking byte pipe with at most one reader and one writer.
///
/// Bytes written are transformed in the channel's [`Direction`] and buffered
/// FIFO until read. A single mutex guards the buffer and role counters and is
/// never held while a caller is parked: waits go through one condition
/// variable whose predicate is rechecked after every wakeup.
#[derive(Debug)]
pub struct Channel {
    name: &'static str,
    direction: Direction,
    cipher: Caesar,
    capacity_limit: usize,
    state: Mutex<State>,
    changed: Condvar,
}

impl Channel {
    /// Create a channel with its buffer pre-reserved to the capacity limit.
    pub fn new(name: &'static str, direction: Direction, config: &ChannelConfig) -> Result<Self> {
        let cipher = config.cipher()?;
        let mut buffer = GrowableBuffer::with_growth_factor(config.growth_factor)?;
        buffer.reserve_exact(config.capacity_limit)?;

        Ok(Self {
            name,
            direction,
            cipher,
            capacity_limit: config.capacity_limit,
            state: Mutex::new(State {
                buffer: BufferHandle::new(buffer),
                readers: 0,
                writers: 0,
            }),
            changed: Condvar::new(),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn capacity_limit(&self) -> usize {
        self.capacity_limit
    }

    pub fn cipher(&self) -> &Caesar {
        &self.cipher
    }

    /// Open a session holding the roles of `mode`.
    ///
    /// Fails immediately with [`ChannelError::Busy`] if any of those roles is
    /// already held; no role is taken in that case.
    pub fn open(self: &Arc<Self>, mode: OpenMode) -> Result<Session> {
        self.acquire_roles(mode)?;
        Ok(Session::new(Arc::clone(self), mode))
    }

    /// Take a single role without a session.
    pub fn acquire(&self, role: Role) -> Result<()> {
        self.acquire_roles(OpenMode::from(role))
    }

    /// Give back a role taken with [`Channel::acquire`].
    pub fn release(&self, role: Role) -> Result<()> {
        self.release_roles(OpenMode::from(role))
    }

    pub(crate) fn acquire_roles(&self, mode: OpenMode) -> Result<()> {
        let mut state = self.state.lock();
        if state.buffer.is_destroyed() {
            return Err(ChannelError::ShutDown { channel: self.name });
        }
        for &role in mode.roles() {
            if *state.holders(role) != 0 {
                debug!(channel = self.name, %role, "role busy");
                return Err(ChannelError::Busy {
                    channel: self.name,
                    role,
                });
            }
        }
        for &role in mode.roles() {
            *state.holders(role) += 1;
        }
        debug!(channel = self.name, %mode, "opened");
        Ok(())
    }

    pub(crate) fn release_roles(&self, mode: OpenMode) -> Result<()> {
        let mut state = self.state.lock();
        for &role in mode.roles() {
            if *state.holders(role) == 0 {
                warn!(channel = self.name, %role, "release without acquire");
                return Err(ChannelError::Misuse {
                    channel: self.name,
                    role,
                });
            }
        }
        for &role in mode.roles() {
            *state.holders(role) -= 1;
        }
        debug!(channel = self.name, %mode, "closed");
        Ok(())
    }

    /// Transform and buffer as much of `data` as fits, blocking while full.
    ///
    /// Returns the number of bytes accepted, which is less than `data.len()`
    /// when only part of it fit.
    pub(crate) fn write(&self, data: &[u8], interrupt: &AtomicBool) -> Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }

        let state = self.state.lock();
        let mut state = self.wait_until(state, interrupt, "write", |state| {
            Ok(state.buffer.len()? < self.capacity_limit)
        })?;

        let buffered = state.buffer.len()?;
        let accepted = data.len().min(self.capacity_limit - buffered);
        let mut chunk = data[..accepted].to_vec();
        self.cipher.apply(self.direction, &mut chunk);
        state.buffer.append(&chunk)?;
        debug!(
            channel = self.name,
            requested = data.len(),
            accepted,
            buffered = buffered + accepted,
            "write"
        );

        drop(state);
        self.changed.notify_all();
        Ok(accepted)
    }

    /// Remove up to `max_len` bytes from the front, blocking while empty.
    ///
    /// Never waits for more than is already buffered once something is there.
    pub(crate) fn read(&self, max_len: usize, interrupt: &AtomicBool) -> Result<Bytes> {
        if max_len == 0 {
            return Ok(Bytes::new());
        }

        let state = self.state.lock();
        let mut state = self.wait_until(state, interrupt, "read", |state| {
            Ok(!state.buffer.is_empty()?)
        })?;

        let out = state.buffer.drain_front(max_len)?;
        debug!(
            channel = self.name,
            requested = max_len,
            returned = out.len(),
            "read"
        );

        drop(state);
        self.changed.notify_all();
        Ok(Bytes::from(out))
    }

    /// Discard all buffered bytes, keeping the allocation.
    pub fn clear(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.buffer.clear()?;
        drop(state);
        self.changed.notify_all();
        Ok(())
    }

    /// Release the buffer and fail every pending and future transfer.
    pub fn shutdown(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.buffer.destroy()?;
        info!(
            channel = self.name,
            readers = state.readers,
            writers = state.writers,
            "channel shut down"
        );
        drop(state);
        self.changed.notify_all();
        Ok(())
    }

    pub fn stats(&self) -> ChannelStats {
        let state = self.state.lock();
        let (buffered, buffer_capacity) = state
            .buffer
            .get("stats")
            .map(|buffer| (buffer.len(), buffer.capacity()))
            .unwrap_or((0, 0));

        ChannelStats {
            name: self.name,
            direction: self.direction,
            buffered,
            capacity_limit: self.capacity_limit,
            buffer_capacity,
            readers: state.readers,
            writers: state.writers,
            shut_down: state.buffer.is_destroyed(),
        }
    }

    /// Wake every parked caller so it rechecks its interrupt flag.
    pub(crate) fn wake_waiters(&self) {
        // Taking the lock orders this wakeup after any waiter that has already
        // checked its flag but not yet parked.
        drop(self.state.lock());
        self.changed.notify_all();
    }

    fn wait_until<'a>(
        &self,
        mut state: MutexGuard<'a, State>,
        interrupt: &AtomicBool,
        op: &'static str,
        ready: impl Fn(&State) -> Result<bool>,
    ) -> Result<MutexGuard<'a, State>> {
        loop {
            if interrupt.swap(false, Ordering::AcqRel) {
                debug!(channel = self.name, op, "interrupted");
                return Err(ChannelError::Interrupted);
            }
            if state.buffer.is_destroyed() {
                return Err(ChannelError::ShutDown { channel: self.name });
            }
            if ready(&state)? {
                return Ok(state);
            }
            debug!(channel = self.name, op, "waiting");
            self.changed.wait(&mut state);
        }
    }
}
