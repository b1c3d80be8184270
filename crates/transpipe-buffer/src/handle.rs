use tracing::warn;

use crate::buffer::GrowableBuffer;
use crate::error::{BufferError, Result};

/// Runtime-checked owner of a [`GrowableBuffer`].
///
/// Used where a buffer is reachable from code that outlives it, e.g. a channel
/// that sessions keep referencing after shutdown. Every operation on a
/// destroyed handle fails with [`BufferError::UseAfterFree`] without touching
/// storage, and destroying twice fails with [`BufferError::DoubleFree`].
#[derive(Debug)]
pub struct BufferHandle {
    inner: Option<GrowableBuffer>,
}

impl BufferHandle {
    pub fn new(buffer: GrowableBuffer) -> Self {
        Self {
            inner: Some(buffer),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.is_none()
    }

    /// Borrow the live buffer.
    pub fn get(&self, op: &'static str) -> Result<&GrowableBuffer> {
        self.inner.as_ref().ok_or(BufferError::UseAfterFree { op })
    }

    /// Mutably borrow the live buffer.
    pub fn get_mut(&mut self, op: &'static str) -> Result<&mut GrowableBuffer> {
        self.inner.as_mut().ok_or(BufferError::UseAfterFree { op })
    }

    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.get_mut("append")?.append(bytes)
    }

    pub fn pop_front(&mut self) -> Result<u8> {
        self.get_mut("pop_front")?.pop_front()
    }

    pub fn drain_front(&mut self, max: usize) -> Result<Vec<u8>> {
        Ok(self.get_mut("drain_front")?.drain_front(max))
    }

    pub fn to_buffer(&self, out: &mut [u8]) -> Result<usize> {
        Ok(self.get("to_buffer")?.to_buffer(out))
    }

    pub fn clear(&mut self) -> Result<()> {
        self.get_mut("clear")?.clear();
        Ok(())
    }

    pub fn shrink_to_fit(&mut self) -> Result<()> {
        self.get_mut("shrink_to_fit")?.shrink_to_fit()
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.get("is_empty")?.is_empty())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.get("len")?.len())
    }

    pub fn capacity(&self) -> Result<usize> {
        Ok(self.get("capacity")?.capacity())
    }

    /// Release the buffer. A second call is reported, not repeated.
    pub fn destroy(&mut self) -> Result<()> {
        match self.inner.take() {
            Some(buffer) => {
                buffer.destroy();
                Ok(())
            }
            None => {
                warn!("attempted to destroy an already destroyed buffer");
                Err(BufferError::DoubleFree)
            }
        }
    }
}

impl From<GrowableBuffer> for BufferHandle {
    fn from(buffer: GrowableBuffer) -> Self {
        Self::new(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_handle() -> BufferHandle {
        let mut buffer = GrowableBuffer::new();
        buffer.append(b"abc").unwrap();
        BufferHandle::new(buffer)
    }

    #[test]
    fn forwards_to_live_buffer() {
        let mut handle = live_handle();
        assert!(!handle.is_destroyed());
        assert_eq!(handle.len().unwrap(), 3);
        assert_eq!(handle.pop_front().unwrap(), b'a');
        handle.append(b"d").unwrap();
        assert_eq!(handle.drain_front(10).unwrap(), b"bcd");
        assert!(handle.is_empty().unwrap());
    }

    #[test]
    fn operations_after_destroy_fail() {
        let mut handle = live_handle();
        handle.destroy().unwrap();
        assert!(handle.is_destroyed());

        assert!(matches!(
            handle.append(b"x"),
            Err(BufferError::UseAfterFree { op: "append" })
        ));
        assert!(matches!(
            handle.pop_front(),
            Err(BufferError::UseAfterFree { op: "pop_front" })
        ));
        assert!(matches!(
            handle.len(),
            Err(BufferError::UseAfterFree { .. })
        ));
        assert!(matches!(
            handle.capacity(),
            Err(BufferError::UseAfterFree { .. })
        ));
        assert!(matches!(
            handle.clear(),
            Err(BufferError::UseAfterFree { .. })
        ));
        assert!(matches!(
            handle.shrink_to_fit(),
            Err(BufferError::UseAfterFree { .. })
        ));
        let mut out = [0u8; 4];
        assert!(matches!(
            handle.to_buffer(&mut out),
            Err(BufferError::UseAfterFree { op: "to_buffer" })
        ));
        assert_eq!(out, [0u8; 4]);
    }

    #[test]
    fn double_destroy_is_detected() {
        let mut handle = live_handle();
        handle.destroy().unwrap();
        assert!(matches!(handle.destroy(), Err(BufferError::DoubleFree)));
    }
}
