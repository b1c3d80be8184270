/// Errors that can occur in buffer operations.
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    /// A byte was requested from an empty buffer.
    #[error("buffer is empty")]
    Empty,

    /// An operation was attempted after the buffer was destroyed.
    #[error("{op} called on a destroyed buffer")]
    UseAfterFree { op: &'static str },

    /// The buffer was destroyed a second time.
    #[error("buffer already destroyed")]
    DoubleFree,

    /// Growing the storage failed. The buffer is left unchanged.
    #[error("failed to allocate {requested} bytes of buffer storage")]
    OutOfMemory { requested: usize },

    /// The growth factor must be finite and greater than 1.
    #[error("invalid growth factor {0} (must be > 1)")]
    InvalidGrowthFactor(f64),
}

pub type Result<T> = std::result::Result<T, BufferError>;
