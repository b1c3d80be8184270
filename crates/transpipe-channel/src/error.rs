use crate::channel::Role;

/// Errors that can occur in channel operations.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The role is already held by another session.
    #[error("channel {channel}: {role} role is busy")]
    Busy { channel: &'static str, role: Role },

    /// A blocking operation was aborted by an interrupt. Nothing was changed.
    #[error("operation interrupted")]
    Interrupted,

    /// A role was released without having been acquired.
    #[error("channel {channel}: {role} role released without being acquired")]
    Misuse { channel: &'static str, role: Role },

    /// The session was not opened with the role the operation needs.
    #[error("channel {channel}: session was not opened with the {role} role")]
    NotPermitted { channel: &'static str, role: Role },

    /// The channel was shut down and its buffer released.
    #[error("channel {channel} has been shut down")]
    ShutDown { channel: &'static str },

    /// No channel matches the given index or name.
    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    /// Buffer-level error.
    #[error("buffer error: {0}")]
    Buffer(#[from] transpipe_buffer::BufferError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by [`ChannelConfig::validate`](crate::ChannelConfig::validate).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The buffer capacity limit must be positive.
    #[error("capacity limit must be greater than zero")]
    ZeroCapacity,

    /// The shift distance must be positive.
    #[error("shift must be greater than zero")]
    ZeroShift,

    /// The alphabet is unusable.
    #[error("invalid alphabet: {0}")]
    Alphabet(#[from] transpipe_cipher::CipherError),

    /// The growth factor must be finite and greater than 1.
    #[error("invalid growth factor {0} (must be > 1)")]
    GrowthFactor(f64),
}

pub type Result<T> = std::result::Result<T, ChannelError>;
