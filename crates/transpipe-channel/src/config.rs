use transpipe_buffer::DEFAULT_GROWTH_FACTOR;
use transpipe_cipher::{Alphabet, Caesar, DEFAULT_ALPHABET, DEFAULT_SHIFT};

use crate::error::ConfigError;

/// Default maximum number of bytes a channel buffers.
pub const DEFAULT_CAPACITY_LIMIT: usize = 40;

/// Process-wide channel settings, fixed when the registry is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelConfig {
    /// Maximum number of bytes each channel may hold. Default: 40.
    pub capacity_limit: usize,
    /// Rotation distance of the cipher. Default: 3.
    pub shift: usize,
    /// Bytes the cipher rotates through; anything else passes unchanged.
    pub alphabet: String,
    /// Growth factor of the channel buffers. Default: 2.0.
    pub growth_factor: f64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            capacity_limit: DEFAULT_CAPACITY_LIMIT,
            shift: DEFAULT_SHIFT,
            alphabet: DEFAULT_ALPHABET.to_string(),
            growth_factor: DEFAULT_GROWTH_FACTOR,
        }
    }
}

impl ChannelConfig {
    /// Reject settings that would make a channel unbounded or the cipher meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cipher().map(|_| ())
    }

    /// Validate and build the cipher shared by every channel.
    pub(crate) fn cipher(&self) -> Result<Caesar, ConfigError> {
        if self.capacity_limit == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.shift == 0 {
            return Err(ConfigError::ZeroShift);
        }
        if !self.growth_factor.is_finite() || self.growth_factor <= 1.0 {
            return Err(ConfigError::GrowthFactor(self.growth_factor));
        }
        let alphabet = Alphabet::new(&self.alphabet)?;
        Ok(Caesar::new(alphabet, self.shift))
    }
}
