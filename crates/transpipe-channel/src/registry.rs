use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};
use transpipe_cipher::Direction;

use crate::channel::Channel;
use crate::config::ChannelConfig;
use crate::error::{ChannelError, Result};
use crate::session::{OpenMode, Session};

/// Index 0 encodes, index 1 decodes.
pub const CHANNELS: [(&str, Direction); 2] = [
    ("trans0", Direction::Encode),
    ("trans1", Direction::Decode),
];

/// The fixed set of channels, built once and passed to whoever serves them.
#[derive(Debug)]
pub struct ChannelRegistry {
    channels: Vec<Arc<Channel>>,
    config: ChannelConfig,
    shut_down: AtomicBool,
}

impl ChannelRegistry {
    /// Validate `config` and allocate every channel.
    pub fn new(config: ChannelConfig) -> Result<Self> {
        config.validate()?;

        let channels = CHANNELS
            .iter()
            .map(|&(name, direction)| Channel::new(name, direction, &config).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        info!(
            channels = channels.len(),
            capacity_limit = config.capacity_limit,
            shift = config.shift,
            "channel registry ready"
        );

        Ok(Self {
            channels,
            config,
            shut_down: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn channels(&self) -> &[Arc<Channel>] {
        &self.channels
    }

    pub fn get(&self, index: usize) -> Result<&Arc<Channel>> {
        self.channels
            .get(index)
            .ok_or_else(|| ChannelError::UnknownChannel(index.to_string()))
    }

    pub fn by_name(&self, name: &str) -> Result<&Arc<Channel>> {
        self.channels
            .iter()
            .find(|channel| channel.name() == name)
            .ok_or_else(|| ChannelError::UnknownChannel(name.to_string()))
    }

    /// Look a channel up by index (`"0"`) or name (`"trans0"`).
    pub fn resolve(&self, id: &str) -> Result<&Arc<Channel>> {
        match id.parse::<usize>() {
            Ok(index) => self.get(index),
            Err(_) => self.by_name(id),
        }
    }

    pub fn open(&self, index: usize, mode: OpenMode) -> Result<Session> {
        self.get(index)?.open(mode)
    }

    /// Release every channel buffer and wake anything blocked on them.
    ///
    /// Later calls are no-ops. Sessions still open fail with
    /// [`ChannelError::ShutDown`] but can be closed normally.
    pub fn shutdown(&self) -> Result<()> {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let mut first_error = None;
        for channel in &self.channels {
            if let Err(err) = channel.shutdown() {
                warn!(channel = channel.name(), error = %err, "channel shutdown failed");
                first_error.get_or_insert(err);
            }
        }
        info!("channel registry shut down");

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn builds_encode_and_decode_channels() {
        let registry = ChannelRegistry::new(ChannelConfig::default()).unwrap();
        assert_eq!(registry.channels().len(), 2);
        assert_eq!(registry.get(0).unwrap().direction(), Direction::Encode);
        assert_eq!(registry.get(1).unwrap().direction(), Direction::Decode);
        assert_eq!(registry.get(0).unwrap().capacity_limit(), 40);
        assert_eq!(registry.get(1).unwrap().stats().buffer_capacity, 40);
        assert_eq!(registry.config(), &ChannelConfig::default());
    }

    #[test]
    fn rejects_invalid_config() {
        let err = ChannelRegistry::new(ChannelConfig {
            capacity_limit: 0,
            ..ChannelConfig::default()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ChannelError::Config(ConfigError::ZeroCapacity)
        ));
    }

    #[test]
    fn resolves_by_index_and_name() {
        let registry = ChannelRegistry::new(ChannelConfig::default()).unwrap();
        assert_eq!(registry.resolve("0").unwrap().name(), "trans0");
        assert_eq!(registry.resolve("trans1").unwrap().name(), "trans1");
        assert!(matches!(
            registry.resolve("2"),
            Err(ChannelError::UnknownChannel(_))
        ));
        assert!(matches!(
            registry.resolve("trans9"),
            Err(ChannelError::UnknownChannel(_))
        ));
    }

    #[test]
    fn channels_are_independent() {
        let registry = ChannelRegistry::new(ChannelConfig::default()).unwrap();
        let encode = registry.open(0, OpenMode::ReadWrite).unwrap();
        let decode = registry.open(1, OpenMode::ReadWrite).unwrap();

        encode.write(b"abc").unwrap();
        assert_eq!(registry.get(1).unwrap().stats().buffered, 0);
        decode.write(b"def").unwrap();
        assert_eq!(encode.read(10).unwrap().as_ref(), b"def");
        assert_eq!(decode.read(10).unwrap().as_ref(), b"abc");
    }

    #[test]
    fn shutdown_is_idempotent() {
        let registry = ChannelRegistry::new(ChannelConfig::default()).unwrap();
        registry.shutdown().unwrap();
        registry.shutdown().unwrap();
        assert!(registry.channels().iter().all(|c| c.stats().shut_down));
    }
}
