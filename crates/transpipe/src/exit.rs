use std::fmt;
use std::io;

use transpipe_channel::ChannelError;

// Exit codes follow sysexits.h where one fits; interrupted uses the shell's 128 + SIGINT.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const BUSY: i32 = 16;
pub const USAGE: i32 = 64;
pub const CONFIG: i32 = 78;
pub const INTERNAL: i32 = 125;
pub const INTERRUPTED: i32 = 130;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::Interrupted => INTERRUPTED,
        io::ErrorKind::BrokenPipe => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn channel_error(context: &str, err: ChannelError) -> CliError {
    let code = match &err {
        ChannelError::Busy { .. } => BUSY,
        ChannelError::Interrupted => INTERRUPTED,
        ChannelError::UnknownChannel(_) => USAGE,
        ChannelError::Config(_) => CONFIG,
        ChannelError::ShutDown { .. } => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use transpipe_channel::{ConfigError, Role};

    #[test]
    fn busy_maps_to_busy_code() {
        let err = channel_error(
            "open failed",
            ChannelError::Busy {
                channel: "trans0",
                role: Role::Writer,
            },
        );
        assert_eq!(err.code, BUSY);
        assert_eq!(err.message, "open failed: channel trans0: writer role is busy");
    }

    #[test]
    fn config_and_interrupt_codes() {
        let err = channel_error("startup", ChannelError::Config(ConfigError::ZeroShift));
        assert_eq!(err.code, CONFIG);
        assert_eq!(
            channel_error("read", ChannelError::Interrupted).code,
            INTERRUPTED
        );
    }
}
