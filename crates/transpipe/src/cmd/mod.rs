use clap::{Args, Subcommand};
use transpipe_channel::ChannelRegistry;

use crate::exit::CliResult;
use crate::output::OutputFormat;
use crate::pump::DEFAULT_CHUNK_SIZE;

pub mod channels;
pub mod pipe;
pub mod transcode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode text through channel 0.
    Encode(TextArgs),
    /// Decode text through channel 1.
    Decode(TextArgs),
    /// Encode text through channel 0, then decode the result through channel 1.
    Roundtrip(TextArgs),
    /// Stream stdin through a channel to stdout.
    Pipe(PipeArgs),
    /// List channels and their current state.
    Channels(ChannelsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, registry: &ChannelRegistry, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => transcode::run(args, registry, 0, format),
        Command::Decode(args) => transcode::run(args, registry, 1, format),
        Command::Roundtrip(args) => transcode::roundtrip(args, registry, format),
        Command::Pipe(args) => pipe::run(args, registry),
        Command::Channels(args) => channels::run(args, registry, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct TextArgs {
    /// Text to transform.
    pub text: String,
}

#[derive(Args, Debug)]
pub struct PipeArgs {
    /// Channel index or name (0, 1, trans0, trans1).
    #[arg(long, short = 'c', default_value = "0")]
    pub channel: String,
    /// Bytes moved per read and write call.
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, value_parser = parse_positive)]
    pub chunk_size: usize,
}

#[derive(Args, Debug, Default)]
pub struct ChannelsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a strictly positive integer.
pub fn parse_positive(input: &str) -> Result<usize, String> {
    let value: usize = input
        .trim()
        .parse()
        .map_err(|_| format!("invalid positive integer: {input}"))?;
    if value == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(value)
}
