mod cmd;
mod exit;
mod logging;
mod output;
mod pump;

use clap::Parser;
use transpipe_channel::{ChannelConfig, ChannelRegistry, DEFAULT_CAPACITY_LIMIT};
use transpipe_cipher::DEFAULT_SHIFT;

use crate::cmd::{parse_positive, Command};
use crate::exit::{channel_error, CliResult};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "transpipe",
    version,
    about = "Bounded blocking channels that encode or decode in flight"
)]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Maximum bytes a channel holds before writers block.
    #[arg(
        long,
        value_name = "BYTES",
        env = "TRANSPIPE_CAPACITY",
        default_value_t = DEFAULT_CAPACITY_LIMIT,
        value_parser = parse_positive,
        global = true
    )]
    capacity: usize,

    /// Alphabet shift applied by both channels.
    #[arg(
        long,
        value_name = "N",
        env = "TRANSPIPE_SHIFT",
        default_value_t = DEFAULT_SHIFT,
        value_parser = parse_positive,
        global = true
    )]
    shift: usize,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            capacity_limit: self.capacity,
            shift: self.shift,
            ..ChannelConfig::default()
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);

    match run(cli, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

fn run(cli: Cli, format: OutputFormat) -> CliResult<i32> {
    let registry = ChannelRegistry::new(cli.channel_config())
        .map_err(|err| channel_error("invalid channel configuration", err))?;

    let result = cmd::run(cli.command, &registry, format);

    if let Err(err) = registry.shutdown() {
        tracing::warn!(error = %err, "registry shutdown failed");
    }
    result
}
