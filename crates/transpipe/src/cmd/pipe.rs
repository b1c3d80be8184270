use std::io;

use tracing::info;
use transpipe_channel::ChannelRegistry;

use crate::cmd::PipeArgs;
use crate::exit::{channel_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::pump::Pump;

pub fn run(args: PipeArgs, registry: &ChannelRegistry) -> CliResult<i32> {
    let channel = registry
        .resolve(&args.channel)
        .map_err(|err| channel_error("lookup failed", err))?;
    let pump = Pump::open(channel).map_err(|err| channel_error("open failed", err))?;

    let canceller = pump.canceller();
    ctrlc::set_handler(move || canceller.cancel())
        .map_err(|err| CliError::new(INTERNAL, format!("failed to install signal handler: {err}")))?;

    info!(
        channel = channel.name(),
        direction = channel.direction().as_str(),
        chunk_size = args.chunk_size,
        "piping stdin"
    );

    let mut stdout = io::stdout().lock();
    pump.run(io::stdin(), &mut stdout, args.chunk_size)?;
    Ok(SUCCESS)
}
