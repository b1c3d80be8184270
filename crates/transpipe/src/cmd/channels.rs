use transpipe_channel::{ChannelRegistry, ChannelStats};

use crate::cmd::ChannelsArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_channels, OutputFormat};

pub fn run(_args: ChannelsArgs, registry: &ChannelRegistry, format: OutputFormat) -> CliResult<i32> {
    let stats: Vec<ChannelStats> = registry.channels().iter().map(|c| c.stats()).collect();
    print_channels(&stats, format);
    Ok(SUCCESS)
}
