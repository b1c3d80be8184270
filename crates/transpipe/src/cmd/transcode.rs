use std::io::Cursor;

use transpipe_channel::ChannelRegistry;

use crate::cmd::TextArgs;
use crate::exit::{channel_error, CliResult, FAILURE, SUCCESS};
use crate::output::{lossy, print_roundtrip, print_transcode, OutputFormat, RoundtripOutput, TranscodeOutput};
use crate::pump::{Pump, DEFAULT_CHUNK_SIZE};

pub fn run(args: TextArgs, registry: &ChannelRegistry, index: usize, format: OutputFormat) -> CliResult<i32> {
    let channel = registry
        .get(index)
        .map_err(|err| channel_error("lookup failed", err))?;
    let output = through(registry, index, args.text.as_bytes())?;

    print_transcode(
        &TranscodeOutput {
            channel: channel.name(),
            direction: channel.direction().as_str(),
            input: args.text,
            size: output.len(),
            output: lossy(&output),
        },
        format,
    );
    Ok(SUCCESS)
}

pub fn roundtrip(args: TextArgs, registry: &ChannelRegistry, format: OutputFormat) -> CliResult<i32> {
    let encoded = through(registry, 0, args.text.as_bytes())?;
    let decoded = through(registry, 1, &encoded)?;
    let matches = decoded == args.text.as_bytes();

    print_roundtrip(
        &RoundtripOutput {
            encoded: lossy(&encoded),
            decoded: lossy(&decoded),
            input: args.text,
            matches,
        },
        format,
    );

    if matches {
        Ok(SUCCESS)
    } else {
        tracing::warn!("roundtrip output differs from input");
        Ok(FAILURE)
    }
}

/// Push `input` through channel `index` and collect what comes out.
fn through(registry: &ChannelRegistry, index: usize, input: &[u8]) -> CliResult<Vec<u8>> {
    let channel = registry
        .get(index)
        .map_err(|err| channel_error("lookup failed", err))?;
    let pump = Pump::open(channel).map_err(|err| channel_error("open failed", err))?;

    let mut output = Vec::with_capacity(input.len());
    pump.run(Cursor::new(input.to_vec()), &mut output, DEFAULT_CHUNK_SIZE)?;
    Ok(output)
}
