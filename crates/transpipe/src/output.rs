use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use transpipe_channel::ChannelStats;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Raw
        }
    }
}

#[derive(Serialize)]
pub struct TranscodeOutput<'a> {
    pub channel: &'a str,
    pub direction: &'a str,
    pub input: String,
    pub output: String,
    pub size: usize,
}

#[derive(Serialize)]
pub struct RoundtripOutput {
    pub input: String,
    pub encoded: String,
    pub decoded: String,
    pub matches: bool,
}

#[derive(Serialize)]
struct ChannelOutput<'a> {
    index: usize,
    name: &'a str,
    direction: &'a str,
    buffered: usize,
    capacity_limit: usize,
    buffer_capacity: usize,
    readers: usize,
    writers: usize,
}

pub fn print_transcode(out: &TranscodeOutput<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHANNEL", "DIRECTION", "SIZE", "INPUT", "OUTPUT"])
                .add_row(vec![
                    out.channel.to_string(),
                    out.direction.to_string(),
                    out.size.to_string(),
                    out.input.clone(),
                    out.output.clone(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "channel={} direction={} size={} output={}",
                out.channel, out.direction, out.size, out.output
            );
        }
        OutputFormat::Raw => print_raw(out.output.as_bytes()),
    }
}

pub fn print_roundtrip(out: &RoundtripOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["INPUT", "ENCODED", "DECODED", "MATCH"])
                .add_row(vec![
                    out.input.clone(),
                    out.encoded.clone(),
                    out.decoded.clone(),
                    out.matches.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("Roundtrip:");
            println!("  Input:   {}", out.input);
            println!("  Encoded: {}", out.encoded);
            println!("  Decoded: {}", out.decoded);
            println!("  Match:   {}", out.matches);
        }
        OutputFormat::Raw => print_raw(out.decoded.as_bytes()),
    }
}

pub fn print_channels(stats: &[ChannelStats], format: OutputFormat) {
    let rows: Vec<ChannelOutput<'_>> = stats
        .iter()
        .enumerate()
        .map(|(index, s)| ChannelOutput {
            index,
            name: s.name,
            direction: s.direction.as_str(),
            buffered: s.buffered,
            capacity_limit: s.capacity_limit,
            buffer_capacity: s.buffer_capacity,
            readers: s.readers,
            writers: s.writers,
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["INDEX", "NAME", "DIRECTION", "BUFFERED", "LIMIT"]);
            for row in &rows {
                table.add_row(vec![
                    row.index.to_string(),
                    row.name.to_string(),
                    row.direction.to_string(),
                    row.buffered.to_string(),
                    row.capacity_limit.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in &rows {
                println!(
                    "{} {} direction={} limit={}",
                    row.index, row.name, row.direction, row.capacity_limit
                );
            }
        }
        OutputFormat::Raw => {
            for row in &rows {
                println!("{}", row.name);
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

/// Render channel bytes for display, replacing invalid UTF-8.
pub fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
