use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Overrides the `--log-level` directives when set, using `EnvFilter` syntax.
pub const LOG_ENV: &str = "TRANSPIPE_LOG";

/// Crates whose events follow `--log-level`; everything else stays at warn.
const CRATES: [&str; 4] = [
    "transpipe",
    "transpipe_channel",
    "transpipe_buffer",
    "transpipe_cipher",
];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn default_directives(level: LogLevel) -> String {
    let mut directives = String::from("warn");
    for krate in CRATES {
        directives.push(',');
        directives.push_str(krate);
        directives.push('=');
        directives.push_str(level.as_str());
    }
    directives
}

/// Install the stderr subscriber. Channel events carry a `channel` field and
/// blocking calls run on named threads, so targets are left off.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_thread_names(true);

    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
