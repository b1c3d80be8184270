use std::io::{ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use transpipe_channel::{Channel, ChannelError, Interrupter, OpenMode, Session};

use crate::exit::{channel_error, io_error, CliError, CliResult, INTERNAL, INTERRUPTED};

pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Streams an input through one channel: a feeder thread holds the writer
/// role, the calling thread holds the reader role.
pub struct Pump {
    writer: Session,
    reader: Session,
    cancelled: Arc<AtomicBool>,
}

/// Stops a running [`Pump`] from another thread (e.g. a Ctrl-C handler).
#[derive(Clone)]
pub struct PumpCanceller {
    cancelled: Arc<AtomicBool>,
    interrupters: [Interrupter; 2],
}

impl PumpCanceller {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        for interrupter in &self.interrupters {
            interrupter.interrupt();
        }
    }
}

#[derive(Default)]
struct Progress {
    written: AtomicUsize,
    done: AtomicBool,
}

impl Pump {
    pub fn open(channel: &Arc<Channel>) -> Result<Self, ChannelError> {
        let writer = channel.open(OpenMode::Write)?;
        let reader = channel.open(OpenMode::Read)?;
        Ok(Self {
            writer,
            reader,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn canceller(&self) -> PumpCanceller {
        PumpCanceller {
            cancelled: Arc::clone(&self.cancelled),
            interrupters: [self.writer.interrupter(), self.reader.interrupter()],
        }
    }

    /// Copy `input` through the channel into `output`. Returns bytes delivered.
    ///
    /// On cancel the feeder stops at its next chunk boundary and gives back the
    /// writer role. A feeder still parked in `input.read` (an idle stdin) cannot
    /// be woken, so it is joined only if it has already stopped; otherwise it is
    /// detached and exits after its pending read returns.
    pub fn run<R, W>(self, input: R, output: &mut W, chunk_size: usize) -> CliResult<usize>
    where
        R: Read + Send + 'static,
        W: Write,
    {
        let Pump {
            writer,
            reader,
            cancelled,
        } = self;
        let channel = reader.channel().name();
        let progress = Arc::new(Progress::default());
        let wake_reader = reader.interrupter();

        let feeder = {
            let progress = Arc::clone(&progress);
            let cancelled = Arc::clone(&cancelled);
            thread::Builder::new()
                .name(format!("{channel}-feeder"))
                .spawn(move || {
                    let fed = feed(&writer, input, chunk_size, &progress.written, &cancelled);
                    progress.done.store(true, Ordering::Release);
                    wake_reader.interrupt();
                    fed.and_then(|()| {
                        writer
                            .close()
                            .map_err(|err| channel_error("close writer failed", err))
                    })
                })
                .map_err(|err| io_error("failed to start feeder thread", err))?
        };

        let mut delivered = 0usize;
        loop {
            if cancelled.load(Ordering::Acquire) {
                drop(reader);
                if feeder.is_finished() {
                    let _ = feeder.join();
                } else {
                    tracing::debug!(channel, "feeder blocked on input, detaching");
                }
                return Err(CliError::new(INTERRUPTED, "interrupted"));
            }
            if progress.done.load(Ordering::Acquire)
                && delivered == progress.written.load(Ordering::Acquire)
            {
                break;
            }
            match reader.read(chunk_size) {
                Ok(bytes) => {
                    output
                        .write_all(&bytes)
                        .map_err(|err| io_error("write output failed", err))?;
                    delivered += bytes.len();
                }
                Err(ChannelError::Interrupted) => continue,
                Err(err) => return Err(channel_error("read failed", err)),
            }
        }

        output
            .flush()
            .map_err(|err| io_error("flush output failed", err))?;
        reader
            .close()
            .map_err(|err| channel_error("close reader failed", err))?;

        match feeder.join() {
            Ok(result) => result?,
            Err(_) => return Err(CliError::new(INTERNAL, "feeder thread panicked")),
        }

        tracing::info!(channel, delivered, "pump finished");
        Ok(delivered)
    }
}

fn feed<R: Read>(
    writer: &Session,
    mut input: R,
    chunk_size: usize,
    written: &AtomicUsize,
    cancelled: &AtomicBool,
) -> CliResult<()> {
    let mut chunk = vec![0u8; chunk_size];
    loop {
        if cancelled.load(Ordering::Acquire) {
            return Err(CliError::new(INTERRUPTED, "interrupted"));
        }
        let n = match input.read(&mut chunk) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(io_error("read input failed", err)),
        };

        let mut offset = 0;
        while offset < n {
            let accepted = writer
                .write(&chunk[offset..n])
                .map_err(|err| channel_error("write failed", err))?;
            if accepted < n - offset {
                tracing::debug!(
                    channel = writer.channel().name(),
                    accepted,
                    pending = n - offset - accepted,
                    "short write, resubmitting"
                );
            }
            offset += accepted;
            written.fetch_add(accepted, Ordering::Release);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use transpipe_channel::{ChannelConfig, ChannelRegistry};

    use super::*;

    fn registry(capacity_limit: usize) -> ChannelRegistry {
        ChannelRegistry::new(ChannelConfig {
            capacity_limit,
            ..ChannelConfig::default()
        })
        .expect("registry should build")
    }

    #[test]
    fn pumps_input_larger_than_capacity() {
        let registry = registry(4);
        let channel = registry.get(0).unwrap();
        let input = b"Hello World".repeat(20);

        let mut out = Vec::new();
        let pump = Pump::open(channel).unwrap();
        let delivered = pump.run(Cursor::new(input.clone()), &mut out, 3).unwrap();

        assert_eq!(delivered, input.len());
        assert_eq!(out, b"KhoorcZruog".repeat(20));
        assert_eq!(channel.stats().readers, 0);
        assert_eq!(channel.stats().writers, 0);
    }

    #[test]
    fn empty_input_finishes() {
        let registry = registry(4);
        let mut out = Vec::new();
        let pump = Pump::open(registry.get(1).unwrap()).unwrap();
        assert_eq!(pump.run(Cursor::new(Vec::new()), &mut out, 8).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn second_pump_on_same_channel_is_busy() {
        let registry = registry(4);
        let channel = registry.get(0).unwrap();
        let _first = Pump::open(channel).unwrap();
        assert!(matches!(
            Pump::open(channel),
            Err(ChannelError::Busy { .. })
        ));
    }

    #[test]
    fn cancel_stops_a_blocked_pump_and_frees_both_roles() {
        let registry = registry(4);
        let channel = Arc::clone(registry.get(0).unwrap());
        let pump = Pump::open(&channel).unwrap();
        let canceller = pump.canceller();

        // An input that never yields data keeps the pump waiting.
        struct Stalled;
        impl Read for Stalled {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                std::thread::sleep(std::time::Duration::from_millis(20));
                Err(std::io::Error::from(ErrorKind::Interrupted))
            }
        }

        let runner = thread::spawn(move || {
            let mut out = Vec::new();
            pump.run(Stalled, &mut out, 4)
        });
        thread::sleep(std::time::Duration::from_millis(50));
        canceller.cancel();

        let err = runner.join().unwrap().unwrap_err();
        assert_eq!(err.code, INTERRUPTED);
        assert_eq!(channel.stats().readers, 0);

        // The feeder notices the cancel on its next chunk and drops the writer.
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
        while channel.stats().writers != 0 {
            assert!(
                std::time::Instant::now() < deadline,
                "feeder kept the writer role after cancel"
            );
            thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(Pump::open(&channel).is_ok());
    }
}
