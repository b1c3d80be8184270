use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use transpipe_channel::{
    Channel, ChannelConfig, ChannelError, ChannelRegistry, OpenMode, Role,
};
use transpipe_cipher::{Caesar, Direction};

fn channel(capacity_limit: usize, direction: Direction) -> Arc<Channel> {
    let config = ChannelConfig {
        capacity_limit,
        ..ChannelConfig::default()
    };
    Arc::new(Channel::new("blocking", direction, &config).expect("channel should build"))
}

fn settle() {
    thread::sleep(Duration::from_millis(50));
}

#[test]
fn blocked_writer_resumes_with_partial_write_after_read() {
    let channel = channel(5, Direction::Encode);
    let writer = channel.open(OpenMode::Write).expect("writer should open");
    let reader = channel.open(OpenMode::Read).expect("reader should open");

    assert_eq!(writer.write(b"abcde").expect("first write should fit"), 5);

    let (done_tx, done_rx) = mpsc::channel();
    let pending = thread::spawn(move || {
        let accepted = writer.write(b"fgh");
        done_tx.send(()).expect("main thread should be listening");
        accepted
    });

    settle();
    assert!(
        done_rx.try_recv().is_err(),
        "writer should block while the buffer is full"
    );

    assert_eq!(reader.read(2).expect("read should succeed").as_ref(), b"de");

    let accepted = pending
        .join()
        .expect("writer thread should finish")
        .expect("blocked write should succeed");
    assert_eq!(accepted, 2);
    assert_eq!(channel.stats().buffered, 5);
    assert_eq!(
        reader.read(10).expect("read should succeed").as_ref(),
        b"fghij"
    );
}

#[test]
fn blocked_reader_wakes_on_write() {
    let channel = channel(8, Direction::Decode);
    let reader = channel.open(OpenMode::Read).expect("reader should open");
    let writer = channel.open(OpenMode::Write).expect("writer should open");

    let pending = thread::spawn(move || reader.read(8));

    settle();
    assert_eq!(writer.write(b"d").expect("write should succeed"), 1);

    let out = pending
        .join()
        .expect("reader thread should finish")
        .expect("blocked read should succeed");
    assert_eq!(out.as_ref(), b"a");
}

#[test]
fn interrupt_aborts_blocked_reader_without_side_effects() {
    let channel = channel(8, Direction::Encode);
    let reader = channel.open(OpenMode::Read).expect("reader should open");
    let interrupter = reader.interrupter();

    let pending = thread::spawn(move || {
        let first = reader.read(4);
        (reader, first)
    });

    settle();
    interrupter.interrupt();

    let (reader, first) = pending.join().expect("reader thread should finish");
    assert!(matches!(first, Err(ChannelError::Interrupted)));

    // The interrupt is consumed; the session is still usable.
    let writer = channel.open(OpenMode::Write).expect("writer should open");
    writer.write(b"abc").expect("write should succeed");
    assert_eq!(reader.read(4).expect("retry should succeed").as_ref(), b"def");
}

#[test]
fn interrupt_aborts_blocked_writer_and_leaves_buffer_untouched() {
    let channel = channel(3, Direction::Encode);
    let writer = channel.open(OpenMode::Write).expect("writer should open");
    writer.write(b"abc").expect("write should succeed");
    let interrupter = writer.interrupter();

    let pending = thread::spawn(move || writer.write(b"xyz"));

    settle();
    interrupter.interrupt();

    let result = pending.join().expect("writer thread should finish");
    assert!(matches!(result, Err(ChannelError::Interrupted)));

    let stats = channel.stats();
    assert_eq!(stats.buffered, 3);
    // The writer session was dropped with the thread.
    assert_eq!(stats.writers, 0);

    let reader = channel.open(OpenMode::Read).expect("reader should open");
    assert_eq!(reader.read(10).expect("read should succeed").as_ref(), b"def");
}

#[test]
fn shutdown_wakes_blocked_reader() {
    let registry = Arc::new(ChannelRegistry::new(ChannelConfig::default()).unwrap());
    let reader = registry.open(0, OpenMode::Read).expect("reader should open");

    let pending = thread::spawn(move || reader.read(4));

    settle();
    registry.shutdown().expect("shutdown should succeed");

    let result = pending.join().expect("reader thread should finish");
    assert!(matches!(result, Err(ChannelError::ShutDown { .. })));
}

#[test]
fn only_one_writer_wins_a_concurrent_open() {
    let channel = channel(8, Direction::Encode);

    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let channel = Arc::clone(&channel);
            thread::spawn(move || channel.open(OpenMode::Write))
        })
        .collect();

    let results: Vec<_> = attempts
        .into_iter()
        .map(|handle| handle.join().expect("open thread should finish"))
        .collect();

    let opened = results.iter().filter(|r| r.is_ok()).count();
    let busy = results
        .iter()
        .filter(|r| {
            matches!(
                r,
                Err(ChannelError::Busy {
                    role: Role::Writer,
                    ..
                })
            )
        })
        .count();
    // Winning sessions stay alive inside `results`, so exactly one can exist.
    assert_eq!(opened, 1);
    assert_eq!(busy, 7);
    drop(results);
    assert_eq!(channel.stats().writers, 0);
}

#[test]
fn fifo_order_holds_across_chunked_reads_under_backpressure() {
    let channel = channel(7, Direction::Encode);
    let writer = channel.open(OpenMode::Write).expect("writer should open");
    let reader = channel.open(OpenMode::Read).expect("reader should open");

    let input: Vec<u8> = b"The quick brown fox jumps over the lazy dog"
        .iter()
        .copied()
        .cycle()
        .take(500)
        .collect();
    let expected = Caesar::default().encode(&input);

    let source = input.clone();
    let producer = thread::spawn(move || {
        let mut offset = 0;
        while offset < source.len() {
            let accepted = writer.write(&source[offset..]).expect("write should succeed");
            assert!(accepted > 0);
            assert!(accepted <= 7);
            offset += accepted;
        }
    });

    let mut output = Vec::new();
    let mut chunk = 1;
    while output.len() < expected.len() {
        let bytes = reader.read(chunk).expect("read should succeed");
        assert!(bytes.len() <= chunk);
        output.extend_from_slice(&bytes);
        chunk = chunk % 5 + 1;
    }

    producer.join().expect("producer should finish");
    assert_eq!(output, expected);
}

#[test]
fn encode_then_decode_round_trips() {
    let registry = ChannelRegistry::new(ChannelConfig::default()).unwrap();
    let encode = registry.open(0, OpenMode::ReadWrite).expect("encode should open");
    let decode = registry.open(1, OpenMode::ReadWrite).expect("decode should open");

    let plaintext = b"Hello, World! 42 ~ zZ";
    assert_eq!(encode.write(plaintext).unwrap(), plaintext.len());
    let ciphertext = encode.read(64).unwrap();
    assert_ne!(ciphertext.as_ref(), plaintext);

    assert_eq!(decode.write(&ciphertext).unwrap(), ciphertext.len());
    let recovered = decode.read(64).unwrap();
    assert_eq!(recovered.as_ref(), plaintext);
}
