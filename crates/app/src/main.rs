//! serialpipe: send Huffman-compressed frames over a simulated serial link.
//!
//! The foreground thread compresses messages and queues frames on the
//! outbound ring, busy-waiting when it is full. A second thread stands in
//! for the UART interrupt, moving one byte each way per call through a
//! loopback wire. A third thread drains the inbound ring and decodes frames.

mod config;
mod input_gen;

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use config::Config;
use serialpipe_core::{
    framing::FrameDecoder,
    link::{Loopback, SerialPort},
    Channel, Codec, Result,
};
use tracing::{debug, error, info};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("run with --help for usage");
            return ExitCode::from(2);
        }
    };

    if config.print_config {
        config.print();
    }

    match run(&config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            eprintln!("received data does not match what was sent");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %e, "transfer failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run one transfer. Returns whether the received bytes matched.
fn run(config: &Config) -> Result<bool> {
    let codec = Codec::default();
    let messages = match &config.text {
        Some(text) => vec![text.as_bytes().to_vec()],
        None => input_gen::generate_messages(
            codec.table(),
            config.seed,
            config.message_count,
            config.min_len,
            config.max_len,
        ),
    };
    let expected: Vec<u8> = messages.concat();
    info!(messages = messages.len(), bytes = expected.len(), "starting transfer");

    let port: Arc<SerialPort> = Arc::new(SerialPort::new(codec));
    let stop = Arc::new(AtomicBool::new(false));

    let isr = {
        let port = Arc::clone(&port);
        let stop = Arc::clone(&stop);
        let depth = config.wire_depth;
        thread::spawn(move || {
            let mut wire = Loopback::with_depth(depth);
            while !stop.load(Ordering::Acquire) {
                // Hold the line while the receiver has no room
                if port.channels().get(Channel::Inbound).available() == 0 {
                    thread::yield_now();
                    continue;
                }
                if !port.service_interrupt(&mut wire) {
                    thread::yield_now();
                }
            }
        })
    };

    let receiver = {
        let port = Arc::clone(&port);
        let total = expected.len();
        thread::spawn(move || -> Result<Vec<u8>> {
            let mut decoder = FrameDecoder::new(*port.codec());
            let mut received = Vec::with_capacity(total);
            while received.len() < total {
                let message = port.recv_message(&mut decoder)?;
                debug!(len = message.len(), "frame received");
                received.extend(message);
            }
            Ok(received)
        })
    };

    // Validate every message before the first frame goes out, so a bad
    // symbol never leaves the receiver waiting.
    for message in &messages {
        codec.encoded_bits(message)?;
    }
    for message in &messages {
        port.send(message)?;
    }

    let received = receiver.join().unwrap_or_else(|_| Ok(Vec::new()))?;
    stop.store(true, Ordering::Release);
    let _ = isr.join();

    let stats = port.stats();
    info!(
        frames_sent = stats.frames_sent,
        frames_received = stats.frames_received,
        dropped = port.dropped_bytes(),
        "transfer complete"
    );

    if config.print_metrics {
        stats.print_summary();
    }

    Ok(received == expected)
}
