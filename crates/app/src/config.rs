//! Configuration for the serialpipe demo.
//!
//! Handles parsing command-line arguments and generating sensible defaults
//! (including randomized defaults that are reproducible with a seed).
//!
//! # Philosophy
//!
//! The tool should work with ZERO arguments, using intelligent defaults.
//! All defaults are printed so runs are reproducible.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serialpipe_core::{Error, Result};

/// Complete configuration for a demo run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Seed for every random choice in the run
    pub seed: u64,

    // === Input ===
    /// Fixed message to send (None = generate messages)
    pub text: Option<String>,

    /// Number of generated messages
    pub message_count: usize,

    /// Shortest generated message in bytes
    pub min_len: usize,

    /// Longest generated message in bytes
    pub max_len: usize,

    // === Link ===
    /// Bytes the loopback wire holds before the transmitter stalls
    pub wire_depth: usize,

    // === Behavior ===
    /// Whether to print detailed config
    pub print_config: bool,

    /// Whether to print the transfer summary
    pub print_metrics: bool,
}

impl Config {
    /// Parse configuration from command-line arguments.
    ///
    /// If no arguments provided, generates randomized defaults using a time-based seed.
    /// If --seed is provided, uses that seed for all randomness (fully deterministic).
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut seed: Option<u64> = None;
        let mut text: Option<String> = None;
        let mut message_count: Option<usize> = None;
        let mut min_len: Option<usize> = None;
        let mut max_len: Option<usize> = None;
        let mut wire_depth: Option<usize> = None;
        let mut print_config = false;
        let mut print_metrics = true;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--seed" => {
                    seed = Some(parse_value(args, &mut i, "--seed")?);
                }
                "--text" => {
                    i += 1;
                    let value = args
                        .get(i)
                        .ok_or_else(|| Error::Config("--text requires a string".to_string()))?;
                    text = Some(value.clone());
                }
                "--messages" => {
                    message_count = Some(parse_value(args, &mut i, "--messages")?);
                }
                "--min-len" => {
                    min_len = Some(parse_value(args, &mut i, "--min-len")?);
                }
                "--max-len" => {
                    max_len = Some(parse_value(args, &mut i, "--max-len")?);
                }
                "--wire-depth" => {
                    wire_depth = Some(parse_value(args, &mut i, "--wire-depth")?);
                }
                "--print-config" => {
                    print_config = true;
                }
                "--no-metrics" => {
                    print_metrics = false;
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                other => {
                    return Err(Error::Config(format!("unknown argument: {}", other)));
                }
            }
            i += 1;
        }

        // Determine seed (explicit or time-based)
        let seed = seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or_default()
        });

        // Generate defaults using seed
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let min_len = min_len.unwrap_or(1);
        let max_len = max_len.unwrap_or_else(|| rng.gen_range(64..=640));
        if min_len > max_len {
            return Err(Error::Config(format!(
                "--min-len ({}) exceeds --max-len ({})",
                min_len, max_len
            )));
        }

        let wire_depth = wire_depth.unwrap_or_else(|| rng.gen_range(1..=16));
        if wire_depth == 0 {
            return Err(Error::Config("--wire-depth must be at least 1".to_string()));
        }

        Ok(Config {
            seed,
            text,
            message_count: message_count.unwrap_or_else(|| rng.gen_range(8..=32)),
            min_len,
            max_len,
            wire_depth,
            print_config,
            print_metrics,
        })
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        println!("Seed: {}", self.seed);
        match &self.text {
            Some(text) => println!("Text: {:?}", text),
            None => {
                println!("Messages: {} (generated)", self.message_count);
                println!("Length: {}-{} bytes", self.min_len, self.max_len);
            }
        }
        println!("Wire depth: {} bytes", self.wire_depth);
        println!();
    }
}

/// Advance past a flag and parse the value that follows it.
fn parse_value<T: std::str::FromStr>(args: &[String], i: &mut usize, flag: &str) -> Result<T> {
    *i += 1;
    let raw = args
        .get(*i)
        .ok_or_else(|| Error::Config(format!("{} requires a number", flag)))?;
    raw.parse()
        .map_err(|_| Error::Config(format!("invalid value for {}: {}", flag, raw)))
}

fn print_help() {
    println!("serialpipe: Huffman-compressed frames over a simulated serial link");
    println!();
    println!("USAGE:");
    println!("    serialpipe [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --seed <N>              Random seed for determinism");
    println!("    --text <STRING>         Send this message instead of generated ones");
    println!();
    println!("    --messages <N>          Generated message count (default: random 8-32)");
    println!("    --min-len <N>           Shortest generated message (default: 1)");
    println!("    --max-len <N>           Longest generated message (default: random 64-640)");
    println!("    --wire-depth <N>        Bytes in flight on the wire (default: random 1-16)");
    println!();
    println!("    --print-config          Print resolved configuration");
    println!("    --no-metrics            Don't print transfer summary");
    println!("    --help, -h              Print this help");
    println!();
    println!("LOGGING:");
    println!("    RUST_LOG=serialpipe_core=debug serialpipe    # Per-frame events");
    println!();
    println!("EXAMPLES:");
    println!("    serialpipe                                   # Run with random defaults");
    println!("    serialpipe --seed 42                         # Deterministic run");
    println!("    serialpipe --text \"hello there\"              # Send one message");
    println!();
}
