#![doc = include_str!("../README.md")]
mod canonical;

use std::{hint::black_box, time::Instant};

use clap::{Parser, Subcommand};

use rand::prelude::*;
use rand::distributions::WeightedIndex;
use rand_pcg::Pcg64Mcg;
use tracing_subscriber::EnvFilter;

#[derive(Subcommand)]
pub enum Measure {
    /// Construction of the encoder and encoding the text
    #[clap(visible_alias = "enc")]
    Encode,
    /// Reconstruction of the decoder from the codebook and decoding the text
    #[clap(visible_alias = "dec")]
    Decode,
    /// Measures everything
    All
}

#[derive(Parser)]
#[command(author, version, about, long_about = None, infer_subcommands=true)]
/// Canonical Huffman codec benchmark.
pub struct Conf {
    /// What to measure
    #[command(subcommand)]
    pub measure: Measure,

    /// Length of the test text
    #[arg(short = 'l', long, default_value_t = 1024*1024)]
    pub len: usize,

    /// Number of different symbols in the test text.
    #[arg(long, default_value_t = 256, value_parser = clap::value_parser!(u32).range(1..=1<<20))]
    pub symbols: u32,

    /// The spread of the number of symbols (0 for all about equal).
    /// Each successive symbol occurs 1+SPREAD/1000 times more often than the previous one.
    #[arg(short = 'r', long, default_value_t = 100)]
    pub spread: u32,

    /// Time (in seconds) of measuring and warming up the CPU cache before measuring
    #[arg(short='t', long, default_value_t = 5)]
    pub time: u16,

    /// Whether to check the validity
    #[arg(long, default_value_t = false)]
    pub verify: bool,

    /// Seed for random number generators
    #[arg(short='s', long, default_value_t = 1234)]
    pub seed: u64,
}

impl Conf {
    /// Returns pseudo-random text for testing. Each symbol occurs at least once if the text is long enough.
    fn text(&self) -> Box<[u32]> {
        if self.len <= self.symbols as usize { return (0..self.len as u32).collect(); }
        let spread = 1.0 + self.spread as f64*0.001;
        let weights: Vec<_> = (1..=self.symbols as i32).map(|v| spread.powi(v)).collect();
        // weights are finite and positive, so the distribution is always valid
        let dist = WeightedIndex::new(weights).expect("invalid symbol weights");
        let rng = Pcg64Mcg::seed_from_u64(self.seed);

        (0..self.symbols).chain(
            dist.sample_iter(rng).map(|v| v as u32).take(self.len - self.symbols as usize)
        ).collect()
    }

    #[inline(always)] fn measure<R, F>(&self, mut f: F) -> f64
     where F: FnMut() -> R
    {
        let mut iters = 1;
        if self.time > 0 {
            let time = Instant::now();
            loop {
                black_box(f());
                if time.elapsed().as_secs() > self.time as u64 { break; }
                iters += 1;
            }
        }
        let start_moment = Instant::now();
        for _ in 0..iters { black_box(f()); }
        return start_moment.elapsed().as_secs_f64() / iters as f64
    }

    fn print_speed(&self, label: &str, sec: f64) {
        let mb = self.len as f64 / (1024 * 1024) as f64;
        println!("{}: {:.0} mb/sec", label, mb / sec);
    }

    fn print_time(&self, label: &str, sec: f64) {
        println!("{} [ns]: {:.0}", label, sec * 1_000_000_000.0);
    }
}

fn compare_texts(original: &[u32], decoded: &[u32]) {
    if let Some(i) = original.iter().zip(decoded).position(|(e, g)| e != g) {
        println!("FAIL: symbol #{} decoded as {} instead of {}", i, decoded[i], original[i]);
    } else if original.len() != decoded.len() {
        println!("FAIL: decoded {} symbols, expected {}", decoded.len(), original.len());
    } else {
        println!("DONE");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let conf: Conf = Conf::parse();
    if let Err(e) = canonical::benchmark(&conf) {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}
