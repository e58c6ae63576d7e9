use clap::{ArgAction, Parser, Subcommand};
use splay_cache::harness::{self, Config, Result};
use std::process;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Compare a splay tree cache with an LRU cache",
    long_about = None
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Print the report as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Range-sum queries: no cache vs LRU cache vs splay tree
    Range {
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Number of generated requests
        #[arg(long, default_value_t = 50_000)]
        queries: usize,

        /// Number of array elements
        #[arg(long, default_value_t = 100_000)]
        array_len: usize,

        /// Capacity of the LRU cache
        #[arg(long, default_value_t = 1_000)]
        capacity: usize,
    },
    /// Memoized Fibonacci: LRU cache vs splay tree
    Fibonacci {
        /// Largest index to compute
        #[arg(long, default_value_t = 950)]
        fib_max: u64,

        /// Distance between consecutive indices
        #[arg(long, default_value_t = 50)]
        fib_step: u64,

        /// Timed calls averaged per index
        #[arg(long, default_value_t = 3)]
        repetitions: u32,
    },
}

fn run(args: Args) -> Result<()> {
    harness::init_logging(args.verbose)?;
    let mut config = Config::default();

    let report = match args.command {
        Command::Range {
            seed,
            queries,
            array_len,
            capacity,
        } => {
            config.workload.seed = seed;
            config.workload.queries = queries;
            config.workload.array_len = array_len;
            config.lru_capacity = capacity;
            let report = harness::run_range_benchmark(&config)?;
            if args.json {
                serde_json::to_string_pretty(&report)?
            } else {
                report.to_string()
            }
        }
        Command::Fibonacci {
            fib_max,
            fib_step,
            repetitions,
        } => {
            config.fib_max = fib_max;
            config.fib_step = fib_step;
            config.repetitions = repetitions;
            let report = harness::run_fibonacci_benchmark(&config)?;
            if args.json {
                serde_json::to_string_pretty(&report)?
            } else {
                report.to_string()
            }
        }
    };

    println!("{}", report.trim_end());
    Ok(())
}

fn main() {
    if let Err(err) = run(Args::parse()) {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{Args, Command};
    use clap::Parser;

    #[test]
    fn test_fibonacci_flags() {
        let args = Args::try_parse_from(&[
            "splay-cache",
            "fibonacci",
            "--fib-max",
            "100",
            "--fib-step",
            "10",
            "--json",
        ])
        .unwrap();
        assert!(args.json);
        match args.command {
            Command::Fibonacci {
                fib_max,
                fib_step,
                repetitions,
            } => {
                assert_eq!((fib_max, fib_step, repetitions), (100, 10, 3));
            }
            command => panic!("unexpected command {:?}", command),
        }
    }

    #[test]
    fn test_range_flags() {
        let args =
            Args::try_parse_from(&["splay-cache", "-vv", "range", "--capacity", "64"]).unwrap();
        assert_eq!(args.verbose, 2);
        match args.command {
            Command::Range { capacity, seed, .. } => assert_eq!((capacity, seed), (64, 42)),
            command => panic!("unexpected command {:?}", command),
        }
    }

    #[test]
    fn test_old_fibonacci_flags_rejected() {
        assert!(Args::try_parse_from(&["splay-cache", "fibonacci", "--max", "100"]).is_err());
    }
}
