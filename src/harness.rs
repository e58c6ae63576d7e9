//! Timed comparisons of the splay tree against the LRU cache and against no cache at all.

use crate::lru::{self, CacheStats, LruCache};
use crate::splay_tree::{self, SplayTree};
use crate::workload::{self, WorkloadConfig};
use log::{LevelFilter, SetLoggerError};
use num_bigint::BigUint;
use rand::rngs::StdRng;
use rand::SeedableRng;
use simplelog::{ColorChoice, SimpleLogger, TermLogger, TerminalMode};
use std::error;
use std::fmt;
use std::num::NonZeroUsize;
use std::result;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub enum Error {
    InvalidConfig(String),
    Mismatch(String),
    LoggerError(SetLoggerError),
    SerdeError(serde_json::Error),
}

impl From<SetLoggerError> for Error {
    fn from(err: SetLoggerError) -> Error {
        Error::LoggerError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::SerdeError(err)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::InvalidConfig(_) | Error::Mismatch(_) => None,
            Error::LoggerError(error) => Some(error),
            Error::SerdeError(error) => Some(error),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidConfig(message) => write!(f, "invalid configuration: {}", message),
            Error::Mismatch(message) => write!(f, "results disagree: {}", message),
            Error::LoggerError(error) => write!(f, "{}", error),
            Error::SerdeError(error) => write!(f, "{}", error),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Installs a terminal logger on stderr, falling back to a plain logger when no terminal is
/// available. `verbosity` 0 logs warnings, 1 info, 2 debug, and anything higher trace.
pub fn init_logging(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let config = simplelog::Config::default();
    if TermLogger::init(level, config.clone(), TerminalMode::Stderr, ColorChoice::Auto).is_err() {
        SimpleLogger::init(level, config)?;
    }
    Ok(())
}

/// Settings for both benchmarks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub workload: WorkloadConfig,
    /// Capacity of the LRU cache in the range-sum benchmark.
    pub lru_capacity: usize,
    /// Largest Fibonacci index in the sweep.
    pub fib_max: u64,
    pub fib_step: u64,
    /// Number of timed calls averaged per Fibonacci index.
    pub repetitions: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            workload: WorkloadConfig::default(),
            lru_capacity: 1_000,
            fib_max: 950,
            fib_step: 50,
            repetitions: 3,
        }
    }
}

impl Config {
    fn lru_capacity(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.lru_capacity)
            .ok_or_else(|| Error::InvalidConfig("lru capacity must be positive".to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        let workload = &self.workload;
        self.lru_capacity()?;
        if workload.max_span == 0 {
            return Err(Error::InvalidConfig("max span must be positive".to_string()));
        }
        if workload.array_len <= workload.max_span {
            return Err(Error::InvalidConfig(format!(
                "array length {} must exceed max span {}",
                workload.array_len, workload.max_span,
            )));
        }
        if workload.max_value == 0 {
            return Err(Error::InvalidConfig("max value must be positive".to_string()));
        }
        for &(name, ratio) in &[("range", workload.range_ratio), ("hot", workload.hot_ratio)] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(Error::InvalidConfig(format!(
                    "{} ratio {} is outside [0, 1]",
                    name, ratio,
                )));
            }
        }
        if self.fib_step == 0 {
            return Err(Error::InvalidConfig("fibonacci step must be positive".to_string()));
        }
        if self.repetitions == 0 {
            return Err(Error::InvalidConfig("repetitions must be positive".to_string()));
        }
        Ok(())
    }
}

fn timed<F, R>(f: F) -> (R, Duration)
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let ret = f();
    (ret, start.elapsed())
}

/// One strategy's result on the range-sum workload.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RangeRow {
    pub method: String,
    pub seconds: f64,
    pub checksum: u64,
    pub stats: Option<CacheStats>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RangeReport {
    pub rows: Vec<RangeRow>,
}

impl fmt::Display for RangeReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Range-sum execution time")?;
        writeln!(f, "{:<12} {:>12} {:>10} {:>10}", "method", "seconds", "hits", "misses")?;
        for row in &self.rows {
            let (hits, misses) = match row.stats {
                Some(stats) => (stats.hits.to_string(), stats.misses.to_string()),
                None => ("-".to_string(), "-".to_string()),
            };
            writeln!(
                f,
                "{:<12} {:>12.4} {:>10} {:>10}",
                row.method, row.seconds, hits, misses,
            )?;
        }
        Ok(())
    }
}

/// Runs the range-sum workload without a cache, with an LRU cache, and with a splay tree, and
/// checks that all three produce the same answers.
pub fn run_range_benchmark(config: &Config) -> Result<RangeReport> {
    config.validate()?;
    let capacity = config.lru_capacity()?;
    let workload = &config.workload;
    let mut rng = StdRng::seed_from_u64(workload.seed);
    let array = workload::generate_array(workload, &mut rng);
    let requests = workload::generate_requests(workload, &mut rng);
    info!(
        "generated {} requests over {} elements",
        requests.len(),
        array.len(),
    );

    let (uncached, uncached_time) = timed(|| workload::run_uncached(&mut array.clone(), &requests));
    debug!("uncached run took {:?}", uncached_time);

    let ((lru_checksum, stats), lru_time) =
        timed(|| workload::run_lru(&mut array.clone(), &requests, capacity));
    debug!(
        "lru run took {:?}, hit ratio {:.3}",
        lru_time,
        stats.hit_ratio(),
    );

    let (splay_checksum, splay_time) = timed(|| workload::run_splay(&mut array.clone(), &requests));
    debug!("splay run took {:?}", splay_time);

    if lru_checksum != uncached || splay_checksum != uncached {
        return Err(Error::Mismatch(format!(
            "checksums uncached={} lru={} splay={}",
            uncached, lru_checksum, splay_checksum,
        )));
    }

    Ok(RangeReport {
        rows: vec![
            RangeRow {
                method: "no cache".to_string(),
                seconds: uncached_time.as_secs_f64(),
                checksum: uncached,
                stats: None,
            },
            RangeRow {
                method: "lru cache".to_string(),
                seconds: lru_time.as_secs_f64(),
                checksum: lru_checksum,
                stats: Some(stats),
            },
            RangeRow {
                method: "splay tree".to_string(),
                seconds: splay_time.as_secs_f64(),
                checksum: splay_checksum,
                stats: None,
            },
        ],
    })
}

/// Average time of one Fibonacci computation per strategy.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FibonacciRow {
    pub n: u64,
    pub lru_seconds: f64,
    pub splay_seconds: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FibonacciReport {
    pub rows: Vec<FibonacciRow>,
}

impl fmt::Display for FibonacciReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Fibonacci execution time")?;
        writeln!(f, "{:>6} {:>16} {:>16}", "n", "lru (s)", "splay tree (s)")?;
        for row in &self.rows {
            writeln!(
                f,
                "{:>6} {:>16.8} {:>16.8}",
                row.n, row.lru_seconds, row.splay_seconds,
            )?;
        }
        Ok(())
    }
}

/// Times memoized Fibonacci for `n` in `0..=fib_max` with step `fib_step`.
///
/// The LRU cache is unbounded and shared by the whole sweep, so later indices reuse earlier
/// results. Each index gets a fresh splay tree that is shared by its repetitions.
pub fn run_fibonacci_benchmark(config: &Config) -> Result<FibonacciReport> {
    config.validate()?;
    let repetitions = config.repetitions;
    let mut cache: LruCache<u64, BigUint> = LruCache::unbounded();
    let mut rows = Vec::new();

    let mut n = 0;
    while n <= config.fib_max {
        let mut lru_total = Duration::default();
        let mut lru_value = BigUint::default();
        for _ in 0..repetitions {
            let (value, elapsed) = timed(|| lru::fibonacci(n, &mut cache));
            lru_total += elapsed;
            lru_value = value;
        }

        let mut tree: SplayTree<u64, BigUint> = SplayTree::new();
        let mut splay_total = Duration::default();
        let mut splay_value = BigUint::default();
        for _ in 0..repetitions {
            let (value, elapsed) = timed(|| splay_tree::fibonacci(n, &mut tree));
            splay_total += elapsed;
            splay_value = value;
        }

        if lru_value != splay_value {
            return Err(Error::Mismatch(format!(
                "fibonacci({}) lru={} splay={}",
                n, lru_value, splay_value,
            )));
        }
        trace!("fibonacci({}) = {}", n, splay_value);

        rows.push(FibonacciRow {
            n,
            lru_seconds: lru_total.as_secs_f64() / f64::from(repetitions),
            splay_seconds: splay_total.as_secs_f64() / f64::from(repetitions),
        });
        n += config.fib_step;
    }
    info!("timed {} fibonacci indices", rows.len());

    Ok(FibonacciReport { rows })
}
