//! Synthetic range-sum workload used to compare caching strategies.
//!
//! A random array is queried with inclusive range sums, a share of which repeat a small pool of
//! "hot" ranges, interleaved with point updates that invalidate every cached answer.

use crate::lru::{CacheStats, LruCache};
use crate::splay_tree::{memoize, SplayTree};
use rand::seq::SliceRandom;
use rand::Rng;
use std::num::NonZeroUsize;

/// A single request against the array.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Request {
    /// Sum of the elements in `left..=right`.
    Range { left: usize, right: usize },
    /// Overwrite the element at `index`.
    Update { index: usize, value: u32 },
}

/// Parameters of the range-sum workload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Number of elements in the array.
    pub array_len: usize,
    /// Number of requests to generate.
    pub queries: usize,
    /// Size of the pool of frequently repeated ranges.
    pub hot_ranges: usize,
    /// Largest distance between the two ends of a range.
    pub max_span: usize,
    /// Probability that a request is a range query rather than an update.
    pub range_ratio: f64,
    /// Probability that a range query is drawn from the hot pool.
    pub hot_ratio: f64,
    /// Array elements and update values are drawn from `1..=max_value`.
    pub max_value: u32,
    pub seed: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        WorkloadConfig {
            array_len: 100_000,
            queries: 50_000,
            hot_ranges: 1_000,
            max_span: 100,
            range_ratio: 0.85,
            hot_ratio: 0.6,
            max_value: 100,
            seed: 42,
        }
    }
}

fn random_range<R: Rng>(config: &WorkloadConfig, rng: &mut R) -> (usize, usize) {
    let left = rng.gen_range(0..config.array_len - config.max_span);
    let right = left + rng.gen_range(1..=config.max_span);
    (left, right)
}

/// Generates the array the requests run against.
pub fn generate_array<R: Rng>(config: &WorkloadConfig, rng: &mut R) -> Vec<u32> {
    (0..config.array_len)
        .map(|_| rng.gen_range(1..=config.max_value))
        .collect()
}

/// Generates `config.queries` requests. Every range lies inside the array as long as
/// `config.array_len > config.max_span`.
pub fn generate_requests<R: Rng>(config: &WorkloadConfig, rng: &mut R) -> Vec<Request> {
    let hot: Vec<(usize, usize)> = (0..config.hot_ranges)
        .map(|_| random_range(config, rng))
        .collect();

    (0..config.queries)
        .map(|_| {
            if rng.gen::<f64>() < config.range_ratio {
                let (left, right) = if rng.gen::<f64>() < config.hot_ratio {
                    match hot.choose(rng) {
                        Some(&range) => range,
                        None => random_range(config, rng),
                    }
                } else {
                    random_range(config, rng)
                };
                Request::Range { left, right }
            } else {
                Request::Update {
                    index: rng.gen_range(0..config.array_len),
                    value: rng.gen_range(1..=config.max_value),
                }
            }
        })
        .collect()
}

/// Returns the sum of `array[left..=right]`. Indices past the end of the array are ignored.
///
/// # Examples
///
/// ```
/// use splay_cache::workload::range_sum;
///
/// assert_eq!(range_sum(&[1, 2, 3, 4], 1, 2), 5);
/// assert_eq!(range_sum(&[1, 2, 3, 4], 2, 10), 7);
/// assert_eq!(range_sum(&[1, 2, 3, 4], 3, 1), 0);
/// ```
pub fn range_sum(array: &[u32], left: usize, right: usize) -> u64 {
    let right = right.min(array.len().saturating_sub(1));
    array
        .get(left..=right)
        .unwrap_or(&[])
        .iter()
        .map(|&value| u64::from(value))
        .sum()
}

fn update(array: &mut [u32], index: usize, value: u32) {
    if let Some(slot) = array.get_mut(index) {
        *slot = value;
    }
}

/// Answers every request by recomputing the sum. Returns the wrapping sum of all answers.
pub fn run_uncached(array: &mut [u32], requests: &[Request]) -> u64 {
    let mut checksum = 0u64;
    for request in requests {
        match *request {
            Request::Range { left, right } => {
                checksum = checksum.wrapping_add(range_sum(array, left, right));
            }
            Request::Update { index, value } => update(array, index, value),
        }
    }
    checksum
}

/// Answers range requests through an LRU cache of `capacity` entries keyed by `(left, right)`.
/// Every update clears the cache. Returns the checksum and the cache statistics.
pub fn run_lru(
    array: &mut [u32],
    requests: &[Request],
    capacity: NonZeroUsize,
) -> (u64, CacheStats) {
    let mut cache = LruCache::new(capacity);
    let mut checksum = 0u64;
    for request in requests {
        match *request {
            Request::Range { left, right } => {
                let cached = cache.get(&(left, right)).copied();
                let sum = match cached {
                    Some(sum) => sum,
                    None => {
                        let sum = range_sum(array, left, right);
                        cache.insert((left, right), sum);
                        sum
                    }
                };
                checksum = checksum.wrapping_add(sum);
            }
            Request::Update { index, value } => {
                update(array, index, value);
                cache.clear();
            }
        }
    }
    trace!(
        "lru run finished with {} of {} cached ranges",
        cache.len(),
        cache.capacity(),
    );
    (checksum, cache.stats())
}

/// Answers range requests through a splay tree keyed by `(left, right)`. Every update discards the
/// tree. Returns the checksum.
pub fn run_splay(array: &mut [u32], requests: &[Request]) -> u64 {
    let mut tree = SplayTree::new();
    let mut checksum = 0u64;
    for request in requests {
        match *request {
            Request::Range { left, right } => {
                let values: &[u32] = array;
                let sum = memoize(&mut tree, (left, right), |_, &(left, right)| {
                    range_sum(values, left, right)
                });
                checksum = checksum.wrapping_add(sum);
            }
            Request::Update { index, value } => {
                update(array, index, value);
                tree = SplayTree::new();
            }
        }
    }
    trace!("splay run finished with {} cached ranges", tree.len());
    checksum
}

#[cfg(test)]
mod tests {
    use super::{
        generate_array, generate_requests, range_sum, run_lru, run_splay, run_uncached, Request,
        WorkloadConfig,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::num::NonZeroUsize;

    fn capacity(capacity: usize) -> NonZeroUsize {
        NonZeroUsize::new(capacity).unwrap()
    }

    fn small_config() -> WorkloadConfig {
        WorkloadConfig {
            array_len: 1_000,
            queries: 2_000,
            hot_ranges: 20,
            max_span: 10,
            ..WorkloadConfig::default()
        }
    }

    #[test]
    fn test_generate_array() {
        let config = small_config();
        let mut rng = StdRng::seed_from_u64(config.seed);
        let array = generate_array(&config, &mut rng);
        assert_eq!(array.len(), config.array_len);
        assert!(array.iter().all(|&value| value >= 1 && value <= config.max_value));
    }

    #[test]
    fn test_generate_requests_in_bounds() {
        let config = small_config();
        let mut rng = StdRng::seed_from_u64(config.seed);
        let requests = generate_requests(&config, &mut rng);
        assert_eq!(requests.len(), config.queries);
        for request in &requests {
            match *request {
                Request::Range { left, right } => {
                    assert!(left < right);
                    assert!(right - left <= config.max_span);
                    assert!(right < config.array_len);
                }
                Request::Update { index, value } => {
                    assert!(index < config.array_len);
                    assert!(value >= 1 && value <= config.max_value);
                }
            }
        }
    }

    #[test]
    fn test_generate_requests_deterministic() {
        let config = small_config();
        let first = generate_requests(&config, &mut StdRng::seed_from_u64(7));
        let second = generate_requests(&config, &mut StdRng::seed_from_u64(7));
        assert_eq!(first, second);
    }

    #[test]
    fn test_hot_ranges_repeat() {
        let config = WorkloadConfig {
            hot_ranges: 1,
            hot_ratio: 1.0,
            range_ratio: 1.0,
            ..small_config()
        };
        let requests = generate_requests(&config, &mut StdRng::seed_from_u64(3));
        assert!(requests.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn test_no_hot_ranges() {
        let config = WorkloadConfig {
            hot_ranges: 0,
            hot_ratio: 1.0,
            ..small_config()
        };
        let requests = generate_requests(&config, &mut StdRng::seed_from_u64(3));
        assert_eq!(requests.len(), config.queries);
    }

    #[test]
    fn test_range_sum() {
        let array = [5, 1, 4, 2];
        assert_eq!(range_sum(&array, 0, 3), 12);
        assert_eq!(range_sum(&array, 2, 2), 4);
        assert_eq!(range_sum(&array, 4, 8), 0);
        assert_eq!(range_sum(&[], 0, 0), 0);
    }

    #[test]
    fn test_runs_agree() {
        let config = small_config();
        let mut rng = StdRng::seed_from_u64(config.seed);
        let array = generate_array(&config, &mut rng);
        let requests = generate_requests(&config, &mut rng);

        let expected = run_uncached(&mut array.clone(), &requests);
        let (lru_checksum, stats) = run_lru(&mut array.clone(), &requests, capacity(16));
        assert_eq!(lru_checksum, expected);
        assert!(stats.hits > 0);
        assert_eq!(run_splay(&mut array.clone(), &requests), expected);
    }

    #[test]
    fn test_updates_invalidate() {
        let requests = vec![
            Request::Range { left: 0, right: 1 },
            Request::Update { index: 0, value: 10 },
            Request::Range { left: 0, right: 1 },
        ];
        assert_eq!(run_uncached(&mut vec![1, 2], &requests), 3 + 12);
        assert_eq!(run_lru(&mut vec![1, 2], &requests, capacity(4)).0, 3 + 12);
        assert_eq!(run_splay(&mut vec![1, 2], &requests), 3 + 12);
    }
}
