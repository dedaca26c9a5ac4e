//! Parallel processing strategies

use std::ops::Range;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Processing mode for fan-out work
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProcessingMode {
    /// Single-threaded processing
    Sequential,
    /// Parallel processing on the global pool
    #[default]
    Parallel,
    /// Parallel on a dedicated pool with the given number of threads
    ParallelWith(usize),
}

/// Strategy for mapping work over a range of indices
pub trait ParallelStrategy {
    /// Map `f` over `range`, returning results in index order
    fn par_map<T, F>(&self, range: Range<usize>, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send;
}

impl ParallelStrategy for ProcessingMode {
    #[cfg(feature = "parallel")]
    fn par_map<T, F>(&self, range: Range<usize>, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        match self {
            ProcessingMode::Sequential => range.map(f).collect(),
            ProcessingMode::Parallel => range.into_par_iter().map(f).collect(),
            ProcessingMode::ParallelWith(threads) => {
                match rayon::ThreadPoolBuilder::new().num_threads(*threads).build() {
                    Ok(pool) => pool.install(|| range.into_par_iter().map(f).collect()),
                    Err(e) => {
                        tracing::warn!(
                            "thread pool with {} threads unavailable ({}), using global pool",
                            threads,
                            e
                        );
                        range.into_par_iter().map(f).collect()
                    }
                }
            }
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn par_map<T, F>(&self, range: Range<usize>, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        range.map(f).collect()
    }
}

/// Number of threads work will be spread across
pub fn num_cpus() -> usize {
    #[cfg(feature = "parallel")]
    {
        rayon::current_num_threads()
    }
    #[cfg(not(feature = "parallel"))]
    {
        1
    }
}
