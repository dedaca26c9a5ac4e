//! Row-parallel iteration that degrades to plain iterators.
//!
//! With the `parallel` feature this is rayon's prelude. Without it (single
//! threaded builds), `into_par_iter()` is provided for every `IntoIterator`
//! and simply calls `into_iter()`, so the same iterator chains compile.
#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    pub trait IntoParallelIterator {
        type Iter: Iterator<Item = Self::Item>;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;
