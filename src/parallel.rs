//! Thread-pool abstraction, toggled by the `rayon` feature.
//!
//! `opt_par_iter` and `opt_join` are the two shapes of parallelism the
//! core actually needs: a data-parallel map over independent fixes, and a
//! fork-join pair for the two disjoint sequential scans that build the
//! `before`/`after` tables. Serial fallbacks keep the crate usable with
//! `default-features = false`.

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        pub use rayon::prelude::*;

        /// Parallel iterator over a slice, when the `rayon` feature is enabled.
        pub fn opt_par_iter<T: Sync>(items: &[T]) -> rayon::slice::Iter<'_, T> {
            items.par_iter()
        }

        /// Runs two independent closures concurrently.
        pub fn opt_join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
        where
            A: FnOnce() -> RA + Send,
            B: FnOnce() -> RB + Send,
            RA: Send,
            RB: Send,
        {
            rayon::join(a, b)
        }
    } else {
        /// Serial iterator over a slice, when the `rayon` feature is disabled.
        pub fn opt_par_iter<T>(items: &[T]) -> std::slice::Iter<'_, T> {
            items.iter()
        }

        /// Runs two independent closures, serially, in order.
        pub fn opt_join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
        where
            A: FnOnce() -> RA,
            B: FnOnce() -> RB,
        {
            (a(), b())
        }
    }
}
