//! data::partition — deterministic shuffle and 75/25 train/validation split.
//!
//! Purpose
//! -------
//! Fix the row order of the wrangled dataset with a seeded shuffle of the
//! bookmark ids, then cut the usable rows into a training prefix and a
//! validation suffix.
//!
//! Key behaviors
//! -------------
//! - [`shuffle_bookmark_ids`] runs `SliceRandom::shuffle` (Fisher–Yates)
//!   driven by `Xoshiro256Plus::seed_from_u64(seed)`; the same id list and
//!   seed always yield the same permutation.
//! - [`n_training`] is `⌊3·total / 4⌋`; [`split_rows`] puts exactly that
//!   many leading rows into training and the rest into validation.
//!
//! Invariants & assumptions
//! ------------------------
//! - Ids arrive sorted ([`DailyCounts::sorted_bookmark_ids`]) so the
//!   permutation depends only on the id set and the seed.
//! - Fewer than four rows leaves training (or validation) empty; this is
//!   not an error here and is handled downstream.
//!
//! [`DailyCounts::sorted_bookmark_ids`]: crate::data::history::DailyCounts::sorted_bookmark_ids
use crate::data::dataset::{DataSet, DataSets};
use rand::{SeedableRng, seq::SliceRandom};
use rand_xoshiro::Xoshiro256Plus;

/// Seed used for every production shuffle.
pub const DEFAULT_SEED: u64 = 1234;

/// Shuffle `ids` in place with a generator seeded from `seed`.
pub fn shuffle_bookmark_ids(ids: &mut [String], seed: u64) {
    let mut rng = Xoshiro256Plus::seed_from_u64(seed);
    ids.shuffle(&mut rng);
}

/// Number of training rows for a dataset of `total` rows.
pub fn n_training(total: usize) -> usize {
    total * 3 / 4
}

/// Split `data` into a training prefix of [`n_training`] rows and a
/// validation suffix holding the remainder.
pub fn split_rows(data: &DataSet) -> DataSets {
    let (training, validation) = data.split_at(n_training(data.n_rows()));
    DataSets { training, validation }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("id{i:03}")).collect()
    }

    // Rows tagged by their index so the split can be checked positionally.
    fn indexed_dataset(total: usize, n_days: usize) -> DataSet {
        let x = Array2::from_shape_fn((total, n_days), |(i, _)| i as f64 + 1.0);
        let y = Array1::from_shape_fn(total, |i| i as f64);
        DataSet::new(x, y).expect("consistent shapes")
    }

    #[test]
    // Purpose
    // -------
    // Shuffling is reproducible for a fixed seed and a permutation of the
    // input.
    fn shuffle_is_deterministic_permutation() {
        let mut first = ids(40);
        let mut second = ids(40);

        shuffle_bookmark_ids(&mut first, DEFAULT_SEED);
        shuffle_bookmark_ids(&mut second, DEFAULT_SEED);

        assert_eq!(first, second);
        assert_ne!(first, ids(40), "40 ids should not stay in sorted order");
        let mut restored = first.clone();
        restored.sort();
        assert_eq!(restored, ids(40));
    }

    #[test]
    fn shuffle_depends_on_seed() {
        let mut a = ids(40);
        let mut b = ids(40);

        shuffle_bookmark_ids(&mut a, 1234);
        shuffle_bookmark_ids(&mut b, 4321);

        assert_ne!(a, b);
    }

    #[test]
    fn n_training_is_floor_of_three_quarters() {
        assert_eq!(n_training(0), 0);
        assert_eq!(n_training(1), 0);
        assert_eq!(n_training(3), 2);
        assert_eq!(n_training(4), 3);
        assert_eq!(n_training(10), 7);
        assert_eq!(n_training(101), 75);
    }

    #[test]
    // Purpose
    // -------
    // For every total the split is disjoint, covers every row, and keeps
    // row order.
    //
    // Expect
    // ------
    // - |training| = ⌊0.75 · total⌋ and |training| + |validation| = total.
    // - Training holds rows 0..n, validation rows n..total.
    fn split_rows_sizes_and_order_hold_for_all_totals() {
        for total in 0..=60 {
            let data = indexed_dataset(total, 3);

            let sets = split_rows(&data);

            let n = (total as f64 * 0.75).floor() as usize;
            assert_eq!(sets.training.n_rows(), n, "total = {total}");
            assert_eq!(sets.training.n_rows() + sets.validation.n_rows(), total);
            assert_eq!(sets.training.n_days(), 3);
            assert_eq!(sets.validation.n_days(), 3);
            for (i, &label) in sets.training.y.iter().enumerate() {
                assert_eq!(label, i as f64);
            }
            for (j, &label) in sets.validation.y.iter().enumerate() {
                assert_eq!(label, (n + j) as f64);
            }
        }
    }
}
