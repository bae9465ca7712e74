//! Plain k-fold index generation.
//!
//! `KFold` cuts `0..n` into `fold_count` consecutive chunks (optionally after
//! a shuffle) and uses each chunk once as the test set. Both halves of a fold
//! are returned in ascending index order, so shuffling changes which rows
//! land in a fold but never the row order inside it.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::constants::config::MIN_FOLD_COUNT;
use crate::errors::FoldError;
use crate::rng::DeterministicRng;

/// Train/test indices for one fold, local to the sequence that was split.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FoldIndices {
    /// Indices used for training, ascending.
    pub train: Vec<usize>,
    /// Indices held out for testing, ascending.
    pub test: Vec<usize>,
}

/// K-fold index generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KFold {
    fold_count: usize,
    shuffle: bool,
    random_seed: Option<u64>,
}

impl KFold {
    /// Create a generator producing `fold_count` folds.
    ///
    /// `random_seed` only matters when `shuffle` is set. A seeded generator
    /// restarts from the seed on every [`KFold::split`] call; an unseeded one
    /// draws fresh entropy per call.
    pub fn new(
        fold_count: usize,
        shuffle: bool,
        random_seed: Option<u64>,
    ) -> Result<Self, FoldError> {
        if fold_count < MIN_FOLD_COUNT {
            return Err(FoldError::Configuration(format!(
                "k-fold cross-validation requires at least {MIN_FOLD_COUNT} folds, got {fold_count}"
            )));
        }
        Ok(Self {
            fold_count,
            shuffle,
            random_seed,
        })
    }

    /// Number of folds produced per split.
    pub fn fold_count(&self) -> usize {
        self.fold_count
    }

    /// Split a sequence of `samples` items into `fold_count` folds.
    pub fn split(&self, samples: usize) -> Result<Vec<FoldIndices>, FoldError> {
        if self.fold_count > samples {
            return Err(FoldError::TooFewSamples {
                fold_count: self.fold_count,
                samples,
            });
        }

        let mut order: Vec<usize> = (0..samples).collect();
        if self.shuffle {
            let seed = self
                .random_seed
                .unwrap_or_else(|| rand::rng().random::<u64>());
            order.shuffle(&mut DeterministicRng::new(seed));
        }

        let base = samples / self.fold_count;
        let extra = samples % self.fold_count;
        let mut folds = Vec::with_capacity(self.fold_count);
        let mut start = 0;
        for fold in 0..self.fold_count {
            let size = base + usize::from(fold < extra);
            let mut in_test = vec![false; samples];
            for &idx in &order[start..start + size] {
                in_test[idx] = true;
            }
            start += size;

            let (test, train): (Vec<usize>, Vec<usize>) =
                (0..samples).partition(|&idx| in_test[idx]);
            folds.push(FoldIndices { train, test });
        }
        Ok(folds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unshuffled_folds_are_consecutive_chunks() {
        let folds = KFold::new(5, false, None).unwrap().split(10).unwrap();
        assert_eq!(folds.len(), 5);
        assert_eq!(folds[0].test, vec![0, 1]);
        assert_eq!(folds[0].train, vec![2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(folds[4].test, vec![8, 9]);
    }

    #[test]
    fn leading_folds_absorb_the_remainder() {
        let folds = KFold::new(3, false, None).unwrap().split(7).unwrap();
        let sizes: Vec<usize> = folds.iter().map(|fold| fold.test.len()).collect();
        assert_eq!(sizes, vec![3, 2, 2]);
        assert_eq!(folds[1].test, vec![3, 4]);
    }

    #[test]
    fn every_index_is_tested_exactly_once() {
        for shuffle in [false, true] {
            let folds = KFold::new(4, shuffle, Some(11)).unwrap().split(13).unwrap();
            let mut seen = vec![0_usize; 13];
            for fold in &folds {
                assert_eq!(fold.train.len() + fold.test.len(), 13);
                assert!(fold.test.iter().all(|idx| !fold.train.contains(idx)));
                assert!(fold.test.windows(2).all(|pair| pair[0] < pair[1]));
                assert!(fold.train.windows(2).all(|pair| pair[0] < pair[1]));
                for &idx in &fold.test {
                    seen[idx] += 1;
                }
            }
            assert!(seen.iter().all(|&count| count == 1));
        }
    }

    #[test]
    fn seeded_shuffle_restarts_on_every_call() {
        let generator = KFold::new(5, true, Some(42)).unwrap();
        assert_eq!(generator.split(20).unwrap(), generator.split(20).unwrap());

        let other = KFold::new(5, true, Some(43)).unwrap();
        assert_ne!(generator.split(20).unwrap(), other.split(20).unwrap());
    }

    #[test]
    fn seed_is_ignored_without_shuffle() {
        let seeded = KFold::new(5, false, Some(42)).unwrap().split(10).unwrap();
        let plain = KFold::new(5, false, None).unwrap().split(10).unwrap();
        assert_eq!(seeded, plain);
    }

    #[test]
    fn rejects_more_folds_than_samples() {
        let err = KFold::new(5, false, None).unwrap().split(4).unwrap_err();
        assert!(matches!(
            err,
            FoldError::TooFewSamples {
                fold_count: 5,
                samples: 4
            }
        ));
        assert!(KFold::new(5, false, None).unwrap().split(5).is_ok());
    }

    #[test]
    fn rejects_single_fold() {
        assert!(matches!(
            KFold::new(1, false, None),
            Err(FoldError::Configuration(_))
        ));
    }
}
