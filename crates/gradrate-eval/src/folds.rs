//! Row partitioning.

use crate::error::{EvalError, Result};
use rand::Rng;
use rand::seq::SliceRandom;

/// Random partition of row indices into k disjoint folds.
///
/// Fold sizes differ by at most one; the first `n % k` folds hold the extra
/// rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldAssignment {
    folds: Vec<Vec<usize>>,
    n_samples: usize,
}

impl FoldAssignment {
    /// Shuffle `0..n_samples` and cut it into `k` folds.
    pub fn random<R: Rng + ?Sized>(n_samples: usize, k: usize, rng: &mut R) -> Result<Self> {
        if k < 2 || k > n_samples {
            return Err(EvalError::InvalidFolds {
                folds: k,
                samples: n_samples,
            });
        }

        let mut order: Vec<usize> = (0..n_samples).collect();
        order.shuffle(rng);

        let base = n_samples / k;
        let extra = n_samples % k;
        let mut folds = Vec::with_capacity(k);
        let mut start = 0;
        for i in 0..k {
            let len = base + usize::from(i < extra);
            folds.push(order[start..start + len].to_vec());
            start += len;
        }

        Ok(Self { folds, n_samples })
    }

    /// Number of folds
    pub fn n_folds(&self) -> usize {
        self.folds.len()
    }

    /// Number of rows partitioned
    pub const fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Validation rows of fold `i`.
    pub fn fold(&self, i: usize) -> &[usize] {
        &self.folds[i]
    }

    /// Training rows for fold `i`: every row outside it, ascending.
    pub fn train_indices(&self, i: usize) -> Vec<usize> {
        let mut rows: Vec<usize> = self
            .folds
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .flat_map(|(_, fold)| fold.iter().copied())
            .collect();
        rows.sort_unstable();
        rows
    }

    /// Iterate over the folds in order.
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> {
        self.folds.iter().map(Vec::as_slice)
    }
}

/// Shuffle the rows once and hold out the last `ceil(n * test_fraction)`.
///
/// Returns `(train, test)`; both sides keep at least one row.
pub fn shuffled_split<R: Rng + ?Sized>(
    n_samples: usize,
    test_fraction: f64,
    rng: &mut R,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if test_fraction.is_nan() || test_fraction <= 0.0 || test_fraction >= 1.0 {
        return Err(EvalError::InvalidSplit(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }
    if n_samples < 2 {
        return Err(EvalError::InvalidSplit(format!(
            "need at least 2 rows to split, got {n_samples}"
        )));
    }

    let n_test = ((n_samples as f64 * test_fraction).ceil() as usize).clamp(1, n_samples - 1);
    let mut order: Vec<usize> = (0..n_samples).collect();
    order.shuffle(rng);
    let test = order.split_off(n_samples - n_test);

    Ok((order, test))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;

    #[rstest]
    #[case(20, 5)]
    #[case(23, 5)]
    #[case(7, 7)]
    #[case(10, 3)]
    fn test_folds_partition_rows(#[case] n: usize, #[case] k: usize) {
        let mut rng = StdRng::seed_from_u64(1);
        let folds = FoldAssignment::random(n, k, &mut rng).unwrap();

        assert_eq!(folds.n_folds(), k);
        let mut all: Vec<usize> = folds.iter().flatten().copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..n).collect::<Vec<_>>());

        let sizes: Vec<usize> = folds.iter().map(<[usize]>::len).collect();
        let max = *sizes.iter().max().unwrap();
        let min = *sizes.iter().min().unwrap();
        assert!(max - min <= 1);
        // Larger folds come first.
        assert!(sizes.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_train_indices_complement_fold() {
        let mut rng = StdRng::seed_from_u64(2);
        let folds = FoldAssignment::random(11, 4, &mut rng).unwrap();

        for i in 0..folds.n_folds() {
            let train = folds.train_indices(i);
            assert_eq!(train.len() + folds.fold(i).len(), 11);
            assert!(folds.fold(i).iter().all(|row| !train.contains(row)));
        }
    }

    #[rstest]
    #[case(10, 1)]
    #[case(10, 0)]
    #[case(3, 4)]
    fn test_invalid_fold_counts(#[case] n: usize, #[case] k: usize) {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            FoldAssignment::random(n, k, &mut rng),
            Err(EvalError::InvalidFolds { .. })
        ));
    }

    #[test]
    fn test_same_seed_same_folds() {
        let a = FoldAssignment::random(30, 5, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = FoldAssignment::random(30, 5, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[rstest]
    #[case(10, 0.2, 2)]
    #[case(11, 0.2, 3)]
    #[case(3, 0.1, 1)]
    #[case(2, 0.9, 1)]
    fn test_shuffled_split_sizes(#[case] n: usize, #[case] fraction: f64, #[case] n_test: usize) {
        let mut rng = StdRng::seed_from_u64(4);
        let (train, test) = shuffled_split(n, fraction, &mut rng).unwrap();

        assert_eq!(test.len(), n_test);
        assert_eq!(train.len(), n - n_test);
        let mut all = [train, test].concat();
        all.sort_unstable();
        assert_eq!(all, (0..n).collect::<Vec<_>>());
    }

    #[rstest]
    #[case(10, 0.0)]
    #[case(10, 1.0)]
    #[case(10, f64::NAN)]
    #[case(1, 0.5)]
    fn test_invalid_splits(#[case] n: usize, #[case] fraction: f64) {
        let mut rng = StdRng::seed_from_u64(5);
        assert!(shuffled_split(n, fraction, &mut rng).is_err());
    }
}
