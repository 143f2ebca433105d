//! Deterministic train/test splitting.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::{DataError, Dataset};

/// Row indices of a train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..rows` with a seeded RNG and cut off the test share.
///
/// The test set holds `round(rows * test_fraction)` rows. The same seed
/// always yields the same partition.
///
/// # Errors
///
/// [`DataError::InvalidTestFraction`] unless `0 <= test_fraction < 1`.
pub fn split_indices(
    rows: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit, DataError> {
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(DataError::InvalidTestFraction(test_fraction));
    }

    let mut idx: Vec<usize> = (0..rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    idx.shuffle(&mut rng);

    let test_len = ((rows as f64) * test_fraction).round() as usize;
    let test_len = test_len.min(rows);
    let (test, train) = idx.split_at(test_len);
    Ok(TrainTestSplit {
        train: train.to_vec(),
        test: test.to_vec(),
    })
}

/// Split a dataset into `(train, test)`.
pub fn train_test_split(
    dataset: &Dataset,
    test_fraction: f64,
    seed: u64,
) -> Result<(Dataset, Dataset), DataError> {
    let split = split_indices(dataset.n_samples(), test_fraction, seed)?;
    tracing::debug!(
        train = split.train.len(),
        test = split.test.len(),
        seed,
        "split dataset"
    );
    Ok((dataset.select_rows(&split.train), dataset.select_rows(&split.test)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(100, 0.2, 20)]
    #[case(15000, 0.2, 3000)]
    #[case(7, 0.2, 1)]
    #[case(8, 0.2, 2)]
    #[case(10, 0.0, 0)]
    fn test_size_is_rounded(#[case] rows: usize, #[case] frac: f64, #[case] expected: usize) {
        let split = split_indices(rows, frac, 2).unwrap();
        assert_eq!(split.test.len(), expected);
        assert_eq!(split.train.len(), rows - expected);
    }

    #[test]
    fn partition_is_disjoint_and_complete() {
        let split = split_indices(50, 0.2, 2).unwrap();
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn same_seed_same_split() {
        assert_eq!(split_indices(200, 0.2, 2).unwrap(), split_indices(200, 0.2, 2).unwrap());
        assert_ne!(split_indices(200, 0.2, 2).unwrap(), split_indices(200, 0.2, 3).unwrap());
    }

    #[rstest]
    #[case(1.0)]
    #[case(-0.1)]
    #[case(f64::NAN)]
    fn rejects_bad_fraction(#[case] frac: f64) {
        assert!(matches!(
            split_indices(10, frac, 0),
            Err(DataError::InvalidTestFraction(_))
        ));
    }
}
