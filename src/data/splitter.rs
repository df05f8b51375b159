// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Shuffles items with a seeded RNG and splits them into
// (train, validation). The loader splits whole records, not
// windows, so two windows of one recording never end up on
// both sides of the split.
//
// The seed is fixed per run configuration, which makes the
// split reproducible and lets the on-disk cache stay valid.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` with `seed` and split into (train, validation).
/// The validation side gets `val_fraction` of the items, rounded, but
/// never fewer than one item on either side when there are two or more.
pub fn split_train_val<T>(samples: Vec<T>, val_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let total = samples.len();
    if total < 2 {
        return split_at_index(samples, total, seed);
    }
    let n_val = (((total as f64) * val_fraction).round() as usize).clamp(1, total - 1);
    split_at_index(samples, total - n_val, seed)
}

fn split_at_index<T>(mut samples: Vec<T>, split_at: usize, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total = samples.len();
    let val   = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation ({}% / {}%)",
        samples.len(),
        val.len(),
        (samples.len() * 100) / total.max(1),
        (val.len()     * 100) / total.max(1),
    );

    (samples, val)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, val)      = split_train_val(items, 0.2, 20);
        assert_eq!(train.len(), 80);
        assert_eq!(val.len(),   20);
    }

    #[test]
    fn test_all_items_preserved() {
        let items: Vec<usize> = (0..50).collect();
        let (train, val)      = split_train_val(items, 0.3, 20);
        let mut all: Vec<usize> = train.into_iter().chain(val).collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = split_train_val((0..30).collect::<Vec<usize>>(), 0.5, 7);
        let b = split_train_val((0..30).collect::<Vec<usize>>(), 0.5, 7);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, val)      = split_train_val(items, 0.2, 20);
        assert!(train.is_empty());
        assert!(val.is_empty());
    }

    #[test]
    fn test_keeps_one_on_each_side() {
        let (train, val) = split_train_val(vec![1, 2], 0.1, 20);
        assert_eq!(train.len(), 1);
        assert_eq!(val.len(),   1);

        let (train, val) = split_train_val(vec![1, 2, 3], 0.9, 20);
        assert_eq!(train.len(), 1);
        assert_eq!(val.len(),   2);
    }
}
