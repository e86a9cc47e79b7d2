use crate::corpus::CorpusEntry;
use rand::Rng;
use thiserror::Error;

/// Errors that can occur while picking a seed from the corpus.
///
/// Both variants are caller bugs: the coordinator must only ask for a seed
/// once the corpus holds at least one entry with a positive score.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchedulerError {
    /// Indicates that the corpus is empty, and therefore no input can be scheduled.
    #[error("Corpus is empty, cannot schedule next input")]
    CorpusEmpty,
    /// The corpus is non-empty but its total score mass is zero.
    #[error("Corpus has no score mass to sample from (total score {total})")]
    NoScoreMass { total: u64 },
}

/// Selects a corpus index with probability proportional to each entry's score.
///
/// Draws `w` uniformly from `[0, total)` and returns the first entry whose
/// running sum exceeds `w`. Entries with zero individual score are never chosen.
pub fn weighted_select<R: Rng + ?Sized>(
    entries: &[CorpusEntry],
    rng: &mut R,
) -> Result<usize, SchedulerError> {
    let last = entries.last().ok_or(SchedulerError::CorpusEmpty)?;
    let total = last.running_score_sum;
    if total == 0 {
        return Err(SchedulerError::NoScoreMass { total });
    }
    let w = rng.random_range(0..total);
    // Running sums are non-decreasing, so this is a binary search.
    let index = entries.partition_point(|e| e.running_score_sum <= w);
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;
    use rand_chacha::ChaCha8Rng;
    use rand_core::SeedableRng;

    #[test]
    fn weighted_select_from_empty_corpus_returns_corpus_empty_error() {
        let corpus = Corpus::new();
        let mut rng = ChaCha8Rng::from_seed([0; 32]);
        assert_eq!(
            weighted_select(corpus.entries(), &mut rng),
            Err(SchedulerError::CorpusEmpty)
        );
    }

    #[test]
    fn weighted_select_with_zero_total_score_is_rejected() {
        let mut corpus = Corpus::new();
        corpus.push(vec![1, 2, 3], 0, 0);
        corpus.push(vec![4, 5, 6], 0, 0);
        let mut rng = ChaCha8Rng::from_seed([0; 32]);
        assert_eq!(
            weighted_select(corpus.entries(), &mut rng),
            Err(SchedulerError::NoScoreMass { total: 0 })
        );
    }

    #[test]
    fn weighted_select_never_picks_zero_score_entries() {
        let mut corpus = Corpus::new();
        corpus.push(vec![0], 0, 0);
        corpus.push(vec![1], 0, 3);
        corpus.push(vec![2], 0, 0);
        corpus.push(vec![3], 0, 7);
        corpus.push(vec![4], 0, 0);
        let mut rng = ChaCha8Rng::from_seed([3; 32]);

        for i in 0..2_000 {
            let id = weighted_select(corpus.entries(), &mut rng).unwrap();
            assert!(
                id == 1 || id == 3,
                "Selected zero-score entry {} on iteration {}",
                id,
                i
            );
        }
    }

    #[test]
    fn weighted_select_frequencies_converge_to_score_share() {
        let scores = [1u64, 2, 3, 4];
        let mut corpus = Corpus::new();
        for (i, &score) in scores.iter().enumerate() {
            corpus.push(vec![i as u8], 0, score);
        }
        let total: u64 = scores.iter().sum();
        let mut rng = ChaCha8Rng::seed_from_u64(0xC0FFEE);

        let draws = 100_000;
        let mut counts = [0usize; 4];
        for _ in 0..draws {
            counts[weighted_select(corpus.entries(), &mut rng).unwrap()] += 1;
        }

        for (i, &score) in scores.iter().enumerate() {
            let expected = score as f64 / total as f64;
            let observed = counts[i] as f64 / draws as f64;
            assert!(
                (observed - expected).abs() < 0.01,
                "Entry {} observed frequency {:.4}, expected {:.4}",
                i,
                observed,
                expected
            );
        }
    }

    #[test]
    fn weighted_select_single_entry_always_returns_it() {
        let mut corpus = Corpus::new();
        corpus.push(b"AAAA".to_vec(), 0, 10);
        let mut rng = ChaCha8Rng::from_seed([9; 32]);
        for _ in 0..50 {
            assert_eq!(weighted_select(corpus.entries(), &mut rng), Ok(0));
        }
    }
}
