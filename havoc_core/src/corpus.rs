use thiserror::Error;

/// Errors raised while assembling a [`Corpus`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CorpusError {
    /// A running score sum decreased, so the prefix-sum invariant does not hold.
    #[error(
        "Running score sum decreases at entry {index}: previous {previous}, current {current}"
    )]
    NonMonotonicScore {
        index: usize,
        previous: u64,
        current: u64,
    },
}

/// One previously discovered input.
///
/// `running_score_sum` is the prefix sum of the per-entry scores over the
/// corpus ordering, so the score of entry `i` is
/// `running_score_sum[i] - running_score_sum[i - 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    pub data: Vec<u8>,
    /// Number of mutation generations separating this entry from an original seed.
    pub depth: u32,
    pub running_score_sum: u64,
}

/// An append-only, ordered collection of [`CorpusEntry`] values.
///
/// The engine only ever borrows a corpus immutably. Entries are never changed
/// in place once pushed; new discoveries are appended by the coordinator
/// between generation cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
}

impl Corpus {
    /// Creates a new, empty `Corpus`.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builds a corpus from entries whose running sums were computed elsewhere.
    ///
    /// Returns [`CorpusError::NonMonotonicScore`] if any running sum is smaller
    /// than its predecessor.
    pub fn from_entries(entries: Vec<CorpusEntry>) -> Result<Self, CorpusError> {
        for (index, pair) in entries.windows(2).enumerate() {
            if pair[1].running_score_sum < pair[0].running_score_sum {
                return Err(CorpusError::NonMonotonicScore {
                    index: index + 1,
                    previous: pair[0].running_score_sum,
                    current: pair[1].running_score_sum,
                });
            }
        }
        Ok(Self { entries })
    }

    /// Appends an entry with the given individual `score` and returns its index.
    ///
    /// The running sum is derived from the last entry, saturating at `u64::MAX`.
    pub fn push(&mut self, data: Vec<u8>, depth: u32, score: u64) -> usize {
        let running_score_sum = self.total_score().saturating_add(score);
        self.entries.push(CorpusEntry {
            data,
            depth,
            running_score_sum,
        });
        self.entries.len() - 1
    }

    /// Returns the entry at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&CorpusEntry> {
        self.entries.get(index)
    }

    /// All entries in corpus order, as the sampler and the operators read them.
    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    /// Number of entries in the corpus.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total score mass, i.e. the last entry's running sum (0 when empty).
    pub fn total_score(&self) -> u64 {
        self.entries.last().map_or(0, |e| e.running_score_sum)
    }

    /// Individual score of the entry at `index`.
    pub fn score_of(&self, index: usize) -> Option<u64> {
        let current = self.entries.get(index)?.running_score_sum;
        let previous = match index {
            0 => 0,
            i => self.entries[i - 1].running_score_sum,
        };
        Some(current - previous)
    }
}

impl AsRef<[CorpusEntry]> for Corpus {
    fn as_ref(&self) -> &[CorpusEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_accumulates_running_sums() {
        let mut corpus = Corpus::new();
        assert_eq!(corpus.push(b"a".to_vec(), 0, 10), 0);
        assert_eq!(corpus.push(b"b".to_vec(), 1, 0), 1);
        assert_eq!(corpus.push(b"c".to_vec(), 2, 5), 2);

        let sums: Vec<u64> = corpus
            .entries()
            .iter()
            .map(|e| e.running_score_sum)
            .collect();
        assert_eq!(sums, vec![10, 10, 15]);
        assert_eq!(corpus.total_score(), 15);
        assert_eq!(corpus.score_of(0), Some(10));
        assert_eq!(corpus.score_of(1), Some(0));
        assert_eq!(corpus.score_of(2), Some(5));
        assert_eq!(corpus.score_of(3), None);
    }

    #[test]
    fn push_saturates_instead_of_overflowing() {
        let mut corpus = Corpus::new();
        corpus.push(vec![1], 0, u64::MAX - 1);
        corpus.push(vec![2], 0, 10);
        assert_eq!(corpus.total_score(), u64::MAX);
    }

    #[test]
    fn from_entries_rejects_decreasing_sums() {
        let entries = vec![
            CorpusEntry {
                data: vec![1],
                depth: 0,
                running_score_sum: 5,
            },
            CorpusEntry {
                data: vec![2],
                depth: 0,
                running_score_sum: 3,
            },
        ];
        assert_eq!(
            Corpus::from_entries(entries),
            Err(CorpusError::NonMonotonicScore {
                index: 1,
                previous: 5,
                current: 3
            })
        );
    }

    #[test]
    fn empty_corpus_has_no_score_mass() {
        let corpus = Corpus::new();
        assert!(corpus.is_empty());
        assert_eq!(corpus.total_score(), 0);
        assert!(corpus.get(0).is_none());
    }
}
