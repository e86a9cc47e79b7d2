use crate::config::{ConfigError, MutatorSettings};
use crate::corpus::Corpus;
use crate::interesting::InterestingValues;
use crate::literals::LiteralTable;
use crate::mutations::{MutationContext, MutationOperator, OperatorOutcome};
use crate::scheduler::{SchedulerError, weighted_select};
use log::{debug, info, trace};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

/// A mutated candidate together with its lineage depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationResult {
    pub bytes: Vec<u8>,
    /// Depth of the seed entry plus one.
    pub depth: u32,
}

/// Per-operator counters collected by a [`Mutator`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorStats {
    applied: [u64; MutationOperator::COUNT],
    infeasible: [u64; MutationOperator::COUNT],
    fallbacks: u64,
}

impl OperatorStats {
    /// How many times `op` transformed a buffer.
    pub fn applied(&self, op: MutationOperator) -> u64 {
        self.applied[op.index()]
    }

    /// How many times `op` was drawn but could not be applied.
    pub fn infeasible(&self, op: MutationOperator) -> u64 {
        self.infeasible[op.index()]
    }

    /// Rounds that exhausted their retries and fell back to a bit flip or a no-op.
    pub fn fallbacks(&self) -> u64 {
        self.fallbacks
    }

    /// Applied operators summed over all ids.
    pub fn total_applied(&self) -> u64 {
        self.applied.iter().sum()
    }
}

/// The mutation engine of one fuzzing worker.
///
/// A `Mutator` owns its random source, so two instances built with the same
/// seed produce the same sequence of outputs for the same sequence of calls.
/// It is not meant to be shared: give every worker its own instance.
#[derive(Debug, Clone)]
pub struct Mutator {
    rng: ChaCha8Rng,
    seed: u64,
    settings: MutatorSettings,
    tables: InterestingValues,
    stats: OperatorStats,
}

impl Mutator {
    /// Creates a mutator with freshly built interesting-value tables.
    pub fn new(settings: MutatorSettings) -> Result<Self, ConfigError> {
        Self::with_tables(settings, InterestingValues::build())
    }

    /// Creates a mutator reusing tables built once during process setup.
    pub fn with_tables(
        settings: MutatorSettings,
        tables: InterestingValues,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        let seed = settings.seed.unwrap_or_else(|| rand::rng().random());
        info!(
            "Mutator seeded with {} (max input size {} bytes)",
            seed, settings.max_input_size
        );
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            settings,
            tables,
            stats: OperatorStats::default(),
        })
    }

    /// The seed the random source was initialised with, for replaying a session.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The settings this mutator was built with.
    pub fn settings(&self) -> &MutatorSettings {
        &self.settings
    }

    /// Counters accumulated since construction or the last [`Self::reset_stats`].
    pub fn stats(&self) -> &OperatorStats {
        &self.stats
    }

    /// Zeroes all operator counters.
    pub fn reset_stats(&mut self) {
        self.stats = OperatorStats::default();
    }

    /// Samples a seed from `corpus` by score and returns a mutated copy of it.
    ///
    /// Fails only on caller bugs: an empty corpus or one without score mass.
    pub fn generate(
        &mut self,
        corpus: &Corpus,
        literals: &LiteralTable,
    ) -> Result<MutationResult, SchedulerError> {
        let index = weighted_select(corpus.entries(), &mut self.rng)?;
        let entry = &corpus.entries()[index];
        let ctx = MutationContext::new(corpus.entries(), literals).with_origin(index);
        let bytes = self.mutate(&entry.data, &ctx);
        Ok(MutationResult {
            bytes,
            depth: entry.depth.saturating_add(1),
        })
    }

    /// Applies a random number of operator rounds to a copy of `data`.
    ///
    /// The number of rounds is geometric with mean 2. The result never exceeds
    /// `max_input_size`.
    pub fn mutate(&mut self, data: &[u8], ctx: &MutationContext<'_>) -> Vec<u8> {
        let mut buf = data.to_vec();
        let rounds = self.round_count();
        for _ in 0..rounds {
            self.run_round(&mut buf, ctx);
        }
        if buf.len() > self.settings.max_input_size {
            trace!(
                "Truncating mutated input from {} to {} bytes",
                buf.len(),
                self.settings.max_input_size
            );
            buf.truncate(self.settings.max_input_size);
        }
        buf
    }

    /// Mutates `data` without a corpus or literals, e.g. to perturb a crash reproducer.
    pub fn mutate_bytes(&mut self, data: &[u8]) -> Vec<u8> {
        let literals = LiteralTable::default();
        let ctx = MutationContext::new(&[], &literals);
        self.mutate(data, &ctx)
    }

    fn round_count(&mut self) -> usize {
        let mut rounds = 1;
        while self.rng.random_bool(0.5) {
            rounds += 1;
        }
        rounds
    }

    fn run_round(&mut self, buf: &mut Vec<u8>, ctx: &MutationContext<'_>) {
        for _ in 0..self.settings.max_operator_retries {
            let op = MutationOperator::random(&mut self.rng);
            match op.apply(buf, &mut self.rng, ctx, &self.tables) {
                OperatorOutcome::Mutated => {
                    self.stats.applied[op.index()] += 1;
                    trace!("Applied {} (len now {})", op.name(), buf.len());
                    return;
                }
                OperatorOutcome::Infeasible => self.stats.infeasible[op.index()] += 1,
            }
        }

        self.stats.fallbacks += 1;
        debug!(
            "No feasible operator after {} draws on a {}-byte buffer, falling back",
            self.settings.max_operator_retries,
            buf.len()
        );
        if !buf.is_empty() {
            let pos = self.rng.random_range(0..buf.len());
            buf[pos] ^= 1 << self.rng.random_range(0..8u8);
        }
    }
}
