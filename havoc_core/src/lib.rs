pub mod codec;
pub mod config;
pub mod corpus;
pub mod interesting;
pub mod literals;
pub mod mutations;
pub mod mutator;
pub mod scheduler;

pub use config::{ConfigError, HavocConfig, MutatorSettings};
pub use corpus::{Corpus, CorpusEntry, CorpusError};
pub use interesting::InterestingValues;
pub use literals::LiteralTable;
pub use mutations::{MutationContext, MutationOperator, OperatorOutcome, choose_len};
pub use mutator::{MutationResult, Mutator, OperatorStats};
pub use scheduler::{SchedulerError, weighted_select};
