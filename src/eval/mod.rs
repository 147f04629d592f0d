/*!
The evaluation procedures. Each one scores a single aligned sentence pair at a time and
accumulates its counts into a tally owned by the caller; the driver below folds a whole corpus,
either sequentially or over the rayon thread pool with one tally per worker.
*/
pub mod extended;
pub mod instance_based;
pub mod starsem;

use crate::corpus::{CorpusError, SentencePair};
use crate::instance::InstanceError;
use rayon::prelude::*;
use std::error::Error;
use std::fmt::Display;
use std::ops::AddAssign;
use std::path::PathBuf;

/// Scores one sentence pair at a time. Implementors hold the run settings only; every count goes
/// into the `Tally`.
pub trait SentenceScorer: Sync {
    /// Accumulator of a run. Two tallies of disjoint sentence sets merge with `+=`, in any order.
    type Tally: Default + Send + AddAssign;

    fn score_sentence(
        &self,
        pair: &SentencePair<'_>,
        tally: &mut Self::Tally,
    ) -> Result<(), EvaluationError>;
}

/// Scores every pair and returns the merged tally. With `parallel`, the pairs are split across the
/// rayon thread pool and the per-worker tallies are added together.
pub fn run_scorer<S: SentenceScorer>(
    scorer: &S,
    pairs: &[SentencePair<'_>],
    parallel: bool,
) -> Result<S::Tally, EvaluationError> {
    if parallel {
        pairs
            .par_iter()
            .try_fold(S::Tally::default, |mut tally, pair| -> Result<S::Tally, EvaluationError> {
                scorer.score_sentence(pair, &mut tally)?;
                Ok(tally)
            })
            .try_reduce(S::Tally::default, |mut left, right| {
                left += right;
                Ok(left)
            })
    } else {
        let mut tally = S::Tally::default();
        for pair in pairs {
            scorer.score_sentence(pair, &mut tally)?;
        }
        Ok(tally)
    }
}

/// Everything that can abort an evaluation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// Structural problem in a corpus or between the gold and system corpora.
    Corpus(CorpusError),
    /// Structural problem in the file at `path`.
    File { path: PathBuf, error: CorpusError },
    Instance(InstanceError),
    /// The file at `path` could not be read.
    Io { path: PathBuf, message: String },
}

impl Display for EvaluationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Corpus(error) => Display::fmt(error, f),
            Self::File { path, error } => write!(f, "{}: {}", path.display(), error),
            Self::Instance(error) => Display::fmt(error, f),
            Self::Io { path, message } => {
                write!(f, "Could not read {}: {}", path.display(), message)
            }
        }
    }
}

impl Error for EvaluationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Corpus(error) | Self::File { error, .. } => Some(error),
            Self::Instance(error) => Some(error),
            Self::Io { .. } => None,
        }
    }
}

impl From<CorpusError> for EvaluationError {
    fn from(value: CorpusError) -> Self {
        Self::Corpus(value)
    }
}

impl From<InstanceError> for EvaluationError {
    fn from(value: InstanceError) -> Self {
        Self::Instance(value)
    }
}
