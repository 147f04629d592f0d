/*!
This library evaluates negation (or speculation) detection against gold annotations in the
CoNLL-style format of the *SEM 2012 shared task. It re-implements the historical scorers, and keeps
their numbers reproducible, while being fast enough for large corpora.

# FORMAT
Every non-blank line is a token and sentences are separated by blank lines. A line holds 7 fixed
tab-separated columns (document, sentence number, token number, word, lemma, part of speech,
syntax) followed by either a single `***` cell, when the sentence has no instance, or 3 cells per
instance: the cue, scope and event fragments of that token, `_` when the token plays no part.

# MODES
* Instance-based: cues are matched exactly, then the scopes of the matched pairs are compared
    token by token. Scope scores are either normalized per instance or pooled over tokens.
* Extended: token-level and scope-level scores for cues, scopes and events under full, partial
    and no cue matching, with binary-label pooling and punctuation-insensitive variants.
* *SEM 2012 (`starsem`): the classic table with its B variants.

The extended and classic modes can reproduce the historical scorers exactly, known mistakes
included, through `EvalConfigBuilder::exact`.

# Terminology
* A cue is the word, or the part of a word, expressing the negation.
* A scope is the set of tokens affected by the cue. The cue is not part of its scope.
* An event is the negated event or property, usually inside the scope.
* An instance is one cue with its scope and event. A sentence can hold any number of instances.
* A fragment is the part of a token taking part in an instance. For affixal cues such as `im` in
    `impossible`, the fragment is shorter than the token.
*/

mod config;
mod corpus;
mod datastructure;
mod eval;
mod instance;
mod matching;
mod metrics;
mod reporter;

use std::fs;
use std::path::{Path, PathBuf};

// The public api starts here
pub use corpus::{align, Annotation, Corpus, CorpusError, Role, Sentence, SentencePair, Token};

pub use instance::{
    extract_instances, is_punctuation, Fragment, InstanceError, NegationInstance, Normalization,
};

pub use matching::{
    match_exact_cues, match_overlapping_cues, match_overlapping_events, CueMatch, CueMatching,
    EventMatching, EventOutcome,
};

pub use metrics::{Category, Counter, Detail, Level, Metric, MetricTable, Score};

pub use eval::extended::{ExtendedScorer, ExtendedTally, SentenceStats};
pub use eval::instance_based::{EvaluationResult, InstanceScorer, InstanceTally};
pub use eval::starsem::{
    classic_instances, InstanceTotals, StarsemRow, StarsemScorer, StarsemScores, StarsemTally,
};
pub use eval::{run_scorer, EvaluationError, SentenceScorer};

pub use config::{
    EvalConfig, EvalConfigBuilder, EvalMode, ParseConfigError, ScopeScoring, DEFAULT_ROUNDING,
    DEFAULT_TASK,
};

pub use reporter::{
    readme, Evaluation, ExtendedReport, ExtendedSection, FileReport, MetricRow, Overall,
    OverallLine, Report, StarsemReport,
};

/// Main entrypoint of the library. Parses the gold and system annotations, checks that they cover
/// the same tokens and evaluates the system with the procedure selected by `config`.
///
/// * `gold`: Content of the gold file.
/// * `system`: Content of the system file.
/// * `config`: Evaluation settings.
///
/// #Example
/// ```rust
/// use negeval::{evaluate, EvalConfigBuilder, EvalMode, Report};
///
/// let gold = "\
/// d\t0\t0\tI\ti\tPRP\t_\t_\t_\t_
/// d\t0\t1\tam\tbe\tVBP\t_\t_\tam\t_
/// d\t0\t2\tnot\tnot\tRB\t_\tnot\t_\t_
/// d\t0\t3\thappy\thappy\tJJ\t_\t_\thappy\thappy
/// ";
/// let config = EvalConfigBuilder::new().mode(EvalMode::InstanceBased).build();
///
/// let report = evaluate(gold, gold, &config).unwrap();
/// match report {
///     Report::InstanceBased(result) => {
///         assert_eq!(result.cue_f1, 1.0);
///         assert_eq!(result.scope_f1, 1.0);
///     }
///     _ => unreachable!(),
/// }
/// ```
pub fn evaluate(gold: &str, system: &str, config: &EvalConfig) -> Result<Report, EvaluationError> {
    let gold = Corpus::parse(gold)?;
    let system = Corpus::parse(system)?;
    evaluate_corpora(&gold, &system, config)
}

/// Evaluates two already parsed corpora. See `evaluate`.
pub fn evaluate_corpora(
    gold: &Corpus,
    system: &Corpus,
    config: &EvalConfig,
) -> Result<Report, EvaluationError> {
    let pairs = align(gold, system)?;
    log::debug!(
        "evaluating {} sentences in {} mode",
        pairs.len(),
        config.mode()
    );
    let report = match config.mode() {
        EvalMode::InstanceBased => {
            let scorer = InstanceScorer::new(config.scope_scoring());
            let tally = run_scorer(&scorer, &pairs, config.parallel())?;
            Report::InstanceBased(tally.result(config.scope_scoring()))
        }
        EvalMode::Extended => {
            let scorer = ExtendedScorer::new(config.exact());
            let tally = run_scorer(&scorer, &pairs, config.parallel())?;
            Report::Extended(ExtendedReport::new(&tally, config.task(), config.rounding()))
        }
        EvalMode::Starsem => {
            let scorer = StarsemScorer::new(config.exact());
            let tally = run_scorer(&scorer, &pairs, config.parallel())?;
            Report::Starsem(StarsemReport::new(
                tally.scores(config.exact()),
                config.task(),
                config.rounding(),
            ))
        }
    };
    Ok(report)
}

fn read_corpus(path: &Path) -> Result<Corpus, EvaluationError> {
    let text = fs::read_to_string(path).map_err(|e| EvaluationError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Corpus::parse(&text).map_err(|error| EvaluationError::File {
        path: path.to_path_buf(),
        error,
    })
}

/// Evaluates every system file against the same gold file. The gold file is read once. In
/// instance-based mode with more than one system file, the average of the results is included.
/// Errors found while aligning a system with the gold corpus are attributed to the system file.
pub fn evaluate_files<P: AsRef<Path>>(
    gold: &Path,
    systems: &[P],
    config: &EvalConfig,
) -> Result<Evaluation, EvaluationError> {
    let gold_corpus = read_corpus(gold)?;
    log::info!(
        "read {} sentences from {}",
        gold_corpus.len(),
        gold.display()
    );
    let mut reports = Vec::with_capacity(systems.len());
    for system in systems {
        let path = system.as_ref();
        let system_corpus = read_corpus(path)?;
        let report = evaluate_corpora(&gold_corpus, &system_corpus, config).map_err(|e| match e {
            EvaluationError::Corpus(error) => EvaluationError::File {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })?;
        log::info!("evaluated {}", path.display());
        reports.push(FileReport {
            path: PathBuf::from(path),
            report,
        });
    }
    let results: Vec<EvaluationResult> = reports
        .iter()
        .filter_map(|r| match r.report {
            Report::InstanceBased(result) => Some(result),
            _ => None,
        })
        .collect();
    let average = if results.len() > 1 {
        EvaluationResult::average(&results)
    } else {
        None
    };
    Ok(Evaluation { reports, average })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOLD: &str = "\
d\t0\t0\tI\ti\tPRP\t_\t_\t_\t_
d\t0\t1\tam\tbe\tVBP\t_\t_\tam\t_
d\t0\t2\tnot\tnot\tRB\t_\tnot\t_\t_
d\t0\t3\thappy\thappy\tJJ\t_\t_\thappy\thappy
d\t0\t4\t.\t.\t.\t_\t_\t_\t_

d\t1\t0\tFine\tfine\tJJ\t_\t***
d\t1\t1\t.\t.\t.\t_\t***
";

    #[test]
    fn test_every_mode_runs_on_a_perfect_system() {
        for mode in [EvalMode::InstanceBased, EvalMode::Extended, EvalMode::Starsem] {
            let config = EvalConfigBuilder::new().mode(mode).build();
            let report = evaluate(GOLD, GOLD, &config).unwrap();
            assert_eq!(report.mode(), mode);
        }
    }

    #[test]
    fn test_parallel_run_matches_sequential_run() {
        let system = GOLD.replace("\t_\tam\t_", "\t_\t_\t_");
        for mode in [EvalMode::InstanceBased, EvalMode::Extended, EvalMode::Starsem] {
            let sequential = EvalConfigBuilder::new().mode(mode).build();
            let parallel = EvalConfigBuilder::new().mode(mode).parallel(true).build();
            assert_eq!(
                evaluate(GOLD, &system, &sequential).unwrap(),
                evaluate(GOLD, &system, &parallel).unwrap()
            );
        }
    }

    #[test]
    fn test_misaligned_corpora_are_rejected() {
        let system = GOLD.replace("\tFine\t", "\tGood\t");
        let error = evaluate(GOLD, &system, &EvalConfig::default()).unwrap_err();
        assert!(matches!(error, EvaluationError::Corpus(_)));
    }

    #[test]
    fn test_missing_file_is_reported_with_its_path() {
        let missing = PathBuf::from("this/file/does/not/exist.txt");
        let error = evaluate_files(&missing, &[&missing], &EvalConfig::default()).unwrap_err();
        match error {
            EvaluationError::Io { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
