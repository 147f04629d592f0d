/*!
The simple instance-based evaluation. Instances are only paired when their cues are identical, and
cue scores follow directly from the number of pairs. Scope scores are computed over the matched
pairs only, either by pooling the matching scope tokens or by averaging a per-instance
length-normalized precision and recall.
*/
use super::{EvaluationError, SentenceScorer};
use crate::config::ScopeScoring;
use crate::corpus::SentencePair;
use crate::instance::{extract_instances, NegationInstance, Normalization};
use crate::matching::match_exact_cues;
use crate::metrics::{f1, ratio};
use either::Either as LeftOrRight;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::ops::AddAssign;

/// Running counts of an instance-based evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceTally {
    pub gold_instances: usize,
    pub system_instances: usize,
    pub matched_instances: usize,
    /// Summed scope precision credit of the matched pairs.
    pub scope_precision_numerator: f64,
    /// Summed scope recall credit of the matched pairs.
    pub scope_recall_numerator: f64,
    /// Scope tokens (punctuation excluded) over all gold instances, matched or not.
    pub gold_scope_tokens: usize,
    pub system_scope_tokens: usize,
}

/// Scope credit of one matched pair: a normalized `(precision, recall)` pair, or the number of
/// matching tokens.
fn scope_credit(
    gold: &NegationInstance,
    system: &NegationInstance,
    scoring: ScopeScoring,
) -> LeftOrRight<(f64, f64), usize> {
    let gold_scope = gold.scope_no_punct();
    let system_scope = system.scope_no_punct();
    let matched: usize = gold_scope
        .iter()
        .map(|g| system_scope.iter().filter(|s| *s == g).count())
        .sum();
    match scoring {
        ScopeScoring::Tokens => LeftOrRight::Right(matched),
        ScopeScoring::Normalized => {
            let credit = match (gold_scope.is_empty(), system_scope.is_empty()) {
                (true, true) => (1.0, 1.0),
                (true, false) => (0.0, 1.0),
                (false, true) => (1.0, 0.0),
                (false, false) => (
                    ratio(matched, system_scope.len()),
                    ratio(matched, gold_scope.len()),
                ),
            };
            LeftOrRight::Left(credit)
        }
    }
}

impl InstanceTally {
    /// Adds the instances of one sentence.
    pub fn add_sentence(
        &mut self,
        gold: &[NegationInstance],
        system: &[NegationInstance],
        scoring: ScopeScoring,
    ) {
        self.gold_instances += gold.len();
        self.system_instances += system.len();
        self.gold_scope_tokens += gold.iter().map(NegationInstance::scope_len).sum::<usize>();
        self.system_scope_tokens += system.iter().map(NegationInstance::scope_len).sum::<usize>();
        for (g, s) in match_exact_cues(gold, system) {
            self.matched_instances += 1;
            match scope_credit(&gold[g], &system[s], scoring) {
                LeftOrRight::Left((precision, recall)) => {
                    self.scope_precision_numerator += precision;
                    self.scope_recall_numerator += recall;
                }
                LeftOrRight::Right(tokens) => {
                    self.scope_precision_numerator += tokens as f64;
                    self.scope_recall_numerator += tokens as f64;
                }
            }
        }
    }

    /// Final scores. The scope denominators depend on `scoring`: instance counts for normalized
    /// scoring, scope token counts for token scoring.
    pub fn result(&self, scoring: ScopeScoring) -> EvaluationResult {
        let (precision_denominator, recall_denominator) = match scoring {
            ScopeScoring::Normalized => (self.system_instances, self.gold_instances),
            ScopeScoring::Tokens => (self.system_scope_tokens, self.gold_scope_tokens),
        };
        EvaluationResult::from_counts(
            self.gold_instances,
            self.system_instances,
            self.matched_instances,
            self.scope_precision_numerator,
            precision_denominator as f64,
            self.scope_recall_numerator,
            recall_denominator as f64,
        )
    }
}

impl AddAssign for InstanceTally {
    fn add_assign(&mut self, rhs: Self) {
        self.gold_instances += rhs.gold_instances;
        self.system_instances += rhs.system_instances;
        self.matched_instances += rhs.matched_instances;
        self.scope_precision_numerator += rhs.scope_precision_numerator;
        self.scope_recall_numerator += rhs.scope_recall_numerator;
        self.gold_scope_tokens += rhs.gold_scope_tokens;
        self.system_scope_tokens += rhs.system_scope_tokens;
    }
}

/// Scorer of the instance-based mode. Fragments are compared as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstanceScorer {
    pub scoring: ScopeScoring,
}

impl InstanceScorer {
    pub fn new(scoring: ScopeScoring) -> Self {
        Self { scoring }
    }
}

impl SentenceScorer for InstanceScorer {
    type Tally = InstanceTally;

    fn score_sentence(
        &self,
        pair: &SentencePair<'_>,
        tally: &mut Self::Tally,
    ) -> Result<(), EvaluationError> {
        let gold = extract_instances(&pair.gold, Normalization::Raw)?;
        let system = extract_instances(&pair.system, Normalization::Raw)?;
        log::trace!(
            "sentence at line {}: {} gold and {} system instances",
            pair.gold.first_line(),
            gold.len(),
            system.len()
        );
        tally.add_sentence(&gold, &system, self.scoring);
        Ok(())
    }
}

/// Cue and scope precision, recall and F1 of one run, as fractions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub cue_precision: f64,
    pub cue_recall: f64,
    pub cue_f1: f64,
    pub scope_precision: f64,
    pub scope_recall: f64,
    pub scope_f1: f64,
}

impl EvaluationResult {
    /// Derives the scores from the run counts. A zero denominator yields 0.
    pub fn from_counts(
        gold_instances: usize,
        system_instances: usize,
        matched_instances: usize,
        scope_precision_numerator: f64,
        scope_precision_denominator: f64,
        scope_recall_numerator: f64,
        scope_recall_denominator: f64,
    ) -> Self {
        let cue_precision = ratio(matched_instances, system_instances);
        let cue_recall = ratio(matched_instances, gold_instances);
        let scope_precision = ratio(scope_precision_numerator, scope_precision_denominator);
        let scope_recall = ratio(scope_recall_numerator, scope_recall_denominator);
        Self {
            cue_precision,
            cue_recall,
            cue_f1: f1(cue_precision, cue_recall),
            scope_precision,
            scope_recall,
            scope_f1: f1(scope_precision, scope_recall),
        }
    }

    fn as_row(&self) -> [f64; 6] {
        [
            self.cue_precision,
            self.cue_recall,
            self.cue_f1,
            self.scope_precision,
            self.scope_recall,
            self.scope_f1,
        ]
    }

    /// Field-wise arithmetic mean of several results. Scores are not re-derived from pooled
    /// counts. Returns `None` for an empty slice.
    pub fn average(results: &[EvaluationResult]) -> Option<EvaluationResult> {
        let values: Vec<f64> = results.iter().flat_map(|r| r.as_row()).collect();
        let table = Array2::from_shape_vec((results.len(), 6), values).ok()?;
        let mean = table.mean_axis(Axis(0))?;
        Some(Self {
            cue_precision: mean[0],
            cue_recall: mean[1],
            cue_f1: mean[2],
            scope_precision: mean[3],
            scope_recall: mean[4],
            scope_f1: mean[5],
        })
    }
}

impl Display for EvaluationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cue precision:    {:.1}", self.cue_precision * 100.0)?;
        writeln!(f, "Cue recall:       {:.1}", self.cue_recall * 100.0)?;
        writeln!(f, "Cue F1:           {:.1}", self.cue_f1 * 100.0)?;
        writeln!(f)?;
        writeln!(f, "Scope precision:  {:.1}", self.scope_precision * 100.0)?;
        writeln!(f, "Scope recall:     {:.1}", self.scope_recall * 100.0)?;
        writeln!(f, "Scope F1:         {:.1}", self.scope_f1 * 100.0)
    }
}
