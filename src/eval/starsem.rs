/*!
The classic *SEM 2012 evaluation. Cues, scopes, negated events and full instances are counted on
cue-matched pairs, next to two "apart" passes: scopes paired by their cues but scored on their
own, and events paired by event overlap whatever their cue.

Scopes are compared without punctuation: a scope token is kept only when its part of speech has
a word character and is not a bracket, and a fragment such as `Mr.` is reduced to `Mr`.

With `exact`, the historical numbers are reproduced: partial event matches skip the word overlap
test, the tp of the cue-matched scopes is printed on the "no cue match" row, and F1 is computed
from precision and recall rounded to two decimals.
*/
use super::{EvaluationError, SentenceScorer};
use crate::corpus::{Sentence, SentencePair};
use crate::instance::{
    extract_instances, Fragment, InstanceError, NegationInstance, Normalization,
};
use crate::matching::{match_overlapping_cues, match_overlapping_events, EventOutcome};
use crate::metrics::{f1, ratio, Counter, Score};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Instance totals of one side of the comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceTotals {
    pub cues: u64,
    /// Instances with a non-empty scope.
    pub scopes: u64,
    /// Instances with a negated event.
    pub negated: u64,
    pub scope_tokens: u64,
}

impl InstanceTotals {
    fn add(&mut self, instances: &[NegationInstance]) {
        for instance in instances {
            self.cues += 1;
            self.scopes += u64::from(!instance.scope().is_empty());
            self.negated += u64::from(instance.has_event());
            self.scope_tokens += instance.scope().len() as u64;
        }
    }
}

impl AddAssign for InstanceTotals {
    fn add_assign(&mut self, rhs: Self) {
        self.cues += rhs.cues;
        self.scopes += rhs.scopes;
        self.negated += rhs.negated;
        self.scope_tokens += rhs.scope_tokens;
    }
}

/// Accumulator of a classic run. The `fp_no_fn` counter of the scores is not used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarsemTally {
    pub cue: Score,
    pub scope: Score,
    pub scope_apart: Score,
    pub scope_tokens: Score,
    pub negated: Score,
    pub negated_apart: Score,
    pub full: Score,
    pub gold: InstanceTotals,
    pub system: InstanceTotals,
    pub sentences: u64,
    pub negation_sentences: u64,
    pub error_sentences: u64,
    pub error_negation_sentences: u64,
}

impl AddAssign for StarsemTally {
    fn add_assign(&mut self, rhs: Self) {
        self.cue += rhs.cue;
        self.scope += rhs.scope;
        self.scope_apart += rhs.scope_apart;
        self.scope_tokens += rhs.scope_tokens;
        self.negated += rhs.negated;
        self.negated_apart += rhs.negated_apart;
        self.full += rhs.full;
        self.gold += rhs.gold;
        self.system += rhs.system;
        self.sentences += rhs.sentences;
        self.negation_sentences += rhs.negation_sentences;
        self.error_sentences += rhs.error_sentences;
        self.error_negation_sentences += rhs.error_negation_sentences;
    }
}

/// Scores one role of a cue-matched pair. Returns true when the pair is wrong.
fn score_role(score: &mut Score, gold: &[Fragment], system: &[Fragment]) -> bool {
    match (gold.is_empty(), system.is_empty()) {
        (true, true) => false,
        (true, false) => {
            score.update(Counter::Fp, 1);
            true
        }
        (false, _) if gold == system => {
            score.update(Counter::Tp, 1);
            false
        }
        (false, _) => {
            score.update(Counter::Fn, 1);
            true
        }
    }
}

impl StarsemTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scores the instances of one sentence, scopes already filtered.
    pub fn add_sentence(
        &mut self,
        gold: &[NegationInstance],
        system: &[NegationInstance],
        exact: bool,
    ) {
        self.sentences += 1;
        self.gold.add(gold);
        self.system.add(system);
        if !gold.is_empty() {
            self.negation_sentences += 1;
        }
        let error = match (gold.is_empty(), system.is_empty()) {
            (true, true) => false,
            (false, true) => {
                for instance in gold {
                    self.missed(instance);
                    if instance.has_event() {
                        self.negated_apart.update(Counter::Fn, 1);
                    }
                    if !instance.scope().is_empty() {
                        self.scope_apart.update(Counter::Fn, 1);
                    }
                }
                true
            }
            (true, false) => {
                for instance in system {
                    self.spurious(instance);
                    if instance.has_event() {
                        self.negated_apart.update(Counter::Fp, 1);
                    }
                    if !instance.scope().is_empty() {
                        self.scope_apart.update(Counter::Fp, 1);
                    }
                }
                true
            }
            (false, false) => {
                let error = self.compare(gold, system);
                self.compare_events(gold, system, exact);
                error
            }
        };
        if error {
            self.error_sentences += 1;
            if !gold.is_empty() {
                self.error_negation_sentences += 1;
            }
        }
    }

    fn missed(&mut self, instance: &NegationInstance) {
        self.cue.update(Counter::Fn, 1);
        if !instance.scope().is_empty() {
            self.scope.update(Counter::Fn, 1);
            self.scope_tokens
                .update(Counter::Fn, instance.scope().len() as u64);
        }
        if instance.has_event() {
            self.negated.update(Counter::Fn, 1);
        }
        self.full.update(Counter::Fn, 1);
    }

    fn spurious(&mut self, instance: &NegationInstance) {
        self.cue.update(Counter::Fp, 1);
        if !instance.scope().is_empty() {
            self.scope.update(Counter::Fp, 1);
            self.scope_tokens
                .update(Counter::Fp, instance.scope().len() as u64);
        }
        if instance.has_event() {
            self.negated.update(Counter::Fp, 1);
        }
        self.full.update(Counter::Fp, 1);
    }

    /// A gold scope token is found when the first system token with the same index has the same
    /// word, and the other way around for system tokens.
    fn compare_scope_tokens(&mut self, gold: &[Fragment], system: &[Fragment]) {
        let same_word = |token: &Fragment, others: &[Fragment]| {
            others
                .iter()
                .find(|other| other.index == token.index)
                .is_some_and(|other| other.text == token.text)
        };
        for token in gold {
            let counter = if same_word(token, system) {
                Counter::Tp
            } else {
                Counter::Fn
            };
            self.scope_tokens.update(counter, 1);
        }
        for token in system {
            if !same_word(token, gold) {
                self.scope_tokens.update(Counter::Fp, 1);
            }
        }
    }

    /// Cue-matched scoring of a sentence negated on both sides. Returns true on any error.
    fn compare(&mut self, gold: &[NegationInstance], system: &[NegationInstance]) -> bool {
        let mut error = false;
        let matching = match_overlapping_cues(gold, system);
        for pair in matching.matches() {
            let (g, s) = (&gold[pair.gold], &system[pair.system]);
            self.compare_scope_tokens(g.scope(), s.scope());
            if g.cue() == s.cue() && g.scope() == s.scope() && g.event() == s.event() {
                self.full.update(Counter::Tp, 1);
            } else {
                self.full.update(Counter::Fn, 1);
                error = true;
            }
            if g.cue() == s.cue() {
                self.cue.update(Counter::Tp, 1);
                error |= score_role(&mut self.scope, g.scope(), s.scope());
                error |= score_role(&mut self.negated, g.event(), s.event());
            } else {
                self.cue.update(Counter::Fn, 1);
                if !g.scope().is_empty() {
                    self.scope.update(Counter::Fn, 1);
                }
                if g.has_event() {
                    self.negated.update(Counter::Fn, 1);
                }
                error = true;
            }
            score_role(&mut self.scope_apart, g.scope(), s.scope());
        }
        for g in matching.unmatched_gold() {
            self.missed(&gold[g]);
            if !gold[g].scope().is_empty() {
                self.scope_apart.update(Counter::Fn, 1);
            }
            error = true;
        }
        for s in matching.unmatched_system() {
            self.spurious(&system[s]);
            if !system[s].scope().is_empty() {
                self.scope_apart.update(Counter::Fp, 1);
            }
            error = true;
        }
        error
    }

    fn compare_events(
        &mut self,
        gold: &[NegationInstance],
        system: &[NegationInstance],
        exact: bool,
    ) {
        let gold_events: Vec<&[Fragment]> = gold.iter().map(NegationInstance::event).collect();
        let system_events: Vec<&[Fragment]> = system.iter().map(NegationInstance::event).collect();
        let events = match_overlapping_events(&gold_events, &system_events, exact);
        for outcome in events.gold.iter() {
            match outcome {
                EventOutcome::Exact => self.negated_apart.update(Counter::Tp, 1),
                EventOutcome::Missed => self.negated_apart.update(Counter::Fn, 1),
                EventOutcome::Uncounted => {}
            }
        }
        let spurious = events
            .system_matched
            .iter()
            .zip(system_events.iter())
            .filter(|(matched, event)| !**matched && !event.is_empty())
            .count();
        self.negated_apart.update(Counter::Fp, spurious as u64);
    }

    /// Percentages of the classic table.
    pub fn scores(&self, exact: bool) -> StarsemScores {
        let row = |score: &Score, gold: u64, system: u64, b: Option<u64>| {
            StarsemRow::new(score, gold, system, b, exact)
        };
        let (g, p) = (&self.gold, &self.system);
        let mut scopes_apart = row(&self.scope_apart, g.scopes, p.scopes, None);
        if exact {
            scopes_apart.tp = self.scope.tp();
        }
        let percent_error = ratio(self.error_sentences, self.sentences) * 100.0;
        let percent_error_negation =
            ratio(self.error_negation_sentences, self.negation_sentences) * 100.0;
        StarsemScores {
            cues: row(&self.cue, g.cues, p.cues, None),
            scopes: row(&self.scope, g.scopes, p.scopes, None),
            scopes_apart,
            scope_tokens: row(&self.scope_tokens, g.scope_tokens, p.scope_tokens, None),
            negated_apart: row(&self.negated_apart, g.negated, p.negated, None),
            full: row(&self.full, g.cues, p.cues, None),
            cues_b: row(&self.cue, g.cues, p.cues, Some(p.cues)),
            scopes_b: row(&self.scope, g.scopes, p.scopes, Some(p.scopes)),
            scopes_apart_b: row(&self.scope_apart, g.scopes, p.scopes, Some(p.scopes)),
            negated_apart_b: row(&self.negated_apart, g.negated, p.negated, Some(p.negated)),
            full_b: row(&self.full, g.cues, p.cues, Some(p.cues)),
            sentences: self.sentences,
            negation_sentences: self.negation_sentences,
            negation_sentences_with_errors: self.error_negation_sentences,
            percent_correct_sentences: 100.0 - percent_error,
            percent_correct_negation_sentences: 100.0 - percent_error_negation,
        }
    }
}

/// Two decimals, ties to even, taken on the exact decimal expansion of `value`: `0.125` rounds
/// down and `12.345` (slightly above the tie in binary) rounds up.
fn round_to_hundredths(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// One row of the classic table. Percentages are in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StarsemRow {
    pub gold: u64,
    pub system: u64,
    pub tp: u64,
    pub fp: u64,
    #[serde(rename = "fn")]
    pub fn_: u64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl StarsemRow {
    /// With `b_denominator`, precision is the tp share of the given system count (B-precision).
    fn new(score: &Score, gold: u64, system: u64, b_denominator: Option<u64>, exact: bool) -> Self {
        let (tp, fp, fn_) = (score.tp(), score.fp(false), score.false_negatives());
        let precision = match b_denominator {
            Some(denominator) => ratio(tp, denominator),
            None => ratio(tp, tp + fp),
        } * 100.0;
        let recall = ratio(tp, tp + fn_) * 100.0;
        let f1 = if exact {
            f1(round_to_hundredths(precision), round_to_hundredths(recall))
        } else {
            f1(precision, recall)
        };
        Self {
            gold,
            system,
            tp,
            fp,
            fn_,
            precision,
            recall,
            f1,
        }
    }
}

/// Everything printed by the classic table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StarsemScores {
    pub cues: StarsemRow,
    pub scopes: StarsemRow,
    pub scopes_apart: StarsemRow,
    pub scope_tokens: StarsemRow,
    pub negated_apart: StarsemRow,
    pub full: StarsemRow,
    pub cues_b: StarsemRow,
    pub scopes_b: StarsemRow,
    pub scopes_apart_b: StarsemRow,
    pub negated_apart_b: StarsemRow,
    pub full_b: StarsemRow,
    pub sentences: u64,
    pub negation_sentences: u64,
    pub negation_sentences_with_errors: u64,
    pub percent_correct_sentences: f64,
    pub percent_correct_negation_sentences: f64,
}

/// True when a token with this part of speech can be part of a scope.
fn scope_pos(pos: &str) -> bool {
    pos.chars().any(|c| c.is_alphanumeric() || c == '_') && pos != "-LRB-" && pos != "-RRB-"
}

/// `Mr.` becomes `Mr` and `U.S.` becomes `U`; anything else is kept.
fn strip_abbreviation(fragment: &str) -> &str {
    let word_end = fragment
        .char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
        .map_or(fragment.len(), |(i, _)| i);
    if word_end > 0 && fragment[word_end..].starts_with('.') {
        &fragment[..word_end]
    } else {
        fragment
    }
}

/// Instances of `sentence` with their scope filtered on the parts of speech of `tagged`.
pub fn classic_instances(
    sentence: &Sentence<'_>,
    tagged: &Sentence<'_>,
) -> Result<Vec<NegationInstance>, InstanceError> {
    let instances = extract_instances(sentence, Normalization::Raw)?;
    Ok(instances
        .into_iter()
        .map(|instance| {
            let scope = instance
                .scope()
                .iter()
                .filter(|f| tagged.token(f.index).is_some_and(|t| scope_pos(t.pos())))
                .map(|f| Fragment::new(f.index, strip_abbreviation(&f.text)))
                .collect();
            NegationInstance::new(
                instance.id(),
                instance.cue().to_vec(),
                scope,
                instance.event().to_vec(),
                instance.affix_cue(),
            )
        })
        .collect())
}

/// Scorer of the classic mode. Parts of speech are always read from the gold sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StarsemScorer {
    pub exact: bool,
}

impl StarsemScorer {
    pub fn new(exact: bool) -> Self {
        Self { exact }
    }
}

impl SentenceScorer for StarsemScorer {
    type Tally = StarsemTally;

    fn score_sentence(
        &self,
        pair: &SentencePair<'_>,
        tally: &mut Self::Tally,
    ) -> Result<(), EvaluationError> {
        let gold = classic_instances(&pair.gold, &pair.gold)?;
        let system = classic_instances(&pair.system, &pair.gold)?;
        log::trace!(
            "sentence at line {}: {} gold and {} system instances",
            pair.gold.first_line(),
            gold.len(),
            system.len()
        );
        tally.add_sentence(&gold, &system, self.exact);
        Ok(())
    }
}
