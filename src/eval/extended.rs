/*!
The extended *SEM evaluation. Instances are paired by cue overlap, and every pair is scored on the
token level and on the instance level, with and without punctuation. The full-cue variants only
credit a pair whose cues are identical, while the partial-cue variants credit any pair.

The "no cue" variants and the binary label variants do not use the pairing: all the fragments of
a role are pooled per sentence and matched on their own.
*/
use super::{EvaluationError, SentenceScorer};
use crate::corpus::{Role, SentencePair};
use crate::instance::{extract_instances, Fragment, NegationInstance, Normalization};
use crate::matching::match_overlapping_cues;
use crate::metrics::{ratio, Category, Counter, Detail, Level, Metric, MetricTable};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Sentence level counts. A sentence is correct when every one of its instances is fully correct;
/// the `_no_punct` twins ignore punctuation errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SentenceStats {
    pub sentences: u64,
    pub correct_sentences: u64,
    pub correct_sentences_no_punct: u64,
    /// Sentences with at least one gold instance.
    pub negation_sentences: u64,
    pub correct_negation_sentences: u64,
    pub correct_negation_sentences_no_punct: u64,
}

impl SentenceStats {
    pub fn sentences_with_errors(&self, no_punct: bool) -> u64 {
        let correct = if no_punct {
            self.correct_sentences_no_punct
        } else {
            self.correct_sentences
        };
        self.sentences - correct
    }

    pub fn negation_sentences_with_errors(&self, no_punct: bool) -> u64 {
        let correct = if no_punct {
            self.correct_negation_sentences_no_punct
        } else {
            self.correct_negation_sentences
        };
        self.negation_sentences - correct
    }

    /// Percentage of correct sentences, 0 for an empty corpus.
    pub fn percent_correct(&self, no_punct: bool) -> f64 {
        let correct = self.sentences - self.sentences_with_errors(no_punct);
        ratio(correct, self.sentences) * 100.0
    }

    /// Percentage of correct sentences among the negation sentences, 0 when there is none.
    pub fn percent_correct_negation(&self, no_punct: bool) -> f64 {
        let correct = self.negation_sentences - self.negation_sentences_with_errors(no_punct);
        ratio(correct, self.negation_sentences) * 100.0
    }

    fn mark_correct(&mut self, correct: [bool; 2]) {
        if correct[0] {
            self.correct_sentences += 1;
            self.correct_negation_sentences += 1;
        }
        if correct[1] {
            self.correct_sentences_no_punct += 1;
            self.correct_negation_sentences_no_punct += 1;
        }
    }
}

impl AddAssign for SentenceStats {
    fn add_assign(&mut self, rhs: Self) {
        self.sentences += rhs.sentences;
        self.correct_sentences += rhs.correct_sentences;
        self.correct_sentences_no_punct += rhs.correct_sentences_no_punct;
        self.negation_sentences += rhs.negation_sentences;
        self.correct_negation_sentences += rhs.correct_negation_sentences;
        self.correct_negation_sentences_no_punct += rhs.correct_negation_sentences_no_punct;
    }
}

/// Accumulator of an extended run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedTally {
    pub table: MetricTable,
    pub stats: SentenceStats,
}

impl AddAssign for ExtendedTally {
    fn add_assign(&mut self, rhs: Self) {
        self.table += rhs.table;
        self.stats += rhs.stats;
    }
}

/// First-match-wins pool: items are marked as used instead of being removed.
struct Pool<T> {
    items: Vec<T>,
    used: Vec<bool>,
}

impl<T> Pool<T> {
    fn new(items: Vec<T>) -> Self {
        let used = vec![false; items.len()];
        Self { items, used }
    }

    /// Marks the first free item accepted by `accept` as used.
    fn take<F: FnMut(&T) -> bool>(&mut self, mut accept: F) -> bool {
        let found = (0..self.items.len()).find(|&i| !self.used[i] && accept(&self.items[i]));
        if let Some(i) = found {
            self.used[i] = true;
        }
        found.is_some()
    }

    fn push(&mut self, item: T) {
        self.items.push(item);
        self.used.push(false);
    }

    fn remaining(&self) -> impl Iterator<Item = &T> + '_ {
        self.items
            .iter()
            .zip(self.used.iter())
            .filter(|(_, used)| !**used)
            .map(|(item, _)| item)
    }
}

const ROLES: [Role; 3] = [Role::Cue, Role::Scope, Role::Event];

fn category_of(role: Role) -> Category {
    match role {
        Role::Cue => Category::Cue,
        Role::Scope => Category::Scope,
        Role::Event => Category::Event,
    }
}

/// Token-level and instance-level metrics of the pooled scoring of `role`.
fn pooled_metrics(role: Role) -> (Metric, Metric) {
    match role {
        Role::Cue => (Metric::TokenCue, Metric::InstanceCue),
        Role::Scope => (Metric::TokenScopeNoCue, Metric::InstanceScopeNoCue),
        Role::Event => (Metric::TokenEventNoCue, Metric::InstanceEventNoCue),
    }
}

fn indices(fragments: &[Fragment]) -> Vec<usize> {
    fragments.iter().map(|f| f.index).collect()
}

/// Adds `counter` to every cue-dependent metric an unpaired instance takes part in: one per
/// scope and event token, one per non-empty scope and event, one for the full instance. On the
/// instance level a false positive also counts as one that does not intersect a false negative.
fn update_all(table: &mut MetricTable, counter: Counter, instance: &NegationInstance) {
    let credit = |table: &mut MetricTable, metric: Metric| {
        table.update(metric, counter, 1);
        if counter == Counter::Fp {
            table.update(metric, Counter::FpNoFn, 1);
        }
    };
    for role in [Role::Scope, Role::Event] {
        let category = category_of(role);
        let fragments = instance.fragments(role);
        for fragment in fragments {
            for metric in Metric::cue_dependent_of(Level::Token, category) {
                if metric.excludes_punct() && fragment.is_punctuation() {
                    continue;
                }
                table.update(metric, counter, 1);
            }
        }
        if !fragments.is_empty() {
            for metric in Metric::cue_dependent_of(Level::Instance, category) {
                credit(table, metric);
            }
        }
    }
    for metric in Metric::cue_dependent_of(Level::Instance, Category::Full) {
        credit(table, metric);
    }
}

/// Compares the fragments of one role for a cue-matched pair and returns whether the system
/// fragments are exactly right, with and without punctuation.
fn compare_role(
    table: &mut MetricTable,
    gold: &[Fragment],
    system: &[Fragment],
    category: Category,
    full_cue: bool,
) -> (bool, bool) {
    if gold.is_empty() && system.is_empty() {
        return (true, true);
    }
    let token_metrics: Vec<Metric> = Metric::cue_dependent_of(Level::Token, category).collect();
    let mut all = true;
    let mut no_punct = true;
    let mut pool = Pool::new(system.iter().collect::<Vec<_>>());
    for fragment in gold {
        let punct = fragment.is_punctuation();
        let found = pool.take(|s| *s == fragment);
        if !found {
            all = false;
            no_punct &= punct;
        }
        for &metric in token_metrics.iter() {
            if metric.excludes_punct() && punct {
                continue;
            }
            if !found {
                table.update(metric, Counter::Fn, 1);
            } else if metric.detail() == Detail::FullCue && !full_cue {
                table.update(metric, Counter::Fp, 1);
                table.update(metric, Counter::Fn, 1);
            } else {
                table.update(metric, Counter::Tp, 1);
            }
        }
    }
    for fragment in pool.remaining() {
        let punct = fragment.is_punctuation();
        all = false;
        no_punct &= punct;
        let intersects_gold = gold.iter().any(|g| g.index == fragment.index);
        for &metric in token_metrics.iter() {
            if metric.excludes_punct() && punct {
                continue;
            }
            table.update(metric, Counter::Fp, 1);
            if !intersects_gold {
                table.update(metric, Counter::FpNoFn, 1);
            }
        }
    }
    for metric in Metric::cue_dependent_of(Level::Instance, category) {
        let correct = if metric.detail() == Detail::FullCue && !full_cue {
            false
        } else if metric.excludes_punct() {
            no_punct
        } else {
            all
        };
        if correct {
            table.update(metric, Counter::Tp, 1);
            continue;
        }
        if !gold.is_empty() {
            table.update(metric, Counter::Fn, 1);
        }
        if !system.is_empty() {
            table.update(metric, Counter::Fp, 1);
        }
        if gold.is_empty() {
            table.update(metric, Counter::FpNoFn, 1);
        }
    }
    (all, no_punct)
}

/// Scores the cue, the "no cue" and the binary label metrics, which pool the fragments of every
/// instance of the sentence.
fn score_pooled(
    table: &mut MetricTable,
    gold: &[NegationInstance],
    system: &[NegationInstance],
    exact: bool,
) {
    let mut tokens: Vec<Pool<&Fragment>> = ROLES
        .iter()
        .map(|&role| Pool::new(system.iter().flat_map(|s| s.fragments(role)).collect()))
        .collect();
    let mut lists: Vec<Pool<&[Fragment]>> = ROLES
        .iter()
        .map(|&role| {
            Pool::new(
                system
                    .iter()
                    .map(|s| s.fragments(role))
                    .filter(|f| !f.is_empty())
                    .collect(),
            )
        })
        .collect();
    let mut no_punct_lists: Pool<&[Fragment]> = Pool::new(
        system
            .iter()
            .filter(|s| !s.scope().is_empty())
            .map(NegationInstance::scope_no_punct)
            .collect(),
    );
    let mut missed: Vec<Pool<Vec<usize>>> =
        ROLES.iter().map(|_| Pool::new(Vec::new())).collect();
    let mut missed_no_punct: Vec<Vec<usize>> = Vec::new();

    for instance in gold {
        for (r, &role) in ROLES.iter().enumerate() {
            let fragments = instance.fragments(role);
            if fragments.is_empty() {
                continue;
            }
            let (token_metric, instance_metric) = pooled_metrics(role);
            for fragment in fragments {
                let counter = if tokens[r].take(|s| *s == fragment) {
                    Counter::Tp
                } else {
                    Counter::Fn
                };
                table.update(token_metric, counter, 1);
                if role == Role::Scope && !fragment.is_punctuation() {
                    table.update(Metric::TokenScopeNoCueNoPunct, counter, 1);
                }
            }
            if lists[r].take(|s| *s == fragments) {
                table.update(instance_metric, Counter::Tp, 1);
            } else {
                table.update(instance_metric, Counter::Fn, 1);
                missed[r].push(indices(fragments));
            }
            if role == Role::Scope {
                let no_punct = instance.scope_no_punct();
                if no_punct_lists.take(|s| *s == no_punct) {
                    table.update(Metric::InstanceScopeNoCueNoPunct, Counter::Tp, 1);
                } else {
                    table.update(Metric::InstanceScopeNoCueNoPunct, Counter::Fn, 1);
                    missed_no_punct.push(indices(no_punct));
                }
            }
        }
    }

    for (r, &role) in ROLES.iter().enumerate() {
        let (token_metric, instance_metric) = pooled_metrics(role);
        for fragment in tokens[r].remaining() {
            table.update(token_metric, Counter::Fp, 1);
            if role == Role::Scope && !fragment.is_punctuation() {
                table.update(Metric::TokenScopeNoCueNoPunct, Counter::Fp, 1);
            }
        }
        for fragments in lists[r].remaining() {
            table.update(instance_metric, Counter::Fp, 1);
            // a leftover that overlaps a missed gold list is a boundary error
            let boundary_error = fragments
                .iter()
                .any(|f| missed[r].take(|ids| ids.contains(&f.index)));
            if !boundary_error {
                table.update(instance_metric, Counter::FpNoFn, 1);
            }
        }
    }

    let mut missed_no_punct = Pool::new(missed_no_punct);
    for fragments in no_punct_lists.remaining() {
        table.update(Metric::InstanceScopeNoCueNoPunct, Counter::Fp, 1);
        let boundary_error = fragments
            .iter()
            .any(|f| missed_no_punct.take(|ids| ids.contains(&f.index)));
        if !boundary_error {
            // the historical scorer credits this one to the event row
            let metric = if exact {
                Metric::InstanceEventNoCue
            } else {
                Metric::InstanceScopeNoCueNoPunct
            };
            table.update(metric, Counter::FpNoFn, 1);
        }
    }

    score_binary_labels(table, gold, system);
}

/// Token sets of the whole sentence, whatever the instance the tokens belong to.
fn score_binary_labels(
    table: &mut MetricTable,
    gold: &[NegationInstance],
    system: &[NegationInstance],
) {
    for (role, metric) in [
        (Role::Scope, Metric::TokenScopeBinary),
        (Role::Event, Metric::TokenEventBinary),
    ] {
        let gold_set: AHashSet<&Fragment> = gold.iter().flat_map(|g| g.fragments(role)).collect();
        let mut system_set: AHashSet<&Fragment> =
            system.iter().flat_map(|s| s.fragments(role)).collect();
        let update = |table: &mut MetricTable, fragment: &Fragment, counter: Counter| {
            table.update(metric, counter, 1);
            if role == Role::Scope && !fragment.is_punctuation() {
                table.update(Metric::TokenScopeBinaryNoPunct, counter, 1);
            }
        };
        for fragment in gold_set {
            let counter = if system_set.remove(fragment) {
                Counter::Tp
            } else {
                Counter::Fn
            };
            update(table, fragment, counter);
        }
        for fragment in system_set {
            update(table, fragment, Counter::Fp);
        }
    }
}

impl ExtendedTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scores the instances of one sentence. `exact` reproduces the historical scorer: an unpaired
    /// gold instance does not make the sentence incorrect, and a spurious scope without
    /// punctuation is counted on the event row.
    pub fn add_sentence(
        &mut self,
        gold: &[NegationInstance],
        system: &[NegationInstance],
        exact: bool,
    ) {
        self.stats.sentences += 1;
        if gold.is_empty() && system.is_empty() {
            self.stats.correct_sentences += 1;
            self.stats.correct_sentences_no_punct += 1;
            return;
        }
        if !gold.is_empty() {
            self.stats.negation_sentences += 1;
        }
        score_pooled(&mut self.table, gold, system, exact);
        if system.is_empty() {
            gold.iter()
                .for_each(|g| update_all(&mut self.table, Counter::Fn, g));
            return;
        }
        if gold.is_empty() {
            system
                .iter()
                .for_each(|s| update_all(&mut self.table, Counter::Fp, s));
            return;
        }

        let mut correct = [true, true];
        let matching = match_overlapping_cues(gold, system);
        for (g, gold_instance) in gold.iter().enumerate() {
            let Some(pair) = matching.for_gold(g) else {
                update_all(&mut self.table, Counter::Fn, gold_instance);
                if !exact {
                    correct = [false, false];
                }
                continue;
            };
            let system_instance = &system[pair.system];
            let mut full = [pair.full_cue_match, true];
            for role in [Role::Scope, Role::Event] {
                let (all, no_punct) = compare_role(
                    &mut self.table,
                    gold_instance.fragments(role),
                    system_instance.fragments(role),
                    category_of(role),
                    pair.full_cue_match,
                );
                full[0] &= all;
                full[1] &= no_punct;
            }
            for (d, metric) in [Metric::FullInstance, Metric::FullInstanceNoPunct]
                .into_iter()
                .enumerate()
            {
                if full[d] {
                    self.table.update(metric, Counter::Tp, 1);
                } else {
                    correct[d] = false;
                    self.table.update(metric, Counter::Fn, 1);
                    self.table.update(metric, Counter::Fp, 1);
                }
            }
        }
        for s in matching.unmatched_system() {
            correct = [false, false];
            update_all(&mut self.table, Counter::Fp, &system[s]);
        }
        self.stats.mark_correct(correct);
    }
}

/// Scorer of the extended mode. Scope and event fragments lose their trailing dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtendedScorer {
    pub exact: bool,
}

impl ExtendedScorer {
    pub fn new(exact: bool) -> Self {
        Self { exact }
    }
}

impl SentenceScorer for ExtendedScorer {
    type Tally = ExtendedTally;

    fn score_sentence(
        &self,
        pair: &SentencePair<'_>,
        tally: &mut Self::Tally,
    ) -> Result<(), EvaluationError> {
        let gold = extract_instances(&pair.gold, Normalization::TrailingDot)?;
        let system = extract_instances(&pair.system, Normalization::TrailingDot)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::tests::ArbitraryInstances;
    use crate::metrics::Score;
    use quickcheck::QuickCheck;
    use rstest::rstest;

    fn fragments(pairs: &[(usize, &str)]) -> Vec<Fragment> {
        pairs.iter().map(|(i, t)| Fragment::new(*i, *t)).collect()
    }

    fn instance(
        cue: &[(usize, &str)],
        scope: &[(usize, &str)],
        event: &[(usize, &str)],
    ) -> NegationInstance {
        NegationInstance::new(0, fragments(cue), fragments(scope), fragments(event), false)
    }

    fn run(gold: &[NegationInstance], system: &[NegationInstance], exact: bool) -> ExtendedTally {
        let mut tally = ExtendedTally::new();
        tally.add_sentence(gold, system, exact);
        tally
    }

    #[test]
    fn test_sentence_without_negation() {
        let tally = run(&[], &[], false);
        assert_eq!(tally.table, MetricTable::new());
        assert_eq!(tally.stats.sentences, 1);
        assert_eq!(tally.stats.correct_sentences, 1);
        assert_eq!(tally.stats.correct_sentences_no_punct, 1);
        assert_eq!(tally.stats.negation_sentences, 0);
    }

    #[test]
    fn test_perfect_instance() {
        let gold = vec![instance(&[(3, "not")], &[(4, "happy")], &[])];
        let tally = run(&gold, &gold, false);
        for metric in [
            Metric::TokenCue,
            Metric::InstanceCue,
            Metric::TokenScopeFullCue,
            Metric::TokenScopeNoCue,
            Metric::TokenScopeBinary,
            Metric::InstanceScopeFullCue,
            Metric::InstanceScopePartialCue,
            Metric::InstanceScopeNoCue,
            Metric::FullInstance,
            Metric::FullInstanceNoPunct,
        ] {
            assert_eq!(tally.table.score(metric), Score::new(1, 0, 0, 0), "{:?}", metric);
        }
        assert_eq!(tally.table.score(Metric::InstanceEventFullCue), Score::default());
        assert_eq!(tally.stats.correct_negation_sentences, 1);
    }

    #[test]
    fn test_extra_scope_token() {
        let scope = [(0, "He"), (1, "was"), (4, "home"), (5, "that"), (6, "day")];
        let mut longer = scope.to_vec();
        longer.push((7, "again"));
        let gold = vec![instance(&[(3, "not")], &scope, &[])];
        let system = vec![instance(&[(3, "not")], &longer, &[])];
        let tally = run(&gold, &system, false);
        assert_eq!(tally.table.score(Metric::TokenScopeFullCue), Score::new(5, 1, 1, 0));
        assert_eq!(tally.table.score(Metric::TokenScopeNoCue), Score::new(5, 1, 0, 0));
        assert_eq!(tally.table.score(Metric::InstanceScopeFullCue), Score::new(0, 1, 0, 1));
        assert_eq!(tally.table.score(Metric::InstanceScopeNoCue), Score::new(0, 1, 0, 1));
        assert_eq!(tally.table.score(Metric::FullInstance), Score::new(0, 1, 0, 1));
        assert_eq!(tally.stats.correct_sentences, 0);
    }

    #[test]
    fn test_partial_cue() {
        let scope = [(0, "Neither"), (1, "he"), (5, "she"), (6, "came")];
        let gold = vec![instance(&[(0, "Neither"), (4, "nor")], &scope[1..], &[])];
        let system = vec![instance(&[(4, "nor")], &scope[1..], &[])];
        let tally = run(&gold, &system, false);
        assert_eq!(tally.table.score(Metric::TokenCue), Score::new(1, 0, 0, 1));
        assert_eq!(tally.table.score(Metric::InstanceCue), Score::new(0, 1, 0, 1));
        assert_eq!(tally.table.score(Metric::TokenScopeFullCue), Score::new(0, 3, 0, 3));
        assert_eq!(tally.table.score(Metric::TokenScopePartialCue), Score::new(3, 0, 0, 0));
        assert_eq!(tally.table.score(Metric::InstanceScopeFullCue), Score::new(0, 1, 0, 1));
        assert_eq!(tally.table.score(Metric::InstanceScopePartialCue), Score::new(1, 0, 0, 0));
        assert_eq!(tally.table.score(Metric::FullInstance), Score::new(0, 1, 0, 1));
        // punctuation-free full correctness does not look at the cue
        assert_eq!(tally.table.score(Metric::FullInstanceNoPunct), Score::new(1, 0, 0, 0));
        assert_eq!(tally.stats.correct_sentences, 0);
        assert_eq!(tally.stats.correct_sentences_no_punct, 1);
    }

    #[test]
    fn test_punctuation_errors() {
        let gold = vec![instance(&[(3, "not")], &[(4, "happy"), (5, ",")], &[])];
        let system = vec![instance(&[(3, "not")], &[(4, "happy")], &[])];
        let tally = run(&gold, &system, false);
        assert_eq!(tally.table.score(Metric::TokenScopeFullCue), Score::new(1, 0, 0, 1));
        assert_eq!(tally.table.score(Metric::TokenScopeFullCueNoPunct), Score::new(1, 0, 0, 0));
        assert_eq!(tally.table.score(Metric::InstanceScopeFullCue), Score::new(0, 1, 0, 1));
        assert_eq!(tally.table.score(Metric::InstanceScopeFullCueNoPunct), Score::new(1, 0, 0, 0));
        assert_eq!(tally.table.score(Metric::InstanceScopeNoCueNoPunct), Score::new(1, 0, 0, 0));
        assert_eq!(tally.table.score(Metric::TokenScopeBinaryNoPunct), Score::new(1, 0, 0, 0));
        assert_eq!(tally.table.score(Metric::TokenScopeBinary), Score::new(1, 0, 0, 1));
        assert_eq!(tally.stats.correct_sentences, 0);
        assert_eq!(tally.stats.correct_sentences_no_punct, 1);
    }

    #[test]
    fn test_missed_instance() {
        let gold = vec![instance(&[(3, "not")], &[(4, "happy"), (5, ".")], &[(4, "happy")])];
        let tally = run(&gold, &[], false);
        assert_eq!(tally.table.score(Metric::TokenScopeFullCue), Score::new(0, 0, 0, 2));
        assert_eq!(tally.table.score(Metric::TokenScopeFullCueNoPunct), Score::new(0, 0, 0, 1));
        assert_eq!(tally.table.score(Metric::TokenEventPartialCue), Score::new(0, 0, 0, 1));
        assert_eq!(tally.table.score(Metric::InstanceEventFullCue), Score::new(0, 0, 0, 1));
        assert_eq!(tally.table.score(Metric::InstanceScopeNoCue), Score::new(0, 0, 0, 1));
        assert_eq!(tally.table.score(Metric::FullInstance), Score::new(0, 0, 0, 1));
        assert_eq!(tally.table.total(Counter::Fp), 0);
        assert_eq!(tally.stats.negation_sentences, 1);
        assert_eq!(tally.stats.correct_negation_sentences, 0);
    }

    #[test]
    fn test_spurious_instance() {
        let system = vec![instance(&[(3, "not")], &[(4, "happy")], &[])];
        let tally = run(&[], &system, false);
        assert_eq!(tally.table.score(Metric::TokenScopeFullCue), Score::new(0, 1, 0, 0));
        assert_eq!(tally.table.score(Metric::InstanceScopeFullCue), Score::new(0, 1, 1, 0));
        assert_eq!(tally.table.score(Metric::InstanceScopeNoCue), Score::new(0, 1, 1, 0));
        assert_eq!(tally.table.score(Metric::InstanceCue), Score::new(0, 1, 1, 0));
        assert_eq!(tally.table.score(Metric::FullInstance), Score::new(0, 1, 1, 0));
        assert_eq!(tally.table.total(Counter::Fn), 0);
        assert_eq!(tally.stats.negation_sentences, 0);
        assert_eq!(tally.stats.correct_sentences, 0);
    }

    #[rstest]
    #[case(false, 1, 0)]
    #[case(true, 0, 1)]
    fn test_spurious_scope_without_punctuation(
        #[case] exact: bool,
        #[case] scope_row: u64,
        #[case] event_row: u64,
    ) {
        let system = vec![instance(&[(3, "not")], &[(4, "happy")], &[])];
        let tally = run(&[], &system, exact);
        assert_eq!(
            tally.table.get(Metric::InstanceScopeNoCueNoPunct, Counter::FpNoFn),
            scope_row
        );
        assert_eq!(tally.table.get(Metric::InstanceEventNoCue, Counter::FpNoFn), event_row);
    }

    #[rstest]
    #[case(false, 0)]
    #[case(true, 1)]
    fn test_unpaired_gold_and_sentence_correctness(#[case] exact: bool, #[case] correct: u64) {
        let gold = vec![
            instance(&[(3, "not")], &[(4, "happy")], &[]),
            instance(&[(7, "never")], &[(8, "again")], &[]),
        ];
        let system = vec![instance(&[(3, "not")], &[(4, "happy")], &[])];
        let tally = run(&gold, &system, exact);
        assert_eq!(tally.table.score(Metric::FullInstance), Score::new(1, 0, 0, 1));
        assert_eq!(tally.stats.correct_sentences, correct);
        assert_eq!(tally.stats.correct_negation_sentences, correct);
    }

    #[test]
    fn test_boundary_error_is_not_counted_without_fn() {
        let gold = vec![instance(&[(3, "not")], &[(4, "very"), (5, "happy")], &[])];
        let system = vec![
            instance(&[(3, "not")], &[(5, "happy")], &[]),
            instance(&[(9, "no")], &[(10, "way")], &[]),
        ];
        let tally = run(&gold, &system, false);
        // one boundary error and one spurious scope
        assert_eq!(tally.table.score(Metric::InstanceScopeNoCue), Score::new(0, 2, 1, 1));
    }

    #[test]
    fn test_event_scoring() {
        let gold = vec![instance(&[(3, "not")], &[], &[(4, "like")])];
        let system = vec![instance(&[(3, "not")], &[], &[(4, "like"), (5, "it")])];
        let tally = run(&gold, &system, false);
        assert_eq!(tally.table.score(Metric::TokenEventFullCue), Score::new(1, 1, 1, 0));
        assert_eq!(tally.table.score(Metric::InstanceEventFullCue), Score::new(0, 1, 0, 1));
        assert_eq!(tally.table.score(Metric::TokenEventBinary), Score::new(1, 1, 0, 0));
        assert_eq!(tally.table.score(Metric::InstanceScopeFullCue), Score::default());
    }

    #[test]
    fn test_sentence_stats_percentages() {
        let mut tally = ExtendedTally::new();
        let gold = vec![instance(&[(3, "not")], &[(4, "happy")], &[])];
        tally.add_sentence(&gold, &gold, false);
        tally.add_sentence(&gold, &[], false);
        tally.add_sentence(&[], &[], false);
        tally.add_sentence(&[], &gold, false);
        let stats = tally.stats;
        assert_eq!(stats.sentences, 4);
        assert_eq!(stats.sentences_with_errors(false), 2);
        assert_eq!(stats.percent_correct(false), 50.0);
        assert_eq!(stats.negation_sentences, 2);
        assert_eq!(stats.negation_sentences_with_errors(true), 1);
        assert_eq!(stats.percent_correct_negation(true), 50.0);
        assert_eq!(SentenceStats::default().percent_correct_negation(false), 0.0);
        assert_eq!(SentenceStats::default().percent_correct(false), 0.0);
    }

    #[test]
    fn test_property_perfect_prediction_has_no_error() {
        fn perfect(gold: ArbitraryInstances) -> bool {
            let tally = run(&gold.0, &gold.0, false);
            tally.table.total(Counter::Fp) == 0
                && tally.table.total(Counter::Fn) == 0
                && tally.table.total(Counter::FpNoFn) == 0
                && tally.stats.correct_sentences == 1
        }
        QuickCheck::new()
            .tests(1000)
            .quickcheck(perfect as fn(ArbitraryInstances) -> bool)
    }

    #[test]
    fn test_property_instance_counts() {
        fn counts(gold: ArbitraryInstances, system: ArbitraryInstances, exact: bool) -> bool {
            let tally = run(&gold.0, &system.0, exact);
            [Metric::FullInstance, Metric::InstanceCue].iter().all(|&metric| {
                let score = tally.table.score(metric);
                score.gold() == gold.0.len() as u64 && score.predicted() == system.0.len() as u64
            })
        }
        QuickCheck::new()
            .tests(1000)
            .quickcheck(counts as fn(ArbitraryInstances, ArbitraryInstances, bool) -> bool)
    }
}
