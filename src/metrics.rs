/*!
Counters and metric keys. Every metric reported by the extended evaluation is a variant of
`Metric`, so the table of scores is fixed at compile time. The counters of all the metrics are
stored together in a single two dimensional array (metric × counter), which makes merging the
tallies of independent workers a single element-wise addition.
*/
use enum_iterator::{all, cardinality, Sequence};
use ndarray::Array2;
use num::{Float, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::ops::{Add, AddAssign};

/// Granularity of a metric: single tokens or whole instances.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Sequence, Serialize, Deserialize,
)]
pub enum Level {
    Token,
    Instance,
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token => write!(f, "Token-level"),
            Self::Instance => write!(f, "Scope-level"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Sequence, Serialize, Deserialize,
)]
pub enum Category {
    Cue,
    Scope,
    Event,
    /// The whole instance (cue, scope and event) must be right.
    Full,
}

/// How the owning cue is taken into account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Sequence, Serialize, Deserialize,
)]
pub enum Detail {
    Plain,
    /// Credit only when the cue is fully correct.
    FullCue,
    /// Credit when the cue overlaps.
    PartialCue,
    /// Scored without looking at the cue.
    NoCue,
    /// Tokens are pooled per sentence, whatever the instance they belong to.
    BinaryLabels,
}

/// The keys of the metric table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Sequence, Serialize, Deserialize,
)]
pub enum Metric {
    TokenCue,
    TokenScopeFullCue,
    TokenScopePartialCue,
    TokenScopeNoCue,
    TokenScopeBinary,
    TokenScopeFullCueNoPunct,
    TokenScopePartialCueNoPunct,
    TokenScopeNoCueNoPunct,
    TokenScopeBinaryNoPunct,
    TokenEventFullCue,
    TokenEventPartialCue,
    TokenEventNoCue,
    TokenEventBinary,
    InstanceCue,
    InstanceScopeFullCue,
    InstanceScopePartialCue,
    InstanceScopeNoCue,
    InstanceScopeFullCueNoPunct,
    InstanceScopePartialCueNoPunct,
    InstanceScopeNoCueNoPunct,
    InstanceEventFullCue,
    InstanceEventPartialCue,
    InstanceEventNoCue,
    FullInstance,
    FullInstanceNoPunct,
}

impl Metric {
    pub const fn level(self) -> Level {
        match self {
            Self::TokenCue
            | Self::TokenScopeFullCue
            | Self::TokenScopePartialCue
            | Self::TokenScopeNoCue
            | Self::TokenScopeBinary
            | Self::TokenScopeFullCueNoPunct
            | Self::TokenScopePartialCueNoPunct
            | Self::TokenScopeNoCueNoPunct
            | Self::TokenScopeBinaryNoPunct
            | Self::TokenEventFullCue
            | Self::TokenEventPartialCue
            | Self::TokenEventNoCue
            | Self::TokenEventBinary => Level::Token,
            _ => Level::Instance,
        }
    }

    pub const fn category(self) -> Category {
        match self {
            Self::TokenCue | Self::InstanceCue => Category::Cue,
            Self::TokenScopeFullCue
            | Self::TokenScopePartialCue
            | Self::TokenScopeNoCue
            | Self::TokenScopeBinary
            | Self::TokenScopeFullCueNoPunct
            | Self::TokenScopePartialCueNoPunct
            | Self::TokenScopeNoCueNoPunct
            | Self::TokenScopeBinaryNoPunct
            | Self::InstanceScopeFullCue
            | Self::InstanceScopePartialCue
            | Self::InstanceScopeNoCue
            | Self::InstanceScopeFullCueNoPunct
            | Self::InstanceScopePartialCueNoPunct
            | Self::InstanceScopeNoCueNoPunct => Category::Scope,
            Self::TokenEventFullCue
            | Self::TokenEventPartialCue
            | Self::TokenEventNoCue
            | Self::TokenEventBinary
            | Self::InstanceEventFullCue
            | Self::InstanceEventPartialCue
            | Self::InstanceEventNoCue => Category::Event,
            Self::FullInstance | Self::FullInstanceNoPunct => Category::Full,
        }
    }

    pub const fn detail(self) -> Detail {
        match self {
            Self::TokenCue | Self::InstanceCue | Self::FullInstance | Self::FullInstanceNoPunct => {
                Detail::Plain
            }
            Self::TokenScopeFullCue
            | Self::TokenScopeFullCueNoPunct
            | Self::TokenEventFullCue
            | Self::InstanceScopeFullCue
            | Self::InstanceScopeFullCueNoPunct
            | Self::InstanceEventFullCue => Detail::FullCue,
            Self::TokenScopePartialCue
            | Self::TokenScopePartialCueNoPunct
            | Self::TokenEventPartialCue
            | Self::InstanceScopePartialCue
            | Self::InstanceScopePartialCueNoPunct
            | Self::InstanceEventPartialCue => Detail::PartialCue,
            Self::TokenScopeNoCue
            | Self::TokenScopeNoCueNoPunct
            | Self::TokenEventNoCue
            | Self::InstanceScopeNoCue
            | Self::InstanceScopeNoCueNoPunct
            | Self::InstanceEventNoCue => Detail::NoCue,
            Self::TokenScopeBinary | Self::TokenScopeBinaryNoPunct | Self::TokenEventBinary => {
                Detail::BinaryLabels
            }
        }
    }

    /// True for the variants that ignore punctuation tokens.
    pub const fn excludes_punct(self) -> bool {
        matches!(
            self,
            Self::TokenScopeFullCueNoPunct
                | Self::TokenScopePartialCueNoPunct
                | Self::TokenScopeNoCueNoPunct
                | Self::TokenScopeBinaryNoPunct
                | Self::InstanceScopeFullCueNoPunct
                | Self::InstanceScopePartialCueNoPunct
                | Self::InstanceScopeNoCueNoPunct
                | Self::FullInstanceNoPunct
        )
    }

    /// True for the variants whose credit depends on the matched cue.
    pub const fn cue_dependent(self) -> bool {
        matches!(self.detail(), Detail::FullCue | Detail::PartialCue)
            || matches!(self.category(), Category::Full)
    }

    /// The metrics of `level` and `category` that depend on the cue match, in table order.
    pub fn cue_dependent_of(level: Level, category: Category) -> impl Iterator<Item = Metric> {
        all::<Metric>()
            .filter(move |m| m.level() == level && m.category() == category && m.cue_dependent())
    }

    /// Row label, e.g. `Scope (partial cue, no punct)` or `Full negation`.
    pub fn label(self, task: &str) -> String {
        let category = match self.category() {
            Category::Cue => String::from("Cue"),
            Category::Scope => String::from("Scope"),
            Category::Event => String::from("Event"),
            Category::Full => format!("Full {}", task),
        };
        let detail = match self.detail() {
            Detail::Plain => "",
            Detail::FullCue => "full cue",
            Detail::PartialCue => "partial cue",
            Detail::NoCue => "no cue",
            Detail::BinaryLabels => "binary labels",
        };
        match (detail.is_empty(), self.excludes_punct()) {
            (true, false) => category,
            (true, true) => format!("{} (no punct)", category),
            (false, false) => format!("{} ({})", category, detail),
            (false, true) => format!("{} ({}, no punct)", category, detail),
        }
    }
}

/// The four counters kept for every metric.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Sequence, Serialize, Deserialize,
)]
pub enum Counter {
    Tp,
    Fp,
    /// False positives that do not overlap with any missed gold element.
    FpNoFn,
    Fn,
}

/// Divides, returning 0 when the denominator is 0.
pub(crate) fn ratio<N: ToPrimitive>(numerator: N, denominator: N) -> f64 {
    match (numerator.to_f64(), denominator.to_f64()) {
        (Some(n), Some(d)) if d != 0.0 => n / d,
        _ => 0.0,
    }
}

/// Harmonic mean of precision and recall, 0 when both are 0.
pub(crate) fn f1<F: Float>(precision: F, recall: F) -> F {
    let sum = precision + recall;
    if sum.is_zero() {
        F::zero()
    } else {
        (F::one() + F::one()) * precision * recall / sum
    }
}

/// Counters of one metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Score {
    tp: u64,
    fp: u64,
    fp_no_fn: u64,
    fn_: u64,
}

impl Score {
    pub fn new(tp: u64, fp: u64, fp_no_fn: u64, fn_: u64) -> Self {
        Self {
            tp,
            fp,
            fp_no_fn,
            fn_,
        }
    }
    pub fn update(&mut self, counter: Counter, amount: u64) {
        match counter {
            Counter::Tp => self.tp += amount,
            Counter::Fp => self.fp += amount,
            Counter::FpNoFn => self.fp_no_fn += amount,
            Counter::Fn => self.fn_ += amount,
        }
    }
    pub fn get(&self, counter: Counter) -> u64 {
        match counter {
            Counter::Tp => self.tp,
            Counter::Fp => self.fp,
            Counter::FpNoFn => self.fp_no_fn,
            Counter::Fn => self.fn_,
        }
    }
    /// Number of gold elements (`tp + fn`).
    pub fn gold(&self) -> u64 {
        self.tp + self.fn_
    }
    /// Number of predicted elements (`tp + fp`).
    pub fn predicted(&self) -> u64 {
        self.tp + self.fp
    }
    pub fn tp(&self) -> u64 {
        self.tp
    }
    /// False positives. With `no_fn`, only those that do not intersect a false negative.
    pub fn fp(&self, no_fn: bool) -> u64 {
        if no_fn {
            self.fp_no_fn
        } else {
            self.fp
        }
    }
    pub fn false_negatives(&self) -> u64 {
        self.fn_
    }
    pub fn precision(&self, no_fn: bool) -> f64 {
        ratio(self.tp, self.tp + self.fp(no_fn))
    }
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.gold())
    }
    pub fn f1(&self, no_fn: bool) -> f64 {
        f1(self.precision(no_fn), self.recall())
    }
}

impl AddAssign for Score {
    fn add_assign(&mut self, rhs: Self) {
        self.tp += rhs.tp;
        self.fp += rhs.fp;
        self.fp_no_fn += rhs.fp_no_fn;
        self.fn_ += rhs.fn_;
    }
}

/// The accumulator of an extended evaluation run: one `Score` per `Metric`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricTable {
    counts: Array2<u64>,
}

impl Default for MetricTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricTable {
    pub fn new() -> Self {
        Self {
            counts: Array2::zeros((cardinality::<Metric>(), cardinality::<Counter>())),
        }
    }

    /// Increments `counter` of `metric` by `amount`.
    #[inline]
    pub fn update(&mut self, metric: Metric, counter: Counter, amount: u64) {
        self.counts[[metric as usize, counter as usize]] += amount;
    }

    pub fn get(&self, metric: Metric, counter: Counter) -> u64 {
        self.counts[[metric as usize, counter as usize]]
    }

    pub fn score(&self, metric: Metric) -> Score {
        let mut score = Score::default();
        for counter in all::<Counter>() {
            score.update(counter, self.get(metric, counter));
        }
        score
    }

    /// Scores of every metric, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, Score)> + '_ {
        all::<Metric>().map(|m| (m, self.score(m)))
    }

    /// Adds the counters of `other` to `self`.
    pub fn merge(&mut self, other: &Self) {
        self.counts += &other.counts;
    }

    pub fn reset(&mut self) {
        self.counts.fill(0);
    }

    /// Sum of `counter` over all metrics. Zero for a table nothing was recorded in.
    pub fn total(&self, counter: Counter) -> u64 {
        self.counts.column(counter as usize).sum()
    }
}

impl AddAssign<&MetricTable> for MetricTable {
    fn add_assign(&mut self, rhs: &MetricTable) {
        self.merge(rhs)
    }
}

impl AddAssign for MetricTable {
    fn add_assign(&mut self, rhs: MetricTable) {
        self.merge(&rhs)
    }
}

impl Add for MetricTable {
    type Output = MetricTable;
    fn add(mut self, rhs: Self) -> Self::Output {
        self.merge(&rhs);
        self
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};
    use rstest::rstest;

    pub(crate) trait CloseEnough {
        fn are_close(&self, other: &Self, eps: f64) -> bool;
    }

    impl CloseEnough for f64 {
        fn are_close(&self, other: &Self, eps: f64) -> bool {
            f64::abs(self - other) < eps
        }
    }

    #[rstest]
    #[case(Metric::TokenCue, "Cue")]
    #[case(Metric::TokenScopeFullCue, "Scope (full cue)")]
    #[case(Metric::TokenScopeBinaryNoPunct, "Scope (binary labels, no punct)")]
    #[case(Metric::TokenEventNoCue, "Event (no cue)")]
    #[case(Metric::InstanceScopePartialCueNoPunct, "Scope (partial cue, no punct)")]
    #[case(Metric::FullInstance, "Full negation")]
    #[case(Metric::FullInstanceNoPunct, "Full negation (no punct)")]
    fn test_labels(#[case] metric: Metric, #[case] expected: &str) {
        assert_eq!(metric.label("negation"), expected);
    }

    #[test]
    fn test_table_layout() {
        let token = all::<Metric>().filter(|m| m.level() == Level::Token).count();
        let instance = all::<Metric>().filter(|m| m.level() == Level::Instance).count();
        assert_eq!(token, 13);
        assert_eq!(instance, 12);
        assert_eq!(Metric::FullInstance.label("speculation"), "Full speculation");
        assert!(all::<Metric>()
            .filter(|m| m.level() == Level::Instance)
            .all(|m| m.detail() != Detail::BinaryLabels));
    }

    #[test]
    fn test_cue_dependent_of() {
        let actual: Vec<Metric> = Metric::cue_dependent_of(Level::Token, Category::Scope).collect();
        assert_eq!(
            actual,
            vec![
                Metric::TokenScopeFullCue,
                Metric::TokenScopePartialCue,
                Metric::TokenScopeFullCueNoPunct,
                Metric::TokenScopePartialCueNoPunct
            ]
        );
        let actual: Vec<Metric> =
            Metric::cue_dependent_of(Level::Instance, Category::Full).collect();
        assert_eq!(actual, vec![Metric::FullInstance, Metric::FullInstanceNoPunct]);
        assert_eq!(Metric::cue_dependent_of(Level::Token, Category::Full).count(), 0);
        assert_eq!(Metric::cue_dependent_of(Level::Token, Category::Cue).count(), 0);
    }

    #[test]
    fn test_score_derivations() {
        let score = Score::new(3, 2, 1, 1);
        assert_eq!(score.gold(), 4);
        assert_eq!(score.predicted(), 5);
        assert!(score.precision(false).are_close(&0.6, 1e-12));
        assert!(score.precision(true).are_close(&0.75, 1e-12));
        assert!(score.recall().are_close(&0.75, 1e-12));
        assert!(score.f1(false).are_close(&(2.0 * 0.6 * 0.75 / 1.35), 1e-12));
    }

    #[test]
    fn test_empty_score_is_zero() {
        let score = Score::default();
        assert_eq!(score.precision(false), 0.0);
        assert_eq!(score.precision(true), 0.0);
        assert_eq!(score.recall(), 0.0);
        assert_eq!(score.f1(false), 0.0);
    }

    #[test]
    fn test_table_update_and_merge() {
        let mut left = MetricTable::new();
        left.update(Metric::InstanceCue, Counter::Tp, 2);
        left.update(Metric::InstanceCue, Counter::Fn, 1);
        let mut right = MetricTable::default();
        right.update(Metric::InstanceCue, Counter::Tp, 1);
        right.update(Metric::FullInstance, Counter::FpNoFn, 4);
        let merged = left.clone() + right.clone();
        assert_eq!(merged.score(Metric::InstanceCue), Score::new(3, 0, 0, 1));
        assert_eq!(merged.get(Metric::FullInstance, Counter::FpNoFn), 4);
        assert_eq!(merged.total(Counter::Tp), 3);
        let mut other_order = right;
        other_order += &left;
        assert_eq!(merged, other_order);
        other_order.reset();
        assert_eq!(other_order, MetricTable::new());
    }

    impl Arbitrary for Score {
        fn arbitrary(g: &mut Gen) -> Self {
            Score::new(
                u64::from(u16::arbitrary(g)),
                u64::from(u16::arbitrary(g)),
                u64::from(u16::arbitrary(g)),
                u64::from(u16::arbitrary(g)),
            )
        }
    }

    fn table_with(metric: Metric, score: &Score) -> MetricTable {
        let mut table = MetricTable::new();
        for counter in all::<Counter>() {
            table.update(metric, counter, score.get(counter));
        }
        table
    }

    #[test]
    fn test_property_merge_sums_scores() {
        fn merge_sums(left: Score, right: Score) -> bool {
            let metric = Metric::InstanceScopeNoCue;
            let merged = table_with(metric, &left) + table_with(metric, &right);
            let mut expected = left;
            expected += right;
            let other_order = table_with(metric, &right) + table_with(metric, &left);
            merged.score(metric) == expected
                && merged == other_order
                && merged.total(Counter::Tp) == expected.tp()
        }
        QuickCheck::new()
            .tests(2000)
            .quickcheck(merge_sums as fn(Score, Score) -> bool)
    }

    #[test]
    fn test_property_f1() {
        fn f1_is_harmonic_mean(score: Score, no_fn: bool) -> TestResult {
            let p = score.precision(no_fn);
            let r = score.recall();
            let f = score.f1(no_fn);
            if p + r == 0.0 {
                TestResult::from_bool(f == 0.0)
            } else {
                TestResult::from_bool(f == 2.0 * p * r / (p + r))
            }
        }
        QuickCheck::new()
            .tests(2000)
            .quickcheck(f1_is_harmonic_mean as fn(Score, bool) -> TestResult)
    }
}
