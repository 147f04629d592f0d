/*!
Printable and serializable results. The text layouts are the fixed-column tables of the *SEM 2012
scorers, so that numbers can be compared line by line with published results. Every report also
derives `Serialize` for machine readable output.
*/
use crate::config::EvalMode;
use crate::eval::extended::{ExtendedTally, SentenceStats};
use crate::eval::instance_based::EvaluationResult;
use crate::eval::starsem::{StarsemRow, StarsemScores};
use crate::metrics::{Level, Metric, Score};
use enum_iterator::all;
use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;

const COLUMNS: &str =
    "+------+--------+------+------+------+---------------+------------+---------";
const COLUMN_NAMES: &str =
    "| gold | system | tp   | fp   | fn   | precision (%) | recall (%) | F1  (%) ";

/// Table separator whose first column is `width` wide.
fn separator(width: usize) -> String {
    format!("{}{}", "-".repeat(width), COLUMNS)
}

fn header(width: usize) -> String {
    format!("{}{}", " ".repeat(width), COLUMN_NAMES)
}

fn rule(width: usize) -> String {
    "-".repeat(width)
}

/// One metric of the extended table. Percentages are in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub metric: Metric,
    pub label: String,
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

impl MetricRow {
    pub fn new(metric: Metric, score: &Score, no_fn: bool, task: &str) -> Self {
        Self {
            metric,
            label: metric.label(task),
            gold: score.gold(),
            system: score.predicted(),
            tp: score.tp(),
            fp: score.fp(no_fn),
            fn_: score.false_negatives(),
            precision: score.precision(no_fn) * 100.0,
            recall: score.recall() * 100.0,
            f1: score.f1(no_fn) * 100.0,
        }
    }
}

/// One block of the extended table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtendedSection {
    pub title: String,
    /// The fp column only holds false positives that do not intersect a false negative.
    pub no_fn: bool,
    pub rows: Vec<MetricRow>,
}

/// Value of a sentence-level line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Overall {
    Count(u64),
    Percentage(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallLine {
    pub name: String,
    pub value: Overall,
}

/// Result of an extended run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtendedReport {
    pub task: String,
    #[serde(skip)]
    pub rounding: usize,
    pub sections: Vec<ExtendedSection>,
    pub overall: Vec<OverallLine>,
}

fn overall_lines(stats: &SentenceStats, task: &str) -> Vec<OverallLine> {
    use Overall::{Count, Percentage};
    let line = |name: String, value: Overall| OverallLine { name, value };
    vec![
        line(String::from("# sentences"), Count(stats.sentences)),
        line(
            String::from("# sentences with errors"),
            Count(stats.sentences_with_errors(false)),
        ),
        line(
            String::from("% correct sentences"),
            Percentage(stats.percent_correct(false)),
        ),
        line(
            String::from("# sentences with errors (no punct)"),
            Count(stats.sentences_with_errors(true)),
        ),
        line(
            String::from("% correct sentences (no punct)"),
            Percentage(stats.percent_correct(true)),
        ),
        line(format!("# {} sentences", task), Count(stats.negation_sentences)),
        line(
            format!("# {} sentences with errors", task),
            Count(stats.negation_sentences_with_errors(false)),
        ),
        line(
            format!("% correct {} sentences", task),
            Percentage(stats.percent_correct_negation(false)),
        ),
        line(
            format!("# {} sentences with errors (no punct)", task),
            Count(stats.negation_sentences_with_errors(true)),
        ),
        line(
            format!("% correct {} sentences (no punct)", task),
            Percentage(stats.percent_correct_negation(true)),
        ),
    ]
}

impl ExtendedReport {
    pub fn new(tally: &ExtendedTally, task: &str, rounding: usize) -> Self {
        let section = |title: &str, level: Level, no_fn: bool| ExtendedSection {
            title: String::from(title),
            no_fn,
            rows: all::<Metric>()
                .filter(|m| m.level() == level)
                .map(|m| MetricRow::new(m, &tally.table.score(m), no_fn, task))
                .collect(),
        };
        Self {
            task: String::from(task),
            rounding,
            sections: vec![
                section("Token-level scores", Level::Token, false),
                section("Scope-level scores (*SEM 2012's B-scores)", Level::Instance, false),
                section(
                    "Scope-level scores (*SEM 2012: exclude fp that intersect with fn)",
                    Level::Instance,
                    true,
                ),
            ],
            overall: overall_lines(&tally.stats, task),
        }
    }
}

impl Display for ExtendedReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let r = self.rounding;
        writeln!(f, "{}", separator(32))?;
        writeln!(f, "{}", header(32))?;
        writeln!(f, "{}", separator(32))?;
        for section in self.sections.iter() {
            writeln!(f, "{}", rule(108))?;
            writeln!(f, " {}", section.title)?;
            writeln!(f, "{}", rule(108))?;
            writeln!(f, "{}", separator(32))?;
            for row in section.rows.iter() {
                writeln!(
                    f,
                    "{:<33} {:4} | {:6} | {:4} | {:4} | {:4} | {:13.*} | {:10.*} | {:7.*}",
                    format!("{}:", row.label),
                    row.gold,
                    row.system,
                    row.tp,
                    row.fp,
                    row.fn_,
                    r,
                    row.precision,
                    r,
                    row.recall,
                    r,
                    row.f1
                )?;
            }
            writeln!(f, "{}", separator(32))?;
        }
        writeln!(f, "{}", rule(108))?;
        for line in self.overall.iter() {
            match line.value {
                Overall::Count(count) => writeln!(f, " {}: {}", line.name, count)?,
                Overall::Percentage(percentage) => {
                    writeln!(f, " {}: {:.*}", line.name, r, percentage)?;
                    writeln!(f, "{}", rule(108))?;
                }
            }
        }
        Ok(())
    }
}

/// Result of a classic *SEM 2012 run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarsemReport {
    pub task: String,
    #[serde(skip)]
    pub rounding: usize,
    pub scores: StarsemScores,
}

impl StarsemReport {
    pub fn new(scores: StarsemScores, task: &str, rounding: usize) -> Self {
        Self {
            task: String::from(task),
            rounding,
            scores,
        }
    }

    /// Rows of the standard block, then rows of the B block.
    fn blocks(&self) -> [Vec<(String, &StarsemRow)>; 2] {
        let s = &self.scores;
        let full = format!("Full {}", self.task);
        [
            vec![
                (String::from("Cues"), &s.cues),
                (String::from("Scopes(cue match)"), &s.scopes),
                (String::from("Scopes(no cue match)"), &s.scopes_apart),
                (String::from("Scope tokens(no cue match)"), &s.scope_tokens),
                (String::from("Negated(no cue match)"), &s.negated_apart),
                (full.clone(), &s.full),
            ],
            vec![
                (String::from("Cues B"), &s.cues_b),
                (String::from("Scopes B (cue match)"), &s.scopes_b),
                (String::from("Scopes B (no cue match)"), &s.scopes_apart_b),
                (String::from("Negated B (no cue match)"), &s.negated_apart_b),
                (format!("{} B", full), &s.full_b),
            ],
        ]
    }
}

impl Display for StarsemReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let r = self.rounding;
        let [standard, b_scores] = self.blocks();
        let write_row = |f: &mut std::fmt::Formatter<'_>, label: &str, row: &StarsemRow| {
            writeln!(
                f,
                "{}: {:>w$} | {:6} | {:4} | {:4} | {:4} | {:13.*} | {:10.*} | {:7.*}",
                label,
                row.gold,
                row.system,
                row.tp,
                row.fp,
                row.fn_,
                r,
                row.precision,
                r,
                row.recall,
                r,
                row.f1,
                w = 32usize.saturating_sub(label.len()),
            )
        };
        writeln!(f, "{}", separator(28))?;
        writeln!(f, "{}", header(28))?;
        writeln!(f, "{}", separator(28))?;
        for (label, row) in standard.iter() {
            write_row(f, label, row)?;
        }
        writeln!(f, "{}", separator(27))?;
        for (label, row) in b_scores.iter() {
            write_row(f, label, row)?;
        }
        writeln!(f, "{}", separator(28))?;
        let s = &self.scores;
        writeln!(f, " # sentences: {}", s.sentences)?;
        writeln!(f, " # {} sentences: {}", self.task, s.negation_sentences)?;
        writeln!(
            f,
            " # {} sentences with errors: {}",
            self.task, s.negation_sentences_with_errors
        )?;
        writeln!(f, " % correct sentences: {:.*}", r, s.percent_correct_sentences)?;
        writeln!(
            f,
            " % correct {} sentences: {:.*}",
            self.task, r, s.percent_correct_negation_sentences
        )?;
        writeln!(f, "{}", rule(104))
    }
}

/// The result of evaluating one system file, whatever the mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Report {
    InstanceBased(EvaluationResult),
    Extended(ExtendedReport),
    Starsem(StarsemReport),
}

impl Report {
    pub fn mode(&self) -> EvalMode {
        match self {
            Self::InstanceBased(_) => EvalMode::InstanceBased,
            Self::Extended(_) => EvalMode::Extended,
            Self::Starsem(_) => EvalMode::Starsem,
        }
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InstanceBased(result) => Display::fmt(result, f),
            Self::Extended(report) => Display::fmt(report, f),
            Self::Starsem(report) => Display::fmt(report, f),
        }
    }
}

/// The report of one system file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub report: Report,
}

/// Reports of several system files evaluated against the same gold file. In instance-based mode
/// with more than one file, `average` holds the mean of every value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub reports: Vec<FileReport>,
    pub average: Option<EvaluationResult>,
}

impl Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for file in self.reports.iter() {
            writeln!(f, "{}", file.path.display())?;
            writeln!(f, "{}", file.report)?;
        }
        if let Some(average) = self.average {
            writeln!(f, "AVERAGE")?;
            writeln!(f, "{}", average)?;
        }
        Ok(())
    }
}

/// Explanation of the table printed by `mode`.
pub fn readme(mode: EvalMode, task: &str) -> String {
    match mode {
        EvalMode::InstanceBased => format!(
            "\
Instance-based evaluation of {task} cues and scopes.

Cues are matched when the system cue holds exactly the gold cue tokens and fragments. Every system
cue is paired with at most one gold cue.

 Cue precision / recall / F1: matched cues over system cues / over gold cues.
 Scope precision / recall / F1: scope tokens of the matched pairs, punctuation excluded.

With the default normalized scoring, each matched pair contributes its own scope precision and
recall, and the sums are divided by the number of system and gold instances. With token scoring
(-t), the tokens shared by the matched scopes are divided by the scope tokens of all the system
and gold instances.

Values are percentages. With several system files, the average of each value is printed last.
"
        ),
        EvalMode::Extended => {
            let mut text = format!(
                "\
This evaluation compares the {task} annotation of a system with the gold annotation. Instances
are paired when their cues share a token.

 (full cue): the pair is credited only when both cues are identical.
 (partial cue): the pair is credited whenever the cues overlap.
 (no cue): elements are compared without looking at the cue they belong to.
 (binary labels): the tokens of all the instances of a sentence are pooled.
 (no punct): punctuation tokens are ignored.

Token-level rows count tokens, scope-level rows count whole scopes, events and instances. The last
block only counts the false positives that do not overlap a false negative.

"
            );
            text.push_str(&format!("{}\n{}\n{}\n", separator(32), header(32), separator(32)));
            for (title, level) in [
                ("Token-level scores", Level::Token),
                ("Scope-level scores (*SEM 2012's B-scores)", Level::Instance),
                (
                    "Scope-level scores (*SEM 2012: exclude fp that intersect with fn)",
                    Level::Instance,
                ),
            ] {
                text.push_str(&format!("{}\n {}\n{}\n", rule(108), title, rule(108)));
                for metric in all::<Metric>().filter(|m| m.level() == level) {
                    text.push_str(&format!("{}:\n", metric.label(task)));
                }
                text.push_str(&format!("{}\n", separator(32)));
            }
            text
        }
        EvalMode::Starsem => format!(
            "\
The classic *SEM 2012 evaluation of {task} cues, scopes and events.

 Cues: the cue tokens and fragments must be identical.
 Scopes(cue match): the scope is only credited when the cue is identical.
 Scopes(no cue match): the cues only need to share a token.
 Scope tokens(no cue match): scope tokens of the pairs whose cues share a token.
 Negated(no cue match): events are paired by overlap, whatever their cue.
 Full {task}: cue, scope and event must all be identical.

Scope tokens whose part of speech is punctuation or a bracket are ignored, and the final period of
an abbreviation is dropped. In the B rows, precision is tp divided by the system count.

Differences with the historical scorer, all reverted by -e (--exact):
 - a partially matched event may not be counted as a false negative;
 - the Scopes(no cue match) row prints the tp of Scopes(cue match);
 - precision and recall are rounded to two decimals before computing F1.
"
        ),
    }
}
