/*
 * Settings of an evaluation run. `EvalConfig` implements `Default` and is built through
 * `EvalConfigBuilder`; `EvalMode` and `ScopeScoring` can be parsed from their command line names.
*/
use either::Either as LeftOrRight;
use std::error::Error;
use std::fmt::{Debug, Display};
use std::str::FromStr;

/// Default label of the evaluated phenomenon, used in row names.
pub const DEFAULT_TASK: &str = "negation";
/// Default number of decimals of the printed percentages.
pub const DEFAULT_ROUNDING: usize = 2;

/// The evaluation procedure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EvalMode {
    /// Cue precision/recall over exactly matched cues, and scope scores over the matched pairs.
    InstanceBased,
    /// Extended *SEM evaluation: token, scope and full-instance metrics, with and without
    /// punctuation.
    #[default]
    Extended,
    /// The classic *SEM 2012 table.
    Starsem,
}

/// How the instance-based mode scores scopes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ScopeScoring {
    /// Every matched instance weighs the same: per-instance scope precision and recall are summed
    /// and divided by the instance counts.
    #[default]
    Normalized,
    /// Scope tokens are pooled over the whole corpus.
    Tokens,
}

/// Unknown name given to `EvalMode::from_str` or `ScopeScoring::from_str`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseConfigError {
    UnknownMode(String),
    UnknownScopeScoring(String),
}

impl Display for ParseConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownMode(name) => write!(
                f,
                "Unknown evaluation mode `{}`. Expected one of: instance, extended, starsem.",
                name
            ),
            Self::UnknownScopeScoring(name) => write!(
                f,
                "Unknown scope scoring `{}`. Expected one of: normalized, tokens.",
                name
            ),
        }
    }
}

impl Error for ParseConfigError {}

impl FromStr for EvalMode {
    type Err = ParseConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "instance" | "instance-based" => Ok(Self::InstanceBased),
            "extended" => Ok(Self::Extended),
            "starsem" => Ok(Self::Starsem),
            _ => Err(ParseConfigError::UnknownMode(String::from(s))),
        }
    }
}

impl Display for EvalMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InstanceBased => write!(f, "instance"),
            Self::Extended => write!(f, "extended"),
            Self::Starsem => write!(f, "starsem"),
        }
    }
}

impl FromStr for ScopeScoring {
    type Err = ParseConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normalized" => Ok(Self::Normalized),
            "tokens" => Ok(Self::Tokens),
            _ => Err(ParseConfigError::UnknownScopeScoring(String::from(s))),
        }
    }
}

impl Display for ScopeScoring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normalized => write!(f, "normalized"),
            Self::Tokens => write!(f, "tokens"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
/// Settings of an evaluation run. It implements the default trait.
pub struct EvalConfig {
    mode: EvalMode,
    scope_scoring: ScopeScoring,
    exact: bool,
    task: String,
    rounding: usize,
    parallel: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfigBuilder::new().build()
    }
}

impl EvalConfig {
    pub fn mode(&self) -> EvalMode {
        self.mode
    }
    pub fn scope_scoring(&self) -> ScopeScoring {
        self.scope_scoring
    }
    /// Reproduce the historical scorers, known mistakes included.
    pub fn exact(&self) -> bool {
        self.exact
    }
    pub fn task(&self) -> &str {
        &self.task
    }
    pub fn rounding(&self) -> usize {
        self.rounding
    }
    pub fn parallel(&self) -> bool {
        self.parallel
    }
}

impl Display for EvalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Evaluation mode: {}\n Scope scoring: {}\n Reproducing the historical scorer: {}\n Task: {}\n Decimals: {}\n Using parallel computations: {}",
            self.mode, self.scope_scoring, self.exact, self.task, self.rounding, self.parallel
        )
    }
}

/// This builder can be used to build and customize an `EvalConfig` structure.
#[derive(Clone, Debug)]
pub struct EvalConfigBuilder {
    mode: EvalMode,
    scope_scoring: ScopeScoring,
    exact: bool,
    task: LeftOrRight<String, &'static str>,
    rounding: usize,
    parallel: bool,
}

impl Default for EvalConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EvalConfigBuilder {
    pub fn new() -> Self {
        Self {
            mode: EvalMode::default(),
            scope_scoring: ScopeScoring::default(),
            exact: false,
            task: LeftOrRight::Right(DEFAULT_TASK),
            rounding: DEFAULT_ROUNDING,
            parallel: false,
        }
    }
    pub fn mode(mut self, mode: EvalMode) -> Self {
        self.mode = mode;
        self
    }
    pub fn scope_scoring(mut self, scope_scoring: ScopeScoring) -> Self {
        self.scope_scoring = scope_scoring;
        self
    }
    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }
    /// Label of the phenomenon (`negation`, `speculation`, ...).
    pub fn task<S: Into<String>>(mut self, task: S) -> Self {
        self.task = LeftOrRight::Left(task.into());
        self
    }
    pub fn rounding(mut self, rounding: usize) -> Self {
        self.rounding = rounding;
        self
    }
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
    pub fn build(self) -> EvalConfig {
        EvalConfig {
            mode: self.mode,
            scope_scoring: self.scope_scoring,
            exact: self.exact,
            task: self.task.either(|task| task, String::from),
            rounding: self.rounding,
            parallel: self.parallel,
        }
    }
}
