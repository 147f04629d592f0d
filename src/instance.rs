/*!
Grouping of token annotations into negation instances. An instance is the cue, the scope and the
event annotated in one column group of a sentence. Instances are built once per sentence, are
never mutated and are dropped once the sentence has been scored.
*/
use crate::corpus::{Role, Sentence, Token};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::Display;

/// The `(token index, fragment)` pair annotated for one role of an instance. Only `text` of the
/// word is part of the annotation (e.g. `un` in `unhappy`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fragment {
    pub index: usize,
    pub text: String,
}

impl Fragment {
    pub fn new<S: Into<String>>(index: usize, text: S) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// A fragment is punctuation when it has no word character.
    pub fn is_punctuation(&self) -> bool {
        is_punctuation(&self.text)
    }
}

impl Display for Fragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.index, self.text)
    }
}

/// True when `text` contains no word character (alphanumeric or `_`).
pub fn is_punctuation(text: &str) -> bool {
    !text.chars().any(|c| c.is_alphanumeric() || c == '_')
}

/// How scope and event fragments are cleaned before they are compared. Cue fragments are never
/// modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Normalization {
    /// Fragments are kept as written.
    #[default]
    Raw,
    /// A fragment longer than one character that ends with a dot loses the dot (`Mr.` becomes
    /// `Mr`).
    TrailingDot,
}

impl Normalization {
    pub fn apply<'a>(&self, fragment: &'a str) -> &'a str {
        match self {
            Self::Raw => fragment,
            Self::TrailingDot if fragment.chars().count() > 1 => {
                fragment.strip_suffix('.').unwrap_or(fragment)
            }
            Self::TrailingDot => fragment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceError {
    /// The column group `instance` of the sentence starting at `line` has no cue.
    MissingCue { line: usize, instance: usize },
}

impl Display for InstanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCue { line, instance } => write!(
                f,
                "Negation instance {} of the sentence starting at line {} has no cue.",
                instance, line
            ),
        }
    }
}

impl Error for InstanceError {}

/// One cue with its scope and event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NegationInstance {
    id: usize,
    cue: Vec<Fragment>,
    scope: Vec<Fragment>,
    scope_no_punct: Vec<Fragment>,
    event: Vec<Fragment>,
    multiword_cue: bool,
    affix_cue: bool,
    has_event: bool,
    multiword_event: bool,
}

impl NegationInstance {
    /// Collects the fragments of the instance `id` from the tokens of `sentence`, in token order.
    ///
    /// * `sentence`: The sentence holding the annotations.
    /// * `id`: Column group of the instance.
    /// * `normalization`: Cleaning applied to the scope and event fragments.
    pub fn from_sentence(
        sentence: &Sentence<'_>,
        id: usize,
        normalization: Normalization,
    ) -> Result<Self, InstanceError> {
        let collect = |role: Role| -> Vec<Fragment> {
            sentence
                .tokens()
                .iter()
                .filter_map(|t| t.fragment(id, role).map(|text| (t.index(), text)))
                .map(|(index, text)| match role {
                    Role::Cue => Fragment::new(index, text),
                    _ => Fragment::new(index, normalization.apply(text)),
                })
                .collect()
        };
        let cue = collect(Role::Cue);
        if cue.is_empty() {
            return Err(InstanceError::MissingCue {
                line: sentence.first_line(),
                instance: id,
            });
        }
        let affix_cue = cue.iter().any(|c| {
            sentence
                .token(c.index)
                .map(|t: &Token| t.form() != c.text)
                .unwrap_or(false)
        });
        let scope = collect(Role::Scope);
        let event = collect(Role::Event);
        Ok(Self::new(id, cue, scope, event, affix_cue))
    }

    /// Builds an instance from already collected fragments. `affix_cue` cannot be derived without
    /// the sentence and must be given.
    pub fn new(
        id: usize,
        cue: Vec<Fragment>,
        scope: Vec<Fragment>,
        event: Vec<Fragment>,
        affix_cue: bool,
    ) -> Self {
        let scope_no_punct = scope
            .iter()
            .filter(|f| !f.is_punctuation())
            .cloned()
            .collect();
        Self {
            id,
            multiword_cue: cue.len() > 1,
            affix_cue,
            has_event: !event.is_empty(),
            multiword_event: event.len() > 1,
            cue,
            scope,
            scope_no_punct,
            event,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }
    pub fn cue(&self) -> &[Fragment] {
        &self.cue
    }
    /// Full scope, punctuation included.
    pub fn scope(&self) -> &[Fragment] {
        &self.scope
    }
    /// Scope without punctuation fragments.
    pub fn scope_no_punct(&self) -> &[Fragment] {
        &self.scope_no_punct
    }
    pub fn event(&self) -> &[Fragment] {
        &self.event
    }
    pub fn fragments(&self, role: Role) -> &[Fragment] {
        match role {
            Role::Cue => &self.cue,
            Role::Scope => &self.scope,
            Role::Event => &self.event,
        }
    }
    pub fn multiword_cue(&self) -> bool {
        self.multiword_cue
    }
    pub fn affix_cue(&self) -> bool {
        self.affix_cue
    }
    pub fn has_event(&self) -> bool {
        self.has_event
    }
    pub fn multiword_event(&self) -> bool {
        self.multiword_event
    }
    /// Length of the scope once punctuation is removed.
    pub fn scope_len(&self) -> usize {
        self.scope_no_punct.len()
    }
    /// Token indices of the cue.
    pub fn cue_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.cue.iter().map(|f| f.index)
    }
}

impl Display for NegationInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance {}", self.id)?;
        writeln!(f, "  cue:   {}", self.cue.iter().join(" "))?;
        writeln!(f, "  scope: {}", self.scope.iter().join(" "))?;
        write!(f, "  event: {}", self.event.iter().join(" "))
    }
}

/// The instances of a sentence, in ascending id order.
pub fn extract_instances(
    sentence: &Sentence<'_>,
    normalization: Normalization,
) -> Result<Vec<NegationInstance>, InstanceError> {
    (0..sentence.slots())
        .map(|id| NegationInstance::from_sentence(sentence, id, normalization))
        .collect()
}
