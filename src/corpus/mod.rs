/*!
Reader for the token-column corpus format used by the *SEM 2012 shared task. A corpus is a list of
sentences separated by blank lines, each token on its own tab-separated line. The reader only
validates the structure of the file; grouping the annotations into negation instances is the job
of the `instance` module.
*/
mod columns;

use crate::datastructure::SentenceVecs;
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::Display;

use columns::parse_token_line;

/// The three parts of a negation (or speculation) instance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Sequence, Serialize, Deserialize,
)]
pub enum Role {
    Cue,
    Scope,
    Event,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A non-empty negation cell: the token takes part in the instance stored in column group `slot`
/// with the given role, and only `fragment` of the word is annotated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Annotation {
    pub slot: usize,
    pub role: Role,
    pub fragment: String,
}

/// One parsed token line. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub(crate) document: String,
    pub(crate) sentence: String,
    pub(crate) index: usize,
    pub(crate) form: String,
    pub(crate) lemma: String,
    pub(crate) pos: String,
    pub(crate) syntax: String,
    /// Number of instance column groups carried by this line.
    pub(crate) slots: usize,
    pub(crate) annotations: Vec<Annotation>,
}

impl Token {
    pub fn document(&self) -> &str {
        &self.document
    }
    pub fn sentence_id(&self) -> &str {
        &self.sentence
    }
    /// Position of the token in its sentence, as written in the third column.
    pub fn index(&self) -> usize {
        self.index
    }
    pub fn form(&self) -> &str {
        &self.form
    }
    pub fn lemma(&self) -> &str {
        &self.lemma
    }
    pub fn pos(&self) -> &str {
        &self.pos
    }
    pub fn syntax(&self) -> &str {
        &self.syntax
    }
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
    /// Returns the fragment annotated for the instance `slot` under `role`, if any.
    pub fn fragment(&self, slot: usize, role: Role) -> Option<&str> {
        self.annotations
            .iter()
            .find(|a| a.slot == slot && a.role == role)
            .map(|a| a.fragment.as_str())
    }
}

/// Structural problems in a corpus or in a pair of corpora. They always abort the evaluation. The
/// line numbers are 1-based and refer to the gold file when two files are compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusError {
    MissingColumns { line: usize, found: usize },
    InvalidTokenIndex { line: usize, value: String },
    IncorrectColumnCount { line: usize },
    InconsistentColumnCount { line: usize },
    SentenceCountMismatch { gold: usize, system: usize },
    SentenceLengthMismatch { line: usize },
    TokenMismatch { line: usize },
}

impl Display for CorpusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumns { line, found } => write!(
                f,
                "Line {} has {} columns. There should be at least {}.",
                line,
                found,
                columns::FIXED_COLUMNS
            ),
            Self::InvalidTokenIndex { line, value } => write!(
                f,
                "Invalid token number {:?} at line {}. The third column must be a non-negative integer.",
                value, line
            ),
            Self::IncorrectColumnCount { line } => write!(
                f,
                "Incorrect number of columns at line {}. There should be 3 columns per negation cue.",
                line
            ),
            Self::InconsistentColumnCount { line } => write!(
                f,
                "Inconsistency detected in the number of columns at line {}. All tokens in a sentence should have the same number of columns.",
                line
            ),
            Self::SentenceCountMismatch { gold, system } => write!(
                f,
                "The gold and system files have a different number of sentences ({} and {}).",
                gold, system
            ),
            Self::SentenceLengthMismatch { line } => write!(
                f,
                "The gold and system sentences starting at line {} are of different length.",
                line
            ),
            Self::TokenMismatch { line } => write!(
                f,
                "Mismatch between tokens in gold and system files at line {}.",
                line
            ),
        }
    }
}

impl Error for CorpusError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SentenceMeta {
    first_line: usize,
    slots: usize,
}

/// A parsed corpus. Tokens are kept in a single flat buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Corpus {
    tokens: SentenceVecs<Token>,
    meta: Box<[SentenceMeta]>,
}

/// A borrowed view over one sentence of a `Corpus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentence<'a> {
    tokens: &'a [Token],
    first_line: usize,
    slots: usize,
}

impl<'a> Sentence<'a> {
    pub fn tokens(&self) -> &'a [Token] {
        self.tokens
    }
    /// 1-based line number of the first token of the sentence.
    pub fn first_line(&self) -> usize {
        self.first_line
    }
    /// Number of negation instances encoded in the sentence.
    pub fn slots(&self) -> usize {
        self.slots
    }
    pub fn has_negation(&self) -> bool {
        self.slots > 0
    }
    pub fn len(&self) -> usize {
        self.tokens.len()
    }
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
    /// Looks a token up by its index column.
    pub fn token(&self, index: usize) -> Option<&'a Token> {
        self.tokens
            .get(index)
            .filter(|t| t.index == index)
            .or_else(|| self.tokens.iter().find(|t| t.index == index))
    }
}

impl Corpus {
    /// Parses a whole corpus. Sentences are separated by one or more blank lines; leading and
    /// trailing blank lines are ignored.
    pub fn parse(text: &str) -> Result<Self, CorpusError> {
        let mut sentences: Vec<Vec<Token>> = Vec::new();
        let mut meta = Vec::new();
        let mut current: Vec<Token> = Vec::new();
        let mut current_meta: Option<SentenceMeta> = None;
        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            if raw.trim().is_empty() {
                if let Some(m) = current_meta.take() {
                    sentences.push(std::mem::take(&mut current));
                    meta.push(m);
                }
                continue;
            }
            let token = parse_token_line(raw, line)?;
            match current_meta {
                None => {
                    current_meta = Some(SentenceMeta {
                        first_line: line,
                        slots: token.slots,
                    })
                }
                Some(m) if m.slots != token.slots => {
                    return Err(CorpusError::InconsistentColumnCount { line })
                }
                Some(_) => (),
            }
            current.push(token);
        }
        if let Some(m) = current_meta.take() {
            sentences.push(current);
            meta.push(m);
        }
        log::trace!("parsed {} sentences", sentences.len());
        Ok(Self {
            tokens: SentenceVecs::new(sentences),
            meta: meta.into_boxed_slice(),
        })
    }

    /// Number of sentences.
    pub fn len(&self) -> usize {
        self.meta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meta.is_empty()
    }

    /// Number of tokens over all sentences.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn sentence(&self, n: usize) -> Option<Sentence<'_>> {
        let meta = self.meta.get(n)?;
        Some(Sentence {
            tokens: self.tokens.sentence(n)?,
            first_line: meta.first_line,
            slots: meta.slots,
        })
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Sentence<'_>> + '_ {
        self.tokens
            .iter_vec()
            .zip(self.meta.iter())
            .map(|(tokens, meta)| Sentence {
                tokens,
                first_line: meta.first_line,
                slots: meta.slots,
            })
    }
}

/// A gold sentence and the system sentence covering the same tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentencePair<'a> {
    pub gold: Sentence<'a>,
    pub system: Sentence<'a>,
}

/// Pairs the sentences of a gold and a system corpus. Both corpora must have the same number of
/// sentences, the same number of tokens per sentence, and at every position the same document,
/// sentence number, token number and (lower-cased) word form.
pub fn align<'a>(
    gold: &'a Corpus,
    system: &'a Corpus,
) -> Result<Vec<SentencePair<'a>>, CorpusError> {
    if gold.len() != system.len() {
        return Err(CorpusError::SentenceCountMismatch {
            gold: gold.len(),
            system: system.len(),
        });
    }
    let mut pairs = Vec::with_capacity(gold.len());
    for (g, s) in gold.iter().zip(system.iter()) {
        if g.len() != s.len() {
            return Err(CorpusError::SentenceLengthMismatch {
                line: g.first_line(),
            });
        }
        for (offset, (gt, st)) in g.tokens().iter().zip(s.tokens()).enumerate() {
            let same_position = gt.document == st.document
                && gt.sentence == st.sentence
                && gt.index == st.index;
            if !same_position || gt.form.to_lowercase() != st.form.to_lowercase() {
                return Err(CorpusError::TokenMismatch {
                    line: g.first_line() + offset,
                });
            }
        }
        pairs.push(SentencePair { gold: g, system: s });
    }
    Ok(pairs)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rstest::rstest;

    /// Builds a corpus line. `negation` holds the cells from column 7 onward.
    pub(crate) fn line(index: usize, form: &str, pos: &str, negation: &[&str]) -> String {
        let mut cols = vec![
            String::from("doc"),
            String::from("0"),
            index.to_string(),
            String::from(form),
            form.to_lowercase(),
            String::from(pos),
            String::from("_"),
        ];
        if negation.is_empty() {
            cols.push(String::from("***"));
        } else {
            cols.extend(negation.iter().map(|c| String::from(*c)));
        }
        cols.join("\t")
    }

    pub(crate) const GOLD: &str = "\
d\t0\t0\tI\ti\tPRP\t_\t_\tI\t_
d\t0\t1\tam\tbe\tVBP\t_\t_\tam\t_
d\t0\t2\tnot\tnot\tRB\t_\tnot\t_\t_
d\t0\t3\thappy\thappy\tJJ\t_\t_\thappy\thappy
d\t0\t4\t.\t.\t.\t_\t_\t_\t_

d\t1\t0\tFine\tfine\tJJ\t_\t***
d\t1\t1\t.\t.\t.\t_\t***
";

    #[test]
    fn test_parse_corpus() {
        let corpus = Corpus::parse(GOLD).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.token_count(), 7);
        let first = corpus.sentence(0).unwrap();
        assert_eq!(first.first_line(), 1);
        assert_eq!(first.slots(), 1);
        assert!(first.has_negation());
        assert_eq!(first.token(2).map(|t| t.form()), Some("not"));
        let second = corpus.sentence(1).unwrap();
        assert_eq!(second.first_line(), 7);
        assert!(!second.has_negation());
        assert_eq!(corpus.iter().count(), 2);
    }

    #[test]
    fn test_extra_blank_lines_keep_line_numbers() {
        let text = format!(
            "\n{}\n\n\n\n{}\n",
            line(0, "Yes", "UH", &[]),
            line(0, "No", "UH", &["No", "_", "_"])
        );
        let corpus = Corpus::parse(&text).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.sentence(0).unwrap().first_line(), 2);
        assert_eq!(corpus.sentence(1).unwrap().first_line(), 6);
    }

    #[test]
    fn test_inconsistent_columns_in_sentence() {
        let text = format!(
            "{}\n{}\n",
            line(0, "No", "UH", &["No", "_", "_"]),
            line(1, "way", "NN", &[])
        );
        assert_eq!(
            Corpus::parse(&text),
            Err(CorpusError::InconsistentColumnCount { line: 2 })
        );
    }

    #[test]
    fn test_empty_corpus() {
        let corpus = Corpus::parse("\n\n").unwrap();
        assert!(corpus.is_empty());
        assert_eq!(corpus.iter().count(), 0);
    }

    #[test]
    fn test_align_identical_corpora() {
        let gold = Corpus::parse(GOLD).unwrap();
        let system = Corpus::parse(&GOLD.replace("\tnot\t_\t_", "\t_\t_\t_")).unwrap();
        let pairs = align(&gold, &system).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].gold.first_line(), 7);
    }

    #[test]
    fn test_align_ignores_case_of_word_forms() {
        let gold = Corpus::parse(GOLD).unwrap();
        let system = Corpus::parse(&GOLD.replace("\tFine\t", "\tFINE\t")).unwrap();
        assert!(align(&gold, &system).is_ok());
    }

    #[rstest]
    #[case(
        GOLD.replace("\thappy\thappy\tJJ", "\tsad\thappy\tJJ"),
        CorpusError::TokenMismatch { line: 4 }
    )]
    #[case(GOLD.replace("d\t1\t1\t", "d\t1\t5\t"), CorpusError::TokenMismatch { line: 8 })]
    #[case(GOLD.replace("d\t1\t0\t", "d\t2\t0\t"), CorpusError::TokenMismatch { line: 7 })]
    #[case(GOLD.replace("d\t0\t3\t", "e\t0\t3\t"), CorpusError::TokenMismatch { line: 4 })]
    #[case(
        GOLD.replace("d\t1\t1\t.\t.\t.\t_\t***\n", ""),
        CorpusError::SentenceLengthMismatch { line: 7 }
    )]
    #[case(
        GOLD.replace("\nd\t1\t0\tFine\tfine\tJJ\t_\t***\nd\t1\t1\t.\t.\t.\t_\t***\n", ""),
        CorpusError::SentenceCountMismatch { gold: 2, system: 1 }
    )]
    fn test_align_structural_mismatch(#[case] system: String, #[case] expected: CorpusError) {
        let gold = Corpus::parse(GOLD).unwrap();
        let system = Corpus::parse(&system).unwrap();
        assert_eq!(align(&gold, &system), Err(expected));
    }

    #[test]
    fn test_error_message_names_line() {
        let message = CorpusError::TokenMismatch { line: 42 }.to_string();
        assert_eq!(
            message,
            "Mismatch between tokens in gold and system files at line 42."
        );
    }
}
