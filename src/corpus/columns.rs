/*
 * Parsing of a single token line of the token-column format. Columns 0 to 6 are fixed
 * (document, sentence, token index, word form, lemma, POS, syntax), column 7 onward holds the
 * negation instances in groups of three cells: cue, scope and event.
 */
use super::{Annotation, CorpusError, Role, Token};

/// Number of fixed columns in front of the negation columns.
pub(crate) const FIXED_COLUMNS: usize = 7;

/// Cell value meaning "this token has no annotation for this role".
pub(crate) const ABSENT: &str = "_";

/// Parses one token line. `line` is the 1-based line number used in error messages.
pub(crate) fn parse_token_line(text: &str, line: usize) -> Result<Token, CorpusError> {
    let cols: Vec<&str> = text.trim_end().split('\t').collect();
    if cols.len() < FIXED_COLUMNS {
        return Err(CorpusError::MissingColumns {
            line,
            found: cols.len(),
        });
    }
    let index = cols[2]
        .parse::<usize>()
        .map_err(|_| CorpusError::InvalidTokenIndex {
            line,
            value: String::from(cols[2]),
        })?;
    let negation_columns = &cols[FIXED_COLUMNS..];
    let slots = slot_count(negation_columns.len(), line)?;
    let mut annotations = Vec::new();
    for (slot, cells) in negation_columns.chunks_exact(3).take(slots).enumerate() {
        for (role, cell) in [Role::Cue, Role::Scope, Role::Event].into_iter().zip(cells) {
            if *cell != ABSENT {
                annotations.push(Annotation {
                    slot,
                    role,
                    fragment: String::from(*cell),
                });
            }
        }
    }
    Ok(Token {
        document: String::from(cols[0]),
        sentence: String::from(cols[1]),
        index,
        form: String::from(cols[3]),
        lemma: String::from(cols[4]),
        pos: String::from(cols[5]),
        syntax: String::from(cols[6]),
        slots,
        annotations,
    })
}

/// A single negation column (`***`) means the sentence has no instance. Any other count must be a
/// multiple of three.
fn slot_count(negation_columns: usize, line: usize) -> Result<usize, CorpusError> {
    match negation_columns {
        1 => Ok(0),
        n if n % 3 == 0 => Ok(n / 3),
        _ => Err(CorpusError::IncorrectColumnCount { line }),
    }
}
