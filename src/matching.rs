/*!
Pairing of gold and system instances within one sentence. All the matchers are first-match-wins
and at most one-to-one: once an instance is paired, it is marked as consumed and skipped by every
later comparison. The collections themselves are never modified.
*/
use crate::instance::{Fragment, NegationInstance};
use itertools::Itertools;

/// Pairs instances whose cues are identical (same token indices, same fragments, same order).
/// System instances are scanned in order, and each one takes the first gold instance not
/// consumed yet. Returns `(gold, system)` index pairs.
pub fn match_exact_cues(
    gold: &[NegationInstance],
    system: &[NegationInstance],
) -> Vec<(usize, usize)> {
    let mut consumed = vec![false; gold.len()];
    let mut pairs = Vec::new();
    for (s, system_instance) in system.iter().enumerate() {
        let found =
            (0..gold.len()).find(|&g| !consumed[g] && gold[g].cue() == system_instance.cue());
        if let Some(g) = found {
            consumed[g] = true;
            pairs.push((g, s));
        }
    }
    pairs
}

/// A gold instance paired with a system instance whose cue shares at least one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CueMatch {
    pub gold: usize,
    pub system: usize,
    /// Both cues hold exactly the same fragments.
    pub full_cue_match: bool,
}

/// Result of `match_overlapping_cues`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CueMatching {
    matches: Vec<CueMatch>,
    gold_matched: Vec<bool>,
    system_matched: Vec<bool>,
}

impl CueMatching {
    /// Matches, in gold order.
    pub fn matches(&self) -> &[CueMatch] {
        &self.matches
    }
    /// The match of the gold instance `gold`, if any.
    pub fn for_gold(&self, gold: usize) -> Option<&CueMatch> {
        self.matches.iter().find(|m| m.gold == gold)
    }
    pub fn unmatched_gold(&self) -> impl Iterator<Item = usize> + '_ {
        self.gold_matched.iter().positions(|matched| !matched)
    }
    pub fn unmatched_system(&self) -> impl Iterator<Item = usize> + '_ {
        self.system_matched.iter().positions(|matched| !matched)
    }
    pub fn is_system_matched(&self, system: usize) -> bool {
        self.system_matched.get(system).copied().unwrap_or(false)
    }
}

/// True when both fragment lists share a token index.
pub(crate) fn shares_index(left: &[Fragment], right: &[Fragment]) -> bool {
    left.iter().any(|l| right.iter().any(|r| r.index == l.index))
}

/// True when both lists hold the same fragments, whatever their order.
pub(crate) fn same_fragments(left: &[Fragment], right: &[Fragment]) -> bool {
    left.len() == right.len() && left.iter().sorted().eq(right.iter().sorted())
}

/// Pairs instances whose cues overlap. Gold instances are scanned in order, and each one takes
/// the first system instance not consumed yet that shares a cue token with it.
pub fn match_overlapping_cues(
    gold: &[NegationInstance],
    system: &[NegationInstance],
) -> CueMatching {
    let mut matching = CueMatching {
        matches: Vec::new(),
        gold_matched: vec![false; gold.len()],
        system_matched: vec![false; system.len()],
    };
    for (g, gold_instance) in gold.iter().enumerate() {
        let found = (0..system.len()).find(|&s| {
            !matching.system_matched[s] && shares_index(gold_instance.cue(), system[s].cue())
        });
        if let Some(s) = found {
            matching.gold_matched[g] = true;
            matching.system_matched[s] = true;
            matching.matches.push(CueMatch {
                gold: g,
                system: s,
                full_cue_match: same_fragments(gold_instance.cue(), system[s].cue()),
            });
        }
    }
    matching
}

/// What the cue-independent event pass concluded for a gold event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventOutcome {
    /// A system event with the same fragments was found.
    Exact,
    /// Counted as missed.
    Missed,
    /// Neither credited nor counted as missed (empty gold event, or one of the partial match
    /// cases the legacy scorer drops).
    Uncounted,
}

/// Result of `match_overlapping_events`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMatching {
    pub gold: Vec<EventOutcome>,
    pub system_matched: Vec<bool>,
}

/// Pairs events by token overlap without looking at the cues.
///
/// A gold event overlapping a free system event consumes it. When the two are not identical, the
/// pair is a miss if they share a word, otherwise both are released and the scan goes on. With
/// `legacy`, a partial overlap keeps both consumed and skips the shared word test, which means
/// the miss is only counted when a later system instance is still to be scanned.
pub fn match_overlapping_events(
    gold: &[&[Fragment]],
    system: &[&[Fragment]],
    legacy: bool,
) -> EventMatching {
    let mut gold_found = vec![false; gold.len()];
    let mut system_found = vec![false; system.len()];
    let mut outcomes = vec![EventOutcome::Uncounted; gold.len()];
    for (i, gold_event) in gold.iter().enumerate() {
        for (z, system_event) in system.iter().enumerate() {
            let found =
                !gold_found[i] && !system_found[z] && shares_index(gold_event, system_event);
            if found {
                gold_found[i] = true;
                system_found[z] = true;
                if gold_event == system_event {
                    outcomes[i] = EventOutcome::Exact;
                    break;
                }
                if legacy {
                    continue;
                }
                let shared_word = gold_event
                    .iter()
                    .any(|g| system_event.iter().any(|s| g.text == s.text));
                if shared_word {
                    outcomes[i] = EventOutcome::Missed;
                    break;
                }
                gold_found[i] = false;
                system_found[z] = false;
            } else if z + 1 == system.len() && !gold_event.is_empty() {
                outcomes[i] = EventOutcome::Missed;
            }
        }
    }
    EventMatching {
        gold: outcomes,
        system_matched: system_found,
    }
}
