//! Keyword prefilter.
//!
//! Matching is run against many registered patterns per input line, and most
//! patterns reject most inputs. Before paying for a tree traversal, the engine
//! checks a necessary condition derived once from the tree: the set of literal
//! texts that are *mandatory* on every accepting path. If any of them is
//! missing from the input (case-insensitively, as a substring), the pattern
//! cannot match and the tree is never walked.
//!
//! What counts as mandatory:
//!
//! - a literal in plain sequence: always, split at multi-space runs (one of
//!   those spaces can elide at match time)
//! - inside an optional: never (the path may skip it)
//! - inside a choice: only the text common to *every* branch. Branches are
//!   compared at word-run granularity, so `(stop the server|reload the
//!   server)` still requires "the server" even though no branch literal
//!   equals another in full. Only maximal common runs are kept.
//!
//! The filter is an over-approximation in exactly one direction: it may let
//! through inputs the matcher will reject, but it must never reject an input
//! the matcher would accept.

use super::element::{Arena, ElemId, ElemKind};
use std::collections::BTreeSet;

/// Literal texts required on every accepting path, lowercased, sorted.
pub(crate) fn build_keywords(arena: &Arena, first: Option<ElemId>) -> Vec<String> {
    collect(arena, first).into_iter().collect()
}

/// `true` when every keyword appears in the (pre-lowercased) input.
pub(crate) fn keywords_present(keywords: &[String], lower_input: &str) -> bool {
    keywords.iter().all(|keyword| lower_input.contains(keyword.as_str()))
}

fn collect(arena: &Arena, first: Option<ElemId>) -> BTreeSet<String> {
    let mut required = BTreeSet::new();
    let mut cursor = first;
    while let Some(id) = cursor {
        let elem = arena.get(id);
        match &elem.kind {
            ElemKind::Literal(text) => {
                // A run of several spaces can partially elide at match time,
                // so a keyword never spans one. Interior single spaces are
                // always matched verbatim and may stay.
                for chunk in text.split("  ") {
                    let trimmed = chunk.trim();
                    if !trimmed.is_empty() {
                        required.insert(trimmed.to_lowercase());
                    }
                }
            }
            ElemKind::Group(child) => {
                required.extend(collect(arena, Some(*child)));
            }
            ElemKind::Choice(branches) => {
                let mut common: Option<BTreeSet<String>> = None;
                for &branch in branches {
                    let mut expanded = BTreeSet::new();
                    for keyword in collect(arena, Some(branch)) {
                        expanded.extend(word_runs(&keyword));
                    }
                    common = Some(match common {
                        None => expanded,
                        Some(prev) => prev.intersection(&expanded).cloned().collect(),
                    });
                }
                required.extend(prune_subsumed(common.unwrap_or_default()));
            }
            ElemKind::Optional(_) | ElemKind::Regex(_) | ElemKind::Slot(_) => {}
        }
        cursor = elem.original_next;
    }
    required
}

/// Every contiguous run of words in `text`, as verbatim substrings (interior
/// spacing preserved, so substring presence in the input stays a necessary
/// condition).
fn word_runs(text: &str) -> BTreeSet<String> {
    let mut words: Vec<(usize, usize)> = Vec::new();
    let mut start: Option<usize> = None;
    for (i, ch) in text.char_indices() {
        if ch == ' ' {
            if let Some(s) = start.take() {
                words.push((s, i));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        words.push((s, text.len()));
    }

    let mut runs = BTreeSet::new();
    for i in 0..words.len() {
        for j in i..words.len() {
            runs.insert(text[words[i].0..words[j].1].to_string());
        }
    }
    runs
}

/// Drop every candidate contained in a longer one; checking the longer
/// substring implies the shorter.
fn prune_subsumed(candidates: BTreeSet<String>) -> BTreeSet<String> {
    candidates
        .iter()
        .filter(|c| !candidates.iter().any(|o| o.len() > c.len() && o.contains(c.as_str())))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::{MatchContext, compile};

    #[test]
    fn sequence_literals_are_required() {
        let pattern = compile("broadcast %number% to console").unwrap();
        assert_eq!(pattern.keywords(), ["broadcast", "to console"]);
    }

    #[test]
    fn optionals_and_choice_minorities_are_not_required() {
        let pattern = compile("send [the] message (now|later)").unwrap();
        // "the" is optional; "now"/"later" differ per branch
        assert_eq!(pattern.keywords(), ["message", "send"]);
    }

    #[test]
    fn literal_shared_by_all_branches_is_required() {
        let pattern = compile("(stop the server|reload the server)").unwrap();
        assert_eq!(pattern.keywords(), ["the server"]);
    }

    #[test]
    fn choice_keeps_only_maximal_common_word_runs() {
        let pattern = compile("(turn the old server off|reboot the old server)").unwrap();
        assert_eq!(pattern.keywords(), ["the old server"]);
    }

    #[test]
    fn keyword_never_spans_a_multi_space_run() {
        // "hello  world" also accepts "hello world" (one space elides), so
        // the doubled-space text as a whole must not become a keyword.
        let pattern = compile("hello  world").unwrap();
        assert_eq!(pattern.keywords(), ["hello", "world"]);
        assert!(pattern.prefilter("hello world"));
    }

    #[test]
    fn prefilter_rejects_without_tree_traversal() {
        let pattern = compile("broadcast <.+>").unwrap();
        assert!(!pattern.prefilter("say hello"));
        assert!(pattern.prefilter("broadcast hello"));
    }

    #[test]
    fn prefilter_never_rejects_what_the_matcher_accepts() {
        // Small corpus of patterns x inputs; the implication
        // prefilter == false  =>  match == None  must hold everywhere.
        let sources = [
            "hello",
            "hello [cruel ]world",
            "say (hi|hello) [to everyone]",
            "(a|ab) b",
            "[very ]fast <.+>",
            "stop [the] (server|machine)",
            "(stop the server|reload the server)",
            "on <.+> press",
        ];
        let inputs = [
            "hello",
            "hello world",
            "hello cruel world",
            "say hi",
            "say hello to everyone",
            "a b",
            "ab b",
            "fast forward",
            "very fast forward",
            "stop the server",
            "stop machine",
            "reload the server",
            "on space press",
            "completely unrelated",
            "",
        ];

        let ctx = MatchContext::default();
        for source in sources {
            let pattern = compile(source).unwrap();
            for input in inputs {
                if !pattern.prefilter(input) {
                    // Bypass the prefilter so the implication is not circular.
                    assert!(
                        pattern.match_unfiltered(input, &ctx).is_none(),
                        "prefilter false negative: pattern {:?}, input {:?}",
                        source,
                        input
                    );
                }
            }
        }
    }
}
