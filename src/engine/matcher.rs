//! Recursive backtracking matcher.
//!
//! Matching works by continuation: every element either consumes input and
//! defers to its `next` link, or tries several sub-paths and keeps the first
//! one for which the *entire remainder* of the pattern also matches through to
//! end-of-input. There is no partial-match mode and no "longest match" rule:
//! the first accepting derivation in declaration order wins, and a successful
//! match is never re-attempted.
//!
//! ```text
//! Literal ── consume ──▶ next
//! Choice  ── clone state per alternative, declared order ──▶ first success
//! Optional ── try included (with continuation), then skipped ──▶
//! Regex/Slot ── for each legal boundary (increasing): accept span? recurse ──▶
//! (no next) ── succeed iff cursor == end of input
//! ```
//!
//! Failure is a plain `None`: frequent, silent, and free of error machinery.
//! Backtracking happens purely through return values: a failed sub-path drops
//! its cloned state and the caller tries the next alternative or boundary.

use super::element::{Arena, ElemId, ElemKind};
use super::resolve::SlotQuery;
use super::state::{MatchState, RegexCapture};
use crate::{MatchContext, Span};

/// Match `id` (or the end-of-pattern terminal when `None`) against `input`
/// starting at the state's cursor.
pub(crate) fn match_element(
    arena: &Arena,
    id: Option<ElemId>,
    input: &str,
    state: MatchState,
    ctx: &MatchContext<'_>,
) -> Option<MatchState> {
    let Some(id) = id else {
        // Trailing unconsumed input is always a failure.
        return (state.offset == input.len()).then_some(state);
    };

    let elem = arena.get(id);
    let mut state = state;
    if let Some(tag) = &elem.tag {
        // Abandoned paths drop their cloned state, and the tag with it.
        state.tags.push(tag.clone());
    }

    match &elem.kind {
        ElemKind::Literal(text) => {
            let start = state.offset;
            let mut offset = start;
            for ch in text.chars() {
                if ch == ' ' {
                    // A literal space is elidable where an omitted optional
                    // or an empty choice branch removed the text around it:
                    // at input start/end, or merged into an adjacent space.
                    if offset == 0 || offset == input.len() {
                        continue;
                    }
                    if input[offset..].starts_with(' ') {
                        offset += 1;
                        continue;
                    }
                    if input[..offset].ends_with(' ') {
                        continue;
                    }
                    return None;
                }
                let candidate = input[offset..].chars().next()?;
                if !ch.eq_ignore_ascii_case(&candidate) {
                    return None;
                }
                offset += candidate.len_utf8();
            }
            // Word-edge legality is the tokenizer's call, so "is" cannot
            // match inside "list".
            if starts_alphanumeric(text) && !ctx.tokenizer.is_boundary(input, start) {
                return None;
            }
            if ends_alphanumeric(text) && !ctx.tokenizer.is_boundary(input, offset) {
                return None;
            }
            state.offset = offset;
            match_element(arena, elem.next, input, state, ctx)
        }

        ElemKind::Group(child) => match_element(arena, Some(*child), input, state, ctx),

        ElemKind::Choice(branches) => {
            for &branch in branches {
                if let Some(ok) = match_element(arena, Some(branch), input, state.clone(), ctx) {
                    return Some(ok);
                }
            }
            None
        }

        ElemKind::Optional(child) => {
            // Inclusion before omission. The wrapped element's tail links to
            // this element's continuation, so the included path flows on.
            if let Some(ok) = match_element(arena, Some(*child), input, state.clone(), ctx) {
                return Some(ok);
            }
            match_element(arena, elem.next, input, state, ctx)
        }

        ElemKind::Regex(re) => {
            let start = state.offset;
            let mut boundary = ctx.tokenizer.next_split(input, start);
            while let Some(end) = boundary {
                if let Some(span) = input.get(start..end) {
                    if let Some(caps) = re.anchored.captures(span) {
                        let mut attempt = state.clone();
                        attempt.offset = end;
                        if let Some(mut ok) = match_element(arena, elem.next, input, attempt, ctx) {
                            // Deeper regex elements (later in the text) have
                            // already pushed their captures while unwinding;
                            // front insertion restores left-to-right order.
                            ok.captures.insert(0, capture_spans(&caps, start));
                            return Some(ok);
                        }
                    }
                }
                boundary = ctx.tokenizer.next_split(input, end);
            }
            None
        }

        ElemKind::Slot(slot) => {
            let start = state.offset;
            let mut boundary = ctx.tokenizer.next_split(input, start);
            while let Some(end) = boundary {
                if let Some(text) = input.get(start..end) {
                    let query = SlotQuery {
                        names: &slot.names,
                        flags: slot.flags,
                        coercion: slot.coercion.as_deref(),
                        exclude_trailing: slot.exclude_trailing,
                        text,
                        parse_flags: state.flags,
                        mode: state.mode,
                    };
                    if let Some(value) = ctx.resolver.resolve(&query) {
                        let mut attempt = state.clone();
                        attempt.offset = end;
                        attempt.slots[slot.index] = Some(value);
                        if let Some(ok) = match_element(arena, elem.next, input, attempt, ctx) {
                            return Some(ok);
                        }
                    }
                }
                boundary = ctx.tokenizer.next_split(input, end);
            }
            None
        }
    }
}

fn starts_alphanumeric(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_alphanumeric)
}

fn ends_alphanumeric(text: &str) -> bool {
    text.chars().next_back().is_some_and(char::is_alphanumeric)
}

fn capture_spans(caps: &regex::Captures<'_>, base: usize) -> RegexCapture {
    let groups: Vec<Option<Span>> = (0..caps.len())
        .map(|i| caps.get(i).map(|g| Span::new(base + g.start(), base + g.end())))
        .collect();
    let span = groups.first().copied().flatten().unwrap_or(Span::new(base, base));
    RegexCapture { span, groups }
}

#[cfg(test)]
mod tests {
    use crate::{MatchContext, SlotQuery, SlotValue, compile};
    use std::sync::Arc;

    /// Resolver accepting spans that parse as `f64` when "number" is among
    /// the candidate type names.
    fn number_resolver(query: &SlotQuery<'_>) -> Option<SlotValue> {
        if !query.names.iter().any(|n| n == "number") {
            return None;
        }
        let value: f64 = query.text.trim().parse().ok()?;
        Some(Arc::new(value) as SlotValue)
    }

    #[test]
    fn declared_order_beats_longest_match() {
        // Tags make the winning alternative observable.
        let pattern = compile("(x:a|y:ab) b").unwrap();
        let ctx = MatchContext::default();

        let result = pattern.try_match("a b", &ctx).unwrap();
        assert_eq!(result.tags(), ["x"]);

        // The first alternative cannot carry the full pattern here, so the
        // second wins despite being declared later.
        let result = pattern.try_match("ab b", &ctx).unwrap();
        assert_eq!(result.tags(), ["y"]);
    }

    #[test]
    fn optional_is_included_before_omitted() {
        let pattern = compile("[a ]b").unwrap();
        let ctx = MatchContext::default();
        assert!(pattern.try_match("b", &ctx).is_some());
        assert!(pattern.try_match("a b", &ctx).is_some());
    }

    #[test]
    fn literal_space_elides_next_to_omitted_content() {
        let ctx = MatchContext::default();

        let pattern = compile("hello [world]").unwrap();
        assert!(pattern.try_match("hello", &ctx).is_some());
        assert!(pattern.try_match("hello world", &ctx).is_some());

        let pattern = compile("ping (now|)").unwrap();
        assert!(pattern.try_match("ping", &ctx).is_some());
        assert!(pattern.try_match("ping now", &ctx).is_some());
    }

    #[test]
    fn literal_space_between_words_is_not_elidable() {
        let pattern = compile("a b").unwrap();
        let ctx = MatchContext::default();
        assert!(pattern.try_match("a b", &ctx).is_some());
        assert!(pattern.try_match("ab", &ctx).is_none());
    }

    #[test]
    fn matcher_accepts_every_enumerated_combination() {
        let pattern = compile("hello[ cruel] world[ now]").unwrap();
        let ctx = MatchContext::default();
        for combo in pattern.combinations(true) {
            assert!(pattern.try_match(&combo, &ctx).is_some(), "rejected {combo:?}");
        }
    }

    #[test]
    fn optional_tag_present_only_when_included() {
        let pattern = compile("hello [a:world]").unwrap();
        let ctx = MatchContext::default();
        assert_eq!(pattern.try_match("hello world", &ctx).unwrap().tags(), ["a"]);
        assert!(pattern.try_match("hello", &ctx).unwrap().tags().is_empty());
    }

    #[test]
    fn captures_come_back_in_text_order() {
        let pattern = compile(r"<\w+> and <\w+>").unwrap();
        let ctx = MatchContext::default();
        let result = pattern.try_match("x and y", &ctx).unwrap();
        let texts: Vec<&str> = (0..result.captures().len())
            .map(|i| result.capture_text(i, 0).unwrap())
            .collect();
        assert_eq!(texts, ["x", "y"]);
    }

    #[test]
    fn trailing_input_is_a_failure() {
        let pattern = compile("stop").unwrap();
        let ctx = MatchContext::default();
        assert!(pattern.try_match("stop", &ctx).is_some());
        assert!(pattern.try_match("stop now", &ctx).is_none());
        assert!(pattern.try_match("sto", &ctx).is_none());
    }

    #[test]
    fn literal_respects_word_edges() {
        let pattern = compile("is").unwrap();
        let ctx = MatchContext::default();
        assert!(pattern.try_match("is", &ctx).is_some());
        assert!(pattern.try_match("list", &ctx).is_none());
    }

    #[test]
    fn literal_matching_is_case_insensitive() {
        let pattern = compile("broadcast message").unwrap();
        let ctx = MatchContext::default();
        assert!(pattern.try_match("Broadcast Message", &ctx).is_some());
        assert!(pattern.try_match("BROADCAST MESSAGE", &ctx).is_some());
    }

    #[test]
    fn slot_binds_resolved_value_at_its_index() {
        let pattern = compile("wait %number% seconds").unwrap();
        let ctx = MatchContext::new(&number_resolver);
        let result = pattern.try_match("wait 2.5 seconds", &ctx).unwrap();
        let value = result.slot(0).unwrap().downcast_ref::<f64>().copied();
        assert_eq!(value, Some(2.5));
    }

    #[test]
    fn untaken_choice_branch_leaves_its_slot_unbound() {
        let pattern = compile("%number% (and %number%|)").unwrap();
        let ctx = MatchContext::new(&number_resolver);

        let result = pattern.try_match("4", &ctx).unwrap();
        assert!(result.slot(0).is_some());
        assert!(result.slot(1).is_none());

        let result = pattern.try_match("4 and 7", &ctx).unwrap();
        assert_eq!(result.slot(0).unwrap().downcast_ref::<f64>(), Some(&4.0));
        assert_eq!(result.slot(1).unwrap().downcast_ref::<f64>(), Some(&7.0));
    }

    #[test]
    fn slot_backtracks_across_boundaries() {
        // The slot must not greedily swallow " 1" once "1 and" fails to
        // resolve; it has to settle on the boundary that lets the rest match.
        let pattern = compile("%number% and %number%").unwrap();
        let ctx = MatchContext::new(&number_resolver);
        let result = pattern.try_match("10 and 3", &ctx).unwrap();
        assert_eq!(result.slot(0).unwrap().downcast_ref::<f64>(), Some(&10.0));
        assert_eq!(result.slot(1).unwrap().downcast_ref::<f64>(), Some(&3.0));
    }

    #[test]
    fn regex_backtracks_to_a_boundary_that_lets_the_rest_match() {
        let pattern = compile("<.+> done").unwrap();
        let ctx = MatchContext::default();
        let result = pattern.try_match("a b done", &ctx).unwrap();
        assert_eq!(result.capture_text(0, 0), Some("a b"));
    }

    #[test]
    fn empty_pattern_matches_only_empty_input() {
        let pattern = compile("").unwrap();
        let ctx = MatchContext::default();
        assert!(pattern.try_match("", &ctx).is_some());
        assert!(pattern.try_match("x", &ctx).is_none());
    }
}
