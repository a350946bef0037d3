//! Public API surface.
//!
//! A [`Pattern`] is compiled once and is immutable afterwards; matching takes
//! the input line plus a [`MatchContext`] carrying the host's resolver and
//! tokenizer. Failure to match is `None`, not an error: most patterns reject
//! most inputs, and the host simply moves on to the next registered pattern.

use crate::compiler::{self, CompileError};
use crate::engine::{
    self, Arena, DefaultTokenizer, ElemId, MatchState, RegexCapture, RejectAllResolver, Tokenizer,
    TypeResolver,
};
use crate::{ParseFlags, ParseMode, SlotFlags, SlotValue};
use std::collections::BTreeSet;

/// Compile a pattern source into a [`Pattern`].
pub fn compile(source: &str) -> Result<Pattern, CompileError> {
    Pattern::compile(source)
}

/// Per-call environment for a match attempt.
///
/// `flags` and `mode` are opaque to the matcher; they are forwarded to the
/// type resolver with every candidate slot span.
#[derive(Clone, Copy)]
pub struct MatchContext<'a> {
    pub resolver: &'a dyn TypeResolver,
    pub tokenizer: &'a dyn Tokenizer,
    pub flags: ParseFlags,
    pub mode: ParseMode,
}

impl<'a> MatchContext<'a> {
    /// Context with the default tokenizer, all parse flags, default mode.
    pub fn new(resolver: &'a dyn TypeResolver) -> Self {
        MatchContext {
            resolver,
            tokenizer: &DefaultTokenizer,
            flags: ParseFlags::ALL,
            mode: ParseMode::Default,
        }
    }
}

impl Default for MatchContext<'static> {
    /// Context that rejects every slot. Sufficient for slot-free patterns.
    fn default() -> Self {
        MatchContext::new(&RejectAllResolver)
    }
}

/// Toggles for rendering a pattern without implementation noise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringifyOptions {
    /// Omit `tag:` labels.
    pub exclude_parse_tags: bool,
    /// Omit slot flags, exclusion markers and coercions
    /// (`%-number@1%` renders as `%number%`).
    pub exclude_type_flags: bool,
}

/// Public description of one type slot of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInfo {
    /// Position in the bound-value array of a match result.
    pub index: usize,
    pub names: Vec<String>,
    pub flags: SlotFlags,
    pub coercion: Option<String>,
    pub exclude_trailing: bool,
}

/// A compiled pattern: the element tree plus everything derived once from it
/// (keyword prefilter, slot counts).
///
/// Immutable and `Send + Sync`: one `Pattern` can serve any number of
/// concurrent match calls without synchronization.
pub struct Pattern {
    source: String,
    arena: Arena,
    first: Option<ElemId>,
    slot_count: usize,
    non_null_slot_count: usize,
    keywords: Vec<String>,
}

impl Pattern {
    pub fn compile(source: &str) -> Result<Pattern, CompileError> {
        let compiler::Compiled { arena, first, slot_count } = compiler::compile_source(source)?;
        let keywords = engine::build_keywords(&arena, first);
        let non_null_slot_count = arena.non_null_slot_count(first);
        Ok(Pattern {
            source: source.to_string(),
            arena,
            first,
            slot_count,
            non_null_slot_count,
            keywords,
        })
    }

    /// The source text this pattern was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Literal texts required on every accepting path (the prefilter set).
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Size of the bound-slot array of every match result, fixed at compile
    /// time regardless of which branches a match takes.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Maximum number of slots any single accepting path can bind; slots on
    /// untaken branches stay `None`.
    pub fn non_null_slot_count(&self) -> usize {
        self.non_null_slot_count
    }

    /// All type slots, in bound-array index order.
    pub fn slots(&self) -> Vec<SlotInfo> {
        self.arena
            .slot_elements(self.first)
            .into_iter()
            .map(|slot| SlotInfo {
                index: slot.index,
                names: slot.names.clone(),
                flags: slot.flags,
                coercion: slot.coercion.clone(),
                exclude_trailing: slot.exclude_trailing,
            })
            .collect()
    }

    /// Cheap necessary condition: `false` guarantees [`Pattern::try_match`]
    /// would return `None`. `true` guarantees nothing.
    pub fn prefilter(&self, input: &str) -> bool {
        engine::keywords_present(&self.keywords, &input.to_lowercase())
    }

    /// Match `input` against this pattern.
    ///
    /// The input is prefiltered, then trimmed, then matched in full: trailing
    /// unconsumed text is a failure, and the first accepting derivation (in
    /// declaration order) wins.
    pub fn try_match<'p>(&'p self, input: &str, ctx: &MatchContext<'_>) -> Option<MatchResult<'p>> {
        let debug = std::env::var_os("PHRASAL_DEBUG_MATCH").is_some();
        if !self.prefilter(input) {
            if debug {
                eprintln!("[prefilter:reject] pattern={:?} input={:?}", self.source, input);
            }
            return None;
        }
        let result = self.match_unfiltered(input, ctx);
        if debug {
            eprintln!(
                "[match:{}] pattern={:?} input={:?}",
                if result.is_some() { "ok" } else { "fail" },
                self.source,
                input
            );
        }
        result
    }

    /// Full match without the keyword shortcut. The prefilter soundness
    /// contract is stated against this.
    pub(crate) fn match_unfiltered<'p>(
        &'p self,
        input: &str,
        ctx: &MatchContext<'_>,
    ) -> Option<MatchResult<'p>> {
        let input = input.trim();
        let state = MatchState::new(self.slot_count, ctx.flags, ctx.mode);
        let accepted = engine::match_element(&self.arena, self.first, input, state, ctx)?;
        Some(MatchResult {
            pattern: self,
            input: input.to_string(),
            slots: accepted.slots,
            captures: accepted.captures,
            tags: accepted.tags,
        })
    }

    /// Render this pattern back into pattern syntax.
    pub fn to_string_with(&self, props: &StringifyOptions) -> String {
        engine::full_string(&self.arena, self.first, props)
    }

    /// Every literal surface string this pattern accepts. `clean` drops tag
    /// labels from the emitted strings.
    pub fn combinations(&self, clean: bool) -> BTreeSet<String> {
        engine::all_combinations(&self.arena, self.first, clean)
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_string_with(&StringifyOptions::default()))
    }
}

impl std::fmt::Debug for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pattern")
            .field("source", &self.source)
            .field("slot_count", &self.slot_count)
            .field("keywords", &self.keywords)
            .finish()
    }
}

/// A successful match: the accepted input plus everything bound on the
/// accepting path.
pub struct MatchResult<'p> {
    pattern: &'p Pattern,
    input: String,
    slots: Vec<Option<SlotValue>>,
    captures: Vec<RegexCapture>,
    tags: Vec<String>,
}

impl<'p> MatchResult<'p> {
    /// The pattern that produced this match.
    pub fn pattern(&self) -> &'p Pattern {
        self.pattern
    }

    /// The (trimmed) input that was matched.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Bound value of slot `index`, or `None` when its branch was not taken.
    pub fn slot(&self, index: usize) -> Option<&SlotValue> {
        self.slots.get(index).and_then(|slot| slot.as_ref())
    }

    /// The full bound-slot array (length is [`Pattern::slot_count`]).
    pub fn slots(&self) -> &[Option<SlotValue>] {
        &self.slots
    }

    /// Regex captures in left-to-right source-text order.
    pub fn captures(&self) -> &[RegexCapture] {
        &self.captures
    }

    /// Text of group `group` of the `capture`-th regex element.
    pub fn capture_text(&self, capture: usize, group: usize) -> Option<&str> {
        self.captures.get(capture).and_then(|c| c.group_text(group, &self.input))
    }

    /// Parse tags on the accepting path, in path order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl std::fmt::Debug for MatchResult<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchResult")
            .field("pattern", &self.pattern.source)
            .field("input", &self.input)
            .field("bound", &self.slots.iter().filter(|s| s.is_some()).count())
            .field("captures", &self.captures)
            .field("tags", &self.tags)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SlotQuery;
    use std::sync::Arc;

    fn number_resolver(query: &SlotQuery<'_>) -> Option<SlotValue> {
        if !query.names.iter().any(|n| n == "number") {
            return None;
        }
        let value: f64 = query.text.trim().parse().ok()?;
        Some(Arc::new(value) as SlotValue)
    }

    #[test]
    fn repeated_matches_are_identical() {
        let pattern = pattern!("set [x:the] <\\w+> to %number%");
        let ctx = MatchContext::new(&number_resolver);

        let first = pattern.try_match("set the speed to 9", &ctx).unwrap();
        for _ in 0..3 {
            let again = pattern.try_match("set the speed to 9", &ctx).unwrap();
            assert_eq!(again.captures(), first.captures());
            assert_eq!(again.tags(), first.tags());
            assert_eq!(
                again.slot(0).unwrap().downcast_ref::<f64>(),
                first.slot(0).unwrap().downcast_ref::<f64>()
            );
        }
    }

    #[test]
    fn match_result_exposes_the_pattern_identity() {
        let pattern = pattern!("hello");
        let ctx = MatchContext::default();
        let result = pattern.try_match("hello", &ctx).unwrap();
        assert!(std::ptr::eq(result.pattern(), &pattern));
        assert_eq!(result.pattern().source(), "hello");
    }

    #[test]
    fn input_is_trimmed_before_matching() {
        let pattern = pattern!("hello world");
        let ctx = MatchContext::default();
        let result = pattern.try_match("  hello world  ", &ctx).unwrap();
        assert_eq!(result.input(), "hello world");
    }

    #[test]
    fn slot_counts_are_fixed_at_compile_time() {
        let pattern = pattern!("%number% (and %number%|)");
        assert_eq!(pattern.slot_count(), 2);
        assert_eq!(pattern.non_null_slot_count(), 2);

        let pattern = pattern!("(%number% and %number%|none)");
        assert_eq!(pattern.slot_count(), 2);
        assert_eq!(pattern.non_null_slot_count(), 2);

        let pattern = pattern!("(%number%|%number%)");
        assert_eq!(pattern.slot_count(), 2);
        // only one branch's slot can ever bind
        assert_eq!(pattern.non_null_slot_count(), 1);
    }

    #[test]
    fn context_fields_reach_the_resolver() {
        struct Probe;
        impl TypeResolver for Probe {
            fn resolve(&self, query: &SlotQuery<'_>) -> Option<SlotValue> {
                assert_eq!(query.parse_flags, ParseFlags::LITERALS);
                assert_eq!(query.mode, ParseMode::Command);
                assert_eq!(query.coercion, Some("1"));
                Some(Arc::new(query.text.to_string()) as SlotValue)
            }
        }
        let pattern = pattern!("%number@1%");
        let ctx = MatchContext {
            resolver: &Probe,
            tokenizer: &DefaultTokenizer,
            flags: ParseFlags::LITERALS,
            mode: ParseMode::Command,
        };
        assert!(pattern.try_match("7", &ctx).is_some());
    }

    #[test]
    fn patterns_are_shareable_across_threads() {
        let pattern = Arc::new(pattern!("ping [x:now]"));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let pattern = Arc::clone(&pattern);
                std::thread::spawn(move || {
                    let ctx = MatchContext::default();
                    let input = if i % 2 == 0 { "ping" } else { "ping now" };
                    pattern.try_match(input, &ctx).is_some()
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }

    #[test]
    fn slot_info_reflects_the_source() {
        let pattern = pattern!("give %*item% to %-number@profile%");
        let slots = pattern.slots();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].names, ["item"]);
        assert_eq!(slots[0].flags, SlotFlags::LITERAL);
        assert_eq!(slots[1].flags, SlotFlags::NULLABLE);
        assert_eq!(slots[1].coercion.as_deref(), Some("profile"));
    }
}
