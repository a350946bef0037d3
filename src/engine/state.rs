//! Per-attempt match state.
//!
//! A `MatchState` is created fresh for every top-level match call and cloned
//! at every backtracking branch point (each choice alternative, each optional
//! inclusion, each candidate regex/slot boundary). Failed branches simply drop
//! their clone; the surviving state is handed back to the caller on success.
//!
//! Clone cost is proportional to the bound-slot array plus the capture list,
//! never to the input length: backtracking depth dominates the cost of a
//! match, not allocation size.

use crate::{ParseFlags, ParseMode, SlotValue, Span};

/// Mutable record threaded through one match attempt.
#[derive(Clone)]
pub(crate) struct MatchState {
    /// Cursor into the (trimmed) input.
    pub offset: usize,
    /// Bound slot values, indexed by each slot's precomputed position.
    /// `None` means the slot's branch was skipped or not taken.
    pub slots: Vec<Option<SlotValue>>,
    /// Regex captures in left-to-right source-text order. Regex elements
    /// insert at the front while the call stack unwinds to keep this order.
    pub captures: Vec<RegexCapture>,
    /// Parse tags encountered on the accepting path, in path order.
    pub tags: Vec<String>,
    pub flags: ParseFlags,
    pub mode: ParseMode,
}

impl MatchState {
    pub fn new(slot_count: usize, flags: ParseFlags, mode: ParseMode) -> Self {
        MatchState {
            offset: 0,
            slots: vec![None; slot_count],
            captures: Vec::new(),
            tags: Vec::new(),
            flags,
            mode,
        }
    }
}

impl std::fmt::Debug for MatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchState")
            .field("offset", &self.offset)
            .field("bound", &self.slots.iter().filter(|s| s.is_some()).count())
            .field("captures", &self.captures)
            .field("tags", &self.tags)
            .finish()
    }
}

/// One matched regex element: the overall span plus per-group spans, all in
/// absolute byte offsets into the matched input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexCapture {
    pub span: Span,
    /// Group 0 is the whole match; unmatched groups are `None`.
    pub groups: Vec<Option<Span>>,
}

impl RegexCapture {
    /// Span of capture group `index`, if it participated in the match.
    pub fn group(&self, index: usize) -> Option<Span> {
        self.groups.get(index).copied().flatten()
    }

    /// Text of capture group `index` within `input`.
    pub fn group_text<'a>(&self, index: usize, input: &'a str) -> Option<&'a str> {
        self.group(index).map(|span| span.text(input))
    }
}
