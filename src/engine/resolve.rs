//! Type resolution contract.
//!
//! A slot element (`%number%`) consumes a variable-length span of input, but
//! deciding whether that span *is* a number (or a player, an item, a list of
//! either) belongs to the host's type registry, not to the matcher. The
//! matcher calls the resolver once per candidate boundary with the full slot
//! description and the candidate text, and treats the answer as a black box:
//! `Some` means "this span resolves, keep going", `None` means "try the next
//! boundary".
//!
//! Resolution must be pure with respect to the query: the matcher may probe
//! many boundaries and discard all but one, and a successful match must be
//! reproducible (determinism is part of the matcher's contract).

use crate::{ParseFlags, ParseMode, SlotFlags, SlotValue};

/// Everything a resolver gets to see for one candidate span.
#[derive(Debug, Clone, Copy)]
pub struct SlotQuery<'a> {
    /// Candidate type names, in declaration order. The first name that
    /// accepts the span should win.
    pub names: &'a [String],
    pub flags: SlotFlags,
    /// Named coercion from the pattern's `@name` suffix, if any.
    pub coercion: Option<&'a str>,
    /// Leave a single trailing comma-separated value out of a resolved list.
    pub exclude_trailing: bool,
    /// The candidate span text.
    pub text: &'a str,
    /// Active flags/mode of the surrounding match attempt.
    pub parse_flags: ParseFlags,
    pub mode: ParseMode,
}

/// Converts a matched slot span into a typed value.
pub trait TypeResolver: Send + Sync {
    fn resolve(&self, query: &SlotQuery<'_>) -> Option<SlotValue>;
}

impl<F> TypeResolver for F
where
    F: Fn(&SlotQuery<'_>) -> Option<SlotValue> + Send + Sync,
{
    fn resolve(&self, query: &SlotQuery<'_>) -> Option<SlotValue> {
        self(query)
    }
}

/// Resolver that accepts nothing. Sufficient for patterns without slots.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAllResolver;

impl TypeResolver for RejectAllResolver {
    fn resolve(&self, _query: &SlotQuery<'_>) -> Option<SlotValue> {
        None
    }
}
