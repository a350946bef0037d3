extern crate self as phrasal;

#[macro_use]
mod macros;
mod api;
mod compiler;
mod engine;

pub use api::{MatchContext, MatchResult, Pattern, SlotInfo, StringifyOptions, compile};
pub use compiler::CompileError;
pub use engine::{DefaultTokenizer, RegexCapture, RejectAllResolver, SlotQuery, Tokenizer, TypeResolver};

use std::any::Any;
use std::sync::Arc;

// --- Shared core types -------------------------------------------------------

/// Byte span into the matched input (`start` inclusive, `end` exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Slice `input` to this span. Returns `""` when out of bounds.
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        input.get(self.start..self.end).unwrap_or("")
    }
}

bitflags::bitflags! {
    /// Flags carried by a type slot, written as prefix characters inside
    /// `%...%`: `-` nullable, `*` literal-only, `~` list-accepting.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SlotFlags: u8 {
        /// `-`: the host must not report an error when the slot stays unbound.
        const NULLABLE = 1 << 0;
        /// `*`: only literal values are acceptable for this slot.
        const LITERAL  = 1 << 1;
        /// `~`: the span may resolve to a comma-separated list of values.
        const LIST     = 1 << 2;
    }
}

bitflags::bitflags! {
    /// What kinds of slot resolution a match attempt is allowed to perform.
    ///
    /// These are opaque to the matcher itself; they are forwarded to the
    /// type resolver with every candidate span.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ParseFlags: u32 {
        const LITERALS    = 1 << 0;
        const EXPRESSIONS = 1 << 1;
    }
}

impl ParseFlags {
    pub const ALL: Self = Self::all();
}

impl Default for ParseFlags {
    fn default() -> Self {
        Self::ALL
    }
}

/// Surrounding-language context a line is being matched in.
///
/// Forwarded to the type resolver; the matcher does not interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParseMode {
    #[default]
    Default,
    Command,
    Script,
}

/// Opaque handle produced by a [`TypeResolver`] for a matched slot span.
///
/// States are cloned at every backtracking branch point, so resolved values
/// are reference-counted rather than owned.
pub type SlotValue = Arc<dyn Any + Send + Sync>;
