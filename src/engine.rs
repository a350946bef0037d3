//! Pattern-matching engine.
//!
//! This module is the internal core behind [`crate::Pattern`]. It is split
//! into focused submodules under `src/engine/` while keeping paths stable for
//! the public wrappers in `src/api.rs`.
//!
//! ## How the parts work together
//!
//! Compilation happens once per registered pattern; matching happens per
//! input line:
//!
//! ```text
//! pattern source ── compiler.rs ──▶ element arena      (element.rs)
//!                                      │
//!                                      ├─ keywords derived once (keyword.rs)
//!                                      │
//! input line ── prefilter ─────────────┤  reject cheaply, or:
//!                                      ▼
//!                               match_element          (matcher.rs)
//!                                 - backtracking by continuation
//!                                 - boundaries from the tokenizer (boundary.rs)
//!                                 - slot spans via the resolver   (resolve.rs)
//!                                 - state cloned per branch point (state.rs)
//!                                      │
//!                                      ▼
//!                               Option<MatchState> ──▶ MatchResult
//!
//! stringify.rs reads only the original tree shape and is independent
//! of matching entirely.
//! ```
//!
//! ## Responsibilities by module
//!
//! - `element.rs`: the arena of tagged-union nodes and its two link chains
//!   (match-time continuation vs. original shape), plus slot counting.
//! - `matcher.rs`: the recursive backtracking algorithm.
//! - `state.rs`: the per-attempt mutable record (cursor, slots, captures,
//!   tags), cloned at branch points.
//! - `keyword.rs`: the mandatory-literal prefilter.
//! - `stringify.rs`: canonical rendering and surface-form enumeration.
//! - `boundary.rs`: the tokenizer contract for legal split points.
//! - `resolve.rs`: the type-resolver contract for slot spans.
//!
//! ## Concurrency
//!
//! A compiled arena is immutable: sharing one pattern across threads and
//! matching many inputs concurrently needs no synchronization. All mutability
//! lives in the per-attempt `MatchState`, which is never shared.
//!
//! ## Debugging
//!
//! Set `PHRASAL_DEBUG_MATCH=1` to print prefilter rejections and match
//! attempts.

#[path = "engine/boundary.rs"]
mod boundary;
#[path = "engine/element.rs"]
mod element;
#[path = "engine/keyword.rs"]
mod keyword;
#[path = "engine/matcher.rs"]
mod matcher;
#[path = "engine/resolve.rs"]
mod resolve;
#[path = "engine/state.rs"]
mod state;
#[path = "engine/stringify.rs"]
mod stringify;

pub use boundary::{DefaultTokenizer, Tokenizer};
pub use resolve::{RejectAllResolver, SlotQuery, TypeResolver};
pub use state::RegexCapture;

pub(crate) use element::{Arena, ElemId, ElemKind, RegexElem, SlotElem};
pub(crate) use keyword::{build_keywords, keywords_present};
pub(crate) use matcher::match_element;
pub(crate) use state::MatchState;
pub(crate) use stringify::{all_combinations, full_string};
