//! Pattern element arena.
//!
//! A compiled pattern is a tree of tagged nodes stored in a single `Vec` and
//! addressed by index (`ElemId`). Nodes never hold references to each other;
//! instead each node stores the index of its *continuation*, the rest of the
//! pattern after it. This keeps the compiled tree trivially `Send + Sync` and
//! lets the matcher share it across threads without synchronization.
//!
//! ## Two link chains
//!
//! Every node carries two forward links:
//!
//! - `next`: the match-time continuation. Construction propagates this link
//!   into *every* branch tail of a choice/optional/group, so that each branch,
//!   once matched, flows into the same remainder of the pattern.
//! - `original_next`: the pre-propagation shape of the pattern. Branch tails
//!   keep `original_next = None`, so walking this chain stays inside the
//!   construct it started in. Stringification and combination enumeration use
//!   only this chain.
//!
//! ```text
//! pattern: "say (hi|bye) now"
//!
//! Literal("say ") ──next──▶ Group ──next──▶ Literal(" now")
//!                             │
//!                             ▼ Choice
//!                     ┌─ Literal("hi")  ─next─▶ Literal(" now")
//!                     └─ Literal("bye") ─next─▶ Literal(" now")
//! ```
//!
//! ## Invariants
//!
//! - The arena is mutated only during compilation; after `Pattern` is built it
//!   is read-only.
//! - Forward links are acyclic: `set_last_next` walks strictly toward tails.
//! - `SlotElem::index` values are assigned in source order and are dense:
//!   `0..slot_count`.

use crate::SlotFlags;
use regex::Regex;

/// Index of an element inside its [`Arena`].
pub(crate) type ElemId = usize;

#[derive(Debug)]
pub(crate) struct Elem {
    pub kind: ElemKind,
    /// Match-time continuation (propagated into branch tails).
    pub next: Option<ElemId>,
    /// Pre-propagation shape, used by stringification/enumeration.
    pub original_next: Option<ElemId>,
    /// Parse tag recorded in the match state when this element is entered.
    pub tag: Option<String>,
}

/// One node kind of a compiled pattern.
#[derive(Debug)]
pub(crate) enum ElemKind {
    /// Fixed run of text, matched verbatim but ASCII-case-insensitively.
    /// Includes its surrounding single spaces; those are elidable when the
    /// adjacent optional/choice content is omitted. May be empty (a tagged
    /// or empty choice branch).
    Literal(String),
    /// Transparent precedence wrapper from `(...)`; matches via its child.
    Group(ElemId),
    /// Ordered alternatives from `a|b|c`; declaration order is a contract.
    Choice(Vec<ElemId>),
    /// Skippable element from `[...]`; inclusion is tried before omission.
    Optional(ElemId),
    /// Embedded regular expression from `<...>`.
    Regex(RegexElem),
    /// Typed placeholder from `%...%`, resolved externally.
    Slot(SlotElem),
}

#[derive(Debug)]
pub(crate) struct RegexElem {
    /// Source text as written between `<` and `>`.
    pub source: String,
    /// The source compiled as `^(?:source)$`, so candidate spans must match
    /// in full (mirrors region matching against a fixed candidate boundary).
    pub anchored: Regex,
}

#[derive(Debug)]
pub(crate) struct SlotElem {
    /// Candidate type names, in declaration order (`%number/timespan%`).
    pub names: Vec<String>,
    pub flags: SlotFlags,
    /// Named coercion from an `@name` suffix, interpreted by the resolver.
    pub coercion: Option<String>,
    /// Trailing-`,` marker: the resolver should leave a single trailing
    /// comma-separated value out of a resolved list.
    pub exclude_trailing: bool,
    /// Position of this slot in the bound-value array of a match state.
    pub index: usize,
}

#[derive(Debug, Default)]
pub(crate) struct Arena {
    elems: Vec<Elem>,
}

impl Arena {
    pub fn push(&mut self, kind: ElemKind, tag: Option<String>) -> ElemId {
        let id = self.elems.len();
        self.elems.push(Elem { kind, next: None, original_next: None, tag });
        id
    }

    pub fn get(&self, id: ElemId) -> &Elem {
        &self.elems[id]
    }

    /// Create an optional element around `child`.
    ///
    /// A group child with no continuation is unwrapped first, so `[(a|b)]`
    /// compiles to the same tree as `[a|b]`.
    pub fn push_optional(&mut self, child: ElemId) -> ElemId {
        let child = match &self.elems[child].kind {
            ElemKind::Group(inner) if self.elems[child].next.is_none() => *inner,
            _ => child,
        };
        self.push(ElemKind::Optional(child), None)
    }

    pub fn set_tag(&mut self, id: ElemId, tag: String) {
        self.elems[id].tag = Some(tag);
    }

    pub fn set_original_next(&mut self, id: ElemId, next: Option<ElemId>) {
        self.elems[id].original_next = next;
    }

    /// Set the continuation of `id`, propagating it into every branch tail.
    ///
    /// For a choice this appends `next` to the tail of each alternative; for
    /// an optional/group, to the tail of the wrapped element. Tails that are
    /// themselves branching propagate recursively.
    pub fn set_next(&mut self, id: ElemId, next: Option<ElemId>) {
        self.elems[id].next = next;
        match &self.elems[id].kind {
            ElemKind::Choice(branches) => {
                for branch in branches.clone() {
                    self.set_last_next(branch, next);
                }
            }
            ElemKind::Optional(child) | ElemKind::Group(child) => {
                let child = *child;
                self.set_last_next(child, next);
            }
            ElemKind::Literal(_) | ElemKind::Regex(_) | ElemKind::Slot(_) => {}
        }
    }

    /// Walk the `next` chain from `id` to its tail and set the tail's
    /// continuation to `next`.
    fn set_last_next(&mut self, mut id: ElemId, next: Option<ElemId>) {
        loop {
            match self.elems[id].next {
                Some(n) => id = n,
                None => {
                    self.set_next(id, next);
                    return;
                }
            }
        }
    }

    /// Maximum number of slots bindable on any single accepting path starting
    /// at `first`.
    ///
    /// A choice contributes only the maximum over its branches: exactly one
    /// branch is taken per match, so the others' slots stay unbound (null),
    /// not absent. Walks the original shape.
    pub fn non_null_slot_count(&self, first: Option<ElemId>) -> usize {
        let mut count = 0;
        let mut cursor = first;
        while let Some(id) = cursor {
            let elem = &self.elems[id];
            match &elem.kind {
                ElemKind::Choice(branches) => {
                    count += branches
                        .iter()
                        .map(|&b| self.non_null_slot_count(Some(b)))
                        .max()
                        .unwrap_or(0);
                }
                ElemKind::Group(child) | ElemKind::Optional(child) => {
                    count += self.non_null_slot_count(Some(*child));
                }
                ElemKind::Slot(_) => count += 1,
                ElemKind::Literal(_) | ElemKind::Regex(_) => {}
            }
            cursor = elem.original_next;
        }
        count
    }

    /// All slot elements reachable through the original shape, in source
    /// order (which is also bound-array index order).
    pub fn slot_elements(&self, first: Option<ElemId>) -> Vec<&SlotElem> {
        let mut slots = Vec::new();
        self.collect_slots(first, &mut slots);
        slots
    }

    fn collect_slots<'a>(&'a self, first: Option<ElemId>, out: &mut Vec<&'a SlotElem>) {
        let mut cursor = first;
        while let Some(id) = cursor {
            let elem = &self.elems[id];
            match &elem.kind {
                ElemKind::Choice(branches) => {
                    for &branch in branches {
                        self.collect_slots(Some(branch), out);
                    }
                }
                ElemKind::Group(child) | ElemKind::Optional(child) => {
                    self.collect_slots(Some(*child), out);
                }
                ElemKind::Slot(slot) => out.push(slot),
                ElemKind::Literal(_) | ElemKind::Regex(_) => {}
            }
            cursor = elem.original_next;
        }
    }
}
