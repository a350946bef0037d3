//! Pattern-source compiler.
//!
//! Turns a pattern string into an element arena. The surface syntax:
//!
//! ```text
//! literal text      matched verbatim (case-insensitive), spaces included
//! (a|b|c)           group with ordered alternatives
//! [x]               optional element; [(a|b)] normalizes to [a|b]
//! <regex>           embedded regular expression
//! %-*~name/n2,@c%   type slot: flags, candidate names, exclusion marker,
//!                   named coercion
//! tag:              parse tag at the start of a group/optional/choice branch
//! \x                escapes any special character into literal text
//! ```
//!
//! Malformed sources are construction-time errors, never match-time ones: an
//! unbalanced bracket, an unclosed `<`/`%`, an invalid regex or an empty slot
//! name all fail compilation with a [`CompileError`] carrying the byte
//! position of the offense.
//!
//! The compiler also performs the continuation-linking pass: consecutive
//! sequence elements are chained through both `original_next` (the shape) and
//! `next` (the match-time continuation, propagated into branch tails).

use crate::engine::{Arena, ElemId, ElemKind, RegexElem, SlotElem};
use crate::SlotFlags;
use regex::Regex;

/// Error from compiling a pattern source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    message: String,
    position: usize,
}

impl CompileError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        CompileError { message: message.into(), position }
    }

    /// Byte offset into the pattern source where compilation failed.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.position)
    }
}

impl std::error::Error for CompileError {}

/// Output of [`compile_source`]: the arena, its entry element, and the size
/// of the bound-slot array.
pub(crate) struct Compiled {
    pub arena: Arena,
    pub first: Option<ElemId>,
    pub slot_count: usize,
}

pub(crate) fn compile_source(source: &str) -> Result<Compiled, CompileError> {
    let mut compiler = Compiler { src: source, pos: 0, arena: Arena::default(), slot_count: 0 };
    let first = compiler.parse_alternation(None)?;
    if let Some(ch) = compiler.peek() {
        // parse_alternation only stops early on a closer it does not own
        return Err(CompileError::new(format!("unmatched '{ch}'"), compiler.pos));
    }
    Ok(Compiled { arena: compiler.arena, first, slot_count: compiler.slot_count })
}

struct Compiler<'s> {
    src: &'s str,
    pos: usize,
    arena: Arena,
    slot_count: usize,
}

impl<'s> Compiler<'s> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// Parse `a|b|c` up to (not consuming) `closer`. A single branch stays a
    /// plain sequence; multiple branches become a choice element.
    fn parse_alternation(&mut self, closer: Option<char>) -> Result<Option<ElemId>, CompileError> {
        let mut branches: Vec<Option<ElemId>> = Vec::new();
        loop {
            branches.push(self.parse_sequence(closer)?);
            match self.peek() {
                Some('|') => {
                    self.bump();
                }
                _ => break,
            }
        }
        if branches.len() == 1 {
            return Ok(branches.pop().unwrap_or(None));
        }
        let branch_ids: Vec<ElemId> = branches
            .into_iter()
            .map(|head| match head {
                Some(id) => id,
                // an empty branch still needs a node to stand on
                None => self.arena.push(ElemKind::Literal(String::new()), None),
            })
            .collect();
        Ok(Some(self.arena.push(ElemKind::Choice(branch_ids), None)))
    }

    /// Parse one branch: a run of elements ending at `|`, the closer, or EOF.
    fn parse_sequence(&mut self, closer: Option<char>) -> Result<Option<ElemId>, CompileError> {
        let mut elems: Vec<ElemId> = Vec::new();
        let mut literal = String::new();

        // Tags are only meaningful inside a bracketed construct.
        let pending_tag = if closer.is_some() { self.try_parse_tag() } else { None };

        loop {
            let Some(ch) = self.peek() else { break };
            match ch {
                '|' => break,
                ')' | ']' if Some(ch) == closer => break,
                ')' | ']' => {
                    return Err(CompileError::new(format!("unmatched '{ch}'"), self.pos));
                }
                '(' => {
                    self.flush_literal(&mut literal, &mut elems);
                    self.bump();
                    let inner = self.parse_alternation(Some(')'))?;
                    self.expect(')', "unclosed group")?;
                    let child = self.ensure_elem(inner);
                    elems.push(self.arena.push(ElemKind::Group(child), None));
                }
                '[' => {
                    self.flush_literal(&mut literal, &mut elems);
                    self.bump();
                    let inner = self.parse_alternation(Some(']'))?;
                    self.expect(']', "unclosed optional")?;
                    let child = self.ensure_elem(inner);
                    let id = self.arena.push_optional(child);
                    elems.push(id);
                }
                '<' => {
                    self.flush_literal(&mut literal, &mut elems);
                    let id = self.parse_regex()?;
                    elems.push(id);
                }
                '%' => {
                    self.flush_literal(&mut literal, &mut elems);
                    let id = self.parse_slot()?;
                    elems.push(id);
                }
                '\\' => {
                    let at = self.pos;
                    self.bump();
                    match self.bump() {
                        Some(escaped) => literal.push(escaped),
                        None => return Err(CompileError::new("dangling escape", at)),
                    }
                }
                _ => {
                    self.bump();
                    literal.push(ch);
                }
            }
        }
        self.flush_literal(&mut literal, &mut elems);

        if elems.is_empty() {
            return match pending_tag {
                Some(tag) => Ok(Some(self.arena.push(ElemKind::Literal(String::new()), Some(tag)))),
                None => Ok(None),
            };
        }
        if let Some(tag) = pending_tag {
            self.arena.set_tag(elems[0], tag);
        }
        for i in 1..elems.len() {
            self.arena.set_original_next(elems[i - 1], Some(elems[i]));
            self.arena.set_next(elems[i - 1], Some(elems[i]));
        }
        Ok(Some(elems[0]))
    }

    /// `ident:` at the current position, if present.
    fn try_parse_tag(&mut self) -> Option<String> {
        let caps = regex!(r"^([A-Za-z0-9_]+):").captures(&self.src[self.pos..])?;
        let tag = caps[1].to_string();
        self.pos += caps[0].len();
        Some(tag)
    }

    fn parse_regex(&mut self) -> Result<ElemId, CompileError> {
        let open = self.pos;
        self.bump(); // '<'
        let mut source = String::new();
        loop {
            match self.bump() {
                Some('>') => break,
                Some('\\') => {
                    source.push('\\');
                    match self.bump() {
                        Some(escaped) => source.push(escaped),
                        None => return Err(CompileError::new("unclosed regex", open)),
                    }
                }
                Some(ch) => source.push(ch),
                None => return Err(CompileError::new("unclosed regex", open)),
            }
        }
        // Anchored so a candidate span has to match in full.
        let anchored = Regex::new(&format!("^(?:{source})$"))
            .map_err(|err| CompileError::new(format!("invalid regex: {err}"), open))?;
        Ok(self.arena.push(ElemKind::Regex(RegexElem { source, anchored }), None))
    }

    fn parse_slot(&mut self) -> Result<ElemId, CompileError> {
        let open = self.pos;
        self.bump(); // '%'

        let mut flags = SlotFlags::empty();
        loop {
            match self.peek() {
                Some('-') => flags |= SlotFlags::NULLABLE,
                Some('*') => flags |= SlotFlags::LITERAL,
                Some('~') => flags |= SlotFlags::LIST,
                _ => break,
            }
            self.bump();
        }

        let mut names: Vec<String> = Vec::new();
        let mut name = String::new();
        let mut exclude_trailing = false;
        let mut coercion: Option<String> = None;
        loop {
            match self.bump() {
                Some('%') => {
                    names.push(name);
                    break;
                }
                Some('/') => {
                    names.push(std::mem::take(&mut name));
                }
                Some(',') => {
                    names.push(std::mem::take(&mut name));
                    exclude_trailing = true;
                    match self.bump() {
                        Some('%') => {}
                        Some('@') => {
                            coercion = Some(self.parse_coercion(open)?);
                        }
                        _ => return Err(CompileError::new("unclosed type slot", open)),
                    }
                    break;
                }
                Some('@') => {
                    names.push(std::mem::take(&mut name));
                    coercion = Some(self.parse_coercion(open)?);
                    break;
                }
                Some(ch) => name.push(ch),
                None => return Err(CompileError::new("unclosed type slot", open)),
            }
        }
        if names.iter().any(|n| n.is_empty()) {
            return Err(CompileError::new("empty type name in slot", open));
        }

        let index = self.slot_count;
        self.slot_count += 1;
        Ok(self.arena.push(
            ElemKind::Slot(SlotElem { names, flags, coercion, exclude_trailing, index }),
            None,
        ))
    }

    /// `@name` suffix body, consuming through the closing `%`.
    fn parse_coercion(&mut self, open: usize) -> Result<String, CompileError> {
        let mut coercion = String::new();
        loop {
            match self.bump() {
                Some('%') => break,
                Some(ch) => coercion.push(ch),
                None => return Err(CompileError::new("unclosed type slot", open)),
            }
        }
        if coercion.is_empty() {
            return Err(CompileError::new("empty coercion name in slot", open));
        }
        Ok(coercion)
    }

    fn flush_literal(&mut self, literal: &mut String, elems: &mut Vec<ElemId>) {
        if !literal.is_empty() {
            let text = std::mem::take(literal);
            elems.push(self.arena.push(ElemKind::Literal(text), None));
        }
    }

    fn ensure_elem(&mut self, head: Option<ElemId>) -> ElemId {
        match head {
            Some(id) => id,
            None => self.arena.push(ElemKind::Literal(String::new()), None),
        }
    }

    fn expect(&mut self, expected: char, message: &str) -> Result<(), CompileError> {
        match self.peek() {
            Some(ch) if ch == expected => {
                self.bump();
                Ok(())
            }
            _ => Err(CompileError::new(message, self.pos)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SlotFlags, compile};

    #[test]
    fn malformed_sources_fail_at_compile_time() {
        for source in [
            "hello (world",
            "hello [world",
            "hello <.+",
            "hello %number",
            "hello %%",
            "hello %number/%",
            "hello %number@%",
            "bad regex <(+>",
            "dangling \\",
            "stray ) paren",
            "stray ] bracket",
        ] {
            assert!(compile(source).is_err(), "expected failure: {source:?}");
        }
    }

    #[test]
    fn error_reports_position() {
        let err = compile("hello <.+").unwrap_err();
        assert_eq!(err.position(), 6);
    }

    #[test]
    fn escapes_become_literal_text() {
        let pattern = compile(r"100\% done \[ok\]").unwrap();
        assert!(pattern.keywords().iter().any(|k| k == "100% done [ok]"));
    }

    #[test]
    fn slot_indices_follow_source_order() {
        let pattern = compile("%a% then (%b%|%c% and %d%)").unwrap();
        assert_eq!(pattern.slot_count(), 4);
        let indices: Vec<usize> = pattern.slots().iter().map(|s| s.index).collect();
        assert_eq!(indices, [0, 1, 2, 3]);
    }

    #[test]
    fn slot_syntax_parses_fully() {
        let pattern = compile("%-*~number/timespan,@duration%").unwrap();
        let slots = pattern.slots();
        assert_eq!(slots.len(), 1);
        let slot = &slots[0];
        assert_eq!(slot.names, ["number", "timespan"]);
        assert_eq!(slot.flags, SlotFlags::NULLABLE | SlotFlags::LITERAL | SlotFlags::LIST);
        assert_eq!(slot.coercion.as_deref(), Some("duration"));
        assert!(slot.exclude_trailing);
    }

    #[test]
    fn top_level_choice_needs_no_parens() {
        let pattern = compile("start|begin").unwrap();
        assert_eq!(pattern.to_string(), "start|begin");
    }

    #[test]
    fn empty_source_compiles() {
        let pattern = compile("").unwrap();
        assert_eq!(pattern.to_string(), "");
        assert_eq!(pattern.slot_count(), 0);
    }

    #[test]
    fn compile_source_counts_slots_once() {
        let compiled = compile_source("%number% (and %number%|)").unwrap();
        assert_eq!(compiled.slot_count, 2);
        assert_eq!(compiled.arena.non_null_slot_count(compiled.first), 2);
    }
}
