//! Stringification and combination enumeration.
//!
//! Both operations are read-only and walk the *original* (pre-propagation)
//! shape of the tree, so they are unaffected by the continuation links the
//! matcher uses. Neither depends on matching at all.
//!
//! - Stringification renders a tree back into pattern syntax, optionally
//!   suppressing parse tags and/or type-slot flags (implementation noise a
//!   host may not want to display).
//! - Combination enumeration expands the full set of literal surface strings
//!   a pattern accepts. Regexes and slots are not expandable and contribute
//!   their bracketed source verbatim. The result can be large (a chain of n
//!   optionals yields 2^n strings), so callers enumerate deliberately.

use super::element::{Arena, ElemId, ElemKind, SlotElem};
use crate::SlotFlags;
use crate::api::StringifyOptions;
use std::collections::BTreeSet;

/// Render the chain starting at `first` into pattern syntax.
pub(crate) fn full_string(arena: &Arena, first: Option<ElemId>, props: &StringifyOptions) -> String {
    let mut out = String::new();
    let mut cursor = first;
    while let Some(id) = cursor {
        element_string(arena, id, props, &mut out);
        cursor = arena.get(id).original_next;
    }
    out
}

fn element_string(arena: &Arena, id: ElemId, props: &StringifyOptions, out: &mut String) {
    let elem = arena.get(id);
    if let Some(tag) = &elem.tag {
        if !props.exclude_parse_tags {
            out.push_str(tag);
            out.push(':');
        }
    }
    match &elem.kind {
        ElemKind::Literal(text) => out.push_str(text),
        ElemKind::Group(child) => {
            out.push('(');
            out.push_str(&full_string(arena, Some(*child), props));
            out.push(')');
        }
        ElemKind::Choice(branches) => {
            for (i, &branch) in branches.iter().enumerate() {
                if i > 0 {
                    out.push('|');
                }
                out.push_str(&full_string(arena, Some(branch), props));
            }
        }
        ElemKind::Optional(child) => {
            out.push('[');
            out.push_str(&full_string(arena, Some(*child), props));
            out.push(']');
        }
        ElemKind::Regex(re) => {
            out.push('<');
            out.push_str(&re.source);
            out.push('>');
        }
        ElemKind::Slot(slot) => out.push_str(&slot_string(slot, props.exclude_type_flags)),
    }
}

/// Render a slot as `%...%`, with flags/coercion suppressed on demand
/// (`%-number@1%` becomes `%number%`).
pub(crate) fn slot_string(slot: &SlotElem, exclude_flags: bool) -> String {
    let mut out = String::from("%");
    if !exclude_flags {
        if slot.flags.contains(SlotFlags::NULLABLE) {
            out.push('-');
        }
        if slot.flags.contains(SlotFlags::LITERAL) {
            out.push('*');
        }
        if slot.flags.contains(SlotFlags::LIST) {
            out.push('~');
        }
    }
    out.push_str(&slot.names.join("/"));
    if !exclude_flags {
        if slot.exclude_trailing {
            out.push(',');
        }
        if let Some(coercion) = &slot.coercion {
            out.push('@');
            out.push_str(coercion);
        }
    }
    out.push('%');
    out
}

/// Every literal surface string accepted by the chain starting at `first`.
///
/// Sequencing is the Cartesian product of each element's expansions, joined
/// with a merge rule that keeps junction whitespace sane.
pub(crate) fn all_combinations(arena: &Arena, first: Option<ElemId>, clean: bool) -> BTreeSet<String> {
    let mut combos = match first {
        Some(id) => element_combinations(arena, id, clean),
        None => BTreeSet::new(),
    };
    if combos.is_empty() {
        combos.insert(String::new());
    }
    let mut cursor = first.and_then(|id| arena.get(id).original_next);
    while let Some(id) = cursor {
        let next_combos = element_combinations(arena, id, clean);
        if !next_combos.is_empty() {
            let mut merged = BTreeSet::new();
            for base in &combos {
                for add in &next_combos {
                    merged.insert(join_combination(base, add));
                }
            }
            combos = merged;
        }
        cursor = arena.get(id).original_next;
    }
    combos
}

fn element_combinations(arena: &Arena, id: ElemId, clean: bool) -> BTreeSet<String> {
    let elem = arena.get(id);
    let mut combos = match &elem.kind {
        ElemKind::Literal(text) => BTreeSet::from([text.clone()]),
        ElemKind::Group(child) => all_combinations(arena, Some(*child), clean),
        ElemKind::Choice(branches) => {
            let mut union = BTreeSet::new();
            for &branch in branches {
                union.extend(all_combinations(arena, Some(branch), clean));
            }
            union
        }
        ElemKind::Optional(child) => {
            let mut with = all_combinations(arena, Some(*child), clean);
            with.insert(String::new());
            with
        }
        // Not enumerable: the bracketed source stands in for the infinite set.
        ElemKind::Regex(re) => BTreeSet::from([format!("<{}>", re.source)]),
        ElemKind::Slot(slot) => BTreeSet::from([slot_string(slot, clean)]),
    };
    if !clean {
        if let Some(tag) = &elem.tag {
            combos = combos.into_iter().map(|c| format!("{tag}:{c}")).collect();
        }
    }
    combos
}

/// Join two adjacent expansions, trimming a junction space so optional
/// omissions neither double nor orphan whitespace.
fn join_combination(first: &str, second: &str) -> String {
    if first.chars().all(char::is_whitespace) {
        second.trim_start().to_string()
    } else if second.is_empty() {
        first.trim_end().to_string()
    } else if first.ends_with(' ') && second.starts_with(' ') {
        format!("{}{}", first, second.trim_start())
    } else {
        format!("{first}{second}")
    }
}

#[cfg(test)]
mod tests {
    use crate::{StringifyOptions, compile};
    use std::collections::BTreeSet;

    fn roundtrip(source: &str) -> String {
        compile(source).unwrap().to_string()
    }

    #[test]
    fn stringification_roundtrips() {
        for source in [
            "hello",
            "hello  world",
            "hello [world]",
            "hello (world|server)",
            "hello <.*>",
            "hello [a:world]",
            "hello [%-number%]",
            "hello [%number@1%]",
            "wait %~number,% [more]",
        ] {
            assert_eq!(roundtrip(source), source);
        }
    }

    #[test]
    fn optional_group_normalization_shows_in_stringification() {
        assert_eq!(roundtrip("hello [(world|server)]"), "hello [world|server]");
    }

    #[test]
    fn suppressions_are_independent() {
        let props = StringifyOptions { exclude_parse_tags: true, exclude_type_flags: true };
        assert_eq!(compile("hello [a:world]").unwrap().to_string_with(&props), "hello [world]");
        assert_eq!(compile("hello [%-number%]").unwrap().to_string_with(&props), "hello [%number%]");
        assert_eq!(compile("hello [%number@1%]").unwrap().to_string_with(&props), "hello [%number%]");

        let tags_only = StringifyOptions { exclude_parse_tags: true, ..Default::default() };
        assert_eq!(compile("[x:%-number%]").unwrap().to_string_with(&tags_only), "[%-number%]");
    }

    #[test]
    fn finite_patterns_enumerate_completely() {
        let combos = compile("a [(b|c)]").unwrap().combinations(true);
        let expected: BTreeSet<String> = ["a", "a b", "a c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(combos, expected);
    }

    #[test]
    fn junction_whitespace_is_trimmed() {
        let combos = compile("[a ]b [c]").unwrap().combinations(true);
        let expected: BTreeSet<String> =
            ["b", "b c", "a b", "a b c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(combos, expected);
    }

    #[test]
    fn regex_contributes_its_source_verbatim() {
        let combos = compile("press <.+>").unwrap().combinations(true);
        let expected: BTreeSet<String> = [String::from("press <.+>")].into();
        assert_eq!(combos, expected);
    }

    #[test]
    fn clean_flag_excludes_tag_labels() {
        let pattern = compile("go (n:north|s:south)").unwrap();
        let clean: BTreeSet<String> = ["go north", "go south"].iter().map(|s| s.to_string()).collect();
        assert_eq!(pattern.combinations(true), clean);
        let tagged: BTreeSet<String> =
            ["go n:north", "go s:south"].iter().map(|s| s.to_string()).collect();
        assert_eq!(pattern.combinations(false), tagged);
    }
}
