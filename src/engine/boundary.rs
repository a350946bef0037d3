//! Input boundary contract.
//!
//! Regex and slot elements do not know their own endpoint: they enumerate
//! candidate end-of-span boundaries forward from the cursor and try each one
//! in increasing order. What counts as a *legal* boundary is a property of the
//! surrounding script language (its quoting and bracket-nesting rules), not of
//! the matcher, so the matcher consumes it as a black-box trait.
//!
//! Literal elements use the same trait to ask whether a word may legally begin
//! or end at an offset, so that `is` never matches inside `list`.
//!
//! ## Default rules
//!
//! [`DefaultTokenizer`] implements the contract for a conventional script
//! surface syntax:
//!
//! - Double-quoted strings are atomic. A doubled quote (`""`) inside a string
//!   is an escaped quote, not a terminator.
//! - `(`, `[`, `{` open nested regions that are skipped to their matching
//!   closer (strings inside them are honored). An unmatched closer is an
//!   ordinary character.
//! - Every other position advances by one character.
//! - An unterminated string or bracket region has no further legal splits.
//!
//! Hosts with different lexical rules supply their own implementation.

/// Legal split points and word edges of an input line.
pub trait Tokenizer: Send + Sync {
    /// The next legal split point strictly after `from`, or `None` when no
    /// further split exists. Successive calls enumerate boundaries in
    /// strictly increasing order up to and including `input.len()`.
    fn next_split(&self, input: &str, from: usize) -> Option<usize>;

    /// Whether a literal word may begin or end at byte offset `at`.
    fn is_boundary(&self, input: &str, at: usize) -> bool;
}

/// Default [`Tokenizer`] honoring double-quoted strings and `()[]{}` nesting.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTokenizer;

impl Tokenizer for DefaultTokenizer {
    fn next_split(&self, input: &str, from: usize) -> Option<usize> {
        if from >= input.len() {
            return None;
        }
        let ch = input[from..].chars().next()?;
        match ch {
            '"' => skip_string(input, from),
            '(' | '[' | '{' => skip_region(input, from, ch),
            _ => Some(from + ch.len_utf8()),
        }
    }

    fn is_boundary(&self, input: &str, at: usize) -> bool {
        if at == 0 || at >= input.len() {
            return true;
        }
        if !input.is_char_boundary(at) {
            return false;
        }
        let before = input[..at].chars().next_back();
        let after = input[at..].chars().next();
        match (before, after) {
            (Some(b), Some(a)) => !(b.is_alphanumeric() && a.is_alphanumeric()),
            _ => true,
        }
    }
}

/// Skip a double-quoted string starting at `open` (which must point at `"`).
/// Returns the offset just after the closing quote.
fn skip_string(input: &str, open: usize) -> Option<usize> {
    let mut chars = input[open + 1..].char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        if ch == '"' {
            // "" is an escaped quote inside the string
            if matches!(chars.peek(), Some((_, '"'))) {
                chars.next();
                continue;
            }
            return Some(open + 1 + i + 1);
        }
    }
    None
}

/// Skip a bracketed region starting at `open`. Handles nesting of the same
/// bracket kind and quoted strings inside the region.
fn skip_region(input: &str, open: usize, open_ch: char) -> Option<usize> {
    let close_ch = match open_ch {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        _ => return None,
    };
    let mut depth = 1usize;
    let mut at = open + open_ch.len_utf8();
    while at < input.len() {
        let ch = input[at..].chars().next()?;
        if ch == '"' {
            at = skip_string(input, at)?;
            continue;
        }
        if ch == open_ch {
            depth += 1;
        } else if ch == close_ch {
            depth -= 1;
            if depth == 0 {
                return Some(at + ch.len_utf8());
            }
        }
        at += ch.len_utf8();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splits(input: &str) -> Vec<usize> {
        let tok = DefaultTokenizer;
        let mut out = Vec::new();
        let mut at = 0;
        while let Some(next) = tok.next_split(input, at) {
            out.push(next);
            at = next;
        }
        out
    }

    #[test]
    fn plain_text_splits_at_every_char() {
        assert_eq!(splits("abc"), vec![1, 2, 3]);
    }

    #[test]
    fn quoted_strings_are_atomic() {
        // "a b" is skipped in one step; no split lands inside it
        assert_eq!(splits(r#"x "a b" y"#), vec![1, 2, 7, 8, 9]);
    }

    #[test]
    fn doubled_quote_does_not_terminate_string() {
        assert_eq!(splits(r#""a""b""#), vec![6]);
    }

    #[test]
    fn brackets_nest() {
        assert_eq!(splits("a (b (c) d) e"), vec![1, 2, 11, 12, 13]);
    }

    #[test]
    fn unterminated_string_has_no_splits() {
        assert_eq!(splits(r#""never ends"#), Vec::<usize>::new());
    }

    #[test]
    fn word_edges() {
        let tok = DefaultTokenizer;
        let input = "set list";
        assert!(tok.is_boundary(input, 0));
        assert!(tok.is_boundary(input, 3)); // between "set" and space
        assert!(tok.is_boundary(input, 4)); // between space and "list"
        assert!(!tok.is_boundary(input, 5)); // inside "list"
        assert!(tok.is_boundary(input, input.len()));
    }
}
