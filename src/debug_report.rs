use phrasal::{MatchResult, Pattern, SlotFlags, SlotValue, StringifyOptions};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

const MAX_COMBINATIONS: usize = 24;

pub fn print_run(pattern: &Pattern, attempt: Option<(&str, Option<MatchResult<'_>>)>, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Pattern: \"{}\"", pattern.source()), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Structure ━━━", ansi::GRAY));
    print_structure(pattern, &palette);

    println!("\n{}", palette.paint("━━━ Combinations ━━━", ansi::GRAY));
    print_combinations(pattern, &palette);

    if let Some((input, result)) = attempt {
        println!("\n{}", palette.paint("━━━ Match ━━━", ansi::GRAY));
        print_match(pattern, input, result.as_ref(), &palette);
    }
    println!();
}

fn print_structure(pattern: &Pattern, palette: &ansi::Palette) {
    let clean = StringifyOptions { exclude_parse_tags: true, exclude_type_flags: true };
    println!("  {} {}", palette.dim("canonical:"), palette.paint(pattern.to_string(), ansi::GREEN));
    println!("  {} {}", palette.dim("display:  "), palette.paint(pattern.to_string_with(&clean), ansi::GREEN));

    if pattern.keywords().is_empty() {
        println!("  {} {}", palette.dim("keywords: "), palette.dim("(none; prefilter always passes)"));
    } else {
        let keywords: Vec<String> =
            pattern.keywords().iter().map(|k| format!("\"{k}\"")).collect();
        println!("  {} {}", palette.dim("keywords: "), palette.paint(keywords.join(", "), ansi::YELLOW));
    }

    println!(
        "  {} {} {}",
        palette.dim("slots:    "),
        palette.paint(pattern.slot_count().to_string(), ansi::BLUE),
        palette.dim(format!("(at most {} bindable per match)", pattern.non_null_slot_count())),
    );
    for slot in pattern.slots() {
        let mut notes = Vec::new();
        if slot.flags.contains(SlotFlags::NULLABLE) {
            notes.push("nullable".to_string());
        }
        if slot.flags.contains(SlotFlags::LITERAL) {
            notes.push("literal-only".to_string());
        }
        if slot.flags.contains(SlotFlags::LIST) {
            notes.push("list".to_string());
        }
        if slot.exclude_trailing {
            notes.push("excl. trailing".to_string());
        }
        if let Some(coercion) = &slot.coercion {
            notes.push(format!("@{coercion}"));
        }
        println!(
            "    {} {}{}",
            palette.paint(format!("[{}]", slot.index), ansi::GRAY),
            palette.paint(slot.names.join("/"), ansi::BLUE),
            if notes.is_empty() {
                String::new()
            } else {
                format!("  {}", palette.dim(notes.join(", ")))
            },
        );
    }
}

fn print_combinations(pattern: &Pattern, palette: &ansi::Palette) {
    let combos = pattern.combinations(true);
    for combo in combos.iter().take(MAX_COMBINATIONS) {
        println!("  {}", palette.paint(format!("\"{combo}\""), ansi::GREEN));
    }
    if combos.len() > MAX_COMBINATIONS {
        println!("  {}", palette.dim(format!("... +{} more", combos.len() - MAX_COMBINATIONS)));
    }
}

fn print_match(pattern: &Pattern, input: &str, result: Option<&MatchResult<'_>>, palette: &ansi::Palette) {
    println!("  {} {}", palette.dim("input:"), palette.bold(format!("\"{input}\"")));

    let Some(result) = result else {
        if pattern.prefilter(input) {
            println!("  {}", palette.paint("✗ no match", ansi::YELLOW));
            println!("  {}", palette.dim("Tip: set PHRASAL_DEBUG_MATCH=1 for a trace"));
        } else {
            println!("  {}", palette.paint("✗ rejected by the keyword prefilter", ansi::YELLOW));
        }
        return;
    };

    println!("  {}", palette.paint("✓ match", ansi::GREEN));
    if !result.tags().is_empty() {
        println!("  {} {}", palette.dim("tags:"), palette.paint(result.tags().join(", "), ansi::CYAN));
    }
    for (idx, capture) in result.captures().iter().enumerate() {
        println!(
            "  {} {} {} {}",
            palette.paint(format!("capture[{idx}]"), ansi::GRAY),
            palette.bold(format!("{:?}", result.capture_text(idx, 0).unwrap_or(""))),
            palette.dim("│"),
            palette.paint(format!("span {}..{}", capture.span.start, capture.span.end), ansi::YELLOW),
        );
    }
    for slot in pattern.slots() {
        let rendered = match result.slot(slot.index) {
            Some(value) => palette.paint(fmt_slot_value(value), ansi::GREEN),
            None => palette.dim("(unbound)"),
        };
        println!(
            "  {} {} {} {}",
            palette.paint(format!("slot[{}]", slot.index), ansi::GRAY),
            palette.paint(slot.names.join("/"), ansi::BLUE),
            palette.dim("="),
            rendered,
        );
    }
}

fn fmt_slot_value(value: &SlotValue) -> String {
    if let Some(number) = value.downcast_ref::<f64>() {
        number.to_string()
    } else if let Some(text) = value.downcast_ref::<String>() {
        format!("{text:?}")
    } else {
        "<opaque value>".to_string()
    }
}
