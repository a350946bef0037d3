mod debug_report;

use phrasal::{MatchContext, SlotQuery, SlotValue, compile};
use std::io::{self, IsTerminal, Read};
use std::sync::Arc;

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let pattern = match compile(&config.pattern) {
        Ok(pattern) => pattern,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let ctx = MatchContext::new(&demo_resolver);
    let attempt = config.input.as_deref().map(|input| (input, pattern.try_match(input, &ctx)));
    let missed = matches!(&attempt, Some((_, None)));
    debug_report::print_run(&pattern, attempt, config.color);
    if missed {
        std::process::exit(1);
    }
}

/// Built-in resolver for inspecting patterns from the command line: `number`
/// slots accept anything that parses as `f64`, `text` slots accept any span.
fn demo_resolver(query: &SlotQuery<'_>) -> Option<SlotValue> {
    for name in query.names {
        match name.as_str() {
            "number" => {
                if let Ok(value) = query.text.trim().parse::<f64>() {
                    return Some(Arc::new(value) as SlotValue);
                }
            }
            "text" => return Some(Arc::new(query.text.to_string()) as SlotValue),
            _ => {}
        }
    }
    None
}

struct CliConfig {
    pattern: String,
    input: Option<String>,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut pattern: Option<String> = None;
    let mut input: Option<String> = None;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("phrasal {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--match" | "-m" => {
                let value = args.next().ok_or_else(|| "error: --match expects a value".to_string())?;
                if input.is_some() {
                    return Err("error: match input provided multiple times".to_string());
                }
                input = Some(value);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if pattern.is_some() {
                        return Err("error: pattern provided multiple times".to_string());
                    }
                    pattern = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--match=") => {
                let value = arg.trim_start_matches("--match=");
                if input.is_some() {
                    return Err("error: match input provided multiple times".to_string());
                }
                input = Some(value.to_string());
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                if pattern.is_some() {
                    return Err("error: pattern provided multiple times".to_string());
                }
                pattern = Some(rest);
                break;
            }
        }
    }

    let pattern = match pattern {
        Some(value) => value,
        None => read_stdin_pattern()?,
    };

    if pattern.trim().is_empty() {
        return Err(format!("error: no pattern provided\n\n{}", help_text()));
    }

    Ok(CliConfig { pattern, input, color })
}

fn read_stdin_pattern() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer.trim_end_matches(['\r', '\n']).to_string())
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "phrasal {version}

Syntax-pattern inspector CLI.

Usage:
  phrasal [OPTIONS] [--] <pattern...>
  phrasal [OPTIONS] --match <text> -- <pattern...>

Options:
  -m, --match <text>   Input line to match against the pattern. `number` and
                       `text` slots resolve with a built-in demo resolver.
  --color              Force ANSI color output.
  --no-color           Disable ANSI color output.
  -h, --help           Show this help message.
  -V, --version        Print version information.

If no pattern is given on the command line, one is read from stdin.

Exit codes:
  0  Pattern compiled (and matched, when --match is given).
  1  Pattern failed to compile, or --match input did not match.
  2  Invalid arguments or missing pattern.
",
        version = env!("CARGO_PKG_VERSION")
    )
}
