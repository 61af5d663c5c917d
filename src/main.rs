mod debug_report;

use chrono::NaiveDateTime;
use datepattern::{Context, DateTimeParser, Moment, Options};
use std::io::{self, IsTerminal, Read};
use std::time::Instant;

const DEFAULT_REFERENCE: &str = "1997-07-10T12:00:00";

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let parser = match &config.pattern {
        Some(pattern) => DateTimeParser::new(pattern),
        None => DateTimeParser::standard(config.style),
    };
    let parser = parser.with_context(Context { now: config.reference, century_window: 80 });

    let mut date = Moment::new(config.reference);
    let started = Instant::now();
    let consumed = parser.parse(&config.input, &mut date, &Options { validate: config.validate });
    let elapsed = started.elapsed();

    let outcome = if consumed > 0 { Some((consumed, date.naive())) } else { None };
    debug_report::print_run(&config.input, &parser.describe(), outcome, elapsed, config.color);

    if consumed == 0 {
        std::process::exit(1);
    }
}

struct CliConfig {
    pattern: Option<String>,
    style: usize,
    input: String,
    reference: NaiveDateTime,
    validate: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut pattern: Option<String> = None;
    let mut style: usize = 10;
    let mut input: Option<String> = None;
    let mut reference = parse_reference(DEFAULT_REFERENCE)?;
    let mut validate = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("datepattern {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--validate" => validate = true,
            "-p" | "--pattern" => {
                let value = args.next().ok_or_else(|| "error: --pattern expects a value".to_string())?;
                pattern = Some(value);
            }
            "--style" => {
                let value = args.next().ok_or_else(|| "error: --style expects a value".to_string())?;
                style = value.parse().map_err(|_| format!("error: invalid --style '{value}'"))?;
            }
            "--reference" => {
                let value = args.next().ok_or_else(|| "error: --reference expects a value".to_string())?;
                reference = parse_reference(&value)?;
            }
            "--input" | "-i" => {
                let value = args.next().ok_or_else(|| "error: --input expects a value".to_string())?;
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if input.is_some() {
                        return Err("error: input provided multiple times".to_string());
                    }
                    input = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--pattern=") => {
                pattern = Some(arg.trim_start_matches("--pattern=").to_string());
            }
            _ if arg.starts_with("--style=") => {
                let value = arg.trim_start_matches("--style=");
                style = value.parse().map_err(|_| format!("error: invalid --style '{value}'"))?;
            }
            _ if arg.starts_with("--reference=") => {
                let value = arg.trim_start_matches("--reference=");
                reference = parse_reference(value)?;
            }
            _ if arg.starts_with("--input=") => {
                let value = arg.trim_start_matches("--input=");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value.to_string());
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(rest);
                break;
            }
        }
    }

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };
    let input = input.trim_end_matches('\n').to_string();

    if input.trim().is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { pattern, style, input, reference, validate, color })
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn parse_reference(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .map_err(|_| format!("error: invalid --reference '{value}' (expected YYYY-MM-DDTHH:MM:SS)"))
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "datepattern {version}

Pattern date/time parser CLI.

Usage:
  datepattern [OPTIONS] [--] <input...>
  datepattern [OPTIONS] --input <text>

Options:
  -p, --pattern <pattern>    Letter pattern to parse with, e.g. 'yyyy-MM-dd'.
  --style <0..11>            Use a standard format instead of a pattern.
                             Default: 10 (combined medium).
  --reference <timestamp>    Reference time in YYYY-MM-DDTHH:MM:SS. Seeds the
                             date value and the two-digit-year window.
                             Default: {default_reference}
  --validate                 Reject parses that do not round-trip.
  -i, --input <text>         Input text to parse. If omitted, reads remaining
                             args or stdin when no args are provided.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Exit codes:
  0  Parse succeeded.
  1  Parse failed.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        default_reference = DEFAULT_REFERENCE
    )
}
