use std::fs;
use std::io::{self, Read};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::process;

use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

use pseudocheck_checker::{check_with_options, expand_shortcuts, CheckOptions, CheckResult};
use pseudocheck_common::config::{self, PseudocheckConfig};
use pseudocheck_common::Diagnostic;

/// Exit status for I/O and configuration failures.
const EXIT_FAILURE: i32 = 2;

/// Pseudocode checker.
///
/// Reports syntax and convention problems in exam-style pseudocode.
#[derive(Parser)]
#[command(
    name = "pseudocheck",
    version,
    about,
    long_about = "Pseudocode checker.\n\nChecks pseudocode line by line and reports errors and warnings.\n\nExamples:\n  pseudocheck sort.pseudo                 Check a file\n  pseudocheck sort.pseudo --json          Print the result as JSON\n  cat sort.pseudo | pseudocheck -         Check standard input\n  pseudocheck sort.pseudo --expand-shortcuts   Accept '<-' as the arrow"
)]
struct Cli {
    /// Input pseudocode file, or '-' for standard input.
    input: PathBuf,

    /// Print the check result as JSON to stdout.
    #[arg(long)]
    json: bool,

    /// Suppress warning output.
    #[arg(short, long)]
    quiet: bool,

    /// Fail when any warning is reported.
    #[arg(long = "deny-warnings")]
    deny_warnings: bool,

    /// Replace typed shortcuts such as '<-' before checking.
    #[arg(long = "expand-shortcuts")]
    expand_shortcuts: bool,

    /// Configuration file (default: nearest Pseudocheck.toml).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let reading_stdin = cli.input.as_os_str() == "-";
    let source = match read_source(&cli.input, reading_stdin) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: could not read '{}': {}", cli.input.display(), e);
            process::exit(EXIT_FAILURE);
        }
    };

    let file_name = if reading_stdin {
        "<stdin>".to_string()
    } else {
        cli.input
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    };

    // === Configuration ===
    let config = match load_configuration(&cli, reading_stdin) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(EXIT_FAILURE);
        }
    };
    let deny_warnings = cli.deny_warnings || config.output.deny_warnings;
    let options = CheckOptions::from(&config);
    debug!(indent_width = options.indent_width, deny_warnings, "configuration loaded");

    // === Check ===
    let source = if cli.expand_shortcuts {
        expand_shortcuts(&source)
    } else {
        source
    };
    let result = check_with_options(&source, &options);

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("error: failed to serialize result: {}", e);
                process::exit(EXIT_FAILURE);
            }
        }
    } else {
        for diag in result.diagnostics() {
            if cli.quiet && !diag.is_error() {
                continue;
            }
            print_diagnostic(diag, &source, &file_name);
        }
        print_summary(&result, &file_name);
    }

    process::exit(exit_code(&result, deny_warnings));
}

/// `RUST_LOG` overrides the default of warnings only. Logs go to stderr.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn read_source(input: &Path, reading_stdin: bool) -> io::Result<String> {
    if reading_stdin {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        fs::read_to_string(input)
    }
}

/// An explicit `--config` wins; otherwise walk up from the input file (or
/// the working directory for stdin) looking for `Pseudocheck.toml`.
fn load_configuration(
    cli: &Cli,
    reading_stdin: bool,
) -> Result<PseudocheckConfig, config::ConfigError> {
    if let Some(path) = &cli.config {
        return config::load_config(path);
    }
    let anchor = if reading_stdin {
        std::env::current_dir()?.join(config::CONFIG_FILE_NAME)
    } else {
        fs::canonicalize(&cli.input).unwrap_or_else(|_| cli.input.clone())
    };
    config::find_and_load_config(&anchor)
}

fn exit_code(result: &CheckResult, deny_warnings: bool) -> i32 {
    if !result.is_valid() || (deny_warnings && result.has_warnings()) {
        1
    } else {
        0
    }
}

fn print_summary(result: &CheckResult, file_name: &str) {
    let errors = result.errors().count();
    let warnings = result.warnings().count();
    if result.is_valid() && warnings == 0 {
        println!("{}: no problems found.", file_name);
    } else {
        println!(
            "{}: {} error{}, {} warning{}",
            file_name,
            errors,
            if errors == 1 { "" } else { "s" },
            warnings,
            if warnings == 1 { "" } else { "s" },
        );
    }
}

/// Character range of a 1-based line, without its line terminator.
fn line_span(source: &str, line: u32) -> Range<usize> {
    let mut start = 0;
    for (idx, text) in source.split('\n').enumerate() {
        let len = text.strip_suffix('\r').unwrap_or(text).chars().count();
        if idx + 1 == line as usize {
            return start..start + len;
        }
        start += text.chars().count() + 1;
    }
    start..start
}

fn print_diagnostic(diag: &Diagnostic, source: &str, file_name: &str) {
    let kind = if diag.is_error() {
        ReportKind::Error
    } else {
        ReportKind::Warning
    };

    let span = line_span(source, diag.line);
    if !span.is_empty() {
        let color = if diag.is_error() {
            Color::Red
        } else {
            Color::Yellow
        };

        let mut report = Report::build(kind, file_name, span.start)
            .with_message(&diag.message)
            .with_label(
                Label::new((file_name, span))
                    .with_message(&diag.message)
                    .with_color(color),
            );

        if let Some(ref suggestion) = diag.suggestion {
            report = report.with_help(suggestion);
        }

        if let Err(e) = report
            .finish()
            .eprint((file_name, Source::from(source)))
        {
            eprintln!("error: could not render diagnostic: {}", e);
        }
    } else {
        let prefix = if diag.is_error() { "error" } else { "warning" };
        eprintln!("{}: line {}: {}", prefix, diag.line, diag.message);
        if let Some(ref suggestion) = diag.suggestion {
            eprintln!("   = help: {}", suggestion);
        }
        eprintln!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_spans_count_characters() {
        let source = "x ← 1\r\nOUTPUT x\n";
        assert_eq!(line_span(source, 1), 0..5);
        assert_eq!(line_span(source, 2), 7..15);
        assert!(line_span(source, 3).is_empty());
        assert!(line_span(source, 9).is_empty());
    }

    #[test]
    fn warnings_fail_only_when_denied() {
        let result = pseudocheck_checker::check("DECLARE x : INTEGER\n  x ← 1");
        assert_eq!(exit_code(&result, false), 0);
        assert_eq!(exit_code(&result, true), 1);
        let result = pseudocheck_checker::check("y ← 1");
        assert_eq!(exit_code(&result, false), 1);
    }

    #[test]
    fn cli_flags_parse() {
        let cli = Cli::parse_from(["pseudocheck", "-", "--json", "-q", "--deny-warnings"]);
        assert_eq!(cli.input.as_os_str(), "-");
        assert!(cli.json && cli.quiet && cli.deny_warnings);
        assert!(!cli.expand_shortcuts);
        assert!(cli.config.is_none());
    }
}
