//! Rule-based checker for the structured teaching pseudocode dialect.
//!
//! [`check`] scans source text line by line and returns every syntax,
//! style and consistency finding together with a validity verdict. It is
//! a best-effort linter built from independent line heuristics plus a few
//! whole-file sweeps; it does not parse into a tree.

pub mod lexer;
pub mod semantic;
pub mod shortcuts;

pub use pseudocheck_common::{Category, CheckResult, Diagnostic, Severity};
pub use semantic::CheckOptions;
pub use shortcuts::expand_shortcuts;

/// Check `source` with the default options.
pub fn check(source: &str) -> CheckResult {
    check_with_options(source, &CheckOptions::default())
}

/// Check `source`. Every call allocates its own tables, so calls are
/// independent of each other.
pub fn check_with_options(source: &str, options: &CheckOptions) -> CheckResult {
    let lines = lexer::split_lines(source);
    semantic::analyze(&lines, options).into_result()
}
