pub mod blocks;
pub mod scope;

mod declarations;
mod structure;
mod sweeps;
mod usage;

use pseudocheck_common::{Category, DiagnosticBag, PseudocheckConfig};
use tracing::debug;

use crate::lexer::SourceLine;

use blocks::BlockStack;
use scope::{ArrayTable, FunctionSet, SymbolTable};

/// Settings that change what the checker reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOptions {
    /// Spaces per indentation level.
    pub indent_width: usize,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self { indent_width: 3 }
    }
}

impl From<&PseudocheckConfig> for CheckOptions {
    fn from(config: &PseudocheckConfig) -> Self {
        Self {
            indent_width: config.checker.indent_width,
        }
    }
}

/// Run the full check over pre-split source lines.
///
/// The pass works in four stages:
///  1. Emptiness guard (returns early with a single error)
///  2. Line pass: every rule on every line, building the scan-local tables
///  3. Whole-file sweeps against the finished tables
///  4. The caller deduplicates via [`DiagnosticBag::into_result`]
pub fn analyze(lines: &[SourceLine<'_>], options: &CheckOptions) -> DiagnosticBag {
    if !lines.iter().any(|line| line.has_content()) {
        let mut diagnostics = DiagnosticBag::new();
        diagnostics.error(
            1,
            Category::MissingContent,
            "No pseudocode found: the input is empty or contains only comments",
        );
        return diagnostics;
    }

    let mut checker = Checker::new(options);
    for line in lines {
        checker.check_line(line);
    }
    let diagnostics = checker.finish(lines);
    debug!(
        lines = lines.len(),
        diagnostics = diagnostics.len(),
        errors = diagnostics.has_errors(),
        "check complete"
    );
    diagnostics
}

/// State owned by one check pass. Nothing here outlives [`analyze`].
pub struct Checker<'o> {
    options: &'o CheckOptions,
    diagnostics: DiagnosticBag,
    symbols: SymbolTable,
    arrays: ArrayTable,
    functions: FunctionSet,
    blocks: BlockStack,
}

impl<'o> Checker<'o> {
    pub fn new(options: &'o CheckOptions) -> Self {
        Self {
            options,
            diagnostics: DiagnosticBag::new(),
            symbols: SymbolTable::new(),
            arrays: ArrayTable::new(),
            functions: FunctionSet::new(),
            blocks: BlockStack::new(),
        }
    }

    /// Apply the per-line rule battery to one line.
    pub fn check_line(&mut self, line: &SourceLine<'_>) {
        if !line.has_content() {
            return;
        }

        // Lexical and structural rules.
        self.check_indentation(line);
        self.check_assignment_operator(line);
        self.check_identifiers(line);
        self.check_line_structure(line);
        self.check_first_word(line);
        self.check_keyword_case(line);
        self.check_disallowed_keywords(line);
        self.check_string_termination(line);
        self.check_char_literals(line);

        // Block nesting.
        self.track_blocks(line);

        // Declarations register names before this line's uses are checked.
        self.check_declaration(line);

        // Usage.
        self.check_assignment_target(line);
        self.check_char_assignment(line);
        self.check_references(line);
        self.check_statement_shape(line);
    }

    /// Run the whole-file sweeps and hand back every diagnostic.
    pub fn finish(mut self, lines: &[SourceLine<'_>]) -> DiagnosticBag {
        self.report_unclosed_blocks();
        self.sweep_extra_closers(lines);
        self.sweep_endfor(lines);
        self.sweep_call_misuse(lines);
        self.sweep_array_bounds(lines);
        self.sweep_length_arguments(lines);
        self.sweep_empty_for_bodies(lines);
        self.diagnostics
    }
}
