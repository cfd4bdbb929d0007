use std::collections::HashSet;

use serde::Serialize;

/// Severity level of a diagnostic.
///
/// Only errors affect validity; warnings are advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// The family of rule that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MissingContent,
    Indentation,
    AssignmentOperator,
    MalformedIdentifier,
    UnrecognizedLine,
    UnknownKeyword,
    KeywordCase,
    DisallowedKeyword,
    BlockMismatch,
    ReservedName,
    Redeclaration,
    MalformedDeclaration,
    ArrayBounds,
    UndeclaredIdentifier,
    ConstantAssignment,
    CallMisuse,
    TypeMismatch,
    FileMode,
    CharLiteral,
    UnclosedString,
    StatementShape,
    EmptyLoop,
}

/// One finding, anchored to a 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub line: u32,
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn error(line: u32, category: Category, message: impl Into<String>) -> Self {
        Self {
            line,
            severity: Severity::Error,
            category,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn warning(line: u32, category: Category, message: impl Into<String>) -> Self {
        Self {
            line,
            severity: Severity::Warning,
            category,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "line {}: {}: {}", self.line, prefix, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (help: {})", suggestion)?;
        }
        Ok(())
    }
}

/// Convenience collector for diagnostics during a check pass.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn error(&mut self, line: u32, category: Category, message: impl Into<String>) {
        self.report(Diagnostic::error(line, category, message));
    }

    pub fn warning(&mut self, line: u32, category: Category, message: impl Into<String>) {
        self.report(Diagnostic::warning(line, category, message));
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drop every diagnostic whose (line, message) pair was already seen.
    /// The first occurrence wins.
    pub fn dedup(&mut self) {
        let mut seen: HashSet<(u32, String)> = HashSet::new();
        self.diagnostics.retain(|d| seen.insert((d.line, d.message.clone())));
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Deduplicate, order by line and derive the verdict.
    pub fn into_result(mut self) -> CheckResult {
        self.dedup();
        self.diagnostics.sort_by_key(|d| d.line);
        CheckResult::new(self.diagnostics)
    }
}

/// Outcome of checking one source text.
///
/// `is_valid` is derived from the diagnostics and cannot be set directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    is_valid: bool,
    diagnostics: Vec<Diagnostic>,
}

impl CheckResult {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        let is_valid = !diagnostics.iter().any(|d| d.is_error());
        Self {
            is_valid,
            diagnostics,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
