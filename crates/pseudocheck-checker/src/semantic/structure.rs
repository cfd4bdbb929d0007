//! Lexical and structural rules that look at one line in isolation,
//! plus the block-nesting state machine.

use pseudocheck_common::{Category, Diagnostic};

use crate::lexer::keywords::{disallowed_alternative, is_disallowed, is_keyword, TEST_KEYWORDS};
use crate::lexer::{identifier_problem, BlockKind, SourceLine};

use super::blocks::CloseOutcome;
use super::Checker;

impl Checker<'_> {
    pub(super) fn check_indentation(&mut self, line: &SourceLine<'_>) {
        let width = self.options.indent_width.max(1);
        let indent = line.indent();
        if indent % width != 0 {
            self.diagnostics.report(
                Diagnostic::warning(
                    line.number,
                    Category::Indentation,
                    format!(
                        "Indentation of {} spaces is not a multiple of {}",
                        indent, width
                    ),
                )
                .with_suggestion(format!("indent each level by {} spaces", width)),
            );
        }
    }

    pub(super) fn check_assignment_operator(&mut self, line: &SourceLine<'_>) {
        let code = line.code();
        if code.contains("<-") {
            self.diagnostics.report(
                Diagnostic::error(
                    line.number,
                    Category::AssignmentOperator,
                    "Use '←' for assignment instead of '<-'",
                )
                .with_suggestion("replace '<-' with '←'"),
            );
        }

        let head = line.head();
        if head == "CONSTANT" || head == "TYPE" {
            return;
        }
        if TEST_KEYWORDS.iter().any(|kw| line.has_word(kw)) {
            return;
        }

        // After an arrow, `=` compares.
        let arrow = code.find('←');
        let misplaced = code.char_indices().any(|(idx, ch)| {
            ch == '='
                && arrow.map_or(true, |a| idx < a)
                && !matches!(code[..idx].chars().next_back(), Some('<' | '>'))
        });
        if misplaced {
            self.diagnostics.report(
                Diagnostic::error(
                    line.number,
                    Category::AssignmentOperator,
                    "Use '←' for assignment instead of '='",
                )
                .with_suggestion("'=' is only used for comparison and CONSTANT definitions"),
            );
        }
    }

    pub(super) fn check_identifiers(&mut self, line: &SourceLine<'_>) {
        for word in line.words() {
            if is_keyword(&word.text) || word.is_number() {
                continue;
            }
            if let Some(message) = identifier_problem(&word.text) {
                self.diagnostics.error(line.number, Category::MalformedIdentifier, message);
            }
        }
    }

    /// Coarse acceptance filter: something on the line must look like the
    /// dialect.
    pub(super) fn check_line_structure(&mut self, line: &SourceLine<'_>) {
        let code = line.code();
        if line.has_keyword()
            || code.contains('←')
            || code.contains(':')
            || line.assignment().is_some()
        {
            return;
        }
        self.diagnostics.report(
            Diagnostic::error(
                line.number,
                Category::UnrecognizedLine,
                "Unrecognised pseudocode statement",
            )
            .with_suggestion("statements start with a keyword such as DECLARE, OUTPUT or IF, or assign with '←'"),
        );
    }

    /// An all-caps first word must be a keyword unless it is plainly a name.
    pub(super) fn check_first_word(&mut self, line: &SourceLine<'_>) {
        let Some(first) = line.first_token() else {
            return;
        };
        if !first.chars().all(|c| c.is_ascii_uppercase()) {
            return;
        }
        if is_keyword(first) || is_disallowed(first) || self.symbols.contains(first) {
            return;
        }
        let rest = line.code().trim_start()[first.len()..].trim_start();
        if rest.starts_with(['←', '=', '[', '(', '.']) {
            return;
        }
        self.diagnostics.error(
            line.number,
            Category::UnknownKeyword,
            format!("Unknown keyword '{}'", first),
        );
    }

    pub(super) fn check_keyword_case(&mut self, line: &SourceLine<'_>) {
        for word in line.words() {
            let upper = word.text.to_ascii_uppercase();
            if upper != word.text && is_keyword(&upper) {
                self.diagnostics.report(
                    Diagnostic::error(
                        line.number,
                        Category::KeywordCase,
                        format!("Keyword '{}' must be uppercase", word.text),
                    )
                    .with_suggestion(format!("write '{}'", upper)),
                );
            }
        }
    }

    pub(super) fn check_disallowed_keywords(&mut self, line: &SourceLine<'_>) {
        for word in line.words() {
            if is_disallowed(&word.text) {
                self.diagnostics.report(
                    Diagnostic::error(
                        line.number,
                        Category::DisallowedKeyword,
                        format!("'{}' is not part of this pseudocode", word.text),
                    )
                    .with_suggestion(disallowed_alternative(&word.text)),
                );
            }
        }
    }

    pub(super) fn check_string_termination(&mut self, line: &SourceLine<'_>) {
        if line.has_unclosed_string() {
            self.diagnostics.report(
                Diagnostic::error(line.number, Category::UnclosedString, "Unclosed string literal")
                    .with_suggestion("add the closing '\"'"),
            );
        }
    }

    pub(super) fn check_char_literals(&mut self, line: &SourceLine<'_>) {
        for literal in line.char_literals() {
            match literal.char_count() {
                0 => self.diagnostics.error(
                    line.number,
                    Category::CharLiteral,
                    "Empty CHAR literal ''",
                ),
                1 => {}
                _ => self.diagnostics.report(
                    Diagnostic::error(
                        line.number,
                        Category::CharLiteral,
                        format!(
                            "CHAR literal '{}' must contain exactly one character",
                            literal.text
                        ),
                    )
                    .with_suggestion(format!(
                        "use double quotes for strings: \"{}\"",
                        literal.text
                    )),
                ),
            }
        }
    }

    pub(super) fn track_blocks(&mut self, line: &SourceLine<'_>) {
        let head = line.head();
        if let Some(kind) = BlockKind::from_opener(head) {
            // `TYPE T = (…)` is complete on one line.
            if kind == BlockKind::Type && line.code().contains('=') {
                return;
            }
            self.blocks.push(kind, line.number);
        } else if let Some(kind) = BlockKind::from_closer(head) {
            match self.blocks.close(kind) {
                CloseOutcome::Matched(_) => {}
                CloseOutcome::Mismatched(open) => self.diagnostics.error(
                    line.number,
                    Category::BlockMismatch,
                    format!(
                        "Expected '{}' to close '{}' from line {}, found '{}'",
                        open.kind.closer(),
                        open.kind.opener(),
                        open.line,
                        kind.closer()
                    ),
                ),
                CloseOutcome::Unexpected => self.diagnostics.error(
                    line.number,
                    Category::BlockMismatch,
                    format!(
                        "Unexpected '{}' with no open '{}'",
                        kind.closer(),
                        kind.opener()
                    ),
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pseudocheck_common::{Category, Severity};

    use crate::check;

    fn diagnostics(source: &str) -> Vec<(u32, Severity, Category, String)> {
        check(source)
            .into_diagnostics()
            .into_iter()
            .map(|d| (d.line, d.severity, d.category, d.message))
            .collect()
    }

    fn errors(source: &str) -> Vec<String> {
        diagnostics(source)
            .into_iter()
            .filter(|(_, s, _, _)| *s == Severity::Error)
            .map(|(_, _, _, m)| m)
            .collect()
    }

    fn of_category(source: &str, category: Category) -> Vec<(u32, String)> {
        diagnostics(source)
            .into_iter()
            .filter(|(_, _, c, _)| *c == category)
            .map(|(l, _, _, m)| (l, m))
            .collect()
    }

    #[test]
    fn misaligned_indent_is_a_warning() {
        let result = check("DECLARE x : INTEGER\n  x ← 1");
        assert!(result.is_valid(), "{:?}", result);
        let warns: Vec<_> = result.warnings().collect();
        assert_eq!(warns.len(), 1);
        assert_eq!(warns[0].line, 2);
        assert!(warns[0].message.contains("multiple of 3"));
    }

    #[test]
    fn equals_outside_conditions_is_an_error() {
        let found = of_category("DECLARE x : INTEGER\nx = 5", Category::AssignmentOperator);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, 2);
    }

    #[test]
    fn equals_in_conditions_and_constants_is_fine() {
        let source = "DECLARE x : INTEGER\nCONSTANT Max = 10\nx ← 1\nIF x = 1 THEN\n   OUTPUT x\nENDIF";
        assert!(of_category(source, Category::AssignmentOperator).is_empty());
    }

    #[test]
    fn equals_after_arrow_compares() {
        // The right-hand side of an assignment may hold a comparison.
        let source = "DECLARE f : BOOLEAN\nDECLARE x : INTEGER\nf ← x = 3";
        assert!(of_category(source, Category::AssignmentOperator).is_empty());
    }

    #[test]
    fn relational_operators_are_not_assignments() {
        let source = "DECLARE ok : BOOLEAN\nDECLARE n : INTEGER\nok ← n >= 1 AND n <= 9";
        assert!(of_category(source, Category::AssignmentOperator).is_empty());
    }

    #[test]
    fn ascii_arrow_shortcut_is_flagged() {
        let errs = errors("DECLARE x : INTEGER\nx <- 5");
        assert!(errs.iter().any(|e| e.contains("'<-'")), "{:?}", errs);
    }

    #[test]
    fn malformed_identifiers() {
        let found = of_category("DECLARE 2nd, a$b : INTEGER", Category::MalformedIdentifier);
        let messages: Vec<_> = found.into_iter().map(|(_, m)| m).collect();
        assert!(messages.iter().any(|m| m.contains("'2nd' must start with a letter")));
        assert!(messages.iter().any(|m| m.contains("'a$b' contains invalid character '$'")));
    }

    #[test]
    fn numbers_are_not_identifiers() {
        let source = "DECLARE r : REAL\nr ← 3.14 * 100";
        assert!(of_category(source, Category::MalformedIdentifier).is_empty());
    }

    #[test]
    fn unrecognised_line() {
        let found = of_category("DECLARE x : INTEGER\nx + 1", Category::UnrecognizedLine);
        assert_eq!(found, vec![(2, "Unrecognised pseudocode statement".to_string())]);
    }

    #[test]
    fn unknown_all_caps_first_word() {
        let errs = errors(r#"DISPLAY "hello""#);
        assert!(errs.iter().any(|e| e == "Unknown keyword 'DISPLAY'"), "{:?}", errs);
    }

    #[test]
    fn all_caps_variable_is_not_a_keyword() {
        let source = "DECLARE MAX : INTEGER\nMAX ← 3";
        assert!(of_category(source, Category::UnknownKeyword).is_empty());
    }

    #[test]
    fn lowercase_keywords() {
        let found = of_category("declare x: integer", Category::KeywordCase);
        assert_eq!(found.len(), 2);
        assert!(found[0].1.contains("'declare'"));
        assert!(found[1].1.contains("'integer'"));
    }

    #[test]
    fn keywords_inside_strings_are_ignored() {
        let source = "OUTPUT \"then do the next one\" // output it";
        assert!(of_category(source, Category::KeywordCase).is_empty());
        assert!(of_category(source, Category::DisallowedKeyword).is_empty());
    }

    #[test]
    fn foreign_keywords() {
        let source = "DECLARE i : INTEGER\nWHILE i < 3\n   break\nENDWHILE";
        let found = of_category(source, Category::DisallowedKeyword);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, 3);
    }

    #[test]
    fn unclosed_string() {
        let found = of_category("OUTPUT \"hello", Category::UnclosedString);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn char_literal_rules() {
        let source = "DECLARE c : CHAR\nc ← ''\nc ← 'ab'\nc ← '\\n'";
        let found = of_category(source, Category::CharLiteral);
        assert_eq!(found.len(), 2, "{:?}", found);
        assert_eq!(found[0].0, 2);
        assert!(found[1].1.contains("exactly one character"));
    }

    #[test]
    fn mismatched_closer_names_both() {
        let source = "DECLARE x : INTEGER\nWHILE x < 3\n   IF x > 1 THEN\n      x ← 1\n   ENDWHILE\nENDIF";
        let errs = errors(source);
        assert!(
            errs.iter()
                .any(|e| e == "Expected 'ENDIF' to close 'IF' from line 3, found 'ENDWHILE'"),
            "{:?}",
            errs
        );
        assert!(errs
            .iter()
            .any(|e| e == "Expected 'ENDWHILE' to close 'WHILE' from line 2, found 'ENDIF'"));
    }

    #[test]
    fn closer_without_opener() {
        let errs = errors("ENDIF");
        assert!(errs.iter().any(|e| e == "Unexpected 'ENDIF' with no open 'IF'"));
    }

    #[test]
    fn enumerated_type_is_one_line() {
        let result = check("TYPE Season = (Spring, Summer)\nDECLARE s : Season\ns ← Spring");
        assert!(result.is_valid(), "{:?}", result);
    }
}
