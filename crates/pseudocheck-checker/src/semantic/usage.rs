use pseudocheck_common::{Category, Diagnostic};

use crate::lexer::keywords::{is_disallowed, is_keyword, FILE_MODES, REFERENCE_KEYWORDS};
use crate::lexer::SourceLine;

use super::scope::SymbolKind;
use super::Checker;

impl Checker<'_> {
    /// `x ← …` needs `x` to be a declared variable, not a constant.
    pub(super) fn check_assignment_target(&mut self, line: &SourceLine<'_>) {
        let Some(assignment) = line.assignment() else {
            return;
        };
        if assignment.operator != '←' {
            return;
        }
        let target = self
            .symbols
            .lookup(assignment.target)
            .map(|sym| (sym.kind, sym.line));
        match target {
            None => self.report_undeclared(line.number, assignment.target),
            Some((SymbolKind::Constant, declared)) => self.diagnostics.report(
                Diagnostic::error(
                    line.number,
                    Category::ConstantAssignment,
                    format!(
                        "'{}' is a CONSTANT defined on line {} and cannot be assigned",
                        assignment.target, declared
                    ),
                )
                .with_suggestion(format!("DECLARE {} : <type> instead", assignment.target)),
            ),
            Some(_) => {}
        }
    }

    pub(super) fn check_char_assignment(&mut self, line: &SourceLine<'_>) {
        let Some(assignment) = line.assignment() else {
            return;
        };
        if assignment.operator != '←' || !assignment.value.starts_with('"') {
            return;
        }
        let is_char = self
            .symbols
            .lookup(assignment.target)
            .is_some_and(|sym| sym.has_type("CHAR"));
        if is_char {
            self.diagnostics.report(
                Diagnostic::error(
                    line.number,
                    Category::CharLiteral,
                    format!(
                        "CHAR variable '{}' must be assigned a single-quoted character, not a string",
                        assignment.target
                    ),
                )
                .with_suggestion(format!("{} ← 'a'", assignment.target)),
            );
        }
    }

    /// Operands of OUTPUT, INPUT, IF and WHILE must be declared names.
    pub(super) fn check_references(&mut self, line: &SourceLine<'_>) {
        // The unclosed string is already reported; its remains would only
        // produce noise here.
        if line.has_unclosed_string() {
            return;
        }
        if !REFERENCE_KEYWORDS.iter().any(|kw| line.has_word(kw)) {
            return;
        }
        for word in line.words() {
            if !word.is_identifier()
                || is_keyword(&word.text.to_ascii_uppercase())
                || is_disallowed(&word.text)
            {
                continue;
            }
            // Calls and record fields are not variable references.
            if line.char_after(word) == Some('(') || line.char_before(word) == Some('.') {
                continue;
            }
            if !self.symbols.contains(&word.text) {
                self.report_undeclared(line.number, &word.text);
            }
        }
    }

    fn report_undeclared(&mut self, line: u32, name: &str) {
        self.diagnostics.report(
            Diagnostic::error(
                line,
                Category::UndeclaredIdentifier,
                format!("Variable '{}' has not been declared", name),
            )
            .with_suggestion(format!("add 'DECLARE {} : <type>' before its first use", name)),
        );
    }

    // ====================================================================
    // Statement shapes
    // ====================================================================

    pub(super) fn check_statement_shape(&mut self, line: &SourceLine<'_>) {
        match line.head() {
            "FOR" => self.check_for_shape(line),
            "CASE" => self.check_case_shape(line),
            "WHILE" => self.check_while_shape(line),
            "OPENFILE" => self.check_openfile(line),
            _ => {}
        }
    }

    fn check_for_shape(&mut self, line: &SourceLine<'_>) {
        if line.code().contains('←') && line.has_word("TO") {
            return;
        }
        self.diagnostics.report(
            Diagnostic::error(
                line.number,
                Category::StatementShape,
                "FOR loop must have the form FOR <counter> ← <start> TO <end>",
            )
            .with_suggestion("FOR i ← 1 TO 10"),
        );
    }

    fn check_case_shape(&mut self, line: &SourceLine<'_>) {
        if line.has_word("OF") {
            return;
        }
        self.diagnostics.report(
            Diagnostic::error(
                line.number,
                Category::StatementShape,
                "CASE statement must have the form CASE OF <identifier>",
            )
            .with_suggestion("CASE OF choice"),
        );
    }

    fn check_while_shape(&mut self, line: &SourceLine<'_>) {
        let code = line.code();
        if code.contains('(') && code.contains(')') {
            self.diagnostics.report(
                Diagnostic::error(
                    line.number,
                    Category::StatementShape,
                    "WHILE condition should not be wrapped in parentheses",
                )
                .with_suggestion("WHILE count < 10"),
            );
        }
    }

    /// `OPENFILE <file> FOR <mode>`.
    fn check_openfile(&mut self, line: &SourceLine<'_>) {
        let parts: Vec<&str> = line.after_head().split_whitespace().collect();
        match parts.as_slice() {
            [_, kw, mode] if kw.eq_ignore_ascii_case("FOR") => {
                if !FILE_MODES.iter().any(|m| m.eq_ignore_ascii_case(mode)) {
                    self.diagnostics.report(
                        Diagnostic::error(
                            line.number,
                            Category::FileMode,
                            format!("Invalid file mode '{}'", mode),
                        )
                        .with_suggestion("use READ, WRITE or APPEND"),
                    );
                }
            }
            _ => self.diagnostics.report(
                Diagnostic::error(
                    line.number,
                    Category::StatementShape,
                    "OPENFILE must have the form OPENFILE <filename> FOR <mode>",
                )
                .with_suggestion("OPENFILE \"data.txt\" FOR READ"),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use pseudocheck_common::Category;

    use crate::check;

    fn of_category(source: &str, category: Category) -> Vec<(u32, String)> {
        check(source)
            .into_diagnostics()
            .into_iter()
            .filter(|d| d.category == category)
            .map(|d| (d.line, d.message))
            .collect()
    }

    #[test]
    fn assignment_to_undeclared() {
        let found = of_category("y ← 5", Category::UndeclaredIdentifier);
        assert_eq!(found, vec![(1, "Variable 'y' has not been declared".to_string())]);
    }

    #[test]
    fn constants_cannot_be_assigned() {
        let source = "CONSTANT Max = 10\nMax ← 11\nOUTPUT Max";
        let found = of_category(source, Category::ConstantAssignment);
        assert_eq!(
            found,
            vec![(
                2,
                "'Max' is a CONSTANT defined on line 1 and cannot be assigned".to_string()
            )]
        );
        assert!(of_category(source, Category::UndeclaredIdentifier).is_empty());
    }

    #[test]
    fn declaration_is_case_insensitive() {
        let source = "DECLARE Total : INTEGER\nTOTAL ← 1\nOUTPUT total";
        assert!(of_category(source, Category::UndeclaredIdentifier).is_empty());
    }

    #[test]
    fn undeclared_in_output_and_conditions() {
        let source = "DECLARE a : INTEGER\nOUTPUT a, b\nIF c > a THEN\n   OUTPUT a\nENDIF";
        let found = of_category(source, Category::UndeclaredIdentifier);
        assert_eq!(
            found,
            vec![
                (2, "Variable 'b' has not been declared".to_string()),
                (3, "Variable 'c' has not been declared".to_string()),
            ]
        );
    }

    #[test]
    fn calls_fields_and_strings_are_not_references() {
        let source = "TYPE Point\n   DECLARE x : INTEGER\nENDTYPE\nDECLARE p : Point\nOUTPUT \"value\", p.x, Square(p.x), LENGTH(\"abc\")";
        assert!(of_category(source, Category::UndeclaredIdentifier).is_empty());
    }

    #[test]
    fn unclosed_string_suppresses_references() {
        let source = "OUTPUT \"total is, total";
        assert!(of_category(source, Category::UndeclaredIdentifier).is_empty());
        assert_eq!(of_category(source, Category::UnclosedString).len(), 1);
    }

    #[test]
    fn string_assigned_to_char() {
        let found = of_category(
            "DECLARE c : CHAR\nc ← \"x\"",
            Category::CharLiteral,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, 2);
        assert!(found[0].1.contains("'c'"));
    }

    #[test]
    fn string_assigned_to_string_is_fine() {
        let result = check("DECLARE s : STRING\ns ← \"x\"");
        assert!(result.is_valid(), "{:?}", result);
    }

    #[test]
    fn for_shape() {
        let source = "DECLARE i : INTEGER\nFOR i = 1 TO 3\n   OUTPUT i\nNEXT i";
        let found = of_category(source, Category::StatementShape);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, 2);
    }

    #[test]
    fn case_shape() {
        let source = "DECLARE c : INTEGER\nCASE c\n   1 : OUTPUT c\nENDCASE";
        let found = of_category(source, Category::StatementShape);
        assert_eq!(found.len(), 1);
        assert!(found[0].1.contains("CASE OF"));
    }

    #[test]
    fn while_parentheses() {
        let source = "DECLARE n : INTEGER\nWHILE (n < 3)\n   n ← n + 1\nENDWHILE";
        let found = of_category(source, Category::StatementShape);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn openfile_modes() {
        assert!(of_category("OPENFILE \"a.txt\" FOR READ", Category::FileMode).is_empty());
        assert!(of_category("OPENFILE \"a.txt\" FOR APPEND", Category::FileMode).is_empty());
        let found = of_category("OPENFILE \"a.txt\" FOR UPDATE", Category::FileMode);
        assert_eq!(found, vec![(1, "Invalid file mode 'UPDATE'".to_string())]);
    }

    #[test]
    fn openfile_shape() {
        let found = of_category("OPENFILE \"a.txt\" READ", Category::StatementShape);
        assert_eq!(found.len(), 1);
        let found = of_category("OPENFILE \"a.txt\" FOR", Category::StatementShape);
        assert_eq!(found.len(), 1);
    }
}
