use pseudocheck_common::{Category, Diagnostic};

use crate::lexer::cursor::Cursor;
use crate::lexer::keywords::is_keyword;
use crate::lexer::{identifier_problem, SourceLine};

use super::scope::{normalize_type, ArrayBounds, Symbol, SymbolKind, CONSTANT_TYPE};
use super::Checker;

impl Checker<'_> {
    pub(super) fn check_declaration(&mut self, line: &SourceLine<'_>) {
        match line.head() {
            "DECLARE" => self.check_declare(line),
            "CONSTANT" => self.check_constant(line),
            "FUNCTION" => self.check_function(line),
            "PROCEDURE" => self.check_procedure(line),
            "TYPE" => self.check_type_definition(line),
            _ => {}
        }
    }

    // ====================================================================
    // DECLARE
    // ====================================================================

    fn check_declare(&mut self, line: &SourceLine<'_>) {
        let rest = line.after_head();
        let Some((names, ty)) = split_top_level_colon(rest) else {
            self.diagnostics.report(
                Diagnostic::error(
                    line.number,
                    Category::MalformedDeclaration,
                    "DECLARE statement is missing ':' between the name and the type",
                )
                .with_suggestion("DECLARE <name> : <type>"),
            );
            return;
        };

        // Anything after an arrow is an (invalid) initial value, not the type.
        let ty = ty.split('←').next().unwrap_or_default().trim();
        if ty.is_empty() {
            self.diagnostics.error(
                line.number,
                Category::MalformedDeclaration,
                "DECLARE statement is missing a type after ':'",
            );
            return;
        }

        let names: Vec<&str> = names
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            self.diagnostics.error(
                line.number,
                Category::MalformedDeclaration,
                "DECLARE statement is missing a variable name",
            );
            return;
        }

        let upper = normalize_type(ty);
        if type_words(&upper).any(|w| w == "ARRAY") {
            self.check_array_declaration(line, &names, &upper);
        }
        if type_words(&upper).any(|w| w == "CHAR") && line.code().contains('"') {
            self.diagnostics.report(
                Diagnostic::error(
                    line.number,
                    Category::CharLiteral,
                    "CHAR values use single quotes, not double quotes",
                )
                .with_suggestion("write a CHAR literal as 'a'"),
            );
        }

        for name in names {
            if name.contains(char::is_whitespace) {
                self.diagnostics.report(
                    Diagnostic::error(
                        line.number,
                        Category::MalformedDeclaration,
                        format!("'{}' is not a single name", name),
                    )
                    .with_suggestion("separate variable names with commas"),
                );
                continue;
            }
            self.declare_symbol(line, Symbol::new(name, SymbolKind::Variable, ty, line.number));
        }
    }

    fn check_array_declaration(&mut self, line: &SourceLine<'_>, names: &[&str], ty: &str) {
        let well_formed =
            ty.contains('[') && ty.contains(']') && type_words(ty).any(|w| w == "OF");
        if !well_formed {
            self.diagnostics.report(
                Diagnostic::error(
                    line.number,
                    Category::MalformedDeclaration,
                    "Array declaration must have the form ARRAY[<lower>:<upper>] OF <type>",
                )
                .with_suggestion("DECLARE scores : ARRAY[1:10] OF INTEGER"),
            );
        }
        // Bounds are only tracked for the single-name, one-dimensional form.
        if let ([name], Some((lower, upper))) = (names, parse_bounds(ty)) {
            self.arrays.insert(
                name,
                ArrayBounds {
                    lower,
                    upper,
                    line: line.number,
                },
            );
        }
    }

    /// Reserved words and malformed names cannot be declared.
    fn check_name(&mut self, line: &SourceLine<'_>, name: &str) -> bool {
        if is_keyword(&name.to_ascii_uppercase()) {
            self.diagnostics.report(
                Diagnostic::error(
                    line.number,
                    Category::ReservedName,
                    format!("'{}' is a reserved keyword and cannot be used as a name", name),
                )
                .with_suggestion("choose a different name"),
            );
            return false;
        }
        if let Some(message) = identifier_problem(name) {
            self.diagnostics.error(line.number, Category::MalformedIdentifier, message);
            return false;
        }
        true
    }

    /// Register a name, reporting bad names and redeclarations.
    fn declare_symbol(&mut self, line: &SourceLine<'_>, symbol: Symbol) {
        if !self.check_name(line, &symbol.name) {
            return;
        }
        let name = symbol.name.clone();
        let ty = symbol.declared_type.clone();
        if let Err(existing) = self.symbols.define(symbol) {
            if existing.has_type(&ty) {
                self.diagnostics.warning(
                    line.number,
                    Category::Redeclaration,
                    format!("'{}' is already declared on line {}", name, existing.line),
                );
            } else {
                self.diagnostics.error(
                    line.number,
                    Category::Redeclaration,
                    format!(
                        "'{}' was declared as {} on line {} and cannot be redeclared as {}",
                        name,
                        existing.declared_type,
                        existing.line,
                        ty
                    ),
                );
            }
        }
    }

    // ====================================================================
    // CONSTANT
    // ====================================================================

    fn check_constant(&mut self, line: &SourceLine<'_>) {
        let rest = line.after_head();
        if rest.contains('←') {
            self.diagnostics.report(
                Diagnostic::error(
                    line.number,
                    Category::AssignmentOperator,
                    "CONSTANT definitions use '=' instead of '←'",
                )
                .with_suggestion("CONSTANT <name> = <value>"),
            );
        }

        let parts = rest
            .find(['=', '←'])
            .map(|idx| (rest[..idx].trim(), rest[idx..].chars().skip(1).collect::<String>()));
        let Some((name, value)) = parts else {
            self.report_malformed_constant(line);
            return;
        };
        if name.is_empty() || value.trim().is_empty() {
            self.report_malformed_constant(line);
            return;
        }
        self.declare_symbol(
            line,
            Symbol::new(name, SymbolKind::Constant, CONSTANT_TYPE, line.number),
        );
    }

    fn report_malformed_constant(&mut self, line: &SourceLine<'_>) {
        self.diagnostics.report(
            Diagnostic::error(
                line.number,
                Category::MalformedDeclaration,
                "CONSTANT definition must have the form CONSTANT <name> = <value>",
            )
            .with_suggestion("CONSTANT Pi = 3.142"),
        );
    }

    // ====================================================================
    // FUNCTION / PROCEDURE
    // ====================================================================

    fn check_function(&mut self, line: &SourceLine<'_>) {
        let name = leading_identifier(line.after_head());
        if name.is_empty() {
            self.diagnostics.error(
                line.number,
                Category::MalformedDeclaration,
                "FUNCTION declaration is missing a name",
            );
        } else {
            self.functions.insert(name);
        }
        if !line.has_word("RETURNS") {
            self.diagnostics.report(
                Diagnostic::error(
                    line.number,
                    Category::MalformedDeclaration,
                    format!("FUNCTION '{}' must declare its return type with RETURNS", name),
                )
                .with_suggestion(format!("FUNCTION {}(…) RETURNS <type>", name)),
            );
        }
        self.register_parameters(line);
    }

    fn check_procedure(&mut self, line: &SourceLine<'_>) {
        let name = leading_identifier(line.after_head());
        if name.is_empty() {
            self.diagnostics.error(
                line.number,
                Category::MalformedDeclaration,
                "PROCEDURE declaration is missing a name",
            );
        }
        if line.has_word("RETURNS") {
            self.diagnostics.report(
                Diagnostic::error(
                    line.number,
                    Category::MalformedDeclaration,
                    format!("PROCEDURE '{}' cannot return a value", name),
                )
                .with_suggestion("declare it as FUNCTION … RETURNS <type> instead"),
            );
        }
        self.register_parameters(line);
    }

    /// Parameters become visible to the subroutine body.
    fn register_parameters(&mut self, line: &SourceLine<'_>) {
        let code = line.code();
        let Some(open) = code.find('(') else {
            return;
        };
        let Some(close) = code.rfind(')').filter(|&close| close > open) else {
            self.diagnostics.error(
                line.number,
                Category::MalformedDeclaration,
                "Parameter list is missing ')'",
            );
            return;
        };

        for param in code[open + 1..close].split(',') {
            let param = strip_passing_mode(param.trim());
            if param.is_empty() {
                continue;
            }
            match param.split_once(':') {
                Some((name, ty)) if !name.trim().is_empty() && !ty.trim().is_empty() => {
                    let name = name.trim();
                    if self.check_name(line, name) {
                        self.symbols.redefine(Symbol::new(
                            name,
                            SymbolKind::Parameter,
                            ty.trim(),
                            line.number,
                        ));
                    }
                }
                _ => self.diagnostics.report(
                    Diagnostic::error(
                        line.number,
                        Category::MalformedDeclaration,
                        format!("Parameter '{}' is missing a type", param),
                    )
                    .with_suggestion(format!("{} : <type>", param)),
                ),
            }
        }
    }

    // ====================================================================
    // TYPE
    // ====================================================================

    /// `TYPE T = (A, B)` registers each member as a value of type `T`.
    fn check_type_definition(&mut self, line: &SourceLine<'_>) {
        let rest = line.after_head();
        let name = leading_identifier(rest);
        if name.is_empty() {
            self.diagnostics.error(
                line.number,
                Category::MalformedDeclaration,
                "TYPE definition is missing a name",
            );
            return;
        }
        let Some((_, members)) = rest.split_once('=') else {
            return;
        };
        let members = members.trim();
        let Some(members) = members
            .strip_prefix('(')
            .and_then(|m| m.strip_suffix(')'))
        else {
            self.diagnostics.report(
                Diagnostic::error(
                    line.number,
                    Category::MalformedDeclaration,
                    format!("Enumerated type '{}' must list its values in parentheses", name),
                )
                .with_suggestion(format!("TYPE {} = (Value1, Value2)", name)),
            );
            return;
        };
        for member in members.split(',').map(str::trim).filter(|m| !m.is_empty()) {
            self.declare_symbol(
                line,
                Symbol::new(member, SymbolKind::EnumMember, name, line.number),
            );
        }
    }
}

/// Split at the first `:` outside square brackets.
fn split_top_level_colon(text: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (idx, ch) in text.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => return Some((&text[..idx], &text[idx + 1..])),
            _ => {}
        }
    }
    None
}

fn type_words(ty: &str) -> impl Iterator<Item = &str> {
    ty.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
}

fn leading_identifier(text: &str) -> &str {
    let text = text.trim_start();
    let mut cursor = Cursor::new(text);
    cursor.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
    cursor.slice_from(0)
}

fn strip_passing_mode(param: &str) -> &str {
    ["BYVAL", "BYREF"]
        .iter()
        .find_map(|mode| param.strip_prefix(*mode))
        .map_or(param, str::trim_start)
}

/// Read `ARRAY[<lower>:<upper>]` from an uppercased type.
fn parse_bounds(ty: &str) -> Option<(i64, i64)> {
    let rest = ty.trim_start().strip_prefix("ARRAY")?.trim_start();
    let inside = rest.strip_prefix('[')?;
    let (inside, _) = inside.split_once(']')?;
    let (lower, upper) = inside.split_once(':')?;
    Some((
        lower.trim().parse().ok()?,
        upper.trim().parse().ok()?,
    ))
}
