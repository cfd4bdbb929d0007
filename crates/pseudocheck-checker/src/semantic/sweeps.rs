//! Whole-file sweeps, run once the line pass has built every table.
//!
//! These re-read the lines independently of the block stack, so they can
//! report the same defect as a line rule from a different angle.

use pseudocheck_common::{Category, Diagnostic};

use crate::lexer::{BlockKind, SourceLine};

use super::Checker;

impl Checker<'_> {
    pub(super) fn report_unclosed_blocks(&mut self) {
        for open in self.blocks.drain_unclosed() {
            self.diagnostics.report(
                Diagnostic::error(
                    open.line,
                    Category::BlockMismatch,
                    format!(
                        "'{}' on line {} is never closed",
                        open.kind.opener(),
                        open.line
                    ),
                )
                .with_suggestion(format!("add '{}'", open.kind.closer())),
            );
        }
    }

    /// Running open/close counts per block family; a closer that takes the
    /// close count past the open count is extra.
    pub(super) fn sweep_extra_closers(&mut self, lines: &[SourceLine<'_>]) {
        for kind in BlockKind::ALL {
            let mut opened = 0usize;
            let mut closed = 0usize;
            for line in lines {
                let head = line.head();
                if head == kind.opener() {
                    opened += 1;
                } else if head == kind.closer() {
                    closed += 1;
                    if closed > opened {
                        self.diagnostics.error(
                            line.number,
                            Category::BlockMismatch,
                            format!(
                                "Extra '{}' without a matching '{}'",
                                kind.closer(),
                                kind.opener()
                            ),
                        );
                    }
                }
            }
        }
    }

    pub(super) fn sweep_endfor(&mut self, lines: &[SourceLine<'_>]) {
        let mut seen_for = false;
        for line in lines {
            let head = line.head();
            if head == "FOR" {
                seen_for = true;
            } else if seen_for && head.eq_ignore_ascii_case("ENDFOR") {
                self.diagnostics.report(
                    Diagnostic::error(
                        line.number,
                        Category::BlockMismatch,
                        "FOR loops are closed with NEXT, not ENDFOR",
                    )
                    .with_suggestion("NEXT <counter>"),
                );
            }
        }
    }

    pub(super) fn sweep_call_misuse(&mut self, lines: &[SourceLine<'_>]) {
        for line in lines {
            if line.head() != "CALL" {
                continue;
            }
            // The word right after CALL is the callee.
            let Some(callee) = line.words().get(1) else {
                continue;
            };
            if self.functions.contains(&callee.text) {
                self.diagnostics.report(
                    Diagnostic::error(
                        line.number,
                        Category::CallMisuse,
                        format!(
                            "'{}' is a FUNCTION and cannot be used with CALL",
                            callee.text
                        ),
                    )
                    .with_suggestion(format!(
                        "use its result directly, e.g. x ← {}(…)",
                        callee.text
                    )),
                );
            }
        }
    }

    /// `name[<integer>]` against the declared bounds of `name`.
    pub(super) fn sweep_array_bounds(&mut self, lines: &[SourceLine<'_>]) {
        for line in lines {
            for word in line.words() {
                let Some(bounds) = self.arrays.lookup(&word.text).copied() else {
                    continue;
                };
                let Some(index) = line
                    .bracket_after(word)
                    .and_then(|inside| inside.parse::<i64>().ok())
                else {
                    continue;
                };
                if !bounds.contains(index) {
                    self.diagnostics.error(
                        line.number,
                        Category::ArrayBounds,
                        format!(
                            "Index {} is out of range for array '{}' [{}:{}]",
                            index, word.text, bounds.lower, bounds.upper
                        ),
                    );
                }
            }
        }
    }

    /// `LENGTH(name)` only makes sense for strings and arrays.
    pub(super) fn sweep_length_arguments(&mut self, lines: &[SourceLine<'_>]) {
        for line in lines {
            for word in line.words().iter().filter(|w| w.text == "LENGTH") {
                let Some(argument) = line.parens_after(word) else {
                    continue;
                };
                let Some(symbol) = self.symbols.lookup(argument) else {
                    continue;
                };
                let ty = symbol.declared_type.to_ascii_uppercase();
                if ty.contains("STRING") || ty.contains("ARRAY") {
                    continue;
                }
                self.diagnostics.error(
                    line.number,
                    Category::TypeMismatch,
                    format!(
                        "LENGTH() expects a STRING or ARRAY, but '{}' is {}",
                        argument, symbol.declared_type
                    ),
                );
            }
        }
    }

    pub(super) fn sweep_empty_for_bodies(&mut self, lines: &[SourceLine<'_>]) {
        for (idx, line) in lines.iter().enumerate() {
            if line.head() != "FOR" || !line.has_word("TO") {
                continue;
            }
            let next = lines[idx + 1..].iter().find(|l| l.has_content());
            if next.is_some_and(|l| l.head() == "NEXT") {
                self.diagnostics.warning(
                    line.number,
                    Category::EmptyLoop,
                    "FOR loop body is empty",
                );
            }
        }
    }
}
