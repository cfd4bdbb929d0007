use std::fmt;

/// Every reserved word of the dialect, in its only accepted spelling.
pub const KEYWORDS: &[&str] = &[
    // Declarations and types
    "DECLARE",
    "CONSTANT",
    "TYPE",
    "ENDTYPE",
    "ARRAY",
    "OF",
    "INTEGER",
    "REAL",
    "CHAR",
    "STRING",
    "BOOLEAN",
    "DATE",
    "TRUE",
    "FALSE",
    // Selection
    "IF",
    "THEN",
    "ELSE",
    "ENDIF",
    "CASE",
    "OTHERWISE",
    "ENDCASE",
    // Iteration
    "FOR",
    "TO",
    "STEP",
    "NEXT",
    "REPEAT",
    "UNTIL",
    "WHILE",
    "ENDWHILE",
    // Subroutines
    "PROCEDURE",
    "ENDPROCEDURE",
    "FUNCTION",
    "ENDFUNCTION",
    "RETURNS",
    "RETURN",
    "CALL",
    "BYVAL",
    "BYREF",
    // I/O and operators
    "INPUT",
    "OUTPUT",
    "AND",
    "OR",
    "NOT",
    "MOD",
    "DIV",
    // Files
    "OPENFILE",
    "READFILE",
    "WRITEFILE",
    "CLOSEFILE",
    "READ",
    "WRITE",
    "APPEND",
    "RANDOM",
    "SEEK",
    "GETRECORD",
    "PUTRECORD",
    "EOF",
    // Built-in functions
    "LENGTH",
    "LEFT",
    "RIGHT",
    "MID",
    "SUBSTRING",
    "UCASE",
    "LCASE",
    "TO_UPPER",
    "TO_LOWER",
    "INT",
    "RAND",
    "NUM_TO_STR",
    "STR_TO_NUM",
    "IS_NUM",
    "ASC",
    "CHR",
    "DAY",
    "MONTH",
    "YEAR",
    "NOW",
];

/// Keywords borrowed from other languages that the dialect rejects.
pub const DISALLOWED: &[&str] = &[
    "BREAK", "CONTINUE", "DO", "SWITCH", "DEFAULT", "TRY", "CATCH", "FINALLY", "THROW", "ELIF",
    "ELSEIF", "PRINT", "VAR", "LET",
];

/// Keywords that make `=` a comparison rather than a misplaced assignment.
pub const TEST_KEYWORDS: &[&str] = &["IF", "THEN", "WHILE", "UNTIL", "CASE", "RETURN"];

/// Statements whose operands are checked against the symbol table.
pub const REFERENCE_KEYWORDS: &[&str] = &["OUTPUT", "INPUT", "IF", "WHILE"];

/// Accepted OPENFILE modes.
pub const FILE_MODES: &[&str] = &["READ", "WRITE", "APPEND"];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Disallowed words are matched regardless of case.
pub fn is_disallowed(word: &str) -> bool {
    DISALLOWED
        .iter()
        .any(|kw| kw.eq_ignore_ascii_case(word))
}

/// What to write instead of a disallowed keyword.
pub fn disallowed_alternative(word: &str) -> &'static str {
    match word.to_ascii_uppercase().as_str() {
        "BREAK" | "CONTINUE" => "restructure the loop condition instead",
        "DO" => "use WHILE ... ENDWHILE or REPEAT ... UNTIL",
        "SWITCH" | "DEFAULT" => "use CASE OF ... OTHERWISE ... ENDCASE",
        "TRY" | "CATCH" | "FINALLY" | "THROW" => "exception handling is not available",
        "ELIF" | "ELSEIF" => "nest an IF inside the ELSE branch",
        "PRINT" => "use OUTPUT",
        "VAR" | "LET" => "use DECLARE <name> : <type>",
        _ => "remove it",
    }
}

/// A block construct: one opening keyword, one required closing keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    If,
    For,
    While,
    Repeat,
    Procedure,
    Function,
    Case,
    Type,
}

impl BlockKind {
    pub const ALL: [BlockKind; 8] = [
        BlockKind::If,
        BlockKind::For,
        BlockKind::While,
        BlockKind::Repeat,
        BlockKind::Procedure,
        BlockKind::Function,
        BlockKind::Case,
        BlockKind::Type,
    ];

    pub fn from_opener(word: &str) -> Option<BlockKind> {
        match word {
            "IF" => Some(BlockKind::If),
            "FOR" => Some(BlockKind::For),
            "WHILE" => Some(BlockKind::While),
            "REPEAT" => Some(BlockKind::Repeat),
            "PROCEDURE" => Some(BlockKind::Procedure),
            "FUNCTION" => Some(BlockKind::Function),
            "CASE" => Some(BlockKind::Case),
            "TYPE" => Some(BlockKind::Type),
            _ => None,
        }
    }

    pub fn from_closer(word: &str) -> Option<BlockKind> {
        match word {
            "ENDIF" => Some(BlockKind::If),
            "NEXT" => Some(BlockKind::For),
            "ENDWHILE" => Some(BlockKind::While),
            "UNTIL" => Some(BlockKind::Repeat),
            "ENDPROCEDURE" => Some(BlockKind::Procedure),
            "ENDFUNCTION" => Some(BlockKind::Function),
            "ENDCASE" => Some(BlockKind::Case),
            "ENDTYPE" => Some(BlockKind::Type),
            _ => None,
        }
    }

    pub fn opener(self) -> &'static str {
        match self {
            BlockKind::If => "IF",
            BlockKind::For => "FOR",
            BlockKind::While => "WHILE",
            BlockKind::Repeat => "REPEAT",
            BlockKind::Procedure => "PROCEDURE",
            BlockKind::Function => "FUNCTION",
            BlockKind::Case => "CASE",
            BlockKind::Type => "TYPE",
        }
    }

    pub fn closer(self) -> &'static str {
        match self {
            BlockKind::If => "ENDIF",
            BlockKind::For => "NEXT",
            BlockKind::While => "ENDWHILE",
            BlockKind::Repeat => "UNTIL",
            BlockKind::Procedure => "ENDPROCEDURE",
            BlockKind::Function => "ENDFUNCTION",
            BlockKind::Case => "ENDCASE",
            BlockKind::Type => "ENDTYPE",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opener())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_case_sensitive() {
        assert!(is_keyword("OUTPUT"));
        assert!(!is_keyword("output"));
        assert!(!is_keyword("ENDFOR"));
    }

    #[test]
    fn disallowed_ignores_case() {
        assert!(is_disallowed("switch"));
        assert!(is_disallowed("Continue"));
        assert!(!is_disallowed("CASE"));
    }

    #[test]
    fn every_block_round_trips_through_its_keywords() {
        for kind in BlockKind::ALL {
            assert_eq!(BlockKind::from_opener(kind.opener()), Some(kind));
            assert_eq!(BlockKind::from_closer(kind.closer()), Some(kind));
            assert!(is_keyword(kind.opener()));
            assert!(is_keyword(kind.closer()));
        }
    }

    #[test]
    fn no_keyword_is_also_disallowed() {
        for kw in KEYWORDS {
            assert!(!is_disallowed(kw), "{kw} is both allowed and disallowed");
        }
    }
}
