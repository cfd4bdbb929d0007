use super::cursor::Cursor;
use super::keywords::is_keyword;

/// A maximal run of non-separator characters in the code part of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub text: String,
    /// Byte range within [`SourceLine::code`].
    pub start: usize,
    pub end: usize,
}

impl Word {
    pub fn is_number(&self) -> bool {
        self.text.chars().all(|c| c.is_ascii_digit())
    }

    /// Starts with a letter and contains only letters, digits and `_`.
    pub fn is_identifier(&self) -> bool {
        let mut chars = self.text.chars();
        chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

/// The contents of a closed single-quoted literal, escapes left in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharLiteral {
    pub text: String,
}

impl CharLiteral {
    /// Number of characters the literal denotes; `\x` counts once.
    pub fn char_count(&self) -> usize {
        let mut count = 0;
        let mut chars = self.text.chars();
        while let Some(ch) = chars.next() {
            if ch == '\\' {
                chars.next();
            }
            count += 1;
        }
        count
    }
}

/// `<target>[…] ← value` or `<target> = value` at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment<'a> {
    /// Base identifier, without any index or field suffix.
    pub target: &'a str,
    pub operator: char,
    pub value: &'a str,
}

/// One physical line of source, with literal contents and comments removed.
///
/// `code` keeps the quote delimiters of every literal but none of its text,
/// so keyword and identifier rules never look inside strings.
#[derive(Debug, Clone)]
pub struct SourceLine<'src> {
    /// 1-based line number.
    pub number: u32,
    pub raw: &'src str,
    code: String,
    words: Vec<Word>,
    char_literals: Vec<CharLiteral>,
    quote_count: usize,
}

/// Split source text on line feeds, dropping a trailing carriage return.
pub fn split_lines(source: &str) -> Vec<SourceLine<'_>> {
    source
        .split('\n')
        .enumerate()
        .map(|(idx, raw)| {
            let raw = raw.strip_suffix('\r').unwrap_or(raw);
            SourceLine::new(idx as u32 + 1, raw)
        })
        .collect()
}

/// Characters that end a word. `_` and a few stray symbols are left out so
/// that identifiers containing them are reported as malformed.
fn is_separator(ch: char) -> bool {
    match ch {
        '_' | '$' | '@' | '#' | '?' | '~' | '`' | '\\' => false,
        '←' | '→' | '≠' | '≤' | '≥' | '×' | '÷' => true,
        c => c.is_whitespace() || c.is_ascii_punctuation(),
    }
}

impl<'src> SourceLine<'src> {
    pub fn new(number: u32, raw: &'src str) -> Self {
        let mut line = Self {
            number,
            raw,
            code: String::new(),
            words: Vec::new(),
            char_literals: Vec::new(),
            quote_count: 0,
        };
        line.strip_literals();
        line.words = split_words(&line.code);
        line
    }

    fn strip_literals(&mut self) {
        let mut cursor = Cursor::new(self.raw);
        while let Some(ch) = cursor.peek() {
            match ch {
                '/' if cursor.peek_second() == Some('/') => break,
                '"' => {
                    cursor.advance();
                    self.quote_count += 1;
                    self.code.push('"');
                    cursor.eat_while(|c| c != '"');
                    if cursor.eat('"') {
                        self.quote_count += 1;
                        self.code.push('"');
                    }
                }
                '\'' => {
                    cursor.advance();
                    let checkpoint = cursor.clone();
                    match scan_char_literal(&mut cursor) {
                        Some(text) => {
                            self.char_literals.push(CharLiteral { text });
                            self.code.push_str("''");
                        }
                        None => {
                            // A lone apostrophe stays in the code.
                            cursor = checkpoint;
                            self.code.push('\'');
                        }
                    }
                }
                _ => {
                    cursor.advance();
                    self.code.push(ch);
                }
            }
        }
    }

    /// The line without comments and without literal contents.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn char_literals(&self) -> &[CharLiteral] {
        &self.char_literals
    }

    /// Number of `"` characters outside comments.
    pub fn quote_count(&self) -> usize {
        self.quote_count
    }

    pub fn has_unclosed_string(&self) -> bool {
        self.quote_count % 2 == 1
    }

    /// True for lines carrying something other than whitespace and comments.
    pub fn has_content(&self) -> bool {
        !self.code.trim().is_empty()
    }

    /// Count of leading space characters.
    pub fn indent(&self) -> usize {
        self.raw.chars().take_while(|&c| c == ' ').count()
    }

    /// The leading word of the first whitespace-delimited token, e.g. `IF`
    /// for `IF(x > 1) THEN`. Empty when the line starts with punctuation.
    pub fn head(&self) -> &str {
        let trimmed = self.code.trim_start();
        let end = trimmed
            .char_indices()
            .find(|&(_, c)| is_separator(c))
            .map_or(trimmed.len(), |(idx, _)| idx);
        &trimmed[..end]
    }

    /// The first whitespace-delimited token, punctuation included.
    pub fn first_token(&self) -> Option<&str> {
        self.code.split_whitespace().next()
    }

    /// Code following the head word.
    pub fn after_head(&self) -> &str {
        let trimmed = self.code.trim_start();
        &trimmed[self.head().len()..]
    }

    pub fn has_word(&self, word: &str) -> bool {
        self.words.iter().any(|w| w.text == word)
    }

    pub fn has_keyword(&self) -> bool {
        self.words.iter().any(|w| is_keyword(&w.text))
    }

    /// The next non-whitespace character after `word`.
    pub fn char_after(&self, word: &Word) -> Option<char> {
        self.code[word.end..].chars().find(|c| !c.is_whitespace())
    }

    /// The closest non-whitespace character before `word`.
    pub fn char_before(&self, word: &Word) -> Option<char> {
        self.code[..word.start]
            .chars()
            .rev()
            .find(|c| !c.is_whitespace())
    }

    /// Text between the brackets directly following `word`, as in `arr[3]`.
    pub fn bracket_after(&self, word: &Word) -> Option<&str> {
        let rest = self.code[word.end..].trim_start().strip_prefix('[')?;
        rest.split_once(']').map(|(inside, _)| inside.trim())
    }

    /// Text between the parentheses directly following `word`, as in `LENGTH(s)`.
    pub fn parens_after(&self, word: &Word) -> Option<&str> {
        let rest = self.code[word.end..].trim_start().strip_prefix('(')?;
        rest.split_once(')').map(|(inside, _)| inside.trim())
    }

    /// Recognise a line that starts with an assignment to an identifier.
    pub fn assignment(&self) -> Option<Assignment<'_>> {
        let trimmed = self.code.trim_start();
        let mut cursor = Cursor::new(trimmed);
        if !cursor.peek().is_some_and(|c| c.is_ascii_alphabetic() || c == '_') {
            return None;
        }
        cursor.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let target = cursor.slice_from(0);
        loop {
            cursor.eat_while(char::is_whitespace);
            match cursor.peek() {
                Some('[') => {
                    cursor.eat_while(|c| c != ']');
                    if !cursor.eat(']') {
                        return None;
                    }
                }
                Some('.') => {
                    cursor.advance();
                    cursor.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
                }
                _ => break,
            }
        }
        let operator = cursor.advance()?;
        if operator != '←' && operator != '=' {
            return None;
        }
        Some(Assignment {
            target,
            operator,
            value: cursor.rest().trim(),
        })
    }
}

/// Why `name` is not a valid identifier, or `None` when it is one.
pub fn identifier_problem(name: &str) -> Option<String> {
    let first = name.chars().next()?;
    match name
        .chars()
        .find(|&c| !(c.is_ascii_alphanumeric() || c == '_'))
    {
        Some(ch) if first.is_ascii_alphabetic() || ch != first => Some(format!(
            "Identifier '{}' contains invalid character '{}'",
            name, ch
        )),
        _ if !first.is_ascii_alphabetic() => Some(format!(
            "Identifier '{}' must start with a letter",
            name
        )),
        _ => None,
    }
}

/// Read a char literal after its opening quote. `None` when the quote is
/// never closed on this line.
fn scan_char_literal(cursor: &mut Cursor<'_>) -> Option<String> {
    let mut text = String::new();
    while let Some(ch) = cursor.advance() {
        match ch {
            '\\' => {
                text.push(ch);
                if let Some(escaped) = cursor.advance() {
                    text.push(escaped);
                }
            }
            '\'' => return Some(text),
            _ => text.push(ch),
        }
    }
    None
}

fn split_words(code: &str) -> Vec<Word> {
    let mut words = Vec::new();
    let mut cursor = Cursor::new(code);
    while !cursor.is_eof() {
        cursor.eat_while(is_separator);
        let start = cursor.offset();
        cursor.eat_while(|c| !is_separator(c));
        if cursor.offset() > start {
            words.push(Word {
                text: cursor.slice_from(start).to_string(),
                start,
                end: cursor.offset(),
            });
        }
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(raw: &str) -> Vec<String> {
        SourceLine::new(1, raw)
            .words()
            .iter()
            .map(|w| w.text.clone())
            .collect()
    }

    #[test]
    fn strips_strings_and_comments() {
        let line = SourceLine::new(1, r#"OUTPUT "IF x = y" // ENDIF"#);
        assert_eq!(line.code().trim_end(), r#"OUTPUT """#);
        assert_eq!(words(r#"OUTPUT "IF x = y" // ENDIF"#), vec!["OUTPUT"]);
        assert_eq!(line.quote_count(), 2);
    }

    #[test]
    fn comment_marker_inside_string_is_text() {
        let line = SourceLine::new(1, r#"OUTPUT "http://x" "#);
        assert!(!line.has_unclosed_string());
        assert_eq!(line.code().trim_end(), r#"OUTPUT """#);
    }

    #[test]
    fn unclosed_string_swallows_rest() {
        let line = SourceLine::new(3, r#"OUTPUT "oops ← 1"#);
        assert!(line.has_unclosed_string());
        assert_eq!(line.code(), r#"OUTPUT ""#);
    }

    #[test]
    fn char_literals_are_collected() {
        let line = SourceLine::new(1, r"c ← 'ab' + '\n' + ''");
        let counts: Vec<usize> = line.char_literals().iter().map(|l| l.char_count()).collect();
        assert_eq!(counts, vec![2, 1, 0]);
        assert_eq!(line.code(), "c ← '' + '' + ''");
    }

    #[test]
    fn lone_apostrophe_stays_code() {
        let line = SourceLine::new(1, "x ← it's");
        assert!(line.char_literals().is_empty());
        assert_eq!(words("x ← it's"), vec!["x", "it", "s"]);
    }

    #[test]
    fn words_split_on_glyphs_and_punctuation() {
        assert_eq!(words("arr[i] ← a$b+2x"), vec!["arr", "i", "a$b", "2x"]);
        assert_eq!(words("x≠y"), vec!["x", "y"]);
    }

    #[test]
    fn head_and_blank_detection() {
        let line = SourceLine::new(1, "   IF(x > 1) THEN");
        assert_eq!(line.head(), "IF");
        assert_eq!(line.indent(), 3);
        assert!(!SourceLine::new(1, "   ").has_content());
        assert!(!SourceLine::new(1, "  // note").has_content());
    }

    #[test]
    fn assignment_forms() {
        let line = SourceLine::new(1, "  scores[3] ← total + 1");
        let assign = line.assignment().unwrap();
        assert_eq!(assign.target, "scores");
        assert_eq!(assign.operator, '←');
        assert_eq!(assign.value, "total + 1");

        let line = SourceLine::new(1, "p.x = 4");
        assert_eq!(line.assignment().unwrap().target, "p");

        assert!(SourceLine::new(1, "x <= 4").assignment().is_none());
        assert!(SourceLine::new(1, "DECLARE x : INTEGER").assignment().is_none());
    }

    #[test]
    fn brackets_and_parens_after_word() {
        let line = SourceLine::new(1, "OUTPUT LENGTH(name), arr [ 10 ]");
        let length = &line.words()[1];
        assert_eq!(line.parens_after(length), Some("name"));
        let arr = &line.words()[3];
        assert_eq!(line.bracket_after(arr), Some("10"));
        assert_eq!(line.char_after(arr), Some('['));
        assert_eq!(line.char_before(&line.words()[2]), Some('('));
    }

    #[test]
    fn split_lines_numbers_from_one() {
        let lines = split_lines("a\r\nb\n");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].raw, "a");
        assert_eq!(lines[1].number, 2);
        assert!(!lines[2].has_content());
    }

    #[test]
    fn identifier_shapes() {
        assert_eq!(identifier_problem("total_2"), None);
        assert_eq!(
            identifier_problem("2nd").as_deref(),
            Some("Identifier '2nd' must start with a letter")
        );
        assert_eq!(
            identifier_problem("%x").as_deref(),
            Some("Identifier '%x' must start with a letter")
        );
        assert_eq!(
            identifier_problem("my-count").as_deref(),
            Some("Identifier 'my-count' contains invalid character '-'")
        );
        assert_eq!(
            identifier_problem("2a%").as_deref(),
            Some("Identifier '2a%' contains invalid character '%'")
        );
    }
}
