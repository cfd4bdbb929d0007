/// Low-level character reader over one line of source text.
///
/// Offsets are in bytes, so slices taken with [`Cursor::slice_from`] line
/// up with the words recorded by the scanner.
#[derive(Debug, Clone)]
pub struct Cursor<'src> {
    source: &'src str,
    chars: std::str::Chars<'src>,
    offset: usize,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.chars(),
            offset: 0,
        }
    }

    /// Byte offset of the next character.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The next character, left in place.
    pub fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    /// One character of lookahead past [`peek`](Self::peek), used for `//`.
    pub fn peek_second(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next()
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.offset += ch.len_utf8();
        Some(ch)
    }

    /// Take `expected` if it comes next.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn is_eof(&self) -> bool {
        self.peek().is_none()
    }

    /// Text consumed since byte offset `start`.
    pub fn slice_from(&self, start: usize) -> &'src str {
        &self.source[start..self.offset]
    }

    /// Everything not yet consumed.
    pub fn rest(&self) -> &'src str {
        &self.source[self.offset..]
    }

    /// Skip the longest run of characters matching `predicate`.
    pub fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if predicate(ch) {
                self.advance();
            } else {
                break;
            }
        }
    }
}
