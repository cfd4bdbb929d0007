use crate::lexer::cursor::Cursor;

/// The assignment arrow that `<-` expands to.
pub const ARROW: char = '←';

/// Replace `<-` with `←` outside literals and comments.
///
/// Meant for editor hosts that let users type the ASCII form; the checker
/// never applies it on its own.
pub fn expand_shortcuts(source: &str) -> String {
    source
        .split('\n')
        .map(expand_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn expand_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut cursor = Cursor::new(line);
    while let Some(ch) = cursor.advance() {
        match ch {
            '<' if cursor.peek() == Some('-') => {
                cursor.advance();
                out.push(ARROW);
            }
            '/' if cursor.peek() == Some('/') => {
                out.push(ch);
                out.push_str(cursor.rest());
                break;
            }
            '"' | '\'' => {
                out.push(ch);
                let start = cursor.offset();
                cursor.eat_while(|c| c != ch);
                out.push_str(cursor.slice_from(start));
                if cursor.eat(ch) {
                    out.push(ch);
                }
            }
            _ => out.push(ch),
        }
    }
    out
}
