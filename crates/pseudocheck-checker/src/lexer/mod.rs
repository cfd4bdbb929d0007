pub mod cursor;
pub mod keywords;

mod line;

pub use keywords::BlockKind;
pub use line::{identifier_problem, split_lines, Assignment, CharLiteral, SourceLine, Word};
