use tracing::trace;

use crate::lexer::BlockKind;

/// An opener waiting for its closer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenBlock {
    pub kind: BlockKind,
    pub line: u32,
}

/// Result of presenting a closing keyword to the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The innermost open block was of the same kind.
    Matched(OpenBlock),
    /// The innermost open block was of another kind; it has been popped.
    Mismatched(OpenBlock),
    /// Nothing was open.
    Unexpected,
}

/// LIFO stack of open block constructs.
#[derive(Debug, Default)]
pub struct BlockStack {
    open: Vec<OpenBlock>,
}

impl BlockStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: BlockKind, line: u32) {
        trace!(%kind, line, depth = self.open.len() + 1, "block opened");
        self.open.push(OpenBlock { kind, line });
    }

    /// Pop the innermost block and compare it with `closer`.
    pub fn close(&mut self, closer: BlockKind) -> CloseOutcome {
        match self.open.pop() {
            None => CloseOutcome::Unexpected,
            Some(top) if top.kind == closer => {
                trace!(kind = %top.kind, line = top.line, "block closed");
                CloseOutcome::Matched(top)
            }
            Some(top) => CloseOutcome::Mismatched(top),
        }
    }

    /// Remove and return every block that was never closed, outermost first.
    pub fn drain_unclosed(&mut self) -> Vec<OpenBlock> {
        std::mem::take(&mut self.open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matched_pairs_empty_the_stack() {
        let mut stack = BlockStack::new();
        stack.push(BlockKind::While, 1);
        stack.push(BlockKind::If, 2);
        assert!(matches!(stack.close(BlockKind::If), CloseOutcome::Matched(b) if b.line == 2));
        assert!(matches!(stack.close(BlockKind::While), CloseOutcome::Matched(_)));
        assert!(stack.drain_unclosed().is_empty());
    }

    #[test]
    fn mismatch_pops_the_top() {
        let mut stack = BlockStack::new();
        stack.push(BlockKind::For, 1);
        stack.push(BlockKind::If, 2);
        let outcome = stack.close(BlockKind::For);
        assert_eq!(
            outcome,
            CloseOutcome::Mismatched(OpenBlock {
                kind: BlockKind::If,
                line: 2
            })
        );
        assert_eq!(stack.drain_unclosed().len(), 1);
    }

    #[test]
    fn close_on_empty_is_unexpected() {
        let mut stack = BlockStack::new();
        assert_eq!(stack.close(BlockKind::Repeat), CloseOutcome::Unexpected);
    }

    #[test]
    fn drain_returns_outermost_first() {
        let mut stack = BlockStack::new();
        stack.push(BlockKind::Procedure, 1);
        stack.push(BlockKind::Case, 3);
        let unclosed = stack.drain_unclosed();
        assert_eq!(unclosed.len(), 2);
        assert_eq!(unclosed[0].kind, BlockKind::Procedure);
        assert!(stack.drain_unclosed().is_empty());
    }
}
