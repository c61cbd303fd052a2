//! Read position over the normalized lines

use super::Line;

/// A view of the lines that have not been consumed yet.
///
/// Cursors are `Copy`: a grammar takes one by value and hands back the
/// cursor for whatever it did not consume.
#[derive(Clone,Copy,Debug)]
pub struct Cursor<'a> {
    lines: &'a [Line],
    /// Last line consumed before this view (for end-of-input diagnostics)
    last: Option<&'a Line>,
}

impl<'a> Cursor<'a> {
    pub fn new(lines: &'a [Line]) -> Self {
        Self { lines, last: None }
    }

    /// Next line without consuming it
    pub fn peek(&self) -> Option<&'a Line> {
        self.lines.first()
    }

    /// Consume one line
    pub fn next(self) -> Option<(&'a Line, Cursor<'a>)> {
        let (first, rest) = self.lines.split_first()?;
        Some((first, Cursor { lines: rest, last: Some(first) }))
    }

    /// Consume exactly `n` lines, or nothing if fewer remain
    pub fn take(self, n: usize) -> Option<(&'a [Line], Cursor<'a>)> {
        if n > self.lines.len() {
            return None;
        }
        let (taken, rest) = self.lines.split_at(n);
        let last = taken.last().or(self.last);
        Some((taken, Cursor { lines: rest, last }))
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }

    /// Marker line for failures caused by running out of input
    pub fn end_of_input(&self) -> Line {
        Line::end_of_input(self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines() -> Vec<Line> {
        vec![Line::new(1, "a"), Line::new(3, "b"), Line::new(4, "c")]
    }

    #[test]
    fn next_and_take() {
        let lines = lines();
        let cursor = Cursor::new(&lines);
        let (first, rest) = cursor.next().expect("Cannot take first line");
        assert_eq!(first.text, "a");
        assert_eq!(rest.remaining(), 2);
        // Copies leave the source cursor where it was
        assert_eq!(cursor.remaining(), 3);
        assert!(rest.take(3).is_none(), "Taking past the end not caught");
        let (taken, rest) = rest.take(2).expect("Cannot take two lines");
        assert_eq!(taken.len(), 2);
        assert!(rest.is_empty());
        assert!(rest.next().is_none());
        assert_eq!(rest.end_of_input().number, 5);
    }

    #[test]
    fn end_of_input_without_lines() {
        let cursor = Cursor::new(&[]);
        assert!(cursor.peek().is_none());
        assert_eq!(cursor.end_of_input().number, 1);
    }
}
