//! Source location tracking (byte offsets).

use serde::Serialize;

/// A half-open byte range `[start, end)` into a source file's text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const fn new(start: u32, end: u32) -> Span {
        Span { start, end }
    }

    /// Empty span at offset zero, used when no better position is known.
    pub const EMPTY: Span = Span { start: 0, end: 0 };

    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(&self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_extends_both_ends() {
        let a = Span::new(4, 10);
        let b = Span::new(2, 8);
        assert_eq!(a.cover(b), Span::new(2, 10));
    }

    #[test]
    fn contains_is_half_open() {
        let s = Span::new(1, 3);
        assert!(s.contains(1));
        assert!(s.contains(2));
        assert!(!s.contains(3));
    }
}
