use std::ops::Range;

/// An entity's window into the shared pending-order arena.
///
/// The range is the only handle an entity holds on its queue. Every change to
/// `start` or `len` goes through [`OrderQueue`](super::OrderQueue), which moves
/// the slots along with it, so a range never aliases slots it does not own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueRange {
    start: usize,
    len: usize,
}

impl QueueRange {
    pub(super) const fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    pub const fn start(&self) -> usize {
        self.start
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last slot owned by this range.
    pub const fn end(&self) -> usize {
        self.start + self.len
    }

    pub const fn slots(&self) -> Range<usize> {
        self.start..self.end()
    }

    pub(super) fn grow(&mut self) {
        self.len += 1;
    }

    pub(super) fn shrink(&mut self) {
        self.len -= 1;
    }

    pub(super) fn relocate(&mut self, start: usize) {
        self.start = start;
    }
}
