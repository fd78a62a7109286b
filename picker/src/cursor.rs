use crate::catalog::{CandidateId, SkinTone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Empty,
    At(usize),
}

/// A candidate picked with [`SelectionCursor::accept`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub id: CandidateId,
    pub tone: SkinTone,
}

#[derive(Debug, Clone, Copy)]
struct Row {
    start: usize,
    len: usize,
}

/// Highlight position over the active result set.
///
/// Every group is a row: each category of the full listing, or the single
/// filtered group. A nonzero `columns` further wraps groups into rows of at
/// most that many items. Movement clamps at the ends, it never wraps.
#[derive(Debug, Clone)]
pub struct SelectionCursor {
    columns: usize,
    items: Vec<CandidateId>,
    rows: Vec<Row>,
    state: CursorState,
}

impl SelectionCursor {
    pub fn new(columns: usize) -> Self {
        Self {
            columns,
            items: Vec::new(),
            rows: Vec::new(),
            state: CursorState::Empty,
        }
    }

    /// Swap in a new result set and revalidate the position.
    pub fn replace(&mut self, groups: Vec<Vec<CandidateId>>) {
        self.items.clear();
        self.rows.clear();
        for group in groups {
            if group.is_empty() {
                continue;
            }
            let width = if self.columns == 0 {
                group.len()
            } else {
                self.columns
            };
            for chunk in group.chunks(width) {
                self.rows.push(Row {
                    start: self.items.len(),
                    len: chunk.len(),
                });
                self.items.extend_from_slice(chunk);
            }
        }

        self.state = match (self.state, self.items.len()) {
            (_, 0) => CursorState::Empty,
            (CursorState::Empty, _) => CursorState::At(0),
            (CursorState::At(i), n) => CursorState::At(i.min(n - 1)),
        };
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current(&self) -> Option<CandidateId> {
        match self.state {
            CursorState::Empty => None,
            CursorState::At(i) => self.items.get(i).copied(),
        }
    }

    pub fn next(&mut self) {
        if let CursorState::At(i) = self.state {
            self.state = CursorState::At((i + 1).min(self.items.len() - 1));
        }
    }

    pub fn previous(&mut self) {
        if let CursorState::At(i) = self.state {
            self.state = CursorState::At(i.saturating_sub(1));
        }
    }

    pub fn first(&mut self) {
        if !self.items.is_empty() {
            self.state = CursorState::At(0);
        }
    }

    pub fn last(&mut self) {
        if !self.items.is_empty() {
            self.state = CursorState::At(self.items.len() - 1);
        }
    }

    pub fn next_row(&mut self, count: usize) {
        self.move_rows(|row, last| (row + count.max(1)).min(last));
    }

    pub fn previous_row(&mut self, count: usize) {
        self.move_rows(|row, _| row.saturating_sub(count.max(1)));
    }

    /// Current candidate paired with `tone`; `None` when there is nothing to pick.
    pub fn accept(&self, tone: SkinTone) -> Option<Selection> {
        self.current().map(|id| Selection { id, tone })
    }

    fn move_rows(&mut self, target: impl FnOnce(usize, usize) -> usize) {
        let CursorState::At(i) = self.state else {
            return;
        };
        let row = self.row_of(i);
        let col = i - self.rows[row].start;
        let dest = self.rows[target(row, self.rows.len() - 1)];
        self.state = CursorState::At(dest.start + col.min(dest.len - 1));
    }

    fn row_of(&self, index: usize) -> usize {
        // Rows are sorted by start; the row is the last one starting at or before `index`.
        self.rows.partition_point(|r| r.start <= index) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(range: std::ops::Range<usize>) -> Vec<CandidateId> {
        range.map(CandidateId).collect()
    }

    #[test]
    fn empty_set_is_empty_state() {
        let mut c = SelectionCursor::new(4);
        c.replace(vec![]);
        assert_eq!(c.state(), CursorState::Empty);
        c.next();
        c.next_row(3);
        c.last();
        assert_eq!(c.state(), CursorState::Empty);
        assert_eq!(c.accept(SkinTone::None), None);
    }

    #[test]
    fn filling_an_empty_set_starts_at_zero() {
        let mut c = SelectionCursor::new(4);
        c.replace(vec![ids(0..3)]);
        assert_eq!(c.state(), CursorState::At(0));
    }

    #[test]
    fn replacing_clamps_or_clears() {
        let mut c = SelectionCursor::new(0);
        c.replace(vec![ids(0..10)]);
        c.last();
        assert_eq!(c.state(), CursorState::At(9));
        c.replace(vec![ids(0..4)]);
        assert_eq!(c.state(), CursorState::At(3));
        c.replace(vec![ids(0..8)]);
        assert_eq!(c.state(), CursorState::At(3));
        c.replace(vec![vec![]]);
        assert_eq!(c.state(), CursorState::Empty);
        c.replace(vec![ids(0..8)]);
        assert_eq!(c.state(), CursorState::At(0));
    }

    #[test]
    fn single_steps_clamp_at_both_ends() {
        let mut c = SelectionCursor::new(0);
        c.replace(vec![ids(0..3)]);
        c.previous();
        assert_eq!(c.state(), CursorState::At(0));
        c.next();
        c.next();
        assert_eq!(c.state(), CursorState::At(2));
        c.next();
        assert_eq!(c.state(), CursorState::At(2));
        c.first();
        assert_eq!(c.state(), CursorState::At(0));
    }

    #[test]
    fn rows_follow_groups_and_columns() {
        // Group A: 0..5 -> rows [0..3] [3..5]; group B: 5..7 -> row [5..7].
        let mut c = SelectionCursor::new(3);
        c.replace(vec![ids(0..5), ids(5..7)]);
        c.next();
        c.next();
        assert_eq!(c.state(), CursorState::At(2));
        c.next_row(1);
        // Second row of group A is shorter: the column clamps.
        assert_eq!(c.state(), CursorState::At(4));
        c.next_row(1);
        assert_eq!(c.state(), CursorState::At(6));
        c.next_row(1);
        assert_eq!(c.state(), CursorState::At(6));
        c.previous_row(1);
        assert_eq!(c.state(), CursorState::At(4));
        c.previous_row(10);
        assert_eq!(c.state(), CursorState::At(1));
    }

    #[test]
    fn paging_moves_several_rows_and_clamps() {
        let mut c = SelectionCursor::new(2);
        c.replace(vec![ids(0..20)]);
        c.next();
        c.next_row(3);
        assert_eq!(c.state(), CursorState::At(7));
        c.next_row(100);
        assert_eq!(c.state(), CursorState::At(19));
        c.previous_row(100);
        assert_eq!(c.state(), CursorState::At(1));
    }

    #[test]
    fn by_default_a_filtered_set_is_a_single_row() {
        let mut c = SelectionCursor::new(crate::consts::DEFAULT_COLUMNS);
        c.replace(vec![ids(0..15)]);
        c.next_row(1);
        assert_eq!(c.state(), CursorState::At(0));
        c.last();
        c.previous_row(1);
        assert_eq!(c.state(), CursorState::At(14));
    }

    #[test]
    fn by_default_categories_are_the_rows() {
        let mut c = SelectionCursor::new(crate::consts::DEFAULT_COLUMNS);
        c.replace(vec![ids(0..12), ids(12..14), ids(14..30)]);
        c.last();
        c.previous_row(1);
        assert_eq!(c.state(), CursorState::At(13));
        c.previous_row(1);
        assert_eq!(c.state(), CursorState::At(1));
    }

    #[test]
    fn a_filtered_set_without_columns_is_one_row() {
        let mut c = SelectionCursor::new(0);
        c.replace(vec![ids(0..5)]);
        c.next();
        c.next_row(1);
        assert_eq!(c.state(), CursorState::At(1));
    }

    #[test]
    fn accept_pairs_the_highlight_with_the_tone() {
        let mut c = SelectionCursor::new(0);
        c.replace(vec![vec![CandidateId(9), CandidateId(4)]]);
        c.next();
        assert_eq!(
            c.accept(SkinTone::Dark),
            Some(Selection {
                id: CandidateId(4),
                tone: SkinTone::Dark,
            })
        );
    }
}
