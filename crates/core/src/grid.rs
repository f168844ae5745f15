//! Grid state store.
//!
//! A [`Grid`] is an immutable snapshot. Every mutation returns a new snapshot
//! and leaves the receiver untouched. Rows sit behind `Arc`, so a mutation
//! only reallocates the rows it changes; every other row in the new snapshot
//! is the same allocation as in the old one (checkable with `Arc::ptr_eq`).

use std::sync::Arc;

use crate::field::Field;
use crate::record::{Row, RowId};

#[derive(Debug, Clone)]
pub struct Grid {
    rows: Vec<Arc<Row>>,
    /// Next identifier to hand out. Only grows, so ids are never reused.
    next_id: RowId,
    /// Deletion never takes the grid below this many rows (at least 1).
    min_rows: usize,
}

impl PartialEq for Grid {
    /// Structural equality of the rows, in order.
    fn eq(&self, other: &Self) -> bool {
        self.rows.len() == other.rows.len()
            && self.rows.iter().zip(&other.rows).all(|(a, b)| a == b)
    }
}

impl Grid {
    /// `count` empty rows with ids `0..count`, minimum row count 1.
    pub fn seeded(count: usize) -> Self {
        Self::seeded_with_min(count, 1)
    }

    /// Like [`Grid::seeded`], with a custom deletion floor. The grid is
    /// padded up to `min_rows` if `count` is smaller.
    pub fn seeded_with_min(count: usize, min_rows: usize) -> Self {
        let min_rows = min_rows.max(1);
        let count = count.max(min_rows);
        let rows = (0..count as RowId).map(|id| Arc::new(Row::empty(id))).collect();
        Self {
            rows,
            next_id: count as RowId,
            min_rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false; kept for the `len`/`is_empty` pair.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn min_rows(&self) -> usize {
        self.min_rows
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> + '_ {
        self.rows.iter().map(|r| r.as_ref())
    }

    #[cfg(test)]
    pub(crate) fn row_handles(&self) -> &[Arc<Row>] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id).map(|r| r.as_ref())
    }

    pub fn row_at(&self, position: usize) -> Option<&Row> {
        self.rows.get(position).map(|r| r.as_ref())
    }

    /// Row identifiers in visual order (position → id).
    pub fn row_order(&self) -> Vec<RowId> {
        self.rows.iter().map(|r| r.id).collect()
    }

    /// Visual position of a row.
    pub fn position_of(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    /// Replace one cell. Unknown `id` gives back an equal grid.
    pub fn set_cell(&self, id: RowId, field: Field, value: impl Into<String>) -> Grid {
        let mut next = self.clone();
        if let Some(pos) = self.position_of(id) {
            let mut row = Row::clone(&self.rows[pos]);
            row.record.set(field, value);
            next.rows[pos] = Arc::new(row);
        }
        next
    }

    /// Append one empty row with a fresh id.
    pub fn add_row(&self) -> Grid {
        let mut next = self.clone();
        next.push_empty();
        next
    }

    /// Remove a row, unless that would drop below the minimum row count.
    pub fn delete_row(&self, id: RowId) -> Grid {
        let mut next = self.clone();
        if self.rows.len() <= self.min_rows {
            return next;
        }
        if let Some(pos) = self.position_of(id) {
            next.rows.remove(pos);
        }
        next
    }

    /// Rows with at least one non-empty data field, in visual order.
    pub fn content_rows(&self) -> Vec<&Row> {
        self.rows().filter(|r| r.is_content_bearing()).collect()
    }

    /// Fresh grid with the same min-row floor and `seed_rows` empty rows.
    ///
    /// Ids restart at 0: a reset starts a new entry session.
    pub fn reset(&self, seed_rows: usize) -> Grid {
        Grid::seeded_with_min(seed_rows, self.min_rows)
    }

    // ── Crate-internal builders (used by paste fanout) ──────────────

    pub(crate) fn push_empty(&mut self) -> RowId {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.push(Arc::new(Row::empty(id)));
        id
    }

    pub(crate) fn row_mut_at(&mut self, position: usize) -> Option<&mut Row> {
        self.rows.get_mut(position).map(Arc::make_mut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(grid: &Grid, id: RowId, field: Field, v: &str) -> Grid {
        grid.set_cell(id, field, v)
    }

    #[test]
    fn seeded_grid_has_sequential_ids() {
        let g = Grid::seeded(10);
        assert_eq!(g.len(), 10);
        assert_eq!(g.row_order(), (0..10u64).collect::<Vec<_>>());
        assert!(g.rows().all(|r| !r.is_content_bearing()));
    }

    #[test]
    fn seeded_never_below_min() {
        let g = Grid::seeded_with_min(0, 0);
        assert_eq!(g.len(), 1);
        assert_eq!(g.min_rows(), 1);
        let g = Grid::seeded_with_min(2, 5);
        assert_eq!(g.len(), 5);
    }

    #[test]
    fn set_cell_touches_only_target_row() {
        let g = Grid::seeded(3);
        let next = g.set_cell(1, Field::Author, "한강");

        assert_eq!(next.row(1).unwrap().get(Field::Author), "한강");
        assert_eq!(next.row(1).unwrap().get(Field::BookName), "");
        assert!(Arc::ptr_eq(&g.row_handles()[0], &next.row_handles()[0]));
        assert!(Arc::ptr_eq(&g.row_handles()[2], &next.row_handles()[2]));
        assert!(!Arc::ptr_eq(&g.row_handles()[1], &next.row_handles()[1]));
        // Receiver unchanged.
        assert_eq!(g.row(1).unwrap().get(Field::Author), "");
    }

    #[test]
    fn set_cell_unknown_row_is_noop() {
        let g = filled(&Grid::seeded(3), 0, Field::BookId, "1");
        let next = g.set_cell(99, Field::BookId, "2");
        assert_eq!(next, g);
    }

    #[test]
    fn add_row_appends_empty_row_with_fresh_id() {
        let g = Grid::seeded(10);
        let next = g.add_row();
        assert_eq!(next.len(), 11);
        let last = next.row_at(10).unwrap();
        assert_eq!(last.id, 10);
        assert!(!last.is_content_bearing());
    }

    #[test]
    fn ids_not_reused_after_delete() {
        let g = Grid::seeded(3).delete_row(2).add_row();
        assert_eq!(g.row_order(), vec![0, 1, 3]);
        let g = g.delete_row(3).add_row();
        assert_eq!(g.row_order(), vec![0, 1, 4]);
    }

    #[test]
    fn delete_row_respects_minimum() {
        let g = Grid::seeded(2);
        let one = g.delete_row(0);
        assert_eq!(one.len(), 1);
        let still_one = one.delete_row(1);
        assert_eq!(still_one.len(), 1);
        assert_eq!(still_one.row_order(), vec![1]);
    }

    #[test]
    fn delete_row_respects_custom_minimum() {
        let g = Grid::seeded_with_min(3, 3).add_row();
        let g = g.delete_row(0);
        assert_eq!(g.len(), 3);
        let g = g.delete_row(1);
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn delete_unknown_row_is_noop() {
        let g = Grid::seeded(3);
        assert_eq!(g.delete_row(42), g);
    }

    #[test]
    fn content_rows_in_visual_order() {
        let g = Grid::seeded(4);
        let g = filled(&g, 3, Field::BookName, "d");
        let g = filled(&g, 1, Field::Price, "100");
        let ids: Vec<RowId> = g.content_rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn reset_restores_seed_state() {
        let g = filled(&Grid::seeded(10).add_row().add_row(), 11, Field::Isbn, "978");
        let fresh = g.reset(10);
        assert_eq!(fresh, Grid::seeded(10));
        assert_eq!(fresh.len(), 10);
    }
}
