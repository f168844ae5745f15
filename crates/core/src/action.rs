// Reducer: (grid, action) -> grid.
//
// Every user action on the entry grid is one of these. The UI layer only
// produces actions and swaps in the returned snapshot.

use crate::field::{Field, FieldPolicies};
use crate::grid::Grid;
use crate::paste;
use crate::record::RowId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Store `value` exactly as given.
    SetCell { row: RowId, field: Field, value: String },
    /// Keystroke edit: `value` goes through the field's sanitizer first.
    Edit { row: RowId, field: Field, value: String },
    AddRow,
    DeleteRow { row: RowId },
    /// Clipboard text pasted at an anchor cell.
    Paste { row: RowId, field: Field, text: String },
    /// Back to `seed_rows` empty rows.
    Reset { seed_rows: usize },
}

pub fn reduce(grid: &Grid, action: &Action, policies: &FieldPolicies) -> Grid {
    match action {
        Action::SetCell { row, field, value } => grid.set_cell(*row, *field, value.as_str()),
        Action::Edit { row, field, value } => {
            grid.set_cell(*row, *field, policies.normalize_numeric_field(*field, value))
        }
        Action::AddRow => grid.add_row(),
        Action::DeleteRow { row } => grid.delete_row(*row),
        Action::Paste { row, field, text } => paste::paste(grid, *row, *field, text, policies),
        Action::Reset { seed_rows } => grid.reset(*seed_rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_sanitizes_set_cell_does_not() {
        let p = FieldPolicies::default();
        let g = Grid::seeded(2);

        let edited = reduce(
            &g,
            &Action::Edit { row: 0, field: Field::Isbn, value: "978-0".into() },
            &p,
        );
        assert_eq!(edited.row(0).unwrap().get(Field::Isbn), "9780");

        let set = reduce(
            &g,
            &Action::SetCell { row: 0, field: Field::Isbn, value: "978-0".into() },
            &p,
        );
        assert_eq!(set.row(0).unwrap().get(Field::Isbn), "978-0");
    }

    #[test]
    fn actions_compose() {
        let p = FieldPolicies::default();
        let actions = [
            Action::AddRow,
            Action::Paste { row: 9, field: Field::BookName, text: "a\nb\nc".into() },
            Action::DeleteRow { row: 0 },
        ];
        let g = actions.iter().fold(Grid::seeded(10), |g, a| reduce(&g, a, &p));
        // 10 seed + 1 added + 1 grown by paste - 1 deleted
        assert_eq!(g.len(), 11);
        assert_eq!(g.content_rows().len(), 3);

        let g = reduce(&g, &Action::Reset { seed_rows: 10 }, &p);
        assert_eq!(g, Grid::seeded(10));
    }
}
