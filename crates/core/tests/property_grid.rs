// Property-based tests for the grid store and paste fanout.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashSet;

use bookreg_core::paste::paste;
use bookreg_core::{reduce, Action, Field, FieldPolicies, Grid, RowId, FIELD_COUNT};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_field() -> impl Strategy<Value = Field> {
    (0..FIELD_COUNT).prop_map(|i| Field::at(i).unwrap())
}

/// Row ids in a range that covers seeded, grown and unknown rows.
fn arb_row() -> impl Strategy<Value = RowId> {
    0u64..40
}

fn arb_cell() -> impl Strategy<Value = String> {
    r"[ a-z0-9,\-가-힣]{0,8}"
}

/// Clipboard-like text: lines of tab-separated cells, some blank lines.
fn arb_clipboard() -> impl Strategy<Value = String> {
    proptest::collection::vec(proptest::collection::vec(arb_cell(), 0..12), 0..15).prop_map(
        |lines| {
            lines
                .into_iter()
                .map(|cells| cells.join("\t"))
                .collect::<Vec<_>>()
                .join("\n")
        },
    )
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (arb_row(), arb_field(), arb_cell())
            .prop_map(|(row, field, value)| Action::SetCell { row, field, value }),
        arb_input_action(),
    ]
}

/// Actions a user can produce from the form: everything goes through a sanitizer.
fn arb_input_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (arb_row(), arb_field(), arb_cell())
            .prop_map(|(row, field, value)| Action::Edit { row, field, value }),
        Just(Action::AddRow),
        arb_row().prop_map(|row| Action::DeleteRow { row }),
        (arb_row(), arb_field(), arb_clipboard())
            .prop_map(|(row, field, text)| Action::Paste { row, field, text }),
    ]
}

fn run(actions: &[Action]) -> Grid {
    let policies = FieldPolicies::default();
    actions
        .iter()
        .fold(Grid::seeded(10), |g, a| reduce(&g, a, &policies))
}

fn non_blank_lines(text: &str) -> usize {
    text.split('\n').filter(|l| !l.trim().is_empty()).count()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn ids_unique_and_grid_never_empty(actions in proptest::collection::vec(arb_action(), 0..40)) {
        let g = run(&actions);
        prop_assert!(g.len() >= 1);
        let ids: HashSet<RowId> = g.row_order().into_iter().collect();
        prop_assert_eq!(ids.len(), g.len());
    }

    #[test]
    fn set_cell_shares_untouched_rows(
        actions in proptest::collection::vec(arb_action(), 0..10),
        field in arb_field(),
        value in arb_cell(),
        pick in any::<prop::sample::Index>(),
    ) {
        let g = run(&actions);
        let target = g.row_order()[pick.index(g.len())];
        let next = g.set_cell(target, field, value.clone());

        prop_assert_eq!(next.len(), g.len());
        prop_assert_eq!(next.row(target).unwrap().get(field), value.as_str());
        for (old, new) in g.rows().zip(next.rows()) {
            if old.id != target {
                prop_assert!(std::ptr::eq(old, new));
            }
        }
    }

    #[test]
    fn add_then_delete_restores_rows(actions in proptest::collection::vec(arb_action(), 0..10)) {
        let g = run(&actions);
        let grown = g.add_row();
        prop_assert_eq!(grown.len(), g.len() + 1);
        let new_id = *grown.row_order().last().unwrap();
        prop_assert!(g.row(new_id).is_none());
        prop_assert_eq!(grown.delete_row(new_id), g);
    }

    #[test]
    fn paste_grows_to_fit_and_sanitizes(
        actions in proptest::collection::vec(arb_input_action(), 0..10),
        field in arb_field(),
        text in arb_clipboard(),
        pick in any::<prop::sample::Index>(),
    ) {
        let policies = FieldPolicies::default();
        let g = run(&actions);
        let anchor_pos = pick.index(g.len());
        let anchor = g.row_order()[anchor_pos];
        let before = g.clone();

        let next = paste(&g, anchor, field, &text, &policies);

        // Receiver untouched.
        prop_assert_eq!(&g, &before);

        let lines = non_blank_lines(&text);
        prop_assert_eq!(next.len(), g.len().max(anchor_pos + lines));

        // Existing rows keep their order; new rows come after.
        prop_assert_eq!(&next.row_order()[..g.len()], &g.row_order()[..]);

        for row in next.rows() {
            for f in [Field::BookId, Field::Isbn, Field::Price] {
                prop_assert!(row.get(f).chars().all(|c| c.is_ascii_digit()));
            }
        }

        // Rows above the anchor are the same allocations.
        for pos in 0..anchor_pos {
            prop_assert!(std::ptr::eq(g.row_at(pos).unwrap(), next.row_at(pos).unwrap()));
        }
    }

    #[test]
    fn paste_fields_before_anchor_untouched(
        field in arb_field(),
        text in arb_clipboard(),
    ) {
        let g = Grid::seeded(3);
        let seeded = Field::ALL.iter().fold(g, |g, f| g.set_cell(0, *f, "1"));
        let next = paste(&seeded, 0, field, &text, &FieldPolicies::default());
        for f in &Field::ALL[..field.index()] {
            prop_assert_eq!(next.row(0).unwrap().get(*f), "1");
        }
    }
}
