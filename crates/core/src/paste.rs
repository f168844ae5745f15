//! Spreadsheet-style paste fanout.
//!
//! Clipboard text pasted into an anchor cell is spread across the grid the
//! way a spreadsheet does it: lines go down, tab-separated cells go right.
//!
//! Rules:
//! - Text splits on `\n`. Lines that are blank after trimming are dropped,
//!   including blank lines in the middle of the paste; they do not produce
//!   empty rows.
//! - One remaining line with no tab is a plain single-cell paste: the trimmed
//!   text goes into the anchor cell only.
//! - Otherwise line `i`, cell `j` lands at row `anchor_pos + i`, field
//!   `anchor_field + j`. Missing rows are appended at the end; cells past the
//!   last field are discarded (no wrap to the next row).
//! - Every value is trimmed and passed through the target field's sanitizer.
//!
//! The result is a complete replacement grid. Nothing can fail part-way.

use crate::field::{Field, FieldPolicies};
use crate::grid::Grid;
use crate::record::RowId;

/// Paste `text` at (`anchor_row`, `anchor_field`).
///
/// Unknown anchor rows and empty text give back an equal grid.
pub fn paste(
    grid: &Grid,
    anchor_row: RowId,
    anchor_field: Field,
    text: &str,
    policies: &FieldPolicies,
) -> Grid {
    let lines: Vec<&str> = text.split('\n').filter(|l| !l.trim().is_empty()).collect();

    match lines.as_slice() {
        [] => grid.clone(),
        [single] if !single.contains('\t') => {
            let value = policies.normalize_numeric_field(anchor_field, single.trim());
            grid.set_cell(anchor_row, anchor_field, value)
        }
        _ => fan_out(grid, anchor_row, anchor_field, &lines, policies),
    }
}

/// Turn `\r\n` and lone `\r` line breaks into `\n`.
///
/// Terminals deliver bracketed pastes with `\r` between lines, and classic Mac
/// exports use it in files. [`paste`] only splits on `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn fan_out(
    grid: &Grid,
    anchor_row: RowId,
    anchor_field: Field,
    lines: &[&str],
    policies: &FieldPolicies,
) -> Grid {
    // Resolve the anchor once against the current row order.
    let order = grid.row_order();
    let Some(anchor_pos) = order.iter().position(|id| *id == anchor_row) else {
        log::debug!("paste anchored at unknown row {}, ignored", anchor_row);
        return grid.clone();
    };

    let mut next = grid.clone();
    let mut grown = 0usize;

    for (i, line) in lines.iter().enumerate() {
        let target = anchor_pos + i;
        while target >= next.len() {
            next.push_empty();
            grown += 1;
        }

        let Some(row) = next.row_mut_at(target) else {
            continue;
        };
        for (j, cell) in line.split('\t').enumerate() {
            let Some(field) = Field::at(anchor_field.index() + j) else {
                break;
            };
            row.record
                .set(field, policies.normalize_numeric_field(field, cell.trim()));
        }
    }

    log::debug!(
        "pasted {} line(s) at row {} / {}, grid grew by {}",
        lines.len(),
        anchor_row,
        anchor_field,
        grown
    );
    next
}
