//! Book registration core.
//!
//! Everything the entry form does to its rows lives here, with no terminal,
//! network or file access:
//!
//! - [`field`]: the nine data fields, their canonical order and per-field policies
//! - [`record`]: `BookRecord`, `Row`, and the remote `Submission` mapping
//! - [`grid`]: the grid state store (replace-on-write snapshots)
//! - [`paste`]: spreadsheet-style paste fanout from an anchor cell
//! - [`format`]: presentation transforms (thousands grouping, date mask)
//! - [`action`]: reducer over grid snapshots
//! - [`form`]: seed/delete/submit workflow around a grid
//! - [`stamp`]: submission timestamps

pub mod action;
pub mod field;
pub mod form;
pub mod format;
pub mod grid;
pub mod paste;
pub mod record;
pub mod stamp;

pub use action::{reduce, Action};
pub use field::{Field, FieldPolicies, Presenter, Sanitizer, FIELD_COUNT};
pub use form::{AppendRows, DeletePolicy, Form, FormSettings, SubmitError};
pub use grid::Grid;
pub use record::{BookRecord, Row, RowId, Submission};

/// Number of empty rows a fresh form starts with.
pub const DEFAULT_SEED_ROWS: usize = 10;
