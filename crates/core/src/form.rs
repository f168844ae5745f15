//! Entry form workflow around a [`Grid`].
//!
//! Owns the current snapshot, the delete gating policy and the busy flag
//! that keeps two submissions from overlapping. The remote side is reached
//! only through [`AppendRows`].

use serde::{Deserialize, Serialize};

use crate::action::{reduce, Action};
use crate::field::FieldPolicies;
use crate::grid::Grid;
use crate::record::{BookRecord, Row, RowId};
use crate::DEFAULT_SEED_ROWS;

/// Receiver of submitted rows (the sheet append endpoint in production).
pub trait AppendRows {
    type Error: std::error::Error;

    /// Append all rows in one call. Either every row is stored or none is.
    fn append_rows(&self, rows: &[BookRecord], submitted_at: &str) -> Result<(), Self::Error>;
}

/// Which rows the UI offers to delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeletePolicy {
    /// Any row.
    Any,
    /// Only rows with some content.
    #[default]
    ContentBearing,
    /// Only rows added after the seed rows.
    BeyondSeed,
}

impl DeletePolicy {
    pub fn permits(self, row: &Row, seed_rows: usize) -> bool {
        match self {
            DeletePolicy::Any => true,
            DeletePolicy::ContentBearing => row.is_content_bearing(),
            DeletePolicy::BeyondSeed => row.id >= seed_rows as RowId,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormSettings {
    pub seed_rows: usize,
    pub min_rows: usize,
    pub delete_policy: DeletePolicy,
    pub policies: FieldPolicies,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            seed_rows: DEFAULT_SEED_ROWS,
            min_rows: 1,
            delete_policy: DeletePolicy::default(),
            policies: FieldPolicies::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError<E> {
    #[error("nothing to submit: every row is empty")]
    NothingToSubmit,
    #[error("a submission is already in progress")]
    Busy,
    #[error(transparent)]
    Remote(E),
}

#[derive(Debug, Clone)]
pub struct Form {
    grid: Grid,
    settings: FormSettings,
    busy: bool,
}

impl Form {
    pub fn new(settings: FormSettings) -> Self {
        Self {
            grid: Grid::seeded_with_min(settings.seed_rows, settings.min_rows),
            settings,
            busy: false,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Apply one action to the current snapshot.
    pub fn dispatch(&mut self, action: Action) {
        self.grid = reduce(&self.grid, &action, &self.settings.policies);
    }

    /// Whether the delete control should be offered for `row`.
    pub fn can_delete(&self, row: RowId) -> bool {
        if self.busy || self.grid.len() <= self.grid.min_rows() {
            return false;
        }
        self.grid
            .row(row)
            .map(|r| self.settings.delete_policy.permits(r, self.settings.seed_rows))
            .unwrap_or(false)
    }

    /// Delete `row` if the policy allows it. Returns whether a row was removed.
    pub fn delete_row(&mut self, row: RowId) -> bool {
        if !self.can_delete(row) {
            return false;
        }
        self.dispatch(Action::DeleteRow { row });
        true
    }

    /// Rows that would be submitted right now.
    pub fn pending(&self) -> Vec<BookRecord> {
        self.grid
            .content_rows()
            .into_iter()
            .map(|r| r.record.clone())
            .collect()
    }

    /// First half of a submission: validate locally and raise the busy flag.
    ///
    /// Returns the content-bearing rows to send. Nothing is sent and the flag
    /// stays down when there is nothing to submit.
    pub fn begin_submit<E>(&mut self) -> Result<Vec<BookRecord>, SubmitError<E>> {
        if self.busy {
            return Err(SubmitError::Busy);
        }
        let rows = self.pending();
        if rows.is_empty() {
            return Err(SubmitError::NothingToSubmit);
        }
        self.busy = true;
        Ok(rows)
    }

    /// Second half: lower the busy flag and reset on success.
    ///
    /// On failure the grid keeps exactly what was entered.
    pub fn finish_submit<E>(&mut self, sent: usize, result: Result<(), E>) -> Result<usize, SubmitError<E>> {
        self.busy = false;
        match result {
            Ok(()) => {
                self.grid = self.grid.reset(self.settings.seed_rows);
                log::info!("submitted {} row(s), grid reset", sent);
                Ok(sent)
            }
            Err(e) => {
                log::warn!("submission of {} row(s) failed, grid kept", sent);
                Err(SubmitError::Remote(e))
            }
        }
    }

    /// Validate, send through `sink`, and reset on success.
    pub fn submit<S: AppendRows>(
        &mut self,
        sink: &S,
        submitted_at: &str,
    ) -> Result<usize, SubmitError<S::Error>> {
        let rows = self.begin_submit()?;
        let result = sink.append_rows(&rows, submitted_at);
        self.finish_submit(rows.len(), result)
    }
}

impl Default for Form {
    fn default() -> Self {
        Self::new(FormSettings::default())
    }
}
