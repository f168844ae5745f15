// Book records: the editable row, and the submitted row read back from the sheet.

use serde::{Deserialize, Serialize};

use crate::field::{Field, FIELD_COUNT};

/// Stable row identifier, unique within a grid and never reused in a session.
pub type RowId = u64;

/// The nine data fields of one book. Empty string means "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookRecord {
    pub book_id: String,
    pub book_name: String,
    pub author: String,
    pub publisher: String,
    pub isbn: String,
    pub price: String,
    pub paper_date: String,
    pub ebook_date: String,
    pub request_date: String,
}

impl BookRecord {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::BookId => &self.book_id,
            Field::BookName => &self.book_name,
            Field::Author => &self.author,
            Field::Publisher => &self.publisher,
            Field::Isbn => &self.isbn,
            Field::Price => &self.price,
            Field::PaperDate => &self.paper_date,
            Field::EbookDate => &self.ebook_date,
            Field::RequestDate => &self.request_date,
        }
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::BookId => &mut self.book_id,
            Field::BookName => &mut self.book_name,
            Field::Author => &mut self.author,
            Field::Publisher => &mut self.publisher,
            Field::Isbn => &mut self.isbn,
            Field::Price => &mut self.price,
            Field::PaperDate => &mut self.paper_date,
            Field::EbookDate => &mut self.ebook_date,
            Field::RequestDate => &mut self.request_date,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.slot(field) = value.into();
    }

    /// True iff at least one data field is non-empty.
    pub fn is_content_bearing(&self) -> bool {
        Field::ALL.iter().any(|f| !self.get(*f).is_empty())
    }

    /// Field values in canonical order.
    pub fn values(&self) -> [&str; FIELD_COUNT] {
        Field::ALL.map(|f| self.get(f))
    }

    /// The ten cells appended to the sheet: nine fields, then the timestamp.
    pub fn to_append_values(&self, submitted_at: &str) -> Vec<String> {
        let mut out: Vec<String> = self.values().iter().map(|v| v.to_string()).collect();
        out.push(submitted_at.to_string());
        out
    }

    /// Build a record from positional cells. Missing cells are empty; cells
    /// past the ninth are ignored.
    pub fn from_values<S: AsRef<str>>(cells: &[S]) -> Self {
        let mut record = Self::default();
        for (field, cell) in Field::ALL.iter().zip(cells) {
            record.set(*field, cell.as_ref());
        }
        record
    }
}

/// One editable grid row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: RowId,
    pub record: BookRecord,
}

impl Row {
    pub fn empty(id: RowId) -> Self {
        Self { id, record: BookRecord::default() }
    }

    pub fn get(&self, field: Field) -> &str {
        self.record.get(field)
    }

    pub fn is_content_bearing(&self) -> bool {
        self.record.is_content_bearing()
    }
}

/// A row read back from the sheet, with its server-side timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(flatten)]
    pub record: BookRecord,
    /// Display-only; never edited locally.
    #[serde(default)]
    pub submitted_at: String,
}

impl Submission {
    /// Positional mapping of one sheet row (up to ten cells).
    pub fn from_values<S: AsRef<str>>(cells: &[S]) -> Self {
        let submitted_at = cells
            .get(FIELD_COUNT)
            .map(|c| c.as_ref().to_string())
            .unwrap_or_default();
        Self {
            record: BookRecord::from_values(cells),
            submitted_at,
        }
    }
}
