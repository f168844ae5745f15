// Data fields of a book row and the per-field input/display policies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::format;

/// Number of data fields in a row (the row identifier is not a field).
pub const FIELD_COUNT: usize = 9;

/// One data column of the registration grid.
///
/// Declaration order is the canonical field order: it drives paste fanout
/// column offsets, the appended column order, and export column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    BookId,
    BookName,
    Author,
    Publisher,
    Isbn,
    Price,
    PaperDate,
    EbookDate,
    RequestDate,
}

impl Field {
    /// All fields in canonical order.
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::BookId,
        Field::BookName,
        Field::Author,
        Field::Publisher,
        Field::Isbn,
        Field::Price,
        Field::PaperDate,
        Field::EbookDate,
        Field::RequestDate,
    ];

    /// Position in the canonical order (0-based).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Field at canonical position `i`, or `None` past the last field.
    pub fn at(i: usize) -> Option<Field> {
        Self::ALL.get(i).copied()
    }

    /// Wire key used in config tables and JSON output.
    pub fn key(self) -> &'static str {
        match self {
            Field::BookId => "bookId",
            Field::BookName => "bookName",
            Field::Author => "author",
            Field::Publisher => "publisher",
            Field::Isbn => "isbn",
            Field::Price => "price",
            Field::PaperDate => "paperDate",
            Field::EbookDate => "ebookDate",
            Field::RequestDate => "requestDate",
        }
    }

    /// Column header shown to people (grid header, exported sheet).
    pub fn label(self) -> &'static str {
        match self {
            Field::BookId => "도서 ID",
            Field::BookName => "도서명",
            Field::Author => "저자명",
            Field::Publisher => "출판사명",
            Field::Isbn => "ISBN",
            Field::Price => "정가",
            Field::PaperDate => "종이책 출간일",
            Field::EbookDate => "전자책 출간일",
            Field::RequestDate => "요청일자",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error for an unrecognised field key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field '{0}' (expected one of: bookId, bookName, author, publisher, isbn, price, paperDate, ebookDate, requestDate)")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    /// Accepts the camelCase wire key, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Input filter applied when a value is typed or pasted into a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sanitizer {
    /// Keep the value as entered.
    #[default]
    None,
    /// Strip every character that is not an ASCII decimal digit.
    #[serde(alias = "digits")]
    DigitsOnly,
}

impl Sanitizer {
    pub fn apply(self, raw: &str) -> String {
        match self {
            Sanitizer::None => raw.to_string(),
            Sanitizer::DigitsOnly => format::digits_only(raw),
        }
    }
}

/// Display transform for a stored value. Never changes what is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Presenter {
    #[default]
    Plain,
    /// `1234567` shown as `1,234,567`.
    Thousands,
    /// Free-typed digits shaped into `YYYY-MM-DD` while typing.
    DateMask,
}

impl Presenter {
    pub fn display(self, stored: &str) -> String {
        match self {
            Presenter::Plain | Presenter::DateMask => stored.to_string(),
            Presenter::Thousands => format::format_thousands(stored),
        }
    }
}

/// Per-field sanitizer and presenter tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPolicies {
    sanitizers: [Sanitizer; FIELD_COUNT],
    presenters: [Presenter; FIELD_COUNT],
}

impl Default for FieldPolicies {
    /// The registration form's policy: ids, ISBN and price are digits-only,
    /// price is shown grouped, the three dates take the typing mask.
    fn default() -> Self {
        let mut policies = Self::plain();
        for field in [Field::BookId, Field::Isbn, Field::Price] {
            policies.set_sanitizer(field, Sanitizer::DigitsOnly);
        }
        policies.set_presenter(Field::Price, Presenter::Thousands);
        for field in [Field::PaperDate, Field::EbookDate, Field::RequestDate] {
            policies.set_presenter(field, Presenter::DateMask);
        }
        policies
    }
}

impl FieldPolicies {
    /// No filtering and no display transforms on any field.
    pub fn plain() -> Self {
        Self {
            sanitizers: [Sanitizer::None; FIELD_COUNT],
            presenters: [Presenter::Plain; FIELD_COUNT],
        }
    }

    pub fn sanitizer(&self, field: Field) -> Sanitizer {
        self.sanitizers[field.index()]
    }

    pub fn presenter(&self, field: Field) -> Presenter {
        self.presenters[field.index()]
    }

    pub fn set_sanitizer(&mut self, field: Field, sanitizer: Sanitizer) {
        self.sanitizers[field.index()] = sanitizer;
    }

    pub fn set_presenter(&mut self, field: Field, presenter: Presenter) {
        self.presenters[field.index()] = presenter;
    }

    /// Apply the field's sanitizer to a raw value.
    pub fn normalize_numeric_field(&self, field: Field, raw: &str) -> String {
        self.sanitizer(field).apply(raw)
    }

    /// Value as shown in the grid for a stored value.
    pub fn display(&self, field: Field, stored: &str) -> String {
        self.presenter(field).display(stored)
    }

    /// New buffer contents after a keystroke changed `previous` into `typed`.
    ///
    /// Sanitizes first, then applies the date mask on insertion only.
    pub fn on_input(&self, field: Field, previous: &str, typed: &str) -> String {
        let value = self.normalize_numeric_field(field, typed);
        match self.presenter(field) {
            Presenter::DateMask => format::apply_date_mask(previous, &value),
            _ => value,
        }
    }
}
