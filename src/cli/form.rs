//! Form state for the submission screen
//!
//! Pure state with no terminal calls; keystroke capture and rendering
//! live in the sibling modules, so every transition here is testable.

use crate::record::{CompanyRecord, STAGE_OPTIONS, YEAR_MAX, YEAR_MIN};

const INDUSTRY: usize = 0;
const COUNTRY: usize = 1;
const LOCATION: usize = 2;
const STAGE: usize = 3;
const SOURCE: usize = 4;
const FUNDS: usize = 5;
const YEAR: usize = 6;

/// Number of editable rows; the row after the last field is Predict.
pub const FIELD_COUNT: usize = 7;

/// How a row edits and commits.
#[derive(Debug, Clone, PartialEq)]
enum FieldKind {
    /// Free text.
    Text,
    /// Closed option set cycled with Left/Right.
    Select {
        options: &'static [&'static str],
        selected: usize,
    },
    /// Non-negative decimal, edited as digits plus one '.'.
    Decimal,
    /// Integer clamped into the supported year range on commit.
    Year,
}

/// One editable row of the form.
#[derive(Debug, Clone)]
pub struct Field {
    label: &'static str,
    buffer: String,
    committed: String,
    kind: FieldKind,
}

impl Field {
    fn text(label: &'static str, initial: String) -> Self {
        Self {
            label,
            buffer: initial.clone(),
            committed: initial,
            kind: FieldKind::Text,
        }
    }

    fn select(label: &'static str, options: &'static [&'static str], selected: usize) -> Self {
        Self {
            label,
            buffer: String::new(),
            committed: String::new(),
            kind: FieldKind::Select { options, selected },
        }
    }

    fn decimal(label: &'static str, initial: String) -> Self {
        Self {
            label,
            buffer: initial.clone(),
            committed: initial,
            kind: FieldKind::Decimal,
        }
    }

    fn year(label: &'static str, initial: String) -> Self {
        Self {
            label,
            buffer: initial.clone(),
            committed: initial,
            kind: FieldKind::Year,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// What the row currently shows.
    pub fn value(&self) -> &str {
        match &self.kind {
            FieldKind::Select { options, selected } => options[*selected],
            _ => &self.buffer,
        }
    }

    /// Whether the row cycles options instead of taking typed input.
    pub fn is_select(&self) -> bool {
        matches!(self.kind, FieldKind::Select { .. })
    }

    fn insert(&mut self, c: char) {
        match self.kind {
            FieldKind::Text => {
                if !c.is_control() {
                    self.buffer.push(c);
                }
            }
            FieldKind::Decimal => {
                if c.is_ascii_digit() || (c == '.' && !self.buffer.contains('.')) {
                    self.buffer.push(c);
                }
            }
            FieldKind::Year => {
                if c.is_ascii_digit() && self.buffer.chars().count() < 4 {
                    self.buffer.push(c);
                }
            }
            FieldKind::Select { .. } => {}
        }
    }

    fn backspace(&mut self) {
        if !self.is_select() {
            self.buffer.pop();
        }
    }

    fn cycle(&mut self, step: isize) {
        if let FieldKind::Select { options, selected } = &mut self.kind {
            let count = options.len() as isize;
            *selected = ((*selected as isize + step).rem_euclid(count)) as usize;
        }
    }

    /// Settles the buffer into a committed value, reverting edits that do
    /// not parse and clamping the year into its supported range.
    fn commit(&mut self) {
        match self.kind {
            FieldKind::Text => {
                self.committed = self.buffer.clone();
            }
            FieldKind::Select { .. } => {}
            FieldKind::Decimal => match self.buffer.trim().parse::<f64>() {
                Ok(value) if value.is_finite() && value >= 0.0 => {
                    self.committed = self.buffer.trim().to_string();
                }
                _ => self.buffer = self.committed.clone(),
            },
            FieldKind::Year => match self.buffer.trim().parse::<i32>() {
                Ok(year) => {
                    self.buffer = year.clamp(YEAR_MIN, YEAR_MAX).to_string();
                    self.committed = self.buffer.clone();
                }
                Err(_) => self.buffer = self.committed.clone(),
            },
        }
    }
}

/// The whole submission form: seven rows plus the Predict row.
///
/// Navigation wraps in both directions, so Down from Predict lands on
/// the first field and Up from the first field lands on Predict.
#[derive(Debug, Clone)]
pub struct FormState {
    fields: [Field; FIELD_COUNT],
    active: usize,
}

impl FormState {
    pub fn new() -> Self {
        let defaults = CompanyRecord::default();
        let stage = STAGE_OPTIONS
            .iter()
            .position(|option| *option == defaults.stage)
            .unwrap_or(0);
        Self {
            fields: [
                Field::text("Industry", defaults.industry),
                Field::text("Country", defaults.country),
                Field::text("Location", defaults.location),
                Field::select("Stage", &STAGE_OPTIONS, stage),
                Field::text("Source", defaults.source),
                Field::decimal("Funds Raised ($M)", format!("{:.1}", defaults.funds_raised)),
                Field::year("Year", defaults.year.to_string()),
            ],
            active: 0,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Index of the active row; [`FIELD_COUNT`] means the Predict row.
    pub fn active(&self) -> usize {
        self.active
    }

    pub fn is_on_submit(&self) -> bool {
        self.active == FIELD_COUNT
    }

    /// Moves to the next row, committing the one being left.
    pub fn next(&mut self) {
        self.commit_active();
        self.active = (self.active + 1) % (FIELD_COUNT + 1);
    }

    /// Moves to the previous row, committing the one being left.
    pub fn prev(&mut self) {
        self.commit_active();
        self.active = (self.active + FIELD_COUNT) % (FIELD_COUNT + 1);
    }

    pub fn insert_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.active) {
            field.insert(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.active) {
            field.backspace();
        }
    }

    pub fn cycle_left(&mut self) {
        if let Some(field) = self.fields.get_mut(self.active) {
            field.cycle(-1);
        }
    }

    pub fn cycle_right(&mut self) {
        if let Some(field) = self.fields.get_mut(self.active) {
            field.cycle(1);
        }
    }

    fn commit_active(&mut self) {
        if let Some(field) = self.fields.get_mut(self.active) {
            field.commit();
        }
    }

    /// Commits every row and assembles the record to score.
    ///
    /// Assembly itself never fails: a buffer that does not parse reverts
    /// to its last committed value, and the year is already clamped.
    pub fn assemble(&mut self) -> CompanyRecord {
        for field in self.fields.iter_mut() {
            field.commit();
        }
        CompanyRecord {
            industry: self.fields[INDUSTRY].value().to_string(),
            country: self.fields[COUNTRY].value().to_string(),
            stage: self.fields[STAGE].value().to_string(),
            location: self.fields[LOCATION].value().to_string(),
            source: self.fields[SOURCE].value().to_string(),
            funds_raised: self.fields[FUNDS].value().parse().unwrap_or(0.0),
            year: self.fields[YEAR].value().parse().unwrap_or(YEAR_MIN),
        }
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}
