//! Live questions: one per table row, each owning its answer state.

pub mod choice;
pub mod open;
pub mod row;
pub mod scale;

use thiserror::Error;
use tracing::warn;

pub use choice::{Dropdown, MultiChoice, SingleChoice};
pub use open::OpenText;
pub use row::{AnswerField, AnswerRow, MARKER, RowError, UNANSWERED};
pub use scale::{RatingScale, Slider};

use crate::spec::question::{ChoicePayload, QuestionSpec, QuestionType};

/// Answers as reported by a question; `[None]` is the absent-marker.
pub type Answers = Vec<Option<String>>;

/// Rejected answer or choice reconfiguration. Nothing is mutated when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("'{0}' is not one of the choices")]
    UnknownChoice(String),
    #[error("{given} selections exceed the {available} available choices")]
    TooManyChoices { given: usize, available: usize },
    #[error("{value} is outside [{low}, {high}]")]
    OutOfRange { value: i64, low: i64, high: i64 },
    #[error("{value} is not reachable from {low} in steps of {step}")]
    OffLattice { value: i64, low: i64, step: i64 },
    #[error("'{0}' is not a whole number")]
    NotANumber(String),
    #[error("expected {expected} choices, found {found}")]
    ChoiceCount { expected: usize, found: usize },
    #[error("invalid bounds: {0}")]
    Bounds(String),
    #[error("the first dropdown choice must be 'Question Unanswered'")]
    SentinelMissing,
    #[error("'{0}' is reserved for unanswered questions")]
    ReservedLabel(String),
    #[error("choice {index} has a blank label")]
    BlankLabel { index: usize },
    #[error("{kind} questions do not accept {given}")]
    KindMismatch { kind: QuestionType, given: &'static str },
}

/// A value offered to [`Question::set_answer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    /// One label (single choice, dropdown).
    Choice(String),
    /// A full selection (multi choice).
    Choices(Vec<String>),
    /// Free text (open text).
    Text(String),
    /// Slider position or rating.
    Number(i64),
}

impl AnswerValue {
    fn describe(&self) -> &'static str {
        match self {
            AnswerValue::Choice(_) => "a single choice",
            AnswerValue::Choices(_) => "a choice list",
            AnswerValue::Text(_) => "free text",
            AnswerValue::Number(_) => "a number",
        }
    }
}

/// Type-specific state of a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    SingleChoice(SingleChoice),
    MultiChoice(MultiChoice),
    OpenText(OpenText),
    Dropdown(Dropdown),
    Slider(Slider),
    Rating(RatingScale),
}

impl QuestionKind {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::SingleChoice(_) => QuestionType::SingleChoice,
            QuestionKind::MultiChoice(_) => QuestionType::MultiChoice,
            QuestionKind::OpenText(_) => QuestionType::OpenText,
            QuestionKind::Dropdown(_) => QuestionType::Dropdown,
            QuestionKind::Slider(_) => QuestionType::Slider,
            QuestionKind::Rating(_) => QuestionType::Rating,
        }
    }

    fn from_payload(kind: QuestionType, choices: ChoicePayload) -> Result<Self, DomainError> {
        let shape = match &choices {
            ChoicePayload::Labels(_) => "a label list",
            ChoicePayload::Bounds { .. } => "slider bounds",
            ChoicePayload::Stepped { .. } => "a stepped range",
        };
        if let ChoicePayload::Labels(labels) = &choices
            && kind != QuestionType::OpenText
        {
            choice::check_labels(labels)?;
        }
        match (kind, choices) {
            (QuestionType::SingleChoice, ChoicePayload::Labels(labels)) => {
                Ok(QuestionKind::SingleChoice(SingleChoice::new(labels)))
            }
            (QuestionType::MultiChoice, ChoicePayload::Labels(labels)) => {
                Ok(QuestionKind::MultiChoice(MultiChoice::new(labels)))
            }
            (QuestionType::Dropdown, ChoicePayload::Labels(labels)) => {
                Ok(QuestionKind::Dropdown(Dropdown::new(labels)))
            }
            (QuestionType::OpenText, _) => Ok(QuestionKind::OpenText(OpenText::new())),
            (QuestionType::Slider, ChoicePayload::Bounds { low, high }) => {
                Slider::new(low, high).map(QuestionKind::Slider)
            }
            (QuestionType::Rating, ChoicePayload::Stepped { low, high, step }) => {
                RatingScale::new(low, high, step).map(QuestionKind::Rating)
            }
            (kind, _) => Err(DomainError::KindMismatch { kind, given: shape }),
        }
    }
}

/// One question of a loaded set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    number: usize,
    text: String,
    images: Vec<String>,
    kind: QuestionKind,
}

impl Question {
    /// `number` is the 1-based position within the set.
    pub fn from_spec(number: usize, spec: QuestionSpec) -> Result<Self, DomainError> {
        let kind = QuestionKind::from_payload(spec.kind, spec.choices)?;
        Ok(Self {
            number,
            text: spec.text,
            images: spec.images,
            kind,
        })
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn set_images(&mut self, images: Vec<String>) {
        self.images = images;
    }

    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut QuestionKind {
        &mut self.kind
    }

    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    /// Current choice configuration (dropdown lists include the sentinel).
    pub fn choices(&self) -> ChoicePayload {
        match &self.kind {
            QuestionKind::SingleChoice(q) => ChoicePayload::Labels(q.choices().to_vec()),
            QuestionKind::MultiChoice(q) => ChoicePayload::Labels(q.choices().to_vec()),
            QuestionKind::Dropdown(q) => ChoicePayload::Labels(q.choices().to_vec()),
            QuestionKind::OpenText(_) => ChoicePayload::Labels(Vec::new()),
            QuestionKind::Slider(q) => {
                let (low, high) = q.bounds();
                ChoicePayload::Bounds { low, high }
            }
            QuestionKind::Rating(q) => {
                let (low, high) = q.range();
                ChoicePayload::Stepped {
                    low,
                    high,
                    step: q.step(),
                }
            }
        }
    }

    pub fn answers(&self) -> Answers {
        match &self.kind {
            QuestionKind::SingleChoice(q) => q.answers(),
            QuestionKind::MultiChoice(q) => q.answers(),
            QuestionKind::OpenText(q) => q.answers(),
            QuestionKind::Dropdown(q) => q.answers(),
            QuestionKind::Slider(q) => q.answers(),
            QuestionKind::Rating(q) => q.answers(),
        }
    }

    /// Nothing meaningful entered yet, judged per type.
    pub fn is_unanswered(&self) -> bool {
        match &self.kind {
            QuestionKind::OpenText(q) => q.is_blank(),
            QuestionKind::Dropdown(q) => q.is_unanswered(),
            _ => self.answers() == [None],
        }
    }

    pub fn set_answer(&mut self, value: AnswerValue) -> Result<(), DomainError> {
        let given = value.describe();
        match (&mut self.kind, value) {
            (QuestionKind::SingleChoice(q), AnswerValue::Choice(label)) => q.set_answer(&label),
            (QuestionKind::MultiChoice(q), AnswerValue::Choices(labels)) => q.set_answer(&labels),
            (QuestionKind::MultiChoice(q), AnswerValue::Choice(label)) => q.set_answer(&[label]),
            (QuestionKind::Dropdown(q), AnswerValue::Choice(label)) => q.set_answer(&label),
            (QuestionKind::OpenText(q), AnswerValue::Text(text)) => {
                q.set_answer(text);
                Ok(())
            }
            (QuestionKind::Slider(q), AnswerValue::Number(value)) => q.set_answer(value),
            (QuestionKind::Rating(q), AnswerValue::Number(value)) => q.set_answer(value),
            (kind, _) => Err(DomainError::KindMismatch {
                kind: kind.question_type(),
                given,
            }),
        }
    }

    /// Replace the choice configuration; the payload shape must match the type.
    pub fn set_choices(&mut self, choices: ChoicePayload) -> Result<(), DomainError> {
        let kind = self.kind.question_type();
        match (&mut self.kind, choices) {
            (QuestionKind::SingleChoice(q), ChoicePayload::Labels(labels)) => {
                q.set_choices(labels)
            }
            (QuestionKind::MultiChoice(q), ChoicePayload::Labels(labels)) => q.set_choices(labels),
            (QuestionKind::Dropdown(q), ChoicePayload::Labels(labels)) => q.set_choices(labels),
            (QuestionKind::Slider(q), ChoicePayload::Bounds { low, high }) => {
                q.set_bounds(low, high)
            }
            (QuestionKind::Rating(q), ChoicePayload::Stepped { low, high, step }) => {
                q.set_scale(low, high, step)
            }
            (_, _) => Err(DomainError::KindMismatch {
                kind,
                given: "this choice payload",
            }),
        }
    }

    pub fn answer_row(&self) -> AnswerRow {
        AnswerRow::new(self.text.clone(), self.answers())
    }

    /// One answer-file line, terminator included.
    pub fn to_csv_row(&self) -> csv::Result<String> {
        row::encode_row(&self.answer_row())
    }

    /// Validate a saved row against this question and apply its answers.
    pub fn apply_csv_row<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<(), RowError> {
        let fields: Vec<&str> = fields.iter().map(AsRef::as_ref).collect();
        let result = self.apply_fields(&fields);
        if let Err(err) = &result {
            warn!("question {} cannot be loaded: {}", self.number, err);
        }
        result
    }

    fn apply_fields(&mut self, fields: &[&str]) -> Result<(), RowError> {
        let count_ok = match self.kind {
            QuestionKind::MultiChoice(_) => fields.len() >= 2,
            _ => fields.len() == 2,
        };
        if !count_ok {
            return Err(RowError::FieldCount {
                found: fields.len(),
            });
        }

        row::check_question_field(fields[0], &self.text)?;
        let answers = fields[1..]
            .iter()
            .map(|field| row::answer_field(field))
            .collect::<Result<Vec<_>, _>>()?;

        match &mut self.kind {
            QuestionKind::MultiChoice(q) => q.apply_answers(&answers),
            QuestionKind::SingleChoice(q) => q.apply_answer(answers[0]),
            QuestionKind::Dropdown(q) => q.apply_answer(answers[0]),
            QuestionKind::OpenText(q) => {
                q.apply_answer(answers[0]);
                Ok(())
            }
            QuestionKind::Slider(q) => q.apply_answer(answers[0]),
            QuestionKind::Rating(q) => q.apply_answer(answers[0]),
        }
    }
}
