use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Supported question types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultiChoice,
    OpenText,
    Dropdown,
    Slider,
    Rating,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "single_choice",
            QuestionType::MultiChoice => "multi_choice",
            QuestionType::OpenText => "open_text",
            QuestionType::Dropdown => "dropdown",
            QuestionType::Slider => "slider",
            QuestionType::Rating => "rating",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownType(pub String);

impl FromStr for QuestionType {
    type Err = UnknownType;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim() {
            "single_choice" | "multi_single" => Ok(QuestionType::SingleChoice),
            "multi_choice" | "multi_multi" => Ok(QuestionType::MultiChoice),
            "open_text" | "open" => Ok(QuestionType::OpenText),
            "dropdown" => Ok(QuestionType::Dropdown),
            "slider" => Ok(QuestionType::Slider),
            "rating" => Ok(QuestionType::Rating),
            other => Err(UnknownType(other.to_string())),
        }
    }
}

/// Type-dependent choice configuration. Serializes as a bare label list or a
/// `{low, high[, step]}` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChoicePayload {
    /// Labels for single, multi and dropdown questions.
    Labels(Vec<String>),
    /// Inclusive rating range walked in `step` increments.
    Stepped { low: i64, high: i64, step: i64 },
    /// Inclusive slider range.
    Bounds { low: i64, high: i64 },
}

impl ChoicePayload {
    pub fn labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ChoicePayload::Labels(labels.into_iter().map(Into::into).collect())
    }
}

/// One row of the question table, immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSpec {
    pub text: String,
    pub kind: QuestionType,
    pub images: Vec<String>,
    pub choices: ChoicePayload,
}

impl QuestionSpec {
    pub fn new(text: impl Into<String>, kind: QuestionType, choices: ChoicePayload) -> Self {
        Self {
            text: text.into(),
            kind,
            images: Vec::new(),
            choices,
        }
    }

    pub fn with_images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images = images.into_iter().map(Into::into).collect();
        self
    }
}
