use std::path::Path;

use crate::question::Question;
use crate::spec::{LoadError, QuestionSpec, load_question_table, parse_question_table};

/// Ordered, non-empty collection of questions built from a question table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    pub fn from_specs(specs: Vec<QuestionSpec>) -> Result<Self, LoadError> {
        if specs.is_empty() {
            return Err(LoadError::Empty);
        }
        let questions = specs
            .into_iter()
            .enumerate()
            .map(|(idx, spec)| {
                let kind = spec.kind;
                Question::from_spec(idx + 1, spec).map_err(|err| LoadError::Payload {
                    row: idx + 1,
                    kind,
                    reason: err.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { questions })
    }

    pub fn from_table(text: &str) -> Result<Self, LoadError> {
        Self::from_specs(parse_question_table(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        Self::from_specs(load_question_table(path)?)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Zero-based access.
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Question> {
        self.questions.get_mut(index)
    }

    /// Lookup by 1-based question number.
    pub fn by_number(&self, number: usize) -> Option<&Question> {
        number.checked_sub(1).and_then(|index| self.get(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Question> {
        self.questions.iter_mut()
    }

    pub fn unanswered(&self) -> Vec<usize> {
        self.questions
            .iter()
            .filter(|question| question.is_unanswered())
            .map(Question::number)
            .collect()
    }
}

impl<'a> IntoIterator for &'a QuestionSet {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
