use std::collections::BTreeSet;

use crate::question::row::{AnswerField, RowError, UNANSWERED};
use crate::question::{Answers, DomainError};

/// One answer out of a fixed list of labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleChoice {
    choices: Vec<String>,
    selected: Option<usize>,
}

impl SingleChoice {
    pub fn new(choices: Vec<String>) -> Self {
        Self {
            choices,
            selected: None,
        }
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.map(|idx| self.choices[idx].as_str())
    }

    pub fn answers(&self) -> Answers {
        vec![self.selected().map(str::to_string)]
    }

    pub fn set_answer(&mut self, label: &str) -> Result<(), DomainError> {
        self.selected = Some(position(&self.choices, label)?);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Relabel in place; the selected index keeps its position.
    pub fn set_choices(&mut self, choices: Vec<String>) -> Result<(), DomainError> {
        check_count(self.choices.len(), choices.len())?;
        check_labels(&choices)?;
        self.choices = choices;
        Ok(())
    }

    pub(crate) fn apply_answer(&mut self, field: AnswerField<'_>) -> Result<(), RowError> {
        match field {
            AnswerField::Unanswered => Ok(()),
            AnswerField::Marked(label) => self
                .set_answer(label)
                .map_err(|reason| unmatched(label, reason)),
        }
    }
}

/// Any number of independently toggled labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiChoice {
    choices: Vec<String>,
    selected: BTreeSet<usize>,
}

impl MultiChoice {
    pub fn new(choices: Vec<String>) -> Self {
        Self {
            choices,
            selected: BTreeSet::new(),
        }
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// Selected labels in choice order.
    pub fn selected(&self) -> Vec<&str> {
        self.selected
            .iter()
            .map(|idx| self.choices[*idx].as_str())
            .collect()
    }

    pub fn answers(&self) -> Answers {
        if self.selected.is_empty() {
            return vec![None];
        }
        self.selected()
            .into_iter()
            .map(|label| Some(label.to_string()))
            .collect()
    }

    /// Replace the whole selection.
    pub fn set_answer<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<(), DomainError> {
        if labels.len() > self.choices.len() {
            return Err(DomainError::TooManyChoices {
                given: labels.len(),
                available: self.choices.len(),
            });
        }
        let selected = labels
            .iter()
            .map(|label| position(&self.choices, label.as_ref()))
            .collect::<Result<BTreeSet<_>, _>>()?;
        self.selected = selected;
        Ok(())
    }

    /// Flip one label; returns whether it is now selected.
    pub fn toggle(&mut self, label: &str) -> Result<bool, DomainError> {
        let idx = position(&self.choices, label)?;
        if self.selected.remove(&idx) {
            Ok(false)
        } else {
            self.selected.insert(idx);
            Ok(true)
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn set_choices(&mut self, choices: Vec<String>) -> Result<(), DomainError> {
        check_count(self.choices.len(), choices.len())?;
        check_labels(&choices)?;
        self.choices = choices;
        Ok(())
    }

    /// A row holding the unanswered literal anywhere leaves the selection as it is.
    pub(crate) fn apply_answers(&mut self, fields: &[AnswerField<'_>]) -> Result<(), RowError> {
        let mut labels = Vec::with_capacity(fields.len());
        for field in fields {
            match field {
                AnswerField::Marked(label) => labels.push(*label),
                AnswerField::Unanswered => return Ok(()),
            }
        }
        self.set_answer(&labels)
            .map_err(|reason| unmatched(&labels.join(", "), reason))
    }
}

/// Single selection from a list that starts with the unanswered sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dropdown {
    choices: Vec<String>,
    selected: usize,
}

impl Dropdown {
    /// Prepends the sentinel; source labels equal to it are dropped.
    pub fn new(labels: Vec<String>) -> Self {
        let mut choices = Vec::with_capacity(labels.len() + 1);
        choices.push(UNANSWERED.to_string());
        choices.extend(labels.into_iter().filter(|label| label != UNANSWERED));
        Self {
            choices,
            selected: 0,
        }
    }

    /// Full choice list, sentinel first.
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// Selectable labels without the sentinel.
    pub fn options(&self) -> &[String] {
        &self.choices[1..]
    }

    pub fn current(&self) -> &str {
        &self.choices[self.selected]
    }

    pub fn is_unanswered(&self) -> bool {
        self.selected == 0
    }

    pub fn answers(&self) -> Answers {
        if self.is_unanswered() {
            vec![None]
        } else {
            vec![Some(self.current().to_string())]
        }
    }

    /// Selecting the sentinel resets the question to unanswered.
    pub fn set_answer(&mut self, label: &str) -> Result<(), DomainError> {
        self.selected = position(&self.choices, label)?;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.selected = 0;
    }

    /// Takes the full list; the sentinel must stay first and appear only there.
    pub fn set_choices(&mut self, choices: Vec<String>) -> Result<(), DomainError> {
        check_count(self.choices.len(), choices.len())?;
        if choices.first().map(String::as_str) != Some(UNANSWERED) {
            return Err(DomainError::SentinelMissing);
        }
        if let Some(label) = choices[1..].iter().find(|label| *label == UNANSWERED) {
            return Err(DomainError::ReservedLabel(label.clone()));
        }
        check_labels(&choices[1..])?;
        self.choices = choices;
        Ok(())
    }

    pub(crate) fn apply_answer(&mut self, field: AnswerField<'_>) -> Result<(), RowError> {
        match field {
            AnswerField::Unanswered => {
                self.clear();
                Ok(())
            }
            AnswerField::Marked(label) => self
                .set_answer(label)
                .map_err(|reason| unmatched(label, reason)),
        }
    }
}

fn position(choices: &[String], label: &str) -> Result<usize, DomainError> {
    choices
        .iter()
        .position(|choice| choice == label)
        .ok_or_else(|| DomainError::UnknownChoice(label.to_string()))
}

fn check_count(expected: usize, found: usize) -> Result<(), DomainError> {
    if expected != found {
        return Err(DomainError::ChoiceCount { expected, found });
    }
    Ok(())
}

/// Labels are written to answer files trimmed, so a blank one could never be read back.
pub(crate) fn check_labels(labels: &[String]) -> Result<(), DomainError> {
    match labels.iter().position(|label| label.trim().is_empty()) {
        Some(index) => Err(DomainError::BlankLabel { index }),
        None => Ok(()),
    }
}

pub(crate) fn unmatched(answer: &str, reason: DomainError) -> RowError {
    RowError::AnswerUnmatched {
        answer: answer.to_string(),
        reason,
    }
}
