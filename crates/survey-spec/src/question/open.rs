use crate::question::Answers;
use crate::question::row::AnswerField;

/// Free-form text; the empty string means unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenText {
    text: String,
}

impl OpenText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Never the absent-marker, even when blank.
    pub fn answers(&self) -> Answers {
        vec![Some(self.text.clone())]
    }

    pub fn set_answer(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub(crate) fn apply_answer(&mut self, field: AnswerField<'_>) {
        match field {
            AnswerField::Unanswered => self.text.clear(),
            AnswerField::Marked(text) => self.text = text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_still_reported() {
        let mut question = OpenText::new();
        assert_eq!(question.answers(), vec![Some(String::new())]);
        assert!(question.is_blank());
        question.set_answer("looks fine");
        assert_eq!(question.answers(), vec![Some("looks fine".to_string())]);
        question.apply_answer(AnswerField::Unanswered);
        assert_eq!(question.text(), "");
    }
}
