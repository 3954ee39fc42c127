//! Answer-file row layout: `"'<question>","'<answer>",...` with the unprefixed
//! `Question Unanswered` literal standing in for a missing answer.

use std::io;

use thiserror::Error;

use crate::question::{Answers, DomainError};

/// Prefix carried by question and answer fields.
pub const MARKER: char = '\'';

/// Written in place of an answer when none was given. Also the dropdown sentinel choice.
pub const UNANSWERED: &str = "Question Unanswered";

/// Why a saved row could not be applied to its question.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("wrong field count ({found})")]
    FieldCount { found: usize },
    #[error("wrong question CSV format")]
    QuestionFormat,
    #[error("question unmatched (found '{found}')")]
    QuestionUnmatched { found: String },
    #[error("wrong answer CSV format ('{field}')")]
    AnswerFormat { field: String },
    #[error("answer unmatched ('{answer}'): {reason}")]
    AnswerUnmatched {
        answer: String,
        #[source]
        reason: DomainError,
    },
    #[error("unreadable row: {0}")]
    Malformed(String),
    #[error("no question for this row")]
    ExtraRow,
}

impl RowError {
    /// True when the row belongs to a different question (as opposed to a bad answer).
    pub fn is_question_mismatch(&self) -> bool {
        matches!(
            self,
            RowError::QuestionFormat | RowError::QuestionUnmatched { .. } | RowError::ExtraRow
        )
    }
}

/// Decoded answer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerField<'a> {
    Unanswered,
    Marked(&'a str),
}

/// One question's serialized form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRow {
    pub question: String,
    pub answers: Answers,
}

impl AnswerRow {
    pub fn new(question: impl Into<String>, answers: Answers) -> Self {
        Self {
            question: question.into(),
            answers,
        }
    }

    /// Fields as written to disk, markers applied.
    pub fn fields(&self) -> Vec<String> {
        let mut fields = Vec::with_capacity(self.answers.len() + 1);
        fields.push(format!("{MARKER}{}", self.question.trim()));
        for answer in &self.answers {
            match answer.as_deref().map(str::trim) {
                Some(text) if !text.is_empty() => fields.push(format!("{MARKER}{text}")),
                _ => fields.push(UNANSWERED.to_string()),
            }
        }
        fields
    }
}

/// Writer producing the answer-file layout (every field quoted, `\n` after each row).
pub fn row_writer<W: io::Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .flexible(true)
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer)
}

/// Reader accepting the answer-file layout.
pub fn row_reader<R: io::Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
}

/// Serialize a single row to a string.
pub fn encode_row(row: &AnswerRow) -> csv::Result<String> {
    let mut writer = row_writer(Vec::new());
    writer.write_record(row.fields())?;
    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|err| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, err)))
}

pub(crate) fn check_question_field(field: &str, text: &str) -> Result<(), RowError> {
    match field.strip_prefix(MARKER) {
        Some(rest) if !rest.is_empty() => {
            if rest == text.trim() {
                Ok(())
            } else {
                Err(RowError::QuestionUnmatched {
                    found: rest.to_string(),
                })
            }
        }
        _ => Err(RowError::QuestionFormat),
    }
}

pub(crate) fn answer_field(field: &str) -> Result<AnswerField<'_>, RowError> {
    if field == UNANSWERED {
        return Ok(AnswerField::Unanswered);
    }
    match field.strip_prefix(MARKER) {
        Some(rest) if !rest.is_empty() => Ok(AnswerField::Marked(rest)),
        _ => Err(RowError::AnswerFormat {
            field: field.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_marked_fields() {
        let row = AnswerRow::new("Pick one", vec![Some("A".into())]);
        assert_eq!(encode_row(&row).unwrap(), "\"'Pick one\",\"'A\"\n");
    }

    #[test]
    fn encodes_missing_and_blank_answers_as_unanswered() {
        let row = AnswerRow::new(" Notes ", vec![None, Some("  ".into())]);
        assert_eq!(
            encode_row(&row).unwrap(),
            "\"'Notes\",\"Question Unanswered\",\"Question Unanswered\"\n"
        );
    }

    #[test]
    fn escapes_embedded_quotes() {
        let row = AnswerRow::new("Say \"hi\"", vec![Some("ok".into())]);
        assert_eq!(
            encode_row(&row).unwrap(),
            "\"'Say \"\"hi\"\"\",\"'ok\"\n"
        );
    }

    #[test]
    fn classifies_question_fields() {
        assert_eq!(check_question_field("'Pick one", "Pick one"), Ok(()));
        assert_eq!(
            check_question_field("Pick one", "Pick one"),
            Err(RowError::QuestionFormat)
        );
        assert_eq!(check_question_field("'", "x"), Err(RowError::QuestionFormat));
        assert!(matches!(
            check_question_field("'Other", "Pick one"),
            Err(RowError::QuestionUnmatched { .. })
        ));
    }

    #[test]
    fn classifies_answer_fields() {
        assert_eq!(answer_field("'A"), Ok(AnswerField::Marked("A")));
        assert_eq!(answer_field(UNANSWERED), Ok(AnswerField::Unanswered));
        assert!(matches!(
            answer_field("A"),
            Err(RowError::AnswerFormat { .. })
        ));
        assert!(matches!(answer_field("'"), Err(RowError::AnswerFormat { .. })));
    }
}
