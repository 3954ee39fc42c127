//! Whole-set answer file: one row per question, in question order.

use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::question::{RowError, row};
use crate::set::QuestionSet;

/// Leave out an identifying question when the respondent opted into anonymity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymityPolicy {
    /// 1-based number of the question to omit.
    pub identity_question: usize,
    /// 1-based number of the opt-in question.
    pub opt_in_question: usize,
    /// First answer of the opt-in question that triggers the omission.
    pub opt_in_answer: String,
}

impl AnonymityPolicy {
    pub fn applies(&self, set: &QuestionSet) -> bool {
        set.by_number(self.opt_in_question)
            .and_then(|question| question.answers().into_iter().next().flatten())
            .is_some_and(|answer| answer.trim() == self.opt_in_answer)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodePolicy {
    pub anonymity: Option<AnonymityPolicy>,
}

impl EncodePolicy {
    /// Number of the question left out of the file, if any.
    pub fn omitted(&self, set: &QuestionSet) -> Option<usize> {
        self.anonymity
            .as_ref()
            .filter(|policy| policy.applies(set))
            .map(|policy| policy.identity_question)
    }
}

pub fn write_answers<W: Write>(
    set: &QuestionSet,
    policy: &EncodePolicy,
    writer: W,
) -> csv::Result<()> {
    let omitted = policy.omitted(set);
    let mut writer = row::row_writer(writer);
    let mut written = 0usize;
    for question in set {
        if omitted == Some(question.number()) {
            continue;
        }
        writer.write_record(question.answer_row().fields())?;
        written += 1;
    }
    writer.flush()?;
    info!(rows = written, ?omitted, "answers encoded");
    Ok(())
}

pub fn encode(set: &QuestionSet, policy: &EncodePolicy) -> csv::Result<String> {
    let mut buf = Vec::new();
    write_answers(set, policy, &mut buf)?;
    String::from_utf8(buf)
        .map_err(|err| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, err)))
}

/// A row that could not be applied. `number` is the 1-based row, matched to the
/// question at the same position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMismatch {
    pub number: usize,
    pub error: RowError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    pub applied: usize,
    pub mismatches: Vec<RowMismatch>,
}

impl DecodeReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn first_mismatch(&self) -> Option<usize> {
        self.mismatches.first().map(|mismatch| mismatch.number)
    }
}

/// Apply rows positionally. Failing rows leave their question untouched and
/// decoding carries on with the next row.
pub fn read_answers<R: Read>(reader: R, set: &mut QuestionSet) -> DecodeReport {
    let mut report = DecodeReport::default();
    for (idx, record) in row::row_reader(reader).records().enumerate() {
        let number = idx + 1;
        let result = match record {
            Err(err) => Err(RowError::Malformed(err.to_string())),
            Ok(record) => {
                let fields: Vec<&str> = record.iter().collect();
                match set.get_mut(idx) {
                    Some(question) => question.apply_csv_row(&fields),
                    None => {
                        warn!("answer row {} has no question", number);
                        Err(RowError::ExtraRow)
                    }
                }
            }
        };
        match result {
            Ok(()) => report.applied += 1,
            Err(error) => report.mismatches.push(RowMismatch { number, error }),
        }
    }
    info!(
        applied = report.applied,
        mismatched = report.mismatches.len(),
        "answers decoded"
    );
    report
}

pub fn decode(text: &str, set: &mut QuestionSet) -> DecodeReport {
    read_answers(text.as_bytes(), set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::AnswerValue;

    const TABLE: &str = "text,type,images,choices\n\
Name,open,[],[]\n\
Stay anonymous?,single_choice,[],\"['yes', 'no']\"\n\
Pain,slider,[],\"[0, 10]\"\n";

    fn answered() -> QuestionSet {
        let mut set = QuestionSet::from_table(TABLE).unwrap();
        set.get_mut(0)
            .unwrap()
            .set_answer(AnswerValue::Text("Ada".into()))
            .unwrap();
        set.get_mut(1)
            .unwrap()
            .set_answer(AnswerValue::Choice("no".into()))
            .unwrap();
        set
    }

    fn anonymity() -> EncodePolicy {
        EncodePolicy {
            anonymity: Some(AnonymityPolicy {
                identity_question: 1,
                opt_in_question: 2,
                opt_in_answer: "yes".into(),
            }),
        }
    }

    #[test]
    fn encodes_every_question_in_order() {
        let text = encode(&answered(), &EncodePolicy::default()).unwrap();
        assert_eq!(
            text,
            "\"'Name\",\"'Ada\"\n\"'Stay anonymous?\",\"'no\"\n\"'Pain\",\"Question Unanswered\"\n"
        );
    }

    #[test]
    fn anonymity_omits_identity_row_only_when_opted_in() {
        let mut set = answered();
        assert_eq!(anonymity().omitted(&set), None);
        assert_eq!(encode(&set, &anonymity()).unwrap().lines().count(), 3);

        set.get_mut(1)
            .unwrap()
            .set_answer(AnswerValue::Choice("yes".into()))
            .unwrap();
        let text = encode(&set, &anonymity()).unwrap();
        assert_eq!(anonymity().omitted(&set), Some(1));
        assert!(!text.contains("Ada"));
        assert!(text.starts_with("\"'Stay anonymous?\""));
    }

    #[test]
    fn decode_restores_saved_answers() {
        let text = encode(&answered(), &EncodePolicy::default()).unwrap();
        let mut fresh = QuestionSet::from_table(TABLE).unwrap();
        let report = decode(&text, &mut fresh);
        assert!(report.is_clean());
        assert_eq!(report.applied, 3);
        assert_eq!(fresh, answered());
    }

    #[test]
    fn decode_continues_past_mismatches() {
        let mut set = QuestionSet::from_table(TABLE).unwrap();
        let text = concat!(
            "\"'Surname\",\"'Lovelace\"\n",
            "\"'Stay anonymous?\",\"'maybe\"\n",
            "\"'Pain\",\"'4\"\n",
            "\"'Extra\",\"'x\"\n",
        );
        let report = decode(text, &mut set);

        assert_eq!(report.applied, 1);
        assert_eq!(report.first_mismatch(), Some(1));
        let numbers: Vec<usize> = report.mismatches.iter().map(|m| m.number).collect();
        assert_eq!(numbers, vec![1, 2, 4]);
        assert!(report.mismatches[0].error.is_question_mismatch());
        assert!(matches!(
            report.mismatches[1].error,
            RowError::AnswerUnmatched { .. }
        ));
        assert_eq!(report.mismatches[2].error, RowError::ExtraRow);
        assert_eq!(set.get(0).unwrap().answers(), vec![Some(String::new())]);
        assert_eq!(set.get(2).unwrap().answers(), vec![Some("4".to_string())]);
    }

    #[test]
    fn missing_rows_leave_questions_untouched() {
        let mut set = answered();
        let report = decode("\"'Name\",\"'Grace\"\n", &mut set);
        assert_eq!(report.applied, 1);
        assert!(report.is_clean());
        assert_eq!(
            set.get(1).unwrap().answers(),
            vec![Some("no".to_string())]
        );
    }
}
