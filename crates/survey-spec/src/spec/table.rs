//! Question table reader: `text, type, images, choices`, header row discarded.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::literal::{Literal, LiteralError, parse_list};
use crate::spec::question::{ChoicePayload, QuestionSpec, QuestionType};

/// Column of the question table holding a list literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Images,
    Choices,
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Column::Images => f.write_str("images"),
            Column::Choices => f.write_str("choices"),
        }
    }
}

/// Failure to load a question table. Rows are 1-based data rows (header excluded).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read question file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed question table: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: expected 4 fields, found {found}")]
    FieldCount { row: usize, found: usize },
    #[error("row {row}: unsupported question type '{tag}'")]
    UnknownType { row: usize, tag: String },
    #[error("row {row}: invalid {column} literal: {source}")]
    Literal {
        row: usize,
        column: Column,
        #[source]
        source: LiteralError,
    },
    #[error("row {row}: invalid choices for {kind}: {reason}")]
    Payload {
        row: usize,
        kind: QuestionType,
        reason: String,
    },
    #[error("question table contains no questions")]
    Empty,
}

/// Read and parse a question table from disk.
pub fn load_question_table(path: &Path) -> Result<Vec<QuestionSpec>, LoadError> {
    info!("loading questions from {}", path.display());
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_question_table(&text)
}

/// Parse question table text. All-or-nothing: any bad row fails the load.
pub fn parse_question_table(text: &str) -> Result<Vec<QuestionSpec>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut specs = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let row = idx + 1;
        let fields: Vec<&str> = record.iter().collect();
        specs.push(parse_row(row, &fields)?);
    }

    if specs.is_empty() {
        return Err(LoadError::Empty);
    }
    debug!(count = specs.len(), "parsed question table");
    Ok(specs)
}

fn parse_row(row: usize, fields: &[&str]) -> Result<QuestionSpec, LoadError> {
    let [text, tag, images, choices] = fields else {
        return Err(LoadError::FieldCount {
            row,
            found: fields.len(),
        });
    };

    let kind: QuestionType = tag.parse().map_err(|_| LoadError::UnknownType {
        row,
        tag: tag.trim().to_string(),
    })?;

    let images = parse_list(images)
        .map_err(|source| LoadError::Literal {
            row,
            column: Column::Images,
            source,
        })?
        .into_iter()
        .map(Literal::into_label)
        .collect();

    let items = parse_list(choices).map_err(|source| LoadError::Literal {
        row,
        column: Column::Choices,
        source,
    })?;
    let choices = build_payload(kind, items).map_err(|reason| LoadError::Payload {
        row,
        kind,
        reason,
    })?;

    Ok(QuestionSpec {
        text: text.to_string(),
        kind,
        images,
        choices,
    })
}

fn build_payload(kind: QuestionType, items: Vec<Literal>) -> Result<ChoicePayload, String> {
    match kind {
        QuestionType::SingleChoice | QuestionType::MultiChoice | QuestionType::Dropdown => {
            if items.is_empty() {
                return Err("at least one choice is required".into());
            }
            let labels: Vec<String> = items.into_iter().map(Literal::into_label).collect();
            if let Some(index) = labels.iter().position(|label| label.trim().is_empty()) {
                return Err(format!("choice {} has a blank label", index + 1));
            }
            Ok(ChoicePayload::Labels(labels))
        }
        // Open questions carry no choices; whatever the column holds is ignored.
        QuestionType::OpenText => Ok(ChoicePayload::Labels(Vec::new())),
        QuestionType::Slider => match integers(&items)?.as_slice() {
            &[low, high] => {
                check_range(low, high)?;
                Ok(ChoicePayload::Bounds { low, high })
            }
            other => Err(format!("expected [low, high], found {} items", other.len())),
        },
        QuestionType::Rating => match integers(&items)?.as_slice() {
            &[low, high, step] => {
                check_range(low, high)?;
                if step < 1 {
                    return Err(format!("step must be at least 1, found {}", step));
                }
                Ok(ChoicePayload::Stepped { low, high, step })
            }
            other => Err(format!(
                "expected [low, high, step], found {} items",
                other.len()
            )),
        },
    }
}

fn integers(items: &[Literal]) -> Result<Vec<i64>, String> {
    items
        .iter()
        .map(|item| {
            item.as_int()
                .ok_or_else(|| format!("expected an integer, found {}", item))
        })
        .collect()
}

fn check_range(low: i64, high: i64) -> Result<(), String> {
    if low > high {
        return Err(format!("low bound {} exceeds high bound {}", low, high));
    }
    Ok(())
}
