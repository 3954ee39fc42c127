use serde_json::{Map, Value, json};

use crate::navigation::Toolbar;
use crate::question::{Answers, Question, QuestionKind};
use crate::set::QuestionSet;
use crate::spec::{ChoicePayload, QuestionType};

/// Numeric range offered by sliders and ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderScale {
    pub low: i64,
    pub high: i64,
    pub step: i64,
}

/// Describes a single question for render outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderQuestion {
    pub number: usize,
    pub text: String,
    pub kind: QuestionType,
    pub images: Vec<String>,
    /// Selectable labels; empty for open text and numeric questions.
    pub options: Vec<String>,
    pub scale: Option<RenderScale>,
    /// Choice configuration in the shape `Question::set_choices` accepts.
    pub choices: ChoicePayload,
    pub answers: Answers,
    pub answered: bool,
}

impl RenderQuestion {
    pub fn from_question(question: &Question) -> Self {
        let (options, scale) = match question.kind() {
            QuestionKind::SingleChoice(q) => (q.choices().to_vec(), None),
            QuestionKind::MultiChoice(q) => (q.choices().to_vec(), None),
            QuestionKind::Dropdown(q) => (q.options().to_vec(), None),
            QuestionKind::OpenText(_) => (Vec::new(), None),
            QuestionKind::Slider(q) => {
                let (low, high) = q.bounds();
                (Vec::new(), Some(RenderScale { low, high, step: 1 }))
            }
            QuestionKind::Rating(q) => {
                let (low, high) = q.range();
                let step = q.step();
                (Vec::new(), Some(RenderScale { low, high, step }))
            }
        };
        Self {
            number: question.number(),
            text: question.text().to_string(),
            kind: question.question_type(),
            images: question.images().to_vec(),
            options,
            scale,
            choices: question.choices(),
            answers: question.answers(),
            answered: !question.is_unanswered(),
        }
    }

    fn answer_summary(&self) -> String {
        let given: Vec<&str> = self
            .answers
            .iter()
            .filter_map(|answer| answer.as_deref())
            .filter(|answer| !answer.trim().is_empty())
            .collect();
        if !self.answered || given.is_empty() {
            "(unanswered)".to_string()
        } else {
            given.join(", ")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderProgress {
    pub answered: usize,
    pub total: usize,
}

/// Collected payload used by both text and JSON renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPayload {
    /// Zero-based index of the displayed question.
    pub current: usize,
    pub progress: RenderProgress,
    pub questions: Vec<RenderQuestion>,
}

impl RenderPayload {
    pub fn current_question(&self) -> Option<&RenderQuestion> {
        self.questions.get(self.current)
    }
}

pub fn build_render_payload(set: &QuestionSet, current: usize) -> RenderPayload {
    let questions: Vec<RenderQuestion> = set.iter().map(RenderQuestion::from_question).collect();
    let answered = questions.iter().filter(|question| question.answered).count();
    RenderPayload {
        current,
        progress: RenderProgress {
            answered,
            total: questions.len(),
        },
        questions,
    }
}

/// Text block for one question, as shown by terminal hosts.
pub fn render_question_text(question: &RenderQuestion, toolbar: Option<Toolbar>) -> String {
    let mut lines = Vec::new();
    match toolbar {
        Some(toolbar) => lines.push(format!(
            "Question {} of {} [{}]",
            question.number, toolbar.total, question.kind
        )),
        None => lines.push(format!("Question {} [{}]", question.number, question.kind)),
    }
    lines.push(format!("  {}", question.text));
    if !question.images.is_empty() {
        lines.push(format!("  Images: {}", question.images.join(", ")));
    }
    for (idx, option) in question.options.iter().enumerate() {
        let marker = if question.answers.iter().flatten().any(|answer| answer == option) {
            "x"
        } else {
            " "
        };
        lines.push(format!("  [{}] {}. {}", marker, idx + 1, option));
    }
    if let Some(scale) = question.scale {
        if scale.step == 1 {
            lines.push(format!("  Range: {}..{}", scale.low, scale.high));
        } else {
            lines.push(format!(
                "  Range: {}..{} step {}",
                scale.low, scale.high, scale.step
            ));
        }
    }
    lines.push(format!("  Answer: {}", question.answer_summary()));
    if let Some(toolbar) = toolbar {
        let controls = [
            ("first", toolbar.first),
            ("prev", toolbar.prev),
            ("next", toolbar.next),
            ("last", toolbar.last),
        ]
        .iter()
        .filter(|(_, enabled)| *enabled)
        .map(|(name, _)| *name)
        .collect::<Vec<_>>();
        if !controls.is_empty() {
            lines.push(format!("  Navigate: {}", controls.join(" | ")));
        }
    }
    lines.join("\n")
}

pub fn render_text(payload: &RenderPayload) -> String {
    let mut blocks = vec![format!(
        "Survey: {}/{} answered",
        payload.progress.answered, payload.progress.total
    )];
    blocks.extend(
        payload
            .questions
            .iter()
            .map(|question| render_question_text(question, None)),
    );
    blocks.join("\n")
}

pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let questions = payload
        .questions
        .iter()
        .map(|question| {
            let mut map = Map::new();
            map.insert("number".into(), json!(question.number));
            map.insert("text".into(), Value::String(question.text.clone()));
            map.insert("type".into(), json!(question.kind));
            map.insert("images".into(), json!(question.images));
            if !question.options.is_empty() {
                map.insert("options".into(), json!(question.options));
            }
            if let Some(scale) = question.scale {
                map.insert(
                    "scale".into(),
                    json!({ "low": scale.low, "high": scale.high, "step": scale.step }),
                );
            }
            map.insert("choices".into(), json!(question.choices));
            map.insert("answers".into(), json!(question.answers));
            map.insert("answered".into(), Value::Bool(question.answered));
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    json!({
        "current": payload.current,
        "progress": {
            "answered": payload.progress.answered,
            "total": payload.progress.total,
        },
        "questions": questions,
    })
}
