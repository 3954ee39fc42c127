#![allow(missing_docs)]

pub mod answers;
pub mod config;
pub mod host;
pub mod literal;
pub mod navigation;
pub mod question;
pub mod render;
pub mod session;
pub mod set;
pub mod spec;

pub use answers::{
    AnonymityPolicy, DecodeReport, EncodePolicy, RowMismatch, decode, encode, read_answers,
    write_answers,
};
pub use config::{ConfigError, SurveyConfig};
pub use host::{FileMode, ImageResolutionError, Notice, Prompter, SurveyHost};
pub use literal::{Literal, LiteralError, parse_list};
pub use navigation::{GuardOutcome, NavAction, NavigationController, Toolbar, Transition};
pub use question::{
    AnswerRow, AnswerValue, Answers, DomainError, Question, QuestionKind, RowError, UNANSWERED,
};
pub use render::{
    RenderPayload, RenderProgress, RenderQuestion, RenderScale, build_render_payload,
    render_json_ui, render_question_text, render_text,
};
pub use session::{Session, SessionError};
pub use set::QuestionSet;
pub use spec::{
    ChoicePayload, LoadError, QuestionSpec, QuestionType, load_question_table,
    parse_question_table,
};
