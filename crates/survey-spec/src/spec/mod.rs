pub mod question;
pub mod table;

pub use question::{ChoicePayload, QuestionSpec, QuestionType, UnknownType};
pub use table::{Column, LoadError, load_question_table, parse_question_table};
