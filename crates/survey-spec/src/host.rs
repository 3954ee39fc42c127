//! Seams to the application hosting the survey panel.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::navigation::Toolbar;
use crate::question::{Question, RowError};

/// Purpose of a file dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// Pick an existing answer file to resume from.
    Open,
    /// Pick where to save answers.
    Save,
}

/// User-facing messages raised by the engine. None of them block the session.
///
/// ```
/// use survey_spec::Notice;
///
/// let notice = Notice::Unanswered { number: 3 };
/// assert_eq!(notice.title(), "Question Not Answered");
/// assert_eq!(notice.to_string(), "Question 3 is not answered");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The question being left has no answer. `number` is 1-based.
    Unanswered { number: usize },
    /// A row of a resumed answer file was rejected by question `number`.
    AnswerUnmatched { number: usize, reason: RowError },
    /// The host could not load an image of the displayed question.
    ImageUnavailable { reference: String, reason: String },
    /// The question table failed to load.
    InvalidQuestionFile { message: String },
}

impl Notice {
    /// Dialog title.
    pub fn title(&self) -> &'static str {
        match self {
            Notice::Unanswered { .. } => "Question Not Answered",
            Notice::AnswerUnmatched { .. } => "Answer Unmatched",
            Notice::ImageUnavailable { .. } => "Image Unavailable",
            Notice::InvalidQuestionFile { .. } => "File Invalid",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Unanswered { number } => write!(f, "Question {} is not answered", number),
            Notice::AnswerUnmatched { number, reason } => write!(
                f,
                "Answer {} does not match to question {}: {}",
                number, number, reason
            ),
            Notice::ImageUnavailable { reference, reason } => {
                write!(f, "Image '{}' could not be loaded: {}", reference, reason)
            }
            Notice::InvalidQuestionFile { message } => write!(f, "Invalid CSV: {}", message),
        }
    }
}

/// Failure to load or release an image, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("image '{reference}' could not be resolved: {reason}")]
pub struct ImageResolutionError {
    pub reference: String,
    pub reason: String,
}

impl ImageResolutionError {
    pub fn new(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            reason: reason.into(),
        }
    }
}

/// Modal prompts used by the navigation guard.
pub trait Prompter {
    /// Yes/no question; `false` also covers a dismissed dialog.
    fn confirm(&mut self, message: &str) -> bool;

    /// Show a message that needs no reply.
    fn notify(&mut self, notice: &Notice);
}

/// Everything a panel host provides to a [`crate::Session`].
pub trait SurveyHost: Prompter {
    /// Handle to a loaded image, owned by the session until released.
    type Image;

    /// Show `question` with its resolved images and navigation state.
    fn display_question(&mut self, question: &Question, images: &[Self::Image], toolbar: Toolbar);

    /// Load the image named by a question's image reference.
    fn resolve_image(&mut self, reference: &str) -> Result<Self::Image, ImageResolutionError>;

    /// Unload an image. A failure is logged and the session carries on.
    fn release_image(&mut self, image: Self::Image) -> Result<(), ImageResolutionError>;

    /// Ask for an answer file path. `None` means the dialog was cancelled.
    fn choose_file_path(&mut self, mode: FileMode) -> Option<PathBuf>;

    /// Drop whatever the host built for the panel. Called once when the session closes.
    fn teardown(&mut self) {}
}
