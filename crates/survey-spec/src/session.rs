//! A running survey: question set, navigation and the host showing it.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::answers::{self, DecodeReport, EncodePolicy};
use crate::config::SurveyConfig;
use crate::host::{FileMode, Notice, SurveyHost};
use crate::navigation::{NavAction, NavigationController, Transition};
use crate::question::{AnswerValue, DomainError, Question};
use crate::set::QuestionSet;
use crate::spec::LoadError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("answer file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode answers to {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub struct Session<H: SurveyHost> {
    host: H,
    set: QuestionSet,
    nav: NavigationController,
    policy: EncodePolicy,
    images: Vec<H::Image>,
    closed: bool,
}

impl<H: SurveyHost> Session<H> {
    /// Load a question table and show its first question. A bad table is
    /// reported to the host before the error is returned.
    pub fn open(mut host: H, path: &Path, config: &SurveyConfig) -> Result<Self, SessionError> {
        match QuestionSet::load(path) {
            Ok(set) => Ok(Self::new(host, set, config)),
            Err(err) => {
                host.notify(&Notice::InvalidQuestionFile {
                    message: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    pub fn from_table(
        mut host: H,
        text: &str,
        config: &SurveyConfig,
    ) -> Result<Self, SessionError> {
        match QuestionSet::from_table(text) {
            Ok(set) => Ok(Self::new(host, set, config)),
            Err(err) => {
                host.notify(&Notice::InvalidQuestionFile {
                    message: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    pub fn new(host: H, set: QuestionSet, config: &SurveyConfig) -> Self {
        let nav = NavigationController::new(&set);
        let mut session = Self {
            host,
            set,
            nav,
            policy: config.encode_policy(),
            images: Vec::new(),
            closed: false,
        };
        info!(questions = session.set.len(), "survey session started");
        session.show();
        session
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn questions(&self) -> &QuestionSet {
        &self.set
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.nav
    }

    pub fn current_index(&self) -> usize {
        self.nav.current()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.set.get(self.nav.current())
    }

    /// Images resolved for the displayed question.
    pub fn images(&self) -> &[H::Image] {
        &self.images
    }

    pub fn navigate(&mut self, action: NavAction) -> Transition {
        let transition = self.nav.navigate(action, &mut self.set, &mut self.host);
        if let Transition::Moved { .. } = transition {
            self.show();
        }
        transition
    }

    pub fn to_first(&mut self) -> Transition {
        self.navigate(NavAction::First)
    }

    pub fn to_last(&mut self) -> Transition {
        self.navigate(NavAction::Last)
    }

    pub fn prev(&mut self) -> Transition {
        self.navigate(NavAction::Prev)
    }

    pub fn next(&mut self) -> Transition {
        self.navigate(NavAction::Next)
    }

    pub fn to_index(&mut self, index: usize) -> Transition {
        self.navigate(NavAction::To(index))
    }

    /// Answer the displayed question and redisplay it.
    pub fn answer(&mut self, value: AnswerValue) -> Result<(), DomainError> {
        let index = self.nav.current();
        if let Some(question) = self.set.get_mut(index) {
            question.set_answer(value)?;
        }
        self.display();
        Ok(())
    }

    /// Ask the host for a destination and save there. `None` when the user
    /// cancelled or picked something other than a `.csv` file.
    pub fn save_progress(&mut self) -> Result<Option<PathBuf>, SessionError> {
        let Some(path) = self.choose_csv(FileMode::Save) else {
            return Ok(None);
        };
        self.save_to(&path)?;
        Ok(Some(path))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SessionError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| SessionError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
        let file = File::create(path).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        answers::write_answers(&self.set, &self.policy, file).map_err(|source| {
            SessionError::Encode {
                path: path.to_path_buf(),
                source,
            }
        })?;
        info!(path = %path.display(), "answers saved");
        Ok(())
    }

    /// Ask the host for an answer file and load it.
    pub fn resume_progress(&mut self) -> Result<Option<DecodeReport>, SessionError> {
        let Some(path) = self.choose_csv(FileMode::Open) else {
            return Ok(None);
        };
        self.resume_from(&path).map(Some)
    }

    /// Apply a saved answer file. Each failing row is reported to the host;
    /// the rows that match are kept either way.
    pub fn resume_from(&mut self, path: &Path) -> Result<DecodeReport, SessionError> {
        let file = File::open(path).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let report = answers::read_answers(file, &mut self.set);
        for mismatch in &report.mismatches {
            self.host.notify(&Notice::AnswerUnmatched {
                number: mismatch.number,
                reason: mismatch.error.clone(),
            });
        }
        info!(path = %path.display(), applied = report.applied, "answers resumed");
        self.display();
        Ok(report)
    }

    /// Release images and let the host tear down its panel. Safe to call twice.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.release_images();
        self.host.teardown();
        debug!("survey session closed");
    }

    fn choose_csv(&mut self, mode: FileMode) -> Option<PathBuf> {
        let path = self.host.choose_file_path(mode)?;
        if path.extension().is_some_and(|ext| ext == "csv") {
            Some(path)
        } else {
            debug!(path = %path.display(), ?mode, "ignoring non-csv path");
            None
        }
    }

    fn show(&mut self) {
        self.release_images();
        self.resolve_images();
        self.display();
    }

    fn display(&mut self) {
        if let Some(question) = self.set.get(self.nav.current()) {
            self.host
                .display_question(question, &self.images, self.nav.toolbar());
        }
    }

    fn resolve_images(&mut self) {
        let Some(question) = self.set.get(self.nav.current()) else {
            return;
        };
        for reference in question.images() {
            match self.host.resolve_image(reference) {
                Ok(image) => self.images.push(image),
                Err(err) => {
                    warn!("image {} could not be loaded: {}", reference, err.reason);
                    self.host.notify(&Notice::ImageUnavailable {
                        reference: err.reference,
                        reason: err.reason,
                    });
                }
            }
        }
    }

    fn release_images(&mut self) {
        for image in self.images.drain(..) {
            if let Err(err) = self.host.release_image(image) {
                warn!("failed to release image {}: {}", err.reference, err.reason);
            }
        }
    }
}

impl<H: SurveyHost> Drop for Session<H> {
    fn drop(&mut self) {
        self.close();
    }
}
