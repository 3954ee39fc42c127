use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use survey_spec::{
    FileMode, ImageResolutionError, Notice, Prompter, Question, RenderQuestion, SurveyHost,
    Toolbar, render_question_text,
};
use tracing::debug;

/// Layer an image is shown on: the first image of a question is the
/// background, the second is overlaid on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Background,
    Foreground,
    Extra,
}

impl Layer {
    fn for_position(position: usize) -> Self {
        match position {
            0 => Layer::Background,
            1 => Layer::Foreground,
            _ => Layer::Extra,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Layer::Background => "background",
            Layer::Foreground => "foreground",
            Layer::Extra => "extra",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub path: PathBuf,
}

/// Line-oriented host: questions go to `output`, answers and dialog replies
/// come from `input`.
pub struct TerminalHost<R, W> {
    input: R,
    output: W,
    base_dir: PathBuf,
    results_dir: PathBuf,
    at_eof: bool,
}

impl<R: BufRead, W: Write> TerminalHost<R, W> {
    /// Images resolve against `base_dir`; relative answer-file paths land in `results_dir`.
    pub fn new(input: R, output: W, base_dir: &Path, results_dir: &Path) -> Self {
        Self {
            input,
            output,
            base_dir: base_dir.to_path_buf(),
            results_dir: results_dir.to_path_buf(),
            at_eof: false,
        }
    }

    pub fn at_eof(&self) -> bool {
        self.at_eof
    }

    /// Trimmed next line, or `None` at end of input.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            self.at_eof = true;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    pub fn say(&mut self, message: &str) {
        // A closed stdout is not worth aborting the survey for.
        let _ = writeln!(self.output, "{}", message);
    }

    fn ask(&mut self, prompt: &str) -> Option<String> {
        match self.read_line(prompt) {
            Ok(line) => line,
            Err(err) => {
                debug!("failed to read reply: {}", err);
                None
            }
        }
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalHost<R, W> {
    fn confirm(&mut self, message: &str) -> bool {
        let reply = self.ask(&format!("{} [y/N] ", message));
        matches!(
            reply.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("y" | "yes")
        )
    }

    fn notify(&mut self, notice: &Notice) {
        self.say(&format!("{}: {}", notice.title(), notice));
    }
}

impl<R: BufRead, W: Write> SurveyHost for TerminalHost<R, W> {
    type Image = ResolvedImage;

    fn display_question(
        &mut self,
        question: &Question,
        images: &[ResolvedImage],
        toolbar: Toolbar,
    ) {
        let render = RenderQuestion::from_question(question);
        let mut text = render_question_text(&render, Some(toolbar));
        for (position, image) in images.iter().enumerate() {
            text.push_str(&format!(
                "\n  Showing {} ({})",
                image.path.display(),
                Layer::for_position(position).label()
            ));
        }
        self.say(&text);
    }

    fn resolve_image(&mut self, reference: &str) -> Result<ResolvedImage, ImageResolutionError> {
        let path = self.base_dir.join(reference);
        if !path.is_file() {
            return Err(ImageResolutionError::new(
                reference,
                format!("{} does not exist", path.display()),
            ));
        }
        debug!(path = %path.display(), "resolved image");
        Ok(ResolvedImage { path })
    }

    fn release_image(&mut self, image: ResolvedImage) -> Result<(), ImageResolutionError> {
        debug!(path = %image.path.display(), "released image");
        Ok(())
    }

    fn choose_file_path(&mut self, mode: FileMode) -> Option<PathBuf> {
        let verb = match mode {
            FileMode::Save => "Save answers to",
            FileMode::Open => "Load answers from",
        };
        let prompt = format!(
            "{} (relative to {}, blank to cancel): ",
            verb,
            self.results_dir.display()
        );
        let reply = self.ask(&prompt).filter(|reply| !reply.is_empty())?;
        let path = PathBuf::from(reply);
        if path.is_relative() {
            Some(self.results_dir.join(path))
        } else {
            Some(path)
        }
    }

    fn teardown(&mut self) {
        let _ = self.output.flush();
    }
}
