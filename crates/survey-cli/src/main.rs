mod terminal;

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use survey_spec::{
    AnswerValue, QuestionKind, QuestionSet, Session, SurveyConfig, build_render_payload, decode,
    render_json_ui, render_text,
};
use terminal::TerminalHost;
use tracing::info;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Terminal survey runner",
    long_about = "Walks through a CSV questionnaire, checks saved answer files \
                  and renders question tables"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderMode {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a questionnaire interactively.
    Run {
        /// Question table CSV.
        #[arg(long, value_name = "QUESTIONS")]
        questions: PathBuf,
        /// Survey config JSON.
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
        /// Answer file to resume from.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
    },
    /// Check that an answer file matches a questionnaire.
    Check {
        #[arg(long, value_name = "QUESTIONS")]
        questions: PathBuf,
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Print every question of a questionnaire.
    Show {
        #[arg(long, value_name = "QUESTIONS")]
        questions: PathBuf,
        /// Answer file applied before rendering.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
    },
}

fn main() -> CliResult<()> {
    let filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "survey_spec=info,survey=info".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            questions,
            config,
            answers,
        } => run_survey(questions, config, answers),
        Command::Check { questions, answers } => run_check(questions, answers),
        Command::Show {
            questions,
            answers,
            format,
        } => run_show(questions, answers, format),
    }
}

fn load_config(path: Option<&Path>) -> CliResult<SurveyConfig> {
    match path {
        Some(path) => Ok(SurveyConfig::load(path)?),
        None => Ok(SurveyConfig::default()),
    }
}

fn run_survey(
    questions: PathBuf,
    config_path: Option<PathBuf>,
    answers: Option<PathBuf>,
) -> CliResult<()> {
    let config = load_config(config_path.as_deref())?;
    let base_dir = questions
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let stdin = io::stdin();
    let host = TerminalHost::new(
        stdin.lock(),
        io::stdout(),
        &base_dir,
        &config.results_dir(),
    );
    let mut session = Session::open(host, &questions, &config)?;
    if let Some(path) = answers {
        session.resume_from(&path)?;
    }
    drive(&mut session)?;
    session.close();
    Ok(())
}

const HELP: &str = "Commands: n(ext), p(rev), f(irst), l(ast), g <number>, a <answer>, \
                    s(ave), r(esume), q(uit)";

/// Command loop over a running session. Ends on `q` or end of input.
fn drive<R: BufRead, W: Write>(session: &mut Session<TerminalHost<R, W>>) -> CliResult<()> {
    session.host_mut().say(HELP);
    loop {
        let Some(line) = session.host_mut().read_line("> ")? else {
            break;
        };
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line.as_str(), ""),
        };
        match command {
            "" => continue,
            "n" | "next" => {
                session.next();
            }
            "p" | "prev" => {
                session.prev();
            }
            "f" | "first" => {
                session.to_first();
            }
            "l" | "last" => {
                session.to_last();
            }
            "g" | "goto" => match rest.parse::<usize>() {
                Ok(number) if number >= 1 => {
                    session.to_index(number - 1);
                }
                _ => session
                    .host_mut()
                    .say("Usage: g <question number>"),
            },
            "a" | "answer" => {
                let parsed = session
                    .current_question()
                    .ok_or("no question is displayed")
                    .map(|question| parse_answer(question.kind(), rest))?;
                let outcome = parsed.and_then(|value| {
                    session.answer(value).map_err(|err| err.to_string())
                });
                if let Err(message) = outcome {
                    session.host_mut().say(&format!("Invalid answer: {}", message));
                }
            }
            "s" | "save" => match session.save_progress()? {
                Some(path) => session
                    .host_mut()
                    .say(&format!("Saved answers to {}", path.display())),
                None => session.host_mut().say("Nothing saved"),
            },
            "r" | "resume" => {
                if session.resume_progress()?.is_none() {
                    session.host_mut().say("Nothing loaded");
                }
            }
            "q" | "quit" => break,
            "h" | "help" => session.host_mut().say(HELP),
            other => session
                .host_mut()
                .say(&format!("Unknown command '{}'. {}", other, HELP)),
        }
    }
    Ok(())
}

/// Turn typed input into an answer for the displayed question. Choice
/// questions take labels or 1-based option numbers; multi choice takes a
/// comma-separated list.
fn parse_answer(kind: &QuestionKind, raw: &str) -> Result<AnswerValue, String> {
    let raw = raw.trim();
    match kind {
        QuestionKind::OpenText(_) => Ok(AnswerValue::Text(raw.to_string())),
        QuestionKind::SingleChoice(q) => pick(q.choices(), raw).map(AnswerValue::Choice),
        QuestionKind::Dropdown(q) => pick(q.options(), raw).map(AnswerValue::Choice),
        QuestionKind::MultiChoice(q) => raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| pick(q.choices(), item))
            .collect::<Result<Vec<_>, _>>()
            .map(AnswerValue::Choices),
        QuestionKind::Slider(_) | QuestionKind::Rating(_) => raw
            .parse::<i64>()
            .map(AnswerValue::Number)
            .map_err(|_| format!("'{}' is not a whole number", raw)),
    }
}

fn pick(options: &[String], raw: &str) -> Result<String, String> {
    if raw.is_empty() {
        return Err("an answer is required".to_string());
    }
    if let Some(label) = options.iter().find(|option| option.as_str() == raw) {
        return Ok(label.clone());
    }
    match raw.parse::<usize>() {
        Ok(number) if (1..=options.len()).contains(&number) => Ok(options[number - 1].clone()),
        _ => Err(format!(
            "'{}' is not one of: {}",
            raw,
            options.join(", ")
        )),
    }
}

fn run_check(questions: PathBuf, answers: PathBuf) -> CliResult<()> {
    let mut set = QuestionSet::load(&questions)?;
    let text = fs::read_to_string(&answers)?;
    let report = decode(&text, &mut set);
    info!(applied = report.applied, "checked answer file");
    if report.is_clean() {
        println!(
            "{}: {} rows match {}",
            answers.display(),
            report.applied,
            questions.display()
        );
        return Ok(());
    }
    for mismatch in &report.mismatches {
        println!(
            "Answer {} does not match to question {}: {}",
            mismatch.number, mismatch.number, mismatch.error
        );
    }
    Err(format!(
        "{} of {} rows do not match",
        report.mismatches.len(),
        report.applied + report.mismatches.len()
    )
    .into())
}

fn run_show(questions: PathBuf, answers: Option<PathBuf>, format: RenderMode) -> CliResult<()> {
    let mut set = QuestionSet::load(&questions)?;
    if let Some(path) = answers {
        let report = decode(&fs::read_to_string(&path)?, &mut set);
        for mismatch in &report.mismatches {
            eprintln!("row {} skipped: {}", mismatch.number, mismatch.error);
        }
    }
    let payload = build_render_payload(&set, 0);
    match format {
        RenderMode::Text => println!("{}", render_text(&payload)),
        RenderMode::Json => println!(
            "{}",
            serde_json::to_string_pretty(&render_json_ui(&payload))?
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_cmd::Command;
    use assert_fs::prelude::*;
    use std::io::Cursor;
    use survey_spec::Question;

    const QUESTIONS: &str = "text,type,images,choices\n\
What is your name?,open,[],[]\n\
Would you like to stay anonymous?,multi_single,[],\"['yes', 'no']\"\n\
Which findings are visible?,multi_multi,['ct.nrrd'],\"['nodule', 'effusion', 'none']\"\n\
How confident are you?,slider,[],\"[0, 100]\"\n";

    fn question(row: &str) -> Question {
        let set = QuestionSet::from_table(&format!("text,type,images,choices\n{row}\n")).unwrap();
        set.get(0).unwrap().clone()
    }

    #[test]
    fn parse_answer_accepts_labels_and_numbers() {
        let single = question("Pick,single_choice,[],\"['a', 'b']\"");
        assert_eq!(
            parse_answer(single.kind(), "2").unwrap(),
            AnswerValue::Choice("b".into())
        );
        assert_eq!(
            parse_answer(single.kind(), "a").unwrap(),
            AnswerValue::Choice("a".into())
        );
        assert!(parse_answer(single.kind(), "3").is_err());
    }

    #[test]
    fn parse_answer_skips_dropdown_sentinel() {
        let dropdown = question("Quality,dropdown,[],\"['good', 'poor']\"");
        assert_eq!(
            parse_answer(dropdown.kind(), "1").unwrap(),
            AnswerValue::Choice("good".into())
        );
    }

    #[test]
    fn parse_answer_splits_multi_choice() {
        let multi = question("Findings,multi_choice,[],\"['x', 'y', 'z']\"");
        assert_eq!(
            parse_answer(multi.kind(), "z, 1").unwrap(),
            AnswerValue::Choices(vec!["z".into(), "x".into()])
        );
    }

    #[test]
    fn parse_answer_requires_numbers_for_scales() {
        let slider = question("Confidence,slider,[],\"[0, 10]\"");
        assert_eq!(
            parse_answer(slider.kind(), "7").unwrap(),
            AnswerValue::Number(7)
        );
        assert!(parse_answer(slider.kind(), "seven").is_err());
    }

    #[test]
    fn help_is_a_single_line() {
        assert!(!HELP.contains('\n'));
        assert!(HELP.ends_with("a <answer>, s(ave), r(esume), q(uit)"));
    }

    #[test]
    fn drive_answers_and_navigates() {
        let dir = tempfile::tempdir().unwrap();
        let script = "a Dr. Grey\nn\na yes\nn\nn\nq\n";
        let host = TerminalHost::new(
            Cursor::new(script.as_bytes().to_vec()),
            Vec::new(),
            dir.path(),
            dir.path(),
        );
        let set = QuestionSet::from_table(QUESTIONS).unwrap();
        let mut session = Session::new(host, set, &SurveyConfig::default());
        drive(&mut session).unwrap();

        assert_eq!(session.current_index(), 3);
        let answers: Vec<_> = session
            .questions()
            .iter()
            .map(|question| question.answers())
            .collect();
        assert_eq!(answers[0], vec![Some("Dr. Grey".to_string())]);
        assert_eq!(answers[1], vec![Some("yes".to_string())]);
        assert_eq!(answers[2], vec![None]);
    }

    #[test]
    fn run_saves_answers_to_results_dir() -> CliResult<()> {
        let temp = assert_fs::TempDir::new()?;
        let questions = temp.child("questions.csv");
        questions.write_str(QUESTIONS)?;
        temp.child("ct.nrrd").write_binary(b"volume")?;
        let results = temp.child("Results");
        let config = temp.child("config.json");
        config.write_str(&format!(
            r#"{{"results_dir": {}}}"#,
            serde_json::to_string(&results.path())?
        ))?;

        let script = "a Ada\nn\na no\nn\na 2\nn\ns\nout.csv\nq\n";
        let mut cmd = Command::cargo_bin("survey")?;
        cmd.arg("run")
            .arg("--questions")
            .arg(questions.path())
            .arg("--config")
            .arg(config.path())
            .write_stdin(script)
            .assert()
            .success();

        let saved = fs::read_to_string(results.path().join("out.csv"))?;
        assert_eq!(
            saved,
            "\"'What is your name?\",\"'Ada\"\n\
\"'Would you like to stay anonymous?\",\"'no\"\n\
\"'Which findings are visible?\",\"'effusion\"\n\
\"'How confident are you?\",\"Question Unanswered\"\n"
        );
        Ok(())
    }

    #[test]
    fn check_reports_mismatched_rows() -> CliResult<()> {
        let temp = tempfile::tempdir()?;
        let questions = temp.path().join("questions.csv");
        fs::write(&questions, QUESTIONS)?;
        let answers = temp.path().join("answers.csv");
        fs::write(
            &answers,
            "\"'What is your name?\",\"'Ada\"\n\"'Do you agree?\",\"'yes\"\n",
        )?;

        let output = Command::cargo_bin("survey")?
            .arg("check")
            .arg("--questions")
            .arg(&questions)
            .arg("--answers")
            .arg(&answers)
            .output()?;
        assert!(!output.status.success());
        let stdout = String::from_utf8(output.stdout)?;
        assert!(stdout.contains("Answer 2 does not match to question 2"));
        Ok(())
    }

    #[test]
    fn show_renders_json() -> CliResult<()> {
        let temp = tempfile::tempdir()?;
        let questions = temp.path().join("questions.csv");
        fs::write(&questions, QUESTIONS)?;

        let output = Command::cargo_bin("survey")?
            .arg("show")
            .arg("--questions")
            .arg(&questions)
            .arg("--format")
            .arg("json")
            .output()?;
        assert!(output.status.success());
        let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        assert_eq!(value["progress"]["total"], 4);
        assert_eq!(value["questions"][3]["type"], "slider");
        Ok(())
    }
}
