//! Linear navigation over a question set with advisory answer gating.

use tracing::debug;

use crate::host::{Notice, Prompter};
use crate::question::QuestionKind;
use crate::set::QuestionSet;

/// A request to move the displayed question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    /// Jump to the first question.
    First,
    /// Step back one question.
    Prev,
    /// Step forward one question.
    Next,
    /// Jump to the last question.
    Last,
    /// Zero-based index.
    To(usize),
}

/// Which navigation controls the host should enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toolbar {
    pub position: usize,
    pub total: usize,
    pub first: bool,
    pub prev: bool,
    pub next: bool,
    pub last: bool,
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The target was the current question or outside the set.
    Unchanged,
    /// The displayed question changed; both indices are zero-based.
    Moved { from: usize, to: usize },
}

/// What the guard found on the question being left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Nothing to report.
    Answered,
    /// An unmoved slider whose value the user accepted. It now counts as moved.
    SliderConfirmed,
    /// An unmoved slider the user did not confirm. It stays unanswered.
    SliderUnconfirmed,
    /// A question left without an answer; the user was notified.
    Unanswered,
}

/// Tracks the displayed question of a set and moves it on request.
///
/// Leaving a question runs [`NavigationController::check_current`] first, but
/// its outcome never cancels the move.
///
/// ```
/// use survey_spec::{NavAction, NavigationController, Notice, Prompter, QuestionSet, Transition};
///
/// struct Silent;
///
/// impl Prompter for Silent {
///     fn confirm(&mut self, _message: &str) -> bool {
///         false
///     }
///
///     fn notify(&mut self, _notice: &Notice) {}
/// }
///
/// let mut set = QuestionSet::from_table(
///     "text,type,images,choices\nName,open,[],[]\nMood,dropdown,[],\"['ok', 'bad']\"\n",
/// )
/// .unwrap();
/// let mut nav = NavigationController::new(&set);
///
/// assert_eq!(nav.navigate(NavAction::Prev, &mut set, &mut Silent), Transition::Unchanged);
/// assert_eq!(
///     nav.navigate(NavAction::Last, &mut set, &mut Silent),
///     Transition::Moved { from: 0, to: 1 }
/// );
/// assert!(!nav.toolbar().next);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationController {
    current: usize,
    len: usize,
}

impl NavigationController {
    /// Starts on the first question of `set`.
    pub fn new(set: &QuestionSet) -> Self {
        Self {
            current: 0,
            len: set.len(),
        }
    }

    /// Zero-based index of the displayed question.
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// First and prev are disabled on the first question, next and last on the final one.
    pub fn toolbar(&self) -> Toolbar {
        let at_start = self.current == 0;
        let at_end = self.current + 1 >= self.len;
        Toolbar {
            position: self.current,
            total: self.len,
            first: !at_start,
            prev: !at_start,
            next: !at_end,
            last: !at_end,
        }
    }

    /// Destination of `action`, or `None` when it would not move.
    pub fn target(&self, action: NavAction) -> Option<usize> {
        let target = match action {
            NavAction::First => 0,
            NavAction::Last => self.len.checked_sub(1)?,
            NavAction::Prev => self.current.checked_sub(1)?,
            NavAction::Next => self.current + 1,
            NavAction::To(index) => index,
        };
        (target < self.len && target != self.current).then_some(target)
    }

    /// Check the current question before leaving it. Never blocks.
    pub fn check_current<P: Prompter + ?Sized>(
        &self,
        set: &mut QuestionSet,
        prompter: &mut P,
    ) -> GuardOutcome {
        let Some(question) = set.get_mut(self.current) else {
            return GuardOutcome::Answered;
        };
        let number = question.number();

        if let QuestionKind::Slider(slider) = question.kind_mut() {
            if slider.is_moved() {
                return GuardOutcome::Answered;
            }
            let message = format!(
                "Slider for Question {} has not been moved, is the answer what you want?",
                number
            );
            return if prompter.confirm(&message) {
                slider.mark_moved();
                GuardOutcome::SliderConfirmed
            } else {
                GuardOutcome::SliderUnconfirmed
            };
        }

        if question.is_unanswered() {
            prompter.notify(&Notice::Unanswered { number });
            return GuardOutcome::Unanswered;
        }
        GuardOutcome::Answered
    }

    /// Move as `action` asks. Moves that stay put or leave the set are ignored
    /// and skip the guard.
    pub fn navigate<P: Prompter + ?Sized>(
        &mut self,
        action: NavAction,
        set: &mut QuestionSet,
        prompter: &mut P,
    ) -> Transition {
        let Some(target) = self.target(action) else {
            debug!(?action, current = self.current, "navigation ignored");
            return Transition::Unchanged;
        };
        let outcome = self.check_current(set, prompter);
        let from = self.current;
        self.current = target;
        debug!(?action, from, to = target, ?outcome, "navigated");
        Transition::Moved { from, to: target }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::AnswerValue;

    #[derive(Default)]
    struct Prompts {
        answer: bool,
        confirms: Vec<String>,
        notices: Vec<Notice>,
    }

    impl Prompter for Prompts {
        fn confirm(&mut self, message: &str) -> bool {
            self.confirms.push(message.to_string());
            self.answer
        }

        fn notify(&mut self, notice: &Notice) {
            self.notices.push(notice.clone());
        }
    }

    fn five_open_questions() -> QuestionSet {
        let mut table = String::from("text,type,images,choices\n");
        for idx in 1..=5 {
            table.push_str(&format!("Q{idx},open,[],[]\n"));
        }
        QuestionSet::from_table(&table).unwrap()
    }

    #[test]
    fn start_ignores_backwards_moves() {
        let mut set = five_open_questions();
        let mut nav = NavigationController::new(&set);
        let mut prompts = Prompts::default();

        assert_eq!(
            nav.navigate(NavAction::Prev, &mut set, &mut prompts),
            Transition::Unchanged
        );
        assert_eq!(
            nav.navigate(NavAction::First, &mut set, &mut prompts),
            Transition::Unchanged
        );
        assert_eq!(nav.current(), 0);
        assert!(prompts.notices.is_empty());

        assert_eq!(
            nav.navigate(NavAction::Next, &mut set, &mut prompts),
            Transition::Moved { from: 0, to: 1 }
        );
        assert_eq!(nav.current(), 1);
    }

    #[test]
    fn toolbar_tracks_edges() {
        let mut set = five_open_questions();
        let mut nav = NavigationController::new(&set);
        let mut prompts = Prompts::default();

        let toolbar = nav.toolbar();
        assert!(!toolbar.first && !toolbar.prev && toolbar.next && toolbar.last);

        nav.navigate(NavAction::Last, &mut set, &mut prompts);
        let toolbar = nav.toolbar();
        assert_eq!(toolbar.position, 4);
        assert!(toolbar.first && toolbar.prev && !toolbar.next && !toolbar.last);
        assert_eq!(nav.target(NavAction::Next), None);
        assert_eq!(nav.target(NavAction::To(5)), None);
        assert_eq!(nav.target(NavAction::To(4)), None);
        assert_eq!(nav.target(NavAction::To(2)), Some(2));
    }

    #[test]
    fn unanswered_question_notifies_but_moves() {
        let mut set = five_open_questions();
        let mut nav = NavigationController::new(&set);
        let mut prompts = Prompts::default();

        nav.navigate(NavAction::To(3), &mut set, &mut prompts);
        assert_eq!(nav.current(), 3);
        assert_eq!(prompts.notices, vec![Notice::Unanswered { number: 1 }]);

        set.get_mut(3)
            .unwrap()
            .set_answer(AnswerValue::Text("fine".into()))
            .unwrap();
        nav.navigate(NavAction::Prev, &mut set, &mut prompts);
        assert_eq!(prompts.notices.len(), 1);
    }

    #[test]
    fn unmoved_slider_asks_for_confirmation() {
        let mut set = QuestionSet::from_table(
            "text,type,images,choices\nPain,slider,[],\"[0, 10]\"\nNotes,open,[],[]\n",
        )
        .unwrap();
        let mut nav = NavigationController::new(&set);
        let mut prompts = Prompts::default();

        assert_eq!(
            nav.check_current(&mut set, &mut prompts),
            GuardOutcome::SliderUnconfirmed
        );
        // Declining still lets the user move on.
        nav.navigate(NavAction::Next, &mut set, &mut prompts);
        assert_eq!(nav.current(), 1);
        assert_eq!(prompts.confirms.len(), 2);
        assert!(prompts.confirms[0].contains("Slider for Question 1"));
        assert_eq!(set.get(0).unwrap().answers(), vec![None]);

        prompts.answer = true;
        nav.navigate(NavAction::First, &mut set, &mut prompts);
        nav.navigate(NavAction::Next, &mut set, &mut prompts);
        assert_eq!(set.get(0).unwrap().answers(), vec![Some("0".to_string())]);
        assert!(prompts.notices.iter().all(|n| matches!(n, Notice::Unanswered { number: 2 })));
    }
}
