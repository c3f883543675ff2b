use engine::{
    AssetCache, InputAction, InputSnapshot, QuizQuestion, QuizSource, Rect, SceneKey,
    SceneMessage, SceneNotice, Vec2,
};
use rand::Rng;
use tracing::{debug, info, warn};

use super::data::QuizDataManager;

const CHOICE_LEFT_PX: f32 = 80.0;
const CHOICE_TOP_PX: f32 = 200.0;
const CHOICE_WIDTH_PX: f32 = 480.0;
const CHOICE_HEIGHT_PX: f32 = 44.0;
const CHOICE_SPACING_PX: f32 = 56.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QuizState {
    Loading,
    Question,
    Result,
    Closing,
}

/// Input handlers registered for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QuizBinding {
    Navigate,
    DigitSelect,
    Confirm,
    ClickChoice,
    AltConfirm,
    Cancel,
    Click,
}

/// Screen rectangle of the `index`-th choice button.
pub(crate) fn choice_rect(index: usize) -> Rect {
    Rect::new(
        CHOICE_LEFT_PX,
        CHOICE_TOP_PX + CHOICE_SPACING_PX * index as f32,
        CHOICE_WIDTH_PX,
        CHOICE_HEIGHT_PX,
    )
}

/// One quiz encounter: `Loading → Question → Result → Closing`. The
/// completion notice for the return scene is produced exactly once.
#[derive(Debug)]
pub(crate) struct QuizFlow {
    state: QuizState,
    return_key: SceneKey,
    question: Option<QuizQuestion>,
    selected: usize,
    is_correct: bool,
    bindings: Vec<QuizBinding>,
    input_locked: bool,
    completion_sent: bool,
}

impl QuizFlow {
    pub(crate) fn new(return_key: SceneKey) -> Self {
        Self {
            state: QuizState::Loading,
            return_key,
            question: None,
            selected: 0,
            is_correct: false,
            bindings: Vec::new(),
            input_locked: true,
            completion_sent: false,
        }
    }

    pub(crate) fn state(&self) -> QuizState {
        self.state
    }

    pub(crate) fn question(&self) -> Option<&QuizQuestion> {
        self.question.as_ref()
    }

    pub(crate) fn selected(&self) -> usize {
        self.selected
    }

    #[cfg(test)]
    pub(crate) fn is_correct(&self) -> bool {
        self.is_correct
    }

    #[cfg(test)]
    pub(crate) fn bindings(&self) -> &[QuizBinding] {
        &self.bindings
    }

    /// Runs the loading step. Returns the completion notice right away when
    /// no question can be shown.
    pub(crate) fn begin<R: Rng + ?Sized>(
        &mut self,
        data: &mut QuizDataManager,
        assets: Option<&AssetCache>,
        category: Option<&str>,
        rng: &mut R,
    ) -> Option<SceneNotice> {
        if self.state != QuizState::Loading {
            return None;
        }
        if let Err(error) = data.load(assets, category) {
            warn!(error = %error, "quiz_safe_exit");
            return self.safe_exit();
        }
        match data.draw(rng) {
            Some(question) => {
                info!(
                    question = %question.question,
                    choice_count = question.choices.len(),
                    remaining = data.available_count(),
                    total = data.total_count(),
                    "quiz_question_shown"
                );
                self.question = Some(question);
                self.selected = 0;
                self.transition(QuizState::Question);
                None
            }
            None => {
                warn!("quiz_safe_exit");
                self.safe_exit()
            }
        }
    }

    pub(crate) fn handle_input(&mut self, input: &InputSnapshot) -> Option<SceneNotice> {
        if self.input_locked {
            return None;
        }
        match self.state {
            QuizState::Question => {
                self.handle_question_input(input);
                None
            }
            QuizState::Result => {
                let wants_close = (self.has_binding(QuizBinding::Confirm)
                    && input.was_pressed(InputAction::Confirm))
                    || (self.has_binding(QuizBinding::AltConfirm)
                        && input.was_pressed(InputAction::AltConfirm))
                    || (self.has_binding(QuizBinding::Cancel)
                        && input.was_pressed(InputAction::Cancel))
                    || (self.has_binding(QuizBinding::Click) && input.pointer_click_px().is_some());
                if wants_close {
                    self.close()
                } else {
                    None
                }
            }
            QuizState::Loading | QuizState::Closing => None,
        }
    }

    /// Leaves the result screen. Only the first call produces a notice.
    pub(crate) fn close(&mut self) -> Option<SceneNotice> {
        if self.state != QuizState::Result || self.input_locked {
            debug!(state = ?self.state, "quiz_close_ignored");
            return None;
        }
        self.transition(QuizState::Closing);
        self.complete(self.is_correct)
    }

    /// Text for the result screen: verdict plus the citation when present.
    pub(crate) fn result_text(&self) -> Option<String> {
        if self.state != QuizState::Result {
            return None;
        }
        let question = self.question.as_ref()?;
        let mut text = if self.is_correct {
            "Correct!".to_string()
        } else {
            format!("Wrong! The answer was: {}", question.answer)
        };
        if let Some(citation) = question.source.as_ref().and_then(QuizSource::citation) {
            text.push_str("\nSource: ");
            text.push_str(&citation);
        }
        Some(text)
    }

    fn handle_question_input(&mut self, input: &InputSnapshot) {
        let Some(choice_count) = self.question.as_ref().map(|question| question.choices.len())
        else {
            return;
        };
        if choice_count == 0 {
            return;
        }

        if self.has_binding(QuizBinding::Navigate) {
            if input.was_pressed(InputAction::MoveUp) {
                self.selected = (self.selected + choice_count - 1) % choice_count;
            }
            if input.was_pressed(InputAction::MoveDown) {
                self.selected = (self.selected + 1) % choice_count;
            }
        }
        if self.has_binding(QuizBinding::DigitSelect) {
            if let Some(digit) = input.digit_pressed() {
                let index = usize::from(digit).wrapping_sub(1);
                if index < choice_count {
                    self.selected = index;
                }
            }
        }
        if self.has_binding(QuizBinding::ClickChoice) {
            if let Some(index) = input
                .pointer_click_px()
                .and_then(|point| hit_choice(point, choice_count))
            {
                self.selected = index;
                self.submit();
                return;
            }
        }
        if self.has_binding(QuizBinding::Confirm) && input.was_pressed(InputAction::Confirm) {
            self.submit();
        }
    }

    fn submit(&mut self) {
        if self.state != QuizState::Question {
            return;
        }
        let Some(question) = self.question.as_ref() else {
            return;
        };
        let chosen = question.choices.get(self.selected);
        self.is_correct = chosen.is_some_and(|choice| *choice == question.answer);
        info!(
            selected = self.selected,
            is_correct = self.is_correct,
            "quiz_answered"
        );
        self.transition(QuizState::Result);
    }

    fn safe_exit(&mut self) -> Option<SceneNotice> {
        self.transition(QuizState::Closing);
        self.complete(false)
    }

    fn complete(&mut self, is_correct: bool) -> Option<SceneNotice> {
        if self.completion_sent {
            return None;
        }
        self.completion_sent = true;
        info!(is_correct, return_to = ?self.return_key, "quiz_completed");
        Some(SceneNotice {
            target: self.return_key,
            message: SceneMessage::QuizCompleted { is_correct },
        })
    }

    fn transition(&mut self, next: QuizState) {
        debug!(from = ?self.state, to = ?next, "quiz_state_changed");
        self.bindings.clear();
        self.state = next;
        self.input_locked = matches!(next, QuizState::Loading | QuizState::Closing);
        self.bindings.extend_from_slice(bindings_for(next));
    }

    fn has_binding(&self, binding: QuizBinding) -> bool {
        self.bindings.contains(&binding)
    }
}

const QUESTION_BINDINGS: [QuizBinding; 4] = [
    QuizBinding::Navigate,
    QuizBinding::DigitSelect,
    QuizBinding::Confirm,
    QuizBinding::ClickChoice,
];
const RESULT_BINDINGS: [QuizBinding; 4] = [
    QuizBinding::Confirm,
    QuizBinding::AltConfirm,
    QuizBinding::Cancel,
    QuizBinding::Click,
];

fn bindings_for(state: QuizState) -> &'static [QuizBinding] {
    match state {
        QuizState::Question => &QUESTION_BINDINGS,
        QuizState::Result => &RESULT_BINDINGS,
        QuizState::Loading | QuizState::Closing => &[],
    }
}

fn hit_choice(point: Vec2, choice_count: usize) -> Option<usize> {
    (0..choice_count).find(|&index| choice_rect(index).contains_point(point))
}
