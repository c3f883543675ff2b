use engine::{InputAction, InputSnapshot, InputSource, SceneKey};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const JUMP_PERIOD_TICKS: u64 = 45;
const JUMP_HOLD_TICKS: u64 = 8;
const QUIZ_THINK_TICKS: u64 = 20;
const MAX_GUESS_DIGIT: u8 = 4;

/// Scripted player for headless runs: runs right and hops on the stage,
/// guesses a choice and confirms through the quiz.
#[derive(Debug)]
pub(crate) struct AutopilotInput {
    rng: StdRng,
    quiz_entered_at: Option<u64>,
}

impl AutopilotInput {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            quiz_entered_at: None,
        }
    }

    fn stage_input(tick: u64) -> InputSnapshot {
        let jumping = tick % JUMP_PERIOD_TICKS < JUMP_HOLD_TICKS;
        InputSnapshot::empty()
            .with_action_down(InputAction::MoveRight, true)
            .with_action_down(InputAction::Jump, jumping)
    }

    fn quiz_input(&mut self, elapsed: u64) -> InputSnapshot {
        if elapsed == 0 || elapsed % QUIZ_THINK_TICKS != 0 {
            return InputSnapshot::empty();
        }
        let confirm = InputSnapshot::empty().with_action_pressed(InputAction::Confirm);
        if elapsed == QUIZ_THINK_TICKS {
            let guess = self.rng.gen_range(1..=MAX_GUESS_DIGIT);
            return confirm.with_digit_pressed(Some(guess));
        }
        confirm
    }
}

impl InputSource for AutopilotInput {
    fn snapshot_for_tick(&mut self, tick: u64, active_scene: SceneKey) -> InputSnapshot {
        match active_scene {
            SceneKey::Stage => {
                self.quiz_entered_at = None;
                Self::stage_input(tick)
            }
            SceneKey::Quiz => {
                let entered = *self.quiz_entered_at.get_or_insert(tick);
                self.quiz_input(tick - entered)
            }
        }
    }
}
