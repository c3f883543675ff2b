use super::scene::{SceneKey, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Jump,
    Confirm,
    AltConfirm,
    Cancel,
    Quit,
}

const ACTION_COUNT: usize = 9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveLeft => 0,
            InputAction::MoveRight => 1,
            InputAction::MoveUp => 2,
            InputAction::MoveDown => 3,
            InputAction::Jump => 4,
            InputAction::Confirm => 5,
            InputAction::AltConfirm => 6,
            InputAction::Cancel => 7,
            InputAction::Quit => 8,
        }
    }
}

/// One tick of input. `down` reflects held keys; `pressed` holds the
/// rising edges seen since the previous tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    down: ActionStates,
    pressed: ActionStates,
    digit_pressed: Option<u8>,
    pointer_click_px: Option<Vec2>,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.down.is_down(action)
    }

    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed.is_down(action)
    }

    pub fn digit_pressed(&self) -> Option<u8> {
        self.digit_pressed
    }

    pub fn pointer_click_px(&self) -> Option<Vec2> {
        self.pointer_click_px
    }

    pub fn quit_requested(&self) -> bool {
        self.was_pressed(InputAction::Quit)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.down.set(action, is_down);
        self
    }

    /// Marks a key as both pressed this tick and held.
    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.pressed.set(action, true);
        self.down.set(action, true);
        self
    }

    pub fn with_digit_pressed(mut self, digit: Option<u8>) -> Self {
        self.digit_pressed = digit;
        self
    }

    pub fn with_pointer_click_px(mut self, position: Option<Vec2>) -> Self {
        self.pointer_click_px = position;
        self
    }
}

/// Supplies the loop with one snapshot per simulation tick.
pub trait InputSource {
    fn snapshot_for_tick(&mut self, tick: u64, active_scene: SceneKey) -> InputSnapshot;
}

/// Input source that never presses anything.
#[derive(Debug, Default)]
pub struct IdleInput;

impl InputSource for IdleInput {
    fn snapshot_for_tick(&mut self, _tick: u64, _active_scene: SceneKey) -> InputSnapshot {
        InputSnapshot::empty()
    }
}
