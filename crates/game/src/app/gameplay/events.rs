use std::collections::VecDeque;

use engine::BodyId;

use super::player::PlayerState;
use super::pool::SlotId;

/// Semantic events raised inside one stage session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StageEvent {
    CoinCollected { coin: SlotId },
    HeartCollected { heart: SlotId },
    KeyCollected { key: SlotId },
    EnemyCollided { player: BodyId, enemy: SlotId },
    CastleCollided,
    QuizCompleted { is_correct: bool },
    StateChanged { new: PlayerState, old: PlayerState },
    DeathAnimationComplete,
}

impl StageEvent {
    pub(crate) fn kind(self) -> StageEventKind {
        match self {
            Self::CoinCollected { .. } => StageEventKind::CoinCollected,
            Self::HeartCollected { .. } => StageEventKind::HeartCollected,
            Self::KeyCollected { .. } => StageEventKind::KeyCollected,
            Self::EnemyCollided { .. } => StageEventKind::EnemyCollided,
            Self::CastleCollided => StageEventKind::CastleCollided,
            Self::QuizCompleted { .. } => StageEventKind::QuizCompleted,
            Self::StateChanged { .. } => StageEventKind::StateChanged,
            Self::DeathAnimationComplete => StageEventKind::DeathAnimationComplete,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum StageEventKind {
    CoinCollected,
    HeartCollected,
    KeyCollected,
    EnemyCollided,
    CastleCollided,
    QuizCompleted,
    StateChanged,
    DeathAnimationComplete,
}

impl StageEventKind {
    /// Stable event name used in logs.
    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::CoinCollected => "coin-collected",
            Self::HeartCollected => "heart-collected",
            Self::KeyCollected => "key-collected",
            Self::EnemyCollided => "enemy-collided",
            Self::CastleCollided => "castle-collided",
            Self::QuizCompleted => "quiz-completed",
            Self::StateChanged => "state-changed",
            Self::DeathAnimationComplete => "death-animation-complete",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct StageEventCounts {
    pub(crate) total: u32,
    pub(crate) coin_collected: u32,
    pub(crate) heart_collected: u32,
    pub(crate) key_collected: u32,
    pub(crate) enemy_collided: u32,
    pub(crate) castle_collided: u32,
    pub(crate) quiz_completed: u32,
    pub(crate) state_changed: u32,
    pub(crate) death_animation_complete: u32,
}

impl StageEventCounts {
    fn record(&mut self, kind: StageEventKind) {
        let slot = match kind {
            StageEventKind::CoinCollected => &mut self.coin_collected,
            StageEventKind::HeartCollected => &mut self.heart_collected,
            StageEventKind::KeyCollected => &mut self.key_collected,
            StageEventKind::EnemyCollided => &mut self.enemy_collided,
            StageEventKind::CastleCollided => &mut self.castle_collided,
            StageEventKind::QuizCompleted => &mut self.quiz_completed,
            StageEventKind::StateChanged => &mut self.state_changed,
            StageEventKind::DeathAnimationComplete => &mut self.death_animation_complete,
        };
        *slot = slot.saturating_add(1);
        self.total = self.total.saturating_add(1);
    }

    pub(crate) fn get(&self, kind: StageEventKind) -> u32 {
        match kind {
            StageEventKind::CoinCollected => self.coin_collected,
            StageEventKind::HeartCollected => self.heart_collected,
            StageEventKind::KeyCollected => self.key_collected,
            StageEventKind::EnemyCollided => self.enemy_collided,
            StageEventKind::CastleCollided => self.castle_collided,
            StageEventKind::QuizCompleted => self.quiz_completed,
            StageEventKind::StateChanged => self.state_changed,
            StageEventKind::DeathAnimationComplete => self.death_animation_complete,
        }
    }
}

/// FIFO of pending events. Handlers may emit while the queue drains; the
/// new events are handled in the same tick.
#[derive(Debug, Default)]
pub(crate) struct StageEventBus {
    pending: VecDeque<StageEvent>,
    current_tick_counts: StageEventCounts,
    last_tick_counts: StageEventCounts,
}

impl StageEventBus {
    pub(crate) fn emit(&mut self, event: StageEvent) {
        self.current_tick_counts.record(event.kind());
        self.pending.push_back(event);
    }

    pub(crate) fn next(&mut self) -> Option<StageEvent> {
        self.pending.pop_front()
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub(crate) fn current_tick_counts(&self) -> StageEventCounts {
        self.current_tick_counts
    }

    pub(crate) fn finish_tick_rollover(&mut self) {
        self.last_tick_counts = self.current_tick_counts;
        self.current_tick_counts = StageEventCounts::default();
    }

    pub(crate) fn last_tick_counts(&self) -> StageEventCounts {
        self.last_tick_counts
    }
}
