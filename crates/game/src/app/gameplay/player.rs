use std::f32::consts::PI;

use engine::{BodyId, SceneWorld, TimerHandle, Tween, TweenHandle, TweenProperty, Vec2};
use tracing::{debug, info};

use super::events::{StageEvent, StageEventBus};
use crate::app::config::PlayerTuning;

pub(crate) const DEATH_ANIMATION_MS: f32 = 1500.0;
const BLINK_MIN_ALPHA: f32 = 0.2;
const DEATH_LAUNCH_UP: f32 = 320.0;
const DEATH_LAUNCH_SIDEWAYS: f32 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlayerState {
    Normal,
    Invincible,
    Dead,
}

impl PlayerState {
    pub(crate) fn as_token(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Invincible => "invincible",
            Self::Dead => "dead",
        }
    }
}

/// Facing used to pick the animation. Independent of [`PlayerState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Facing {
    Left,
    Right,
    Turn,
}

impl Facing {
    pub(crate) fn animation_key(self) -> &'static str {
        match self {
            Self::Left => "player-left",
            Self::Right => "player-right",
            Self::Turn => "player-turn",
        }
    }
}

/// Optional arguments for a state transition.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct TransitionData {
    /// Length of the invincibility window; ignored by other states.
    pub(crate) duration_ms: Option<f32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MoveInput {
    pub(crate) left: bool,
    pub(crate) right: bool,
    pub(crate) jump: bool,
}

#[derive(Debug)]
pub(crate) struct Player {
    body: BodyId,
    health: u32,
    max_health: u32,
    tuning: PlayerTuning,
    state: PlayerState,
    facing: Facing,
    invincibility_timer: Option<TimerHandle>,
    blink_tween: Option<TweenHandle>,
    death_tween: Option<TweenHandle>,
}

impl Player {
    pub(crate) fn new(body: BodyId, tuning: &PlayerTuning) -> Self {
        Self {
            body,
            health: tuning.max_health,
            max_health: tuning.max_health,
            tuning: tuning.clone(),
            state: PlayerState::Normal,
            facing: Facing::Turn,
            invincibility_timer: None,
            blink_tween: None,
            death_tween: None,
        }
    }

    pub(crate) fn body(&self) -> BodyId {
        self.body
    }

    pub(crate) fn health(&self) -> u32 {
        self.health
    }

    pub(crate) fn max_health(&self) -> u32 {
        self.max_health
    }

    pub(crate) fn state(&self) -> PlayerState {
        self.state
    }

    #[cfg(test)]
    pub(crate) fn facing(&self) -> Facing {
        self.facing
    }

    pub(crate) fn animation_key(&self) -> &'static str {
        self.facing.animation_key()
    }

    #[cfg(test)]
    pub(crate) fn invincibility_timer(&self) -> Option<TimerHandle> {
        self.invincibility_timer
    }

    pub(crate) fn damage(
        &mut self,
        amount: u32,
        world: &mut SceneWorld,
        events: &mut StageEventBus,
    ) {
        self.damage_with(amount, TransitionData::default(), world, events);
    }

    /// Applies damage unless the player is dead or invincible. A hit that
    /// leaves health at zero goes straight to `Dead`; any other hit opens an
    /// invincibility window configured by `data`.
    pub(crate) fn damage_with(
        &mut self,
        amount: u32,
        data: TransitionData,
        world: &mut SceneWorld,
        events: &mut StageEventBus,
    ) {
        if matches!(self.state, PlayerState::Dead | PlayerState::Invincible) {
            debug!(state = self.state.as_token(), amount, "player_damage_ignored");
            return;
        }
        self.health = self.health.saturating_sub(amount);
        info!(amount, health = self.health, "player_damaged");
        if self.health == 0 {
            self.transition_to_state(PlayerState::Dead, data, world, events);
        } else {
            self.transition_to_state(PlayerState::Invincible, data, world, events);
        }
    }

    pub(crate) fn heal(&mut self, amount: u32) {
        if self.state == PlayerState::Dead {
            return;
        }
        self.health = self.health.saturating_add(amount).min(self.max_health);
        info!(amount, health = self.health, "player_healed");
    }

    /// Returns `false` when nothing changed: same state, or already dead.
    pub(crate) fn transition_to_state(
        &mut self,
        new_state: PlayerState,
        data: TransitionData,
        world: &mut SceneWorld,
        events: &mut StageEventBus,
    ) -> bool {
        let old_state = self.state;
        if new_state == old_state || old_state == PlayerState::Dead {
            return false;
        }

        if old_state == PlayerState::Invincible {
            self.exit_invincible(world);
        }
        self.state = new_state;
        match new_state {
            PlayerState::Normal => {}
            PlayerState::Invincible => self.enter_invincible(data, world),
            PlayerState::Dead => self.enter_dead(world),
        }

        info!(
            new = new_state.as_token(),
            old = old_state.as_token(),
            health = self.health,
            "player_state_changed"
        );
        events.emit(StageEvent::StateChanged {
            new: new_state,
            old: old_state,
        });
        true
    }

    pub(crate) fn on_timer_fired(
        &mut self,
        handle: TimerHandle,
        world: &mut SceneWorld,
        events: &mut StageEventBus,
    ) {
        if self.invincibility_timer != Some(handle) {
            return;
        }
        self.invincibility_timer = None;
        self.transition_to_state(PlayerState::Normal, TransitionData::default(), world, events);
    }

    pub(crate) fn on_tween_completed(&mut self, handle: TweenHandle, events: &mut StageEventBus) {
        if self.death_tween != Some(handle) {
            return;
        }
        self.death_tween = None;
        info!("death_animation_complete");
        events.emit(StageEvent::DeathAnimationComplete);
    }

    pub(crate) fn update(
        &mut self,
        input: MoveInput,
        fixed_dt_seconds: f32,
        world: &mut SceneWorld,
    ) {
        if self.state == PlayerState::Dead {
            return;
        }
        let Some(body) = world.physics_mut().body_mut(self.body) else {
            return;
        };
        if !body.enabled {
            return;
        }

        let grounded = body.blocked.down;
        if input.left && !input.right {
            body.velocity.x = -self.tuning.speed;
            self.facing = Facing::Left;
        } else if input.right && !input.left {
            body.velocity.x = self.tuning.speed;
            self.facing = Facing::Right;
        } else if grounded {
            let step = self.tuning.friction * fixed_dt_seconds;
            body.velocity.x = if body.velocity.x.abs() <= step {
                0.0
            } else {
                body.velocity.x - step * body.velocity.x.signum()
            };
            self.facing = Facing::Turn;
        }

        if input.jump && grounded {
            body.velocity.y = -self.tuning.jump_force;
        }
    }

    fn enter_invincible(&mut self, data: TransitionData, world: &mut SceneWorld) {
        let blink = Tween::new(self.body, self.tuning.blink_half_cycle_ms)
            .track(TweenProperty::Alpha, 1.0, BLINK_MIN_ALPHA)
            .yoyo()
            .repeat_forever();
        self.blink_tween = Some(world.tweens_mut().add(blink));

        let duration_ms = data.duration_ms.unwrap_or(self.tuning.invincibility_ms);
        self.invincibility_timer = Some(world.timers_mut().schedule(duration_ms));
    }

    fn exit_invincible(&mut self, world: &mut SceneWorld) {
        if let Some(timer) = self.invincibility_timer.take() {
            world.timers_mut().cancel(timer);
        }
        if let Some(blink) = self.blink_tween.take() {
            world.tweens_mut().stop(blink);
        }
        if let Some(body) = world.physics_mut().body_mut(self.body) {
            body.alpha = 1.0;
        }
    }

    fn enter_dead(&mut self, world: &mut SceneWorld) {
        let sideways = match self.facing {
            Facing::Left => DEATH_LAUNCH_SIDEWAYS,
            Facing::Right | Facing::Turn => -DEATH_LAUNCH_SIDEWAYS,
        };
        if let Some(body) = world.physics_mut().body_mut(self.body) {
            body.collide_world_bounds = false;
            body.check_collision = false;
            body.allow_gravity = true;
            body.velocity = Vec2::new(sideways, -DEATH_LAUNCH_UP);
        }
        let spin = if sideways < 0.0 { -PI } else { PI };
        let fall = Tween::new(self.body, DEATH_ANIMATION_MS)
            .track(TweenProperty::Alpha, 1.0, 0.0)
            .track(TweenProperty::Rotation, 0.0, spin);
        self.death_tween = Some(world.tweens_mut().add(fall));
    }
}
