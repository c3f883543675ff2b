use engine::{
    BodyDesc, Contact, InputAction, InputSnapshot, LaunchData, LevelData, MapObject, Rect, Scene,
    SceneCommand, SceneKey, SceneMessage, SceneWorld, Vec2,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::ai::{AiController, Axis, PatrolController, WanderController};
use super::collectibles::{Castle, Coin, Heart, Key};
use super::collision::{self, CollisionTargets, CASTLE, COIN, ENEMY, HEART, KEY, PLATFORM, PLAYER};
use super::enemy::Enemy;
use super::events::{StageEvent, StageEventBus};
use super::player::{MoveInput, Player};
use super::pool::{EntityPool, SlotId, SpawnedEntity};
use crate::app::config::GameConfig;

const DEFAULT_PLATFORM_SIZE: Vec2 = Vec2::new(32.0, 32.0);
const PLAYER_SIZE: Vec2 = Vec2::new(24.0, 32.0);
const ENEMY_SIZE: Vec2 = Vec2::new(28.0, 28.0);
const PICKUP_SIZE: Vec2 = Vec2::new(16.0, 16.0);
const CASTLE_SIZE: Vec2 = Vec2::new(64.0, 64.0);
const DEFAULT_PATROL_RANGE: f32 = 64.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StageOutcome {
    Cleared,
}

/// Runtime state of one stage attempt. Rebuilt from the level on every load.
#[derive(Debug)]
pub(crate) struct StageSession {
    player: Player,
    coins: EntityPool<Coin>,
    hearts: EntityPool<Heart>,
    keys: EntityPool<Key>,
    enemies: EntityPool<Enemy>,
    castle: Option<Castle>,
    events: StageEventBus,
    score: u32,
    collected_keys: Vec<String>,
    encounter: Option<SlotId>,
    castle_locked_reported: bool,
    pending_command: Option<SceneCommand>,
    outcome: Option<StageOutcome>,
}

impl StageSession {
    fn build<R: Rng + ?Sized>(
        level: &LevelData,
        config: &GameConfig,
        world: &mut SceneWorld,
        rng: &mut R,
    ) -> Self {
        let level_bounds = Rect::new(0.0, 0.0, level.width, level.height);
        let physics = world.physics_mut();
        physics.set_gravity(Vec2::new(0.0, config.gravity));
        physics.set_world_bounds(Some(level_bounds));
        collision::register(physics);

        let mut player_spawn: Option<&MapObject> = None;
        let mut coins = EntityPool::default();
        let mut hearts = EntityPool::default();
        let mut keys = EntityPool::default();
        let mut enemies = EntityPool::<Enemy>::default();
        let mut castle: Option<Castle> = None;

        for object in &level.objects {
            let position = Vec2::new(object.x, object.y);
            match object.kind.as_str() {
                "player" => {
                    if player_spawn.is_some() {
                        warn!(x = object.x, y = object.y, "duplicate_player_object_ignored");
                    } else {
                        player_spawn = Some(object);
                    }
                }
                "platform" => {
                    physics.spawn_body(BodyDesc::fixed(
                        PLATFORM,
                        position,
                        object_size(object, DEFAULT_PLATFORM_SIZE),
                    ));
                }
                "coin" => {
                    let desc = BodyDesc::fixed(COIN, position, object_size(object, PICKUP_SIZE));
                    coins.spawn(physics, desc, object, Coin::new);
                }
                "heart" => {
                    let desc = BodyDesc::fixed(HEART, position, object_size(object, PICKUP_SIZE));
                    hearts.spawn(physics, desc, object, Heart::new);
                }
                "key" => {
                    let desc = BodyDesc::fixed(KEY, position, object_size(object, PICKUP_SIZE));
                    keys.spawn(physics, desc, object, Key::new);
                }
                "castle" => {
                    if castle.is_some() {
                        warn!(x = object.x, y = object.y, "duplicate_castle_object_ignored");
                        continue;
                    }
                    let body = physics.spawn_body(BodyDesc::fixed(
                        CASTLE,
                        position,
                        object_size(object, CASTLE_SIZE),
                    ));
                    let mut spawned = Castle::new(body);
                    spawned.set_active(true);
                    spawned.late_init(object);
                    castle = Some(spawned);
                }
                "enemy" => {
                    let desc = BodyDesc::dynamic(ENEMY, position, object_size(object, ENEMY_SIZE))
                        .with_gravity(false);
                    let slot = enemies.spawn(physics, desc, object, Enemy::new);
                    let ai = build_ai(object, position, level_bounds, rng);
                    if let Some(enemy) = enemies.get_mut(slot) {
                        debug!(slot = slot.0, ai = ai.kind_name(), "enemy_spawned");
                        enemy.initialize(ai);
                    }
                }
                other => {
                    warn!(kind = other, x = object.x, y = object.y, "map_object_skipped");
                }
            }
        }

        let Some(spawn) = player_spawn else {
            panic!("level '{}' has no player object", config.level);
        };
        let body = physics.spawn_body(BodyDesc::dynamic(
            PLAYER,
            Vec2::new(spawn.x, spawn.y),
            PLAYER_SIZE,
        ));

        Self {
            player: Player::new(body, &config.player),
            coins,
            hearts,
            keys,
            enemies,
            castle,
            events: StageEventBus::default(),
            score: 0,
            collected_keys: Vec::new(),
            encounter: None,
            castle_locked_reported: false,
            pending_command: None,
            outcome: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn player(&self) -> &Player {
        &self.player
    }

    #[cfg(test)]
    pub(crate) fn enemies(&self) -> &EntityPool<Enemy> {
        &self.enemies
    }

    #[cfg(test)]
    pub(crate) fn score(&self) -> u32 {
        self.score
    }

    #[cfg(test)]
    pub(crate) fn collected_keys(&self) -> &[String] {
        &self.collected_keys
    }

    #[cfg(test)]
    pub(crate) fn encounter(&self) -> Option<SlotId> {
        self.encounter
    }

    #[cfg(test)]
    pub(crate) fn outcome(&self) -> Option<StageOutcome> {
        self.outcome
    }

    #[cfg(test)]
    pub(crate) fn last_tick_counts(&self) -> super::events::StageEventCounts {
        self.events.last_tick_counts()
    }

    fn dispatch_contacts(&mut self, contacts: &[Contact], world: &SceneWorld) {
        let targets = CollisionTargets {
            player: &self.player,
            coins: &self.coins,
            hearts: &self.hearts,
            keys: &self.keys,
            enemies: &self.enemies,
            castle: self.castle.as_ref(),
        };
        collision::dispatch(contacts, world.physics(), &targets, &mut self.events);
    }

    fn handle_events(&mut self, world: &mut SceneWorld, config: &GameConfig) {
        while let Some(event) = self.events.next() {
            debug!(event = event.kind().name(), "stage_event");
            match event {
                StageEvent::CoinCollected { coin } => self.collect_coin(coin, world),
                StageEvent::HeartCollected { heart } => self.collect_heart(heart, world),
                StageEvent::KeyCollected { key } => self.collect_key(key, world),
                StageEvent::EnemyCollided { player, enemy } => {
                    if player == self.player.body() {
                        self.begin_encounter(enemy, world, config);
                    }
                }
                StageEvent::CastleCollided => self.reach_castle(),
                StageEvent::QuizCompleted { is_correct } => {
                    self.finish_encounter(is_correct, world)
                }
                StageEvent::StateChanged { new, old } => {
                    debug!(new = new.as_token(), old = old.as_token(), "player_state_observed");
                }
                StageEvent::DeathAnimationComplete => {
                    info!(score = self.score, "game_over");
                    self.pending_command = Some(SceneCommand::HardResetTo(SceneKey::Stage));
                }
            }
        }
    }

    fn collect_coin(&mut self, slot: SlotId, world: &mut SceneWorld) {
        let value = self.coins.get(slot).map_or(0, Coin::value);
        if self.coins.release(slot, world.physics_mut()) {
            self.score = self.score.saturating_add(value);
            info!(value, score = self.score, "coin_collected");
        }
    }

    fn collect_heart(&mut self, slot: SlotId, world: &mut SceneWorld) {
        let amount = self.hearts.get(slot).map_or(0, Heart::heal_amount);
        if self.hearts.release(slot, world.physics_mut()) {
            self.player.heal(amount);
        }
    }

    fn collect_key(&mut self, slot: SlotId, world: &mut SceneWorld) {
        let Some(key_id) = self.keys.get(slot).map(|key| key.key_id().to_string()) else {
            return;
        };
        if self.keys.release(slot, world.physics_mut()) {
            info!(key = %key_id, keys = self.collected_keys.len() + 1, "key_collected");
            self.collected_keys.push(key_id);
            self.castle_locked_reported = false;
        }
    }

    fn begin_encounter(&mut self, slot: SlotId, world: &mut SceneWorld, config: &GameConfig) {
        if let Some(current) = self.encounter {
            debug!(enemy = slot.0, current = current.0, "enemy_contact_during_encounter");
            return;
        }
        let Some(enemy) = self.enemies.get(slot).filter(|enemy| enemy.is_active()) else {
            return;
        };
        let enemy_body = enemy.body();
        let category = enemy
            .category()
            .map(str::to_string)
            .or_else(|| config.quiz_category.clone());

        let launch = SceneCommand::Launch {
            key: SceneKey::Quiz,
            data: LaunchData::Quiz {
                category: category.clone(),
                return_key: SceneKey::Stage,
            },
        };
        if !self.request(launch) {
            return;
        }
        let physics = world.physics_mut();
        physics.set_enabled(self.player.body(), false);
        physics.set_enabled(enemy_body, false);
        self.encounter = Some(slot);
        info!(enemy = slot.0, category = ?category, "quiz_launched");
    }

    /// Applies the quiz verdict and hands control back: the player body is
    /// re-enabled here and nowhere else.
    fn finish_encounter(&mut self, is_correct: bool, world: &mut SceneWorld) {
        let Some(slot) = self.encounter.take() else {
            warn!(is_correct, "quiz_result_without_encounter");
            return;
        };
        world.physics_mut().set_enabled(self.player.body(), true);

        if is_correct {
            if let Some(enemy) = self.enemies.get_mut(slot) {
                enemy.set_health(0);
            }
            self.enemies.release(slot, world.physics_mut());
            info!(enemy = slot.0, "enemy_defeated");
            return;
        }

        let damage = match self.enemies.get(slot) {
            Some(enemy) => {
                world.physics_mut().set_enabled(enemy.body(), true);
                enemy.damage()
            }
            None => 0,
        };
        info!(enemy = slot.0, damage, "quiz_failed");
        self.player.damage(damage, world, &mut self.events);
    }

    fn reach_castle(&mut self) {
        let Some(castle) = self.castle.as_ref() else {
            return;
        };
        let keys = self.collected_keys.len();
        let required = castle.required_keys() as usize;
        if keys >= required {
            if self.outcome.is_none() && self.request(SceneCommand::Quit) {
                self.outcome = Some(StageOutcome::Cleared);
                info!(score = self.score, keys, "stage_cleared");
            }
        } else if !self.castle_locked_reported {
            self.castle_locked_reported = true;
            info!(keys, required, "castle_locked");
        }
    }

    /// Stores `command` for this tick. Returns false when another command is
    /// already pending; the caller retries on a later contact.
    fn request(&mut self, command: SceneCommand) -> bool {
        if let Some(pending) = &self.pending_command {
            debug!(pending = ?pending, dropped = ?command, "stage_command_dropped");
            return false;
        }
        self.pending_command = Some(command);
        true
    }
}

fn object_size(object: &MapObject, default: Vec2) -> Vec2 {
    Vec2::new(
        object.width.unwrap_or(default.x),
        object.height.unwrap_or(default.y),
    )
}

fn build_ai<R: Rng + ?Sized>(
    object: &MapObject,
    position: Vec2,
    level_bounds: Rect,
    rng: &mut R,
) -> AiController {
    match object.string("ai").unwrap_or("patrol") {
        "wander" => {
            let bounds = Rect::new(
                object.number_or("boundsX", level_bounds.x),
                object.number_or("boundsY", level_bounds.y),
                object.number_or("boundsWidth", level_bounds.width),
                object.number_or("boundsHeight", level_bounds.height),
            );
            AiController::Wander(WanderController::new(bounds))
        }
        kind => {
            if kind != "patrol" {
                warn!(ai = kind, "unknown_ai_defaulted_to_patrol");
            }
            let axis = object
                .string("axis")
                .and_then(Axis::parse)
                .unwrap_or(Axis::X);
            let origin = match axis {
                Axis::X => position.x,
                Axis::Y => position.y,
            };
            let range = object.number_or("range", DEFAULT_PATROL_RANGE);
            AiController::Patrol(PatrolController::new(origin, range, axis, rng))
        }
    }
}

fn move_input(input: &InputSnapshot) -> MoveInput {
    MoveInput {
        left: input.is_down(InputAction::MoveLeft),
        right: input.is_down(InputAction::MoveRight),
        jump: input.is_down(InputAction::Jump) || input.is_down(InputAction::MoveUp),
    }
}

fn try_resolve_level(world: &SceneWorld, key: &str) -> Result<LevelData, String> {
    let assets = world
        .assets()
        .ok_or_else(|| format!("no assets attached while loading level '{key}'"))?;
    assets.level(key).cloned().ok_or_else(|| {
        format!(
            "level '{key}' is not loaded (available: {:?})",
            assets.level_keys()
        )
    })
}

fn resolve_level(world: &SceneWorld, key: &str) -> LevelData {
    try_resolve_level(world, key).unwrap_or_else(|error| panic!("{error}"))
}

/// The platforming stage. Owns the session, wires contacts to events and
/// hands encounters over to the quiz scene.
pub(crate) struct StageScene {
    config: GameConfig,
    rng: StdRng,
    attempt: u32,
    session: Option<StageSession>,
}

impl StageScene {
    pub(crate) fn new(config: GameConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            rng,
            attempt: 0,
            session: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn session(&self) -> Option<&StageSession> {
        self.session.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn attempt(&self) -> u32 {
        self.attempt
    }
}

impl Scene for StageScene {
    fn load(&mut self, world: &mut SceneWorld, _data: &LaunchData) {
        let level = resolve_level(world, &self.config.level);
        let session = StageSession::build(&level, &self.config, world, &mut self.rng);
        self.attempt = self.attempt.saturating_add(1);
        info!(
            level = %self.config.level,
            attempt = self.attempt,
            coins = session.coins.active_count(),
            enemies = session.enemies.active_count(),
            keys = session.keys.active_count(),
            has_castle = session.castle.is_some(),
            "stage_loaded"
        );
        self.session = Some(session);
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        let Some(session) = self.session.as_mut() else {
            return SceneCommand::None;
        };
        let dt_ms = fixed_dt_seconds * 1000.0;

        let contacts = world.physics_mut().step(fixed_dt_seconds);
        session.dispatch_contacts(&contacts, world);
        session.handle_events(world, &self.config);

        let report = world.advance_time(dt_ms);
        for timer in report.fired_timers {
            session
                .player
                .on_timer_fired(timer, world, &mut session.events);
        }
        for tween in report.completed_tweens {
            session
                .player
                .on_tween_completed(tween, &mut session.events);
        }
        session.handle_events(world, &self.config);

        session.player.update(move_input(input), fixed_dt_seconds, world);
        for enemy in session.enemies.iter_active_mut() {
            enemy.update(dt_ms, world.physics_mut(), &mut self.rng);
        }

        session.events.finish_tick_rollover();
        session.pending_command.take().unwrap_or(SceneCommand::None)
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        if let Some(session) = self.session.take() {
            info!(
                score = session.score,
                keys = session.collected_keys.len(),
                "stage_unloaded"
            );
        }
    }

    fn pause(&mut self, _world: &mut SceneWorld) {
        debug!("stage_paused");
    }

    fn resume(&mut self, _world: &mut SceneWorld) {
        debug!("stage_resumed");
    }

    fn on_message(&mut self, message: SceneMessage, world: &mut SceneWorld) {
        let Some(session) = self.session.as_mut() else {
            warn!(message = ?message, "stage_message_without_session");
            return;
        };
        match message {
            SceneMessage::QuizCompleted { is_correct } => {
                session.events.emit(StageEvent::QuizCompleted { is_correct });
            }
        }
        session.handle_events(world, &self.config);
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        let session = self.session.as_ref()?;
        let event_counts = session.events.last_tick_counts();
        let event_line = format!(
            "ev: {} | evk: co:{} he:{} ke:{} en:{} ca:{} qc:{} sc:{}",
            event_counts.total,
            event_counts.coin_collected,
            event_counts.heart_collected,
            event_counts.key_collected,
            event_counts.enemy_collided,
            event_counts.castle_collided,
            event_counts.quiz_completed,
            event_counts.state_changed,
        );
        Some(format!(
            "hp {}/{} | score {} | keys {} | {} | {}",
            session.player.health(),
            session.player.max_health(),
            session.score,
            session.collected_keys.len(),
            session.player.animation_key(),
            event_line
        ))
    }
}
