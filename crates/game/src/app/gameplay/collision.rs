use engine::{BodyGroup, Contact, PhysicsWorld};
use tracing::debug;

use super::collectibles::{Castle, Coin, Heart, Key};
use super::enemy::Enemy;
use super::events::{StageEvent, StageEventBus};
use super::player::{Player, PlayerState};
use super::pool::{EntityPool, SpawnedEntity};

pub(crate) const PLAYER: BodyGroup = BodyGroup("player");
pub(crate) const PLATFORM: BodyGroup = BodyGroup("platform");
pub(crate) const ENEMY: BodyGroup = BodyGroup("enemy");
pub(crate) const COIN: BodyGroup = BodyGroup("coin");
pub(crate) const HEART: BodyGroup = BodyGroup("heart");
pub(crate) const KEY: BodyGroup = BodyGroup("key");
pub(crate) const CASTLE: BodyGroup = BodyGroup("castle");

/// Everything the dispatcher needs to resolve a contact into an event.
pub(crate) struct CollisionTargets<'a> {
    pub(crate) player: &'a Player,
    pub(crate) coins: &'a EntityPool<Coin>,
    pub(crate) hearts: &'a EntityPool<Heart>,
    pub(crate) keys: &'a EntityPool<Key>,
    pub(crate) enemies: &'a EntityPool<Enemy>,
    pub(crate) castle: Option<&'a Castle>,
}

/// Registers the stage's collider and overlap pairs.
pub(crate) fn register(physics: &mut PhysicsWorld) {
    physics.add_collider(PLAYER, PLATFORM);
    physics.add_collider(ENEMY, PLATFORM);
    physics.add_collider(ENEMY, ENEMY);

    physics.add_overlap(PLAYER, COIN);
    physics.add_overlap(PLAYER, HEART);
    physics.add_overlap(PLAYER, KEY);
    physics.add_overlap(PLAYER, ENEMY);
    physics.add_overlap(PLAYER, CASTLE);
}

/// Turns raw player overlaps into stage events. Emits at most one event per
/// contact and never mutates game state. Returns the number of events emitted.
pub(crate) fn dispatch(
    contacts: &[Contact],
    physics: &PhysicsWorld,
    targets: &CollisionTargets<'_>,
    events: &mut StageEventBus,
) -> usize {
    let player_body = targets.player.body();
    let mut emitted = 0;

    for contact in contacts {
        if contact.a != player_body {
            continue;
        }
        let Some(other) = physics.body(contact.b) else {
            continue;
        };

        let event = match other.group {
            COIN => targets
                .coins
                .slot_of(other.id)
                .filter(|&slot| is_active(targets.coins, slot))
                .map(|coin| StageEvent::CoinCollected { coin }),
            HEART => targets
                .hearts
                .slot_of(other.id)
                .filter(|&slot| is_active(targets.hearts, slot))
                .map(|heart| StageEvent::HeartCollected { heart }),
            KEY => targets
                .keys
                .slot_of(other.id)
                .filter(|&slot| is_active(targets.keys, slot))
                .map(|key| StageEvent::KeyCollected { key }),
            ENEMY => enemy_event(targets, other.id, player_body),
            CASTLE => targets
                .castle
                .filter(|castle| castle.body() == other.id && castle.is_active())
                .map(|_| StageEvent::CastleCollided),
            _ => None,
        };

        if let Some(event) = event {
            events.emit(event);
            emitted += 1;
        }
    }

    emitted
}

fn enemy_event(
    targets: &CollisionTargets<'_>,
    enemy_body: engine::BodyId,
    player_body: engine::BodyId,
) -> Option<StageEvent> {
    let state = targets.player.state();
    if matches!(state, PlayerState::Dead | PlayerState::Invincible) {
        debug!(state = state.as_token(), "enemy_contact_suppressed");
        return None;
    }
    let slot = targets.enemies.slot_of(enemy_body)?;
    if !is_active(targets.enemies, slot) {
        return None;
    }
    Some(StageEvent::EnemyCollided {
        player: player_body,
        enemy: slot,
    })
}

fn is_active<T: SpawnedEntity>(pool: &EntityPool<T>, slot: super::pool::SlotId) -> bool {
    pool.get(slot).is_some_and(SpawnedEntity::is_active)
}
