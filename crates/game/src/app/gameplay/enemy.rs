use engine::{BodyId, MapObject, PhysicsWorld};
use rand::Rng;

use super::ai::AiController;
use super::pool::SpawnedEntity;

pub(crate) const DEFAULT_ENEMY_SPEED: f32 = 60.0;
pub(crate) const DEFAULT_ENEMY_HEALTH: u32 = 1;
pub(crate) const DEFAULT_ENEMY_DAMAGE: u32 = 1;

/// Holds the numbers an encounter needs and delegates movement to its
/// controller. Health is changed from outside; the enemy never removes itself.
#[derive(Debug)]
pub(crate) struct Enemy {
    body: BodyId,
    active: bool,
    speed: f32,
    spawn_health: u32,
    health: u32,
    damage: u32,
    category: Option<String>,
    ai: Option<AiController>,
}

impl Enemy {
    pub(crate) fn new(body: BodyId) -> Self {
        Self {
            body,
            active: false,
            speed: DEFAULT_ENEMY_SPEED,
            spawn_health: DEFAULT_ENEMY_HEALTH,
            health: DEFAULT_ENEMY_HEALTH,
            damage: DEFAULT_ENEMY_DAMAGE,
            category: None,
            ai: None,
        }
    }

    /// Resets health and attaches `ai`, replacing any previous controller.
    pub(crate) fn initialize(&mut self, ai: AiController) {
        self.health = self.spawn_health;
        self.ai = Some(ai);
        self.active = true;
    }

    pub(crate) fn update<R: Rng + ?Sized>(
        &mut self,
        dt_ms: f32,
        physics: &mut PhysicsWorld,
        rng: &mut R,
    ) {
        if !self.active {
            return;
        }
        let Some(ai) = self.ai.as_mut() else {
            return;
        };
        let Some(body) = physics.body_mut(self.body) else {
            return;
        };
        ai.update(body, self.speed, dt_ms, rng);
    }

    #[cfg(test)]
    pub(crate) fn speed(&self) -> f32 {
        self.speed
    }

    #[cfg(test)]
    pub(crate) fn health(&self) -> u32 {
        self.health
    }

    pub(crate) fn set_health(&mut self, health: u32) {
        self.health = health;
    }

    pub(crate) fn damage(&self) -> u32 {
        self.damage
    }

    pub(crate) fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[cfg(test)]
    pub(crate) fn ai(&self) -> Option<&AiController> {
        self.ai.as_ref()
    }
}

impl SpawnedEntity for Enemy {
    fn body(&self) -> BodyId {
        self.body
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn late_init(&mut self, object: &MapObject) {
        self.speed = object.number_or("speed", DEFAULT_ENEMY_SPEED).max(0.0);
        self.spawn_health = object.integer_or("health", DEFAULT_ENEMY_HEALTH);
        self.health = self.spawn_health;
        self.damage = object.integer_or("damage", DEFAULT_ENEMY_DAMAGE);
        self.category = object.string("category").map(ToString::to_string);
    }
}

#[cfg(test)]
mod tests {
    use engine::{BodyDesc, BodyGroup, Rect, Vec2};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    use super::super::ai::{Axis, PatrolController, WanderController};
    use super::*;

    fn spawned(physics: &mut PhysicsWorld, properties: serde_json::Value) -> Enemy {
        let body = physics.spawn_body(
            BodyDesc::dynamic(BodyGroup("enemy"), Vec2::new(40.0, 40.0), Vec2::new(10.0, 10.0))
                .with_gravity(false),
        );
        let object: MapObject = serde_json::from_value(json!({
            "type": "enemy",
            "x": 40,
            "y": 40,
            "properties": properties
        }))
        .expect("object");
        let mut enemy = Enemy::new(body);
        enemy.set_active(true);
        enemy.late_init(&object);
        enemy
    }

    #[test]
    fn late_init_reads_properties() {
        let mut physics = PhysicsWorld::default();
        let enemy = spawned(
            &mut physics,
            json!({"speed": 35, "health": 3, "damage": 2, "category": "science"}),
        );
        assert_eq!(enemy.speed(), 35.0);
        assert_eq!(enemy.health(), 3);
        assert_eq!(enemy.damage(), 2);
        assert_eq!(enemy.category(), Some("science"));
    }

    #[test]
    fn initialize_resets_health_and_swaps_controller() {
        let mut physics = PhysicsWorld::default();
        let mut enemy = spawned(&mut physics, json!({"health": 2}));
        enemy.initialize(AiController::Patrol(PatrolController::with_direction(
            40.0,
            10.0,
            Axis::X,
            1.0,
        )));
        enemy.set_health(0);

        enemy.initialize(AiController::Wander(WanderController::new(Rect::new(
            0.0, 0.0, 100.0, 100.0,
        ))));
        assert_eq!(enemy.health(), 2);
        assert_eq!(enemy.ai().map(AiController::kind_name), Some("wander"));
    }

    #[test]
    fn inactive_enemy_does_not_move() {
        let mut physics = PhysicsWorld::default();
        let mut enemy = spawned(&mut physics, json!({"speed": 50}));
        enemy.initialize(AiController::Patrol(PatrolController::with_direction(
            40.0,
            10.0,
            Axis::X,
            1.0,
        )));
        let mut rng = StdRng::seed_from_u64(0);

        enemy.update(16.0, &mut physics, &mut rng);
        assert_eq!(physics.body(enemy.body()).expect("body").velocity.x, 50.0);

        physics.body_mut(enemy.body()).expect("body").velocity = Vec2::default();
        enemy.set_active(false);
        enemy.update(16.0, &mut physics, &mut rng);
        assert_eq!(physics.body(enemy.body()).expect("body").velocity.x, 0.0);
    }
}
