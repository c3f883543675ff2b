use std::f32::consts::TAU;

use engine::{Body, Rect, Vec2};
use rand::Rng;

pub(crate) const WANDER_REDIRECT_INTERVAL_MS: f32 = 5000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    X,
    Y,
}

impl Axis {
    pub(crate) fn parse(token: &str) -> Option<Self> {
        match token {
            "x" | "X" => Some(Self::X),
            "y" | "Y" => Some(Self::Y),
            _ => None,
        }
    }
}

/// Oscillates along one axis between `initial_position ± range`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PatrolController {
    initial_position: f32,
    range: f32,
    axis: Axis,
    direction: f32,
}

impl PatrolController {
    pub(crate) fn new<R: Rng + ?Sized>(
        initial_position: f32,
        range: f32,
        axis: Axis,
        rng: &mut R,
    ) -> Self {
        let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        Self::with_direction(initial_position, range, axis, direction)
    }

    pub(crate) fn with_direction(
        initial_position: f32,
        range: f32,
        axis: Axis,
        direction: f32,
    ) -> Self {
        Self {
            initial_position,
            range: range.abs(),
            axis,
            direction: if direction < 0.0 { -1.0 } else { 1.0 },
        }
    }

    #[cfg(test)]
    pub(crate) fn direction(&self) -> f32 {
        self.direction
    }

    fn update(&mut self, body: &mut Body, speed: f32) {
        let position = match self.axis {
            Axis::X => body.position.x,
            Axis::Y => body.position.y,
        };
        if position <= self.initial_position - self.range {
            self.direction = 1.0;
        } else if position >= self.initial_position + self.range {
            self.direction = -1.0;
        }
        match self.axis {
            Axis::X => body.velocity.x = speed * self.direction,
            Axis::Y => body.velocity.y = speed * self.direction,
        }
    }
}

/// Random heading every [`WANDER_REDIRECT_INTERVAL_MS`], reflected off
/// `bounds` and off anything that blocks the body.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WanderController {
    bounds: Rect,
    timer_ms: f32,
    /// Unit direction. Kept here because a blocked body loses the velocity
    /// component it was blocked on.
    heading: Vec2,
}

impl WanderController {
    pub(crate) fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            timer_ms: 0.0,
            heading: Vec2::default(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_heading(bounds: Rect, heading: Vec2, timer_ms: f32) -> Self {
        Self {
            bounds,
            timer_ms,
            heading,
        }
    }

    #[cfg(test)]
    pub(crate) fn bounds(&self) -> Rect {
        self.bounds
    }

    fn update<R: Rng + ?Sized>(&mut self, body: &mut Body, speed: f32, dt_ms: f32, rng: &mut R) {
        self.timer_ms -= dt_ms;
        if self.timer_ms <= 0.0 {
            let angle = rng.gen_range(0.0..TAU);
            self.heading = Vec2::new(angle.cos(), angle.sin());
            self.timer_ms = WANDER_REDIRECT_INTERVAL_MS;
        }

        if !self.bounds.contains_rect(&body.bounds()) || body.blocked.any() {
            self.correct_course(body);
        }

        body.velocity = Vec2::new(self.heading.x * speed, self.heading.y * speed);
    }

    fn correct_course(&mut self, body: &mut Body) {
        let bounds = self.bounds;
        let mut area = body.bounds();

        if area.left() < bounds.left() || body.blocked.left {
            self.heading.x = self.heading.x.abs();
        } else if area.right() > bounds.right() || body.blocked.right {
            self.heading.x = -self.heading.x.abs();
        }
        if area.top() < bounds.top() || body.blocked.up {
            self.heading.y = self.heading.y.abs();
        } else if area.bottom() > bounds.bottom() || body.blocked.down {
            self.heading.y = -self.heading.y.abs();
        }

        area.x = area.x.clamp(bounds.left(), (bounds.right() - area.width).max(bounds.left()));
        area.y = area.y.clamp(bounds.top(), (bounds.bottom() - area.height).max(bounds.top()));
        body.position = Vec2::new(area.x, area.y);
    }
}

/// Exactly one strategy per enemy, chosen when the enemy is initialised.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AiController {
    Patrol(PatrolController),
    Wander(WanderController),
}

impl AiController {
    /// Sets the body's velocity for this tick. Disabled bodies are left alone.
    pub(crate) fn update<R: Rng + ?Sized>(
        &mut self,
        body: &mut Body,
        speed: f32,
        dt_ms: f32,
        rng: &mut R,
    ) {
        if !body.enabled {
            return;
        }
        match self {
            Self::Patrol(patrol) => patrol.update(body, speed),
            Self::Wander(wander) => wander.update(body, speed, dt_ms, rng),
        }
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Self::Patrol(_) => "patrol",
            Self::Wander(_) => "wander",
        }
    }
}

#[cfg(test)]
mod tests {
    use engine::{BodyDesc, BodyGroup, PhysicsWorld};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    const ENEMY: BodyGroup = BodyGroup("enemy");

    fn flying_enemy(physics: &mut PhysicsWorld, position: Vec2) -> engine::BodyId {
        physics.spawn_body(
            BodyDesc::dynamic(ENEMY, position, Vec2::new(10.0, 10.0))
                .with_gravity(false)
                .with_world_bounds(false),
        )
    }

    #[test]
    fn patrol_flips_at_range_extremes() {
        let mut physics = PhysicsWorld::default();
        let id = flying_enemy(&mut physics, Vec2::new(100.0, 0.0));
        let mut ai =
            AiController::Patrol(PatrolController::with_direction(100.0, 20.0, Axis::X, 1.0));
        let mut rng = StdRng::seed_from_u64(1);

        let mut saw_left = false;
        let mut saw_right = false;
        for _ in 0..200 {
            let body = physics.body_mut(id).expect("enemy");
            ai.update(body, 40.0, 16.0, &mut rng);
            saw_left |= body.velocity.x < 0.0;
            saw_right |= body.velocity.x > 0.0;
            physics.step(0.016);
            let x = physics.body(id).expect("enemy").position.x;
            assert!((100.0 - 21.0..=100.0 + 21.0).contains(&x), "x = {x}");
        }
        assert!(saw_left && saw_right);
    }

    #[test]
    fn patrol_on_vertical_axis_leaves_horizontal_velocity() {
        let mut physics = PhysicsWorld::default();
        let id = flying_enemy(&mut physics, Vec2::new(0.0, 50.0));
        let body = physics.body_mut(id).expect("enemy");
        body.velocity.x = 7.0;
        let mut patrol = PatrolController::with_direction(50.0, 10.0, Axis::Y, -1.0);
        patrol.update(body, 30.0);
        assert_eq!(body.velocity, Vec2::new(7.0, -30.0));
        assert_eq!(patrol.direction(), -1.0);
    }

    #[test]
    fn patrol_initial_direction_is_random_but_signed() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..16 {
            let patrol = PatrolController::new(0.0, 10.0, Axis::X, &mut rng);
            assert!(patrol.direction() == 1.0 || patrol.direction() == -1.0);
        }
    }

    #[test]
    fn wander_assigns_velocity_on_first_tick() {
        let mut physics = PhysicsWorld::default();
        let id = flying_enemy(&mut physics, Vec2::new(50.0, 50.0));
        let mut ai = AiController::Wander(WanderController::new(Rect::new(0.0, 0.0, 200.0, 200.0)));
        let mut rng = StdRng::seed_from_u64(3);

        let body = physics.body_mut(id).expect("enemy");
        ai.update(body, 50.0, 16.0, &mut rng);
        let speed = (body.velocity.x.powi(2) + body.velocity.y.powi(2)).sqrt();
        assert!((speed - 50.0).abs() < 1e-3, "speed = {speed}");
    }

    #[test]
    fn wander_reflects_when_crossing_right_edge() {
        let mut physics = PhysicsWorld::default();
        let id = flying_enemy(&mut physics, Vec2::new(190.0, 50.0));
        let bounds = Rect::new(0.0, 0.0, 200.0, 100.0);
        let mut ai = AiController::Wander(WanderController::with_heading(
            bounds,
            Vec2::new(1.0, 0.0),
            WANDER_REDIRECT_INTERVAL_MS,
        ));
        let mut rng = StdRng::seed_from_u64(5);
        physics.body_mut(id).expect("enemy").velocity = Vec2::new(50.0, 0.0);

        physics.step(0.3);
        let body = physics.body_mut(id).expect("enemy");
        assert!(body.bounds().right() >= 205.0);

        ai.update(body, 50.0, 300.0, &mut rng);
        assert!(body.bounds().right() <= 200.0);
        assert!(body.position.x <= 200.0);
        assert!(body.velocity.x < 0.0);
    }

    #[test]
    fn wander_reflects_off_blocked_side() {
        let mut physics = PhysicsWorld::default();
        let id = flying_enemy(&mut physics, Vec2::new(50.0, 50.0));
        let mut ai = AiController::Wander(WanderController::with_heading(
            Rect::new(0.0, 0.0, 200.0, 200.0),
            Vec2::new(0.0, 1.0),
            WANDER_REDIRECT_INTERVAL_MS,
        ));
        let mut rng = StdRng::seed_from_u64(5);
        let body = physics.body_mut(id).expect("enemy");
        body.blocked.down = true;
        body.velocity = Vec2::default();

        ai.update(body, 40.0, 16.0, &mut rng);
        assert_eq!(body.velocity, Vec2::new(0.0, -40.0));
    }

    #[test]
    fn wander_stays_inside_bounds_over_many_ticks() {
        let mut physics = PhysicsWorld::default();
        let bounds = Rect::new(0.0, 0.0, 200.0, 100.0);
        let id = flying_enemy(&mut physics, Vec2::new(95.0, 45.0));
        let mut ai = AiController::Wander(WanderController::new(bounds));
        let mut rng = StdRng::seed_from_u64(11);

        for tick in 0..5_000 {
            physics.step(1.0 / 60.0);
            let body = physics.body_mut(id).expect("enemy");
            ai.update(body, 120.0, 1000.0 / 60.0, &mut rng);
            assert!(
                bounds.contains_rect(&body.bounds()),
                "tick {tick}: escaped to {:?}",
                body.bounds()
            );
        }
    }

    #[test]
    fn disabled_body_is_left_untouched() {
        let mut physics = PhysicsWorld::default();
        let id = flying_enemy(&mut physics, Vec2::new(50.0, 50.0));
        physics.set_enabled(id, false);
        let mut ai = AiController::Wander(WanderController::new(Rect::new(0.0, 0.0, 10.0, 10.0)));
        let mut rng = StdRng::seed_from_u64(5);
        let body = physics.body_mut(id).expect("enemy");
        ai.update(body, 50.0, 16.0, &mut rng);
        assert_eq!(body.velocity, Vec2::default());
        assert_eq!(body.position, Vec2::new(50.0, 50.0));
    }
}
