use super::scene::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub u64);

/// Named set of bodies used for collider/overlap registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyGroup(pub &'static str);

/// Axis aligned rectangle, `x`/`y` is the top-left corner, y grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Strict intersection: rectangles that only share an edge do not overlap.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blocked {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Blocked {
    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BodyDesc {
    pub group: BodyGroup,
    pub position: Vec2,
    pub size: Vec2,
    pub is_static: bool,
    pub allow_gravity: bool,
    pub collide_world_bounds: bool,
}

impl BodyDesc {
    pub fn dynamic(group: BodyGroup, position: Vec2, size: Vec2) -> Self {
        Self {
            group,
            position,
            size,
            is_static: false,
            allow_gravity: true,
            collide_world_bounds: true,
        }
    }

    pub fn fixed(group: BodyGroup, position: Vec2, size: Vec2) -> Self {
        Self {
            group,
            position,
            size,
            is_static: true,
            allow_gravity: false,
            collide_world_bounds: false,
        }
    }

    pub fn with_gravity(mut self, allow_gravity: bool) -> Self {
        self.allow_gravity = allow_gravity;
        self
    }

    pub fn with_world_bounds(mut self, collide_world_bounds: bool) -> Self {
        self.collide_world_bounds = collide_world_bounds;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: BodyId,
    pub group: BodyGroup,
    pub position: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    /// Disabled bodies are neither integrated nor reported in contacts.
    pub enabled: bool,
    pub is_static: bool,
    pub allow_gravity: bool,
    pub collide_world_bounds: bool,
    /// Participates in solid collision against registered collider groups.
    pub check_collision: bool,
    /// Sides that were blocked during the last step.
    pub blocked: Blocked,
    pub alpha: f32,
    pub rotation_radians: f32,
}

impl Body {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.size.x, self.size.y)
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.position.x + self.size.x * 0.5,
            y: self.position.y + self.size.y * 0.5,
        }
    }

    fn is_movable(&self) -> bool {
        self.enabled && !self.is_static
    }
}

/// Non-blocking overlap between a body of the first registered group (`a`)
/// and one of the second (`b`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub a: BodyId,
    pub b: BodyId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, Default)]
pub struct PhysicsWorld {
    bodies: Vec<Body>,
    gravity: Vec2,
    world_bounds: Option<Rect>,
    collider_pairs: Vec<(BodyGroup, BodyGroup)>,
    overlap_pairs: Vec<(BodyGroup, BodyGroup)>,
}

impl PhysicsWorld {
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn set_world_bounds(&mut self, bounds: Option<Rect>) {
        self.world_bounds = bounds;
    }

    pub fn world_bounds(&self) -> Option<Rect> {
        self.world_bounds
    }

    pub fn add_collider(&mut self, a: BodyGroup, b: BodyGroup) {
        if !self.collides(a, b) {
            self.collider_pairs.push((a, b));
        }
    }

    pub fn add_overlap(&mut self, a: BodyGroup, b: BodyGroup) {
        if !self.overlap_pairs.contains(&(a, b)) {
            self.overlap_pairs.push((a, b));
        }
    }

    pub fn collider_pairs(&self) -> &[(BodyGroup, BodyGroup)] {
        &self.collider_pairs
    }

    pub fn overlap_pairs(&self) -> &[(BodyGroup, BodyGroup)] {
        &self.overlap_pairs
    }

    pub fn spawn_body(&mut self, desc: BodyDesc) -> BodyId {
        let id = BodyId(self.bodies.len() as u64);
        self.bodies.push(Body {
            id,
            group: desc.group,
            position: desc.position,
            size: desc.size,
            velocity: Vec2::default(),
            enabled: true,
            is_static: desc.is_static,
            allow_gravity: desc.allow_gravity,
            collide_world_bounds: desc.collide_world_bounds,
            check_collision: true,
            blocked: Blocked::default(),
            alpha: 1.0,
            rotation_radians: 0.0,
        });
        id
    }

    /// Re-initialises an existing body from `desc`, keeping its id. Used when a
    /// pooled object is respawned.
    pub fn reset_body(&mut self, id: BodyId, desc: BodyDesc) -> bool {
        let Some(body) = self.body_mut(id) else {
            return false;
        };
        body.group = desc.group;
        body.position = desc.position;
        body.size = desc.size;
        body.velocity = Vec2::default();
        body.enabled = true;
        body.is_static = desc.is_static;
        body.allow_gravity = desc.allow_gravity;
        body.collide_world_bounds = desc.collide_world_bounds;
        body.check_collision = true;
        body.blocked = Blocked::default();
        body.alpha = 1.0;
        body.rotation_radians = 0.0;
        true
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0 as usize)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id.0 as usize)
    }

    pub fn set_enabled(&mut self, id: BodyId, enabled: bool) -> bool {
        match self.body_mut(id) {
            Some(body) => {
                body.enabled = enabled;
                if !enabled {
                    body.velocity = Vec2::default();
                }
                true
            }
            None => false,
        }
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
        self.collider_pairs.clear();
        self.overlap_pairs.clear();
        self.world_bounds = None;
    }

    /// Integrates every enabled dynamic body, resolves solid collisions per
    /// axis and returns the overlaps observed after movement.
    pub fn step(&mut self, dt_seconds: f32) -> Vec<Contact> {
        for index in 0..self.bodies.len() {
            if !self.bodies[index].is_movable() {
                continue;
            }
            let gravity = self.gravity;
            {
                let body = &mut self.bodies[index];
                body.blocked = Blocked::default();
                if body.allow_gravity {
                    body.velocity.x += gravity.x * dt_seconds;
                    body.velocity.y += gravity.y * dt_seconds;
                }
                body.position.x += body.velocity.x * dt_seconds;
            }
            self.resolve_axis(index, Axis::X);
            {
                let body = &mut self.bodies[index];
                body.position.y += body.velocity.y * dt_seconds;
            }
            self.resolve_axis(index, Axis::Y);
            self.clamp_to_world_bounds(index);
        }

        self.collect_overlaps()
    }

    fn collides(&self, a: BodyGroup, b: BodyGroup) -> bool {
        self.collider_pairs
            .iter()
            .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    fn resolve_axis(&mut self, index: usize, axis: Axis) {
        let mover = &self.bodies[index];
        if !mover.check_collision {
            return;
        }
        let mover_group = mover.group;
        let obstacles = self
            .bodies
            .iter()
            .enumerate()
            .filter(|(other_index, other)| {
                *other_index != index
                    && other.enabled
                    && other.check_collision
                    && self.collides(mover_group, other.group)
            })
            .map(|(_, other)| other.bounds())
            .collect::<Vec<_>>();

        let body = &mut self.bodies[index];
        for obstacle in obstacles {
            if !body.bounds().intersects(&obstacle) {
                continue;
            }
            match axis {
                Axis::X => {
                    if body.velocity.x > 0.0 {
                        body.position.x = obstacle.left() - body.size.x;
                        body.blocked.right = true;
                    } else if body.velocity.x < 0.0 {
                        body.position.x = obstacle.right();
                        body.blocked.left = true;
                    } else {
                        continue;
                    }
                    body.velocity.x = 0.0;
                }
                Axis::Y => {
                    if body.velocity.y > 0.0 {
                        body.position.y = obstacle.top() - body.size.y;
                        body.blocked.down = true;
                    } else if body.velocity.y < 0.0 {
                        body.position.y = obstacle.bottom();
                        body.blocked.up = true;
                    } else {
                        continue;
                    }
                    body.velocity.y = 0.0;
                }
            }
        }
    }

    fn clamp_to_world_bounds(&mut self, index: usize) {
        let Some(bounds) = self.world_bounds else {
            return;
        };
        let body = &mut self.bodies[index];
        if !body.collide_world_bounds {
            return;
        }
        if body.position.x < bounds.left() {
            body.position.x = bounds.left();
            body.blocked.left = true;
            body.velocity.x = body.velocity.x.max(0.0);
        } else if body.position.x + body.size.x > bounds.right() {
            body.position.x = bounds.right() - body.size.x;
            body.blocked.right = true;
            body.velocity.x = body.velocity.x.min(0.0);
        }
        if body.position.y < bounds.top() {
            body.position.y = bounds.top();
            body.blocked.up = true;
            body.velocity.y = body.velocity.y.max(0.0);
        } else if body.position.y + body.size.y > bounds.bottom() {
            body.position.y = bounds.bottom() - body.size.y;
            body.blocked.down = true;
            body.velocity.y = body.velocity.y.min(0.0);
        }
    }

    fn collect_overlaps(&self) -> Vec<Contact> {
        let mut contacts = Vec::new();
        for &(group_a, group_b) in &self.overlap_pairs {
            for a in self
                .bodies
                .iter()
                .filter(|body| body.enabled && body.group == group_a)
            {
                let a_bounds = a.bounds();
                for b in self
                    .bodies
                    .iter()
                    .filter(|body| body.enabled && body.group == group_b && body.id != a.id)
                {
                    if a_bounds.intersects(&b.bounds()) {
                        contacts.push(Contact { a: a.id, b: b.id });
                    }
                }
            }
        }
        contacts
    }
}
