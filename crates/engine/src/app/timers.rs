use super::physics::{BodyId, PhysicsWorld};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingTimer {
    handle: TimerHandle,
    remaining_ms: f32,
}

/// One-shot millisecond timers driven by elapsed tick time.
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    next_handle: u64,
    pending: Vec<PendingTimer>,
}

impl TimerQueue {
    pub fn schedule(&mut self, delay_ms: f32) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle = self.next_handle.saturating_add(1);
        self.pending.push(PendingTimer {
            handle,
            remaining_ms: delay_ms.max(0.0),
        });
        handle
    }

    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.handle != handle);
        before != self.pending.len()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|timer| timer.handle == handle)
    }

    pub fn remaining_ms(&self, handle: TimerHandle) -> Option<f32> {
        self.pending
            .iter()
            .find(|timer| timer.handle == handle)
            .map(|timer| timer.remaining_ms)
    }

    /// Advances every timer and returns the ones that expired, in scheduling order.
    pub fn tick(&mut self, dt_ms: f32) -> Vec<TimerHandle> {
        let mut fired = Vec::new();
        self.pending.retain_mut(|timer| {
            timer.remaining_ms -= dt_ms;
            if timer.remaining_ms <= 0.0 {
                fired.push(timer.handle);
                false
            } else {
                true
            }
        });
        fired
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TweenHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenProperty {
    Alpha,
    Rotation,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenTrack {
    pub property: TweenProperty,
    pub from: f32,
    pub to: f32,
}

/// Linear interpolation of body visuals. With `yoyo` one cycle is two legs
/// of `duration_ms` each.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub target: BodyId,
    pub tracks: Vec<TweenTrack>,
    pub duration_ms: f32,
    pub yoyo: bool,
    pub repeat_forever: bool,
}

impl Tween {
    pub fn new(target: BodyId, duration_ms: f32) -> Self {
        Self {
            target,
            tracks: Vec::new(),
            duration_ms: duration_ms.max(1.0),
            yoyo: false,
            repeat_forever: false,
        }
    }

    pub fn track(mut self, property: TweenProperty, from: f32, to: f32) -> Self {
        self.tracks.push(TweenTrack { property, from, to });
        self
    }

    pub fn yoyo(mut self) -> Self {
        self.yoyo = true;
        self
    }

    pub fn repeat_forever(mut self) -> Self {
        self.repeat_forever = true;
        self
    }

    fn cycle_ms(&self) -> f32 {
        if self.yoyo {
            self.duration_ms * 2.0
        } else {
            self.duration_ms
        }
    }

    fn progress_at(&self, elapsed_ms: f32) -> f32 {
        let cycle = self.cycle_ms();
        let local = if self.repeat_forever {
            elapsed_ms % cycle
        } else {
            elapsed_ms.min(cycle)
        };
        if self.yoyo && local > self.duration_ms {
            1.0 - (local - self.duration_ms) / self.duration_ms
        } else {
            (local / self.duration_ms).min(1.0)
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveTween {
    handle: TweenHandle,
    tween: Tween,
    elapsed_ms: f32,
}

#[derive(Debug, Clone, Default)]
pub struct TweenSet {
    next_handle: u64,
    active: Vec<ActiveTween>,
}

impl TweenSet {
    pub fn add(&mut self, tween: Tween) -> TweenHandle {
        let handle = TweenHandle(self.next_handle);
        self.next_handle = self.next_handle.saturating_add(1);
        self.active.push(ActiveTween {
            handle,
            tween,
            elapsed_ms: 0.0,
        });
        handle
    }

    /// Stops a tween where it is; the target keeps its current values.
    pub fn stop(&mut self, handle: TweenHandle) -> bool {
        let before = self.active.len();
        self.active.retain(|active| active.handle != handle);
        before != self.active.len()
    }

    pub fn is_active(&self, handle: TweenHandle) -> bool {
        self.active.iter().any(|active| active.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Advances tweens, writes their values onto the target bodies and
    /// returns the handles of tweens that finished this tick.
    pub fn tick(&mut self, dt_ms: f32, physics: &mut PhysicsWorld) -> Vec<TweenHandle> {
        let mut completed = Vec::new();
        self.active.retain_mut(|active| {
            active.elapsed_ms += dt_ms;
            let t = active.tween.progress_at(active.elapsed_ms);
            if let Some(body) = physics.body_mut(active.tween.target) {
                for track in &active.tween.tracks {
                    let value = track.from + (track.to - track.from) * t;
                    match track.property {
                        TweenProperty::Alpha => body.alpha = value,
                        TweenProperty::Rotation => body.rotation_radians = value,
                    }
                }
            }
            let finished =
                !active.tween.repeat_forever && active.elapsed_ms >= active.tween.cycle_ms();
            if finished {
                completed.push(active.handle);
            }
            !finished
        });
        completed
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}
