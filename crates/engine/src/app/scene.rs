use std::collections::HashMap;

use tracing::{info, warn};

use super::input::InputSnapshot;
use super::physics::PhysicsWorld;
use super::timers::{TimerHandle, TimerQueue, TweenHandle, TweenSet};
use crate::content::AssetCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    Stage,
    Quiz,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Data handed to a scene when it is launched on top of another one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LaunchData {
    #[default]
    None,
    Quiz {
        category: Option<String>,
        return_key: SceneKey,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneMessage {
    QuizCompleted { is_correct: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneNotice {
    pub target: SceneKey,
    pub message: SceneMessage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    /// Pause the current scene and push `key` on top of it.
    Launch { key: SceneKey, data: LaunchData },
    /// Pop the current scene, deliver `notify`, resume the scene below.
    Stop { notify: Option<SceneNotice> },
    HardResetTo(SceneKey),
    Quit,
}

/// What one applied command did to the activity stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneTransition {
    None,
    Launched(SceneKey),
    Stopped(SceneKey),
    Reset(SceneKey),
    Refused,
    Quit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeReport {
    pub fired_timers: Vec<TimerHandle>,
    pub completed_tweens: Vec<TweenHandle>,
}

#[derive(Debug, Default)]
pub struct SceneWorld {
    physics: PhysicsWorld,
    timers: TimerQueue,
    tweens: TweenSet,
    assets: Option<AssetCache>,
}

impl SceneWorld {
    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut TimerQueue {
        &mut self.timers
    }

    pub fn tweens(&self) -> &TweenSet {
        &self.tweens
    }

    pub fn tweens_mut(&mut self) -> &mut TweenSet {
        &mut self.tweens
    }

    /// Advances timers and tweens by the same delta.
    pub fn advance_time(&mut self, dt_ms: f32) -> TimeReport {
        let fired_timers = self.timers.tick(dt_ms);
        let completed_tweens = self.tweens.tick(dt_ms, &mut self.physics);
        TimeReport {
            fired_timers,
            completed_tweens,
        }
    }

    /// Drops all runtime state. Loaded assets are kept.
    pub fn clear(&mut self) {
        self.physics.clear();
        self.timers.clear();
        self.tweens.clear();
    }

    pub fn set_assets(&mut self, assets: AssetCache) {
        self.assets = Some(assets);
    }

    pub fn assets(&self) -> Option<&AssetCache> {
        self.assets.as_ref()
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld, data: &LaunchData);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn unload(&mut self, world: &mut SceneWorld);
    fn pause(&mut self, _world: &mut SceneWorld) {}
    fn resume(&mut self, _world: &mut SceneWorld) {}
    fn on_message(&mut self, _message: SceneMessage, _world: &mut SceneWorld) {}
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}

struct SceneRuntime {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
    is_paused: bool,
}

impl SceneRuntime {
    fn load(&mut self, data: &LaunchData) {
        let (scene, world) = (&mut self.scene, &mut self.world);
        scene.load(world, data);
        self.is_loaded = true;
        self.is_paused = false;
    }

    fn unload(&mut self) {
        if self.is_loaded {
            let (scene, world) = (&mut self.scene, &mut self.world);
            scene.unload(world);
        }
        self.world.clear();
        self.is_loaded = false;
        self.is_paused = false;
    }

    fn pause(&mut self) {
        if self.is_paused {
            return;
        }
        let (scene, world) = (&mut self.scene, &mut self.world);
        scene.pause(world);
        self.is_paused = true;
    }

    fn resume(&mut self) {
        if !self.is_paused {
            return;
        }
        let (scene, world) = (&mut self.scene, &mut self.world);
        scene.resume(world);
        self.is_paused = false;
    }
}

/// Activity stack: only the top scene updates, every scene below it is paused
/// but stays resident.
pub struct SceneMachine {
    runtimes: HashMap<SceneKey, SceneRuntime>,
    stack: Vec<SceneKey>,
}

impl SceneMachine {
    pub fn new(root: SceneKey, scenes: Vec<(SceneKey, Box<dyn Scene>)>) -> Self {
        let runtimes = scenes
            .into_iter()
            .map(|(key, scene)| {
                (
                    key,
                    SceneRuntime {
                        scene,
                        world: SceneWorld::default(),
                        is_loaded: false,
                        is_paused: false,
                    },
                )
            })
            .collect::<HashMap<_, _>>();
        assert!(
            runtimes.contains_key(&root),
            "root scene {root:?} must be registered"
        );
        Self {
            runtimes,
            stack: vec![root],
        }
    }

    pub fn active_scene(&self) -> SceneKey {
        *self
            .stack
            .last()
            .expect("scene stack always holds the root scene")
    }

    pub fn stack(&self) -> &[SceneKey] {
        &self.stack
    }

    pub fn is_paused(&self, key: SceneKey) -> bool {
        self.runtimes
            .get(&key)
            .is_some_and(|runtime| runtime.is_paused)
    }

    pub fn is_loaded(&self, key: SceneKey) -> bool {
        self.runtimes
            .get(&key)
            .is_some_and(|runtime| runtime.is_loaded)
    }

    pub fn set_assets_for_all(&mut self, assets: AssetCache) {
        for runtime in self.runtimes.values_mut() {
            runtime.world.set_assets(assets.clone());
        }
    }

    pub fn load_active(&mut self) {
        let runtime = self.active_runtime_mut();
        if runtime.is_loaded {
            return;
        }
        runtime.load(&LaunchData::None);
    }

    pub fn update_active(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        let runtime = self.active_runtime_mut();
        let (scene, world) = (&mut runtime.scene, &mut runtime.world);
        scene.update(fixed_dt_seconds, input, world)
    }

    pub fn apply_command(&mut self, command: SceneCommand) -> SceneTransition {
        match command {
            SceneCommand::None => SceneTransition::None,
            SceneCommand::Launch { key, data } => {
                if self.launch(key, data) {
                    SceneTransition::Launched(key)
                } else {
                    SceneTransition::Refused
                }
            }
            SceneCommand::Stop { notify } => {
                let stopped = self.active_scene();
                if self.stop_active(notify) {
                    SceneTransition::Stopped(stopped)
                } else {
                    SceneTransition::Refused
                }
            }
            SceneCommand::HardResetTo(key) => {
                if self.hard_reset_to(key) {
                    SceneTransition::Reset(key)
                } else {
                    SceneTransition::Refused
                }
            }
            SceneCommand::Quit => SceneTransition::Quit,
        }
    }

    pub fn launch(&mut self, key: SceneKey, data: LaunchData) -> bool {
        if self.stack.contains(&key) {
            warn!(scene = ?key, "launch_refused_already_on_stack");
            return false;
        }
        if !self.runtimes.contains_key(&key) {
            warn!(scene = ?key, "launch_refused_unregistered");
            return false;
        }

        self.active_runtime_mut().pause();
        let runtime = self.runtime_mut(key);
        if runtime.is_loaded {
            runtime.unload();
        }
        runtime.load(&data);
        self.stack.push(key);
        info!(scene = ?key, depth = self.stack.len(), "scene_launched");
        true
    }

    pub fn stop_active(&mut self, notify: Option<SceneNotice>) -> bool {
        if self.stack.len() <= 1 {
            warn!(scene = ?self.active_scene(), "stop_refused_root_scene");
            return false;
        }
        let Some(stopped) = self.stack.pop() else {
            return false;
        };
        self.runtime_mut(stopped).unload();

        if let Some(notice) = notify {
            match self.runtimes.get_mut(&notice.target) {
                Some(target) if target.is_loaded => {
                    let (scene, world) = (&mut target.scene, &mut target.world);
                    scene.on_message(notice.message, world);
                }
                _ => warn!(
                    target = ?notice.target,
                    message = ?notice.message,
                    "scene_message_dropped"
                ),
            }
        }

        self.active_runtime_mut().resume();
        info!(scene = ?stopped, resumed = ?self.active_scene(), "scene_stopped");
        true
    }

    pub fn hard_reset_to(&mut self, key: SceneKey) -> bool {
        if !self.runtimes.contains_key(&key) {
            warn!(scene = ?key, "reset_refused_unregistered");
            return false;
        }
        while let Some(top) = self.stack.pop() {
            self.runtime_mut(top).unload();
        }
        let runtime = self.runtime_mut(key);
        if runtime.is_loaded {
            runtime.unload();
        }
        runtime.load(&LaunchData::None);
        self.stack.push(key);
        true
    }

    pub fn shutdown_all(&mut self) {
        while let Some(top) = self.stack.pop() {
            self.runtime_mut(top).unload();
        }
        for runtime in self.runtimes.values_mut() {
            if runtime.is_loaded {
                runtime.unload();
            }
        }
    }

    pub fn active_world(&self) -> &SceneWorld {
        &self.active_runtime_ref().world
    }

    pub fn world(&self, key: SceneKey) -> Option<&SceneWorld> {
        self.runtimes.get(&key).map(|runtime| &runtime.world)
    }

    pub fn debug_title_active(&self) -> Option<String> {
        let runtime = self.active_runtime_ref();
        runtime.scene.debug_title(&runtime.world)
    }

    fn active_runtime_mut(&mut self) -> &mut SceneRuntime {
        let key = self.active_scene();
        self.runtime_mut(key)
    }

    fn active_runtime_ref(&self) -> &SceneRuntime {
        let key = self.active_scene();
        self.runtime_ref(key)
    }

    fn runtime_mut(&mut self, key: SceneKey) -> &mut SceneRuntime {
        self.runtimes
            .get_mut(&key)
            .expect("scene keys on the stack are registered")
    }

    fn runtime_ref(&self, key: SceneKey) -> &SceneRuntime {
        self.runtimes
            .get(&key)
            .expect("scene keys on the stack are registered")
    }
}
