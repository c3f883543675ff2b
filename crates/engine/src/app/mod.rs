mod input;
mod loop_runner;
mod physics;
mod scene;
mod timers;

pub use input::{IdleInput, InputAction, InputSnapshot, InputSource};
pub use loop_runner::{run_app, AppError, LoopConfig, RunEnd, RunSummary};
pub use physics::{Blocked, Body, BodyDesc, BodyGroup, BodyId, Contact, PhysicsWorld, Rect};
pub use scene::{
    LaunchData, Scene, SceneCommand, SceneKey, SceneMachine, SceneMessage, SceneNotice,
    SceneTransition, SceneWorld, TimeReport, Vec2,
};
pub use timers::{TimerHandle, TimerQueue, Tween, TweenHandle, TweenProperty, TweenSet};
