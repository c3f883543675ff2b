use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use crate::content::{AssetCache, ContentError};
use crate::StartupError;

use super::input::InputSource;
use super::scene::{SceneMachine, SceneTransition};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    /// Stop after this many simulation ticks; `None` runs until a scene quits.
    pub max_ticks: Option<u64>,
    /// Pace ticks against the wall clock instead of stepping back to back.
    pub realtime: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            max_ticks: None,
            realtime: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to load content: {0}")]
    Content(#[from] ContentError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    Quit,
    TickLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub launches: u32,
    pub resets: u32,
    pub end: RunEnd,
}

/// Drives the scene machine at a fixed step until a scene quits or the
/// configured tick limit is reached.
pub fn run_app(
    config: &LoopConfig,
    assets: AssetCache,
    scenes: &mut SceneMachine,
    input: &mut dyn InputSource,
) -> RunSummary {
    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();

    scenes.set_assets_for_all(assets);
    scenes.load_active();
    info!(
        scene = ?scenes.active_scene(),
        body_count = scenes.active_world().physics().body_count(),
        "scene_loaded"
    );
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        max_ticks = ?config.max_ticks,
        realtime = config.realtime,
        "loop_config"
    );

    let mut summary = RunSummary {
        ticks: 0,
        launches: 0,
        resets: 0,
        end: RunEnd::TickLimit,
    };
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();

    loop {
        let ticks_to_run = if config.realtime {
            let now = Instant::now();
            let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
            last_frame_instant = now;
            accumulator =
                accumulator.saturating_add(clamp_frame_delta(raw_frame_dt, max_frame_delta));
            let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
            accumulator = step_plan.remaining_accumulator;
            if step_plan.dropped_backlog > Duration::ZERO {
                warn!(
                    dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                    max_ticks_per_frame, "sim_clamp_triggered"
                );
            }
            step_plan.ticks_to_run
        } else {
            1
        };

        for _ in 0..ticks_to_run {
            if config.max_ticks.is_some_and(|limit| summary.ticks >= limit) {
                scenes.shutdown_all();
                info!(ticks = summary.ticks, "tick_limit_reached");
                return summary;
            }

            let snapshot = input.snapshot_for_tick(summary.ticks, scenes.active_scene());
            if snapshot.quit_requested() {
                summary.end = RunEnd::Quit;
                scenes.shutdown_all();
                info!(reason = "input", ticks = summary.ticks, "shutdown_requested");
                return summary;
            }
            let command = scenes.update_active(fixed_dt_seconds, &snapshot);
            summary.ticks = summary.ticks.saturating_add(1);

            match scenes.apply_command(command) {
                SceneTransition::Quit => {
                    summary.end = RunEnd::Quit;
                    scenes.shutdown_all();
                    info!(reason = "scene", ticks = summary.ticks, "shutdown_requested");
                    return summary;
                }
                SceneTransition::Launched(_) => {
                    summary.launches = summary.launches.saturating_add(1)
                }
                SceneTransition::Reset(_) => summary.resets = summary.resets.saturating_add(1),
                SceneTransition::Stopped(_) | SceneTransition::Refused | SceneTransition::None => {}
            }
        }

        if config.realtime {
            let elapsed = Instant::now().saturating_duration_since(last_frame_instant);
            if elapsed < fixed_dt {
                thread::sleep(fixed_dt - elapsed);
            }
        }
    }
}

struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::input::{IdleInput, InputAction, InputSnapshot};
    use crate::app::scene::{LaunchData, Scene, SceneCommand, SceneKey, SceneWorld};

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        let raw_frame_dt = Duration::from_millis(600);

        assert_eq!(
            clamp_frame_delta(raw_frame_dt, max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(48), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn zero_duration_falls_back() {
        assert_eq!(
            normalize_non_zero_duration(Duration::ZERO, Duration::from_secs(1)),
            Duration::from_secs(1)
        );
    }

    struct QuitAfter {
        remaining: u32,
    }

    impl Scene for QuitAfter {
        fn load(&mut self, _world: &mut SceneWorld, _data: &LaunchData) {}

        fn update(
            &mut self,
            _fixed_dt_seconds: f32,
            _input: &InputSnapshot,
            _world: &mut SceneWorld,
        ) -> SceneCommand {
            if self.remaining == 0 {
                return SceneCommand::Quit;
            }
            self.remaining -= 1;
            SceneCommand::None
        }

        fn unload(&mut self, _world: &mut SceneWorld) {}
    }

    fn single_scene_machine(remaining: u32) -> SceneMachine {
        SceneMachine::new(
            SceneKey::Stage,
            vec![(SceneKey::Stage, Box::new(QuitAfter { remaining }) as Box<dyn Scene>)],
        )
    }

    #[test]
    fn run_stops_when_scene_quits() {
        let mut scenes = single_scene_machine(3);
        let summary = run_app(
            &LoopConfig::default(),
            AssetCache::default(),
            &mut scenes,
            &mut IdleInput,
        );
        assert_eq!(summary.end, RunEnd::Quit);
        assert_eq!(summary.ticks, 4);
    }

    #[test]
    fn run_honours_tick_limit() {
        let mut scenes = single_scene_machine(u32::MAX);
        let config = LoopConfig {
            max_ticks: Some(10),
            ..LoopConfig::default()
        };
        let summary = run_app(&config, AssetCache::default(), &mut scenes, &mut IdleInput);
        assert_eq!(summary.end, RunEnd::TickLimit);
        assert_eq!(summary.ticks, 10);
    }

    struct QuitOnTick(u64);

    impl InputSource for QuitOnTick {
        fn snapshot_for_tick(&mut self, tick: u64, _active_scene: SceneKey) -> InputSnapshot {
            if tick == self.0 {
                InputSnapshot::empty().with_action_pressed(InputAction::Quit)
            } else {
                InputSnapshot::empty()
            }
        }
    }

    #[test]
    fn quit_input_ends_run_before_update() {
        let mut scenes = single_scene_machine(u32::MAX);
        let summary = run_app(
            &LoopConfig::default(),
            AssetCache::default(),
            &mut scenes,
            &mut QuitOnTick(2),
        );
        assert_eq!(summary.end, RunEnd::Quit);
        assert_eq!(summary.ticks, 2);
    }
}
