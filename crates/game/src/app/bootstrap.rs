use engine::{
    resolve_app_paths, AppError, AssetCache, LoopConfig, Scene, SceneKey, SceneMachine,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::autopilot::AutopilotInput;
use super::config::{ConfigError, GameConfig};
use super::gameplay::StageScene;
use super::quiz::QuizScene;

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    App(#[from] AppError),
    #[error("invalid game config: {0}")]
    Config(#[from] ConfigError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) assets: AssetCache,
    pub(crate) scenes: SceneMachine,
    pub(crate) input: AutopilotInput,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Quizrun Startup ===");

    let paths = resolve_app_paths().map_err(AppError::from)?;
    let mut game_config = GameConfig::load(&paths.config_file())?;
    game_config.apply_env_overrides()?;

    let assets = AssetCache::load_from_dir(&paths.assets_dir).map_err(AppError::from)?;
    info!(
        root = %paths.root.display(),
        levels = ?assets.level_keys(),
        question_banks = ?assets.question_bank_keys(),
        "assets_loaded"
    );

    let config = LoopConfig {
        target_tps: game_config.target_tps,
        max_ticks: game_config.max_ticks,
        realtime: game_config.realtime,
        ..LoopConfig::default()
    };
    let input = AutopilotInput::new(game_config.seed);
    let quiz = QuizScene::new(
        game_config.question_bank.clone(),
        game_config.seed.wrapping_add(1),
    );
    let scenes = SceneMachine::new(
        SceneKey::Stage,
        vec![
            (
                SceneKey::Stage,
                Box::new(StageScene::new(game_config)) as Box<dyn Scene>,
            ),
            (SceneKey::Quiz, Box::new(quiz)),
        ],
    );

    Ok(AppWiring {
        config,
        assets,
        scenes,
        input,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
