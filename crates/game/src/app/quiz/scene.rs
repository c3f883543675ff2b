use engine::{
    InputSnapshot, LaunchData, Scene, SceneCommand, SceneKey, SceneNotice, SceneWorld,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use super::data::QuizDataManager;
use super::flow::{QuizFlow, QuizState};

/// Nested activity launched on top of the stage. The question pool lives
/// here so it survives between encounters.
pub(crate) struct QuizScene {
    data: QuizDataManager,
    rng: StdRng,
    flow: Option<QuizFlow>,
    pending_notice: Option<SceneNotice>,
}

impl QuizScene {
    pub(crate) fn new(bank_key: impl Into<String>, seed: u64) -> Self {
        Self {
            data: QuizDataManager::new(bank_key),
            rng: StdRng::seed_from_u64(seed),
            flow: None,
            pending_notice: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn flow(&self) -> Option<&QuizFlow> {
        self.flow.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn data(&self) -> &QuizDataManager {
        &self.data
    }
}

impl Scene for QuizScene {
    fn load(&mut self, world: &mut SceneWorld, data: &LaunchData) {
        let (category, return_key) = match data {
            LaunchData::Quiz {
                category,
                return_key,
            } => (category.as_deref(), *return_key),
            LaunchData::None => {
                warn!("quiz_launched_without_data");
                (None, SceneKey::Stage)
            }
        };

        let mut flow = QuizFlow::new(return_key);
        self.pending_notice = flow.begin(&mut self.data, world.assets(), category, &mut self.rng);
        info!(
            category = category.unwrap_or("*"),
            return_to = ?return_key,
            state = ?flow.state(),
            "quiz_scene_loaded"
        );
        self.flow = Some(flow);
    }

    fn update(
        &mut self,
        _fixed_dt_seconds: f32,
        input: &InputSnapshot,
        _world: &mut SceneWorld,
    ) -> SceneCommand {
        if let Some(notice) = self.pending_notice.take() {
            return SceneCommand::Stop {
                notify: Some(notice),
            };
        }
        let Some(flow) = self.flow.as_mut() else {
            return SceneCommand::None;
        };
        match flow.handle_input(input) {
            Some(notice) => SceneCommand::Stop {
                notify: Some(notice),
            },
            None => SceneCommand::None,
        }
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        if let Some(flow) = self.flow.take() {
            if flow.state() != QuizState::Closing {
                warn!(state = ?flow.state(), "quiz_unloaded_before_completion");
            }
        }
        self.pending_notice = None;
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        let flow = self.flow.as_ref()?;
        if let Some(result) = flow.result_text() {
            return Some(result);
        }
        let question = flow.question()?;
        Some(format!(
            "{} [{}/{}]",
            question.question,
            flow.selected() + 1,
            question.choices.len()
        ))
    }
}
