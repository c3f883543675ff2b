mod data;
mod flow;
mod scene;

pub(crate) use scene::QuizScene;
