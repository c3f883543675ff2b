mod ai;
mod collectibles;
mod collision;
mod enemy;
mod events;
mod player;
mod pool;
mod stage;

pub(crate) use stage::StageScene;

#[cfg(test)]
mod tests;
