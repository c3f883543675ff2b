use engine::{
    AssetCache, Body, BodyGroup, InputAction, InputSnapshot, LaunchData, LevelData, QuizQuestion,
    Scene, SceneCommand, SceneKey, SceneMachine, SceneMessage, SceneTransition, SceneWorld,
};
use serde_json::{json, Value};

use super::collision::{ENEMY, PLAYER};
use super::events::StageEventKind;
use super::player::PlayerState;
use super::pool::{SlotId, SpawnedEntity};
use super::stage::{StageOutcome, StageScene};
use crate::app::config::GameConfig;
use crate::app::quiz::QuizScene;

const DT: f32 = 1.0 / 60.0;

fn config() -> GameConfig {
    GameConfig {
        gravity: 0.0,
        level: "test".to_string(),
        ..GameConfig::default()
    }
}

fn level(objects: Value) -> LevelData {
    serde_json::from_value(json!({"width": 800, "height": 600, "objects": objects}))
        .expect("level")
}

fn question(text: &str, category: Option<&str>) -> QuizQuestion {
    QuizQuestion {
        question: text.to_string(),
        choices: vec!["yes".to_string()],
        answer: "yes".to_string(),
        category: category.map(str::to_string),
        source: None,
    }
}

fn assets(objects: Value) -> AssetCache {
    let mut assets = AssetCache::default();
    assets.insert_level("test", level(objects));
    assets.insert_question_bank(
        "questions",
        vec![question("one", None), question("two", Some("science"))],
    );
    assets
}

fn player_at_origin() -> Value {
    json!({"type": "player", "x": 100, "y": 100})
}

fn still_enemy(extra: Value) -> Value {
    let mut properties = json!({"speed": 0});
    if let (Some(target), Some(extra)) = (properties.as_object_mut(), extra.as_object()) {
        target.extend(extra.clone());
    }
    json!({"type": "enemy", "x": 104, "y": 104, "properties": properties})
}

struct Harness {
    scene: StageScene,
    world: SceneWorld,
}

impl Harness {
    fn load(config: GameConfig, objects: Value) -> Self {
        let mut world = SceneWorld::default();
        world.set_assets(assets(objects));
        let mut scene = StageScene::new(config);
        scene.load(&mut world, &LaunchData::None);
        Self { scene, world }
    }

    fn tick(&mut self) -> SceneCommand {
        self.scene.update(DT, &InputSnapshot::empty(), &mut self.world)
    }

    fn tick_until(
        &mut self,
        max_ticks: usize,
        wanted: impl Fn(&SceneCommand) -> bool,
    ) -> Option<SceneCommand> {
        (0..max_ticks).map(|_| self.tick()).find(|command| wanted(command))
    }

    fn finish_quiz(&mut self, is_correct: bool) {
        self.scene
            .on_message(SceneMessage::QuizCompleted { is_correct }, &mut self.world);
    }

    fn body_of(&self, group: BodyGroup) -> &Body {
        self.world
            .physics()
            .bodies()
            .iter()
            .find(|body| body.group == group)
            .expect("body in group")
    }
}

#[test]
fn enemy_contact_launches_quiz_and_freezes_both_bodies() {
    let mut harness = Harness::load(config(), json!([player_at_origin(), still_enemy(json!({}))]));

    let command = harness.tick();

    assert_eq!(
        command,
        SceneCommand::Launch {
            key: SceneKey::Quiz,
            data: LaunchData::Quiz {
                category: None,
                return_key: SceneKey::Stage,
            },
        }
    );
    let session = harness.scene.session().expect("session");
    assert_eq!(session.encounter(), Some(SlotId(0)));
    assert_eq!(session.last_tick_counts().get(StageEventKind::EnemyCollided), 1);
    assert!(!harness.body_of(PLAYER).enabled);
    assert!(!harness.body_of(ENEMY).enabled);
    assert_eq!(harness.tick(), SceneCommand::None);
}

#[test]
fn enemy_category_overrides_the_configured_default() {
    let mut fallback = config();
    fallback.quiz_category = Some("general".to_string());

    let mut harness = Harness::load(
        fallback.clone(),
        json!([player_at_origin(), still_enemy(json!({}))]),
    );
    assert!(matches!(
        harness.tick(),
        SceneCommand::Launch {
            data: LaunchData::Quiz { category: Some(ref category), .. },
            ..
        } if category == "general"
    ));

    let mut harness = Harness::load(
        fallback,
        json!([player_at_origin(), still_enemy(json!({"category": "science"}))]),
    );
    assert!(matches!(
        harness.tick(),
        SceneCommand::Launch {
            data: LaunchData::Quiz { category: Some(ref category), .. },
            ..
        } if category == "science"
    ));
}

#[test]
fn correct_answer_defeats_enemy_and_restores_player() {
    let mut harness = Harness::load(config(), json!([player_at_origin(), still_enemy(json!({}))]));
    harness.tick();

    harness.finish_quiz(true);

    let session = harness.scene.session().expect("session");
    assert_eq!(session.encounter(), None);
    assert_eq!(session.player().health(), 3);
    assert_eq!(session.player().state(), PlayerState::Normal);
    let enemy = session.enemies().get(SlotId(0)).expect("enemy");
    assert!(!enemy.is_active());
    assert_eq!(enemy.health(), 0);
    assert!(harness.body_of(PLAYER).enabled);
    assert!(!harness.body_of(ENEMY).enabled);

    assert_eq!(harness.tick(), SceneCommand::None);
}

#[test]
fn wrong_answer_damages_player_and_reenables_enemy() {
    let mut harness = Harness::load(config(), json!([player_at_origin(), still_enemy(json!({}))]));
    harness.tick();

    harness.finish_quiz(false);

    let session = harness.scene.session().expect("session");
    assert_eq!(session.player().health(), 2);
    assert_eq!(session.player().state(), PlayerState::Invincible);
    assert!(harness.body_of(PLAYER).enabled);
    assert!(harness.body_of(ENEMY).enabled);

    // Still overlapping, but contacts are ignored until invincibility ends.
    assert_eq!(harness.tick(), SceneCommand::None);
    let relaunch =
        harness.tick_until(200, |command| matches!(command, SceneCommand::Launch { .. }));
    assert!(relaunch.is_some());
    assert_eq!(
        harness.scene.session().expect("session").player().state(),
        PlayerState::Normal
    );
}

#[test]
fn quiz_result_without_encounter_is_ignored() {
    let mut harness = Harness::load(config(), json!([player_at_origin()]));
    harness.finish_quiz(false);

    let session = harness.scene.session().expect("session");
    assert_eq!(session.player().health(), 3);
    assert_eq!(session.player().state(), PlayerState::Normal);
}

#[test]
fn losing_the_last_heart_plays_death_then_hard_resets() {
    let mut fragile = config();
    fragile.player.max_health = 1;
    let mut harness = Harness::load(fragile, json!([player_at_origin(), still_enemy(json!({}))]));
    harness.tick();
    harness.finish_quiz(false);
    assert_eq!(
        harness.scene.session().expect("session").player().state(),
        PlayerState::Dead
    );

    let command = harness.tick_until(120, |command| *command != SceneCommand::None);
    assert_eq!(command, Some(SceneCommand::HardResetTo(SceneKey::Stage)));

    harness.scene.unload(&mut harness.world);
    harness.world.clear();
    harness.scene.load(&mut harness.world, &LaunchData::None);
    assert_eq!(harness.scene.attempt(), 2);
    let session = harness.scene.session().expect("session");
    assert_eq!(session.player().health(), 1);
    assert_eq!(session.player().state(), PlayerState::Normal);
}

#[test]
fn coins_are_scored_once() {
    let mut harness = Harness::load(
        config(),
        json!([
            player_at_origin(),
            {"type": "coin", "x": 104, "y": 104, "properties": {"value": 25}},
            {"type": "coin", "x": 400, "y": 400}
        ]),
    );

    harness.tick();
    harness.tick();

    let session = harness.scene.session().expect("session");
    assert_eq!(session.score(), 25);
}

#[test]
fn castle_stays_locked_until_keys_are_collected() {
    let mut harness = Harness::load(
        config(),
        json!([
            player_at_origin(),
            {"type": "castle", "x": 90, "y": 90, "properties": {"requiredKeys": 1}}
        ]),
    );
    assert_eq!(harness.tick(), SceneCommand::None);
    assert_eq!(harness.tick(), SceneCommand::None);
    assert_eq!(harness.scene.session().expect("session").outcome(), None);

    let mut harness = Harness::load(
        config(),
        json!([
            player_at_origin(),
            {"type": "key", "x": 104, "y": 104, "properties": {"keyId": "gold"}},
            {"type": "castle", "x": 90, "y": 90, "properties": {"requiredKeys": 1}}
        ]),
    );
    assert_eq!(harness.tick(), SceneCommand::Quit);
    let session = harness.scene.session().expect("session");
    assert_eq!(session.collected_keys(), ["gold".to_string()]);
    assert_eq!(session.outcome(), Some(StageOutcome::Cleared));
}

#[test]
fn castle_clear_waits_for_a_quiz_launched_in_the_same_tick() {
    let mut harness = Harness::load(
        config(),
        json!([
            player_at_origin(),
            still_enemy(json!({})),
            {"type": "castle", "x": 90, "y": 90, "properties": {"requiredKeys": 0}}
        ]),
    );

    assert!(matches!(harness.tick(), SceneCommand::Launch { .. }));
    assert_eq!(harness.scene.session().expect("session").outcome(), None);

    harness.finish_quiz(true);
    assert_eq!(harness.tick(), SceneCommand::Quit);
    assert_eq!(
        harness.scene.session().expect("session").outcome(),
        Some(StageOutcome::Cleared)
    );
}

#[test]
fn debug_title_reports_last_tick_event_counts() {
    let mut harness = Harness::load(
        config(),
        json!([
            player_at_origin(),
            {"type": "coin", "x": 104, "y": 104}
        ]),
    );

    harness.tick();
    let title = harness.scene.debug_title(&harness.world).expect("title");
    assert!(title.contains("ev: 1 | evk: co:1 "), "{title}");

    harness.tick();
    let title = harness.scene.debug_title(&harness.world).expect("title");
    assert!(title.contains("ev: 0 | evk: co:0 "), "{title}");
}

#[test]
fn unknown_objects_and_duplicate_players_are_skipped() {
    let harness = Harness::load(
        config(),
        json!([
            player_at_origin(),
            {"type": "cloud", "x": 10, "y": 10},
            {"type": "player", "x": 300, "y": 300}
        ]),
    );
    assert_eq!(harness.world.physics().body_count(), 1);
    assert_eq!(harness.body_of(PLAYER).position.x, 100.0);
    assert!(harness
        .scene
        .debug_title(&harness.world)
        .is_some_and(|title| title.starts_with("hp 3/3 | score 0")));
}

#[test]
fn wander_enemies_default_to_level_bounds() {
    let harness = Harness::load(
        config(),
        json!([
            player_at_origin(),
            {"type": "enemy", "x": 500, "y": 300, "properties": {"ai": "wander"}},
            {"type": "enemy", "x": 600, "y": 300, "properties": {"ai": "teleport"}}
        ]),
    );
    let session = harness.scene.session().expect("session");

    let wander = session
        .enemies()
        .get(SlotId(0))
        .and_then(|enemy| enemy.ai())
        .expect("wander ai");
    assert_eq!(wander.kind_name(), "wander");

    let fallback = session
        .enemies()
        .get(SlotId(1))
        .and_then(|enemy| enemy.ai())
        .expect("fallback ai");
    assert_eq!(fallback.kind_name(), "patrol");
}

#[test]
#[should_panic(expected = "has no player object")]
fn level_without_player_panics() {
    Harness::load(config(), json!([{"type": "platform", "x": 0, "y": 580}]));
}

#[test]
#[should_panic(expected = "is not loaded")]
fn missing_level_panics() {
    let mut world = SceneWorld::default();
    world.set_assets(AssetCache::default());
    StageScene::new(config()).load(&mut world, &LaunchData::None);
}

fn machine(config: GameConfig, objects: Value) -> SceneMachine {
    let mut machine = SceneMachine::new(
        SceneKey::Stage,
        vec![
            (SceneKey::Stage, Box::new(StageScene::new(config)) as Box<dyn Scene>),
            (SceneKey::Quiz, Box::new(QuizScene::new("questions", 3))),
        ],
    );
    machine.set_assets_for_all(assets(objects));
    machine.load_active();
    machine
}

fn stage_body(machine: &SceneMachine, group: BodyGroup) -> Body {
    machine
        .world(SceneKey::Stage)
        .expect("stage world")
        .physics()
        .bodies()
        .iter()
        .find(|body| body.group == group)
        .cloned()
        .expect("body in group")
}

#[test]
fn encounter_round_trip_through_the_scene_stack() {
    let mut machine = machine(config(), json!([player_at_origin(), still_enemy(json!({}))]));

    let command = machine.update_active(DT, &InputSnapshot::empty());
    assert_eq!(
        machine.apply_command(command),
        SceneTransition::Launched(SceneKey::Quiz)
    );
    assert!(machine.is_paused(SceneKey::Stage));
    assert_eq!(machine.stack(), [SceneKey::Stage, SceneKey::Quiz]);

    let confirm = InputSnapshot::empty().with_action_pressed(InputAction::Confirm);
    assert_eq!(machine.update_active(DT, &confirm), SceneCommand::None);
    let command = machine.update_active(DT, &confirm);
    assert!(matches!(command, SceneCommand::Stop { notify: Some(_) }));
    assert_eq!(
        machine.apply_command(command),
        SceneTransition::Stopped(SceneKey::Quiz)
    );

    assert_eq!(machine.active_scene(), SceneKey::Stage);
    assert!(!machine.is_paused(SceneKey::Stage));
    assert!(stage_body(&machine, PLAYER).enabled);
    assert!(!stage_body(&machine, ENEMY).enabled);
}

#[test]
fn empty_category_exits_safely_with_a_wrong_answer() {
    let mut machine = machine(
        config(),
        json!([player_at_origin(), still_enemy(json!({"category": "history"}))]),
    );

    let command = machine.update_active(DT, &InputSnapshot::empty());
    machine.apply_command(command);
    assert_eq!(machine.active_scene(), SceneKey::Quiz);

    let command = machine.update_active(DT, &InputSnapshot::empty());
    assert_eq!(
        machine.apply_command(command),
        SceneTransition::Stopped(SceneKey::Quiz)
    );
    assert_eq!(machine.active_scene(), SceneKey::Stage);
    assert!(stage_body(&machine, PLAYER).enabled);
    assert!(stage_body(&machine, ENEMY).enabled);
    assert!(machine
        .debug_title_active()
        .is_some_and(|title| title.starts_with("hp 2/3")));
}
