use engine::{BodyId, MapObject};

use super::pool::SpawnedEntity;

pub(crate) const DEFAULT_COIN_VALUE: u32 = 10;
pub(crate) const DEFAULT_HEAL_AMOUNT: u32 = 1;
pub(crate) const DEFAULT_KEY_ID: &str = "key";
pub(crate) const DEFAULT_REQUIRED_KEYS: u32 = 1;

#[derive(Debug)]
pub(crate) struct Coin {
    body: BodyId,
    active: bool,
    value: u32,
}

impl Coin {
    pub(crate) fn new(body: BodyId) -> Self {
        Self {
            body,
            active: false,
            value: DEFAULT_COIN_VALUE,
        }
    }

    pub(crate) fn value(&self) -> u32 {
        self.value
    }
}

impl SpawnedEntity for Coin {
    fn body(&self) -> BodyId {
        self.body
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn late_init(&mut self, object: &MapObject) {
        self.value = object.integer_or("value", DEFAULT_COIN_VALUE);
    }
}

#[derive(Debug)]
pub(crate) struct Heart {
    body: BodyId,
    active: bool,
    heal_amount: u32,
}

impl Heart {
    pub(crate) fn new(body: BodyId) -> Self {
        Self {
            body,
            active: false,
            heal_amount: DEFAULT_HEAL_AMOUNT,
        }
    }

    pub(crate) fn heal_amount(&self) -> u32 {
        self.heal_amount
    }
}

impl SpawnedEntity for Heart {
    fn body(&self) -> BodyId {
        self.body
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn late_init(&mut self, object: &MapObject) {
        self.heal_amount = object.integer_or("healAmount", DEFAULT_HEAL_AMOUNT);
    }
}

#[derive(Debug)]
pub(crate) struct Key {
    body: BodyId,
    active: bool,
    key_id: String,
}

impl Key {
    pub(crate) fn new(body: BodyId) -> Self {
        Self {
            body,
            active: false,
            key_id: DEFAULT_KEY_ID.to_string(),
        }
    }

    pub(crate) fn key_id(&self) -> &str {
        &self.key_id
    }
}

impl SpawnedEntity for Key {
    fn body(&self) -> BodyId {
        self.body
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn late_init(&mut self, object: &MapObject) {
        self.key_id = object.string("keyId").unwrap_or(DEFAULT_KEY_ID).to_string();
    }
}

/// Stage exit. Not pooled: a level has at most one.
#[derive(Debug)]
pub(crate) struct Castle {
    body: BodyId,
    active: bool,
    required_keys: u32,
}

impl Castle {
    pub(crate) fn new(body: BodyId) -> Self {
        Self {
            body,
            active: false,
            required_keys: DEFAULT_REQUIRED_KEYS,
        }
    }

    pub(crate) fn required_keys(&self) -> u32 {
        self.required_keys
    }
}

impl SpawnedEntity for Castle {
    fn body(&self) -> BodyId {
        self.body
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn late_init(&mut self, object: &MapObject) {
        self.required_keys = object.integer_or("requiredKeys", DEFAULT_REQUIRED_KEYS);
    }
}
