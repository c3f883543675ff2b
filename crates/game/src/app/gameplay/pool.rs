use engine::{BodyDesc, BodyId, MapObject, PhysicsWorld};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct SlotId(pub(crate) usize);

/// Lifecycle shared by every object materialised from the level's object
/// layer: the body is created and registered first, then `late_init` reads
/// the per-instance properties.
pub(crate) trait SpawnedEntity {
    fn body(&self) -> BodyId;
    fn is_active(&self) -> bool;
    fn set_active(&mut self, active: bool);
    fn late_init(&mut self, object: &MapObject);
}

/// Slots are never removed; a released slot keeps its body (disabled) and is
/// handed out again by the next spawn.
#[derive(Debug)]
pub(crate) struct EntityPool<T> {
    slots: Vec<T>,
}

impl<T> Default for EntityPool<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T: SpawnedEntity> EntityPool<T> {
    pub(crate) fn spawn(
        &mut self,
        physics: &mut PhysicsWorld,
        desc: BodyDesc,
        object: &MapObject,
        create: impl FnOnce(BodyId) -> T,
    ) -> SlotId {
        let index = match self.slots.iter().position(|entity| !entity.is_active()) {
            Some(index) => {
                physics.reset_body(self.slots[index].body(), desc);
                index
            }
            None => {
                let body = physics.spawn_body(desc);
                self.slots.push(create(body));
                self.slots.len() - 1
            }
        };

        let entity = &mut self.slots[index];
        entity.set_active(true);
        entity.late_init(object);
        SlotId(index)
    }

    /// Deactivates the slot and disables its body. Returns `false` when the
    /// slot was already free.
    pub(crate) fn release(&mut self, slot: SlotId, physics: &mut PhysicsWorld) -> bool {
        let Some(entity) = self.slots.get_mut(slot.0) else {
            return false;
        };
        if !entity.is_active() {
            return false;
        }
        entity.set_active(false);
        physics.set_enabled(entity.body(), false);
        true
    }

    pub(crate) fn slot_of(&self, body: BodyId) -> Option<SlotId> {
        self.slots
            .iter()
            .position(|entity| entity.body() == body)
            .map(SlotId)
    }

    pub(crate) fn get(&self, slot: SlotId) -> Option<&T> {
        self.slots.get(slot.0)
    }

    pub(crate) fn get_mut(&mut self, slot: SlotId) -> Option<&mut T> {
        self.slots.get_mut(slot.0)
    }

    pub(crate) fn iter_active_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter(|entity| entity.is_active())
    }

    pub(crate) fn active_count(&self) -> usize {
        self.slots.iter().filter(|entity| entity.is_active()).count()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}
