use std::rc::Rc;

use crate::model::actor::{Actor, Persona};

/// Owns every actor on the map. Dropping an NPC here is what despawns it.
pub struct Scene {
    player: Rc<Actor>,
    npcs: Vec<Rc<Actor>>,
}

impl Scene {
    pub fn new(personas: &[Persona]) -> Self {
        Self {
            player: Actor::player(),
            npcs: personas.iter().cloned().map(Actor::npc).collect(),
        }
    }

    pub fn player(&self) -> &Rc<Actor> {
        &self.player
    }

    pub fn npcs(&self) -> &[Rc<Actor>] {
        &self.npcs
    }

    pub fn despawn(&mut self, index: usize) -> Option<Rc<Actor>> {
        (index < self.npcs.len()).then(|| self.npcs.remove(index))
    }

    /// Brings back any persona that is not currently on the map.
    pub fn respawn_missing(&mut self, personas: &[Persona]) {
        for persona in personas {
            if !self.npcs.iter().any(|n| n.persona() == Some(persona)) {
                self.npcs.push(Actor::npc(persona.clone()));
            }
        }
    }
}
