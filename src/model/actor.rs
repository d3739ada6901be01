use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

/// Immutable NPC identity used to condition generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub backstory: String,
}

/// A scene actor. The scene owns it through an `Rc`; everything else holds an
/// [`ActorHandle`].
#[derive(Debug)]
pub struct Actor {
    persona: Option<Persona>,
    in_dialogue: Cell<bool>,
    last_utterance: RefCell<String>,
}

impl Actor {
    pub fn player() -> Rc<Self> {
        Rc::new(Self {
            persona: None,
            in_dialogue: Cell::new(false),
            last_utterance: RefCell::new(String::new()),
        })
    }

    pub fn npc(persona: Persona) -> Rc<Self> {
        Rc::new(Self {
            persona: Some(persona),
            in_dialogue: Cell::new(false),
            last_utterance: RefCell::new(String::new()),
        })
    }

    pub fn persona(&self) -> Option<&Persona> {
        self.persona.as_ref()
    }

    pub fn name(&self) -> &str {
        match &self.persona {
            Some(p) => &p.name,
            None => "Player",
        }
    }

    pub fn is_in_dialogue(&self) -> bool {
        self.in_dialogue.get()
    }

    /// Only the conversation session flips this flag.
    pub(crate) fn set_in_dialogue(&self, value: bool) {
        self.in_dialogue.set(value);
    }

    pub fn last_utterance(&self) -> String {
        self.last_utterance.borrow().clone()
    }

    pub(crate) fn set_last_utterance(&self, text: &str) {
        *self.last_utterance.borrow_mut() = text.to_string();
    }
}

/// Borrowed reference into the scene. Upgrade before every use; the actor may
/// have been despawned since the handle was taken.
#[derive(Debug, Clone)]
pub struct ActorHandle(Weak<Actor>);

impl ActorHandle {
    pub fn new(actor: &Rc<Actor>) -> Self {
        Self(Rc::downgrade(actor))
    }

    pub fn get(&self) -> Option<Rc<Actor>> {
        self.0.upgrade()
    }

    pub fn exists(&self) -> bool {
        self.0.strong_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_tracks_despawn() {
        let npc = Actor::npc(Persona {
            name: "Miranda".into(),
            backstory: "Runs the front desk.".into(),
        });
        let handle = ActorHandle::new(&npc);
        assert!(handle.exists());
        assert_eq!(handle.get().map(|a| a.name().to_string()), Some("Miranda".into()));

        drop(npc);
        assert!(!handle.exists());
        assert!(handle.get().is_none());
    }

    #[test]
    fn player_has_no_persona() {
        let player = Actor::player();
        assert!(player.persona().is_none());
        assert_eq!(player.name(), "Player");
        assert!(!player.is_in_dialogue());
    }
}
