use std::rc::Rc;

use egui::Key;

use crate::engine::input::InputAction;
use crate::engine::protocol::{GenerationDispatch, GenerationDone, SessionId};
use crate::engine::session::{ConversationSession, SessionConfig};
use crate::model::actor::{Actor, ActorHandle};
use crate::model::error::DialogueError;

/// Owns at most one live session for the player and routes collisions,
/// input, and generation results to it.
pub struct ConversationManager {
    player: ActorHandle,
    config: SessionConfig,
    next_session: u64,
    session: Option<ConversationSession>,
}

impl ConversationManager {
    pub fn new(player: &Rc<Actor>, config: SessionConfig) -> Self {
        Self {
            player: ActorHandle::new(player),
            config,
            next_session: 0,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&ConversationSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut ConversationSession> {
        self.session.as_mut()
    }

    pub fn is_busy(&self) -> bool {
        self.session.is_some()
    }

    /// Takes effect from the next conversation on.
    pub fn set_config(&mut self, config: SessionConfig) {
        self.config = config;
    }

    /// Collision entry point. Precondition failures leave every actor and the
    /// current session untouched.
    pub fn start(
        &mut self,
        npc: &Rc<Actor>,
        dispatch: &mut dyn GenerationDispatch,
    ) -> Result<SessionId, DialogueError> {
        if self.session.is_some() {
            return Err(DialogueError::PreconditionViolation(
                "a conversation is already running".to_string(),
            ));
        }

        self.next_session += 1;
        let id = SessionId(self.next_session);
        let mut session = ConversationSession::new(
            id,
            self.config.clone(),
            self.player.clone(),
            ActorHandle::new(npc),
        );
        session.start(dispatch)?;

        self.session = Some(session);
        Ok(id)
    }

    pub fn on_generation_done(&mut self, done: GenerationDone) {
        match self.session.as_mut() {
            Some(session) if session.id() == done.ticket.session => {
                if let Err(e) = session.resolve(done) {
                    log::debug!("discarding: {e}");
                }
            }
            _ => log::debug!("discarding stale generation result for {:?}", done.ticket),
        }
        self.reap();
    }

    pub fn handle_key(&mut self, key: Key, dispatch: &mut dyn GenerationDispatch) {
        if let Some(session) = self.session.as_mut() {
            session.handle_key(key, dispatch);
        }
        self.reap();
    }

    pub fn handle_action(&mut self, action: InputAction, dispatch: &mut dyn GenerationDispatch) {
        if let Some(session) = self.session.as_mut() {
            session.handle_action(action, dispatch);
        }
        self.reap();
    }

    /// Ended sessions are dropped, never reused.
    fn reap(&mut self) {
        if self.session.as_ref().is_some_and(|s| !s.is_active()) {
            self.session = None;
        }
    }
}
