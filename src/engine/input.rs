use egui::Key;

use crate::engine::protocol::GenerationDispatch;
use crate::engine::session::{ConversationSession, SessionState};
use crate::model::envelope::DialogueMode;

/// Discrete things the player can do during a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Advance,
    Cancel,
    SelectUp,
    SelectDown,
    Submit,
}

/// A session-scoped key subscription. Lookups stop resolving once it is
/// cancelled; cancelling again is harmless.
#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    keys: Vec<(Key, InputAction)>,
    live: bool,
}

impl KeyBindings {
    pub fn attach(input: TurnInput) -> Self {
        let keys = match input {
            TurnInput::Guided => vec![
                (Key::Space, InputAction::Advance),
                (Key::Escape, InputAction::Cancel),
                (Key::W, InputAction::SelectUp),
                (Key::ArrowUp, InputAction::SelectUp),
                (Key::S, InputAction::SelectDown),
                (Key::ArrowDown, InputAction::SelectDown),
            ],
            TurnInput::Unguided => vec![
                (Key::Space, InputAction::Advance),
                (Key::Escape, InputAction::Cancel),
                (Key::Enter, InputAction::Submit),
            ],
        };
        Self { keys, live: true }
    }

    pub fn lookup(&self, key: Key) -> Option<InputAction> {
        if !self.live {
            return None;
        }
        self.keys.iter().find(|(k, _)| *k == key).map(|(_, a)| *a)
    }

    #[cfg(test)]
    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.keys.iter().map(|(k, _)| *k)
    }

    /// Returns whether this call actually released the subscription.
    pub fn cancel(&mut self) -> bool {
        let was_live = self.live;
        self.live = false;
        self.keys.clear();
        was_live
    }
}

/// Maps input actions onto session transitions. The two variants share the
/// session API and differ only in which actions they honour when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnInput {
    /// Fixed menu of suggested replies.
    Guided,
    /// Free-text capture.
    Unguided,
}

impl From<DialogueMode> for TurnInput {
    fn from(mode: DialogueMode) -> Self {
        match mode {
            DialogueMode::Guided => TurnInput::Guided,
            DialogueMode::Unguided => TurnInput::Unguided,
        }
    }
}

impl TurnInput {
    pub fn apply(
        self,
        session: &mut ConversationSession,
        action: InputAction,
        dispatch: &mut dyn GenerationDispatch,
    ) {
        match (self, action) {
            (_, InputAction::Cancel) => session.cancel(),

            (TurnInput::Guided, InputAction::Advance) => {
                if session.state() == SessionState::AwaitingPlayerInput {
                    session.confirm_selection(dispatch);
                } else {
                    session.advance();
                }
            }
            (TurnInput::Guided, InputAction::SelectUp) => session.move_selection_up(),
            (TurnInput::Guided, InputAction::SelectDown) => session.move_selection_down(),
            (TurnInput::Guided, InputAction::Submit) => {}

            // Space belongs to the text field while capturing.
            (TurnInput::Unguided, InputAction::Advance) => {
                if session.state() == SessionState::DisplayingChunks {
                    session.advance();
                }
            }
            (TurnInput::Unguided, InputAction::Submit) => {
                let typed = session.text_entry().value.clone();
                session.submit_text(&typed, dispatch);
            }
            (TurnInput::Unguided, InputAction::SelectUp | InputAction::SelectDown) => {}
        }
    }
}

/// State of the free-text capture surface. The UI renders it; the session
/// opens, reads, and closes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextEntry {
    pub visible: bool,
    pub value: String,
    focus_requested: bool,
}

impl TextEntry {
    pub fn open(&mut self) {
        self.visible = true;
        self.value.clear();
        self.focus_requested = true;
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.focus_requested = false;
    }

    /// True once after each `open`.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }
}
