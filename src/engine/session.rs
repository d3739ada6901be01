use egui::Key;

use crate::engine::chunker;
use crate::engine::input::{InputAction, KeyBindings, TextEntry, TurnInput};
use crate::engine::prompt_builder::{PromptBuilder, PromptInput};
use crate::engine::protocol::{GenerationDispatch, GenerationDone, SessionId, Ticket};
use crate::engine::response_parser;
use crate::model::actor::{ActorHandle, Persona};
use crate::model::envelope::{DialogueMode, ResponseEnvelope};
use crate::model::error::DialogueError;
use crate::model::history::{ConversationHistory, Speaker};

pub const PARSE_FALLBACK_LINE: &str =
    "I'm sorry, I had a bit of trouble understanding. Could you try saying that again?";
pub const TRANSPORT_FALLBACK_LINE: &str =
    "There was an issue connecting. Could you say that again?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingGeneration,
    DisplayingChunks,
    AwaitingPlayerInput,
    Ended,
}

/// Per-session knobs, resolved from settings when the session is created.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub mode: DialogueMode,
    pub chunk_len: usize,
    pub option_char_budget: usize,
    pub shared_knowledge: Option<String>,
}

/// The on-screen dialogue box. Replaced wholesale for every new NPC line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogueBox {
    pub text: String,
}

/// Chunks of the NPC's current line plus a display cursor.
#[derive(Debug, Clone, Default)]
pub struct DialogueQueue {
    chunks: Vec<String>,
    cursor: usize,
}

impl DialogueQueue {
    fn replace(&mut self, chunks: Vec<String>) {
        self.chunks = chunks;
        self.cursor = 0;
    }

    fn clear(&mut self) {
        self.replace(Vec::new());
    }

    /// Next chunk formatted with its `(i/total)` counter; every chunk except
    /// the last gets a trailing ` ...`.
    fn next_display_line(&mut self) -> Option<String> {
        let chunk = self.chunks.get(self.cursor)?;
        let total = self.chunks.len();
        let mut line = format!("({}/{}) {}", self.cursor + 1, total, chunk);
        if self.cursor + 1 < total {
            line.push_str(" ...");
        }
        self.cursor += 1;
        Some(line)
    }

    #[cfg(test)]
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.chunks.len()
    }
}

/// One exchange between the player and a single NPC, from collision to
/// finalize. A session is never restarted once it has ended.
pub struct ConversationSession {
    id: SessionId,
    config: SessionConfig,
    player: ActorHandle,
    npc: ActorHandle,
    persona: Option<Persona>,

    state: SessionState,
    history: ConversationHistory,
    queue: DialogueQueue,
    end_after_queue: bool,
    options: Vec<String>,
    selected: usize,

    dialogue_box: Option<DialogueBox>,
    text_entry: TextEntry,
    bindings: KeyBindings,

    next_seq: u64,
    pending: Option<Ticket>,
}

impl ConversationSession {
    pub fn new(
        id: SessionId,
        config: SessionConfig,
        player: ActorHandle,
        npc: ActorHandle,
    ) -> Self {
        Self {
            id,
            config,
            player,
            npc,
            persona: None,
            state: SessionState::Idle,
            history: ConversationHistory::default(),
            queue: DialogueQueue::default(),
            end_after_queue: false,
            options: Vec::new(),
            selected: 0,
            dialogue_box: None,
            text_entry: TextEntry::default(),
            bindings: KeyBindings::default(),
            next_seq: 0,
            pending: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> DialogueMode {
        self.config.mode
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, SessionState::Idle | SessionState::Ended)
    }

    #[cfg(test)]
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    #[cfg(test)]
    pub fn queue(&self) -> &DialogueQueue {
        &self.queue
    }

    #[cfg(test)]
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn dialogue_box(&self) -> Option<&DialogueBox> {
        self.dialogue_box.as_ref()
    }

    pub fn text_entry(&self) -> &TextEntry {
        &self.text_entry
    }

    pub fn text_entry_mut(&mut self) -> &mut TextEntry {
        &mut self.text_entry
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn npc_name(&self) -> Option<&str> {
        self.persona.as_ref().map(|p| p.name.as_str())
    }

    /// Claims both actors and fires the opening request.
    pub fn start(&mut self, dispatch: &mut dyn GenerationDispatch) -> Result<(), DialogueError> {
        if self.state != SessionState::Idle {
            return Err(DialogueError::PreconditionViolation(
                "session has already been started".to_string(),
            ));
        }

        let npc = self
            .npc
            .get()
            .ok_or_else(|| DialogueError::PreconditionViolation("NPC does not exist".to_string()))?;
        let player = self.player.get().ok_or_else(|| {
            DialogueError::PreconditionViolation("player does not exist".to_string())
        })?;
        let persona = npc.persona().cloned().ok_or_else(|| {
            DialogueError::PreconditionViolation("target actor has no persona".to_string())
        })?;
        if player.is_in_dialogue() {
            return Err(DialogueError::PreconditionViolation(
                "player is already in a conversation".to_string(),
            ));
        }

        log::info!("{:?}: starting conversation with {}", self.id, persona.name);

        player.set_in_dialogue(true);
        npc.set_in_dialogue(true);
        player.set_last_utterance("");

        self.persona = Some(persona);
        self.history.clear();
        self.bindings = KeyBindings::attach(TurnInput::from(self.config.mode));
        self.request_generation(dispatch);
        Ok(())
    }

    /// Applies a finished generation request. Results for anything other than
    /// the outstanding ticket come back as `StaleResolution` and change nothing.
    pub fn resolve(&mut self, done: GenerationDone) -> Result<(), DialogueError> {
        if self.state != SessionState::AwaitingGeneration || self.pending != Some(done.ticket) {
            return Err(DialogueError::StaleResolution(done.ticket));
        }
        self.pending = None;

        if !self.npc.exists() || !self.player.exists() {
            log::warn!("{:?}: an actor left the scene mid-conversation", self.id);
            self.finalize();
            return Ok(());
        }

        let mode = self.config.mode;
        let parsed = done
            .result
            .and_then(|raw| response_parser::parse(&raw, mode));

        match (parsed, mode) {
            (Ok(envelope), _) => self.apply_envelope(envelope),
            (Err(e), DialogueMode::Guided) => {
                log::error!("{:?}: ending conversation: {}", self.id, e);
                self.finalize();
            }
            (Err(e @ DialogueError::MalformedResponse(_)), DialogueMode::Unguided) => {
                log::warn!("{:?}: {}", self.id, e);
                self.show_fallback(PARSE_FALLBACK_LINE);
            }
            (Err(e), DialogueMode::Unguided) => {
                log::warn!("{:?}: {}", self.id, e);
                self.show_fallback(TRANSPORT_FALLBACK_LINE);
            }
        }
        Ok(())
    }

    pub fn advance(&mut self) {
        if self.state != SessionState::DisplayingChunks {
            return;
        }

        if !self.queue.is_exhausted() {
            self.show_next_chunk();
        } else if self.end_after_queue {
            self.finalize();
        } else {
            self.enter_player_input();
        }
    }

    pub fn move_selection_up(&mut self) {
        if !self.choosing() || self.selected == 0 {
            return;
        }
        self.selected -= 1;
        self.render_options();
    }

    pub fn move_selection_down(&mut self) {
        if !self.choosing() || self.selected + 1 >= self.options.len() {
            return;
        }
        self.selected += 1;
        self.render_options();
    }

    pub fn confirm_selection(&mut self, dispatch: &mut dyn GenerationDispatch) {
        if !self.choosing() {
            return;
        }
        let Some(choice) = self.options.get(self.selected).cloned() else {
            return;
        };

        self.history.push(Speaker::Player, choice);
        self.selected = 0;
        self.request_generation(dispatch);
    }

    pub fn submit_text(&mut self, text: &str, dispatch: &mut dyn GenerationDispatch) {
        if self.state != SessionState::AwaitingPlayerInput
            || self.config.mode != DialogueMode::Unguided
        {
            return;
        }

        let typed = text.trim();
        self.text_entry.close();

        let Some(player) = self.player.get() else {
            log::warn!("{:?}: player left the scene before submitting", self.id);
            self.finalize();
            return;
        };
        player.set_last_utterance(typed);
        self.history.push(Speaker::Player, typed);

        if let Some(dialogue_box) = &mut self.dialogue_box {
            let shown = if typed.is_empty() { "..." } else { typed };
            dialogue_box.text = format!("You: {shown}\nThinking...");
        }

        self.request_generation(dispatch);
    }

    pub fn cancel(&mut self) {
        if !self.is_active() {
            return;
        }
        log::info!("{:?}: conversation cancelled", self.id);
        self.finalize();
    }

    pub fn handle_key(&mut self, key: Key, dispatch: &mut dyn GenerationDispatch) {
        if let Some(action) = self.bindings.lookup(key) {
            self.handle_action(action, dispatch);
        }
    }

    pub fn handle_action(&mut self, action: InputAction, dispatch: &mut dyn GenerationDispatch) {
        TurnInput::from(self.config.mode).apply(self, action, dispatch);
    }

    fn choosing(&self) -> bool {
        self.state == SessionState::AwaitingPlayerInput && self.config.mode == DialogueMode::Guided
    }

    fn request_generation(&mut self, dispatch: &mut dyn GenerationDispatch) {
        if !self.npc.exists() || !self.player.exists() {
            log::warn!("{:?}: an actor left the scene before the next request", self.id);
            self.finalize();
            return;
        }
        let Some(persona) = self.persona.as_ref() else {
            self.finalize();
            return;
        };

        let latest_utterance = match self.config.mode {
            DialogueMode::Unguided => self.player.get().map(|p| p.last_utterance()),
            DialogueMode::Guided => None,
        };

        let prompt = PromptBuilder::build(&PromptInput {
            mode: self.config.mode,
            persona,
            shared_knowledge: self.config.shared_knowledge.as_deref(),
            history: &self.history,
            latest_player_utterance: latest_utterance.as_deref(),
            option_char_budget: self.config.option_char_budget,
        });

        self.next_seq += 1;
        let ticket = Ticket {
            session: self.id,
            seq: self.next_seq,
        };
        self.pending = Some(ticket);
        self.state = SessionState::AwaitingGeneration;
        dispatch.dispatch(ticket, prompt);
    }

    fn apply_envelope(&mut self, envelope: ResponseEnvelope) {
        let speaker = Speaker::Npc(self.npc_name().unwrap_or("NPC").to_string());
        self.history.push(speaker, envelope.text.clone());

        self.end_after_queue = envelope.end_conversation;
        self.options = envelope.response_options;
        self.selected = 0;

        if self.config.mode == DialogueMode::Guided
            && self.options.is_empty()
            && !self.end_after_queue
        {
            log::warn!("{:?}: reply offered no options; ending after this line", self.id);
            self.end_after_queue = true;
        }

        self.queue
            .replace(chunker::chunk(&envelope.text, self.config.chunk_len));
        self.dialogue_box = Some(DialogueBox::default());
        self.state = SessionState::DisplayingChunks;
        self.show_next_chunk();
    }

    /// Shows a canned line without touching history.
    fn show_fallback(&mut self, line: &str) {
        self.end_after_queue = false;
        self.options.clear();
        self.selected = 0;
        self.queue.replace(chunker::chunk(line, self.config.chunk_len));
        self.dialogue_box.get_or_insert_with(DialogueBox::default);
        self.state = SessionState::DisplayingChunks;
        self.show_next_chunk();
    }

    fn show_next_chunk(&mut self) {
        let Some(line) = self.queue.next_display_line() else {
            return;
        };
        if let Some(dialogue_box) = &mut self.dialogue_box {
            dialogue_box.text = line;
        }
    }

    fn enter_player_input(&mut self) {
        self.state = SessionState::AwaitingPlayerInput;
        match self.config.mode {
            DialogueMode::Guided => {
                self.selected = 0;
                self.render_options();
            }
            DialogueMode::Unguided => {
                if let Some(dialogue_box) = &mut self.dialogue_box {
                    dialogue_box.text.clear();
                }
                self.text_entry.open();
            }
        }
    }

    fn render_options(&mut self) {
        let text = self
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let marker = if i == self.selected { ">" } else { " " };
                format!("{marker} {option}")
            })
            .collect::<Vec<_>>()
            .join("\n");

        if let Some(dialogue_box) = &mut self.dialogue_box {
            dialogue_box.text = text;
        }
    }

    fn finalize(&mut self) {
        self.dialogue_box = None;
        self.text_entry.close();
        self.text_entry.value.clear();

        self.history.clear();
        self.queue.clear();
        self.options.clear();
        self.selected = 0;
        self.end_after_queue = false;
        self.pending = None;

        if let Some(npc) = self.npc.get() {
            npc.set_in_dialogue(false);
        }
        if let Some(player) = self.player.get() {
            player.set_in_dialogue(false);
            player.set_last_utterance("");
        }

        self.bindings.cancel();
        self.state = SessionState::Ended;
        log::info!("{:?}: conversation ended", self.id);
    }
}
