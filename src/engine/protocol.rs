use crate::model::error::DialogueError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

/// Identifies one outstanding generation request: which session asked, and
/// which of that session's requests it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub session: SessionId,
    pub seq: u64,
}

pub struct GenerationJob {
    pub ticket: Ticket,
    pub prompt: String,
}

pub struct GenerationDone {
    pub ticket: Ticket,
    pub result: Result<String, DialogueError>,
}

/// Where a session sends prompts. The result comes back later as a
/// [`GenerationDone`] carrying the same ticket.
pub trait GenerationDispatch {
    fn dispatch(&mut self, ticket: Ticket, prompt: String);
}
