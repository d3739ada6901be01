use crate::engine::protocol::Ticket;

/// Everything that can go wrong between a collision and a finished exchange.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DialogueError {
    #[error("generation transport failed: {0}")]
    Transport(String),

    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    #[error("cannot start conversation: {0}")]
    PreconditionViolation(String),

    #[error("stale generation result for {0:?}")]
    StaleResolution(Ticket),
}

/// The request URL is dropped so nothing it carries reaches logs or the UI.
impl From<reqwest::Error> for DialogueError {
    fn from(err: reqwest::Error) -> Self {
        DialogueError::Transport(err.without_url().to_string())
    }
}
