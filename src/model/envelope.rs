use serde::{Deserialize, Serialize};

/// Which conversation variant is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueMode {
    /// The player picks one of the model's suggested replies.
    #[default]
    Guided,
    /// The player types free-form replies.
    Unguided,
}

/// Decoded reply from the model. Fields are always populated; defaults are
/// applied during decoding, never later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope {
    pub text: String,
    pub end_conversation: bool,
    pub response_options: Vec<String>,
}
