use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::model::error::DialogueError;
use crate::ui::settings::GenerationSettings;

#[derive(Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<RequestContent>,
}

#[derive(Serialize)]
pub struct RequestContent {
    pub parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
pub struct Candidate {
    pub content: CandidateContent,
}

#[derive(Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl GenerateContentRequest {
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        }
    }
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`, or a transport failure.
    pub fn into_text(self) -> Result<String, DialogueError> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| {
                DialogueError::Transport("response carried no candidate text".to_string())
            })
    }
}

/// One prompt in, one raw reply out. No retries.
pub trait GenerationClient {
    fn generate(&self, prompt: &str) -> Result<String, DialogueError>;
}

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Hosted `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    settings: GenerationSettings,
}

impl GeminiClient {
    pub fn new(settings: GenerationSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    fn api_key(&self) -> String {
        std::env::var(&self.settings.api_key_env).unwrap_or_default()
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }

    /// Reachability check for the settings panel.
    pub fn check_connection(&self) -> Result<String, DialogueError> {
        let resp: serde_json::Value = self
            .client
            .get(format!("{}/models", self.settings.base_url.trim_end_matches('/')))
            .header(API_KEY_HEADER, self.api_key())
            .send()?
            .error_for_status()?
            .json()?;

        Ok(format!(
            "Connected ({} models available)",
            resp["models"].as_array().map(|a| a.len()).unwrap_or(0)
        ))
    }
}

impl GenerationClient for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, DialogueError> {
        let resp = self
            .client
            .post(self.generate_url())
            .header(API_KEY_HEADER, self.api_key())
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DialogueError::Transport(format!("HTTP status {status}")));
        }

        resp.json::<GenerateContentResponse>()?.into_text()
    }
}
