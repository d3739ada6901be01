use egui::Color32;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::engine::session::SessionConfig;
use crate::model::actor::Persona;
use crate::model::envelope::DialogueMode;

/// Where generation requests go. The API key itself is read from the named
/// environment variable at request time and never persisted.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GenerationSettings {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            model: "gemini-2.0-flash".into(),
            api_key_env: "GEMINI_API_KEY".into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub ui_scale: f32,

    /// Game units → screen pixels, used to size the text entry over the
    /// dialogue box.
    pub display_scale: f32,

    pub mode: DialogueMode,
    pub guided_chunk_len: usize,
    pub unguided_chunk_len: usize,
    pub option_char_budget: usize,

    /// Common-world context every NPC knows about (unguided mode only).
    pub shared_knowledge: String,
    pub npcs: Vec<Persona>,
    pub generation: GenerationSettings,

    // Speaker → color mapping (extensible)
    pub speaker_colors: HashMap<String, [u8; 4]>,
}

impl Default for Settings {
    fn default() -> Self {
        let mut speaker_colors = HashMap::new();

        speaker_colors.insert("DialogueBox".into(), [255, 255, 255, 255]);
        speaker_colors.insert("DialogueText".into(), [10, 10, 10, 255]);
        speaker_colors.insert("Npc".into(), [120, 80, 40, 255]);
        speaker_colors.insert("Player".into(), [40, 70, 120, 255]);

        Self {
            ui_scale: 1.0,
            display_scale: 0.7,
            mode: DialogueMode::Guided,
            guided_chunk_len: 80,
            unguided_chunk_len: 200,
            option_char_budget: 60,
            shared_knowledge: "Everyone works at the same small paper-supply office. \
                The coffee machine has been broken since Monday and nobody admits to breaking it. \
                The quarterly inventory audit is on Friday."
                .into(),
            npcs: vec![
                Persona {
                    name: "Miranda".into(),
                    backstory: "Miranda runs the front desk, talks fast, and knows every piece of \
                        office gossip. She keeps nudging the player to find out who broke the \
                        coffee machine."
                        .into(),
                },
                Persona {
                    name: "Dorothy".into(),
                    backstory: "Dorothy is the warehouse lead, endlessly cheerful and obsessed with \
                        theme parks. She turns cold if the player is dismissive about her hobby, \
                        and wants help counting boxes before the audit."
                        .into(),
                },
            ],
            generation: GenerationSettings::default(),
            speaker_colors,
        }
    }
}

impl Settings {
    pub fn session_config(&self) -> SessionConfig {
        let (chunk_len, shared_knowledge) = match self.mode {
            DialogueMode::Guided => (self.guided_chunk_len, None),
            DialogueMode::Unguided => {
                (self.unguided_chunk_len, Some(self.shared_knowledge.clone()))
            }
        };

        SessionConfig {
            mode: self.mode,
            chunk_len: chunk_len.max(1),
            option_char_budget: self.option_char_budget,
            shared_knowledge,
        }
    }

    pub fn color(&self, key: &str) -> Color32 {
        self.speaker_colors
            .get(key)
            .map(|c| Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3]))
            .unwrap_or(Color32::WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_follows_mode() {
        let mut settings = Settings::default();
        let guided = settings.session_config();
        assert_eq!(guided.chunk_len, 80);
        assert!(guided.shared_knowledge.is_none());

        settings.mode = DialogueMode::Unguided;
        let unguided = settings.session_config();
        assert_eq!(unguided.chunk_len, 200);
        assert!(unguided
            .shared_knowledge
            .as_deref()
            .is_some_and(|k| k.contains("coffee machine")));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"mode":"unguided","display_scale":1.5}"#).unwrap();
        assert_eq!(settings.mode, DialogueMode::Unguided);
        assert_eq!(settings.display_scale, 1.5);
        assert_eq!(settings.guided_chunk_len, 80);
        assert_eq!(settings.npcs.len(), 2);
        assert_eq!(settings.generation.api_key_env, "GEMINI_API_KEY");
    }

    #[test]
    fn unknown_color_is_white() {
        assert_eq!(Settings::default().color("Nope"), Color32::WHITE);
    }
}
