use crate::model::actor::Persona;
use crate::model::envelope::DialogueMode;
use crate::model::history::ConversationHistory;

/// Everything a single prompt is built from.
pub struct PromptInput<'a> {
    pub mode: DialogueMode,
    pub persona: &'a Persona,
    pub shared_knowledge: Option<&'a str>,
    pub history: &'a ConversationHistory,
    pub latest_player_utterance: Option<&'a str>,
    /// Per-option character limit quoted to the model in guided mode.
    pub option_char_budget: usize,
}

/// Builds the full prompt sent to the generation endpoint.
/// Pure text formatting: no parsing, no networking, no session state.
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build(input: &PromptInput<'_>) -> String {
        let mut prompt = String::new();

        push_system_prompt(&mut prompt);
        push_persona(&mut prompt, input.persona);

        if let Some(knowledge) = input.shared_knowledge.filter(|k| !k.trim().is_empty()) {
            push_shared_knowledge(&mut prompt, knowledge);
        }

        push_player_line(&mut prompt, input);
        push_history_section(&mut prompt, input.history);
        push_output_format(&mut prompt, input.mode, input.option_char_budget);

        prompt
    }
}

fn push_system_prompt(prompt: &mut String) {
    prompt.push_str(
        "You are helping me build dialogue for a top-down videogame. \
         Respond only with the text that the NPC would say.\n\n",
    );
}

fn push_persona(prompt: &mut String, persona: &Persona) {
    prompt.push_str(&format!(
        "For this exchange, you are playing the role of {}. \
         Here is the backstory for this NPC: {}.\n",
        persona.name, persona.backstory
    ));
}

fn push_shared_knowledge(prompt: &mut String, knowledge: &str) {
    prompt.push_str(&format!(
        "Here is some knowledge that's common to all characters in the game: {}.\n",
        knowledge.trim()
    ));
}

fn push_player_line(prompt: &mut String, input: &PromptInput<'_>) {
    match input.latest_player_utterance.filter(|u| !u.trim().is_empty()) {
        Some(utterance) => {
            prompt.push_str("\nHere is the player's latest dialogue:\n");
            prompt.push_str(utterance.trim());
            prompt.push('\n');
        }
        None if input.history.is_empty() => {
            prompt.push_str(
                "\nThe player is waiting for you to speak or has just approached you.\n",
            );
        }
        None => {}
    }
}

fn push_history_section(prompt: &mut String, history: &ConversationHistory) {
    if history.is_empty() {
        return;
    }

    prompt.push_str("\nHere is the conversation history (most recent last):\n");
    for entry in history.entries() {
        prompt.push_str(&format!("{}: {}\n", entry.speaker, entry.text));
    }
}

fn push_output_format(prompt: &mut String, mode: DialogueMode, option_char_budget: usize) {
    prompt.push_str(
        "\nPlease return your response as a single JSON object in the following format:\n{\n",
    );
    prompt.push_str("    \"text\": \"<Your response here>\",\n");

    match mode {
        DialogueMode::Guided => {
            prompt.push_str(
                "    \"endConversation\": <true if the conversation should end, false otherwise>,\n",
            );
            prompt.push_str(&format!(
                "    \"responseOptions\": <JSON array of strings, each a response that the player \
                 can choose from as a reply to the NPC's dialogue, maximum of 3. These should all \
                 be distinctly different. Keep each under {option_char_budget} characters.>\n"
            ));
        }
        DialogueMode::Unguided => {
            prompt.push_str(
                "    \"endConversation\": <true if the conversation should end, false otherwise>\n",
            );
        }
    }

    prompt.push_str("}\nReturn nothing outside the JSON object.\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::history::Speaker;

    fn miranda() -> Persona {
        Persona {
            name: "Miranda".into(),
            backstory: "Office manager who has seen it all".into(),
        }
    }

    fn input<'a>(
        mode: DialogueMode,
        persona: &'a Persona,
        history: &'a ConversationHistory,
    ) -> PromptInput<'a> {
        PromptInput {
            mode,
            persona,
            shared_knowledge: None,
            history,
            latest_player_utterance: None,
            option_char_budget: 60,
        }
    }

    #[test]
    fn opening_prompt_has_persona_and_approach_cue() {
        let persona = miranda();
        let history = ConversationHistory::default();
        let prompt = PromptBuilder::build(&input(DialogueMode::Guided, &persona, &history));

        assert!(prompt.starts_with("You are helping me build dialogue"));
        assert!(prompt.contains("playing the role of Miranda"));
        assert!(prompt.contains("Office manager who has seen it all"));
        assert!(prompt.contains("has just approached you"));
        assert!(!prompt.contains("conversation history"));
        assert!(prompt.contains("\"responseOptions\""));
        assert!(prompt.contains("under 60 characters"));
    }

    #[test]
    fn history_is_serialized_oldest_first() {
        let persona = miranda();
        let mut history = ConversationHistory::default();
        history.push(Speaker::Npc("Miranda".into()), "Yo.");
        history.push(Speaker::Player, "Hi");
        let prompt = PromptBuilder::build(&input(DialogueMode::Guided, &persona, &history));

        let npc = prompt.find("Miranda: Yo.").unwrap();
        let player = prompt.find("Player: Hi").unwrap();
        assert!(npc < player);
        assert!(!prompt.contains("has just approached you"));
    }

    #[test]
    fn unguided_prompt_carries_knowledge_and_utterance() {
        let persona = miranda();
        let mut history = ConversationHistory::default();
        history.push(Speaker::Npc("Miranda".into()), "What now?");
        history.push(Speaker::Player, "Where is the stapler?");

        let mut p = input(DialogueMode::Unguided, &persona, &history);
        p.shared_knowledge = Some("The coffee machine is broken");
        p.latest_player_utterance = Some("Where is the stapler?");
        let prompt = PromptBuilder::build(&p);

        assert!(
            prompt.contains("common to all characters in the game: The coffee machine is broken.")
        );
        assert!(prompt.contains("player's latest dialogue:\nWhere is the stapler?"));
        assert!(prompt.contains("\"endConversation\""));
        assert!(!prompt.contains("responseOptions"));
    }

    #[test]
    fn build_is_deterministic() {
        let persona = miranda();
        let history = ConversationHistory::default();
        let p = input(DialogueMode::Unguided, &persona, &history);
        assert_eq!(PromptBuilder::build(&p), PromptBuilder::build(&p));
    }
}
