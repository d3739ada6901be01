use egui::{Color32, Pos2, Rect, RichText, Stroke};

use crate::ui::settings::Settings;

/// Dialogue box height in game units.
pub const DIALOGUE_BOX_HEIGHT: f32 = 200.0;

/// Screen rectangle for the free-text entry: the full width of the viewport,
/// covering the dialogue box at the bottom.
pub fn entry_rect(viewport: Rect, display_scale: f32) -> Rect {
    let height = (DIALOGUE_BOX_HEIGHT * display_scale).min(viewport.height());
    Rect::from_min_max(
        Pos2::new(viewport.left(), viewport.bottom() - height),
        viewport.right_bottom(),
    )
}

/// Option lines starting with `>` are the highlighted menu entry; NPC chunks
/// carry their `(i/n)` counter and the player's echo starts with `You:`.
pub fn line_color(settings: &Settings, line: &str) -> Color32 {
    if line.starts_with('>') {
        Color32::from_rgb(34, 210, 10)
    } else if line.starts_with("You:") {
        settings.color("Player")
    } else if line.starts_with('(') {
        settings.color("Npc")
    } else {
        settings.color("DialogueText")
    }
}

/// Paints the dialogue box text.
pub fn show(ctx: &egui::Context, settings: &Settings, text: &str) {
    let height = DIALOGUE_BOX_HEIGHT * settings.display_scale;

    egui::TopBottomPanel::bottom("dialogue_box")
        .exact_height(height)
        .frame(
            egui::Frame::new()
                .fill(settings.color("DialogueBox"))
                .stroke(Stroke::new(5.0, Color32::BLACK))
                .inner_margin(egui::Margin::same(20)),
        )
        .show(ctx, |ui| {
            for line in text.lines() {
                let mut rich = RichText::new(line).color(line_color(settings, line));
                if line.starts_with('>') {
                    rich = rich.strong();
                }
                ui.label(rich.size(24.0 * settings.display_scale.max(0.5)));
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_covers_bottom_of_viewport() {
        let viewport = Rect::from_min_max(Pos2::new(10.0, 20.0), Pos2::new(906.0, 524.0));
        let rect = entry_rect(viewport, 0.7);

        assert_eq!(rect.left(), 10.0);
        assert_eq!(rect.right(), 906.0);
        assert_eq!(rect.bottom(), 524.0);
        assert!((rect.height() - 140.0).abs() < 1e-3);
    }

    #[test]
    fn entry_never_exceeds_viewport() {
        let viewport = Rect::from_min_max(Pos2::ZERO, Pos2::new(100.0, 50.0));
        let rect = entry_rect(viewport, 3.0);
        assert_eq!(rect, viewport);
    }

    #[test]
    fn lines_pick_speaker_colors() {
        let settings = Settings::default();
        assert_eq!(line_color(&settings, "(1/2) Yo. ..."), settings.color("Npc"));
        assert_eq!(line_color(&settings, "You: Hi"), settings.color("Player"));
        assert_eq!(line_color(&settings, "  Bye"), settings.color("DialogueText"));
        assert_eq!(line_color(&settings, "Thinking..."), settings.color("DialogueText"));
        assert_eq!(line_color(&settings, "> Hi"), Color32::from_rgb(34, 210, 10));
        assert_ne!(settings.color("Npc"), settings.color("DialogueText"));
        assert_ne!(settings.color("Player"), settings.color("DialogueText"));
    }
}
