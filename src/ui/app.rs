use std::sync::mpsc;

use egui::Layout;

use crate::engine::conversation::ConversationManager;
use crate::engine::input::InputAction;
use crate::engine::llm_client::GeminiClient;
use crate::engine::session::SessionState;
use crate::engine::worker::GenerationWorker;
use crate::model::envelope::DialogueMode;
use crate::model::scene::Scene;
use crate::ui::dialogue_box;
use crate::ui::settings::{GenerationSettings, Settings};
use crate::ui::settings_io::save_settings;

/* =========================
   App
   ========================= */

pub struct DialogueApp {
    settings: Settings,
    scene: Scene,
    manager: ConversationManager,
    worker: GenerationWorker,
    connection_status: String,
    connection_rx: Option<mpsc::Receiver<String>>,
}

/// Runs the reachability check off the UI thread; the receiver yields one
/// status line.
fn spawn_connection_check(settings: GenerationSettings) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let status = match GeminiClient::new(settings).check_connection() {
            Ok(s) => s,
            Err(e) => format!("Not connected: {e}"),
        };
        let _ = tx.send(status);
    });
    rx
}

impl DialogueApp {
    pub fn new(settings: Settings) -> Self {
        let scene = Scene::new(&settings.npcs);
        let manager = ConversationManager::new(scene.player(), settings.session_config());
        let worker = GenerationWorker::spawn(GeminiClient::new(settings.generation.clone()));

        Self {
            settings,
            scene,
            manager,
            worker,
            connection_status: String::new(),
            connection_rx: None,
        }
    }

    fn drain_generation(&mut self) {
        while let Some(done) = self.worker.poll() {
            self.manager.on_generation_done(done);
        }
    }

    fn poll_connection_check(&mut self) {
        let Some(rx) = &self.connection_rx else {
            return;
        };
        match rx.try_recv() {
            Ok(status) => {
                self.connection_status = status;
                self.connection_rx = None;
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                self.connection_status = "Not connected: check aborted".into();
                self.connection_rx = None;
            }
        }
    }

    fn route_keys(&mut self, ctx: &egui::Context) {
        let Some(session) = self.manager.session() else {
            return;
        };
        let bound: Vec<egui::Key> = session.bindings().keys().collect();

        for key in bound {
            if ctx.input(|i| i.key_pressed(key)) {
                self.manager.handle_key(key, &mut self.worker);
            }
        }
    }

    fn left_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("scene").resizable(false).default_width(200.0).show(ctx, |ui| {
            ui.heading("Office");
            ui.separator();

            let busy = self.manager.is_busy();

            ui.add_enabled_ui(!busy, |ui| {
                let before = self.settings.mode;
                ui.radio_value(&mut self.settings.mode, DialogueMode::Guided, "Guided replies");
                ui.radio_value(&mut self.settings.mode, DialogueMode::Unguided, "Free text");
                if self.settings.mode != before {
                    self.manager.set_config(self.settings.session_config());
                }
            });

            ui.separator();

            let mut collide_with = None;
            let mut despawn = None;
            for (i, npc) in self.scene.npcs().iter().enumerate() {
                ui.horizontal(|ui| {
                    let label = if npc.is_in_dialogue() {
                        format!("{} (talking)", npc.name())
                    } else {
                        npc.name().to_string()
                    };
                    if ui.add_enabled(!busy, egui::Button::new(label)).clicked() {
                        collide_with = Some(i);
                    }
                    if ui.small_button("✖").on_hover_text("Despawn").clicked() {
                        despawn = Some(i);
                    }
                });
            }

            if let Some(i) = collide_with {
                let npc = self.scene.npcs()[i].clone();
                if let Err(e) = self.manager.start(&npc, &mut self.worker) {
                    log::warn!("{e}");
                }
            }
            if let Some(i) = despawn {
                if let Some(npc) = self.scene.despawn(i) {
                    log::info!("{} left the office", npc.name());
                }
            }

            if ui.button("Respawn everyone").clicked() {
                self.scene.respawn_missing(&self.settings.npcs);
            }

            ui.separator();

            ui.label("UI scale");
            ui.add(egui::Slider::new(&mut self.settings.ui_scale, 0.5..=2.0));
            ui.label("Display scale");
            ui.add(egui::Slider::new(&mut self.settings.display_scale, 0.3..=2.0));

            ui.horizontal(|ui| {
                let checking = self.connection_rx.is_some();
                if ui.add_enabled(!checking, egui::Button::new("Check connection")).clicked() {
                    let generation = self.settings.generation.clone();
                    self.connection_rx = Some(spawn_connection_check(generation));
                    self.connection_status = "Checking...".into();
                }
                if ui.button("Save").clicked() {
                    save_settings(&self.settings);
                }
            });
            if !self.connection_status.is_empty() {
                ui.label(&self.connection_status);
            }
        });
    }

    fn text_entry(&mut self, ctx: &egui::Context) {
        let visible = self
            .manager
            .session()
            .is_some_and(|s| s.text_entry().visible);
        if !visible {
            return;
        }

        let rect = dialogue_box::entry_rect(ctx.screen_rect(), self.settings.display_scale);
        let mut action = None;

        if let Some(session) = self.manager.session_mut() {
            egui::Area::new(egui::Id::new("player_text_entry"))
                .fixed_pos(rect.min)
                .order(egui::Order::Foreground)
                .show(ctx, |ui| {
                    ui.set_min_size(rect.size());
                    egui::Frame::new()
                        .fill(self.settings.color("DialogueBox"))
                        .inner_margin(egui::Margin::same(20))
                        .show(ui, |ui| {
                            ui.set_min_size(rect.size() - egui::vec2(40.0, 40.0));
                            ui.with_layout(Layout::left_to_right(egui::Align::Center), |ui| {
                                let entry = session.text_entry_mut();
                                let focus = entry.take_focus_request();
                                let response = ui.add(
                                    egui::TextEdit::singleline(&mut entry.value)
                                        .hint_text("Say something...")
                                        .desired_width(rect.width() - 220.0),
                                );
                                if focus {
                                    response.request_focus();
                                }
                                if ui.button("Send").clicked() {
                                    action = Some(InputAction::Submit);
                                }
                                if ui.button("Leave").clicked() {
                                    action = Some(InputAction::Cancel);
                                }
                            });
                        });
                });
        }

        if let Some(action) = action {
            self.manager.handle_action(action, &mut self.worker);
        }
    }
}

/* =========================
   egui App
   ========================= */

impl eframe::App for DialogueApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.settings.ui_scale);

        self.drain_generation();
        self.poll_connection_check();
        self.route_keys(ctx);

        self.left_panel(ctx);

        let dialogue = self.manager.session().map(|s| {
            (
                s.state(),
                s.mode(),
                s.npc_name().unwrap_or_default().to_string(),
                s.dialogue_box().map(|b| b.text.clone()),
            )
        });

        if let Some((_, _, _, Some(text))) = &dialogue {
            dialogue_box::show(ctx, &self.settings, text);
        }

        egui::CentralPanel::default().show(ctx, |ui| match &dialogue {
            Some((SessionState::AwaitingGeneration, _, name, _)) => {
                ui.label(format!("{name} is thinking..."));
            }
            Some((SessionState::AwaitingPlayerInput, DialogueMode::Guided, name, _)) => {
                ui.label(format!("Answer {name}: W/S to choose, Space to reply, Esc to leave."));
            }
            Some((SessionState::AwaitingPlayerInput, DialogueMode::Unguided, name, _)) => {
                ui.label(format!("Type your reply to {name} and press Enter."));
            }
            Some((_, _, name, _)) => {
                ui.label(format!("Talking to {name}. Space to continue, Esc to leave."));
            }
            None => {
                ui.label("Walk into someone to start a conversation.");
            }
        });

        self.text_entry(ctx);

        // Keep polling while a reply or connection check is in flight.
        if self.connection_rx.is_some()
            || self
                .manager
                .session()
                .is_some_and(|s| s.state() == SessionState::AwaitingGeneration)
        {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}
