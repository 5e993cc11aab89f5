//! Input bar component
//!
//! Provides the staged attachment, text input, voice and send controls.

use crate::session::SessionController;
use egui::{self, Key, RichText, Vec2};

const BUTTON_SIZE: f32 = 36.0;

/// Input bar component for text and voice input
pub struct InputBar<'a> {
    session: &'a mut SessionController,
}

impl<'a> InputBar<'a> {
    pub fn new(session: &'a mut SessionController) -> Self {
        Self { session }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        ui.vertical(|ui| {
            self.show_attachment(ui);

            ui.horizontal(|ui| {
                self.show_voice_button(ui);
                self.show_text_input(ui);
                self.show_send_button(ui);
            });
        });
    }

    fn show_attachment(&mut self, ui: &mut egui::Ui) {
        let Some(attachment) = self.session.attachment() else {
            return;
        };
        let name = attachment.preview().file_name();

        ui.horizontal(|ui| {
            ui.label(RichText::new("🖼").size(16.0));
            let label = ui.label(RichText::new(&name).strong());
            label.widget_info(|| {
                egui::WidgetInfo::labeled(
                    egui::WidgetType::Label,
                    true,
                    format!("Staged image: {}", name),
                )
            });

            let remove = ui.small_button("✖");
            remove.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::Button, true, "Remove attachment")
            });
            if remove.clicked() {
                self.session.clear_attachment();
            }
        });
    }

    fn show_voice_button(&mut self, ui: &mut egui::Ui) {
        let available = self.session.voice_input_available();
        let listening = self.session.is_listening();

        let (icon, label, tooltip) = if listening {
            ("⏹", "Stop voice input", "Stop listening")
        } else if available {
            ("🎤", "Start voice input", "Speak a message")
        } else {
            ("🎤", "Start voice input", "Voice input is not available")
        };

        let mut button = egui::Button::new(RichText::new(icon).size(18.0))
            .min_size(Vec2::splat(BUTTON_SIZE));
        if listening {
            button = button.fill(ui.visuals().error_fg_color.gamma_multiply(0.3));
        }

        let response = ui.add_enabled(available, button);
        response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Button, available, label));

        if response.clicked() {
            if listening {
                self.session.stop_listening();
            } else {
                self.session.start_listening();
            }
        }

        response.on_hover_text(tooltip);
    }

    fn show_text_input(&mut self, ui: &mut egui::Ui) {
        // Leave room for the send button
        let available_width = (ui.available_width() - BUTTON_SIZE - 16.0).max(80.0);

        let text_edit = egui::TextEdit::singleline(self.session.draft_text_mut())
            .hint_text("Type a message...")
            .desired_width(available_width)
            .id(egui::Id::new("message_input"))
            .margin(egui::Margin::symmetric(10.0, 8.0));

        let response = ui.add(text_edit);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, true, "Message input")
        });

        // Singleline edits give up focus on Enter
        if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) && self.session.submit() {
            response.request_focus();
        }
    }

    fn show_send_button(&mut self, ui: &mut egui::Ui) {
        let can_send = !self.session.is_busy() && !self.session.draft().is_empty();

        let button = egui::Button::new(RichText::new("➤").size(18.0))
            .min_size(Vec2::splat(BUTTON_SIZE));
        let response = ui.add_enabled(can_send, button);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, can_send, "Send message")
        });

        if response.clicked() {
            self.session.submit();
        }

        let tooltip = if self.session.is_busy() {
            "Waiting for the reply"
        } else {
            "Send message (Enter)"
        };
        response.on_hover_text(tooltip);
    }
}
