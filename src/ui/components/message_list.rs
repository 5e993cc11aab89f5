//! Message list component
//!
//! Displays the transcript, followed by the processing steps (or a typing
//! indicator) while a request is in flight.

use crate::backend::ProcessingStep;
use crate::messages::{ImagePreview, Message};
use crate::session::SessionController;
use egui::{self, Align, Align2, Color32, FontId, RichText, Sense, Vec2};
use std::time::Instant;

const SPACING: f32 = 12.0;
const SPACING_SM: f32 = 6.0;
const AVATAR_SIZE: f32 = 24.0;

/// Message list component
pub struct MessageList<'a> {
    session: &'a SessionController,
    now: Instant,
}

impl<'a> MessageList<'a> {
    pub fn new(session: &'a SessionController) -> Self {
        Self {
            session,
            now: Instant::now(),
        }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let messages = self.session.messages();
        let busy = self.session.is_busy();

        egui::ScrollArea::vertical()
            .id_salt("transcript")
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.add_space(SPACING);

                if messages.is_empty() && !busy {
                    self.show_empty_state(ui);
                }

                for message in &messages {
                    self.show_message(ui, message);
                    ui.add_space(SPACING_SM);
                }

                if busy {
                    self.show_progress(ui);
                }

                ui.add_space(SPACING);
            });
    }

    fn show_empty_state(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(60.0);
            ui.label(
                RichText::new(format!("Say hello to {}", self.session.config().assistant_name))
                    .size(20.0)
                    .color(ui.visuals().strong_text_color()),
            );
            ui.label(
                RichText::new("Type a message, drop an image here, or use the microphone.")
                    .color(ui.visuals().weak_text_color()),
            );
        });
    }

    fn show_message(&self, ui: &mut egui::Ui, message: &Message) {
        let is_user = message.is_user();
        let align = if is_user { Align::RIGHT } else { Align::LEFT };

        let (sender, initial) = if is_user {
            let profile = self.session.profile();
            (profile.name.clone(), profile.initial())
        } else {
            let name = self.session.config().assistant_name.clone();
            let initial = name.chars().next().map(String::from).unwrap_or_default();
            (name, initial)
        };

        ui.with_layout(egui::Layout::top_down(align), |ui| {
            ui.horizontal(|ui| {
                avatar(ui, &initial, is_user);
                ui.label(
                    RichText::new(sender)
                        .size(12.0)
                        .color(ui.visuals().weak_text_color()),
                );
            });

            let fill = if is_user {
                ui.visuals().selection.bg_fill
            } else {
                ui.visuals().faint_bg_color
            };
            let max_width = ui.available_width() * 0.75;

            egui::Frame::none()
                .fill(fill)
                .rounding(10.0)
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    ui.set_max_width(max_width);

                    if let Some(image) = &message.image {
                        image_chip(ui, image);
                    }

                    if !message.content.is_empty() {
                        let label_text = if is_user {
                            format!("User message: {}", message.content)
                        } else {
                            format!("Assistant response: {}", message.content)
                        };
                        let response = ui.label(&message.content);
                        response.widget_info(|| {
                            egui::WidgetInfo::labeled(egui::WidgetType::Label, true, &label_text)
                        });
                    }
                });

            ui.horizontal(|ui| {
                let time_str = message
                    .timestamp
                    .with_timezone(&chrono::Local)
                    .format("%H:%M")
                    .to_string();
                ui.label(
                    RichText::new(time_str)
                        .size(10.0)
                        .color(ui.visuals().weak_text_color()),
                );

                if let Some(source) = &message.source {
                    ui.label(
                        RichText::new(format!("Source: {}", source))
                            .size(10.0)
                            .italics()
                            .color(ui.visuals().weak_text_color()),
                    );
                }
            });
        });
    }

    fn show_progress(&self, ui: &mut egui::Ui) {
        let steps = self.session.visible_steps(self.now);

        ui.with_layout(egui::Layout::top_down(Align::LEFT), |ui| {
            egui::Frame::none()
                .fill(ui.visuals().faint_bg_color)
                .rounding(10.0)
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    if steps.is_empty() {
                        typing_indicator(ui);
                    } else {
                        for step in steps {
                            step_row(ui, step);
                        }
                    }
                });
        });
    }
}

fn avatar(ui: &mut egui::Ui, initial: &str, is_user: bool) {
    let (rect, _) = ui.allocate_exact_size(Vec2::splat(AVATAR_SIZE), Sense::hover());
    let fill = if is_user {
        ui.visuals().selection.stroke.color
    } else {
        ui.visuals().widgets.active.bg_fill
    };

    let painter = ui.painter();
    painter.circle_filled(rect.center(), AVATAR_SIZE / 2.0, fill);
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        initial,
        FontId::proportional(13.0),
        Color32::WHITE,
    );
}

fn image_chip(ui: &mut egui::Ui, image: &ImagePreview) {
    let name = image.file_name();
    let label_text = format!("Attached image: {}", name);

    let response = ui.label(RichText::new(format!("🖼 {} ({})", name, image.mime_type)).strong());
    response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Label, true, &label_text));
}

fn step_row(ui: &mut egui::Ui, step: &ProcessingStep) {
    let label_text = format!("Processing step: {}", step.status);
    let text = if step.icon.is_empty() {
        step.status.clone()
    } else {
        format!("{} {}", step.icon, step.status)
    };

    let response = ui.label(text);
    response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Label, true, &label_text));
}

fn typing_indicator(ui: &mut egui::Ui) {
    let t = ui.ctx().input(|i| i.time);
    let alpha = ((t * 3.0).sin() * 0.5 + 0.5) as f32;

    let response = ui.label(
        RichText::new("● ● ●")
            .size(10.0)
            .color(ui.visuals().weak_text_color().gamma_multiply(alpha)),
    );
    response.widget_info(|| {
        egui::WidgetInfo::labeled(egui::WidgetType::Label, true, "Assistant is typing")
    });
}
