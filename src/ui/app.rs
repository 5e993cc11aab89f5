//! Main application struct and eframe integration
//!
//! `ChatApp` drives the session and lays out the window once per frame.

use crate::session::SessionController;
use crate::ui::components::{InputBar, MessageList, NoticeBar};
use egui::{self, CentralPanel, RichText, TopBottomPanel};
use std::time::Duration;
use tracing::{debug, info};

/// Repaint cadence while something is animating or pending
const ACTIVE_REPAINT_INTERVAL: Duration = Duration::from_millis(100);

/// Stage the first dropped file the session accepts as an image
fn accept_dropped_files(ctx: &egui::Context, session: &mut SessionController) {
    let dropped = ctx.input(|i| i.raw.dropped_files.clone());
    for file in dropped {
        match file.path {
            Some(path) => {
                if session.attach_file(path) {
                    break;
                }
            }
            None => debug!("Ignoring dropped file without a path: {}", file.name),
        }
    }
}

/// Main chat application
pub struct ChatApp {
    session: SessionController,
}

impl ChatApp {
    pub fn new(session: SessionController) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    /// Show the top header bar
    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(10.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(&self.session.config().assistant_name)
                            .size(20.0)
                            .strong(),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let profile = self.session.profile();
                        if !profile.role.is_empty() {
                            ui.label(
                                RichText::new(&profile.role)
                                    .size(12.0)
                                    .color(ui.visuals().weak_text_color()),
                            );
                        }
                        ui.label(RichText::new(&profile.name).strong());
                    });
                });
            });
    }

    /// Show the bottom input area
    fn show_input_area(&mut self, ctx: &egui::Context) {
        TopBottomPanel::bottom("input_area")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(10.0))
            .show(ctx, |ui| {
                NoticeBar::new(&mut self.session).show(ui);
                InputBar::new(&mut self.session).show(ui);
            });
    }

    /// Show the main content area (message list)
    fn show_content(&mut self, ctx: &egui::Context) {
        CentralPanel::default().show(ctx, |ui| {
            MessageList::new(&self.session).show(ui);
        });
    }

    /// Run one frame: apply pending events, then draw every panel
    pub fn show(&mut self, ctx: &egui::Context) {
        self.session.initialize();
        self.session.poll_events();
        accept_dropped_files(ctx, &mut self.session);

        self.show_header(ctx);
        self.show_input_area(ctx);
        self.show_content(ctx);

        if self.needs_repaint() {
            ctx.request_repaint_after(ACTIVE_REPAINT_INTERVAL);
        }
    }

    fn needs_repaint(&self) -> bool {
        self.session.is_busy()
            || self.session.is_listening()
            || self.session.profile_state() == crate::profile::ProfileState::Loading
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Chat window closing");
        self.session.stop_listening();
    }
}
