//! GUI implementation with egui/eframe
//!
//! A thin chat window over the session controller.

mod app;
mod components;

pub use app::ChatApp;
pub use components::{InputBar, MessageList, NoticeBar};

use crate::session::SessionController;

/// Run the chat window until it is closed
pub fn run(session: SessionController) -> eframe::Result<()> {
    let title = format!("{} Assistant", session.config().assistant_name);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 760.0])
            .with_min_inner_size([420.0, 400.0])
            .with_drag_and_drop(true)
            .with_title(title),
        ..Default::default()
    };

    eframe::run_native(
        "Maya",
        options,
        Box::new(move |_cc| Ok(Box::new(ChatApp::new(session)))),
    )
}
