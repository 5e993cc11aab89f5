use crate::session::SessionController;
use egui::{self, RichText};

/// Dismissible notice for problems outside the conversation
pub struct NoticeBar<'a> {
    session: &'a mut SessionController,
}

impl<'a> NoticeBar<'a> {
    pub fn new(session: &'a mut SessionController) -> Self {
        Self { session }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let Some(notice) = self.session.notice().map(str::to_owned) else {
            return;
        };

        egui::Frame::none()
            .fill(ui.visuals().warn_fg_color.gamma_multiply(0.15))
            .rounding(6.0)
            .inner_margin(egui::Margin::symmetric(10.0, 6.0))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let label = ui.label(RichText::new(&notice).color(ui.visuals().warn_fg_color));
                    label.widget_info(|| {
                        egui::WidgetInfo::labeled(
                            egui::WidgetType::Label,
                            true,
                            format!("Notice: {}", notice),
                        )
                    });

                    let dismiss = ui.small_button("✖");
                    dismiss.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Button, true, "Dismiss notice")
                    });
                    if dismiss.clicked() {
                        self.session.dismiss_notice();
                    }
                });
            });
    }
}
