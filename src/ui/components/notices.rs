use eframe::egui;

use crate::ui::state::ActiveNotice;

pub fn render(ctx: &egui::Context, notices: &[ActiveNotice]) {
    if notices.is_empty() {
        return;
    }

    egui::Area::new(egui::Id::new("notices"))
        .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -64.0))
        .interactable(false)
        .show(ctx, |ui| {
            for notice in notices {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(&notice.text);
                });
            }
        });
}
