use eframe::egui;

use crate::composer::Composer;

#[derive(Debug, Default)]
pub struct InputActions {
    /// Raw text to send; the composer has already been cleared.
    pub send: Option<String>,
    pub pick_photo: bool,
}

pub fn render(
    ui: &mut egui::Ui,
    composer: &mut Composer,
    enabled: bool,
    uploading: bool,
) -> InputActions {
    let mut actions = InputActions::default();
    let mut send = false;

    ui.add_enabled_ui(enabled, |ui| {
        ui.horizontal(|ui| {
            if ui
                .button("Photo")
                .on_hover_text("Send a JPEG photo")
                .clicked()
            {
                actions.pick_photo = true;
            }
            if uploading {
                ui.add(egui::Spinner::new());
            }

            let limit = composer.limit();
            let response = ui.add(
                egui::TextEdit::singleline(composer.buffer_mut())
                    .char_limit(limit)
                    .hint_text("Message")
                    .desired_width(ui.available_width() - 60.0),
            );
            if response.changed() {
                composer.on_changed();
            }

            if ui
                .add_enabled(composer.can_send(), egui::Button::new("Send"))
                .clicked()
            {
                send = true;
            }

            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                send = true;
                response.request_focus();
            }
        });
    });

    if send {
        actions.send = composer.submit();
    }

    actions
}
