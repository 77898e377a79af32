use eframe::egui;

use crate::common::{ANONYMOUS, Message, MessageBody};
use crate::session::MessageList;
use crate::ui::images::{ImageCache, ImageSlot};

const MAX_IMAGE_WIDTH: f32 = 320.0;

pub fn render(ui: &mut egui::Ui, messages: &MessageList, images: &mut ImageCache) {
    egui::ScrollArea::vertical()
        .stick_to_bottom(true)
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            if messages.is_empty() {
                ui.weak("No messages yet");
                return;
            }

            for message in messages.iter() {
                render_row(ui, message, images);
                ui.add_space(6.0);
            }
        });
}

fn render_row(ui: &mut egui::Ui, message: &Message, images: &mut ImageCache) {
    ui.vertical(|ui| {
        let sender = if message.sender.is_empty() {
            ANONYMOUS
        } else {
            message.sender.as_str()
        };
        ui.label(egui::RichText::new(sender).strong());

        match &message.body {
            MessageBody::Text(text) => {
                ui.label(text);
            }
            MessageBody::Image { url } => match images.get_or_load(ui.ctx(), url) {
                ImageSlot::Ready(texture) => {
                    ui.add(egui::Image::new(&texture).max_width(MAX_IMAGE_WIDTH));
                }
                ImageSlot::Failed => {
                    ui.hyperlink_to("(image unavailable)", url);
                }
            },
        }
    });
}
