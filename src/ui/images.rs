use std::collections::HashMap;
use std::fs;
use std::time::SystemTime;

use eframe::egui;
use image::GenericImageView;

use crate::storage::blob_store::resolve_download_url;

const MAX_PREVIEW_DIMENSION: u32 = 320;

#[derive(Clone)]
pub enum ImageSlot {
    Ready(egui::TextureHandle),
    Failed,
}

/// Decoded photo textures keyed by download URL.
///
/// Each entry remembers the file's modification time, so a photo re-uploaded
/// under the same name, or one that failed and appears later, is decoded again.
#[derive(Default)]
pub struct ImageCache {
    slots: HashMap<String, (Option<SystemTime>, ImageSlot)>,
}

impl ImageCache {
    pub fn get_or_load(&mut self, ctx: &egui::Context, url: &str) -> ImageSlot {
        let modified = modified_at(url);
        if let Some((seen, slot)) = self.slots.get(url) {
            if *seen == modified {
                return slot.clone();
            }
            log::debug!("{url} changed on disk; reloading");
        }

        let slot = match load_texture(ctx, url) {
            Some(texture) => ImageSlot::Ready(texture),
            None => ImageSlot::Failed,
        };
        self.slots.insert(url.to_string(), (modified, slot.clone()));
        slot
    }
}

fn modified_at(url: &str) -> Option<SystemTime> {
    let path = resolve_download_url(url)?;
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

fn load_texture(ctx: &egui::Context, url: &str) -> Option<egui::TextureHandle> {
    let Some(path) = resolve_download_url(url) else {
        log::warn!("Cannot resolve image URL {url}");
        return None;
    };

    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::warn!("Failed to read {}: {err}", path.display());
            return None;
        }
    };

    let decoded = match image::load_from_memory(&bytes) {
        Ok(image) => image,
        Err(err) => {
            log::warn!("Failed to decode {}: {err}", path.display());
            return None;
        }
    };

    let (width, height) = decoded.dimensions();
    let resized = if width.max(height) > MAX_PREVIEW_DIMENSION {
        decoded.thumbnail(MAX_PREVIEW_DIMENSION, MAX_PREVIEW_DIMENSION)
    } else {
        decoded
    };
    let rgba = resized.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());

    Some(ctx.load_texture(
        format!("photo:{url}"),
        color_image,
        egui::TextureOptions::LINEAR,
    ))
}
