use std::path::PathBuf;

use crate::common::PickerRequest;
use crate::session::Outcome;

/// Run the native chooser for `request`. Blocks until the dialog closes.
pub fn pick(request: &PickerRequest) -> Outcome<PathBuf> {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Choose a photo")
        .add_filter(request.mime_type, request.extensions());

    if request.local_only {
        if let Some(dir) = dirs::picture_dir().or_else(dirs::home_dir) {
            dialog = dialog.set_directory(dir);
        }
    }

    match dialog.pick_file() {
        Some(path) => Outcome::Confirmed(path),
        None => Outcome::Cancelled,
    }
}
